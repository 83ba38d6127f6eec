#![allow(clippy::result_large_err)]

//! # Attest Model
//!
//! Model-based testing on top of [`attest`]: run random command sequences
//! against a real system and a reference model at once, and shrink a
//! failing sequence to a minimal reproduction — first by removing chunks
//! of commands, then by shrinking the surviving parameters.
//!
//! ## Quick Example
//!
//! ```rust
//! use attest::int;
//! use attest_model::{
//!     assert_model, Command, ModelConfig, ModelSpec, ParamCommand, SimpleCommand,
//! };
//!
//! struct CounterSpec {
//!     commands: Vec<Box<dyn Command<i64, i64>>>,
//! }
//!
//! impl CounterSpec {
//!     fn new() -> Self {
//!         let commands: Vec<Box<dyn Command<i64, i64>>> = vec![
//!             Box::new(ParamCommand::new(
//!                 "add",
//!                 int(1i64, 10),
//!                 |system: &mut i64, model: &mut i64, n: &i64| {
//!                     *system += n;
//!                     *model += n;
//!                     Ok(())
//!                 },
//!             )
//!             .with_check(|system, model, _| system == model)),
//!             Box::new(SimpleCommand::new("reset", |system: &mut i64, model: &mut i64| {
//!                 *system = 0;
//!                 *model = 0;
//!                 Ok(())
//!             })),
//!         ];
//!         Self { commands }
//!     }
//! }
//!
//! impl ModelSpec for CounterSpec {
//!     type System = i64;
//!     type Model = i64;
//!     fn model(&self) -> i64 { 0 }
//!     fn system(&self) -> i64 { 0 }
//!     fn commands(&self) -> &[Box<dyn Command<i64, i64>>] { &self.commands }
//! }
//!
//! assert!(assert_model(&CounterSpec::new(), &ModelConfig::seeded(7)).is_ok());
//! ```

pub mod command;
pub mod config;
pub mod execution;
pub mod model;
pub mod report;
mod shrinking;

pub use command::{Command, ExecutedStep, ParamCommand, SimpleCommand, StepParam};
pub use config::ModelConfig;
pub use execution::{
    assert_model, replay_model, run_model, ModelFailure, ModelOutcome, RecordedStep,
};
pub use model::ModelSpec;
pub use report::render_model_failure;

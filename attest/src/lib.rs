#![allow(clippy::result_large_err)]

//! # Attest - Property-Based Testing for Rust
//!
//! Attest generates random test inputs from composable arbitraries, runs a
//! property against them, and shrinks any failing input to a minimal
//! counterexample. Runs are deterministic: every failure report carries the
//! seed that reproduces it, bit for bit.
//!
//! ## Quick Start
//!
//! ```rust
//! use attest::{assert_property, int, PropertyConfig};
//!
//! let addition_commutes = assert_property(
//!     &attest::tuple((int(-1000i64, 1000), int(-1000i64, 1000))),
//!     &|(a, b): (i64, i64)| a + b == b + a,
//!     &PropertyConfig::seeded(42),
//! );
//! assert!(addition_commutes.is_ok());
//! ```

pub mod arbitrary;
pub mod collections;
pub mod combinators;
pub mod config;
pub mod error;
pub mod execution;
pub mod primitives;
pub mod report;
pub mod rng;
pub mod structured;

pub use arbitrary::{serialized_score, Arbitrary, BoxedArbitrary};
pub use collections::{array, dictionary, record, set, string, unique_array};
pub use combinators::{
    filter, map, map_with_inverse, one_of, optional, tuple, weighted_one_of,
};
pub use config::{PropertyConfig, RunConfig};
pub use error::{IntoVerdict, PropertyError, Verdict};
pub use execution::{
    assert_property, assert_property_async, replay, run, run_async, AsyncProperty, Property,
    PropertyFailure, RunOutcome,
};
pub use primitives::{bigint, boolean, constant, float, int};
pub use report::render_failure;
pub use rng::RandomSource;
pub use structured::{date, email, uuid};

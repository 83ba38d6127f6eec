//! The specification of a system under model-based test.

use crate::command::Command;

/// Everything needed to run a model-based test: how to build a fresh
/// system and reference model, the command vocabulary, and cleanup.
///
/// A fresh system/model pair is created for every episode and for every
/// shrink candidate, so `system` and `model` must return independent
/// instances.
pub trait ModelSpec {
    /// The real system under test.
    type System;
    /// The reference model it is compared against.
    type Model;

    /// A fresh reference model in its initial state.
    fn model(&self) -> Self::Model;

    /// A fresh system in its initial state.
    fn system(&self) -> Self::System;

    /// The command vocabulary. Must be non-empty; the runner rejects an
    /// empty list before generating anything.
    fn commands(&self) -> &[Box<dyn Command<Self::System, Self::Model>>];

    /// Best-effort cleanup, invoked after every episode whether it passed
    /// or failed. Errors are discarded.
    fn teardown(&self, _system: &mut Self::System) -> Result<(), String> {
        Ok(())
    }
}

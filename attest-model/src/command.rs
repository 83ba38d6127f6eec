//! Commands: the vocabulary of a model-based test.
//!
//! A command runs against the real system and the reference model at once;
//! parameterized commands carry a type-erased [`StepParam`] so recorded
//! sequences stay homogeneous while each command keeps a statically typed
//! view of its own parameter.

use std::any::Any;
use std::fmt;

use attest::{Arbitrary, BoxedArbitrary, PropertyError, RandomSource};
use serde::Serialize;
use serde_json::Value;

trait ErasedParam: Any {
    fn clone_box(&self) -> Box<dyn ErasedParam>;
    fn to_json(&self) -> Value;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Clone + Serialize> ErasedParam for T {
    fn clone_box(&self) -> Box<dyn ErasedParam> {
        Box::new(self.clone())
    }

    fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A type-erased command parameter. Cloneable, serializable for reports,
/// and downcastable back to the concrete type the command generated.
pub struct StepParam(Box<dyn ErasedParam>);

impl StepParam {
    pub fn new<T: Any + Clone + Serialize>(value: T) -> Self {
        StepParam(Box::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }

    /// JSON rendering for failure reports; `null` if serialization fails.
    pub fn to_json(&self) -> Value {
        self.0.to_json()
    }
}

impl Clone for StepParam {
    fn clone(&self) -> Self {
        StepParam(self.0.clone_box())
    }
}

impl fmt::Debug for StepParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// One operation of a model-based test.
///
/// `run` applies the operation to the real system and the model together
/// and reports a system-level failure as `Err`; `check` then compares the
/// two states. `precondition` gates when the command may be chosen, both
/// during generation and when a shrunk sequence is replayed.
pub trait Command<S, M> {
    /// Name used in failure reports.
    fn name(&self) -> &str;

    /// Whether the command is currently applicable.
    fn precondition(&self, _model: &M) -> bool {
        true
    }

    /// Generate this step's parameter, if the command takes one.
    fn generate_param(
        &self,
        _source: &mut RandomSource,
    ) -> Result<Option<StepParam>, PropertyError> {
        Ok(None)
    }

    /// Shrink candidates for a previously generated parameter.
    fn shrink_param(&self, _param: &StepParam) -> Vec<StepParam> {
        Vec::new()
    }

    /// Apply the operation to the system and the model.
    fn run(&self, system: &mut S, model: &mut M, param: Option<&StepParam>)
        -> Result<(), String>;

    /// Compare system and model after the operation ran.
    fn check(&self, _system: &S, _model: &M, _param: Option<&StepParam>) -> bool {
        true
    }
}

/// A command with a generated parameter of type `T`.
///
/// The closures see the parameter as `&T`; erasure happens only at the
/// sequence-recording boundary.
pub struct ParamCommand<S, M, T> {
    name: String,
    arbitrary: BoxedArbitrary<T>,
    run: Box<dyn Fn(&mut S, &mut M, &T) -> Result<(), String>>,
    precondition: Option<Box<dyn Fn(&M) -> bool>>,
    check: Option<Box<dyn Fn(&S, &M, &T) -> bool>>,
}

impl<S, M, T> ParamCommand<S, M, T> {
    pub fn new(
        name: impl Into<String>,
        arbitrary: impl Arbitrary<T> + 'static,
        run: impl Fn(&mut S, &mut M, &T) -> Result<(), String> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arbitrary: Box::new(arbitrary),
            run: Box::new(run),
            precondition: None,
            check: None,
        }
    }

    pub fn with_precondition(mut self, precondition: impl Fn(&M) -> bool + 'static) -> Self {
        self.precondition = Some(Box::new(precondition));
        self
    }

    pub fn with_check(mut self, check: impl Fn(&S, &M, &T) -> bool + 'static) -> Self {
        self.check = Some(Box::new(check));
        self
    }
}

impl<S, M, T> Command<S, M> for ParamCommand<S, M, T>
where
    T: Any + Clone + Serialize,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn precondition(&self, model: &M) -> bool {
        self.precondition.as_ref().map_or(true, |p| p(model))
    }

    fn generate_param(
        &self,
        source: &mut RandomSource,
    ) -> Result<Option<StepParam>, PropertyError> {
        Ok(Some(StepParam::new(self.arbitrary.generate(source)?)))
    }

    fn shrink_param(&self, param: &StepParam) -> Vec<StepParam> {
        match param.downcast_ref::<T>() {
            Some(value) => self.arbitrary.shrink(value).map(StepParam::new).collect(),
            None => Vec::new(),
        }
    }

    fn run(
        &self,
        system: &mut S,
        model: &mut M,
        param: Option<&StepParam>,
    ) -> Result<(), String> {
        let Some(value) = param.and_then(|p| p.downcast_ref::<T>()) else {
            return Err(format!("{}: missing or mistyped parameter", self.name));
        };
        (self.run)(system, model, value)
    }

    fn check(&self, system: &S, model: &M, param: Option<&StepParam>) -> bool {
        match (&self.check, param.and_then(|p| p.downcast_ref::<T>())) {
            (Some(check), Some(value)) => check(system, model, value),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}

/// A command without a parameter.
pub struct SimpleCommand<S, M> {
    name: String,
    run: Box<dyn Fn(&mut S, &mut M) -> Result<(), String>>,
    precondition: Option<Box<dyn Fn(&M) -> bool>>,
    check: Option<Box<dyn Fn(&S, &M) -> bool>>,
}

impl<S, M> SimpleCommand<S, M> {
    pub fn new(
        name: impl Into<String>,
        run: impl Fn(&mut S, &mut M) -> Result<(), String> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            run: Box::new(run),
            precondition: None,
            check: None,
        }
    }

    pub fn with_precondition(mut self, precondition: impl Fn(&M) -> bool + 'static) -> Self {
        self.precondition = Some(Box::new(precondition));
        self
    }

    pub fn with_check(mut self, check: impl Fn(&S, &M) -> bool + 'static) -> Self {
        self.check = Some(Box::new(check));
        self
    }
}

impl<S, M> Command<S, M> for SimpleCommand<S, M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn precondition(&self, model: &M) -> bool {
        self.precondition.as_ref().map_or(true, |p| p(model))
    }

    fn run(
        &self,
        system: &mut S,
        model: &mut M,
        _param: Option<&StepParam>,
    ) -> Result<(), String> {
        (self.run)(system, model)
    }

    fn check(&self, system: &S, model: &M, _param: Option<&StepParam>) -> bool {
        self.check.as_ref().map_or(true, |c| c(system, model))
    }
}

/// One recorded step of an episode: which command ran and with what
/// parameter.
#[derive(Clone, Debug)]
pub struct ExecutedStep {
    pub command_index: usize,
    pub param: Option<StepParam>,
}

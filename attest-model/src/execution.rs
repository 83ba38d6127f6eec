//! The model runner: episode generation, replay of recorded sequences,
//! and the assert/replay entry points.

use attest::rng::{seed_from_time, RandomSource};
use attest::PropertyError;
use serde_json::Value;

use crate::command::ExecutedStep;
use crate::config::ModelConfig;
use crate::model::ModelSpec;
use crate::report::render_model_failure;
use crate::shrinking::shrink_sequence;

/// One line of a reported failing sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStep {
    pub name: String,
    pub param: Option<Value>,
}

/// A shrunk model failure.
#[derive(Debug, Clone)]
pub struct ModelFailure {
    pub seed: u32,
    pub runs: u32,
    /// 1-based index of the failing episode.
    pub iterations: u32,
    /// Committed shrink steps across both phases.
    pub shrinks: u32,
    /// The minimal failing command sequence.
    pub sequence: Vec<RecordedStep>,
    /// 0-based index of the step that failed, if the sequence still has
    /// one.
    pub failed_step: Option<usize>,
    /// Error text from the failing command's `run`, if it produced one;
    /// `None` for a `check` mismatch.
    pub error: Option<String>,
}

/// Result of a completed model run.
#[derive(Debug, Clone)]
pub enum ModelOutcome {
    Pass { runs: u32 },
    Fail(ModelFailure),
}

impl ModelOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, ModelOutcome::Pass { .. })
    }

    pub fn failure(&self) -> Option<&ModelFailure> {
        match self {
            ModelOutcome::Pass { .. } => None,
            ModelOutcome::Fail(failure) => Some(failure),
        }
    }
}

/// How replaying a recorded sequence ended.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StepsOutcome {
    Passed,
    Failed {
        step: usize,
        error: Option<String>,
    },
}

impl StepsOutcome {
    pub(crate) fn is_failure(&self) -> bool {
        matches!(self, StepsOutcome::Failed { .. })
    }
}

/// Replay a recorded sequence against fresh system/model instances.
///
/// A step whose precondition no longer holds (possible after earlier steps
/// were removed) makes the whole candidate non-reproducing: the sequence
/// counts as passing. Teardown always runs; its errors are discarded.
pub(crate) fn replay_steps<Spec: ModelSpec>(spec: &Spec, steps: &[ExecutedStep]) -> StepsOutcome {
    let commands = spec.commands();
    let mut system = spec.system();
    let mut model = spec.model();
    let mut outcome = StepsOutcome::Passed;
    for (index, step) in steps.iter().enumerate() {
        let command = &commands[step.command_index];
        if !command.precondition(&model) {
            break;
        }
        if let Err(error) = command.run(&mut system, &mut model, step.param.as_ref()) {
            outcome = StepsOutcome::Failed {
                step: index,
                error: Some(error),
            };
            break;
        }
        if !command.check(&system, &model, step.param.as_ref()) {
            outcome = StepsOutcome::Failed {
                step: index,
                error: None,
            };
            break;
        }
    }
    let _ = spec.teardown(&mut system);
    outcome
}

struct Episode {
    steps: Vec<ExecutedStep>,
    outcome: StepsOutcome,
}

/// Generate and execute one episode. Command choice consumes one draw per
/// step and each parameter is generated from a forked source, so a step's
/// parameter draws never shift the choices of later steps.
fn run_episode<Spec: ModelSpec>(
    spec: &Spec,
    source: &mut RandomSource,
    max_commands: u32,
) -> Result<Episode, PropertyError> {
    let commands = spec.commands();
    let mut system = spec.system();
    let mut model = spec.model();
    let mut steps = Vec::new();
    let mut outcome = StepsOutcome::Passed;

    for _ in 0..max_commands {
        let eligible: Vec<usize> = (0..commands.len())
            .filter(|&index| commands[index].precondition(&model))
            .collect();
        if eligible.is_empty() {
            break;
        }
        let pick =
            eligible[((source.draw() * eligible.len() as f64) as usize).min(eligible.len() - 1)];
        let mut param_source = source.fork();
        let param = match commands[pick].generate_param(&mut param_source) {
            Ok(param) => param,
            Err(error) => {
                let _ = spec.teardown(&mut system);
                return Err(error);
            }
        };
        steps.push(ExecutedStep {
            command_index: pick,
            param: param.clone(),
        });
        if let Err(error) = commands[pick].run(&mut system, &mut model, param.as_ref()) {
            outcome = StepsOutcome::Failed {
                step: steps.len() - 1,
                error: Some(error),
            };
            break;
        }
        if !commands[pick].check(&system, &model, param.as_ref()) {
            outcome = StepsOutcome::Failed {
                step: steps.len() - 1,
                error: None,
            };
            break;
        }
    }
    let _ = spec.teardown(&mut system);
    Ok(Episode { steps, outcome })
}

fn record_sequence<Spec: ModelSpec>(spec: &Spec, steps: &[ExecutedStep]) -> Vec<RecordedStep> {
    let commands = spec.commands();
    steps
        .iter()
        .map(|step| RecordedStep {
            name: commands[step.command_index].name().to_string(),
            param: step.param.as_ref().map(|p| p.to_json()),
        })
        .collect()
}

/// Run random command episodes against the system and its model.
///
/// The first failing episode is shrunk (chunk removal, then parameter
/// shrinking) and reported. As with property runs, a failing episode is an
/// `Ok(Fail)`; `Err` is reserved for configuration and generation errors.
pub fn run_model<Spec: ModelSpec>(
    spec: &Spec,
    config: &ModelConfig,
) -> Result<ModelOutcome, PropertyError> {
    config.validate()?;
    if spec.commands().is_empty() {
        return Err(PropertyError::config(
            "at least one command is required",
            "commands",
        ));
    }
    let seed = config.seed.unwrap_or_else(seed_from_time);
    let mut source = RandomSource::new(seed);
    for iteration in 1..=config.runs {
        let mut episode_source = source.fork();
        let episode = run_episode(spec, &mut episode_source, config.max_commands)?;
        if let StepsOutcome::Failed { step, error } = episode.outcome {
            let (steps, shrinks, failed_step, last_error) =
                shrink_sequence(spec, episode.steps, step, error, config.max_shrinks);
            return Ok(ModelOutcome::Fail(ModelFailure {
                seed,
                runs: config.runs,
                iterations: iteration,
                shrinks,
                sequence: record_sequence(spec, &steps),
                failed_step,
                error: last_error,
            }));
        }
    }
    Ok(ModelOutcome::Pass { runs: config.runs })
}

/// Re-run with a pinned seed, as suggested by a report's `replay:` line.
pub fn replay_model<Spec: ModelSpec>(
    spec: &Spec,
    seed: u32,
    runs: u32,
) -> Result<ModelOutcome, PropertyError> {
    let config = ModelConfig::seeded(seed).with_runs(runs);
    run_model(spec, &config)
}

/// Run and turn a failure into a [`PropertyError::Failed`] carrying the
/// formatted report, for use inside `#[test]` functions.
pub fn assert_model<Spec: ModelSpec>(
    spec: &Spec,
    config: &ModelConfig,
) -> Result<(), PropertyError> {
    match run_model(spec, config)? {
        ModelOutcome::Pass { .. } => Ok(()),
        ModelOutcome::Fail(failure) => Err(PropertyError::Failed {
            report: render_model_failure(&failure),
            cause: failure.error,
        }),
    }
}

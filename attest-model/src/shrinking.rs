//! Two-phase sequence shrinking: chunk removal, then parameter shrinking.

use crate::command::ExecutedStep;
use crate::execution::{replay_steps, StepsOutcome};
use crate::model::ModelSpec;

struct ShrinkState {
    steps: Vec<ExecutedStep>,
    failed_step: Option<usize>,
    error: Option<String>,
    shrinks: u32,
    budget: u32,
}

impl ShrinkState {
    fn commit(&mut self, steps: Vec<ExecutedStep>, outcome: StepsOutcome) {
        if let StepsOutcome::Failed { step, error } = outcome {
            self.steps = steps;
            self.failed_step = Some(step);
            self.error = error;
            self.shrinks += 1;
        }
    }
}

/// Shrink a failing sequence under a shared candidate budget.
///
/// Phase 1 is delta-debugging-style chunk removal: scan the sequence
/// removing `chunk` consecutive steps at a time; a removal that still
/// fails is committed and the scan restarts on the shorter sequence with a
/// fresh chunk size; a quiet scan halves the chunk. Phase 2 shrinks one
/// step's parameter at a time with whatever budget remains, restarting the
/// pass after every commit. Every candidate replay consumes one unit of
/// budget whether or not it fails.
pub(crate) fn shrink_sequence<Spec: ModelSpec>(
    spec: &Spec,
    start: Vec<ExecutedStep>,
    start_failed_step: usize,
    start_error: Option<String>,
    max_shrinks: u32,
) -> (Vec<ExecutedStep>, u32, Option<usize>, Option<String>) {
    let mut state = ShrinkState {
        steps: start,
        failed_step: Some(start_failed_step),
        error: start_error,
        shrinks: 0,
        budget: max_shrinks,
    };

    remove_chunks(spec, &mut state);
    shrink_params(spec, &mut state);

    (state.steps, state.shrinks, state.failed_step, state.error)
}

fn remove_chunks<Spec: ModelSpec>(spec: &Spec, state: &mut ShrinkState) {
    let mut chunk = (state.steps.len() / 2).max(1);
    loop {
        if state.budget == 0 || state.steps.is_empty() {
            return;
        }
        let mut start = 0;
        let mut removed = false;
        while start < state.steps.len() {
            if state.budget == 0 {
                return;
            }
            let end = (start + chunk).min(state.steps.len());
            let mut candidate = state.steps.clone();
            candidate.drain(start..end);
            state.budget -= 1;
            let outcome = replay_steps(spec, &candidate);
            if outcome.is_failure() {
                state.commit(candidate, outcome);
                chunk = (state.steps.len() / 2).max(1);
                removed = true;
                break;
            }
            start += chunk;
        }
        if !removed {
            if chunk == 1 {
                return;
            }
            chunk /= 2;
        }
    }
}

fn shrink_params<Spec: ModelSpec>(spec: &Spec, state: &mut ShrinkState) {
    let commands = spec.commands();
    'restart: loop {
        for index in 0..state.steps.len() {
            let Some(param) = state.steps[index].param.as_ref() else {
                continue;
            };
            let candidates = commands[state.steps[index].command_index].shrink_param(param);
            for candidate_param in candidates {
                if state.budget == 0 {
                    return;
                }
                let mut candidate = state.steps.clone();
                candidate[index].param = Some(candidate_param);
                state.budget -= 1;
                let outcome = replay_steps(spec, &candidate);
                if outcome.is_failure() {
                    state.commit(candidate, outcome);
                    continue 'restart;
                }
            }
        }
        return;
    }
}

//! The property runner: trial loop, shrink loop, replay.

use std::future::Future;

use serde::Serialize;

use crate::arbitrary::Arbitrary;
use crate::config::PropertyConfig;
use crate::error::{IntoVerdict, PropertyError, Verdict};
use crate::report::render_failure;
use crate::rng::{seed_from_time, RandomSource};

/// A checkable property over inputs of type `T`.
///
/// Implemented for any closure taking the input by value and returning
/// something convertible to a [`Verdict`]: `bool`, `()`, `Result<(), E>`
/// or a `Verdict` itself.
pub trait Property<T> {
    fn check(&self, input: T) -> Verdict;
}

impl<T, F, V> Property<T> for F
where
    F: Fn(T) -> V,
    V: IntoVerdict,
{
    fn check(&self, input: T) -> Verdict {
        self(input).into_verdict()
    }
}

/// An asynchronous property; the async twin of [`Property`].
pub trait AsyncProperty<T> {
    fn check(&self, input: T) -> impl Future<Output = Verdict>;
}

impl<T, F, Fut, V> AsyncProperty<T> for F
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = V>,
    V: IntoVerdict,
{
    async fn check(&self, input: T) -> Verdict {
        self(input).await.into_verdict()
    }
}

/// Everything known about a property failure after shrinking finished.
#[derive(Debug, Clone)]
pub struct PropertyFailure<T> {
    /// Seed of the run, pinned or clock-derived. Feed it to [`replay`].
    pub seed: u32,
    /// Configured number of trials.
    pub runs: u32,
    /// 1-based index of the failing trial.
    pub iterations: u32,
    /// Number of committed shrink steps.
    pub shrinks: u32,
    /// The smallest failing input found.
    pub counterexample: T,
    /// Error text from the failing predicate, if it produced one.
    pub error: Option<String>,
}

/// Result of a completed run: every trial passed, or one failed and was
/// shrunk.
#[derive(Debug, Clone)]
pub enum RunOutcome<T> {
    Pass { runs: u32 },
    Fail(PropertyFailure<T>),
}

impl<T> RunOutcome<T> {
    pub fn is_pass(&self) -> bool {
        matches!(self, RunOutcome::Pass { .. })
    }

    /// The failure, if any.
    pub fn failure(&self) -> Option<&PropertyFailure<T>> {
        match self {
            RunOutcome::Pass { .. } => None,
            RunOutcome::Fail(failure) => Some(failure),
        }
    }
}

struct ShrinkState<T> {
    current: T,
    current_score: f64,
    shrinks: u32,
    last_error: Option<String>,
}

/// Shrink `start` to a fixed point under the candidate budget.
///
/// Round-based: each round evaluates every candidate of the current value,
/// keeps the best still-failing one (strictly smaller score, first seen
/// wins ties) and commits it. A round that commits nothing, an empty
/// candidate sequence, or an exhausted budget ends the loop; a round cut
/// short by the budget still commits the best candidate it saw.
fn shrink_to_fixed_point<T, A, P>(
    arbitrary: &A,
    property: &P,
    start: T,
    start_error: Option<String>,
    max_shrinks: u32,
) -> (T, u32, Option<String>)
where
    T: Clone,
    A: Arbitrary<T> + ?Sized,
    P: Property<T> + ?Sized,
{
    let mut state = ShrinkState {
        current_score: arbitrary.score(&start),
        current: start,
        shrinks: 0,
        last_error: start_error,
    };
    let mut budget = max_shrinks;
    loop {
        let mut best: Option<(T, f64, Option<String>)> = None;
        let mut out_of_budget = false;
        for candidate in arbitrary.shrink(&state.current) {
            if budget == 0 {
                out_of_budget = true;
                break;
            }
            budget -= 1;
            if let Verdict::Fail { error } = property.check(candidate.clone()) {
                let score = arbitrary.score(&candidate);
                let improves = score < state.current_score
                    && best.as_ref().map_or(true, |(_, s, _)| score < *s);
                if improves {
                    best = Some((candidate, score, error));
                }
            }
        }
        match best {
            Some((value, score, error)) => {
                state.current = value;
                state.current_score = score;
                state.shrinks += 1;
                state.last_error = error;
            }
            None => break,
        }
        if out_of_budget {
            break;
        }
    }
    (state.current, state.shrinks, state.last_error)
}

async fn shrink_to_fixed_point_async<T, A, P>(
    arbitrary: &A,
    property: &P,
    start: T,
    start_error: Option<String>,
    max_shrinks: u32,
) -> (T, u32, Option<String>)
where
    T: Clone,
    A: Arbitrary<T> + ?Sized,
    P: AsyncProperty<T>,
{
    let mut state = ShrinkState {
        current_score: arbitrary.score(&start),
        current: start,
        shrinks: 0,
        last_error: start_error,
    };
    let mut budget = max_shrinks;
    loop {
        let mut best: Option<(T, f64, Option<String>)> = None;
        let mut out_of_budget = false;
        for candidate in arbitrary.shrink(&state.current) {
            if budget == 0 {
                out_of_budget = true;
                break;
            }
            budget -= 1;
            if let Verdict::Fail { error } = property.check(candidate.clone()).await {
                let score = arbitrary.score(&candidate);
                let improves = score < state.current_score
                    && best.as_ref().map_or(true, |(_, s, _)| score < *s);
                if improves {
                    best = Some((candidate, score, error));
                }
            }
        }
        match best {
            Some((value, score, error)) => {
                state.current = value;
                state.current_score = score;
                state.shrinks += 1;
                state.last_error = error;
            }
            None => break,
        }
        if out_of_budget {
            break;
        }
    }
    (state.current, state.shrinks, state.last_error)
}

/// Run `property` against values from `arbitrary`.
///
/// Each trial forks the top-level source, so a trial consumes exactly one
/// draw from it regardless of how many draws generation needs; trial `k`
/// therefore sees the same input whether or not earlier trials shrank.
/// The first failing trial is shrunk and reported; a failing property is
/// an `Ok(Fail)`, not an `Err`. `Err` is reserved for configuration and
/// generation errors.
pub fn run<T, A, P>(
    arbitrary: &A,
    property: &P,
    config: &PropertyConfig,
) -> Result<RunOutcome<T>, PropertyError>
where
    T: Clone,
    A: Arbitrary<T> + ?Sized,
    P: Property<T> + ?Sized,
{
    config.validate()?;
    let seed = config.seed.unwrap_or_else(seed_from_time);
    let mut source = RandomSource::new(seed);
    for iteration in 1..=config.runs {
        let mut trial = source.fork();
        let value = arbitrary.generate(&mut trial)?;
        if let Verdict::Fail { error } = property.check(value.clone()) {
            let (counterexample, shrinks, last_error) =
                shrink_to_fixed_point(arbitrary, property, value, error, config.max_shrinks);
            return Ok(RunOutcome::Fail(PropertyFailure {
                seed,
                runs: config.runs,
                iterations: iteration,
                shrinks,
                counterexample,
                error: last_error,
            }));
        }
    }
    Ok(RunOutcome::Pass { runs: config.runs })
}

/// Async variant of [`run`]; same trial and shrink semantics.
pub async fn run_async<T, A, P>(
    arbitrary: &A,
    property: &P,
    config: &PropertyConfig,
) -> Result<RunOutcome<T>, PropertyError>
where
    T: Clone,
    A: Arbitrary<T> + ?Sized,
    P: AsyncProperty<T>,
{
    config.validate()?;
    let seed = config.seed.unwrap_or_else(seed_from_time);
    let mut source = RandomSource::new(seed);
    for iteration in 1..=config.runs {
        let mut trial = source.fork();
        let value = arbitrary.generate(&mut trial)?;
        if let Verdict::Fail { error } = property.check(value.clone()).await {
            let (counterexample, shrinks, last_error) =
                shrink_to_fixed_point_async(arbitrary, property, value, error, config.max_shrinks)
                    .await;
            return Ok(RunOutcome::Fail(PropertyFailure {
                seed,
                runs: config.runs,
                iterations: iteration,
                shrinks,
                counterexample,
                error: last_error,
            }));
        }
    }
    Ok(RunOutcome::Pass { runs: config.runs })
}

/// Re-run with a pinned seed, the way a failure report's `replay:` line
/// suggests. Deterministic: the same seed and run count reproduce the
/// same trials, the same failure and the same shrink result.
pub fn replay<T, A, P>(
    arbitrary: &A,
    property: &P,
    seed: u32,
    runs: u32,
) -> Result<RunOutcome<T>, PropertyError>
where
    T: Clone,
    A: Arbitrary<T> + ?Sized,
    P: Property<T> + ?Sized,
{
    let config = PropertyConfig::seeded(seed).with_runs(runs);
    run(arbitrary, property, &config)
}

/// Run and turn a failure into a [`PropertyError::Failed`] carrying the
/// formatted report, for use inside `#[test]` functions.
pub fn assert_property<T, A, P>(
    arbitrary: &A,
    property: &P,
    config: &PropertyConfig,
) -> Result<(), PropertyError>
where
    T: Clone + Serialize,
    A: Arbitrary<T> + ?Sized,
    P: Property<T> + ?Sized,
{
    match run(arbitrary, property, config)? {
        RunOutcome::Pass { .. } => Ok(()),
        RunOutcome::Fail(failure) => Err(PropertyError::Failed {
            report: render_failure(&failure),
            cause: failure.error,
        }),
    }
}

/// Async variant of [`assert_property`].
pub async fn assert_property_async<T, A, P>(
    arbitrary: &A,
    property: &P,
    config: &PropertyConfig,
) -> Result<(), PropertyError>
where
    T: Clone + Serialize,
    A: Arbitrary<T> + ?Sized,
    P: AsyncProperty<T>,
{
    match run_async(arbitrary, property, config).await? {
        RunOutcome::Pass { .. } => Ok(()),
        RunOutcome::Fail(failure) => Err(PropertyError::Failed {
            report: render_failure(&failure),
            cause: failure.error,
        }),
    }
}

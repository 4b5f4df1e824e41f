use std::marker::PhantomData;

use tracing::{debug, warn};

use crate::audit::{SequenceLog, StepStatus};
use crate::composite::{AggregationMode, AuthorizationSource, CompositeOutcome, StepResult};
use crate::error::StepFault;
use crate::history::History;
use crate::outcome::Outcome;

/// What a failed step means for the rest of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// A failure stops the sequence.
    #[default]
    Halt,
    /// A failure is recorded but the sequence continues. Used for
    /// best-effort cleanup such as voiding a verification authorization.
    Ignore,
}

type StepFn<'a> = Box<dyn FnOnce(&History<'_>) -> Result<Outcome, StepFault> + 'a>;

struct PendingStep<'a> {
    name: &'static str,
    policy: FailurePolicy,
    run: StepFn<'a>,
}

/// Marker state for a sequencer with no steps.
pub struct Empty;

/// State of a sequencer with at least one step.
pub struct Ready<'a> {
    first: PendingStep<'a>,
    rest: Vec<PendingStep<'a>>,
}

/// Runs remote calls one after another, stopping at the first failure that
/// matters.
///
/// Each step is a closure that receives the [`History`] of outcomes accepted
/// so far and returns the [`Outcome`] of its own call. Branching ("does the
/// caller already have a customer?") lives inside the closures; the
/// sequencer itself only orders, halts and aggregates.
///
/// The type state guarantees that only a sequencer with at least one step can
/// be run, so every [`CompositeOutcome`] holds at least one outcome:
///
/// ```compile_fail
/// use payflow_core::{AggregationMode, StepSequencer};
///
/// // `run()` only exists once a step has been added
/// let composite = StepSequencer::new(AggregationMode::AllMustSucceed).run();
/// ```
pub struct StepSequencer<'a, State = Empty> {
    mode: AggregationMode,
    authorization_source: AuthorizationSource,
    state: State,
    _marker: PhantomData<&'a ()>,
}

impl<'a> StepSequencer<'a, Empty> {
    #[must_use]
    pub fn new(mode: AggregationMode) -> Self {
        Self {
            mode,
            authorization_source: AuthorizationSource::default(),
            state: Empty,
            _marker: PhantomData,
        }
    }

    /// Add the first step; a failure halts the sequence.
    #[must_use]
    pub fn step<F>(self, name: &'static str, step: F) -> StepSequencer<'a, Ready<'a>>
    where
        F: FnOnce(&History<'_>) -> Result<Outcome, StepFault> + 'a,
    {
        self.add_step(name, FailurePolicy::Halt, step)
    }

    /// Add a best-effort first step.
    ///
    /// The marker is only honored under [`AggregationMode::IgnoreOnDemand`];
    /// in the other modes the first outcome is the primary one and its
    /// failure always halts.
    #[must_use]
    pub fn cleanup_step<F>(self, name: &'static str, step: F) -> StepSequencer<'a, Ready<'a>>
    where
        F: FnOnce(&History<'_>) -> Result<Outcome, StepFault> + 'a,
    {
        self.add_step(name, FailurePolicy::Ignore, step)
    }

    #[must_use]
    pub fn add_step<F>(
        self,
        name: &'static str,
        policy: FailurePolicy,
        step: F,
    ) -> StepSequencer<'a, Ready<'a>>
    where
        F: FnOnce(&History<'_>) -> Result<Outcome, StepFault> + 'a,
    {
        let policy = if self.mode == AggregationMode::IgnoreOnDemand {
            policy
        } else {
            if policy == FailurePolicy::Ignore {
                warn!(
                    step = name,
                    mode = ?self.mode,
                    "first step cannot be best-effort in this mode; its failure will halt"
                );
            }
            FailurePolicy::Halt
        };

        StepSequencer {
            mode: self.mode,
            authorization_source: self.authorization_source,
            state: Ready {
                first: PendingStep {
                    name,
                    policy,
                    run: Box::new(step),
                },
                rest: Vec::new(),
            },
            _marker: PhantomData,
        }
    }
}

impl<State> StepSequencer<'_, State> {
    /// Take the composite authorization from the first outcome instead of
    /// the last successful one.
    #[must_use]
    pub fn pin_authorization_to_primary(mut self) -> Self {
        self.authorization_source = AuthorizationSource::Primary;
        self
    }
}

impl<'a> StepSequencer<'a, Ready<'a>> {
    /// Add a step whose failure halts the sequence.
    #[must_use]
    pub fn step<F>(self, name: &'static str, step: F) -> Self
    where
        F: FnOnce(&History<'_>) -> Result<Outcome, StepFault> + 'a,
    {
        self.add_step(name, FailurePolicy::Halt, step)
    }

    /// Add a best-effort step: its outcome is recorded and becomes the last
    /// accepted one, but a failure does not stop the sequence.
    #[must_use]
    pub fn cleanup_step<F>(self, name: &'static str, step: F) -> Self
    where
        F: FnOnce(&History<'_>) -> Result<Outcome, StepFault> + 'a,
    {
        self.add_step(name, FailurePolicy::Ignore, step)
    }

    #[must_use]
    pub fn add_step<F>(mut self, name: &'static str, policy: FailurePolicy, step: F) -> Self
    where
        F: FnOnce(&History<'_>) -> Result<Outcome, StepFault> + 'a,
    {
        self.state.rest.push(PendingStep {
            name,
            policy,
            run: Box::new(step),
        });
        self
    }

    /// Number of registered steps.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.state.rest.len()
    }

    /// Always `false`; a ready sequencer has at least one step.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Execute the steps in registration order.
    ///
    /// Never fails: provider declines are failed outcomes, and step faults
    /// are converted into failed outcomes that halt the sequence.
    ///
    /// # Panics
    ///
    /// A panicking step is not caught. The panic unwinds out of `run` and no
    /// composite is produced for the steps that already ran.
    #[must_use]
    pub fn run(self) -> CompositeOutcome {
        let total = self.len();
        let Ready { first, rest } = self.state;
        let mut log = SequenceLog::new();

        let head = execute(first, 0, &History::empty(), &mut log);
        let mut halted = head.halts();
        let mut composite = CompositeOutcome::started(self.mode, self.authorization_source, head);

        for (offset, step) in rest.into_iter().enumerate() {
            if halted {
                break;
            }
            let result = execute(step, offset + 1, &composite.history(), &mut log);
            halted = result.halts();
            composite.push(result);
        }

        if halted {
            warn!(
                executed = composite.len(),
                skipped = total - composite.len(),
                "sequence halted"
            );
        }

        let composite = composite.with_log(log);
        debug!(
            steps = composite.len(),
            succeeded = composite.succeeded(),
            authorization = composite.authorization(),
            "sequence finished"
        );
        composite
    }
}

fn execute(
    step: PendingStep<'_>,
    index: usize,
    history: &History<'_>,
    log: &mut SequenceLog,
) -> StepResult {
    debug!(step = step.name, index, "running step");
    log.record_start(step.name);

    let (outcome, faulted) = match (step.run)(history) {
        Ok(outcome) => (outcome, false),
        Err(fault) => {
            warn!(step = step.name, index, error = %fault, "step faulted");
            (Outcome::faulted(&fault), true)
        }
    };

    let status = if faulted {
        StepStatus::Faulted
    } else if outcome.succeeded() {
        StepStatus::Succeeded
    } else if step.policy == FailurePolicy::Ignore {
        warn!(step = step.name, message = outcome.message(), "ignoring step failure");
        StepStatus::FailureIgnored
    } else {
        StepStatus::Failed
    };
    log.record_completion(status);

    debug!(
        step = step.name,
        index,
        succeeded = outcome.succeeded(),
        authorization = outcome.authorization(),
        "step finished"
    );

    StepResult::new(step.name, step.policy, faulted, outcome)
}

use std::iter;

use crate::audit::SequenceLog;
use crate::history::History;
use crate::outcome::{Outcome, Params};
use crate::sequencer::FailurePolicy;

/// How a composite turns its outcomes into a single verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregationMode {
    /// Every outcome that counts toward the verdict must have succeeded.
    /// Outcomes of best-effort steps do not count.
    #[default]
    AllMustSucceed,
    /// The first outcome alone decides; later steps are follow-ups whose own
    /// failure must not mask the first result.
    FirstDetermines,
    /// The last outcome that counts decides, and any step (the first
    /// included) may be marked best-effort. A sequence made only of ignored
    /// failures succeeds.
    IgnoreOnDemand,
}

/// Which outcome supplies the composite's authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorizationSource {
    /// The last outcome that succeeded.
    #[default]
    LastSucceeded,
    /// The first outcome, regardless of what followed.
    Primary,
}

/// One executed step as recorded in a composite.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    name: &'static str,
    policy: FailurePolicy,
    faulted: bool,
    outcome: Outcome,
}

impl StepResult {
    pub(crate) fn new(
        name: &'static str,
        policy: FailurePolicy,
        faulted: bool,
        outcome: Outcome,
    ) -> Self {
        Self {
            name,
            policy,
            faulted,
            outcome,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    #[must_use]
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Whether the outcome was synthesized from a fault.
    #[must_use]
    pub fn faulted(&self) -> bool {
        self.faulted
    }

    /// Faults always count: they halt the sequence, so a best-effort marker
    /// cannot hide that later steps never ran.
    fn counts(&self) -> bool {
        self.faulted || self.policy == FailurePolicy::Halt
    }

    pub(crate) fn halts(&self) -> bool {
        self.faulted || (!self.outcome.succeeded() && self.policy == FailurePolicy::Halt)
    }
}

/// Aggregated result of a sequence run.
///
/// Always holds at least one outcome: it can only be produced by running a
/// sequencer that has at least one step.
#[derive(Debug)]
pub struct CompositeOutcome {
    mode: AggregationMode,
    authorization_source: AuthorizationSource,
    head: StepResult,
    tail: Vec<StepResult>,
    log: SequenceLog,
}

impl CompositeOutcome {
    pub(crate) fn started(
        mode: AggregationMode,
        authorization_source: AuthorizationSource,
        head: StepResult,
    ) -> Self {
        Self {
            mode,
            authorization_source,
            head,
            tail: Vec::new(),
            log: SequenceLog::new(),
        }
    }

    pub(crate) fn push(&mut self, result: StepResult) {
        self.tail.push(result);
    }

    pub(crate) fn history(&self) -> History<'_> {
        History::new(&self.head, &self.tail)
    }

    pub(crate) fn with_log(mut self, log: SequenceLog) -> Self {
        self.log = log;
        self
    }

    #[must_use]
    pub fn mode(&self) -> AggregationMode {
        self.mode
    }

    /// The composite verdict under the aggregation mode.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        match self.mode {
            AggregationMode::AllMustSucceed => self
                .counted()
                .all(|result| result.outcome.succeeded()),
            AggregationMode::FirstDetermines => self.head.outcome.succeeded(),
            AggregationMode::IgnoreOnDemand => self
                .counted()
                .last()
                .is_none_or(|result| result.outcome.succeeded()),
        }
    }

    /// Message of the outcome that decided the verdict.
    #[must_use]
    pub fn message(&self) -> &str {
        self.deciding().outcome.message()
    }

    /// Params of the outcome that decided the verdict.
    #[must_use]
    pub fn params(&self) -> &Params {
        self.deciding().outcome.params()
    }

    /// The composite authorization handle.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        match self.authorization_source {
            AuthorizationSource::Primary => self.head.outcome.authorization(),
            AuthorizationSource::LastSucceeded => self
                .outcomes()
                .filter(|outcome| outcome.succeeded())
                .last()
                .and_then(Outcome::authorization),
        }
    }

    /// The first outcome of the sequence.
    #[must_use]
    pub fn primary(&self) -> &Outcome {
        &self.head.outcome
    }

    /// The last outcome appended.
    #[must_use]
    pub fn last(&self) -> &Outcome {
        &self.tail.last().unwrap_or(&self.head).outcome
    }

    pub fn results(&self) -> impl Iterator<Item = &StepResult> {
        iter::once(&self.head).chain(self.tail.iter())
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &Outcome> {
        self.results().map(StepResult::outcome)
    }

    /// The outcome of the most recent step registered under `name`.
    #[must_use]
    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.history().outcome(name)
    }

    /// Number of outcomes; steps skipped by a halt are not counted.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.tail.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[must_use]
    pub fn log(&self) -> &SequenceLog {
        &self.log
    }

    #[must_use]
    pub fn into_outcomes(self) -> Vec<Outcome> {
        iter::once(self.head)
            .chain(self.tail)
            .map(|result| result.outcome)
            .collect()
    }

    /// Collapse the composite into one outcome so that a whole sequence can
    /// act as a single step of an outer sequence.
    #[must_use]
    pub fn to_outcome(&self) -> Outcome {
        Outcome::new(
            self.succeeded(),
            self.message(),
            self.params().clone(),
            self.authorization().map(ToString::to_string),
        )
    }

    fn counted(&self) -> impl Iterator<Item = &StepResult> {
        self.results().filter(|result| result.counts())
    }

    fn deciding(&self) -> &StepResult {
        match self.mode {
            AggregationMode::FirstDetermines => &self.head,
            AggregationMode::AllMustSucceed => self
                .counted()
                .find(|result| !result.outcome.succeeded())
                .or_else(|| self.counted().last())
                .unwrap_or(&self.head),
            AggregationMode::IgnoreOnDemand => self
                .counted()
                .last()
                .or_else(|| self.tail.last())
                .unwrap_or(&self.head),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(name: &'static str, authorization: Option<&str>) -> StepResult {
        let mut outcome = Outcome::success(Params::new());
        if let Some(authorization) = authorization {
            outcome = outcome.with_authorization(authorization);
        }
        StepResult::new(name, FailurePolicy::Halt, false, outcome)
    }

    fn failed(name: &'static str, policy: FailurePolicy) -> StepResult {
        StepResult::new(
            name,
            policy,
            false,
            Outcome::failure(format!("{name} failed"), Params::new()),
        )
    }

    fn composite(
        mode: AggregationMode,
        source: AuthorizationSource,
        results: Vec<StepResult>,
    ) -> CompositeOutcome {
        let mut results = results.into_iter();
        let head = results.next().expect("at least one result");
        let mut composite = CompositeOutcome::started(mode, source, head);
        for result in results {
            composite.push(result);
        }
        composite
    }

    #[test]
    fn all_must_succeed_excludes_ignored_failures() {
        let composite = composite(
            AggregationMode::AllMustSucceed,
            AuthorizationSource::LastSucceeded,
            vec![
                ok("create", Some("a")),
                failed("cleanup", FailurePolicy::Ignore),
                ok("attach", Some("b")),
            ],
        );

        assert!(composite.succeeded());
        assert_eq!(composite.authorization(), Some("b"));
        assert_eq!(composite.len(), 3);
    }

    #[test]
    fn all_must_succeed_reports_failing_message() {
        let composite = composite(
            AggregationMode::AllMustSucceed,
            AuthorizationSource::LastSucceeded,
            vec![ok("create", Some("a")), failed("attach", FailurePolicy::Halt)],
        );

        assert!(!composite.succeeded());
        assert_eq!(composite.message(), "attach failed");
        assert_eq!(composite.authorization(), Some("a"));
    }

    #[test]
    fn first_determines_ignores_later_results() {
        let composite = composite(
            AggregationMode::FirstDetermines,
            AuthorizationSource::Primary,
            vec![ok("authorize", Some("pay_1")), failed("void", FailurePolicy::Ignore)],
        );

        assert!(composite.succeeded());
        assert_eq!(composite.message(), "OK");
        assert_eq!(composite.authorization(), Some("pay_1"));
        assert!(!composite.last().succeeded());
    }

    #[test]
    fn ignore_on_demand_succeeds_when_only_ignored_failures() {
        let composite = composite(
            AggregationMode::IgnoreOnDemand,
            AuthorizationSource::LastSucceeded,
            vec![failed("probe", FailurePolicy::Ignore)],
        );

        assert!(composite.succeeded());
        assert_eq!(composite.message(), "probe failed");
        assert_eq!(composite.authorization(), None);
    }

    #[test]
    fn faulted_best_effort_step_still_counts() {
        let faulted = StepResult::new(
            "cleanup",
            FailurePolicy::Ignore,
            true,
            Outcome::failure("fault", Params::new()),
        );
        let composite = composite(
            AggregationMode::AllMustSucceed,
            AuthorizationSource::LastSucceeded,
            vec![ok("create", None), faulted],
        );

        assert!(!composite.succeeded());
        assert_eq!(composite.message(), "fault");
    }

    #[test]
    fn to_outcome_collapses_verdict_and_authorization() {
        let composite = composite(
            AggregationMode::AllMustSucceed,
            AuthorizationSource::LastSucceeded,
            vec![ok("create_payment", Some("7")), ok("authorize", Some("7"))],
        );

        let outcome = composite.to_outcome();

        assert!(outcome.succeeded());
        assert_eq!(outcome.authorization(), Some("7"));
    }

    #[test]
    fn lookup_by_step_name() {
        let composite = composite(
            AggregationMode::AllMustSucceed,
            AuthorizationSource::LastSucceeded,
            vec![ok("create_token", Some("tok")), ok("create_payment", Some("9"))],
        );

        let token = composite.outcome("create_token").and_then(Outcome::authorization);

        assert_eq!(token, Some("tok"));
        assert!(composite.outcome("capture").is_none());
        assert_eq!(composite.into_outcomes().len(), 2);
    }
}

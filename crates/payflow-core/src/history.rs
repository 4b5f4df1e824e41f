use crate::composite::StepResult;
use crate::outcome::Outcome;

/// Read-only view of the outcomes accepted so far, handed to each step.
///
/// Steps read earlier results (typically a created resource id) from here
/// instead of from captured mutable state.
#[derive(Debug, Clone, Copy)]
pub struct History<'h> {
    head: Option<&'h StepResult>,
    tail: &'h [StepResult],
}

impl<'h> History<'h> {
    pub(crate) fn empty() -> Self {
        Self {
            head: None,
            tail: &[],
        }
    }

    pub(crate) fn new(head: &'h StepResult, tail: &'h [StepResult]) -> Self {
        Self {
            head: Some(head),
            tail,
        }
    }

    /// The last accepted outcome, `None` for the first step.
    #[must_use]
    pub fn last(&self) -> Option<&'h Outcome> {
        self.tail
            .last()
            .or(self.head)
            .map(StepResult::outcome)
    }

    /// The authorization of the last accepted outcome.
    #[must_use]
    pub fn last_authorization(&self) -> Option<&'h str> {
        self.last().and_then(Outcome::authorization)
    }

    /// The outcome of the most recent step registered under `name`.
    #[must_use]
    pub fn outcome(&self, name: &str) -> Option<&'h Outcome> {
        self.tail
            .iter()
            .rev()
            .chain(self.head)
            .find(|result| result.name() == name)
            .map(StepResult::outcome)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.head.is_some()) + self.tail.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn results(&self) -> impl Iterator<Item = &'h StepResult> + use<'h> {
        self.head.into_iter().chain(self.tail.iter())
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &'h Outcome> + use<'h> {
        self.results().map(StepResult::outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Params;
    use crate::sequencer::FailurePolicy;

    fn result(name: &'static str, authorization: &str) -> StepResult {
        StepResult::new(
            name,
            FailurePolicy::Halt,
            false,
            Outcome::success(Params::new()).with_authorization(authorization),
        )
    }

    #[test]
    fn empty_history_has_nothing_to_offer() {
        let history = History::empty();

        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
        assert!(history.last().is_none());
        assert!(history.last_authorization().is_none());
    }

    #[test]
    fn last_authorization_comes_from_latest_result() {
        let head = result("create_payment", "42");
        let tail = [result("authorize_payment", "43")];

        let history = History::new(&head, &tail);

        assert_eq!(history.len(), 2);
        assert_eq!(history.last_authorization(), Some("43"));
        assert_eq!(history.outcomes().count(), 2);
    }

    #[test]
    fn outcome_by_name_prefers_most_recent() {
        let head = result("poll", "1");
        let tail = [result("poll", "2"), result("capture", "3")];

        let history = History::new(&head, &tail);

        assert_eq!(
            history.outcome("poll").and_then(Outcome::authorization),
            Some("2")
        );
        assert!(history.outcome("void").is_none());
    }
}

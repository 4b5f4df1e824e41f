use crate::outcome::{Outcome, Params};

/// Result of looking up a remote resource that may legitimately be absent.
///
/// Absence is an expected business answer, not a fault, so lookups return
/// this instead of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::NotFound => Lookup::NotFound,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }

    /// Turn the lookup into the outcome of an existence check: `found`
    /// builds the successful outcome, absence becomes a failed outcome with
    /// the given message.
    pub fn into_outcome(
        self,
        found: impl FnOnce(T) -> Outcome,
        not_found_message: impl Into<String>,
    ) -> Outcome {
        match self {
            Self::Found(value) => found(value),
            Self::NotFound => Outcome::failure(not_found_message, Params::new()),
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Found(value),
            None => Self::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_maps_to_successful_outcome() {
        let lookup = Lookup::Found("cus_1");

        let outcome = lookup.into_outcome(
            |id| Outcome::success(Params::new()).with_authorization(id),
            "missing",
        );

        assert!(outcome.succeeded());
        assert_eq!(outcome.authorization(), Some("cus_1"));
    }

    #[test]
    fn not_found_maps_to_failed_outcome_with_message() {
        let lookup: Lookup<&str> = Lookup::NotFound;

        let outcome = lookup.into_outcome(|_| unreachable!(), "Customer 'x' not found");

        assert!(!outcome.succeeded());
        assert_eq!(outcome.message(), "Customer 'x' not found");
    }

    #[test]
    fn converts_from_option() {
        assert!(Lookup::from(Some(1)).is_found());
        assert_eq!(Lookup::<i32>::from(None), Lookup::NotFound);
        assert_eq!(Lookup::Found(2).map(|v| v * 2).into_option(), Some(4));
    }
}

//! Integration tests for halting on the first failure that matters.

use std::cell::Cell;

use payflow_core::{
    AggregationMode, CompositeOutcome, History, Outcome, Params, StepFault, StepSequencer,
    StepStatus,
};

fn ok(authorization: &str) -> Result<Outcome, StepFault> {
    Ok(Outcome::success(Params::new()).with_authorization(authorization))
}

fn declined(message: &str) -> Result<Outcome, StepFault> {
    Ok(Outcome::failure(message, Params::new()))
}

fn counting_step<'c>(
    position: usize,
    failing_at: usize,
    calls: &'c Cell<usize>,
) -> impl FnOnce(&History<'_>) -> Result<Outcome, StepFault> + 'c {
    move |_| {
        calls.set(calls.get() + 1);
        if position == failing_at {
            declined("declined")
        } else {
            ok(&position.to_string())
        }
    }
}

/// Five step sequence where step `failing_at` (1-based) declines.
fn run_with_failure_at(failing_at: usize, calls: &Cell<usize>) -> CompositeOutcome {
    StepSequencer::new(AggregationMode::AllMustSucceed)
        .step("one", counting_step(1, failing_at, calls))
        .step("two", counting_step(2, failing_at, calls))
        .step("three", counting_step(3, failing_at, calls))
        .step("four", counting_step(4, failing_at, calls))
        .step("five", counting_step(5, failing_at, calls))
        .run()
}

#[test]
fn failure_at_step_k_keeps_exactly_k_outcomes() {
    for k in 1..=5 {
        let calls = Cell::new(0);

        let composite = run_with_failure_at(k, &calls);

        assert_eq!(composite.len(), k, "outcomes for failure at {k}");
        assert_eq!(calls.get(), k, "invocations for failure at {k}");
        assert!(!composite.succeeded());
        assert_eq!(composite.message(), "declined");
        assert_eq!(composite.log().records().len(), k);
        assert_eq!(
            composite.log().records()[k - 1].status,
            StepStatus::Failed
        );
    }
}

#[test]
fn all_steps_succeeding_keeps_every_outcome() {
    let calls = Cell::new(0);

    let composite = run_with_failure_at(0, &calls);

    assert!(composite.succeeded());
    assert_eq!(composite.len(), 5);
    assert_eq!(calls.get(), 5);
    assert_eq!(composite.authorization(), Some("5"));
    assert_eq!(composite.primary().authorization(), Some("1"));
    assert_eq!(composite.last().authorization(), Some("5"));
}

#[test]
fn first_step_failure_leaves_single_outcome() {
    let calls = Cell::new(0);

    let composite = run_with_failure_at(1, &calls);

    assert_eq!(composite.len(), 1);
    assert!(!composite.succeeded());
    assert_eq!(composite.authorization(), None);
}

#[test]
fn ignored_failure_does_not_halt_or_fail_composite() {
    let after = Cell::new(false);

    let composite = StepSequencer::new(AggregationMode::AllMustSucceed)
        .step("create", |_| ok("cus_1"))
        .cleanup_step("best_effort", |_| declined("already attached"))
        .step("attach", |_| {
            after.set(true);
            ok("cus_1")
        })
        .run();

    assert!(after.get());
    assert_eq!(composite.len(), 3);
    assert!(composite.succeeded());
}

#[test]
fn rerunning_fresh_sequencer_yields_identical_outcomes() {
    let build = || {
        StepSequencer::new(AggregationMode::AllMustSucceed)
            .step("create", |_| ok("cus_1"))
            .step("attach", |history| {
                let customer = history.last_authorization().unwrap_or_default();
                Ok(Outcome::success(Params::new())
                    .with_param("customer_vault_token", customer)
                    .with_authorization(customer))
            })
            .step("charge", |_| declined("Card declined (card_declined)"))
    };

    let first = build().run();
    let second = build().run();

    assert_eq!(first.succeeded(), second.succeeded());
    assert_eq!(first.message(), second.message());
    assert_eq!(first.authorization(), second.authorization());
    assert_eq!(first.into_outcomes(), second.into_outcomes());
}

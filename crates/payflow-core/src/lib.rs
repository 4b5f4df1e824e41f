//! Orchestration primitives for multi-call payment transactions.
//!
//! A single business operation against a payment provider (store a card,
//! complete a purchase) often takes several dependent remote calls. This
//! crate runs those calls as an ordered sequence of steps, stops at the first
//! failure that matters, waits for asynchronously settled provider state with
//! a bounded poll, and folds every call's result into one composite verdict.

mod audit;
mod composite;
mod error;
mod history;
mod lookup;
mod outcome;
mod poller;
mod sequencer;
mod sleep;

pub use audit::{SequenceLog, StepRecord, StepStatus};
pub use composite::{AggregationMode, AuthorizationSource, CompositeOutcome, StepResult};
pub use error::{CoreError, Result, StepFault};
pub use history::History;
pub use lookup::Lookup;
pub use outcome::{ErrorEntry, FAULT_DIAGNOSTIC, Outcome, Params, SUCCESS_MESSAGE};
pub use poller::{BoundedPoller, Polled};
pub use sequencer::{Empty, FailurePolicy, Ready, StepSequencer};
pub use sleep::{RecordingSleeper, Sleeper, ThreadSleeper};

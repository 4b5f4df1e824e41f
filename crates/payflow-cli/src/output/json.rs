use payflow_core::{CompositeOutcome, Outcome};
use serde::Serialize;

use super::OutputFormatter;
use crate::error::Result;

pub(crate) struct JsonFormatter;

#[derive(Serialize)]
struct Report<'a> {
    succeeded: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    authorization: Option<&'a str>,
    steps: Vec<StepReport<'a>>,
}

#[derive(Serialize)]
struct StepReport<'a> {
    name: &'a str,
    status: &'static str,
    faulted: bool,
    outcome: &'a Outcome,
}

impl<'a> Report<'a> {
    fn from_composite(composite: &'a CompositeOutcome) -> Self {
        let steps = composite
            .log()
            .records()
            .iter()
            .zip(composite.results())
            .map(|(record, result)| StepReport {
                name: result.name(),
                status: record.status.symbol(),
                faulted: result.faulted(),
                outcome: result.outcome(),
            })
            .collect();

        Self {
            succeeded: composite.succeeded(),
            message: composite.message(),
            authorization: composite.authorization(),
            steps,
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_composite(&self, composite: &CompositeOutcome) -> Result<String> {
        let mut rendered = serde_json::to_string_pretty(&Report::from_composite(composite))?;
        rendered.push('\n');
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use payflow_core::{AggregationMode, Params, StepFault, StepSequencer};
    use serde_json::Value;

    use super::*;

    #[test]
    fn renders_verdict_and_each_step() -> anyhow::Result<()> {
        let composite = StepSequencer::new(AggregationMode::FirstDetermines)
            .step("authorize", |_| {
                Ok(Outcome::success(Params::new()).with_authorization("42"))
            })
            .cleanup_step("void", |_| Ok(Outcome::failure("declined", Params::new())))
            .run();

        let rendered = JsonFormatter.format_composite(&composite)?;
        let report: Value = serde_json::from_str(&rendered)?;

        assert_eq!(report["succeeded"], true);
        assert_eq!(report["authorization"], "42");
        assert_eq!(report["steps"][0]["name"], "authorize");
        assert_eq!(report["steps"][1]["status"], "↷");
        assert_eq!(report["steps"][1]["outcome"]["message"], "declined");
        Ok(())
    }

    #[test]
    fn faulted_step_is_flagged() -> anyhow::Result<()> {
        let composite = StepSequencer::new(AggregationMode::AllMustSucceed)
            .step("create_payment", |_| Err(StepFault::transport("connection refused")))
            .run();

        let report: Value = serde_json::from_str(&JsonFormatter.format_composite(&composite)?)?;

        assert_eq!(report["succeeded"], false);
        assert_eq!(report["steps"][0]["faulted"], true);
        assert!(report.get("authorization").is_none());
        Ok(())
    }
}

use std::fmt::Write;

use payflow_core::CompositeOutcome;

use super::OutputFormatter;
use crate::error::Result;

pub(crate) struct PlainTextFormatter;

impl PlainTextFormatter {
    fn format_steps(output: &mut String, composite: &CompositeOutcome) {
        output.push_str("Steps:\n");
        for (record, result) in composite.log().records().iter().zip(composite.results()) {
            let outcome = result.outcome();
            let _ = write!(
                output,
                "  {} {}: {}",
                record.status.symbol(),
                record.name,
                outcome.message()
            );
            if let Some(authorization) = outcome.authorization() {
                let _ = write!(output, " [{authorization}]");
            }
            output.push('\n');
        }
    }

    fn format_verdict(output: &mut String, composite: &CompositeOutcome) {
        if composite.succeeded() {
            output.push_str("\n✓ Transaction succeeded");
            if let Some(authorization) = composite.authorization() {
                let _ = write!(output, " (authorization: {authorization})");
            }
            output.push('\n');
        } else {
            let _ = writeln!(output, "\n✗ Transaction failed: {}", composite.message());
        }
    }
}

impl OutputFormatter for PlainTextFormatter {
    fn format_composite(&self, composite: &CompositeOutcome) -> Result<String> {
        let mut output = String::new();
        Self::format_steps(&mut output, composite);
        Self::format_verdict(&mut output, composite);
        Ok(output)
    }
}

use payflow_core::CompositeOutcome;

use crate::error::Result;

pub(crate) trait OutputFormatter {
    fn format_composite(&self, composite: &CompositeOutcome) -> Result<String>;
}

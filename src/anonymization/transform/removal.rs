//! Removal transformer

use super::{CellInput, Transformer};
use crate::anonymization::technique::TechniqueId;

/// Sentinel written by `remove`
pub const REMOVED: &str = "[REMOVED]";

/// Sentinel and type-marker replacement
pub struct Removal;

impl Transformer for Removal {
    fn apply(&self, input: &CellInput<'_>) -> Result<String, String> {
        Ok(match input.technique.id {
            TechniqueId::Redact => format!("[{}]", input.context.pii_type.label()),
            _ => REMOVED.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::config::AnonymizationOptions;
    use crate::anonymization::models::PiiType;
    use crate::anonymization::technique::TechniqueRegistry;
    use crate::anonymization::transform::TransformContext;

    fn run(technique: TechniqueId, pii_type: PiiType) -> String {
        let options = AnonymizationOptions::default();
        let context = TransformContext::new(0, None, "f", pii_type);
        Removal
            .apply(&CellInput {
                value: "secret",
                technique: TechniqueRegistry::technique(technique),
                options: &options,
                mask_pattern: None,
                context: &context,
            })
            .unwrap()
    }

    #[test]
    fn test_remove_and_redact() {
        assert_eq!(run(TechniqueId::Remove, PiiType::Email), "[REMOVED]");
        assert_eq!(run(TechniqueId::Redact, PiiType::Email), "[EMAIL]");
        assert_eq!(run(TechniqueId::Redact, PiiType::Name), "[PERSON]");
    }
}

use crate::error::{DeskError, DeskResult};
use serde::{Deserialize, Serialize};

/// All caller-issued instructions the desk accepts.
/// Variants are added over time, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DeskCommand {
    /// `filters` is kept raw so that its shape is validated by the
    /// update path itself, with the same error as a direct call.
    UpdateFilters { filters: serde_json::Value },
    ClearFilters,
    Regenerate,
    /// Run one feed step immediately.
    Perturb,
}

impl DeskCommand {
    pub fn from_json(line: &str) -> DeskResult<Self> {
        serde_json::from_str(line).map_err(|e| DeskError::MalformedCommand {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_commands() {
        assert_eq!(
            DeskCommand::from_json(r#"{"cmd":"regenerate"}"#).unwrap(),
            DeskCommand::Regenerate
        );
        let cmd = DeskCommand::from_json(
            r#"{"cmd":"update_filters","filters":{"riskLevel":["Low"]}}"#,
        )
        .unwrap();
        assert!(matches!(cmd, DeskCommand::UpdateFilters { .. }));
    }

    #[test]
    fn unknown_command_is_malformed() {
        let err = DeskCommand::from_json(r#"{"cmd":"launch"}"#).unwrap_err();
        assert!(matches!(err, DeskError::MalformedCommand { .. }));
    }
}

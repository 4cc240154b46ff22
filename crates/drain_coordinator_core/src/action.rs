use serde::{Deserialize, Serialize};

/// Outcome of one drain evaluation. Returned to the invoking platform
/// for observability; never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DrainAction {
    Abort,
    Drain,
    Wait,
    Continue,
}

impl DrainAction {
    pub fn as_str(self) -> &'static str {
        match self {
            DrainAction::Abort => "abort",
            DrainAction::Drain => "drain",
            DrainAction::Wait => "wait",
            DrainAction::Continue => "continue",
        }
    }
}

/// The single-field invocation result consumed by the platform and by
/// tests.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DrainResponse {
    pub action: DrainAction,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn response_serializes_to_single_action_field() {
        let response = DrainResponse {
            action: DrainAction::Drain,
        };
        assert_eq!(
            serde_json::to_value(response).expect("response should serialize"),
            json!({"action": "drain"})
        );
    }

    #[test]
    fn action_names_match_wire_values() {
        for action in [
            DrainAction::Abort,
            DrainAction::Drain,
            DrainAction::Wait,
            DrainAction::Continue,
        ] {
            assert_eq!(
                serde_json::to_value(action).expect("action should serialize"),
                json!(action.as_str())
            );
        }
    }
}

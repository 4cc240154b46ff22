use serde::Deserialize;
use serde_json::Value;

/// The only lifecycle transition this coordinator acts on. Everything
/// else is filtered out before any AWS call is made.
pub const TERMINATING_TRANSITION: &str = "autoscaling:EC2_INSTANCE_TERMINATING";

/// EC2 tag key that records which ECS cluster an instance registered
/// with. An instance missing this tag is a deployment defect.
pub const CLUSTER_NAME_TAG_KEY: &str = "ecs:cluster:name";

/// Result reported to the Auto Scaling group once the instance has
/// fully drained.
pub const LIFECYCLE_RESULT_CONTINUE: &str = "CONTINUE";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
struct SnsEnvelope {
    #[serde(rename = "Records")]
    records: Vec<SnsRecord>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
struct SnsRecord {
    #[serde(rename = "Sns")]
    sns: SnsEntry,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
struct SnsEntry {
    #[serde(rename = "Message")]
    message: String,
    #[serde(rename = "TopicArn")]
    topic_arn: String,
}

/// Inner lifecycle hook payload carried in the SNS message body.
///
/// Every field is optional at parse time: only `LifecycleTransition`
/// is consulted before the transition filter, and the remaining fields
/// are pulled through fallible accessors once the filter passes.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LifecycleNotification {
    #[serde(rename = "LifecycleTransition")]
    pub lifecycle_transition: Option<String>,
    #[serde(rename = "EC2InstanceId")]
    pub ec2_instance_id: Option<String>,
    #[serde(rename = "AutoScalingGroupName")]
    pub auto_scaling_group_name: Option<String>,
    #[serde(rename = "LifecycleHookName")]
    pub lifecycle_hook_name: Option<String>,
}

impl LifecycleNotification {
    pub fn transition(&self) -> Option<&str> {
        self.lifecycle_transition.as_deref()
    }

    pub fn instance_id(&self) -> Result<&str, ContractError> {
        self.ec2_instance_id
            .as_deref()
            .ok_or(ContractError::MissingField("EC2InstanceId"))
    }

    pub fn auto_scaling_group_name(&self) -> Result<&str, ContractError> {
        self.auto_scaling_group_name
            .as_deref()
            .ok_or(ContractError::MissingField("AutoScalingGroupName"))
    }

    pub fn lifecycle_hook_name(&self) -> Result<&str, ContractError> {
        self.lifecycle_hook_name
            .as_deref()
            .ok_or(ContractError::MissingField("LifecycleHookName"))
    }
}

/// One decoded inbound trigger, discarded at the end of the invocation.
///
/// `raw_message` keeps the message body exactly as it arrived so a
/// re-publish carries a byte-identical copy rather than a re-serialized
/// one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNotification {
    pub topic_arn: String,
    pub raw_message: String,
    pub notification: LifecycleNotification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    MalformedEnvelope(String),
    MalformedMessage(String),
    MissingField(&'static str),
}

impl std::fmt::Display for ContractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractError::MalformedEnvelope(message) => {
                write!(f, "malformed notification envelope: {message}")
            }
            ContractError::MalformedMessage(message) => {
                write!(f, "malformed lifecycle message: {message}")
            }
            ContractError::MissingField(field) => {
                write!(f, "lifecycle message is missing required field {field}")
            }
        }
    }
}

impl std::error::Error for ContractError {}

/// Decodes the SNS envelope of a Lambda event down to the first
/// record's lifecycle payload.
pub fn parse_notification(event: Value) -> Result<ParsedNotification, ContractError> {
    let envelope: SnsEnvelope = serde_json::from_value(event)
        .map_err(|error| ContractError::MalformedEnvelope(error.to_string()))?;

    let record = envelope
        .records
        .into_iter()
        .next()
        .ok_or_else(|| ContractError::MalformedEnvelope("event carries no records".to_string()))?;

    let notification: LifecycleNotification = serde_json::from_str(&record.sns.message)
        .map_err(|error| ContractError::MalformedMessage(error.to_string()))?;

    Ok(ParsedNotification {
        topic_arn: record.sns.topic_arn,
        raw_message: record.sns.message,
        notification,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn termination_event(message: &str) -> Value {
        json!({
            "Records": [
                {
                    "Sns": {
                        "Message": message,
                        "TopicArn": "arn:aws:sns:eu-west-1:123456789012:instance-drain",
                        "Subject": "Auto Scaling: lifecycle action"
                    }
                }
            ]
        })
    }

    #[test]
    fn parses_termination_notice() {
        let message = json!({
            "LifecycleTransition": "autoscaling:EC2_INSTANCE_TERMINATING",
            "EC2InstanceId": "i-0abc",
            "AutoScalingGroupName": "asg-prod",
            "LifecycleHookName": "drain-hook",
        })
        .to_string();

        let parsed = parse_notification(termination_event(&message)).expect("event should parse");

        assert_eq!(
            parsed.topic_arn,
            "arn:aws:sns:eu-west-1:123456789012:instance-drain"
        );
        assert_eq!(parsed.raw_message, message);
        assert_eq!(parsed.notification.transition(), Some(TERMINATING_TRANSITION));
        assert_eq!(parsed.notification.instance_id().unwrap(), "i-0abc");
        assert_eq!(
            parsed.notification.auto_scaling_group_name().unwrap(),
            "asg-prod"
        );
        assert_eq!(
            parsed.notification.lifecycle_hook_name().unwrap(),
            "drain-hook"
        );
    }

    #[test]
    fn tolerates_unknown_message_fields() {
        let message = json!({
            "LifecycleTransition": "autoscaling:EC2_INSTANCE_TERMINATING",
            "EC2InstanceId": "i-0abc",
            "LifecycleActionToken": "4a1b-deadbeef",
            "NotificationMetadata": "{}",
        })
        .to_string();

        let parsed = parse_notification(termination_event(&message)).expect("event should parse");
        assert_eq!(parsed.notification.instance_id().unwrap(), "i-0abc");
    }

    #[test]
    fn rejects_event_without_records() {
        let error = parse_notification(json!({"Records": []})).expect_err("event should fail");
        assert_eq!(
            error,
            ContractError::MalformedEnvelope("event carries no records".to_string())
        );
    }

    #[test]
    fn rejects_event_without_sns_envelope() {
        let error =
            parse_notification(json!({"detail": "not-sns"})).expect_err("event should fail");
        assert!(matches!(error, ContractError::MalformedEnvelope(_)));
    }

    #[test]
    fn rejects_non_json_message_body() {
        let error = parse_notification(termination_event("not json"))
            .expect_err("message body should fail to parse");
        assert!(matches!(error, ContractError::MalformedMessage(_)));
    }

    #[test]
    fn accessors_report_the_wire_field_name() {
        let message = json!({
            "LifecycleTransition": "autoscaling:EC2_INSTANCE_TERMINATING",
        })
        .to_string();

        let parsed = parse_notification(termination_event(&message)).expect("event should parse");
        assert_eq!(
            parsed.notification.instance_id().unwrap_err(),
            ContractError::MissingField("EC2InstanceId")
        );
        assert_eq!(
            parsed.notification.lifecycle_hook_name().unwrap_err(),
            ContractError::MissingField("LifecycleHookName")
        );
    }
}

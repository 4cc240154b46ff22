/// Registration state of a container instance within its cluster.
///
/// Only `ACTIVE` and `DRAINING` drive decisions; anything else
/// (REGISTERING, DEREGISTERING, ...) is carried verbatim and treated
/// as "already out of active scheduling".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceStatus {
    Active,
    Draining,
    Other(String),
}

impl InstanceStatus {
    pub fn from_label(label: &str) -> Self {
        match label {
            "ACTIVE" => InstanceStatus::Active,
            "DRAINING" => InstanceStatus::Draining,
            other => InstanceStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InstanceStatus::Active => "ACTIVE",
            InstanceStatus::Draining => "DRAINING",
            InstanceStatus::Other(label) => label,
        }
    }
}

/// A live view of one cluster membership record, fetched fresh from
/// ECS on every invocation and never cached across invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInstance {
    pub container_instance_arn: String,
    pub ec2_instance_id: String,
    pub status: InstanceStatus,
    pub running_tasks_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_status_labels() {
        assert_eq!(InstanceStatus::from_label("ACTIVE"), InstanceStatus::Active);
        assert_eq!(
            InstanceStatus::from_label("DRAINING"),
            InstanceStatus::Draining
        );
    }

    #[test]
    fn preserves_unknown_status_labels() {
        let status = InstanceStatus::from_label("DEREGISTERING");
        assert_eq!(status, InstanceStatus::Other("DEREGISTERING".to_string()));
        assert_eq!(status.as_str(), "DEREGISTERING");
    }
}

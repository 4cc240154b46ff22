use drain_coordinator_core::action::{DrainAction, DrainResponse};
use drain_coordinator_core::contract::{
    parse_notification, ContractError, CLUSTER_NAME_TAG_KEY, TERMINATING_TRANSITION,
};
use drain_coordinator_core::instance::{ContainerInstance, InstanceStatus};
use serde_json::{json, Value};

use crate::adapters::cluster::ContainerInstanceApi;
use crate::adapters::lifecycle::LifecycleActionCompleter;
use crate::adapters::notify::TopicPublisher;
use crate::adapters::tags::ClusterTagSource;

/// External collaborators for one drain evaluation, injected so tests
/// can substitute capturing fakes for the AWS clients.
pub struct DrainDependencies<'a> {
    pub tags: &'a dyn ClusterTagSource,
    pub cluster: &'a dyn ContainerInstanceApi,
    pub lifecycle: &'a dyn LifecycleActionCompleter,
    pub topics: &'a dyn TopicPublisher,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainError {
    Contract(ContractError),
    ClusterTagNotFound { instance_id: String },
    NotAClusterMember { cluster: String, instance_id: String },
    Upstream { call: &'static str, message: String },
}

impl std::fmt::Display for DrainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrainError::Contract(error) => error.fmt(f),
            DrainError::ClusterTagNotFound { instance_id } => {
                write!(f, "instance {instance_id} carries no {CLUSTER_NAME_TAG_KEY} tag")
            }
            DrainError::NotAClusterMember {
                cluster,
                instance_id,
            } => {
                write!(f, "instance {instance_id} is not a member of cluster {cluster}")
            }
            DrainError::Upstream { call, message } => {
                write!(f, "{call} failed: {message}")
            }
        }
    }
}

impl std::error::Error for DrainError {}

impl From<ContractError> for DrainError {
    fn from(error: ContractError) -> Self {
        DrainError::Contract(error)
    }
}

/// Evaluates one lifecycle notification and performs at most one
/// mutating call plus, for non-terminal outcomes, one re-publish of the
/// inbound message.
///
/// Decision order, first match wins:
/// 1. transition absent or unsupported: abort, touch nothing.
/// 2. instance still ACTIVE: flip it to DRAINING, then re-publish.
/// 3. tasks still running: re-publish unchanged, mutate nothing.
/// 4. drained: complete the lifecycle action with CONTINUE. Terminal.
pub fn handle_lifecycle_event(
    event: Value,
    deps: &DrainDependencies<'_>,
) -> Result<DrainResponse, DrainError> {
    let parsed = parse_notification(event)?;

    match parsed.notification.transition() {
        Some(TERMINATING_TRANSITION) => {}
        transition => {
            log_decision(
                "aborted",
                json!({
                    "lifecycle_transition": transition,
                    "supported_transition": TERMINATING_TRANSITION,
                }),
            );
            return Ok(DrainResponse {
                action: DrainAction::Abort,
            });
        }
    }

    let instance_id = parsed.notification.instance_id()?;

    let cluster = deps
        .tags
        .cluster_for_instance(instance_id)
        .map_err(|message| DrainError::Upstream {
            call: "ec2:DescribeTags",
            message,
        })?
        .ok_or_else(|| DrainError::ClusterTagNotFound {
            instance_id: instance_id.to_string(),
        })?;

    let instance = lookup_container_instance(deps.cluster, &cluster, instance_id)?;

    if instance.status == InstanceStatus::Active {
        deps.cluster
            .begin_draining(&cluster, &instance.container_instance_arn)
            .map_err(|message| DrainError::Upstream {
                call: "ecs:UpdateContainerInstancesState",
                message,
            })?;

        let subject = format!("Draining tasks from instance {instance_id}");
        log_decision(
            "draining",
            json!({
                "cluster": cluster,
                "ec2_instance_id": instance_id,
                "container_instance_arn": instance.container_instance_arn,
            }),
        );

        // Only after the mutation succeeds; a failed state change must
        // not schedule a re-check of progress that never started.
        deps.topics
            .publish(&parsed.topic_arn, &subject, &parsed.raw_message)
            .map_err(|message| DrainError::Upstream {
                call: "sns:Publish",
                message,
            })?;

        return Ok(DrainResponse {
            action: DrainAction::Drain,
        });
    }

    if instance.running_tasks_count > 0 {
        let subject = format!(
            "Waiting for {} tasks to drain from instance {instance_id}",
            instance.running_tasks_count
        );
        log_decision(
            "waiting",
            json!({
                "cluster": cluster,
                "ec2_instance_id": instance_id,
                "status": instance.status.as_str(),
                "running_tasks_count": instance.running_tasks_count,
            }),
        );

        deps.topics
            .publish(&parsed.topic_arn, &subject, &parsed.raw_message)
            .map_err(|message| DrainError::Upstream {
                call: "sns:Publish",
                message,
            })?;

        return Ok(DrainResponse {
            action: DrainAction::Wait,
        });
    }

    let hook_name = parsed.notification.lifecycle_hook_name()?;
    let group_name = parsed.notification.auto_scaling_group_name()?;
    deps.lifecycle
        .complete_with_continue(hook_name, group_name, instance_id)
        .map_err(|message| DrainError::Upstream {
            call: "autoscaling:CompleteLifecycleAction",
            message,
        })?;

    log_decision(
        "lifecycle_completed",
        json!({
            "cluster": cluster,
            "ec2_instance_id": instance_id,
            "lifecycle_hook_name": hook_name,
            "auto_scaling_group_name": group_name,
        }),
    );

    Ok(DrainResponse {
        action: DrainAction::Continue,
    })
}

fn lookup_container_instance(
    api: &dyn ContainerInstanceApi,
    cluster: &str,
    instance_id: &str,
) -> Result<ContainerInstance, DrainError> {
    let arns = api
        .list_container_instance_arns(cluster)
        .map_err(|message| DrainError::Upstream {
            call: "ecs:ListContainerInstances",
            message,
        })?;

    let instances =
        api.describe_container_instances(cluster, &arns)
            .map_err(|message| DrainError::Upstream {
                call: "ecs:DescribeContainerInstances",
                message,
            })?;

    instances
        .into_iter()
        .find(|instance| instance.ec2_instance_id == instance_id)
        .ok_or_else(|| DrainError::NotAClusterMember {
            cluster: cluster.to_string(),
            instance_id: instance_id.to_string(),
        })
}

fn log_decision(event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": "drain_coordinator",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

use aws_sdk_ec2::types::Filter;
use aws_sdk_ecs::types::ContainerInstanceStatus;
use drain_coordinator_core::action::DrainResponse;
use drain_coordinator_core::contract::{CLUSTER_NAME_TAG_KEY, LIFECYCLE_RESULT_CONTINUE};
use drain_coordinator_core::instance::{ContainerInstance, InstanceStatus};
use drain_coordinator_lambda::adapters::cluster::ContainerInstanceApi;
use drain_coordinator_lambda::adapters::lifecycle::LifecycleActionCompleter;
use drain_coordinator_lambda::adapters::notify::TopicPublisher;
use drain_coordinator_lambda::adapters::tags::ClusterTagSource;
use drain_coordinator_lambda::handlers::drain::{handle_lifecycle_event, DrainDependencies};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};

struct Ec2ClusterTagSource {
    ec2_client: aws_sdk_ec2::Client,
}

impl ClusterTagSource for Ec2ClusterTagSource {
    fn cluster_for_instance(&self, instance_id: &str) -> Result<Option<String>, String> {
        let client = self.ec2_client.clone();
        let resource_id = instance_id.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = client
                    .describe_tags()
                    .filters(
                        Filter::builder()
                            .name("resource-id")
                            .values(resource_id)
                            .build(),
                    )
                    .filters(Filter::builder().name("key").values(CLUSTER_NAME_TAG_KEY).build())
                    .send()
                    .await
                    .map_err(|error| format!("failed to describe instance tags: {error}"))?;

                Ok(response
                    .tags()
                    .first()
                    .and_then(|tag| tag.value().map(str::to_string)))
            })
        })
    }
}

struct EcsContainerInstanceApi {
    ecs_client: aws_sdk_ecs::Client,
}

impl ContainerInstanceApi for EcsContainerInstanceApi {
    fn list_container_instance_arns(&self, cluster: &str) -> Result<Vec<String>, String> {
        let client = self.ecs_client.clone();
        let cluster_name = cluster.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = client
                    .list_container_instances()
                    .cluster(cluster_name)
                    .send()
                    .await
                    .map_err(|error| format!("failed to list container instances: {error}"))?;

                Ok(response.container_instance_arns().to_vec())
            })
        })
    }

    fn describe_container_instances(
        &self,
        cluster: &str,
        container_instance_arns: &[String],
    ) -> Result<Vec<ContainerInstance>, String> {
        let client = self.ecs_client.clone();
        let cluster_name = cluster.to_string();
        let arns = container_instance_arns.to_vec();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = client
                    .describe_container_instances()
                    .cluster(cluster_name)
                    .set_container_instances(Some(arns))
                    .send()
                    .await
                    .map_err(|error| format!("failed to describe container instances: {error}"))?;

                Ok(response
                    .container_instances()
                    .iter()
                    .map(|instance| ContainerInstance {
                        container_instance_arn: instance
                            .container_instance_arn()
                            .unwrap_or_default()
                            .to_string(),
                        ec2_instance_id: instance.ec2_instance_id().unwrap_or_default().to_string(),
                        status: InstanceStatus::from_label(instance.status().unwrap_or_default()),
                        running_tasks_count: i64::from(instance.running_tasks_count()),
                    })
                    .collect())
            })
        })
    }

    fn begin_draining(&self, cluster: &str, container_instance_arn: &str) -> Result<(), String> {
        let client = self.ecs_client.clone();
        let cluster_name = cluster.to_string();
        let arn = container_instance_arn.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .update_container_instances_state()
                    .cluster(cluster_name)
                    .container_instances(arn)
                    .status(ContainerInstanceStatus::Draining)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to set container instance draining: {error}"))
            })
        })
    }
}

struct AsgLifecycleActionCompleter {
    autoscaling_client: aws_sdk_autoscaling::Client,
}

impl LifecycleActionCompleter for AsgLifecycleActionCompleter {
    fn complete_with_continue(
        &self,
        lifecycle_hook_name: &str,
        auto_scaling_group_name: &str,
        instance_id: &str,
    ) -> Result<(), String> {
        let client = self.autoscaling_client.clone();
        let hook_name = lifecycle_hook_name.to_string();
        let group_name = auto_scaling_group_name.to_string();
        let instance = instance_id.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .complete_lifecycle_action()
                    .lifecycle_hook_name(hook_name)
                    .auto_scaling_group_name(group_name)
                    .lifecycle_action_result(LIFECYCLE_RESULT_CONTINUE)
                    .instance_id(instance)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to complete lifecycle action: {error}"))
            })
        })
    }
}

struct SnsTopicPublisher {
    sns_client: aws_sdk_sns::Client,
}

impl TopicPublisher for SnsTopicPublisher {
    fn publish(&self, topic_arn: &str, subject: &str, body: &str) -> Result<(), String> {
        let client = self.sns_client.clone();
        let target_topic_arn = topic_arn.to_string();
        let message_subject = subject.to_string();
        let message_body = body.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .publish()
                    .topic_arn(target_topic_arn)
                    .subject(message_subject)
                    .message(message_body)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to re-publish notification: {error}"))
            })
        })
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<DrainResponse, Error> {
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    let tags = Ec2ClusterTagSource {
        ec2_client: aws_sdk_ec2::Client::new(&config),
    };
    let cluster = EcsContainerInstanceApi {
        ecs_client: aws_sdk_ecs::Client::new(&config),
    };
    let lifecycle = AsgLifecycleActionCompleter {
        autoscaling_client: aws_sdk_autoscaling::Client::new(&config),
    };
    let topics = SnsTopicPublisher {
        sns_client: aws_sdk_sns::Client::new(&config),
    };

    handle_lifecycle_event(
        event.payload,
        &DrainDependencies {
            tags: &tags,
            cluster: &cluster,
            lifecycle: &lifecycle,
            topics: &topics,
        },
    )
    .map_err(|error| {
        eprintln!(
            "{}",
            json!({
                "component": "drain_lambda",
                "level": "error",
                "event": "invocation_failed",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "details": { "message": error.to_string() },
            })
        );
        Error::from(error)
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}

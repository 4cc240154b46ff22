use drain_coordinator_core::instance::ContainerInstance;

/// Cluster membership reads and the single DRAINING mutation.
///
/// `begin_draining` must be idempotent on the provider side: asking an
/// already-DRAINING instance to drain is a tolerable no-op, which is
/// what keeps duplicate deliveries safe.
pub trait ContainerInstanceApi {
    fn list_container_instance_arns(&self, cluster: &str) -> Result<Vec<String>, String>;

    fn describe_container_instances(
        &self,
        cluster: &str,
        container_instance_arns: &[String],
    ) -> Result<Vec<ContainerInstance>, String>;

    fn begin_draining(&self, cluster: &str, container_instance_arn: &str) -> Result<(), String>;
}

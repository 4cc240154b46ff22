/// Resolves which cluster an instance is tagged as belonging to.
///
/// `Ok(None)` means the instance carries no cluster tag at all; the
/// handler turns that into a distinct configuration-defect error.
pub trait ClusterTagSource {
    fn cluster_for_instance(&self, instance_id: &str) -> Result<Option<String>, String>;
}

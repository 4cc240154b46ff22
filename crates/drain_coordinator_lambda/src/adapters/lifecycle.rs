/// Reports a drained instance back to its scaling group so termination
/// can proceed. Must be safe to call more than once for the same
/// instance.
pub trait LifecycleActionCompleter {
    fn complete_with_continue(
        &self,
        lifecycle_hook_name: &str,
        auto_scaling_group_name: &str,
        instance_id: &str,
    ) -> Result<(), String>;
}

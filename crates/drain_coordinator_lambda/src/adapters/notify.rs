/// Schedules a later re-evaluation by re-publishing the original
/// message to the topic it arrived on. Fire-and-forget; the messaging
/// layer's redelivery cadence is the only timer this system has.
pub trait TopicPublisher {
    fn publish(&self, topic_arn: &str, subject: &str, body: &str) -> Result<(), String>;
}

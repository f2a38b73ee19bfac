use std::time::Duration;

use actix_rt::time::timeout;

use crate::models::ChatMessage;
use crate::websocket::hub::{ChannelHandle, Collector};

/// Waits for the first message in `channel` accepted by `predicate`.
///
/// Only messages arriving after the call are considered; rejected ones are
/// dropped. Resolves to `None` once `deadline` has elapsed.
pub async fn await_qualifying<F>(channel: &ChannelHandle, predicate: F, deadline: Duration) -> Option<ChatMessage>
where
    F: FnMut(&ChatMessage) -> bool,
{
    let collector = channel.collector();
    resolve(collector, predicate, deadline).await
}

/// Same as [`await_qualifying`] for a collector registered earlier.
pub async fn resolve<F>(mut collector: Collector, mut predicate: F, deadline: Duration) -> Option<ChatMessage>
where
    F: FnMut(&ChatMessage) -> bool,
{
    let first_match = async {
        while let Some(message) = collector.next().await {
            if predicate(&message) {
                return Some(message);
            }
        }
        None
    };
    timeout(deadline, first_match).await.ok().flatten()
}

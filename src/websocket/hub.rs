use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;
use log::{debug, info};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{ChatMessage, ServerMessage, User};
use crate::websocket::frames::{Frame, FrameStore};

/// Routing table between gateway connections, channels, and the games
/// waiting on channel traffic.
pub struct Hub {
    inner: Mutex<HubInner>,
    frames: FrameStore,
}

#[derive(Default)]
struct HubInner {
    connections: HashMap<String, UnboundedSender<ServerMessage>>,
    // channel id -> connection ids
    members: HashMap<String, Vec<String>>,
    collectors: HashMap<String, Vec<(u64, UnboundedSender<ChatMessage>)>>,
    next_collector: u64,
    users: HashMap<String, User>,
    // connection id -> identified user id
    identities: HashMap<String, String>,
}

impl HubInner {
    /// Drops a user from the directory once no connection speaks for them.
    fn release_user(&mut self, user_id: &str) {
        if !self.identities.values().any(|id| id == user_id) {
            self.users.remove(user_id);
        }
    }

    fn forget(&mut self, connection_id: &str) {
        self.connections.remove(connection_id);
        for members in self.members.values_mut() {
            members.retain(|id| id != connection_id);
        }
        self.members.retain(|_, members| !members.is_empty());
        if let Some(user_id) = self.identities.remove(connection_id) {
            self.release_user(&user_id);
        }
    }
}

impl Hub {
    pub fn new(frames: FrameStore) -> Self {
        Hub { inner: Mutex::new(HubInner::default()), frames }
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn connect(&self, connection_id: &str, outbox: UnboundedSender<ServerMessage>) {
        let mut inner = self.lock();
        inner.connections.insert(connection_id.to_string(), outbox);
        info!("Gateway connection registered: {} (total {})", connection_id, inner.connections.len());
    }

    pub fn disconnect(&self, connection_id: &str) {
        let mut inner = self.lock();
        inner.forget(connection_id);
        info!("Gateway connection removed: {} (total {})", connection_id, inner.connections.len());
    }

    pub fn join(&self, connection_id: &str, channel_id: &str) {
        let mut inner = self.lock();
        let members = inner.members.entry(channel_id.to_string()).or_default();
        if !members.iter().any(|id| id == connection_id) {
            members.push(connection_id.to_string());
        }
        debug!("Connection {} joined channel {}", connection_id, channel_id);
    }

    pub fn leave(&self, connection_id: &str, channel_id: &str) {
        let mut inner = self.lock();
        if let Some(members) = inner.members.get_mut(channel_id) {
            members.retain(|id| id != connection_id);
        }
    }

    pub fn register_user(&self, user: User) {
        self.lock().users.insert(user.id.clone(), user);
    }

    /// Binds a connection to the user it speaks for. The user stays in the
    /// directory while any connection is bound to them.
    pub fn identify(&self, connection_id: &str, user: User) {
        let mut inner = self.lock();
        let user_id = user.id.clone();
        inner.users.insert(user_id.clone(), user);
        if let Some(previous) = inner.identities.insert(connection_id.to_string(), user_id.clone()) {
            if previous != user_id {
                inner.release_user(&previous);
            }
        }
    }

    pub fn find_user(&self, user_id: &str) -> Option<User> {
        self.lock().users.get(user_id).cloned()
    }

    pub fn channel(self: &Arc<Self>, channel_id: &str) -> ChannelHandle {
        ChannelHandle { id: channel_id.to_string(), hub: Arc::clone(self) }
    }

    /// Hands an inbound message to every collector currently waiting on
    /// its channel. Collectors registered later never see it.
    pub fn publish(&self, message: &ChatMessage) {
        let mut inner = self.lock();
        if let Some(collectors) = inner.collectors.get_mut(&message.channel_id) {
            collectors.retain(|(_, tx)| tx.unbounded_send(message.clone()).is_ok());
        }
    }

    /// Pushes bot output to every connection joined to the channel.
    pub fn broadcast(&self, channel_id: &str, message: ServerMessage) {
        let mut inner = self.lock();
        let Some(members) = inner.members.get(channel_id).cloned() else {
            debug!("No connections joined to channel {}", channel_id);
            return;
        };
        let mut dead = Vec::new();
        for connection_id in members {
            if let Some(outbox) = inner.connections.get(&connection_id) {
                if outbox.unbounded_send(message.clone()).is_err() {
                    dead.push(connection_id);
                }
            }
        }
        for connection_id in dead {
            debug!("Dropping dead connection {}", connection_id);
            inner.forget(&connection_id);
        }
    }

    fn add_collector(&self, channel_id: &str) -> (u64, UnboundedReceiver<ChatMessage>) {
        let (tx, rx) = mpsc::unbounded();
        let mut inner = self.lock();
        let id = inner.next_collector;
        inner.next_collector += 1;
        inner.collectors.entry(channel_id.to_string()).or_default().push((id, tx));
        (id, rx)
    }

    fn remove_collector(&self, channel_id: &str, collector_id: u64) {
        let mut inner = self.lock();
        if let Some(collectors) = inner.collectors.get_mut(channel_id) {
            collectors.retain(|(id, _)| *id != collector_id);
            if collectors.is_empty() {
                inner.collectors.remove(channel_id);
            }
        }
    }

    pub fn collector_count(&self, channel_id: &str) -> usize {
        self.lock().collectors.get(channel_id).map_or(0, Vec::len)
    }
}

/// The view of one channel a command works through.
#[derive(Clone)]
pub struct ChannelHandle {
    id: String,
    hub: Arc<Hub>,
}

impl ChannelHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Posts plain text and returns the new message id.
    pub fn say(&self, content: impl Into<String>) -> String {
        let message_id = Uuid::new_v4().to_string();
        self.hub.broadcast(&self.id, ServerMessage::say(&self.id, message_id.clone(), content.into(), None));
        message_id
    }

    /// Posts text with an optional rendered frame attached.
    pub fn send(&self, content: impl Into<String>, frame: Option<Frame>) -> Result<String> {
        let attachment = frame.map(|frame| self.hub.frames.store(&frame)).transpose()?;
        let message_id = Uuid::new_v4().to_string();
        self.hub
            .broadcast(&self.id, ServerMessage::say(&self.id, message_id.clone(), content.into(), attachment));
        Ok(message_id)
    }

    /// Replies to a message by mentioning its author.
    pub fn reply(&self, to: &ChatMessage, content: &str) -> String {
        self.say(format!("{}, {}", to.author, content))
    }

    pub fn react(&self, to: &ChatMessage, emoji: &str) {
        self.hub.broadcast(&self.id, ServerMessage::reaction(&self.id, &to.id, emoji));
    }

    /// Starts collecting this channel's inbound messages from now on.
    pub fn collector(&self) -> Collector {
        let (id, rx) = self.hub.add_collector(&self.id);
        Collector { id, channel_id: self.id.clone(), rx, hub: Arc::clone(&self.hub) }
    }
}

/// A live subscription to a channel's inbound messages. Dropping it
/// unregisters it from the hub.
pub struct Collector {
    id: u64,
    channel_id: String,
    rx: UnboundedReceiver<ChatMessage>,
    hub: Arc<Hub>,
}

impl Collector {
    pub async fn next(&mut self) -> Option<ChatMessage> {
        self.rx.next().await
    }
}

impl Drop for Collector {
    fn drop(&mut self) {
        self.hub.remove_collector(&self.channel_id, self.id);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn hub() -> Arc<Hub> {
        Arc::new(Hub::new(FrameStore::new(std::env::temp_dir().join("hub-test-frames"), Duration::from_secs(600))))
    }

    fn message(channel: &str, content: &str) -> ChatMessage {
        ChatMessage {
            id: Uuid::new_v4().to_string(),
            channel_id: channel.to_string(),
            author: User::new("1", "alice"),
            content: content.to_string(),
        }
    }

    #[actix_rt::test]
    async fn collectors_only_see_their_channel() {
        let hub = hub();
        let mut general = hub.channel("general").collector();
        let _other = hub.channel("other").collector();

        hub.publish(&message("other", "ignored"));
        hub.publish(&message("general", "hello"));

        assert_eq!(general.next().await.unwrap().content, "hello");
    }

    #[test]
    fn dropping_a_collector_unregisters_it() {
        let hub = hub();
        let collector = hub.channel("general").collector();
        assert_eq!(hub.collector_count("general"), 1);
        drop(collector);
        assert_eq!(hub.collector_count("general"), 0);
    }

    #[actix_rt::test]
    async fn broadcast_reaches_joined_connections_only() {
        let hub = hub();
        let (tx_in, mut rx_in) = mpsc::unbounded();
        let (tx_out, mut rx_out) = mpsc::unbounded();
        hub.connect("in", tx_in);
        hub.connect("out", tx_out);
        hub.join("in", "general");

        hub.channel("general").say("hi");

        assert_eq!(rx_in.next().await.unwrap().content.as_deref(), Some("hi"));
        assert!(rx_out.try_next().is_err());
    }

    #[test]
    fn disconnect_drops_memberships() {
        let hub = hub();
        let (tx, _rx) = mpsc::unbounded();
        hub.connect("c1", tx);
        hub.join("c1", "general");
        hub.disconnect("c1");
        assert!(hub.lock().members.get("general").is_none());
    }

    #[test]
    fn dead_connections_leave_their_channels() {
        let hub = hub();
        let (tx, rx) = mpsc::unbounded();
        hub.connect("c1", tx);
        hub.join("c1", "general");
        hub.identify("c1", User::new("1", "alice"));
        drop(rx);

        hub.channel("general").say("anyone there?");

        let inner = hub.lock();
        assert!(inner.connections.is_empty());
        assert!(inner.members.get("general").is_none());
        assert!(inner.users.get("1").is_none());
    }

    #[test]
    fn users_stay_while_any_connection_speaks_for_them() {
        let hub = hub();
        let (tx1, _rx1) = mpsc::unbounded();
        let (tx2, _rx2) = mpsc::unbounded();
        hub.connect("c1", tx1);
        hub.connect("c2", tx2);
        hub.identify("c1", User::new("1", "alice"));
        hub.identify("c2", User::new("1", "alice"));
        hub.register_user(User::bot("xiao", "Xiao"));

        hub.disconnect("c1");
        assert!(hub.find_user("1").is_some());
        hub.disconnect("c2");
        assert!(hub.find_user("1").is_none());
        assert!(hub.find_user("xiao").is_some());
    }

    #[test]
    fn reidentifying_releases_the_old_user() {
        let hub = hub();
        let (tx, _rx) = mpsc::unbounded();
        hub.connect("c1", tx);
        hub.identify("c1", User::new("1", "alice"));
        hub.identify("c1", User::new("2", "bob"));
        assert!(hub.find_user("1").is_none());
        assert!(hub.find_user("2").is_some());
    }
}

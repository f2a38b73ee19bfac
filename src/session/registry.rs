use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info};
use thiserror::Error;

/// The game currently occupying a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescriptor {
    pub channel_id: String,
    pub game_name: String,
}

/// Returned when a channel already hosts a game; carries that game's name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("channel is already running a game of {0}")]
pub struct Occupied(pub String);

/// Process-wide map of channel id to running game, at most one per channel.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    slots: Arc<Mutex<HashMap<String, SessionDescriptor>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionDescriptor>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims the channel for `game_name`. The slot is held until the
    /// returned guard is dropped, whichever way the owning game exits.
    pub fn acquire(&self, channel_id: &str, game_name: &str) -> Result<SessionGuard, Occupied> {
        let mut slots = self.lock();
        if let Some(existing) = slots.get(channel_id) {
            debug!("Channel {} busy with {}", channel_id, existing.game_name);
            return Err(Occupied(existing.game_name.clone()));
        }
        slots.insert(
            channel_id.to_string(),
            SessionDescriptor { channel_id: channel_id.to_string(), game_name: game_name.to_string() },
        );
        info!("Session of {} started in channel {}", game_name, channel_id);
        Ok(SessionGuard { registry: self.clone(), channel_id: channel_id.to_string() })
    }

    pub fn release(&self, channel_id: &str) {
        if let Some(descriptor) = self.lock().remove(channel_id) {
            info!("Session of {} ended in channel {}", descriptor.game_name, channel_id);
        }
    }

    pub fn current(&self, channel_id: &str) -> Option<String> {
        self.lock().get(channel_id).map(|descriptor| descriptor.game_name.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Holds a channel slot; releases it on drop, including during unwinding.
#[derive(Debug)]
pub struct SessionGuard {
    registry: SessionRegistry,
    channel_id: String,
}

impl SessionGuard {
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.release(&self.channel_id);
    }
}

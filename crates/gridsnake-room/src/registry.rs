//! Room registry: creates rooms with unique short codes and routes
//! lookups to their actor handles.

use std::collections::HashMap;

use gridsnake_game::GameConfig;
use gridsnake_protocol::RoomCode;
use rand::Rng;

use crate::room::spawn_room;
use crate::{RoomError, RoomHandle};

/// Code alphabet with the visually ambiguous characters (0/O, 1/I)
/// removed, so codes survive being read out loud.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of a room code.
pub const CODE_LEN: usize = 5;

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Tracks all active rooms, keyed by code.
///
/// The registry is the entry point for room operations from the
/// connection layer; it hands out cloned [`RoomHandle`]s so callers
/// never hold the registry lock across an await on a room.
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, RoomHandle>,
    config: GameConfig,
}

impl RoomRegistry {
    pub fn new(config: GameConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
        }
    }

    /// Creates a new room under a freshly generated unique code.
    pub fn create(&mut self) -> RoomHandle {
        let code = self.unique_code();
        let handle = spawn_room(code.clone(), self.config.clone(), DEFAULT_CHANNEL_SIZE);
        self.rooms.insert(code.clone(), handle.clone());
        tracing::info!(room = %code, rooms = self.rooms.len(), "room created");
        handle
    }

    /// Looks up a room by code.
    pub fn lookup(&self, code: &RoomCode) -> Result<RoomHandle, RoomError> {
        self.rooms
            .get(code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(code.clone()))
    }

    /// Removes a room from the index and shuts its actor down.
    /// Unknown codes are ignored — destroy races with itself when two
    /// members disconnect at once.
    pub async fn destroy(&mut self, code: &RoomCode) {
        if let Some(handle) = self.rooms.remove(code) {
            let _ = handle.shutdown().await;
            tracing::info!(room = %code, rooms = self.rooms.len(), "room destroyed");
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn codes(&self) -> Vec<RoomCode> {
        self.rooms.keys().cloned().collect()
    }

    /// Rejection-samples codes until one misses the index. With 32^5
    /// possibilities collisions are rare; the loop exists for
    /// correctness, not performance.
    fn unique_code(&self) -> RoomCode {
        let mut rng = rand::rng();
        loop {
            let code: String = (0..CODE_LEN)
                .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
                .collect();
            let code = RoomCode(code);
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

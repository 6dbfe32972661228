//! Per-player simulation state.

use std::collections::VecDeque;

use gridsnake_protocol::{Cell, Dir, PlayerId, PlayerSnapshot};

use crate::SpawnPlan;

/// Maximum accepted name length, in characters.
const MAX_NAME_LEN: usize = 16;

/// One player's state inside a room.
///
/// A freshly joined player is not alive and has an empty body; it first
/// receives a body when the round starts (or, mid-round, never — joins
/// are lobby-only). While dead, `body` stays empty until the respawn
/// deadline passes.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    pub score: u32,
    pub alive: bool,
    /// Wall-clock deadline (ms) after which the player may respawn.
    pub respawn_at: Option<u64>,
    /// Body cells ordered tail → head.
    pub body: VecDeque<Cell>,
    pub dir: Dir,
    /// Highest input sequence number processed so far. Never decreases.
    pub ack: u64,
}

impl Player {
    pub fn new(id: PlayerId, name: String, color: String) -> Self {
        Self {
            id,
            name: sanitize_name(&name),
            color,
            score: 0,
            alive: false,
            respawn_at: None,
            body: VecDeque::new(),
            dir: Dir::RIGHT,
            ack: 0,
        }
    }

    /// The head cell, if the body is non-empty.
    pub fn head(&self) -> Option<Cell> {
        self.body.back().copied()
    }

    /// Marks the player dead: empty body (no corpse-blocking), respawn
    /// deadline recorded. Returns the deadline for the death event.
    pub fn kill(&mut self, now_ms: u64, respawn_delay_ms: u64) -> u64 {
        let deadline = now_ms + respawn_delay_ms;
        self.alive = false;
        self.body.clear();
        self.respawn_at = Some(deadline);
        deadline
    }

    /// Places the player on the grid with a fresh body and direction.
    pub fn spawn(&mut self, plan: SpawnPlan) {
        self.body = plan.body.into();
        self.dir = plan.dir;
        self.alive = true;
        self.respawn_at = None;
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            name: self.name.clone(),
            color: self.color.clone(),
            score: self.score,
            alive: self.alive,
            respawn_at: self.respawn_at,
            body: self.body.iter().copied().collect(),
            dir: self.dir,
            ack: self.ack,
        }
    }
}

/// Truncates to 16 characters; empty names become "anonymous".
fn sanitize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "anonymous".to_string();
    }
    trimmed.chars().take(MAX_NAME_LEN).collect()
}

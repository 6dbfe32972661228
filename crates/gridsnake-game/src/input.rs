//! Input reconciliation: latest-wins direction buffering per player.

use std::collections::BTreeMap;

use gridsnake_protocol::{Dir, PlayerId};

use crate::Player;

/// One buffered input: the requested direction plus the client's
/// sequence number for acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSample {
    pub dir: Dir,
    pub seq: u64,
}

/// Latest-wins input buffer keyed by player id.
///
/// Each received `input` message overwrites the stored sample; the buffer
/// is read once at the top of each tick and again before every inner
/// movement step, so a mid-tick direction change takes effect before the
/// very next step.
#[derive(Debug, Default)]
pub struct InputBuffer {
    latest: BTreeMap<PlayerId, InputSample>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a sample, clamping direction components to {-1, 0, 1}.
    pub fn record(&mut self, id: PlayerId, dir: Dir, seq: u64) {
        self.latest.insert(
            id,
            InputSample {
                dir: dir.clamped(),
                seq,
            },
        );
    }

    pub fn get(&self, id: PlayerId) -> Option<InputSample> {
        self.latest.get(&id).copied()
    }

    pub fn remove(&mut self, id: PlayerId) {
        self.latest.remove(&id);
    }
}

/// Applies a buffered sample to a player.
///
/// The acknowledged sequence rises whenever the sample is newer — receipt
/// is acknowledged even when the direction itself is rejected. The
/// direction is applied only if it is a cardinal unit vector and not the
/// exact reverse of the player's current heading.
pub fn reconcile(player: &mut Player, sample: InputSample) {
    if sample.seq > player.ack {
        player.ack = sample.seq;
    }
    if !player.alive {
        return;
    }
    if sample.dir.is_cardinal() && !sample.dir.is_reverse_of(player.dir) {
        player.dir = sample.dir;
    }
}

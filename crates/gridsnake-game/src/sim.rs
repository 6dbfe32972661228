//! The per-room simulation state machine and fixed-tick update.

use std::collections::BTreeMap;

use gridsnake_protocol::{
    Cell, DeathReason, Dir, PlayerId, PlayerSnapshot, RoomCode, RoomSnapshot, RoundPhase,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::step::advance_step;
use crate::{GameConfig, Grid, InputBuffer, Player, input, occupancy, place_food, plan_spawn};

/// Ceiling on the movement accumulator, in step durations. Bounds the
/// catch-up after a scheduling delay to two logical steps per tick so a
/// stalled room never teleports its snakes.
const MAX_ACCUMULATED_STEPS: f64 = 2.0;

/// Something that happened during a tick and must be told to clients
/// before the state snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Death {
        id: PlayerId,
        reason: DeathReason,
        respawn_at: u64,
    },
    Respawn {
        id: PlayerId,
        body: Vec<Cell>,
        dir: Dir,
    },
    /// The round deadline passed; the room is now `ended`, terminally.
    Ended,
}

/// Why a join request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    #[error("room is full")]
    Full,
    #[error("round already started")]
    Started,
}

/// One room's complete simulation state.
///
/// Owns its players, input buffer, food, round clock, and RNG. The room
/// actor is the only caller; all methods take the current wall-clock
/// time as a parameter so tests can drive the simulation with a fake
/// clock.
pub struct RoomSim {
    config: GameConfig,
    grid: Grid,
    phase: RoundPhase,
    ticks: u64,
    started_at: Option<u64>,
    ends_at: Option<u64>,
    /// `now_ms` of the previous tick, for the elapsed-time accumulator.
    last_tick_ms: Option<u64>,
    /// Fractional movement accumulator, in seconds.
    accumulator: f64,
    food: Option<Cell>,
    players: BTreeMap<PlayerId, Player>,
    inputs: InputBuffer,
    rng: StdRng,
}

impl RoomSim {
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Deterministic construction for tests.
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        let grid = Grid::new(config.grid);
        Self {
            config,
            grid,
            phase: RoundPhase::Lobby,
            ticks: 0,
            started_at: None,
            ends_at: None,
            last_tick_ms: None,
            accumulator: 0.0,
            food: None,
            players: BTreeMap::new(),
            inputs: InputBuffer::new(),
            rng,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Adds a member. Joins are lobby-only and capped at
    /// `config.max_players`.
    pub fn add_player(
        &mut self,
        id: PlayerId,
        name: String,
        color: String,
    ) -> Result<(), JoinError> {
        if self.phase != RoundPhase::Lobby {
            return Err(JoinError::Started);
        }
        if self.players.len() >= self.config.max_players {
            return Err(JoinError::Full);
        }
        self.players.insert(id, Player::new(id, name, color));
        Ok(())
    }

    /// Removes a member and its buffered input. Returns the remaining
    /// member count so the caller can destroy an emptied room.
    pub fn remove_player(&mut self, id: PlayerId) -> usize {
        self.players.remove(&id);
        self.inputs.remove(id);
        self.players.len()
    }

    /// Buffers an input sample (latest wins). Unknown players — e.g. a
    /// racing input after removal — are ignored.
    pub fn buffer_input(&mut self, id: PlayerId, dir: Dir, seq: u64) {
        if self.players.contains_key(&id) {
            self.inputs.record(id, dir, seq);
        }
    }

    /// `lobby → running`. Idempotent: returns `false` without touching
    /// anything when already running or ended.
    ///
    /// On entry every member is spawned fresh (score reset, deadline
    /// cleared), food is placed, and the round clock starts.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.phase != RoundPhase::Lobby {
            return false;
        }
        self.phase = RoundPhase::Running;
        self.started_at = Some(now_ms);
        self.ends_at = Some(now_ms + self.config.round_ms);
        self.last_tick_ms = Some(now_ms);
        self.accumulator = 0.0;
        self.ticks = 0;

        let ids: Vec<PlayerId> = self.players.keys().copied().collect();
        let mut occupied = std::collections::HashSet::new();
        for id in ids {
            let plan = plan_spawn(self.grid, &occupied, None, &mut self.rng);
            occupied.extend(plan.body.iter().copied());
            if let Some(player) = self.players.get_mut(&id) {
                player.score = 0;
                player.spawn(plan);
            }
        }
        self.food = place_food(self.grid, &occupied, &mut self.rng);
        tracing::debug!(players = self.players.len(), "round started");
        true
    }

    /// One simulation tick. Call only at the fixed tick rate while
    /// running; a no-op in any other phase.
    ///
    /// Order per tick: round-end check, respawns, input reconciliation,
    /// then zero or more movement steps as the accumulator allows, with
    /// inputs re-applied before each step.
    pub fn tick(&mut self, now_ms: u64) -> Vec<SimEvent> {
        if self.phase != RoundPhase::Running {
            return Vec::new();
        }
        let mut events = Vec::new();
        self.ticks += 1;

        if self.ends_at.is_some_and(|t| now_ms >= t) {
            self.phase = RoundPhase::Ended;
            tracing::debug!(ticks = self.ticks, "round ended");
            events.push(SimEvent::Ended);
            return events;
        }

        self.respawn_due(now_ms, &mut events);
        self.apply_inputs();

        let elapsed =
            now_ms.saturating_sub(self.last_tick_ms.unwrap_or(now_ms)) as f64 / 1000.0;
        self.last_tick_ms = Some(now_ms);

        let step = 1.0 / self.config.speed;
        self.accumulator = (self.accumulator + elapsed).min(MAX_ACCUMULATED_STEPS * step);
        while self.accumulator >= step {
            // Re-read the buffer so a turn that arrived mid-tick takes
            // effect before the next step, not the next tick.
            self.apply_inputs();
            advance_step(
                &mut self.players,
                &mut self.food,
                self.grid,
                now_ms,
                &self.config,
                &mut self.rng,
                &mut events,
            );
            self.accumulator -= step;
        }

        events
    }

    /// Respawns every dead player whose deadline has passed.
    fn respawn_due(&mut self, now_ms: u64, events: &mut Vec<SimEvent>) {
        let due: Vec<PlayerId> = self
            .players
            .values()
            .filter(|p| !p.alive && p.respawn_at.is_some_and(|t| t <= now_ms))
            .map(|p| p.id)
            .collect();

        for id in due {
            let occupied = occupancy(self.players.values());
            let plan = plan_spawn(self.grid, &occupied, self.food, &mut self.rng);
            if let Some(player) = self.players.get_mut(&id) {
                player.spawn(plan.clone());
                events.push(SimEvent::Respawn {
                    id,
                    body: plan.body,
                    dir: plan.dir,
                });
            }
        }
    }

    fn apply_inputs(&mut self) {
        for (id, player) in self.players.iter_mut() {
            if let Some(sample) = self.inputs.get(*id) {
                input::reconcile(player, sample);
            }
        }
    }

    pub fn player_snapshots(&self) -> Vec<PlayerSnapshot> {
        self.players.values().map(Player::snapshot).collect()
    }

    pub fn room_snapshot(&self, code: &RoomCode) -> RoomSnapshot {
        RoomSnapshot {
            code: code.clone(),
            phase: self.phase,
            started_at: self.started_at,
            ends_at: self.ends_at,
            grid: self.config.grid,
            speed: self.config.speed,
            food: self.food,
            players: self.player_snapshots(),
        }
    }
}

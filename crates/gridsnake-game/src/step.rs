//! Collision resolution: one discrete movement step.

use std::collections::BTreeMap;

use gridsnake_protocol::{Cell, DeathReason, PlayerId};
use rand::Rng;

use crate::sim::SimEvent;
use crate::{GameConfig, Grid, Player, occupancy, place_food};

/// Advances every alive body by one cell and resolves the outcome.
///
/// Semantically simultaneous: every player is resolved against the
/// occupancy set captured *before* any move this step, never against
/// cells vacated or filled mid-step. Two heads may therefore swap into
/// cells the other just vacated ("pass-through") — intended behavior of
/// simultaneous-move semantics, not a collision.
///
/// Outcomes per player, in ascending id order:
/// - next head out of bounds → kill, reason `wall`;
/// - next head on any pre-move body cell (food cell excepted) → kill,
///   reason `body`;
/// - next head on the food cell → grow by one (tail kept), score up by
///   the configured reward, replacement food placed on a cell free of
///   every body as it stands at that moment;
/// - otherwise → head appended, tail removed, length unchanged.
///
/// Killed players lose their body immediately and get a respawn deadline
/// of `now + respawn_ms`. Dead or empty-bodied players are skipped.
pub(crate) fn advance_step(
    players: &mut BTreeMap<PlayerId, Player>,
    food: &mut Option<Cell>,
    grid: Grid,
    now_ms: u64,
    config: &GameConfig,
    rng: &mut impl Rng,
    events: &mut Vec<SimEvent>,
) {
    let pre_move = occupancy(players.values());
    let ids: Vec<PlayerId> = players.keys().copied().collect();

    for id in ids {
        let mut ate = false;
        {
            let Some(player) = players.get_mut(&id) else {
                continue;
            };
            if !player.alive || player.body.is_empty() {
                continue;
            }
            let Some(head) = player.head() else {
                continue;
            };
            let next = head.step(player.dir);

            if !grid.contains(next) {
                let respawn_at = player.kill(now_ms, config.respawn_ms);
                tracing::debug!(player = %id, ?next, "killed by wall");
                events.push(SimEvent::Death {
                    id,
                    reason: DeathReason::Wall,
                    respawn_at,
                });
                continue;
            }

            if pre_move.contains(&next) && *food != Some(next) {
                let respawn_at = player.kill(now_ms, config.respawn_ms);
                tracing::debug!(player = %id, ?next, "killed by body");
                events.push(SimEvent::Death {
                    id,
                    reason: DeathReason::Body,
                    respawn_at,
                });
                continue;
            }

            player.body.push_back(next);
            if *food == Some(next) {
                player.score += config.reward;
                ate = true;
            } else {
                player.body.pop_front();
            }
        }

        if ate {
            // Replacement placed against bodies as they stand right now,
            // so the new food is never under a snake at placement time.
            let current = occupancy(players.values());
            *food = place_food(grid, &current, rng);
        }
    }
}

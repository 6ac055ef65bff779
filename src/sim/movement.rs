//! Axis-separated movement against obstacles
//!
//! The X step is tested and applied first, then the Y step is tested from the
//! updated position. A blocked axis is simply dropped for the tick, which lets
//! a diagonal push slide along a wall.

use glam::Vec2;

use super::collision::{Rect, circle_hits_any};
use super::state::RunState;
use crate::config::HostileNavigation;
use crate::consts::HOSTILE_SPEED;

/// A circle may rest at `pos`: fully inside the world and touching no obstacle
#[inline]
pub fn can_occupy(pos: Vec2, radius: f32, world_size: f32, obstacles: &[Rect]) -> bool {
    pos.x >= radius
        && pos.x <= world_size - radius
        && pos.y >= radius
        && pos.y <= world_size - radius
        && !circle_hits_any(pos, radius, obstacles)
}

/// Nearest position that keeps the whole circle inside the world
#[inline]
pub fn clamp_to_world(pos: Vec2, radius: f32, world_size: f32) -> Vec2 {
    let lo = radius.min(world_size / 2.0);
    let hi = (world_size - radius).max(lo);
    pos.clamp(Vec2::splat(lo), Vec2::splat(hi))
}

/// Move a circle by `delta`, resolving each axis independently
pub fn resolve_axis_separated(
    pos: Vec2,
    delta: Vec2,
    radius: f32,
    world_size: f32,
    obstacles: &[Rect],
) -> Vec2 {
    // A body that starts past an edge is pulled back in before stepping
    let mut out = clamp_to_world(pos, radius, world_size);
    if delta.x != 0.0 {
        let candidate = Vec2::new(out.x + delta.x, out.y);
        if can_occupy(candidate, radius, world_size, obstacles) {
            out = candidate;
        }
    }
    if delta.y != 0.0 {
        let candidate = Vec2::new(out.x, out.y + delta.y);
        if can_occupy(candidate, radius, world_size, obstacles) {
            out = candidate;
        }
    }
    out
}

/// Per-tick displacement from the four direction flags. Diagonals are not
/// normalized, so they cover more ground.
pub fn direction_delta(up: bool, down: bool, left: bool, right: bool, speed: f32) -> Vec2 {
    let mut d = Vec2::ZERO;
    if up {
        d.y -= speed;
    }
    if down {
        d.y += speed;
    }
    if left {
        d.x -= speed;
    }
    if right {
        d.x += speed;
    }
    d
}

/// Advance the player by a per-tick displacement
pub fn move_player(state: &mut RunState, delta: Vec2, world_size: f32) {
    let p = &mut state.player;
    p.pos = resolve_axis_separated(p.pos, delta, p.radius, world_size, &state.obstacles);
}

/// Every hostile steps toward the player's current position
pub fn move_hostiles(state: &mut RunState, navigation: HostileNavigation, world_size: f32) {
    let target = state.player.pos;
    let obstacles = &state.obstacles;
    for hostile in state.hostiles.iter_mut() {
        let to_player = target - hostile.pos;
        let dist = to_player.length();
        if dist < 1e-3 {
            continue;
        }
        let step = to_player / dist * HOSTILE_SPEED;
        hostile.pos = match navigation {
            HostileNavigation::Direct => hostile.pos + step,
            HostileNavigation::RespectObstacles => {
                if circle_hits_any(hostile.pos, hostile.radius, obstacles) {
                    // Placed inside an obstacle by best-effort generation; let it walk out
                    hostile.pos + step
                } else {
                    resolve_axis_separated(hostile.pos, step, hostile.radius, world_size, obstacles)
                }
            }
        };
    }
}

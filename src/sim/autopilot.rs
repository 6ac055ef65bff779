//! Scripted input source
//!
//! Drives a run without a human: heads for the extraction zone once it is
//! open, otherwise for the nearest currency, and shoots the nearest hostile in
//! range. Used by the headless runner and by tests.

use glam::Vec2;

use super::state::{LootKind, RunState};
use super::tick::{Aim, Simulation, TickInput};

/// Hostiles further away than this are ignored
const ENGAGE_RANGE: f32 = 600.0;
/// Closer than this counts as arrived on an axis
const DEADZONE: f32 = 4.0;
/// Ticks without progress before trying a detour
const STUCK_TICKS: u32 = 20;
const DETOUR_TICKS: u32 = 45;

#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    last_pos: Option<Vec2>,
    stalled: u32,
    detour: Option<(Vec2, u32)>,
    detours_taken: u32,
}

fn nearest<'a, T, I>(from: Vec2, items: I, pos: impl Fn(&T) -> Vec2) -> Option<&'a T>
where
    I: Iterator<Item = &'a T>,
    T: 'a,
{
    items.min_by(|a, b| {
        pos(*a)
            .distance_squared(from)
            .partial_cmp(&pos(*b).distance_squared(from))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

impl Autopilot {
    pub fn input(&mut self, sim: &Simulation) -> TickInput {
        self.input_for(sim.state())
    }

    /// Where the pilot wants to go
    fn destination(state: &RunState) -> Option<Vec2> {
        let me = state.player.pos;
        if let Some(zone) = &state.extraction {
            return Some(zone.pos);
        }
        let wanted = if state.player.ammo == 0 {
            LootKind::Ammo
        } else {
            LootKind::Currency
        };
        nearest(me, state.loot.iter().filter(|l| l.kind == wanted), |l| l.pos)
            .or_else(|| nearest(me, state.loot.iter(), |l| l.pos))
            .map(|l| l.pos)
    }

    pub fn input_for(&mut self, state: &RunState) -> TickInput {
        let me = state.player.pos;
        let mut input = TickInput::default();

        if let Some(target) = nearest(me, state.hostiles.iter(), |h| h.pos)
            .filter(|h| h.pos.distance(me) < ENGAGE_RANGE)
        {
            input.aim = Aim::World(target.pos);
            input.fire = true;
            input.special = true;
        }

        let Some(goal) = Self::destination(state) else {
            self.last_pos = Some(me);
            return input;
        };

        // Obstacle in the way: sidestep perpendicular for a while
        let moved = self.last_pos.is_none_or(|p| p.distance(me) > 0.5);
        self.last_pos = Some(me);
        self.stalled = if moved { 0 } else { self.stalled + 1 };

        let mut heading = goal - me;
        if let Some((dir, left)) = self.detour {
            heading = dir;
            self.detour = (left > 1).then_some((dir, left - 1));
        } else if self.stalled >= STUCK_TICKS {
            self.detours_taken += 1;
            let side = if self.detours_taken % 2 == 0 { 1.0 } else { -1.0 };
            let dir = heading.perp() * side;
            self.detour = Some((dir, DETOUR_TICKS));
            self.stalled = 0;
            heading = dir;
        }

        input.right = heading.x > DEADZONE;
        input.left = heading.x < -DEADZONE;
        input.down = heading.y > DEADZONE;
        input.up = heading.y < -DEADZONE;
        input
    }
}

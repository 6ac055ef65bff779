//! Loot collection and chest opening

use glam::Vec2;
use rand::Rng;

use super::combat::spawn_particles;
use super::progression::gain_xp;
use super::state::{EffectTint, LootKind, RunState};
use super::weapon::Weapon;
use crate::consts::*;

/// Totals picked up in one pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Collected {
    pub currency: u32,
    pub ammo: u32,
    pub xp: f32,
}

/// Collect every item touching the player's pickup circle
pub fn collect_loot(state: &mut RunState) -> Collected {
    let reach = state.player.radius * state.player.pickup_radius_mult;
    let pos = state.player.pos;
    let mut got = Collected::default();

    state.loot.retain(|item| {
        if item.pos.distance(pos) >= reach + item.radius {
            return true;
        }
        match item.kind {
            LootKind::Currency => got.currency += 1,
            LootKind::Ammo => got.ammo += AMMO_PER_PICKUP,
            LootKind::Experience => got.xp += XP_PER_PICKUP,
        }
        false
    });

    let p = &mut state.player;
    p.currency += got.currency;
    p.ammo += got.ammo;
    gain_xp(p, got.xp);
    got
}

/// Progress the first unopened chest in range while the player holds still.
/// Any movement input, or leaving range, resets every chest's progress.
/// Returns the id of a chest that opened this tick.
pub fn update_chests(state: &mut RunState, moving: bool, dt: f32) -> Option<u32> {
    let pos = state.player.pos;
    let near = state
        .chests
        .iter()
        .position(|c| !c.opened && c.pos.distance(pos) < CHEST_OPEN_RANGE);

    let index = match near {
        Some(i) if !moving => i,
        _ => {
            for chest in state.chests.iter_mut() {
                chest.progress = 0.0;
            }
            return None;
        }
    };

    let chest = &mut state.chests[index];
    chest.progress += dt;
    if chest.progress < CHEST_OPEN_TIME {
        return None;
    }
    chest.opened = true;
    let id = chest.id;
    let center = chest.pos;

    state.player.special_weapon = Some(Weapon::laser());
    scatter_drops(state, center, LootKind::Currency, CHEST_CURRENCY_DROPS);
    scatter_drops(state, center, LootKind::Ammo, CHEST_AMMO_DROPS);
    spawn_particles(state, center, EffectTint::Chest, 30);
    state.shake(SHAKE_CHEST);
    log::info!("Chest {} opened, laser equipped", id);
    Some(id)
}

fn scatter_drops(state: &mut RunState, center: Vec2, kind: LootKind, count: usize) {
    for _ in 0..count {
        let offset = Vec2::new(
            (state.rng.random::<f32>() - 0.5) * 2.0 * CHEST_SCATTER,
            (state.rng.random::<f32>() - 0.5) * 2.0 * CHEST_SCATTER,
        );
        state.spawn_loot(center + offset, kind);
    }
}

/// Age particles and drop the expired ones
pub fn update_particles(state: &mut RunState, dt: f32) {
    for pt in state.particles.iter_mut() {
        pt.pos += pt.vel;
        pt.life -= dt;
    }
    state.particles.retain(|pt| pt.life > 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Upgrades;
    use crate::sim::state::{Chest, Player};

    fn state() -> RunState {
        let player = Player::new(Vec2::new(500.0, 500.0), vec![], &Upgrades::default(), 100.0);
        RunState::new(3, player)
    }

    fn add_chest(state: &mut RunState, pos: Vec2) -> u32 {
        let id = state.next_entity_id();
        state.chests.push(Chest {
            id,
            pos,
            radius: CHEST_RADIUS,
            opened: false,
            progress: 0.0,
        });
        id
    }

    #[test]
    fn test_collect_each_kind() {
        let mut s = state();
        let start_ammo = s.player.ammo;
        s.spawn_loot(Vec2::new(510.0, 500.0), LootKind::Currency);
        s.spawn_loot(Vec2::new(500.0, 510.0), LootKind::Ammo);
        s.spawn_loot(Vec2::new(495.0, 495.0), LootKind::Experience);
        s.spawn_loot(Vec2::new(900.0, 900.0), LootKind::Currency);

        let got = collect_loot(&mut s);
        assert_eq!(got.currency, 1);
        assert_eq!(s.player.currency, 1);
        assert_eq!(s.player.ammo, start_ammo + AMMO_PER_PICKUP);
        assert_eq!(s.player.xp, XP_PER_PICKUP);
        assert_eq!(s.loot.len(), 1);
    }

    #[test]
    fn test_pickup_radius_multiplier_extends_reach() {
        let mut s = state();
        s.spawn_loot(Vec2::new(540.0, 500.0), LootKind::Currency);
        assert_eq!(collect_loot(&mut s).currency, 0);
        s.player.pickup_radius_mult = 1.5;
        assert_eq!(collect_loot(&mut s).currency, 1);
    }

    #[test]
    fn test_chest_opens_after_standing_still() {
        let mut s = state();
        let id = add_chest(&mut s, Vec2::new(560.0, 500.0));
        let mut opened = None;
        for _ in 0..51 {
            opened = opened.or(update_chests(&mut s, false, 0.1));
        }
        assert_eq!(opened, Some(id));
        assert!(s.chests[0].opened);
        assert!(s.player.active_weapon().is_special());
        let currency = s.loot.iter().filter(|l| l.kind == LootKind::Currency).count();
        let ammo = s.loot.iter().filter(|l| l.kind == LootKind::Ammo).count();
        assert_eq!((currency, ammo), (CHEST_CURRENCY_DROPS, CHEST_AMMO_DROPS));
        for l in &s.loot {
            assert!((l.pos - s.chests[0].pos).abs().max_element() <= CHEST_SCATTER);
        }
        assert_eq!(s.screen_shake, SHAKE_CHEST);
    }

    #[test]
    fn test_moving_resets_progress() {
        let mut s = state();
        add_chest(&mut s, Vec2::new(560.0, 500.0));
        for _ in 0..30 {
            update_chests(&mut s, false, 0.1);
        }
        assert!(s.chests[0].progress > 2.9);
        update_chests(&mut s, true, 0.1);
        assert_eq!(s.chests[0].progress, 0.0);
        assert!(!s.chests[0].opened);
    }

    #[test]
    fn test_out_of_range_chest_ignored() {
        let mut s = state();
        add_chest(&mut s, Vec2::new(700.0, 500.0));
        for _ in 0..100 {
            assert_eq!(update_chests(&mut s, false, 0.1), None);
        }
    }

    #[test]
    fn test_particles_expire() {
        let mut s = state();
        spawn_particles(&mut s, Vec2::ZERO, EffectTint::Pulse, 10);
        assert_eq!(s.particles.len(), 10);
        for _ in 0..5 {
            update_particles(&mut s, 0.1);
        }
        assert_eq!(s.particles.len(), 10);
        for _ in 0..6 {
            update_particles(&mut s, 0.1);
        }
        assert!(s.particles.is_empty());
    }
}

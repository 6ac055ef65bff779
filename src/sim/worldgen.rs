//! World generation
//!
//! Obstacles, hostiles, chests and scattered loot are placed by rejection
//! sampling. Every search is bounded: after `placement_attempts` draws the
//! last candidate is accepted, so generation always terminates even on a
//! crowded map.

use glam::Vec2;
use rand::Rng;

use super::collision::{Rect, circle_hits_any, circle_rect_overlap};
use super::state::{Chest, Hostile, LootKind, RunState};
use crate::config::SimConfig;
use crate::consts::{CHEST_RADIUS, HOSTILE_RADIUS, LOOT_RADIUS};

/// Result of a bounded rejection search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub pos: Vec2,
    /// False when the attempt budget ran out and the last draw was kept
    pub satisfied: bool,
}

/// Draw candidates until `rejected` says no, at most `attempts` times.
/// On exhaustion the final candidate is returned anyway.
pub fn sample_position<R, D, P>(rng: &mut R, attempts: u32, mut draw: D, rejected: P) -> Placement
where
    R: Rng + ?Sized,
    D: FnMut(&mut R) -> Vec2,
    P: Fn(Vec2) -> bool,
{
    let mut pos = draw(rng);
    for _ in 1..attempts.max(1) {
        if !rejected(pos) {
            return Placement {
                pos,
                satisfied: true,
            };
        }
        pos = draw(rng);
    }
    Placement {
        pos,
        satisfied: !rejected(pos),
    }
}

/// Uniform point inside the world, kept `inset` away from every edge
fn uniform_point<R: Rng + ?Sized>(rng: &mut R, size: f32, inset: f32) -> Vec2 {
    let lo = inset.min(size / 2.0);
    let hi = (size - inset).max(lo);
    Vec2::new(
        lo + rng.random::<f32>() * (hi - lo),
        lo + rng.random::<f32>() * (hi - lo),
    )
}

/// Populate an empty run with obstacles, hostiles, chests and loot
pub fn generate_world(state: &mut RunState, config: &SimConfig) {
    let spawn = state.player.pos;
    let spawn_clearance = state.player.radius * 2.0;
    let mut exhausted = 0u32;

    // Obstacles: never cover the spawn; overlapping each other is only discouraged
    for _ in 0..config.obstacle_count {
        let w = state
            .rng
            .random_range(config.obstacle_min_size..=config.obstacle_max_size);
        let h = state
            .rng
            .random_range(config.obstacle_min_size..=config.obstacle_max_size);
        let world = config.world_size;
        let obstacles = &state.obstacles;
        let placement = sample_position(
            &mut state.rng,
            config.placement_attempts,
            |rng| {
                Vec2::new(
                    rng.random::<f32>() * (world - w),
                    rng.random::<f32>() * (world - h),
                )
            },
            |p| {
                let rect = Rect::new(p.x, p.y, w, h);
                circle_rect_overlap(spawn, spawn_clearance, &rect)
                    || obstacles.iter().any(|o| o.intersects(&rect))
            },
        );
        let rect = Rect::new(placement.pos.x, placement.pos.y, w, h);
        if !placement.satisfied {
            exhausted += 1;
            if circle_rect_overlap(spawn, spawn_clearance, &rect) {
                // The player must be able to move from the spawn point
                continue;
            }
        }
        state.obstacles.push(rect);
    }

    // Hostiles: outside the spawn exclusion radius and outside obstacles
    // Elites are rolled first so placement clears their larger body
    for _ in 0..config.hostile_count {
        let elite = state.rng.random_bool(config.elite_chance as f64);
        let radius = if elite {
            HOSTILE_RADIUS * config.elite_radius_mult
        } else {
            HOSTILE_RADIUS
        };
        let obstacles = &state.obstacles;
        let placement = sample_position(
            &mut state.rng,
            config.placement_attempts,
            |rng| uniform_point(rng, config.world_size, radius),
            |p| p.distance(spawn) < config.spawn_exclusion || circle_hits_any(p, radius, obstacles),
        );
        if !placement.satisfied {
            exhausted += 1;
        }
        let id = state.next_entity_id();
        let mut hostile = Hostile::new(id, placement.pos);
        if elite {
            hostile = hostile.into_elite(config.elite_health_mult, config.elite_radius_mult);
        }
        state.hostiles.push(hostile);
    }

    // Chests
    for _ in 0..config.chest_count {
        let obstacles = &state.obstacles;
        let placement = sample_position(
            &mut state.rng,
            config.placement_attempts,
            |rng| uniform_point(rng, config.world_size, CHEST_RADIUS),
            |p| circle_hits_any(p, CHEST_RADIUS, obstacles),
        );
        if !placement.satisfied {
            exhausted += 1;
        }
        let id = state.next_entity_id();
        state.chests.push(Chest {
            id,
            pos: placement.pos,
            radius: CHEST_RADIUS,
            opened: false,
            progress: 0.0,
        });
    }

    // Scattered currency and ammunition
    for _ in 0..config.loot_count {
        let obstacles = &state.obstacles;
        let placement = sample_position(
            &mut state.rng,
            config.placement_attempts,
            |rng| uniform_point(rng, config.world_size, LOOT_RADIUS),
            |p| circle_hits_any(p, LOOT_RADIUS, obstacles),
        );
        if !placement.satisfied {
            exhausted += 1;
        }
        let kind = if state.rng.random::<f32>() < config.currency_share {
            LootKind::Currency
        } else {
            LootKind::Ammo
        };
        state.spawn_loot(placement.pos, kind);
    }

    if exhausted > 0 {
        log::warn!(
            "World generation: {} placements exhausted {} attempts, accepted best effort",
            exhausted,
            config.placement_attempts
        );
    }
    log::info!(
        "World generated: {} obstacles, {} hostiles ({} elite), {} chests, {} loot",
        state.obstacles.len(),
        state.hostiles.len(),
        state.hostiles.iter().filter(|h| h.elite).count(),
        state.chests.len(),
        state.loot.len()
    );
}

/// Pick the extraction point: inside the margin band and at least
/// `extraction_min_distance` from the player, best effort.
pub fn sample_extraction_point<R: Rng + ?Sized>(
    rng: &mut R,
    config: &SimConfig,
    player_pos: Vec2,
) -> Vec2 {
    let placement = sample_position(
        rng,
        config.extraction_attempts,
        |rng| uniform_point(rng, config.world_size, config.extraction_margin),
        |p| p.distance(player_pos) < config.extraction_min_distance,
    );
    if !placement.satisfied {
        log::warn!(
            "Extraction point within {} of player after {} attempts, accepting",
            config.extraction_min_distance,
            config.extraction_attempts
        );
    }
    placement.pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Upgrades;
    use crate::sim::state::Player;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn fresh_state(config: &SimConfig, seed: u64) -> RunState {
        let player = Player::new(
            config.world_center(),
            vec![],
            &Upgrades::default(),
            config.first_level_xp,
        );
        RunState::new(seed, player)
    }

    #[test]
    fn test_generation_counts() {
        let config = SimConfig::default();
        let mut state = fresh_state(&config, 42);
        generate_world(&mut state, &config);
        assert!(state.obstacles.len() <= config.obstacle_count);
        assert_eq!(state.hostiles.len(), config.hostile_count);
        assert_eq!(state.chests.len(), config.chest_count);
        assert_eq!(state.loot.len(), config.loot_count);
        assert!(state.loot.iter().all(|l| l.kind != LootKind::Experience));
    }

    #[test]
    fn test_spawn_point_is_clear() {
        for seed in 0..20 {
            let config = SimConfig::default();
            let mut state = fresh_state(&config, seed);
            generate_world(&mut state, &config);
            let spawn = state.player.pos;
            assert!(!circle_hits_any(spawn, state.player.radius, &state.obstacles));
        }
    }

    #[test]
    fn test_hostiles_respect_exclusion_when_satisfiable() {
        let config = SimConfig {
            obstacle_count: 0,
            ..Default::default()
        };
        let mut state = fresh_state(&config, 9);
        generate_world(&mut state, &config);
        let spawn = state.player.pos;
        for h in &state.hostiles {
            assert!(h.pos.distance(spawn) >= config.spawn_exclusion);
        }
    }

    #[test]
    fn test_hostile_bodies_inside_world() {
        let config = SimConfig {
            elite_chance: 1.0,
            ..Default::default()
        };
        for seed in 0..20 {
            let mut state = fresh_state(&config, seed);
            generate_world(&mut state, &config);
            for h in &state.hostiles {
                assert!(h.elite);
                assert!(h.pos.x >= h.radius && h.pos.x <= config.world_size - h.radius);
                assert!(h.pos.y >= h.radius && h.pos.y <= config.world_size - h.radius);
            }
        }
    }

    #[test]
    fn test_ids_unique() {
        let config = SimConfig::default();
        let mut state = fresh_state(&config, 5);
        generate_world(&mut state, &config);
        let mut ids: Vec<u32> = state
            .hostiles
            .iter()
            .map(|h| h.id)
            .chain(state.loot.iter().map(|l| l.id))
            .chain(state.chests.iter().map(|c| c.id))
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_same_seed_same_world() {
        let config = SimConfig::default();
        let mut a = fresh_state(&config, 1234);
        let mut b = fresh_state(&config, 1234);
        generate_world(&mut a, &config);
        generate_world(&mut b, &config);
        assert_eq!(a.obstacles, b.obstacles);
        assert_eq!(a.hostiles.len(), b.hostiles.len());
        for (x, y) in a.hostiles.iter().zip(&b.hostiles) {
            assert_eq!(x.pos, y.pos);
            assert_eq!(x.elite, y.elite);
        }
    }

    #[test]
    fn test_sample_position_gives_up() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut draws = 0;
        let placement = sample_position(
            &mut rng,
            7,
            |_| {
                draws += 1;
                Vec2::ONE
            },
            |_| true,
        );
        assert!(!placement.satisfied);
        assert_eq!(placement.pos, Vec2::ONE);
        assert_eq!(draws, 7);
    }

    #[test]
    fn test_extraction_point_far_from_player() {
        let config = SimConfig::default();
        let mut rng = Pcg32::seed_from_u64(77);
        let player = Vec2::new(600.0, 600.0);
        for _ in 0..20 {
            let p = sample_extraction_point(&mut rng, &config, player);
            assert!(p.x >= config.extraction_margin && p.x <= config.world_size - config.extraction_margin);
            assert!(p.y >= config.extraction_margin && p.y <= config.world_size - config.extraction_margin);
        }
    }
}

//! Firing, projectile resolution and hostile contact
//!
//! Projectiles test hostiles in insertion order; the first overlap wins. A
//! projectile with pierce left keeps going, otherwise it is spent and tests
//! nothing else this tick. Dead hostiles are reaped in the same tick and each
//! leaves exactly one experience pickup.

use glam::Vec2;
use rand::Rng;

use super::collision::{circle_hits_any, circles_overlap, inside_world_margin};
use super::progression::{SHOCK_PULSE_RADIUS, SkillKind, SpecialKind};
use super::state::{EffectTint, LootKind, Particle, RunState};
use super::weapon::ProjectileTag;
use crate::config::ContactDamage;
use crate::consts::*;
use crate::heading;

/// Spawn a burst of particles (cosmetic RNG only)
pub fn spawn_particles(state: &mut RunState, pos: Vec2, tint: EffectTint, count: usize) {
    for _ in 0..count {
        if state.particles.len() >= MAX_PARTICLES {
            break;
        }
        let vel = Vec2::new(
            (state.fx_rng.random::<f32>() - 0.5) * PARTICLE_SPEED,
            (state.fx_rng.random::<f32>() - 0.5) * PARTICLE_SPEED,
        );
        let size = state.fx_rng.random::<f32>() * 4.0 + 2.0;
        state.particles.push(Particle {
            pos,
            vel,
            tint,
            life: PARTICLE_LIFE,
            size,
        });
    }
}

/// Fire the active weapon if held, loaded and off cooldown. Returns true when
/// a volley left the barrel.
pub fn fire_weapon(state: &mut RunState, fire_held: bool) -> bool {
    if !fire_held || state.player.ammo == 0 {
        return false;
    }
    let now = state.clock;
    let weapon = state.player.active_weapon();
    let interval = weapon.fire_interval() * state.player.fire_interval_mult;
    if let Some(last) = state.player.last_shot {
        if now - last <= interval {
            return false;
        }
    }

    let origin = state.player.pos;
    let angle = state.player.angle;
    let spread = weapon.spread();
    for _ in 0..weapon.projectile_count() {
        let jitter = if spread > 0.0 {
            (state.rng.random::<f32>() - 0.5) * spread
        } else {
            0.0
        };
        state.spawn_projectile(
            origin,
            heading(angle + jitter) * PROJECTILE_SPEED,
            weapon.projectile_radius(),
            weapon.damage(),
            weapon.pierce(),
            weapon.tag(),
        );
    }
    state.player.ammo -= 1;
    state.player.last_shot = Some(now);
    if weapon.is_special() {
        state.shake(SHAKE_LASER);
    }
    true
}

/// Fire every special attack whose cooldown has elapsed
pub fn fire_specials(state: &mut RunState) -> usize {
    let now = state.clock;
    let origin = state.player.pos;
    let aim = state.player.angle;
    let mut volleys = Vec::new();
    for special in state.player.specials.iter_mut() {
        if special.ready(now) {
            special.last_used = Some(now);
            volleys.push((special.kind, special.damage()));
        }
    }

    let fired = volleys.len();
    for (kind, damage) in volleys {
        match kind {
            SpecialKind::Nova => {
                let count = kind.projectile_count();
                for i in 0..count {
                    let angle = aim + i as f32 * std::f32::consts::TAU / count as f32;
                    state.spawn_projectile(
                        origin,
                        heading(angle) * PROJECTILE_SPEED,
                        PROJECTILE_RADIUS,
                        damage,
                        kind.pierce(),
                        ProjectileTag::Nova,
                    );
                }
            }
            SpecialKind::Lance => {
                state.spawn_projectile(
                    origin,
                    heading(aim) * PROJECTILE_SPEED,
                    SPECIAL_PROJECTILE_RADIUS,
                    damage,
                    kind.pierce(),
                    ProjectileTag::Lance,
                );
                state.shake(SHAKE_LASER);
            }
        }
    }
    fired
}

/// Move projectiles and drop those that left the world margin or hit an obstacle
pub fn advance_projectiles(state: &mut RunState, world_size: f32) {
    for p in state.projectiles.iter_mut() {
        p.pos += p.vel;
    }
    let obstacles = &state.obstacles;
    state.projectiles.retain(|p| {
        inside_world_margin(p.pos, world_size, PROJECTILE_BOUND_MARGIN)
            && !circle_hits_any(p.pos, p.radius, obstacles)
    });
}

/// Projectile-vs-hostile resolution. Returns the number of hits landed.
pub fn resolve_projectile_hits(state: &mut RunState) -> usize {
    let mult = state.player.total_damage_mult();
    let mut spent = Vec::new();
    let mut impacts = Vec::new();

    for proj in state.projectiles.iter_mut() {
        for hostile in state.hostiles.iter_mut() {
            if hostile.is_dead() || proj.hit_ids.contains(&hostile.id) {
                continue;
            }
            if !circles_overlap(proj.pos, proj.radius, hostile.pos, hostile.radius) {
                continue;
            }
            hostile.take_damage(proj.damage * mult);
            proj.hit_ids.push(hostile.id);
            impacts.push((proj.pos, proj.tag));
            if proj.pierce > 0 {
                proj.pierce -= 1;
            } else {
                spent.push(proj.id);
                break;
            }
        }
    }

    if !spent.is_empty() {
        state.projectiles.retain(|p| !spent.contains(&p.id));
    }
    let hits = impacts.len();
    for (pos, tag) in impacts {
        spawn_particles(state, pos, EffectTint::Projectile(tag), 4);
    }
    hits
}

/// Advance recurring skills by `dt` and trigger any that came due
pub fn update_skills(state: &mut RunState, dt: f32) {
    let mut due = Vec::new();
    for skill in state.player.skills.iter_mut() {
        skill.elapsed += dt;
        let interval = skill.kind.interval();
        if skill.elapsed >= interval {
            skill.elapsed -= interval;
            due.push((skill.kind, skill.level));
        }
    }

    for (kind, level) in due {
        match kind {
            SkillKind::Regeneration => state.player.heal(4.0 * level as f32),
            SkillKind::ShockPulse => {
                let center = state.player.pos;
                let damage = 5.0 * level as f32 * state.player.total_damage_mult();
                for hostile in state.hostiles.iter_mut() {
                    if circles_overlap(center, SHOCK_PULSE_RADIUS, hostile.pos, hostile.radius) {
                        hostile.take_damage(damage);
                    }
                }
                spawn_particles(state, center, EffectTint::Pulse, 12);
            }
        }
    }
}

/// Hostiles touching the player drain health. Returns damage dealt.
pub fn apply_hostile_contact(state: &mut RunState, policy: ContactDamage) -> f32 {
    let now = state.clock;
    let player_pos = state.player.pos;
    let player_radius = state.player.radius;
    let mut damage = 0.0;

    for hostile in state.hostiles.iter_mut() {
        if !circles_overlap(hostile.pos, hostile.radius, player_pos, player_radius) {
            continue;
        }
        match policy {
            ContactDamage::Continuous => damage += CONTACT_DAMAGE,
            ContactDamage::Debounced => {
                let ready = hostile
                    .last_contact
                    .is_none_or(|t| now - t >= CONTACT_DEBOUNCE);
                if ready {
                    hostile.last_contact = Some(now);
                    damage += CONTACT_HIT_DAMAGE;
                }
            }
        }
    }

    if damage > 0.0 {
        state.player.health -= damage;
        state.shake(SHAKE_CONTACT);
    }
    damage
}

/// Remove every hostile at or below zero health, leaving one experience
/// pickup where it fell. Returns the number removed.
pub fn reap_hostiles(state: &mut RunState) -> usize {
    let mut fallen = Vec::new();
    state.hostiles.retain(|h| {
        if h.is_dead() {
            fallen.push(h.pos);
            false
        } else {
            true
        }
    });

    for &pos in &fallen {
        state.spawn_loot(pos, LootKind::Experience);
        spawn_particles(state, pos, EffectTint::Hostile, 15);
    }
    state.hostiles_defeated += fallen.len() as u32;
    fallen.len()
}

//! Read-only views for the rendering and presentation collaborators
//!
//! Built once per frame after the tick. Nothing here feeds back into the
//! simulation; camera jitter draws from the cosmetic RNG only.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::collision::Rect;
use super::phase::RunPhase;
use super::progression::{AbilityId, xp_ratio};
use super::state::{EffectTint, LootKind, RunState};
use super::tick::Simulation;
use super::weapon::ProjectileTag;
use crate::angle_between;

/// Display colours (0xRRGGBB)
pub mod palette {
    pub const PLAYER: u32 = 0xf1c40f;
    pub const HOSTILE: u32 = 0xff4757;
    pub const ELITE: u32 = 0xa55eea;
    pub const CHEST: u32 = 0x00ff88;
    pub const CHEST_OPENED: u32 = 0x1a1a1a;
    pub const OBSTACLE: u32 = 0x111122;
    pub const EXTRACTION: u32 = 0x00ff88;
    pub const CURRENCY: u32 = 0xf1c40f;
    pub const AMMO: u32 = 0x00d2ff;
    pub const EXPERIENCE: u32 = 0xa55eea;
    pub const PULSE: u32 = 0x7bed9f;
}

pub fn projectile_color(tag: ProjectileTag) -> u32 {
    match tag {
        ProjectileTag::Standard => 0x00d2ff,
        ProjectileTag::Shotgun => 0xf39c12,
        ProjectileTag::Sniper => 0x3498db,
        ProjectileTag::Bubble => 0x9b59b6,
        ProjectileTag::Laser => 0x00f2ff,
        ProjectileTag::Nova => 0xff9f43,
        ProjectileTag::Lance => 0xffffff,
    }
}

pub fn tint_color(tint: EffectTint) -> u32 {
    match tint {
        EffectTint::Projectile(tag) => projectile_color(tag),
        EffectTint::Hostile => palette::HOSTILE,
        EffectTint::Chest => palette::CHEST,
        EffectTint::Pulse => palette::PULSE,
    }
}

pub fn loot_color(kind: LootKind) -> u32 {
    match kind {
        LootKind::Currency => palette::CURRENCY,
        LootKind::Ammo => palette::AMMO,
        LootKind::Experience => palette::EXPERIENCE,
    }
}

/// A drawable circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CircleView {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub color: u32,
    /// 0-1, 1 for entities without health
    pub health_ratio: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticleView {
    pub pos: Vec2,
    pub size: f32,
    pub color: u32,
    /// Remaining life as opacity
    pub alpha: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneView {
    pub pos: Vec2,
    pub radius: f32,
    /// Direction from the player to the zone, for an edge indicator
    pub bearing: f32,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub phase: RunPhase,
    /// Add to world coordinates to get screen coordinates
    pub camera_offset: Vec2,
    pub player: CircleView,
    pub player_angle: f32,
    pub hostiles: Vec<CircleView>,
    pub projectiles: Vec<CircleView>,
    pub loot: Vec<CircleView>,
    pub chests: Vec<CircleView>,
    pub obstacles: Vec<Rect>,
    pub particles: Vec<ParticleView>,
    pub extraction: Option<ZoneView>,
}

/// Plain values for the presentation collaborator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudView {
    pub phase: RunPhase,
    /// Rounded up so a sliver of health never reads as zero
    pub health: u32,
    pub max_health: u32,
    pub currency: u32,
    pub extraction_threshold: u32,
    pub ammo: u32,
    pub xp_ratio: f32,
    pub level: u32,
    pub weapon: &'static str,
    /// Whole seconds left on the extraction countdown
    pub countdown: Option<u32>,
    /// Progress (0-1) of the chest currently being opened
    pub chest_progress: Option<f32>,
    /// Pending level-up choices
    pub offer: Vec<(AbilityId, &'static str)>,
}

/// Camera offset for a viewport centred on the player, jittered by shake
pub fn camera_offset(state: &mut RunState, viewport: Vec2) -> Vec2 {
    let mut offset = viewport / 2.0 - state.player.pos;
    if state.screen_shake > 0.0 {
        let shake = state.screen_shake;
        offset.x += (state.fx_rng.random::<f32>() - 0.5) * shake;
        offset.y += (state.fx_rng.random::<f32>() - 0.5) * shake;
    }
    offset
}

impl Simulation {
    /// Frame snapshot for a viewport of `viewport` pixels
    pub fn snapshot(&mut self, viewport: Vec2) -> RenderSnapshot {
        let camera_offset = camera_offset(&mut self.state, viewport);
        let s = &self.state;
        let p = &s.player;

        RenderSnapshot {
            phase: s.phase,
            camera_offset,
            player: CircleView {
                id: 0,
                pos: p.pos,
                radius: p.radius,
                color: palette::PLAYER,
                health_ratio: (p.health / p.max_health).clamp(0.0, 1.0),
            },
            player_angle: p.angle,
            hostiles: s
                .hostiles
                .iter()
                .map(|h| CircleView {
                    id: h.id,
                    pos: h.pos,
                    radius: h.radius,
                    color: if h.elite { palette::ELITE } else { palette::HOSTILE },
                    health_ratio: h.health_ratio(),
                })
                .collect(),
            projectiles: s
                .projectiles
                .iter()
                .map(|b| CircleView {
                    id: b.id,
                    pos: b.pos,
                    radius: b.radius,
                    color: projectile_color(b.tag),
                    health_ratio: 1.0,
                })
                .collect(),
            loot: s
                .loot
                .iter()
                .map(|l| CircleView {
                    id: l.id,
                    pos: l.pos,
                    radius: l.radius,
                    color: loot_color(l.kind),
                    health_ratio: 1.0,
                })
                .collect(),
            chests: s
                .chests
                .iter()
                .map(|c| CircleView {
                    id: c.id,
                    pos: c.pos,
                    radius: c.radius,
                    color: if c.opened {
                        palette::CHEST_OPENED
                    } else {
                        palette::CHEST
                    },
                    health_ratio: 1.0,
                })
                .collect(),
            obstacles: s.obstacles.clone(),
            particles: s
                .particles
                .iter()
                .map(|pt| ParticleView {
                    pos: pt.pos,
                    size: pt.size,
                    color: tint_color(pt.tint),
                    alpha: pt.life.clamp(0.0, 1.0),
                })
                .collect(),
            extraction: s.extraction.as_ref().map(|z| ZoneView {
                pos: z.pos,
                radius: z.radius,
                bearing: angle_between(p.pos, z.pos),
            }),
        }
    }

    pub fn hud(&self) -> HudView {
        let s = &self.state;
        let p = &s.player;
        let chest_progress = s
            .chests
            .iter()
            .find(|c| !c.opened && c.progress > 0.0)
            .map(|c| (c.progress / crate::consts::CHEST_OPEN_TIME).min(1.0));

        HudView {
            phase: s.phase,
            health: p.health.max(0.0).ceil() as u32,
            max_health: p.max_health.ceil() as u32,
            currency: p.currency,
            extraction_threshold: self.config.extraction_threshold,
            ammo: p.ammo,
            xp_ratio: xp_ratio(p),
            level: p.level,
            weapon: p.active_weapon().name(),
            countdown: s
                .extraction
                .as_ref()
                .map(|z| z.remaining.max(0.0).ceil() as u32),
            chest_progress,
            offer: self
                .offer
                .iter()
                .filter_map(|&id| self.catalog().get(id).map(|d| (id, d.name)))
                .collect(),
        }
    }
}

//! Simulation driver
//!
//! `Simulation` owns the run state between frame signals and composes the
//! per-tick order: movement, combat, loot, then run-state evaluation. Only the
//! active phase simulates; pausing or ending a run stops ticking at once.

use glam::Vec2;

use super::combat::{
    advance_projectiles, apply_hostile_contact, fire_specials, fire_weapon, reap_hostiles,
    resolve_projectile_hits, update_skills,
};
use super::movement::{direction_delta, move_hostiles, move_player};
use super::phase::{DeathCause, RunOutcome, RunPhase};
use super::pickup::{collect_loot, update_chests, update_particles};
use super::progression::{AbilityCatalog, AbilityId, apply_ability, check_level_up};
use super::state::{ExtractionZone, Player, RunState};
use super::worldgen::{generate_world, sample_extraction_point};
use crate::angle_between;
use crate::config::SimConfig;
use crate::consts::SHAKE_DECAY;
use crate::error::{ConfigError, PhaseError};
use crate::persistence::ProgressionRecord;

/// Where the player is aiming this tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Aim {
    /// Keep the current facing
    #[default]
    Hold,
    /// A world-space target
    World(Vec2),
    /// A pointer on a viewport centred on the player
    Screen { pointer: Vec2, viewport: Vec2 },
}

impl Aim {
    /// Facing angle for a player at `player_pos`, if the aim names one
    pub fn angle(&self, player_pos: Vec2) -> Option<f32> {
        match *self {
            Aim::Hold => None,
            Aim::World(target) => Some(angle_between(player_pos, target)),
            Aim::Screen { pointer, viewport } => Some(angle_between(viewport / 2.0, pointer)),
        }
    }
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Fire held
    pub fire: bool,
    pub aim: Aim,
    /// Advance to the next equipped weapon (one-shot)
    pub cycle_weapon: bool,
    /// Fire ready special attacks (one-shot)
    pub special: bool,
}

/// What a tick produced
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Continue,
    /// Not in the active phase; nothing simulated
    Skipped,
    /// Paused for a choice among `offer`
    LevelUp { offer: Vec<AbilityId> },
    Extracted,
    Died { cause: DeathCause },
}

/// Result of a finished run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub seed: u64,
    pub currency: u32,
    pub level: u32,
    pub hostiles_defeated: u32,
    /// Simulated seconds
    pub elapsed: f32,
}

/// Owned simulation context, retained by the host between frames
pub struct Simulation {
    pub(crate) config: SimConfig,
    catalog: AbilityCatalog,
    base_seed: u64,
    runs_started: u64,
    pub(crate) state: RunState,
    record: ProgressionRecord,
    record_dirty: bool,
    /// Host timestamp (seconds) of the last advanced frame
    last_frame: Option<f64>,
    pub(crate) offer: Vec<AbilityId>,
    summary: Option<RunSummary>,
}

impl Simulation {
    /// Validated simulation with the standard ability catalog
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_catalog(config, AbilityCatalog::standard(), seed)
    }

    pub fn with_catalog(
        config: SimConfig,
        catalog: AbilityCatalog,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if catalog.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        let record = ProgressionRecord::default();
        let state = Self::preparing_state(&config, &record, seed);
        Ok(Self {
            config,
            catalog,
            base_seed: seed,
            runs_started: 0,
            state,
            record,
            record_dirty: false,
            last_frame: None,
            offer: Vec::new(),
            summary: None,
        })
    }

    fn preparing_state(config: &SimConfig, record: &ProgressionRecord, seed: u64) -> RunState {
        let player = Player::new(
            config.world_center(),
            record.equipped.clone(),
            &record.upgrades,
            config.first_level_xp,
        );
        RunState::new(seed, player)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn catalog(&self) -> &AbilityCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn phase(&self) -> RunPhase {
        self.state.phase
    }

    /// Progression record as last handed to or produced by a run
    pub fn record(&self) -> &ProgressionRecord {
        &self.record
    }

    /// Abilities on offer while paused for a level-up
    pub fn offer(&self) -> &[AbilityId] {
        &self.offer
    }

    /// Summary of the most recently finished run
    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    /// Updated record after a terminal transition, handed out once
    pub fn take_record_update(&mut self) -> Option<ProgressionRecord> {
        if !self.record_dirty {
            return None;
        }
        self.record_dirty = false;
        Some(self.record.clone())
    }

    /// Preparing -> Active. Generates a fresh world and seeds the player from
    /// the record. `now` is the host timestamp in seconds.
    pub fn start_run(&mut self, record: ProgressionRecord, now: f64) -> Result<(), PhaseError> {
        let phase = self.state.phase;
        if phase != RunPhase::Preparing {
            return Err(PhaseError::InvalidTransition {
                from: phase,
                to: RunPhase::Active,
            });
        }

        let seed = self.base_seed.wrapping_add(self.runs_started);
        self.runs_started += 1;
        self.record = record;
        self.record_dirty = false;
        self.summary = None;
        self.offer.clear();

        let mut state = Self::preparing_state(&self.config, &self.record, seed);
        generate_world(&mut state, &self.config);
        state.phase = state.phase.transition(RunPhase::Active)?;
        self.state = state;
        self.last_frame = Some(now);

        log::info!(
            "Run started (seed {}, loadout {:?}, {:.0} hp)",
            seed,
            self.state.player.loadout,
            self.state.player.max_health
        );
        Ok(())
    }

    /// Tick using the elapsed time since the previous frame, clamped to
    /// `max_tick_dt`
    pub fn advance(&mut self, now: f64, input: &TickInput) -> TickOutcome {
        if !self.state.phase.is_simulating() {
            return TickOutcome::Skipped;
        }
        let dt = match self.last_frame {
            Some(last) => (now - last).max(0.0) as f32,
            None => 0.0,
        };
        self.last_frame = Some(now);
        self.tick(dt, input)
    }

    /// Advance the run by one tick of `dt` seconds
    pub fn tick(&mut self, dt: f32, input: &TickInput) -> TickOutcome {
        if !self.state.phase.is_simulating() {
            return TickOutcome::Skipped;
        }
        let dt = dt.clamp(0.0, self.config.max_tick_dt);
        let world = self.config.world_size;
        let state = &mut self.state;
        state.clock += dt;
        state.ticks += 1;

        // Input
        if let Some(angle) = input.aim.angle(state.player.pos) {
            state.player.angle = angle;
        }
        if input.cycle_weapon {
            state.player.cycle_weapon();
        }

        // Movement
        let delta = direction_delta(
            input.up,
            input.down,
            input.left,
            input.right,
            state.player.speed(),
        );
        move_player(state, delta, world);
        update_chests(state, delta != Vec2::ZERO, dt);
        move_hostiles(state, self.config.hostile_navigation, world);

        // Combat
        fire_weapon(state, input.fire);
        if input.special {
            fire_specials(state);
        }
        advance_projectiles(state, world);
        resolve_projectile_hits(state);
        update_skills(state, dt);
        apply_hostile_contact(state, self.config.contact_damage);
        reap_hostiles(state);

        // Loot and effects
        collect_loot(state);
        update_particles(state, dt);
        state.screen_shake *= SHAKE_DECAY;
        if state.screen_shake < 0.01 {
            state.screen_shake = 0.0;
        }

        self.evaluate(dt)
    }

    /// Run-state evaluation. The level check runs first; terminal outcomes
    /// take precedence over the level-up pause.
    fn evaluate(&mut self, dt: f32) -> TickOutcome {
        let leveled = check_level_up(&mut self.state.player, self.config.xp_growth);

        if self.state.player.is_dead() {
            return self.finish(RunOutcome::Dead(DeathCause::HealthDepleted));
        }

        if !self.state.extraction_open()
            && self.state.player.currency >= self.config.extraction_threshold
        {
            let pos =
                sample_extraction_point(&mut self.state.rng, &self.config, self.state.player.pos);
            log::info!(
                "Extraction zone open at ({:.0}, {:.0}), {:.0}s to reach it",
                pos.x,
                pos.y,
                self.config.extraction_seconds
            );
            self.state.extraction = Some(ExtractionZone {
                pos,
                radius: self.config.extraction_radius,
                remaining: self.config.extraction_seconds,
            });
        }

        let player_pos = self.state.player.pos;
        if let Some(zone) = self.state.extraction.as_mut() {
            zone.remaining -= dt;
            let reached = player_pos.distance(zone.pos) < zone.radius;
            if reached && zone.remaining > 0.0 {
                return self.finish(RunOutcome::Extracted);
            }
            if zone.remaining <= 0.0 {
                return self.finish(RunOutcome::Dead(DeathCause::CountdownExpired));
            }
        }

        if leveled {
            let offer = self
                .catalog
                .draw_offer(&mut self.state.rng, self.config.choice_count);
            if let Err(e) = self.enter(RunPhase::PausedLevelUp) {
                log::error!("Level-up pause refused: {}", e);
                return TickOutcome::Continue;
            }
            log::info!("Level {} reached, offering {:?}", self.state.player.level, offer);
            self.offer = offer.clone();
            return TickOutcome::LevelUp { offer };
        }

        TickOutcome::Continue
    }

    fn enter(&mut self, to: RunPhase) -> Result<(), PhaseError> {
        self.state.phase = self.state.phase.transition(to)?;
        Ok(())
    }

    /// Terminal transition: settle the record and write the summary
    fn finish(&mut self, outcome: RunOutcome) -> TickOutcome {
        let to = match outcome {
            RunOutcome::Extracted => RunPhase::Extracted,
            RunOutcome::Dead(_) => RunPhase::Dead,
        };
        if let Err(e) = self.enter(to) {
            log::error!("Run end refused: {}", e);
            return TickOutcome::Continue;
        }

        let player = &self.state.player;
        match outcome {
            RunOutcome::Extracted => self.record.apply_extraction(player.currency),
            RunOutcome::Dead(_) => self.record.apply_death_rollback(),
        }
        self.record_dirty = true;

        let summary = RunSummary {
            outcome,
            seed: self.state.seed,
            currency: player.currency,
            level: player.level,
            hostiles_defeated: self.state.hostiles_defeated,
            elapsed: self.state.clock,
        };
        log::info!(
            "Run over: {:?} after {:.1}s, level {}, {} currency, {} hostiles defeated",
            summary.outcome,
            summary.elapsed,
            summary.level,
            summary.currency,
            summary.hostiles_defeated
        );
        self.summary = Some(summary);

        match outcome {
            RunOutcome::Extracted => TickOutcome::Extracted,
            RunOutcome::Dead(cause) => TickOutcome::Died { cause },
        }
    }

    /// Apply an offered ability and resume. The frame clock resyncs to `now`
    /// so the pause does not count as elapsed time.
    pub fn choose_ability(&mut self, id: AbilityId, now: f64) -> Result<(), PhaseError> {
        let phase = self.state.phase;
        if phase != RunPhase::PausedLevelUp {
            return Err(PhaseError::InvalidTransition {
                from: phase,
                to: RunPhase::Active,
            });
        }
        if !self.offer.contains(&id) {
            return Err(PhaseError::NotOffered(id));
        }

        match self.catalog.get(id) {
            Some(def) => apply_ability(&mut self.state.player, def),
            None => log::warn!("Ability {} missing from catalog, ignoring", id.as_str()),
        }
        self.enter(RunPhase::Active)?;
        self.offer.clear();
        self.last_frame = Some(now);
        Ok(())
    }

    /// Leave a finished run. The next `start_run` builds a new world.
    pub fn return_to_preparation(&mut self) -> Result<(), PhaseError> {
        self.enter(RunPhase::Preparing)?;
        let seed = self.base_seed.wrapping_add(self.runs_started);
        self.state = Self::preparing_state(&self.config, &self.record, seed);
        self.last_frame = None;
        self.offer.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContactDamage;
    use crate::persistence::UpgradeKind;
    use crate::sim::autopilot::Autopilot;
    use crate::sim::state::{Hostile, LootKind};
    use crate::sim::weapon::WeaponId;

    /// Empty arena: no obstacles, hostiles, chests or scattered loot
    fn empty_config() -> SimConfig {
        SimConfig {
            obstacle_count: 0,
            hostile_count: 0,
            loot_count: 0,
            chest_count: 0,
            extraction_min_distance: 600.0,
            ..Default::default()
        }
    }

    fn running(config: SimConfig) -> Simulation {
        let mut sim = Simulation::new(config, 7).unwrap();
        sim.start_run(ProgressionRecord::default(), 0.0).unwrap();
        sim
    }

    fn drop_on_player(sim: &mut Simulation, kind: LootKind) {
        let pos = sim.state.player.pos;
        sim.state.spawn_loot(pos, kind);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SimConfig {
            world_size: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            Simulation::new(config, 1),
            Err(ConfigError::NonPositiveWorld(_))
        ));
    }

    #[test]
    fn test_preparing_does_not_simulate() {
        let mut sim = Simulation::new(empty_config(), 1).unwrap();
        assert_eq!(sim.tick(0.016, &TickInput::default()), TickOutcome::Skipped);
        assert_eq!(sim.state.ticks, 0);
    }

    #[test]
    fn test_start_run_twice_is_rejected() {
        let mut sim = running(empty_config());
        assert_eq!(
            sim.start_run(ProgressionRecord::default(), 1.0),
            Err(PhaseError::InvalidTransition {
                from: RunPhase::Active,
                to: RunPhase::Active
            })
        );
    }

    #[test]
    fn test_extraction_zone_gated_by_currency() {
        let mut sim = running(empty_config());
        let input = TickInput::default();
        for _ in 0..4 {
            drop_on_player(&mut sim, LootKind::Currency);
            assert_eq!(sim.tick(0.016, &input), TickOutcome::Continue);
            assert!(sim.state.extraction.is_none());
        }
        drop_on_player(&mut sim, LootKind::Currency);
        sim.tick(0.016, &input);
        let zone = sim.state.extraction.clone().expect("zone at threshold");

        for _ in 0..20 {
            drop_on_player(&mut sim, LootKind::Currency);
            sim.tick(0.016, &input);
            let now = sim.state.extraction.as_ref().unwrap();
            assert_eq!(now.pos, zone.pos);
        }
        assert!(sim.state.extraction.as_ref().unwrap().remaining < zone.remaining);
    }

    #[test]
    fn test_reaching_zone_extracts_and_banks_currency() {
        let mut sim = running(empty_config());
        for _ in 0..6 {
            drop_on_player(&mut sim, LootKind::Currency);
        }
        sim.tick(0.016, &TickInput::default());
        let zone = sim.state.extraction.clone().unwrap();
        sim.state.player.pos = zone.pos;

        assert_eq!(sim.tick(0.016, &TickInput::default()), TickOutcome::Extracted);
        assert_eq!(sim.phase(), RunPhase::Extracted);
        let record = sim.take_record_update().unwrap();
        assert_eq!(record.currency, 6);
        assert!(sim.take_record_update().is_none());
        let summary = sim.summary().unwrap();
        assert_eq!(summary.outcome, RunOutcome::Extracted);
        assert_eq!(summary.currency, 6);
    }

    #[test]
    fn test_countdown_expiry_kills_and_rolls_back() {
        let config = SimConfig {
            extraction_seconds: 0.5,
            ..empty_config()
        };
        let mut sim = Simulation::new(config, 3).unwrap();
        let mut record = ProgressionRecord {
            currency: 100,
            ..Default::default()
        };
        record.purchase_weapon(WeaponId::Sniper).unwrap();
        record.toggle_equip(WeaponId::Sniper).unwrap();
        record.purchase_upgrade(UpgradeKind::Vitality).unwrap();
        sim.start_run(record.clone(), 0.0).unwrap();
        assert_eq!(sim.state.player.max_health, 110.0);

        for _ in 0..5 {
            drop_on_player(&mut sim, LootKind::Currency);
        }
        let mut outcome = TickOutcome::Continue;
        for _ in 0..10 {
            outcome = sim.tick(0.1, &TickInput::default());
            if outcome != TickOutcome::Continue {
                break;
            }
        }
        assert_eq!(
            outcome,
            TickOutcome::Died {
                cause: DeathCause::CountdownExpired
            }
        );
        let updated = sim.take_record_update().unwrap();
        assert_eq!(updated.equipped, vec![WeaponId::Standard]);
        assert_eq!(updated.owned, record.owned);
        assert_eq!(updated.currency, record.currency);
        assert_eq!(sim.tick(0.1, &TickInput::default()), TickOutcome::Skipped);
    }

    #[test]
    fn test_contact_death() {
        let mut sim = running(empty_config());
        let pos = sim.state.player.pos;
        let id = sim.state.next_entity_id();
        sim.state.hostiles.push(Hostile::new(id, pos));
        sim.state.player.health = 1.5;

        assert_eq!(sim.tick(0.016, &TickInput::default()), TickOutcome::Continue);
        assert_eq!(
            sim.tick(0.016, &TickInput::default()),
            TickOutcome::Died {
                cause: DeathCause::HealthDepleted
            }
        );
        assert_eq!(
            sim.summary().unwrap().outcome,
            RunOutcome::Dead(DeathCause::HealthDepleted)
        );
    }

    #[test]
    fn test_debounced_contact_is_gentler() {
        let config = SimConfig {
            contact_damage: ContactDamage::Debounced,
            ..empty_config()
        };
        let mut sim = running(config);
        let pos = sim.state.player.pos;
        let id = sim.state.next_entity_id();
        sim.state.hostiles.push(Hostile::new(id, pos));
        for _ in 0..20 {
            sim.tick(0.016, &TickInput::default());
        }
        assert_eq!(sim.state.player.health, 90.0);
    }

    #[test]
    fn test_level_up_pauses_and_resumes() {
        let mut sim = running(empty_config());
        for _ in 0..3 {
            drop_on_player(&mut sim, LootKind::Experience);
        }
        let offer = match sim.tick(0.016, &TickInput::default()) {
            TickOutcome::LevelUp { offer } => offer,
            other => panic!("expected level-up, got {other:?}"),
        };
        assert_eq!(offer.len(), 3);
        assert_eq!(sim.phase(), RunPhase::PausedLevelUp);
        assert_eq!(sim.state.player.level, 2);
        assert!((sim.state.player.xp - 20.0).abs() < 1e-4);

        let ticks = sim.state.ticks;
        assert_eq!(sim.advance(5.0, &TickInput::default()), TickOutcome::Skipped);
        assert_eq!(sim.state.ticks, ticks);

        let missing = sim
            .catalog()
            .entries()
            .iter()
            .map(|d| d.id)
            .find(|id| !offer.contains(id))
            .unwrap();
        assert_eq!(
            sim.choose_ability(missing, 10.0),
            Err(PhaseError::NotOffered(missing))
        );
        assert_eq!(sim.phase(), RunPhase::PausedLevelUp);

        sim.choose_ability(offer[0], 10.0).unwrap();
        assert_eq!(sim.phase(), RunPhase::Active);
        assert!(sim.offer().is_empty());

        // Resumed clock counts only the time since the choice
        let clock = sim.state.clock;
        sim.advance(10.05, &TickInput::default());
        assert!((sim.state.clock - clock - 0.05).abs() < 1e-4);
    }

    #[test]
    fn test_offered_ability_missing_from_catalog_is_ignored() {
        use crate::sim::progression::{AbilityDef, AbilityEffect};

        let catalog = AbilityCatalog::new(vec![AbilityDef {
            id: AbilityId::HardenedRounds,
            name: "Hardened Rounds",
            effect: AbilityEffect::DamageMult(1.3),
        }])
        .unwrap();
        let mut sim = Simulation::with_catalog(empty_config(), catalog, 7).unwrap();
        sim.start_run(ProgressionRecord::default(), 0.0).unwrap();
        for _ in 0..3 {
            drop_on_player(&mut sim, LootKind::Experience);
        }
        let offer = match sim.tick(0.016, &TickInput::default()) {
            TickOutcome::LevelUp { offer } => offer,
            other => panic!("expected level-up, got {other:?}"),
        };
        assert_eq!(offer, vec![AbilityId::HardenedRounds]);

        sim.offer = vec![AbilityId::Lance];
        let before = sim.state.player.clone();
        sim.choose_ability(AbilityId::Lance, 1.0).unwrap();

        let after = &sim.state.player;
        assert_eq!(sim.phase(), RunPhase::Active);
        assert_eq!(after.damage_mult, before.damage_mult);
        assert_eq!(after.fire_interval_mult, before.fire_interval_mult);
        assert_eq!(after.speed_mult, before.speed_mult);
        assert_eq!(after.max_health, before.max_health);
        assert!(after.specials.is_empty());
        assert!(after.skills.is_empty());
        assert!(sim.offer().is_empty());
    }

    #[test]
    fn test_choose_while_active_is_rejected() {
        let mut sim = running(empty_config());
        assert_eq!(
            sim.choose_ability(AbilityId::Lance, 1.0),
            Err(PhaseError::InvalidTransition {
                from: RunPhase::Active,
                to: RunPhase::Active
            })
        );
    }

    #[test]
    fn test_advance_clamps_large_gaps() {
        let mut sim = running(empty_config());
        sim.advance(30.0, &TickInput::default());
        assert!((sim.state.clock - sim.config.max_tick_dt).abs() < 1e-6);
        // Clock going backwards is a zero-length tick
        sim.advance(29.0, &TickInput::default());
        assert!((sim.state.clock - sim.config.max_tick_dt).abs() < 1e-6);
    }

    #[test]
    fn test_return_to_preparation_only_after_run_end() {
        let mut sim = running(empty_config());
        assert!(sim.return_to_preparation().is_err());
        sim.state.player.health = 0.0;
        sim.tick(0.016, &TickInput::default());
        sim.return_to_preparation().unwrap();
        assert_eq!(sim.phase(), RunPhase::Preparing);
        sim.start_run(sim.record().clone(), 100.0).unwrap();
        assert_eq!(sim.phase(), RunPhase::Active);
        assert!(sim.summary().is_none());
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = || {
            let mut sim = Simulation::new(SimConfig::default(), 99).unwrap();
            sim.start_run(ProgressionRecord::default(), 0.0).unwrap();
            let mut pilot = Autopilot::default();
            for i in 1..=600 {
                let input = pilot.input(&sim);
                match sim.advance(i as f64 / 60.0, &input) {
                    TickOutcome::LevelUp { offer } => {
                        sim.choose_ability(offer[0], i as f64 / 60.0).unwrap();
                    }
                    TickOutcome::Continue => {}
                    _ => break,
                }
            }
            (
                sim.state.player.pos,
                sim.state.player.health,
                sim.state.hostiles.len(),
                sim.state.player.currency,
                sim.state.ticks,
            )
        };
        assert_eq!(run(), run());
    }
}

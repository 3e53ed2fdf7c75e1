//! The reactor core aggregate and its fixed-timestep tick.
//!
//! `ReactorCore` owns every piece of mutable simulation state — neutron
//! pool, rod lattice, control-rod scalar, thermal/demand model — and is
//! driven by an external fixed-rate caller invoking [`ReactorCore::tick`].
//! It never blocks and never fails mid-tick; presentation layers read
//! state between ticks.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{Error, Result};
use crate::grid::{RodGrid, RodKind};
use crate::input::RodCommand;
use crate::math::Vec3;
use crate::pool::NeutronPool;
use crate::state::{GamePhase, PlantEvent, PlantState};

/// All tuning values, fixed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Expected external tick rate [Hz]; per-second rates are scaled by it.
    pub tick_rate: f64,
    pub core_radius: f64,
    pub core_height: f64,
    pub rod_radius: f64,
    pub rod_spacing: f64,
    /// Control-rod travel speed [units/s].
    pub control_rod_speed: f64,
    pub max_neutrons: usize,
    /// Probability that a fuel-rod hit induces fission.
    pub fission_probability: f64,
    pub fuel_rod_heat: f64,
    pub control_rod_heat: f64,
    /// Fraction of excess heat removed per tick at the reference rate.
    pub cooling_rate: f64,
    pub ambient_temp: f64,
    pub starting_heat: f64,
    pub failure_temp: f64,
    /// Per-degree-of-excess explosion probability coefficient.
    pub explosion_probability: f64,
    pub demand_change_rate: f64,
    pub min_demand: f64,
    pub max_demand: f64,
    /// Neutron speed sample range [units/s].
    pub neutron_speed_min: f64,
    pub neutron_speed_max: f64,
    /// Mean startup-source emission rate [neutrons/s].
    pub startup_emission_rate: f64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            tick_rate: constants::TICKS_PER_SECOND,
            core_radius: constants::CORE_RADIUS,
            core_height: constants::CORE_HEIGHT,
            rod_radius: constants::ROD_RADIUS,
            rod_spacing: constants::ROD_SPACING,
            control_rod_speed: constants::CONTROL_ROD_SPEED,
            max_neutrons: constants::MAX_NEUTRONS,
            fission_probability: constants::P_NEUTRON,
            fuel_rod_heat: constants::FUEL_ROD_HEAT,
            control_rod_heat: constants::CONTROL_ROD_HEAT,
            cooling_rate: constants::COOLING_RATE,
            ambient_temp: constants::AMBIENT_TEMP,
            starting_heat: constants::STARTING_HEAT,
            failure_temp: constants::FAILURE_TEMP,
            explosion_probability: constants::PROB_GAME_OVER,
            demand_change_rate: constants::DEMAND_CHANGE_RATE,
            min_demand: constants::MIN_DEMAND,
            max_demand: constants::MAX_DEMAND,
            neutron_speed_min: constants::NEUTRON_SPEED_MIN,
            neutron_speed_max: constants::NEUTRON_SPEED_MAX,
            startup_emission_rate: constants::STARTUP_EMISSION_RATE,
        }
    }
}

impl CoreConfig {
    fn validate(&self) -> Result<()> {
        fn positive(name: &str, v: f64) -> Result<()> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!("{name} must be finite and > 0, got {v}")))
            }
        }
        fn probability(name: &str, v: f64) -> Result<()> {
            if v.is_finite() && (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!("{name} must be in [0, 1], got {v}")))
            }
        }

        positive("tick_rate", self.tick_rate)?;
        positive("core_radius", self.core_radius)?;
        positive("core_height", self.core_height)?;
        positive("rod_radius", self.rod_radius)?;
        positive("rod_spacing", self.rod_spacing)?;
        probability("fission_probability", self.fission_probability)?;
        if self.max_neutrons == 0 {
            return Err(Error::InvalidConfig("max_neutrons must be > 0".into()));
        }
        if self.min_demand >= self.max_demand {
            return Err(Error::InvalidConfig(format!(
                "min_demand ({}) must be below max_demand ({})",
                self.min_demand, self.max_demand
            )));
        }
        if self.neutron_speed_min >= self.neutron_speed_max {
            return Err(Error::InvalidConfig(
                "neutron_speed_min must be below neutron_speed_max".into(),
            ));
        }
        if !self.cooling_rate.is_finite() || self.cooling_rate < 0.0 {
            return Err(Error::InvalidConfig("cooling_rate must be finite and >= 0".into()));
        }
        Ok(())
    }
}

/// Read-only scalar view of the core, for rendering and telemetry.
/// Live neutron positions are exposed separately via
/// [`ReactorCore::neutron_positions`] to avoid per-frame allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreSnapshot {
    pub core_temp: f64,
    pub demanded_heat: f64,
    pub control_rod_pos_y: f64,
    pub is_game_started: bool,
    pub is_game_over: bool,
    pub is_nuke_exploded: bool,
    pub is_power_outage: bool,
    pub neutron_count: usize,
    pub dropped_neutrons: u64,
}

/// The simulation core. See the module docs for the ownership model.
#[derive(Debug)]
pub struct ReactorCore {
    config: CoreConfig,
    grid: RodGrid,
    pool: NeutronPool,
    state: PlantState,
    /// How far up from the bottom the control rods are withdrawn;
    /// neutrons at or above this height can be absorbed.
    control_rod_pos_y: f64,
    rod_command: RodCommand,
    startup_active: bool,
    rng: StdRng,
}

impl ReactorCore {
    /// Build a core with an entropy-seeded RNG.
    pub fn new(config: CoreConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Build a core with a fixed seed, for reproducible runs and tests.
    pub fn seeded(config: CoreConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: CoreConfig, rng: StdRng) -> Result<Self> {
        config.validate()?;
        let grid = RodGrid::new(config.rod_spacing, config.rod_radius);
        let pool = NeutronPool::new(config.max_neutrons);
        let state = PlantState::new(&config);
        Ok(Self {
            config,
            grid,
            pool,
            state,
            control_rod_pos_y: 0.0,
            rod_command: RodCommand::Hold,
            startup_active: false,
            rng,
        })
    }

    // ── Inbound commands ────────────────────────────────────────────────

    pub fn set_rod_command(&mut self, command: RodCommand) {
        self.rod_command = command;
    }

    /// While active (and the game has not started), the manual neutron
    /// source emits into the core edge.
    pub fn set_startup_active(&mut self, active: bool) {
        self.startup_active = active;
    }

    /// Insert a neutron directly. Exceeding pool capacity drops the
    /// neutron silently; a frozen (exploded) core ignores the call.
    /// Returns whether a neutron was actually created.
    pub fn inject_neutron(&mut self, position: Vec3, velocity: Vec3) -> bool {
        if self.state.is_exploded() {
            return false;
        }
        match self.pool.allocate(position, velocity) {
            Ok(_) => true,
            Err(_) => {
                log::debug!("neutron pool exhausted, emission dropped");
                false
            }
        }
    }

    /// Add heat directly to the core, bypassing neutron transport.
    pub fn increment_temperature(&mut self, amount: f64) {
        self.state.increment_temperature(amount);
    }

    // ── Tick ────────────────────────────────────────────────────────────

    /// Advance the simulation one fixed timestep.
    ///
    /// Order matters and is part of the contract: trigger evaluation,
    /// then the demand walk, then neutron/rod physics, then cooling.
    /// Later phases read flags set by earlier ones. After an explosion
    /// the physics state is frozen; only the demand decay keeps running.
    pub fn tick(&mut self) {
        self.state.evaluate_triggers(&self.config, &mut self.rng);
        self.state.demand_tick(&self.config, &mut self.rng);
        if !self.state.is_exploded() {
            self.physics_tick();
        }
        self.state.cooling_tick(&self.config);
    }

    fn physics_tick(&mut self) {
        // Manual neutron source, only before the reactor has started up.
        if !self.state.is_game_started() && self.startup_active {
            let p = self.config.startup_emission_rate / self.config.tick_rate;
            if self.rng.gen::<f64>() < p {
                self.emit_startup_neutron();
            }
        }

        self.move_control_rods();
        self.transport_neutrons();
    }

    fn move_control_rods(&mut self) {
        let dir = self.rod_command.direction();
        if dir == 0.0 {
            return;
        }
        let step = self.config.control_rod_speed / self.config.tick_rate;
        self.control_rod_pos_y =
            (self.control_rod_pos_y + dir * step).clamp(0.0, self.config.core_height);
    }

    /// Advance every active neutron and resolve boundary exits, fuel-rod
    /// fission and control-rod absorption.
    ///
    /// Removal swaps the last active slot into the current index, so the
    /// loop re-tests the same index after a removal instead of
    /// advancing. Children spawned by fission are appended to the active
    /// range and therefore take their first transport step within the
    /// same pass.
    fn transport_neutrons(&mut self) {
        let rod_radius = self.grid.radius();
        let mut i = 0;
        while i < self.pool.active_count() {
            let p = self.pool.advance(i);

            // Boundary exit: escape, not absorption — no heat.
            if p.y < 0.0 || p.y > self.config.core_height || p.radial_xz() > self.config.core_radius
            {
                self.pool.release(i);
                continue;
            }

            // Fuel rods are tested before control rods; first found in
            // lattice order wins.
            let mut fuel_hit = None;
            for rod in self.grid.cells_of_kind(RodKind::Fuel) {
                if (p.x - rod.x).hypot(p.z - rod.z) < rod_radius {
                    fuel_hit = Some((rod.x, rod.z));
                    break;
                }
            }
            if let Some((rx, rz)) = fuel_hit {
                self.state.increment_temperature(self.config.fuel_rod_heat);
                self.pool.release(i);
                if self.rng.gen::<f64>() < self.config.fission_probability {
                    self.spawn_fission_children(rx, rz, p.y);
                }
                continue;
            }

            // Control rods absorb only above the insertion height;
            // neutrons below it pass through unobstructed.
            if p.y >= self.control_rod_pos_y {
                let mut absorbed = false;
                for rod in self.grid.cells_of_kind(RodKind::Control) {
                    if (p.x - rod.x).hypot(p.z - rod.z) < rod_radius {
                        absorbed = true;
                        break;
                    }
                }
                if absorbed {
                    self.state.increment_temperature(self.config.control_rod_heat);
                    self.pool.release(i);
                    continue;
                }
            }

            i += 1;
        }
    }

    /// Induced fission: three children leave the hit rod at the impact
    /// height, in randomized outward directions.
    fn spawn_fission_children(&mut self, rod_x: f64, rod_z: f64, y: f64) {
        let rod_radius = self.grid.radius();
        for _ in 0..constants::FISSION_YIELD {
            let angle = self.rng.gen::<f64>() * std::f64::consts::TAU;
            let dir = Vec3::new(angle.cos(), self.rng.gen_range(-1.0..1.0), angle.sin());
            let position = Vec3::new(
                rod_x + dir.x * rod_radius * 1.01,
                y,
                rod_z + dir.z * rod_radius * 1.01,
            );
            self.emit(position, dir);
        }
    }

    fn emit_startup_neutron(&mut self) {
        let position = Vec3::new(
            self.config.core_radius - 0.001,
            self.config.core_height / 2.0,
            0.0,
        );
        let dir = Vec3::new(
            -1.0,
            self.rng.gen_range(-1.0..1.0),
            self.rng.gen_range(-1.0..1.0),
        );
        self.emit(position, dir);
    }

    /// Normalize `dir`, scale by a sampled speed, and allocate. Pool
    /// exhaustion drops the neutron silently (counted by the pool).
    fn emit(&mut self, position: Vec3, dir: Vec3) {
        let speed = self
            .rng
            .gen_range(self.config.neutron_speed_min..self.config.neutron_speed_max)
            / self.config.tick_rate;
        let velocity = dir.normalize() * speed;
        if self.pool.allocate(position, velocity).is_err() {
            log::debug!("neutron pool exhausted, emission dropped");
        }
    }

    // ── Outbound readable state ─────────────────────────────────────────

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn grid(&self) -> &RodGrid {
        &self.grid
    }

    pub fn core_temp(&self) -> f64 {
        self.state.core_temp()
    }

    pub fn demanded_heat(&self) -> f64 {
        self.state.demanded_heat()
    }

    /// Control-rod insertion scalar, in `[0, core_height]`.
    pub fn control_rod_pos_y(&self) -> f64 {
        self.control_rod_pos_y
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    pub fn is_game_started(&self) -> bool {
        self.state.is_game_started()
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    pub fn is_nuke_exploded(&self) -> bool {
        self.state.is_exploded()
    }

    pub fn is_power_outage(&self) -> bool {
        self.state.is_power_outage()
    }

    pub fn neutron_count(&self) -> usize {
        self.pool.active_count()
    }

    /// Live neutron positions, valid until the next mutation.
    pub fn neutron_positions(&self) -> &[Vec3] {
        self.pool.active_positions()
    }

    /// Emissions dropped because the pool was full.
    pub fn dropped_neutrons(&self) -> u64 {
        self.pool.dropped_count()
    }

    /// Take the transition events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlantEvent> {
        self.state.drain_events()
    }

    pub fn snapshot(&self) -> CoreSnapshot {
        CoreSnapshot {
            core_temp: self.core_temp(),
            demanded_heat: self.demanded_heat(),
            control_rod_pos_y: self.control_rod_pos_y,
            is_game_started: self.is_game_started(),
            is_game_over: self.is_game_over(),
            is_nuke_exploded: self.is_nuke_exploded(),
            is_power_outage: self.is_power_outage(),
            neutron_count: self.neutron_count(),
            dropped_neutrons: self.dropped_neutrons(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ReactorCore::new(CoreConfig::default()).is_ok());
    }

    #[test]
    fn bad_config_is_rejected() {
        let mut cfg = CoreConfig::default();
        cfg.tick_rate = 0.0;
        assert!(ReactorCore::new(cfg).is_err());

        let mut cfg = CoreConfig::default();
        cfg.fission_probability = 1.5;
        assert!(ReactorCore::new(cfg).is_err());

        let mut cfg = CoreConfig::default();
        cfg.min_demand = 3000.0;
        assert!(ReactorCore::new(cfg).is_err());
    }

    #[test]
    fn rod_travel_is_clamped() {
        let cfg = CoreConfig::default();
        let height = cfg.core_height;
        let mut core = ReactorCore::seeded(cfg, 1).unwrap();

        core.set_rod_command(RodCommand::Lower);
        for _ in 0..100 {
            core.tick();
        }
        assert_eq!(core.control_rod_pos_y(), 0.0);

        core.set_rod_command(RodCommand::Raise);
        // 2 units/s at 200 Hz: full travel takes 400 ticks.
        for _ in 0..500 {
            core.tick();
        }
        assert_eq!(core.control_rod_pos_y(), height);

        core.set_rod_command(RodCommand::Hold);
        core.tick();
        assert_eq!(core.control_rod_pos_y(), height);
    }

    #[test]
    fn startup_source_emits_inside_the_core() {
        let cfg = CoreConfig::default();
        let mut core = ReactorCore::seeded(cfg, 99).unwrap();
        core.set_startup_active(true);
        let mut saw_neutron = false;
        for _ in 0..2000 {
            core.tick();
            if core.neutron_count() > 0 {
                saw_neutron = true;
                break;
            }
        }
        assert!(saw_neutron, "startup source never emitted in 2000 ticks");
        let p = core.neutron_positions()[0];
        assert!(p.radial_xz() <= core.config().core_radius);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let core = ReactorCore::seeded(CoreConfig::default(), 5).unwrap();
        let snap = core.snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let back: CoreSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.core_temp, snap.core_temp);
        assert!(!back.is_game_started);
    }
}

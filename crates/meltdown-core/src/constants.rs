//! Default tuning constants for the reactor core.
//!
//! These are the values the game ships with; `CoreConfig::default()` is
//! built from them. Everything is fixed at construction — there is no
//! runtime reconfiguration.

/// Fixed simulation rate the external driver is expected to run at [Hz].
pub const TICKS_PER_SECOND: f64 = 200.0;

// ── Thermal / demand ────────────────────────────────────────────────────

/// Core temperature at which the game transitions to started [°C].
pub const STARTING_HEAT: f64 = 1000.0;
/// Ambient temperature the core cools toward [°C].
pub const AMBIENT_TEMP: f64 = 25.0;
/// Above this temperature, explosion becomes probabilistic [°C].
pub const FAILURE_TEMP: f64 = 2000.0;
/// Per-tick explosion probability coefficient per degree of excess.
pub const PROB_GAME_OVER: f64 = 0.0025;
/// Fraction of the excess over ambient removed per tick, defined at the
/// 200 Hz reference rate.
pub const COOLING_RATE: f64 = 0.01;
/// Maximum demanded-heat random walk step [per second].
pub const DEMAND_CHANGE_RATE: f64 = 2000.0;
/// Demanded heat soft bounds.
pub const MAX_DEMAND: f64 = 2000.0;
pub const MIN_DEMAND: f64 = 200.0;

// ── Core geometry ───────────────────────────────────────────────────────

pub const CORE_RADIUS: f64 = 2.0;
pub const CORE_HEIGHT: f64 = 4.0;
/// Radius of every fuel and control rod.
pub const ROD_RADIUS: f64 = 0.1;
/// Lattice pitch between rod centers.
pub const ROD_SPACING: f64 = 0.5;
/// Control rod travel speed [units per second].
pub const CONTROL_ROD_SPEED: f64 = 2.0;

// ── Neutrons ────────────────────────────────────────────────────────────

/// Pool capacity; emissions beyond this are silently dropped.
pub const MAX_NEUTRONS: usize = 10_000;
/// Probability that a fuel-rod hit induces fission.
pub const P_NEUTRON: f64 = 0.775;
/// Neutrons released per fission event.
pub const FISSION_YIELD: usize = 3;
/// Heat added per fuel-rod hit [°C].
pub const FUEL_ROD_HEAT: f64 = 2.0;
/// Heat added per control-rod absorption [°C].
pub const CONTROL_ROD_HEAT: f64 = 4.0;
/// Neutron speed is sampled uniformly from this range [units per second].
pub const NEUTRON_SPEED_MIN: f64 = 1.5;
pub const NEUTRON_SPEED_MAX: f64 = 2.5;
/// Mean startup-source emission rate while the startup input is held
/// [neutrons per second].
pub const STARTUP_EMISSION_RATE: f64 = 10.0;

//! Thermal/demand model and game state machine.
//!
//! The state machine is one-way: `NotStarted → Running → GameOver`.
//! Game over is sticky and its two causes are mutually exclusive —
//! whichever trigger fires first wins. Transitions push a [`PlantEvent`]
//! so external collaborators (lighting, banners) can react without the
//! core calling into them.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::core::CoreConfig;

/// Why the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverCause {
    /// Core temperature ran away past the failure threshold.
    Exploded,
    /// Core temperature fell below the demanded heat.
    PowerOutage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    NotStarted,
    Running,
    GameOver(GameOverCause),
}

/// Transition notifications, drained by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlantEvent {
    GameStarted { core_temp: f64 },
    NukeExploded { core_temp: f64 },
    PowerOutage { core_temp: f64, demanded_heat: f64 },
}

#[derive(Debug)]
pub struct PlantState {
    core_temp: f64,
    demanded_heat: f64,
    phase: GamePhase,
    events: Vec<PlantEvent>,
}

impl PlantState {
    pub fn new(cfg: &CoreConfig) -> Self {
        Self {
            core_temp: cfg.ambient_temp,
            demanded_heat: 0.0,
            phase: GamePhase::NotStarted,
            events: Vec::new(),
        }
    }

    // ── Readable state ──────────────────────────────────────────────────

    pub fn core_temp(&self) -> f64 {
        self.core_temp
    }

    pub fn demanded_heat(&self) -> f64 {
        self.demanded_heat
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_game_started(&self) -> bool {
        self.phase != GamePhase::NotStarted
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver(_))
    }

    pub fn is_exploded(&self) -> bool {
        self.phase == GamePhase::GameOver(GameOverCause::Exploded)
    }

    pub fn is_power_outage(&self) -> bool {
        self.phase == GamePhase::GameOver(GameOverCause::PowerOutage)
    }

    /// Take all transition events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlantEvent> {
        std::mem::take(&mut self.events)
    }

    /// Add heat to the core. No ceiling: the temperature may exceed the
    /// failure threshold, at which point explosion becomes probabilistic.
    pub fn increment_temperature(&mut self, amount: f64) {
        self.core_temp += amount;
    }

    // ── Per-tick phases, called by the core in a fixed order ────────────

    /// Evaluate the start and game-over triggers. Runs before anything
    /// else in the tick; later phases read the flags set here.
    pub(crate) fn evaluate_triggers(&mut self, cfg: &CoreConfig, rng: &mut impl Rng) {
        // Explosion: soft threshold, probability grows with the excess.
        if self.is_game_started() && self.core_temp > cfg.failure_temp {
            let excess = self.core_temp - cfg.failure_temp;
            if rng.gen::<f64>() < excess * cfg.explosion_probability / cfg.tick_rate {
                self.explode();
            }
        }
        // Power outage: hard threshold, fires deterministically.
        if self.is_game_started() && self.core_temp < self.demanded_heat {
            self.power_outage();
        }
        // Start: one-way, cannot re-trigger.
        if !self.is_game_started() && self.core_temp >= cfg.starting_heat {
            self.start();
        }
    }

    /// Demanded-heat update: a soft-bounded random walk while running,
    /// a fixed decay toward zero after game over.
    pub(crate) fn demand_tick(&mut self, cfg: &CoreConfig, rng: &mut impl Rng) {
        if !self.is_game_started() {
            return;
        }
        let mid = (cfg.max_demand + cfg.min_demand) / 2.0;
        let span = cfg.max_demand - cfg.min_demand;

        let change = if !self.is_game_over() {
            let mut step = (rng.gen::<f64>() - 0.5) * 2.0 * cfg.demand_change_rate;
            // Damp steps heading toward the nearer bound, proportionally
            // to the distance from the midpoint.
            let diff_ratio = ((self.demanded_heat - mid) / span).abs().min(1.0);
            if self.demanded_heat >= mid && step > 0.0 {
                step *= 1.0 - diff_ratio;
            } else if self.demanded_heat <= mid && step < 0.0 {
                step *= 1.0 - diff_ratio;
            }
            step
        } else if self.demanded_heat > 0.0 {
            -cfg.demand_change_rate / 4.0
        } else {
            0.0
        };

        if self.demanded_heat >= 0.0 {
            self.demanded_heat += change / cfg.tick_rate;
        } else {
            self.demanded_heat = 0.0;
        }
    }

    /// First-order decay toward ambient. Frozen after an explosion.
    pub(crate) fn cooling_tick(&mut self, cfg: &CoreConfig) {
        if self.is_exploded() {
            return;
        }
        if self.core_temp > cfg.ambient_temp {
            let excess = self.core_temp - cfg.ambient_temp;
            // The cooling rate is defined at the reference tick rate.
            let rate = cfg.cooling_rate * constants::TICKS_PER_SECOND / cfg.tick_rate;
            self.core_temp -= excess * rate;
        }
    }

    // ── Transitions (idempotent) ────────────────────────────────────────

    fn start(&mut self) {
        if self.is_game_started() {
            return;
        }
        self.phase = GamePhase::Running;
        self.events.push(PlantEvent::GameStarted {
            core_temp: self.core_temp,
        });
        log::info!("game started, core temperature {:.2} °C", self.core_temp);
    }

    fn explode(&mut self) {
        if self.is_game_over() {
            return;
        }
        self.phase = GamePhase::GameOver(GameOverCause::Exploded);
        self.events.push(PlantEvent::NukeExploded {
            core_temp: self.core_temp,
        });
        log::info!(
            "game over: core exploded at {:.2} °C",
            self.core_temp
        );
    }

    fn power_outage(&mut self) {
        if self.is_game_over() {
            return;
        }
        self.phase = GamePhase::GameOver(GameOverCause::PowerOutage);
        self.events.push(PlantEvent::PowerOutage {
            core_temp: self.core_temp,
            demanded_heat: self.demanded_heat,
        });
        log::info!(
            "game over: power outage at {:.2} °C, demanded {:.2}",
            self.core_temp,
            self.demanded_heat
        );
    }
}

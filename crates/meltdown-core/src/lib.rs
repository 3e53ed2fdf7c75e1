//! Meltdown Core - Reactor Simulation Engine
//!
//! A fixed-timestep simulation of a small reactor core: a pooled neutron
//! particle system transported through a 7×7 fuel/control rod lattice,
//! coupled to a thermal/demand model and a one-way game state machine.
//!
//! The crate is a library with no rendering loop of its own. An external
//! driver calls [`ReactorCore::tick`](core::ReactorCore::tick) at a fixed
//! rate (200 Hz by default), feeds in control-rod and startup commands,
//! and reads temperatures, rod position, neutron positions and game-over
//! flags back out between ticks.
//!
//! # Example
//!
//! ```rust
//! use meltdown_core::prelude::*;
//!
//! let mut core = ReactorCore::new(CoreConfig::default()).unwrap();
//! core.set_startup_active(true);
//! for _ in 0..200 {
//!     core.tick(); // one simulated second
//! }
//! println!("core temperature: {:.1} °C", core.core_temp());
//! ```

pub mod constants;
pub mod core;
pub mod error;
pub mod grid;
pub mod input;
pub mod math;
pub mod pool;
pub mod state;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::core::{CoreConfig, CoreSnapshot, ReactorCore};
    pub use crate::error::{Error, Result};
    pub use crate::grid::{Rod, RodGrid, RodKind};
    pub use crate::input::RodCommand;
    pub use crate::math::Vec3;
    pub use crate::state::{GameOverCause, GamePhase, PlantEvent};
}

//! Control-rod command input.

use serde::{Deserialize, Serialize};

/// Three-valued command for the shared control-rod drive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RodCommand {
    Lower,
    #[default]
    Hold,
    Raise,
}

impl RodCommand {
    /// Resolve two held-key flags into a command. Both keys held cancel
    /// each other out to `Hold`.
    pub fn resolve(raise_held: bool, lower_held: bool) -> Self {
        match (raise_held, lower_held) {
            (true, false) => Self::Raise,
            (false, true) => Self::Lower,
            _ => Self::Hold,
        }
    }

    /// Signed travel direction: -1, 0, or +1.
    pub fn direction(self) -> f64 {
        match self {
            Self::Lower => -1.0,
            Self::Hold => 0.0,
            Self::Raise => 1.0,
        }
    }
}

use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors the simulation core can surface.
///
/// The tick path itself is infallible: bad inputs are clamped and
/// invalid transitions ignored. Only construction and explicit pool
/// allocation can fail.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value rejected at construction time.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The neutron pool has no free slot. Expected steady-state behavior
    /// under high activity, not a fault; callers normally drop the
    /// emission and move on.
    #[error("neutron pool exhausted")]
    PoolExhausted,
}

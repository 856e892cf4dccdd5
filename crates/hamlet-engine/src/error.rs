//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the run so that
//! `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration or roster loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: hamlet_core::ConfigError,
    },

    /// Opening, migrating, or writing the entity store failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: hamlet_store::StoreError,
    },

    /// The oracle backend or prompt templates could not be set up.
    #[error("oracle error: {source}")]
    Oracle {
        /// The underlying oracle error.
        #[from]
        source: hamlet_oracle::OracleError,
    },

    /// Building the simulation failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: hamlet_core::TickError,
    },

    /// The simulation loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: hamlet_core::runner::RunnerError,
    },
}

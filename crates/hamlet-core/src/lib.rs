//! Cycle state machine, scheduler, clock, and configuration for the Hamlet
//! simulation.
//!
//! This crate owns the per-agent cycle (Observing, Planning, Executing,
//! Reflecting, Done) and the tick scheduler that runs it over the roster.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `hamlet-config.yaml` into
//!   strongly-typed structs, with environment overrides.
//! - [`roster`] -- Agent profile loading from a directory of JSON files.
//! - [`clock`] -- Tick to day/hour mapping, simulated or wall-clock.
//! - [`decision`] -- Selection and decision policies, seeded [`Dice`].
//! - [`context`] -- Prompt context assembly.
//! - [`cycle`] -- The per-agent cycle.
//! - [`review`] -- End-of-day summaries, wisdom, and plan pruning.
//! - [`state`] -- The owned [`SimulationState`].
//! - [`tick`] -- [`Simulation`] and its single-tick step.
//! - [`runner`] -- The tick loop with operator controls.
//! - [`operator`] -- Shared stop flag and tick interval.
//!
//! [`Dice`]: decision::Dice
//! [`SimulationState`]: state::SimulationState
//! [`Simulation`]: tick::Simulation

pub mod clock;
pub mod config;
pub mod context;
pub mod cycle;
pub mod decision;
pub mod operator;
pub mod review;
pub mod roster;
pub mod runner;
pub mod state;
pub mod tick;

pub use config::{ConfigError, HamletConfig};
pub use cycle::{CycleError, CycleOutcome, CyclePhase};
pub use operator::{OperatorState, SimulationEndReason};
pub use runner::{NoOpCallback, RunLimits, SimulationResult, TickCallback, run_ticks};
pub use state::SimulationState;
pub use tick::{Simulation, TickError, TickStep, TickSummary};

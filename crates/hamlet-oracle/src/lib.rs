//! Oracle adapter for the Hamlet community simulation.
//!
//! The oracle is an external generative-text service. This crate turns the
//! cycle's needs ("pick an agent", "is this worrying", "write a reflection")
//! into prompts, sends them through an [`Oracle`] backend under a timeout,
//! and parses the replies into structured decisions. Every failure is
//! absorbed here and replaced by the phase's documented fallback, so
//! oracle prose never drives control flow directly.
//!
//! # Modules
//!
//! - [`adapter`] -- [`OracleAdapter`], one method per decision
//! - [`config`] -- backend selection and call limits
//! - [`llm`] -- `OpenAI`-compatible and Anthropic HTTP backends
//! - [`parse`] -- tolerant JSON extraction and typed decisions
//! - [`prompt`] -- `minijinja` templates
//! - [`fallback`] -- literal responses used on failure
//! - [`stub`] -- offline and scripted oracles

pub mod adapter;
pub mod config;
pub mod error;
pub mod fallback;
pub mod llm;
pub mod parse;
pub mod prompt;
pub mod request;
pub mod stub;

pub use adapter::{OracleAdapter, OracleSettings};
pub use config::{BackendType, OracleConfig};
pub use error::OracleError;
pub use llm::{LlmBackend, create_backend};
pub use parse::{ActionDecision, ConcernJudgement, PlanningDecision, ReflectionDecision};
pub use prompt::{PromptEngine, RenderedPrompt};
pub use request::{Oracle, OracleRequest, OracleTask};
pub use stub::{ScriptedOracle, StubOracle};

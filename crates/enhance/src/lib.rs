//! ClearCast Enhancement
//!
//! The noise-reduction model is a black box behind two traits:
//! [`EnhancementBackend`] builds a session (the expensive part),
//! [`EnhancementSession`] maps waveforms to cleaned waveforms.
//! [`EnhancementEngine`] owns the process-wide session: lazy
//! initialization at most once, serialized invocation, and independent
//! timeouts around init and enhancement.

pub mod backend;
pub mod engine;

pub use backend::{
    DeepFilterCliBackend, EnhancementBackend, EnhancementSession, PassthroughBackend,
};
pub use engine::{EngineTimeouts, EnhancementEngine};

//! Core orchestration and domain logic for Scout.
//!
//! This crate ties together target discovery, evidence gathering, report
//! synthesis and PDF rendering into one end-to-end run ([`Scout::run`]), and
//! hosts the single-shot helpers that reuse the same collaborators.

pub mod auxiliary;
pub mod gather;
pub mod pipeline;
pub mod roster;
pub mod speech;
pub mod synthesis;

#[cfg(test)]
mod testing;

pub use auxiliary::{Assistant, Battlecard, ResearchTarget, Swot};
pub use gather::{GatherFailure, GatherOptions, GatherReport};
pub use pipeline::{Draft, ProgressReporter, RunOutcome, RunRequest, Scout, SilentProgress};
pub use roster::discover_targets;
pub use speech::SpeechClient;
pub use synthesis::Synthesizer;

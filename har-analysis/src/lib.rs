//! # har-analysis
//!
//! Analysis engine for the HAR-to-script pipeline. Contains the streaming
//! parser, endpoint classifier, scoring engine, correlation/critical-path
//! walk, pattern library and matcher, state-transition modeler, token
//! detector, script block builder and emitter, and the orchestrator that
//! wires them together behind `analyze()`.

pub mod blocks;
pub mod classifier;
pub mod correlation;
pub mod emit;
pub mod parser;
pub mod patterns;
pub mod pipeline;
pub mod scoring;
pub mod tokens;
pub mod transitions;

pub use pipeline::analyze;

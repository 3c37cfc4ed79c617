//! # har-core
//!
//! Foundation crate for the HAR-to-script analysis engine.
//! Defines all types, errors, config, events and constants.
//! Every other crate in the workspace depends on this.

#![allow(dead_code, unused)]

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod logging;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::AnalysisConfig;
pub use errors::error_code::HarErrorCode;
pub use errors::pipeline_error::PipelineError;
pub use events::dispatcher::EventDispatcher;
pub use events::handler::AnalysisEventHandler;
pub use types::collections::{FxHashMap, FxHashSet};

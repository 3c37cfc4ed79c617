//! Pattern Library & Matcher (C6).

mod library;
mod matcher;
mod types;

pub use library::built_in_patterns;
pub use matcher::match_patterns;
pub use types::{AuthenticationPattern, PatternStep, TimingConstraint};

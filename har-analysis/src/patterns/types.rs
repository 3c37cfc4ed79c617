//! Declarative authentication-flow pattern definitions (§4.5).

use std::collections::BTreeMap;

use regex::Regex;

/// Minimum/maximum delay (ms) allowed between this step and the previous one.
#[derive(Debug, Clone, Copy)]
pub struct TimingConstraint {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

/// One step of an `AuthenticationPattern`. An entry satisfies the step iff
/// every populated constraint holds.
#[derive(Debug, Clone, Default)]
pub struct PatternStep {
    pub name: &'static str,
    pub url_regex: Option<Regex>,
    pub methods: Vec<&'static str>,
    pub statuses: Vec<u16>,
    pub header_regex: BTreeMap<&'static str, Regex>,
    pub body_regex: Option<Regex>,
    pub timing: Option<TimingConstraint>,
}

impl PatternStep {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

/// A named, ordered sequence of steps plus the hints used after a match.
pub struct AuthenticationPattern {
    pub id: &'static str,
    pub steps: Vec<PatternStep>,
    pub base_confidence: f64,
    /// Extra token-name regexes this pattern contributes to token detection.
    pub token_hint_patterns: Vec<&'static str>,
}

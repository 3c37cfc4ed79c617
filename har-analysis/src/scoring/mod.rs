//! Scoring Engine (C4): five weighted sub-scores per entry, composite
//! filtering against configured thresholds (§4.3).

pub mod contextual;

use regex::Regex;

use har_core::config::FilteringConfig;
use har_core::types::{EndpointCharacteristics, HarEntry, ResourceType, ScoredEntry, SubScores};

use crate::classifier;
use contextual::ScoringContext;

/// Score and filter a slice of classified entries under `filtering`.
///
/// Entries scoring below `thresholds.minimum` are dropped outright (per
/// §4.3, "below minimum -> 0, entry dropped"); the rest are returned with
/// their `final_score`/`confidence` populated, in source order.
#[tracing::instrument(skip_all, fields(entries = entries.len()))]
pub fn score_entries(entries: &[HarEntry], filtering: &FilteringConfig) -> Vec<ScoredEntry> {
    let include: Vec<Regex> = filtering.endpoint_patterns.include.iter().filter_map(|p| Regex::new(p).ok()).collect();
    let exclude: Vec<Regex> = filtering.endpoint_patterns.exclude.iter().filter_map(|p| Regex::new(p).ok()).collect();
    let priority: Vec<(Regex, f64)> = filtering
        .endpoint_patterns
        .priority
        .iter()
        .filter_map(|p| Regex::new(&p.regex).ok().map(|re| (re, p.weight)))
        .collect();

    let total = entries.len().max(1);
    let mut out = Vec::with_capacity(entries.len());

    for (i, entry) in entries.iter().enumerate() {
        let resource_types = classifier::classify_resource_types(entry);
        let characteristics = classifier::characteristics(entry, &resource_types);

        let relevance = score_relevance(entry, &resource_types, filtering, &include, &exclude, &priority);
        let security = score_security(&characteristics);
        let business = score_business(&resource_types, &characteristics);
        let temporal = score_temporal(i, total);
        let ctx = ScoringContext {
            previous_requests: &entries[..i],
            all_entries: entries,
            current_index: i,
        };
        let contextual = score_contextual(&ctx, filtering);

        let sub_scores = SubScores {
            relevance,
            security,
            business,
            temporal,
            contextual,
        };

        let mut final_score = sub_scores.mean();
        if final_score < filtering.score_thresholds.minimum {
            final_score = 0.0;
        } else if final_score > filtering.score_thresholds.optimal {
            final_score = 100.0;
        }

        let confidence = (1.0 - sub_scores.variance().sqrt() / 50.0).max(0.0);

        out.push(ScoredEntry {
            entry: entry.clone(),
            resource_types,
            characteristics,
            sub_scores,
            final_score,
            confidence,
        });
    }

    out.into_iter().filter(|s| s.final_score > 0.0).collect()
}

fn score_relevance(
    entry: &HarEntry,
    tags: &std::collections::BTreeSet<ResourceType>,
    filtering: &FilteringConfig,
    include: &[Regex],
    exclude: &[Regex],
    priority: &[(Regex, f64)],
) -> f64 {
    let url = &entry.request.url;
    let mut score: f64 = 0.0;

    if include.iter().any(|re| re.is_match(url)) {
        score += 50.0;
    }
    if exclude.iter().any(|re| re.is_match(url)) {
        score -= 50.0;
    }
    for (re, weight) in priority {
        if re.is_match(url) {
            score += weight;
        }
    }
    for tag in tags {
        if let Some(w) = filtering.resource_type_weights.get(tag) {
            score += *w as f64;
        }
    }

    score.clamp(0.0, 100.0)
}

fn score_security(characteristics: &EndpointCharacteristics) -> f64 {
    let mut score: f64 = 50.0;
    if characteristics.has_authentication {
        score += 20.0;
    }
    if characteristics.has_sensitive_data {
        score += 30.0;
    }
    if !characteristics.is_idempotent {
        score += 10.0;
    }
    score.clamp(0.0, 100.0)
}

fn score_business(tags: &std::collections::BTreeSet<ResourceType>, characteristics: &EndpointCharacteristics) -> f64 {
    let mut score: f64 = 0.0;
    if tags.contains(&ResourceType::ApiEndpoint) {
        score += 20.0;
    }
    if tags.contains(&ResourceType::FormSubmission) {
        score += 30.0;
    }
    if characteristics.has_state_change {
        score += 25.0;
    }
    score.clamp(0.0, 100.0)
}

fn score_temporal(index: usize, total: usize) -> f64 {
    let score = 100.0 - (index as f64 / total as f64) * 100.0;
    score.clamp(0.0, 100.0)
}

fn score_contextual(ctx: &ScoringContext, filtering: &FilteringConfig) -> f64 {
    filtering
        .contextual_rules
        .iter()
        .filter(|rule| contextual::evaluate(&rule.condition_id, ctx))
        .map(|rule| rule.weight * 100.0)
        .sum::<f64>()
        .clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use har_core::config::ScoreThresholds;
    use har_core::types::{HarRequest, HarResponse, ResponseContent};

    fn entry(method: &str, url: &str, status: u16) -> HarEntry {
        HarEntry {
            index: 0,
            started_at: Utc.timestamp_opt(0, 0).unwrap(),
            elapsed_ms: 0.0,
            request: HarRequest {
                method: method.to_string(),
                url: url.to_string(),
                http_version: "HTTP/1.1".to_string(),
                headers: Vec::new(),
                query: Vec::new(),
                cookies: Vec::new(),
                body: None,
            },
            response: HarResponse {
                status,
                http_version: "HTTP/1.1".to_string(),
                headers: Vec::new(),
                cookies: Vec::new(),
                content: ResponseContent::default(),
                redirect_url: None,
            },
        }
    }

    #[test]
    fn static_assets_are_filtered_out() {
        // A lone static asset with nothing else in the document still gets
        // the maximum temporal score (it's both the first and only entry),
        // so the asset needs company to be pulled down below the relevant
        // request it trails.
        let entries = vec![entry("POST", "https://app.test/api/auth/login", 200), entry("GET", "https://app.test/assets/app.css", 200)];
        let filtering = har_core::config::AnalysisMode::Automatic.preset().filtering;
        let scored = score_entries(&entries, &filtering);
        assert_eq!(scored.len(), 1, "expected only the login request to survive, got {:?}", scored.iter().map(|s| &s.entry.request.url).collect::<Vec<_>>());
        assert!(scored[0].entry.request.url.ends_with("/login"));
    }

    #[test]
    fn login_post_survives_with_high_score() {
        let entries = vec![entry("POST", "https://app.test/api/auth/login", 200)];
        let filtering = har_core::config::AnalysisMode::Automatic.preset().filtering;
        let scored = score_entries(&entries, &filtering);
        assert_eq!(scored.len(), 1);
        assert!(scored[0].final_score > 0.0);
    }

    #[test]
    fn thresholds_zero_low_scores() {
        let entries = vec![entry("GET", "https://app.test/tracking/analytics", 200)];
        let filtering = FilteringConfig {
            score_thresholds: ScoreThresholds { minimum: 90.0, optimal: 95.0 },
            ..har_core::config::AnalysisMode::Automatic.preset().filtering
        };
        let scored = score_entries(&entries, &filtering);
        assert!(scored.is_empty());
    }
}

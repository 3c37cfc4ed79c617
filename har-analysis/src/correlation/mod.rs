//! Correlation & Critical-Path (C5): pairwise correlation matrix and a
//! seeded greedy graph walk over it (§4.4).

mod factors;

use rayon::prelude::*;

use har_core::types::{CorrelationMatrix, ScoredEntry};

pub use factors::auth_relevance;

const DEFAULT_TAU: f64 = 0.7;
const MAX_PATH_LEN: usize = 20;

/// Build the symmetric `N x N` correlation matrix over `entries` (§4.4).
/// Pair computation is independent and parallelised across worker threads;
/// the matrix is written back sequentially so the result is identical
/// regardless of thread scheduling.
#[tracing::instrument(skip_all, fields(entries = entries.len()))]
pub fn build_matrix(entries: &[ScoredEntry]) -> CorrelationMatrix {
    let n = entries.len();
    let mut matrix = CorrelationMatrix::new(n);

    let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (i + 1..n).map(move |j| (i, j))).collect();

    let cells: Vec<(usize, usize, har_core::types::CorrelationCell)> = pairs
        .par_iter()
        .map(|&(i, j)| {
            let cell = factors::correlate(&entries[i].entry, &entries[j].entry);
            (i, j, cell)
        })
        .collect();

    for (i, j, cell) in cells {
        matrix.set_symmetric(i, j, cell);
    }

    matrix
}

/// The result of the critical-path walk: the selected ordered indices and
/// every index judged redundant against them (§4.4 step 4, glossary).
pub struct CriticalPathResult {
    pub path: Vec<usize>,
    pub redundant: Vec<usize>,
}

/// Seeded greedy walk over the correlation matrix (§4.4 steps 2-4).
#[tracing::instrument(skip_all, fields(entries = entries.len()))]
pub fn select_critical_path(entries: &[ScoredEntry], matrix: &CorrelationMatrix) -> CriticalPathResult {
    let n = entries.len();
    if n == 0 {
        return CriticalPathResult { path: Vec::new(), redundant: Vec::new() };
    }

    let relevances: Vec<f64> = entries.iter().map(|s| auth_relevance(&s.entry)).collect();
    let seed = relevances
        .iter()
        .enumerate()
        .filter(|(_, r)| **r > 0.5)
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap().then(b.0.cmp(&a.0)))
        .map(|(i, _)| i)
        .unwrap_or(0);

    let mut visited = vec![false; n];
    let mut path = Vec::new();
    let mut current = seed;
    visited[current] = true;
    path.push(current);

    let max_len = MAX_PATH_LEN.min(n);
    while path.len() < max_len {
        let next = (0..n)
            .filter(|&k| !visited[k] && matrix.get(current, k).score > DEFAULT_TAU)
            .max_by(|&a, &b| {
                matrix
                    .get(current, a)
                    .score
                    .partial_cmp(&matrix.get(current, b).score)
                    .unwrap()
                    .then(b.cmp(&a))
            });

        match next {
            Some(k) => {
                visited[k] = true;
                path.push(k);
                current = k;
            }
            None => break,
        }
    }

    let redundant: Vec<usize> = (0..n)
        .filter(|&k| !path.contains(&k))
        .filter(|&k| {
            path.iter().filter(|&&p| matrix.get(p, k).score > DEFAULT_TAU).count() >= 2
        })
        .collect();

    CriticalPathResult { path, redundant }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use har_core::types::{HarEntry, HarRequest, HarResponse, ResponseContent, SubScores};

    fn scored(index: usize, method: &str, url: &str, status: u16) -> ScoredEntry {
        let entry = HarEntry {
            index,
            started_at: Utc.timestamp_opt(index as i64, 0).unwrap(),
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
        };
        ScoredEntry {
            entry,
            resource_types: Default::default(),
            characteristics: Default::default(),
            sub_scores: SubScores::default(),
            final_score: 50.0,
            confidence: 1.0,
        }
    }

    #[test]
    fn matrix_is_symmetric_with_zero_diagonal() {
        let entries = vec![
            scored(0, "GET", "https://app.test/login", 200),
            scored(1, "POST", "https://app.test/login", 200),
            scored(2, "GET", "https://app.test/dashboard", 200),
        ];
        let matrix = build_matrix(&entries);
        assert!(matrix.is_valid());
    }

    #[test]
    fn single_entry_path_is_itself() {
        let entries = vec![scored(0, "GET", "https://app.test/login", 200)];
        let matrix = build_matrix(&entries);
        let result = select_critical_path(&entries, &matrix);
        assert_eq!(result.path, vec![0]);
        assert!(result.redundant.is_empty());
    }

    #[test]
    fn path_has_no_duplicate_indices() {
        let entries: Vec<_> = (0..5)
            .map(|i| scored(i, "GET", &format!("https://app.test/step{i}"), 200))
            .collect();
        let matrix = build_matrix(&entries);
        let result = select_critical_path(&entries, &matrix);
        let mut seen = std::collections::HashSet::new();
        assert!(result.path.iter().all(|i| seen.insert(*i)));
    }
}

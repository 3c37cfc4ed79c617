//! Pairwise correlation matrix over scored entries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The five weighted factors that compose a pairwise correlation score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CorrelationFactor {
    Referer,
    Cookie,
    Token,
    Temporal,
    UrlPath,
}

impl CorrelationFactor {
    pub fn weight(&self) -> f64 {
        match self {
            Self::Referer => 0.25,
            Self::Cookie => 0.20,
            Self::Token => 0.20,
            Self::Temporal => 0.20,
            Self::UrlPath => 0.15,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Referer => "referer",
            Self::Cookie => "cookie",
            Self::Token => "token",
            Self::Temporal => "temporal",
            Self::UrlPath => "url_path",
        }
    }
}

/// A single cell of the correlation matrix: the combined score plus the
/// per-factor values it was composed from (useful for explaining why two
/// entries were judged related).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrelationCell {
    pub score: f64,
    pub factors: BTreeMap<String, f64>,
}

/// Square, symmetric matrix of correlation scores over `N` surviving
/// entries. `cell(i, i)` is always zero; `cell(i, j) == cell(j, i)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    n: usize,
    cells: Vec<CorrelationCell>,
}

impl CorrelationMatrix {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            cells: (0..n * n).map(|_| CorrelationCell::default()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, i: usize, j: usize) -> &CorrelationCell {
        &self.cells[i * self.n + j]
    }

    /// Set `(i, j)` and its symmetric counterpart `(j, i)` in one call.
    /// Panics on `i == j` (diagonal must stay zero) or out-of-range indices.
    pub fn set_symmetric(&mut self, i: usize, j: usize, cell: CorrelationCell) {
        assert_ne!(i, j, "correlation diagonal must stay zero");
        assert!(i < self.n && j < self.n, "correlation index out of range");
        self.cells[i * self.n + j] = cell.clone();
        self.cells[j * self.n + i] = cell;
    }

    /// Validates the §3/§8 invariants: symmetric, zero diagonal.
    pub fn is_valid(&self) -> bool {
        for i in 0..self.n {
            if self.get(i, i).score != 0.0 {
                return false;
            }
            for j in 0..self.n {
                if (self.get(i, j).score - self.get(j, i).score).abs() >= 1e-9 {
                    return false;
                }
            }
        }
        true
    }
}

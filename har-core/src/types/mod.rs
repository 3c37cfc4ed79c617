//! Data model shared by every pipeline stage. See §3 of the design notes.

pub mod block;
pub mod collections;
pub mod correlation;
pub mod har;
pub mod pattern;
pub mod resource;
pub mod result;
pub mod scoring;
pub mod token;
pub mod transition;

pub use block::{BlockIR, CatchBranch, CookieSpec, HeaderSpec, MarkStatus, ParseMethod, ParseSource};
pub use collections::{FxHashMap, FxHashSet};
pub use correlation::{CorrelationCell, CorrelationFactor, CorrelationMatrix};
pub use har::{find_all_ci, find_ci, HarEntry, HarRequest, HarResponse, NameValue, PostData, ResponseContent};
pub use pattern::PatternMatch;
pub use resource::{EndpointCharacteristics, ParameterType, ResourceType};
pub use result::{AnalysisMetrics, AnalysisResult, Warning};
pub use scoring::{ScoredEntry, SubScores};
pub use token::{DetectedToken, ExtractionLayer, TokenClassification, TokenLocation};
pub use transition::{FlowState, StateTransition};

// src/lib.rs
// Public library surface for integration tests (and potential reuse).
//
// Hybrid recommendation engine for university extracurricular-program
// notices: a rule-based compatibility score (department/grade/interest
// overlap) blended 60/40 with per-request TF-IDF text similarity between a
// synthesized user-interest query and each candidate program's text.
//
// The core is purely in-memory: crawling, persistence, content extraction
// and the HTTP layer are collaborator concerns that hand in `Program`
// snapshots plus one `UserProfile` and consume the ranked result list.

pub mod config;
pub mod hybrid;
pub mod model;
pub mod rules;
pub mod textsim;

// ---- Re-exports for stable public API ----
pub use crate::config::EngineConfig;
pub use crate::hybrid::{HybridRecommender, ScoreBreakdown};
pub use crate::model::{Program, RecommendOptions, RecommendationResult, UserProfile};
pub use crate::rules::{RuleScore, RuleScorer};
pub use crate::textsim::{TextScorer, TfidfScorer};

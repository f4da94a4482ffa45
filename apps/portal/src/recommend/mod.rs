// Job recommendation: skill normalization, match scoring, ranking, and the
// reactive feed that re-ranks whenever an input changes.

pub mod engine;
pub mod feed;
pub mod normalizer;
pub mod scoring;

pub use engine::{RecommendationEngine, RecommendationResult};
pub use feed::RecommendationFeed;
pub use scoring::{KeywordMatchScorer, MatchScorer};

//! Match scoring: relevance of one job to a user's skill tokens.
//!
//! Default: `KeywordMatchScorer`. A declared-skill hit is worth
//! [`SKILL_MATCH_WEIGHT`]; each user token found inside the job title or
//! department adds one point, so jobs without declared skills can still surface.

use std::collections::BTreeSet;

use crate::models::Job;
use crate::recommend::normalizer::{normalize_strs, SkillToken};

pub const SKILL_MATCH_WEIGHT: u32 = 10;

/// Carried by `RecommendationEngine`; swap to change ranking without touching callers.
pub trait MatchScorer: Send + Sync {
    fn score(&self, user_tokens: &BTreeSet<SkillToken>, job: &Job) -> u32;
}

/// Breakdown of a keyword score, kept for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreBreakdown {
    pub skill_matches: u32,
    pub fallback_matches: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.skill_matches * SKILL_MATCH_WEIGHT + self.fallback_matches
    }
}

/// Declared-skill overlap plus title/department substring fallback.
///
/// `min_fallback_token_len` gates which user tokens may take part in the
/// substring fallback. The default of 1 lets every token through, so a token
/// like `"c"` matches the department `"Computer Science"`.
#[derive(Debug, Clone, Copy)]
pub struct KeywordMatchScorer {
    pub min_fallback_token_len: usize,
}

impl Default for KeywordMatchScorer {
    fn default() -> Self {
        Self {
            min_fallback_token_len: 1,
        }
    }
}

impl KeywordMatchScorer {
    pub fn with_min_fallback_token_len(min_fallback_token_len: usize) -> Self {
        Self {
            min_fallback_token_len,
        }
    }

    pub fn breakdown(&self, user_tokens: &BTreeSet<SkillToken>, job: &Job) -> ScoreBreakdown {
        if user_tokens.is_empty() {
            return ScoreBreakdown::default();
        }

        let required: BTreeSet<SkillToken> = normalize_strs(&job.required_skills).into_iter().collect();
        let skill_matches = required.intersection(user_tokens).count() as u32;

        let title = job.title.to_lowercase();
        let department = job.department.to_lowercase();
        let fallback_matches = user_tokens
            .iter()
            .filter(|t| t.char_len() >= self.min_fallback_token_len)
            .filter(|t| title.contains(t.as_str()) || department.contains(t.as_str()))
            .count() as u32;

        ScoreBreakdown {
            skill_matches,
            fallback_matches,
        }
    }
}

impl MatchScorer for KeywordMatchScorer {
    fn score(&self, user_tokens: &BTreeSet<SkillToken>, job: &Job) -> u32 {
        self.breakdown(user_tokens, job).total()
    }
}

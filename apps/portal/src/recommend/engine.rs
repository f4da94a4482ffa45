use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::models::{Application, Job, UserSkillProfile};
use crate::recommend::normalizer::token_set;
use crate::recommend::scoring::{KeywordMatchScorer, MatchScorer};

/// A job together with the score it was ranked by. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationResult<'a> {
    pub job: &'a Job,
    pub score: u32,
}

/// Ranks jobs against a skill profile. Stateless between calls.
#[derive(Clone)]
pub struct RecommendationEngine {
    scorer: Arc<dyn MatchScorer>,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(Arc::new(KeywordMatchScorer::default()))
    }
}

impl RecommendationEngine {
    pub fn new(scorer: Arc<dyn MatchScorer>) -> Self {
        Self { scorer }
    }

    /// Jobs worth showing, best first. Applied-to jobs are never included.
    pub fn recommend(
        &self,
        jobs: &[Job],
        applications: &[Application],
        skills: &UserSkillProfile,
    ) -> Vec<Job> {
        self.rank(jobs, applications, skills)
            .into_iter()
            .map(|r| r.job.clone())
            .collect()
    }

    /// Same as [`recommend`](Self::recommend) but keeps the scores.
    ///
    /// Ties keep the order of `jobs`.
    pub fn rank<'a>(
        &self,
        jobs: &'a [Job],
        applications: &[Application],
        skills: &UserSkillProfile,
    ) -> Vec<RecommendationResult<'a>> {
        if skills.is_empty() || jobs.is_empty() {
            return Vec::new();
        }

        let user_tokens = token_set(&skills.as_input());
        if user_tokens.is_empty() {
            return Vec::new();
        }

        let applied: HashSet<&str> = applications.iter().map(|a| a.job_id.as_str()).collect();

        let mut ranked: Vec<RecommendationResult<'a>> = jobs
            .iter()
            .filter(|job| !applied.contains(job.id.as_str()))
            .map(|job| RecommendationResult {
                job,
                score: self.scorer.score(&user_tokens, job),
            })
            .filter(|r| r.score > 0)
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }
}

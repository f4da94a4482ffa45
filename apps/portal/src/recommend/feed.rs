use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::models::{Application, Job, UserSkillProfile};
use crate::recommend::engine::RecommendationEngine;
use crate::sync::TaskHandle;

/// Keeps a recommendation list current: recomputes whenever jobs,
/// applications or the skill profile are replaced, and only then.
pub struct RecommendationFeed {
    output: watch::Receiver<Vec<Job>>,
    task: TaskHandle,
}

impl RecommendationFeed {
    pub fn start(
        engine: RecommendationEngine,
        mut jobs: watch::Receiver<Vec<Job>>,
        mut applications: watch::Receiver<Vec<Application>>,
        mut skills: watch::Receiver<UserSkillProfile>,
        parent: &CancellationToken,
    ) -> Self {
        let initial = compute(&engine, &mut jobs, &mut applications, &mut skills);
        let (tx, output) = watch::channel(initial);

        let task = TaskHandle::spawn(Some(parent), move |token| async move {
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    changed = jobs.changed() => if changed.is_err() { break },
                    changed = applications.changed() => if changed.is_err() { break },
                    changed = skills.changed() => if changed.is_err() { break },
                }
                if token.is_cancelled() {
                    break;
                }
                let next = compute(&engine, &mut jobs, &mut applications, &mut skills);
                debug!(count = next.len(), "Recommendations recomputed");
                tx.send_replace(next);
            }
        });

        Self { output, task }
    }

    pub fn current(&self) -> Vec<Job> {
        self.output.borrow().clone()
    }

    pub fn stop(&self) {
        self.task.stop();
    }

    pub fn is_active(&self) -> bool {
        self.task.is_active()
    }
}

/// Marks every input as seen, so a burst of updates yields one recomputation.
fn compute(
    engine: &RecommendationEngine,
    jobs: &mut watch::Receiver<Vec<Job>>,
    applications: &mut watch::Receiver<Vec<Application>>,
    skills: &mut watch::Receiver<UserSkillProfile>,
) -> Vec<Job> {
    let jobs = jobs.borrow_and_update();
    let applications = applications.borrow_and_update();
    let skills = skills.borrow_and_update();
    engine.recommend(&jobs, &applications, &skills)
}

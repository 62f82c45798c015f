//! Submission engine.
//!
//! Owns the read-evaluate-write cycle: load a user's state from the
//! repository, score the sheet, evaluate achievements, then persist the new
//! medals and the history entry. Batches run users concurrently while keeping
//! each user's sheets in order.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::catalog::Achievement;
use crate::error::is_transient;
use crate::evaluator::{evaluate, EvaluatorConfig};
use crate::model::{AnswerSheet, HistoryEntry, SubmissionOutcome};
use crate::report::{ImportReport, SubmissionFailure};
use crate::scorer::score_sheet;
use crate::traits::AchievementRepository;

/// Configuration for the submission engine.
#[derive(Debug, Clone)]
pub struct SubmissionEngineConfig {
    /// Maximum users processed concurrently in a batch.
    pub parallelism: usize,
    /// Retries on transient repository errors.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further attempt.
    pub retry_delay: Duration,
    /// Rule configuration handed to the evaluator.
    pub evaluator: EvaluatorConfig,
}

impl Default for SubmissionEngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            max_retries: 3,
            retry_delay: Duration::from_millis(200),
            evaluator: EvaluatorConfig::default(),
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_submission_start(&self, user_id: &str, target: &str);
    fn on_submission_complete(&self, outcome: &SubmissionOutcome);
    fn on_submission_error(&self, user_id: &str, target: &str, error: &str);
    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_submission_start(&self, _: &str, _: &str) {}
    fn on_submission_complete(&self, _: &SubmissionOutcome) {}
    fn on_submission_error(&self, _: &str, _: &str, _: &str) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// Scores sheets, awards medals and persists both through a repository.
pub struct SubmissionEngine {
    repository: Arc<dyn AchievementRepository>,
    config: SubmissionEngineConfig,
}

impl SubmissionEngine {
    pub fn new(repository: Arc<dyn AchievementRepository>, config: SubmissionEngineConfig) -> Self {
        Self { repository, config }
    }

    /// Score and record one sheet.
    pub async fn submit(&self, sheet: &AnswerSheet) -> Result<SubmissionOutcome> {
        let user_id = sheet.user_id.as_str();
        let state = self
            .with_retry(|| self.repository.load(user_id))
            .await
            .with_context(|| format!("failed to load state for {user_id}"))?;

        let result = score_sheet(sheet);
        let new_achievements = evaluate(&self.config.evaluator, &state, &result);

        tracing::debug!(
            user = user_id,
            target = %result.kind.target_key(),
            percentage = result.percentage(),
            "scored attempt"
        );

        let recorded_at = sheet.submitted_at.with_timezone(&chrono::Utc);
        let entry = HistoryEntry::from_result(&result, recorded_at);
        self.with_retry(|| {
            self.repository
                .record(user_id, entry.clone(), &new_achievements)
        })
        .await
        .with_context(|| format!("failed to record attempt for {user_id}"))?;
        for achievement in &new_achievements {
            tracing::info!(user = user_id, %achievement, "achievement unlocked");
        }

        Ok(SubmissionOutcome::new(user_id, &result, new_achievements))
    }

    /// Submit many sheets. Different users run concurrently; one user's
    /// sheets are applied in input order. Failures are collected rather than
    /// aborting the batch.
    pub async fn submit_all(
        &self,
        sheets: &[AnswerSheet],
        progress: &dyn ProgressReporter,
    ) -> Result<ImportReport> {
        anyhow::ensure!(self.config.parallelism >= 1, "parallelism must be at least 1");

        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism));

        let mut per_user: BTreeMap<&str, Vec<(usize, &AnswerSheet)>> = BTreeMap::new();
        for (index, sheet) in sheets.iter().enumerate() {
            per_user
                .entry(sheet.user_id.as_str())
                .or_default()
                .push((index, sheet));
        }

        let mut futures = FuturesUnordered::new();
        for (user_id, queue) in per_user {
            let semaphore = Arc::clone(&semaphore);
            futures.push(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| anyhow::anyhow!("semaphore closed"))?;

                let mut done = Vec::with_capacity(queue.len());
                for (index, sheet) in queue {
                    let target = sheet.kind.target_key();
                    progress.on_submission_start(user_id, &target);
                    match self.submit(sheet).await {
                        Ok(outcome) => {
                            progress.on_submission_complete(&outcome);
                            done.push((index, Ok(outcome)));
                        }
                        Err(e) => {
                            let error = format!("{e:#}");
                            tracing::error!("submission failed for {user_id}/{target}: {error}");
                            progress.on_submission_error(user_id, &target, &error);
                            done.push((
                                index,
                                Err(SubmissionFailure {
                                    user_id: user_id.to_string(),
                                    target,
                                    error,
                                }),
                            ));
                        }
                    }
                }
                Ok::<_, anyhow::Error>(done)
            });
        }

        let mut outcomes = Vec::new();
        let mut failures = Vec::new();
        while let Some(batch) = futures.next().await {
            for (index, result) in batch? {
                match result {
                    Ok(outcome) => outcomes.push((index, outcome)),
                    Err(failure) => failures.push((index, failure)),
                }
            }
        }

        outcomes.sort_by_key(|(index, _)| *index);
        failures.sort_by_key(|(index, _)| *index);

        let elapsed = start.elapsed();
        progress.on_batch_complete(sheets.len(), outcomes.len(), failures.len(), elapsed);

        Ok(ImportReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            outcomes: outcomes.into_iter().map(|(_, o)| o).collect(),
            failures: failures.into_iter().map(|(_, f)| f).collect(),
            duration_ms: elapsed.as_millis() as u64,
        })
    }

    /// Hand out an admin-only medal. Returns `false` if the user already had it.
    pub async fn grant(&self, user_id: &str, achievement: Achievement) -> Result<bool> {
        anyhow::ensure!(
            achievement.is_admin_grantable(),
            "{achievement} is earned through exams and cannot be granted"
        );

        let state = self
            .with_retry(|| self.repository.load(user_id))
            .await
            .with_context(|| format!("failed to load state for {user_id}"))?;
        if state.has(achievement) {
            return Ok(false);
        }

        let granted = [achievement];
        self.with_retry(|| self.repository.unlock(user_id, &granted))
            .await
            .with_context(|| format!("failed to grant {achievement} to {user_id}"))?;
        tracing::info!(user = user_id, %achievement, "achievement granted");
        Ok(true)
    }

    /// Run a repository call, retrying transient failures with exponential
    /// backoff.
    async fn with_retry<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut delay = self.config.retry_delay;
        let mut retry = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if retry < self.config.max_retries && is_transient(&e) => {
                    retry += 1;
                    tracing::warn!(
                        "{} call failed ({e:#}), retry {retry}/{}",
                        self.repository.name(),
                        self.config.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(Duration::from_secs(60));
                }
                Err(e) => return Err(e),
            }
        }
    }
}

//! Processing stages displayed while a repository is ingested.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Fixed, ordered stages of a repository ingestion.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    #[strum(serialize = "Cloning repository")]
    Cloning,
    #[strum(serialize = "Parsing source files")]
    Parsing,
    #[strum(serialize = "Generating embeddings")]
    Embedding,
    #[strum(serialize = "Building search index")]
    Indexing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Active,
    Complete,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStep {
    pub stage: ProcessingStage,
    pub status: StepStatus,
}

/// Ordered step sequence.
///
/// At most one step is active. A step is complete only if every earlier step
/// is complete. On failure the active step becomes `Error` and the sequence
/// halts with later steps left pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingPipeline {
    steps: Vec<ProcessingStep>,
}

impl Default for ProcessingPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingPipeline {
    pub fn new() -> Self {
        Self {
            steps: ProcessingStage::iter()
                .map(|stage| ProcessingStep {
                    stage,
                    status: StepStatus::Pending,
                })
                .collect(),
        }
    }

    pub fn steps(&self) -> &[ProcessingStep] {
        &self.steps
    }

    pub fn active(&self) -> Option<ProcessingStage> {
        self.steps
            .iter()
            .find(|step| step.status == StepStatus::Active)
            .map(|step| step.stage)
    }

    pub fn is_failed(&self) -> bool {
        self.steps.iter().any(|step| step.status == StepStatus::Error)
    }

    pub fn is_finished(&self) -> bool {
        self.steps
            .iter()
            .all(|step| step.status == StepStatus::Complete)
    }

    fn is_started(&self) -> bool {
        self.steps
            .iter()
            .any(|step| step.status != StepStatus::Pending)
    }

    /// Activates the first stage. No-op once started.
    pub fn start(&mut self) -> Option<ProcessingStage> {
        if self.is_started() {
            return None;
        }
        let first = self.steps.first_mut()?;
        first.status = StepStatus::Active;
        Some(first.stage)
    }

    /// Completes the active stage and activates the next one.
    ///
    /// The last stage stays active; only [`complete`](Self::complete) finishes it.
    /// Returns the newly active stage.
    pub fn advance(&mut self) -> Option<ProcessingStage> {
        if !self.is_started() {
            return self.start();
        }
        let index = self
            .steps
            .iter()
            .position(|step| step.status == StepStatus::Active)?;
        if index + 1 >= self.steps.len() {
            return None;
        }
        self.steps[index].status = StepStatus::Complete;
        self.steps[index + 1].status = StepStatus::Active;
        Some(self.steps[index + 1].stage)
    }

    /// Completes every remaining stage in order. No-op after a failure.
    pub fn complete(&mut self) {
        if self.is_failed() {
            return;
        }
        for step in &mut self.steps {
            step.status = StepStatus::Complete;
        }
    }

    /// Marks the active stage (or the first, if none started) as failed.
    ///
    /// Earlier complete stages are kept; later stages are not touched.
    pub fn fail(&mut self) -> Option<ProcessingStage> {
        if self.is_failed() || self.is_finished() {
            return None;
        }
        let step = match self
            .steps
            .iter()
            .position(|step| step.status == StepStatus::Active)
        {
            Some(index) => &mut self.steps[index],
            None => self.steps.first_mut()?,
        };
        step.status = StepStatus::Error;
        Some(step.stage)
    }

    /// Checks the ordering invariants.
    pub fn is_consistent(&self) -> bool {
        let active = self
            .steps
            .iter()
            .filter(|step| step.status == StepStatus::Active)
            .count();
        let ordered = self.steps.iter().enumerate().all(|(i, step)| {
            step.status != StepStatus::Complete
                || self.steps[..i]
                    .iter()
                    .all(|earlier| earlier.status == StepStatus::Complete)
        });
        active <= 1 && ordered
    }
}

//! Workflow observers.
//!
//! The acquirer reports every stage transition to the observer it was built
//! with instead of writing to a process-wide logger, so two acquirers in one
//! process can be told apart and tests can assert on the exact sequence of
//! events.

use std::sync::{Arc, Mutex};

use crate::error::ErrorKind;

use super::Stage;

/// One step of a workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageEvent {
    WorkflowStarted {
        asset_key: String,
    },
    StageStarted {
        asset_key: String,
        stage: Stage,
    },
    StageCompleted {
        asset_key: String,
        stage: Stage,
        detail: String,
    },
    StageFailed {
        asset_key: String,
        stage: Stage,
        kind: ErrorKind,
        message: String,
        /// A confirmed payment was made before the failure and is not reversed.
        payment_made: bool,
    },
    WorkflowFinished {
        asset_key: String,
        success: bool,
    },
}

/// Receives workflow events.
pub trait AcquisitionObserver {
    fn on_event(&self, event: &StageEvent);
}

impl<T: AcquisitionObserver + ?Sized> AcquisitionObserver for Arc<T> {
    fn on_event(&self, event: &StageEvent) {
        (**self).on_event(event)
    }
}

/// Forwards events to the `log` facade under a per-instance target.
#[derive(Debug, Clone)]
pub struct LogObserver {
    target: String,
}

impl LogObserver {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new("ocean_acquire::acquirer")
    }
}

impl AcquisitionObserver for LogObserver {
    fn on_event(&self, event: &StageEvent) {
        let target = self.target.as_str();
        match event {
            StageEvent::WorkflowStarted { asset_key } => {
                log::info!(target: target, "=== Starting automated purchase: {asset_key} ===");
            }
            StageEvent::StageStarted { stage, .. } => {
                log::debug!(target: target, "[{}/7] {stage}", stage.number());
            }
            StageEvent::StageCompleted { stage, detail, .. } => {
                log::info!(target: target, "[{}/7] {stage}: {detail}", stage.number());
            }
            StageEvent::StageFailed {
                asset_key,
                stage,
                kind,
                message,
                payment_made,
            } => {
                log::error!(
                    target: target,
                    "[{}/7] {stage} failed for {asset_key} ({kind}): {message}",
                    stage.number()
                );
                if *payment_made {
                    log::warn!(
                        target: target,
                        "payment for {asset_key} was already confirmed and has not been reversed"
                    );
                }
            }
            StageEvent::WorkflowFinished { asset_key, success } => {
                if *success {
                    log::info!(target: target, "=== Automated purchase completed: {asset_key} ===");
                } else {
                    log::error!(target: target, "=== Automated purchase failed: {asset_key} ===");
                }
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<StageEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far.
    pub fn events(&self) -> Vec<StageEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Stages that completed, in order.
    pub fn completed_stages(&self) -> Vec<Stage> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                StageEvent::StageCompleted { stage, .. } => Some(stage),
                _ => None,
            })
            .collect()
    }

    /// The failure event, if any stage failed.
    pub fn failure(&self) -> Option<StageEvent> {
        self.events()
            .into_iter()
            .find(|e| matches!(e, StageEvent::StageFailed { .. }))
    }
}

impl AcquisitionObserver for RecordingObserver {
    fn on_event(&self, event: &StageEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

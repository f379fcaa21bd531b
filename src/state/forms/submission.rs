//! Submission lifecycle for a single form
//!
//! `Idle -> Validating -> Invalid (back to Idle)`
//! `Idle -> Validating -> Submitting -> Succeeded | Failed (back to Idle)`
//!
//! While `Submitting`, further submit requests are ignored.

use super::validation::FormValues;

/// Where a form is in its submit cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
}

/// Result of asking a form to submit
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitDecision {
    /// A submission is already in flight
    Ignored,
    /// Validation failed with this many field errors
    Invalid(usize),
    /// Values to hand to the collaborator
    Ready(FormValues),
}

/// Submission bookkeeping owned by a form
#[derive(Debug, Clone, Default)]
pub struct Submission {
    phase: SubmitPhase,
    error: Option<String>,
    attempts: u32,
}

impl Submission {
    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == SubmitPhase::Submitting
    }

    /// Top-level error from the last failed collaborator call
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Number of submissions handed to the collaborator
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Enter `Validating`. Returns false if a submission is in flight.
    pub(super) fn start_validation(&mut self) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.phase = SubmitPhase::Validating;
        self.error = None;
        true
    }

    pub(super) fn reject(&mut self) {
        self.phase = SubmitPhase::Idle;
    }

    pub(super) fn start_submitting(&mut self) {
        self.phase = SubmitPhase::Submitting;
        self.attempts += 1;
    }

    /// Apply a collaborator outcome. Returns false when nothing was in
    /// flight, i.e. the outcome is stale.
    pub(super) fn finish(&mut self, outcome: Result<(), String>) -> bool {
        if !self.is_submitting() {
            return false;
        }
        self.phase = SubmitPhase::Idle;
        self.error = outcome.err();
        true
    }
}

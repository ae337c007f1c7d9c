use super::{AccessibilityResult, Validator};
use crate::api::AccessChecker;
use crate::drive::classify;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;

/// Validation status of the link currently typed into an input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ValidationState {
    Idle,
    Waiting { input: String },
    Checking { input: String },
    Done { input: String, result: AccessibilityResult },
}

impl ValidationState {
    pub fn input(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Waiting { input } | Self::Checking { input } | Self::Done { input, .. } => {
                Some(input)
            }
        }
    }

    pub fn result(&self) -> Option<&AccessibilityResult> {
        match self {
            Self::Done { result, .. } => Some(result),
            _ => None,
        }
    }
}

/// Runs the validator only after the input has been quiet for a while.
///
/// Every call to [`DebouncedValidator::input`] bumps a generation counter.
/// A pending check whose generation is no longer current never publishes,
/// so a slow answer for an old value cannot overwrite a newer one.
pub struct DebouncedValidator<C> {
    validator: Arc<Validator<C>>,
    quiet_period: Duration,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<ValidationState>>,
    runtime: Handle,
}

impl<C: AccessChecker + 'static> DebouncedValidator<C> {
    /// Checks are spawned on `runtime`, so `input` can be called from any
    /// thread, inside a runtime or not.
    pub fn new(validator: Validator<C>, quiet_period: Duration, runtime: Handle) -> Self {
        let (tx, _rx) = watch::channel(ValidationState::Idle);
        Self {
            validator: Arc::new(validator),
            quiet_period,
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(tx),
            runtime,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ValidationState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> ValidationState {
        self.state.borrow().clone()
    }

    /// Record a new input value.
    pub fn input(&self, value: impl Into<String>) {
        let input = value.into();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if input.trim().is_empty() {
            self.state.send_replace(ValidationState::Idle);
            return;
        }

        let reference = classify(&input);
        if !reference.is_drive() {
            self.state.send_replace(ValidationState::Done {
                input,
                result: AccessibilityResult::accessible(false),
            });
            return;
        }

        self.state.send_replace(ValidationState::Waiting {
            input: input.clone(),
        });

        let validator = self.validator.clone();
        let current = self.generation.clone();
        let state = self.state.clone();
        let quiet_period = self.quiet_period;

        self.runtime.spawn(async move {
            tokio::time::sleep(quiet_period).await;

            let is_current = || current.load(Ordering::SeqCst) == generation;

            let started = state.send_if_modified(|s| {
                if !is_current() {
                    return false;
                }
                *s = ValidationState::Checking {
                    input: input.clone(),
                };
                true
            });
            if !started {
                tracing::debug!(generation, "Input changed during quiet period");
                return;
            }

            let result = validator.validate(&reference).await;

            let published = state.send_if_modified(|s| {
                if !is_current() {
                    return false;
                }
                *s = ValidationState::Done {
                    input: input.clone(),
                    result: result.clone(),
                };
                true
            });
            if !published {
                tracing::debug!(generation, input = %input, "Discarding stale validation result");
            }
        });
    }

    /// Re-run a check that ended in a retryable failure.
    pub fn retry(&self) -> bool {
        let current = self.current();
        match current {
            ValidationState::Done { input, result } if result.is_retryable() => {
                tracing::info!(input = %input, "Retrying access check");
                self.input(input);
                true
            }
            _ => false,
        }
    }
}

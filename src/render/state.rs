use crate::drive::MediaFile;
use serde::Serialize;

/// A candidate that failed to load, kept for the diagnostics disclosure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedAttempt {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum LoadState {
    Loading { candidate: usize },
    Loaded { candidate: usize },
    Failed { attempts: Vec<FailedAttempt> },
}

impl LoadState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoadState::Loading { .. })
    }
}

/// Signal from the rendering surface about one candidate URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    Loaded { url: String },
    Errored { url: String, detail: Option<String> },
}

impl LoadEvent {
    fn url(&self) -> &str {
        match self {
            LoadEvent::Loaded { url } | LoadEvent::Errored { url, .. } => url,
        }
    }
}

/// Fallback state machine for a single media file.
///
/// Exactly one candidate is in flight at a time; an error on it moves to the
/// next one, and running out of candidates is terminal.
#[derive(Debug, Clone)]
pub struct MediaView {
    file: MediaFile,
    state: LoadState,
    attempts: Vec<FailedAttempt>,
}

impl MediaView {
    pub fn new(file: MediaFile) -> Self {
        Self {
            file,
            state: LoadState::Loading { candidate: 0 },
            attempts: Vec::new(),
        }
    }

    pub fn file(&self) -> &MediaFile {
        &self.file
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// URL to display right now; `None` once every candidate has failed.
    pub fn current_url(&self) -> Option<&str> {
        match self.state {
            LoadState::Loading { candidate } | LoadState::Loaded { candidate } => {
                self.file.candidates().get(candidate).map(String::as_str)
            }
            LoadState::Failed { .. } => None,
        }
    }

    pub fn reset(&mut self) {
        self.state = LoadState::Loading { candidate: 0 };
        self.attempts.clear();
    }

    pub fn on_loaded(&mut self, url: &str) -> &LoadState {
        self.handle(LoadEvent::Loaded {
            url: url.to_string(),
        })
    }

    pub fn on_error(&mut self, url: &str, detail: Option<String>) -> &LoadState {
        self.handle(LoadEvent::Errored {
            url: url.to_string(),
            detail,
        })
    }

    /// Apply an event. Events for anything other than the candidate in
    /// flight are ignored, as is everything after a terminal state.
    pub fn handle(&mut self, event: LoadEvent) -> &LoadState {
        let LoadState::Loading { candidate } = self.state else {
            return &self.state;
        };
        if self.current_url() != Some(event.url()) {
            tracing::debug!(url = event.url(), candidate, "Ignoring load event for stale candidate");
            return &self.state;
        }

        self.state = match event {
            LoadEvent::Loaded { .. } => {
                tracing::debug!(id = self.file.id(), candidate, "Media loaded");
                LoadState::Loaded { candidate }
            }
            LoadEvent::Errored { url, detail } => {
                self.attempts.push(FailedAttempt { url, detail });
                let next = candidate + 1;
                if next < self.file.candidates().len() {
                    LoadState::Loading { candidate: next }
                } else {
                    tracing::warn!(
                        id = self.file.id(),
                        tried = self.attempts.len(),
                        "Every display candidate failed"
                    );
                    LoadState::Failed {
                        attempts: std::mem::take(&mut self.attempts),
                    }
                }
            }
        };
        &self.state
    }
}

mod debounce;

pub use debounce::*;

use crate::api::{AccessChecker, ApiError};
use crate::cache::SharedCache;
use crate::drive::{canonical_url, MediaReference};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

/// Why a link cannot be shown as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessIssue {
    PrivateObject,
    UnsupportedFolderListing,
    TransportFailure,
}

impl AccessIssue {
    pub fn message(&self) -> &'static str {
        match self {
            Self::PrivateObject => {
                "File is private. Only files shared with \"Anyone with the link\" can be displayed."
            }
            Self::UnsupportedFolderListing => {
                "Folder links are not supported: the files inside a shared folder cannot be listed."
            }
            Self::TransportFailure => "Could not reach the server to check this link.",
        }
    }

    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::PrivateObject => {
                "Ask the owner to set General access to \"Anyone with the link\" (Viewer) in the sharing settings."
            }
            Self::UnsupportedFolderListing => {
                "Share the individual file links instead of the folder link."
            }
            Self::TransportFailure => "Check your connection and try again.",
        }
    }

    /// Only transport failures can change on a second attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportFailure)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityResult {
    pub accessible: bool,
    pub is_folder: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<AccessIssue>,
    pub checked_at: DateTime<Utc>,
}

impl AccessibilityResult {
    pub fn accessible(is_folder: bool) -> Self {
        Self {
            accessible: true,
            is_folder,
            error_message: None,
            suggestion_message: None,
            issue: is_folder.then_some(AccessIssue::UnsupportedFolderListing),
            checked_at: Utc::now(),
        }
    }

    pub fn denied(issue: AccessIssue, is_folder: bool) -> Self {
        Self {
            accessible: false,
            is_folder,
            error_message: Some(issue.message().to_string()),
            suggestion_message: Some(issue.suggestion().to_string()),
            issue: Some(issue),
            checked_at: Utc::now(),
        }
    }

    /// Guidance shown for folder links even when the folder is public.
    pub fn folder_notice(&self) -> Option<&'static str> {
        self.is_folder
            .then(|| AccessIssue::UnsupportedFolderListing.suggestion())
    }

    pub fn is_retryable(&self) -> bool {
        self.issue.is_some_and(|issue| issue.is_retryable())
    }
}

/// Checks Drive links against the server before they are saved or shown.
pub struct Validator<C> {
    checker: C,
    cache: Option<SharedCache<AccessibilityResult>>,
}

impl<C: AccessChecker> Validator<C> {
    pub fn new(checker: C) -> Self {
        Self {
            checker,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: SharedCache<AccessibilityResult>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn checker(&self) -> &C {
        &self.checker
    }

    /// Local references are accepted without a round trip.
    #[instrument(skip(self, reference), fields(source = ?reference.source_type(), id = ?reference.object_id()))]
    pub async fn validate(&self, reference: &MediaReference) -> AccessibilityResult {
        let Some(url) = canonical_url(reference) else {
            return AccessibilityResult::accessible(false);
        };

        if let Some(hit) = self.cached(&url) {
            tracing::debug!("Using cached access result");
            return hit;
        }

        let result = match self.checker.check_access(&url).await {
            Ok(resp) => apply_policy(reference, resp.accessible, resp.is_folder),
            Err(e) => transport_failure(reference, &e),
        };

        if !result.is_retryable() {
            self.store(&url, &result);
        }
        result
    }

    fn cached(&self, url: &str) -> Option<AccessibilityResult> {
        let cache = self.cache.as_ref()?;
        cache.lock().ok()?.get(url)
    }

    fn store(&self, url: &str, result: &AccessibilityResult) {
        if let Some(mut cache) = self.cache.as_ref().and_then(|c| c.lock().ok()) {
            cache.insert(url, result.clone());
        }
    }
}

fn apply_policy(reference: &MediaReference, accessible: bool, server_says_folder: bool) -> AccessibilityResult {
    let is_folder = server_says_folder || reference.is_folder();

    if is_folder {
        tracing::info!(accessible, "Folder link; listing its files is unsupported");
        return if accessible {
            AccessibilityResult::accessible(true)
        } else {
            AccessibilityResult::denied(AccessIssue::UnsupportedFolderListing, true)
        };
    }

    if accessible {
        AccessibilityResult::accessible(false)
    } else {
        tracing::info!("Drive file is not shared publicly");
        AccessibilityResult::denied(AccessIssue::PrivateObject, false)
    }
}

fn transport_failure(reference: &MediaReference, error: &ApiError) -> AccessibilityResult {
    tracing::warn!("Access check unavailable: {}", error);
    AccessibilityResult::denied(AccessIssue::TransportFailure, reference.is_folder())
}

use super::types::*;
use regex::Regex;
use std::sync::LazyLock;

// Scheme is optional, the host is not: paths on any other host stay local.
const DRIVE_HOST: &str = r"^(?:https?://)?(?:drive|docs)\.google\.com/";

static FILE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{}(?:[^?#\s]*/)?file/d/([A-Za-z0-9_-]+)", DRIVE_HOST)).unwrap()
});

static UC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{}(?:uc|open)\?(?:[^#]*?&)?id=([A-Za-z0-9_-]+)", DRIVE_HOST)).unwrap()
});

static DRIVE_FOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{}drive/(?:u/\d+/)?folders/([A-Za-z0-9_-]+)", DRIVE_HOST)).unwrap()
});

static FOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{}(?:[^?#\s]*/)?folders/([A-Za-z0-9_-]+)", DRIVE_HOST)).unwrap()
});

// Checked in order; file shapes come before folder shapes.
static PATTERNS: LazyLock<[(&'static Regex, SourceType); 4]> = LazyLock::new(|| {
    [
        (&*FILE_REGEX, SourceType::GoogleDriveFile),
        (&*UC_REGEX, SourceType::GoogleDriveFile),
        (&*DRIVE_FOLDER_REGEX, SourceType::GoogleDriveFolder),
        (&*FOLDER_REGEX, SourceType::GoogleDriveFolder),
    ]
});

/// Classify a link as a Drive file, a Drive folder, or a local path.
///
/// Any input that matches none of the Drive shapes is treated as local, so
/// plain asset paths pass through untouched.
pub fn classify(url: &str) -> MediaReference {
    let url = url.trim();

    for (regex, source_type) in PATTERNS.iter() {
        let Some(id) = regex.captures(url).and_then(|caps| caps.get(1)) else {
            continue;
        };
        let reference = match source_type {
            SourceType::GoogleDriveFolder => MediaReference::drive_folder(id.as_str()),
            _ => MediaReference::drive_file(id.as_str()),
        };
        tracing::debug!(url, source = ?source_type, id = id.as_str(), "Classified Drive link");
        return reference;
    }

    MediaReference::local()
}

pub fn extract_id(url: &str) -> Option<String> {
    classify(url).object_id().map(str::to_string)
}

pub fn is_drive_url(url: &str) -> bool {
    classify(url).is_drive()
}

/// Share URL for a Drive object, `None` for local references.
pub fn canonical_url(reference: &MediaReference) -> Option<String> {
    let id = reference.object_id()?;
    match reference.source_type() {
        SourceType::GoogleDriveFile => Some(format!("https://drive.google.com/file/d/{}/view", id)),
        SourceType::GoogleDriveFolder => {
            Some(format!("https://drive.google.com/drive/folders/{}", id))
        }
        SourceType::Local => None,
    }
}

use super::types::*;

const CONTENT_HOST: &str = "https://lh3.googleusercontent.com/d";
const DRIVE_HOST: &str = "https://drive.google.com";
const DOCS_HOST: &str = "https://docs.google.com";

/// Ordered display URLs for a reference, most reliable first.
///
/// `original` is the link exactly as the user gave it (or the local path).
/// The result is never empty.
pub fn resolve_candidates(reference: &MediaReference, original: &str, kind: MediaKind) -> Vec<String> {
    let Some(id) = reference.object_id() else {
        return vec![original.to_string()];
    };

    let candidates = match (reference.source_type(), kind) {
        (SourceType::GoogleDriveFolder, _) => folder_candidates(id, original),
        (_, MediaKind::Image) => image_candidates(id, original),
        (_, MediaKind::Video) => video_candidates(id, original),
    };

    let candidates = dedup(candidates);
    tracing::debug!(id, %kind, count = candidates.len(), "Resolved display candidates");
    candidates
}

// The content host serves the bitmap directly without the sign-in redirect
// the drive host sometimes answers with.
fn image_candidates(id: &str, original: &str) -> Vec<String> {
    vec![
        format!("{}/{}=s2000", CONTENT_HOST, id),
        format!("{}/{}=w2000-h2000", CONTENT_HOST, id),
        original.to_string(),
        format!("{}/uc?export=view&id={}", DRIVE_HOST, id),
        format!("{}/uc?export=download&id={}", DRIVE_HOST, id),
        format!("{}/thumbnail?id={}&sz=w2000", DRIVE_HOST, id),
        format!("{}/uc?export=view&id={}", DOCS_HOST, id),
    ]
}

// Export links fail for most video mime types, the preview frame does not.
fn video_candidates(id: &str, original: &str) -> Vec<String> {
    vec![
        original.to_string(),
        format!("{}/file/d/{}/preview", DRIVE_HOST, id),
        format!("{}/file/d/{}/view", DRIVE_HOST, id),
        format!("{}/file/d/{}/preview", DOCS_HOST, id),
    ]
}

fn folder_candidates(id: &str, original: &str) -> Vec<String> {
    vec![
        format!("{}/embeddedfolderview?id={}#grid", DRIVE_HOST, id),
        original.to_string(),
    ]
}

fn dedup(candidates: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !candidate.is_empty() && !seen.contains(&candidate) {
            seen.push(candidate);
        }
    }
    seen
}

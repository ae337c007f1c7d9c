mod candidates;
mod classify;
mod types;

pub use candidates::resolve_candidates;
pub use classify::{canonical_url, classify, extract_id, is_drive_url};
pub use types::*;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceType {
    Local,
    GoogleDriveFile,
    GoogleDriveFolder,
}

impl SourceType {
    pub fn is_drive(&self) -> bool {
        !matches!(self, SourceType::Local)
    }
}

/// Parsed form of a media link.
///
/// The object id is present exactly when the source is a Drive file or
/// folder, which is why the fields are private and only the constructors
/// below can build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaReference {
    source_type: SourceType,
    object_id: Option<String>,
}

impl MediaReference {
    pub fn local() -> Self {
        Self {
            source_type: SourceType::Local,
            object_id: None,
        }
    }

    pub fn drive_file(id: impl Into<String>) -> Self {
        Self {
            source_type: SourceType::GoogleDriveFile,
            object_id: Some(id.into()),
        }
    }

    pub fn drive_folder(id: impl Into<String>) -> Self {
        Self {
            source_type: SourceType::GoogleDriveFolder,
            object_id: Some(id.into()),
        }
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    pub fn object_id(&self) -> Option<&str> {
        self.object_id.as_deref()
    }

    pub fn is_drive(&self) -> bool {
        self.source_type.is_drive()
    }

    pub fn is_folder(&self) -> bool {
        self.source_type == SourceType::GoogleDriveFolder
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Anything that is not `video/*` renders as an image.
    pub fn from_mime(mime: &str) -> Self {
        if mime.trim().to_ascii_lowercase().starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// One viewable unit with its display candidates, best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFile {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    display_url_candidates: Vec<String>,
    media_kind: MediaKind,
}

impl MediaFile {
    /// Returns `None` when there is no candidate to display.
    pub fn new(
        id: impl Into<String>,
        name: Option<String>,
        candidates: Vec<String>,
        media_kind: MediaKind,
    ) -> Option<Self> {
        if candidates.is_empty() {
            return None;
        }
        Some(Self {
            id: id.into(),
            name,
            display_url_candidates: candidates,
            media_kind,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn candidates(&self) -> &[String] {
        &self.display_url_candidates
    }

    pub fn media_kind(&self) -> MediaKind {
        self.media_kind
    }
}

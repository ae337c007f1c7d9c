//! Opening a link as a viewer collection, using the server listing for
//! Drive links.

use crate::api::{ApiError, MediaSource, RemoteFile, ResolveRequest, ResolveResponse};
use crate::cache::SharedCache;
use crate::drive::{classify, resolve_candidates, MediaFile, MediaKind, MediaReference};
use crate::render::{CollectionKind, MediaCollection};
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Could not list folder {id}: {source}")]
    FolderUnavailable {
        id: String,
        #[source]
        source: ApiError,
    },
}

pub struct MediaResolver<S> {
    source: S,
    cache: Option<SharedCache<ResolveResponse>>,
}

impl<S: MediaSource> MediaResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: SharedCache<ResolveResponse>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the viewer collection for `url`.
    ///
    /// `kind` is the media type chosen by the user, used for files the
    /// server does not describe.
    #[instrument(skip(self))]
    pub async fn open(&self, url: &str, kind: Option<MediaKind>) -> Result<MediaCollection, ResolveError> {
        let url = url.trim();
        let reference = classify(url);
        let fallback_kind = kind.unwrap_or(MediaKind::Image);

        let Some(id) = reference.object_id() else {
            return Ok(local_collection(&reference, url, fallback_kind));
        };

        let response = match self.fetch(url, id, kind).await {
            Ok(response) => response,
            Err(e) if reference.is_folder() => {
                return Err(ResolveError::FolderUnavailable {
                    id: id.to_string(),
                    source: e,
                });
            }
            Err(e) => {
                tracing::warn!("Falling back to locally built candidates: {}", e);
                return Ok(local_collection(&reference, url, fallback_kind));
            }
        };

        let items: Vec<MediaFile> = response
            .files
            .iter()
            .filter_map(|file| to_media_file(file, fallback_kind))
            .collect();

        tracing::info!(kind = ?response.kind, files = items.len(), "Opened media collection");
        Ok(MediaCollection::new(response.kind, items))
    }

    async fn fetch(&self, url: &str, id: &str, kind: Option<MediaKind>) -> Result<ResolveResponse, ApiError> {
        let key = match kind {
            Some(kind) => format!("{}#{}", url, kind),
            None => url.to_string(),
        };

        if let Some(hit) = self
            .cache
            .as_ref()
            .and_then(|c| c.lock().ok())
            .and_then(|mut c| c.get(&key))
        {
            tracing::debug!("Using cached media listing");
            return Ok(hit);
        }

        let response = self
            .source
            .resolve_media(ResolveRequest {
                url,
                file_id: id,
                media_type: kind,
            })
            .await?;

        if let Some(mut cache) = self.cache.as_ref().and_then(|c| c.lock().ok()) {
            cache.insert(&key, response.clone());
        }
        Ok(response)
    }
}

fn local_collection(reference: &MediaReference, url: &str, kind: MediaKind) -> MediaCollection {
    let id = reference.object_id().unwrap_or(url);
    let candidates = resolve_candidates(reference, url, kind);
    match MediaFile::new(id, None, candidates, kind) {
        Some(file) => MediaCollection::single(file),
        None => MediaCollection::new(CollectionKind::Single, Vec::new()),
    }
}

fn to_media_file(file: &RemoteFile, fallback: MediaKind) -> Option<MediaFile> {
    let kind = file
        .kind
        .as_deref()
        .and_then(MediaKind::parse)
        .or_else(|| file.mime_type.as_deref().map(MediaKind::from_mime))
        .unwrap_or(fallback);

    // Listed files may come back as bare ids rather than share links.
    let reference = match classify(&file.url) {
        r if r.is_drive() => r,
        _ if !file.id.is_empty() => MediaReference::drive_file(file.id.as_str()),
        r => r,
    };

    let candidates = resolve_candidates(&reference, &file.url, kind);
    MediaFile::new(file.id.as_str(), file.name.clone(), candidates, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::LoadState;
    use async_trait::async_trait;

    struct FixedSource(Option<ResolveResponse>);

    #[async_trait]
    impl MediaSource for FixedSource {
        async fn resolve_media(&self, _request: ResolveRequest<'_>) -> Result<ResolveResponse, ApiError> {
            self.0
                .clone()
                .ok_or_else(|| ApiError::Parse("no listing".into()))
        }
    }

    fn remote(id: &str, kind: Option<&str>, mime: Option<&str>) -> RemoteFile {
        RemoteFile {
            id: id.into(),
            name: Some(format!("{}.bin", id)),
            url: format!("https://drive.google.com/file/d/{}/view", id),
            kind: kind.map(str::to_string),
            mime_type: mime.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_local_path_needs_no_server() {
        let resolver = MediaResolver::new(FixedSource(None));
        let c = resolver.open("/img/x.png", None).await.unwrap();
        assert_eq!(c.kind(), CollectionKind::Single);
        assert_eq!(c.current_url(), Some("/img/x.png"));
    }

    #[tokio::test]
    async fn test_local_path_with_folder_segment_stays_local() {
        let resolver = MediaResolver::new(FixedSource(None));
        let c = resolver
            .open("/uploads/folders/2024/photo.jpg", Some(MediaKind::Image))
            .await
            .unwrap();
        assert_eq!(c.kind(), CollectionKind::Single);
        assert_eq!(c.current_url(), Some("/uploads/folders/2024/photo.jpg"));
        assert_eq!(c.current().unwrap().candidates().len(), 1);
    }

    #[tokio::test]
    async fn test_folder_listing_kinds() {
        let resolver = MediaResolver::new(FixedSource(Some(ResolveResponse {
            kind: CollectionKind::Folder,
            files: vec![
                remote("IMG1", Some("image"), None),
                remote("VID1", None, Some("video/mp4")),
                remote("UNK1", None, None),
            ],
        })));

        let c = resolver
            .open("https://drive.google.com/drive/folders/F1", Some(MediaKind::Video))
            .await
            .unwrap();

        assert_eq!(c.kind(), CollectionKind::Folder);
        assert_eq!(c.len(), 3);
        assert_eq!(c.items()[0].media_kind(), MediaKind::Image);
        assert_eq!(c.items()[0].candidates()[0], "https://lh3.googleusercontent.com/d/IMG1=s2000");
        assert_eq!(c.items()[1].media_kind(), MediaKind::Video);
        assert_eq!(c.items()[1].candidates()[0], "https://drive.google.com/file/d/VID1/view");
        assert_eq!(c.items()[2].media_kind(), MediaKind::Video);
        assert_eq!(c.load_state(), Some(&LoadState::Loading { candidate: 0 }));
    }

    #[tokio::test]
    async fn test_bare_id_urls_use_file_id() {
        let mut file = remote("RAW1", Some("image"), None);
        file.url = "RAW1".into();
        let resolver = MediaResolver::new(FixedSource(Some(ResolveResponse {
            kind: CollectionKind::Single,
            files: vec![file],
        })));

        let c = resolver
            .open("https://drive.google.com/file/d/RAW1/view", None)
            .await
            .unwrap();
        assert_eq!(c.current_url(), Some("https://lh3.googleusercontent.com/d/RAW1=s2000"));
    }

    #[tokio::test]
    async fn test_file_degrades_without_server() {
        let resolver = MediaResolver::new(FixedSource(None));
        let url = "https://drive.google.com/file/d/ABC/view";
        let c = resolver.open(url, Some(MediaKind::Video)).await.unwrap();
        assert_eq!(c.kind(), CollectionKind::Single);
        assert_eq!(c.current_url(), Some(url));
        assert_eq!(c.current().unwrap().id(), "ABC");
    }

    #[tokio::test]
    async fn test_folder_without_server_is_error() {
        let resolver = MediaResolver::new(FixedSource(None));
        let err = resolver
            .open("https://drive.google.com/drive/folders/F1", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("F1"));
    }

    #[tokio::test]
    async fn test_empty_folder_listing() {
        let resolver = MediaResolver::new(FixedSource(Some(ResolveResponse {
            kind: CollectionKind::Folder,
            files: vec![],
        })));
        let c = resolver
            .open("https://drive.google.com/drive/folders/F1", None)
            .await
            .unwrap();
        assert!(c.is_empty());
        assert!(c.current_url().is_none());
    }
}

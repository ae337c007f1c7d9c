//! Client for the two JSON endpoints the site backend exposes for Drive links.

use crate::config::ApiConfig;
use crate::drive::MediaKind;
use crate::render::CollectionKind;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use url::Url;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessCheckRequest<'a> {
    pub url: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessCheckResponse {
    pub accessible: bool,
    #[serde(default)]
    pub is_folder: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest<'a> {
    pub url: &'a str,
    pub file_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub url: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveResponse {
    #[serde(rename = "type")]
    pub kind: CollectionKind,
    #[serde(default)]
    pub files: Vec<RemoteFile>,
}

/// Server-side check of whether a Drive object is publicly viewable.
#[async_trait]
pub trait AccessChecker: Send + Sync {
    async fn check_access(&self, url: &str) -> Result<AccessCheckResponse, ApiError>;
}

/// Server-side listing of the files behind a Drive link.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn resolve_media(&self, request: ResolveRequest<'_>) -> Result<ResolveResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct DriveApi {
    client: reqwest::Client,
    check_url: Url,
    resolve_url: Url,
}

impl DriveApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base = Url::parse(&config.base_url)
            .map_err(|_| ApiError::InvalidUrl(config.base_url.clone()))?;
        let join = |path: &str| {
            base.join(path)
                .map_err(|_| ApiError::InvalidUrl(format!("{}{}", config.base_url, path)))
        };

        Ok(Self {
            client: reqwest::Client::builder().timeout(config.timeout()).build()?,
            check_url: join(&config.check_path)?,
            resolve_url: join(&config.resolve_path)?,
        })
    }

    pub fn check_url(&self) -> &Url {
        &self.check_url
    }

    pub fn resolve_url(&self) -> &Url {
        &self.resolve_url
    }

    async fn post_json<B, T>(&self, url: &Url, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .client
            .post(url.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl AccessChecker for DriveApi {
    #[instrument(skip(self))]
    async fn check_access(&self, url: &str) -> Result<AccessCheckResponse, ApiError> {
        let result: Result<AccessCheckResponse, ApiError> =
            self.post_json(&self.check_url, &AccessCheckRequest { url }).await;
        match &result {
            Ok(resp) => tracing::debug!(accessible = resp.accessible, is_folder = resp.is_folder, "Access check finished"),
            Err(e) => tracing::warn!("Access check failed: {}", e),
        }
        result
    }
}

#[async_trait]
impl MediaSource for DriveApi {
    #[instrument(skip(self, request), fields(url = request.url, file_id = request.file_id))]
    async fn resolve_media(&self, request: ResolveRequest<'_>) -> Result<ResolveResponse, ApiError> {
        let result: Result<ResolveResponse, ApiError> = self.post_json(&self.resolve_url, &request).await;
        match &result {
            Ok(resp) => tracing::debug!(kind = ?resp.kind, files = resp.files.len(), "Media resolved"),
            Err(e) => tracing::warn!("Media resolution failed: {}", e),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let api = DriveApi::new(&ApiConfig {
            base_url: "https://club.example.org".into(),
            ..ApiConfig::default()
        })
        .unwrap();
        assert_eq!(api.check_url().as_str(), "https://club.example.org/api/drive/check-access");
        assert_eq!(api.resolve_url().as_str(), "https://club.example.org/api/drive/resolve");
    }

    #[test]
    fn test_bad_base_url() {
        let err = DriveApi::new(&ApiConfig {
            base_url: "not a url".into(),
            ..ApiConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn test_wire_shapes() {
        let req = ResolveRequest {
            url: "https://drive.google.com/file/d/A/view",
            file_id: "A",
            media_type: Some(MediaKind::Video),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["fileId"], "A");
        assert_eq!(json["mediaType"], "video");

        let req = ResolveRequest { media_type: None, ..req };
        assert!(serde_json::to_value(&req).unwrap().get("mediaType").is_none());

        let resp: AccessCheckResponse =
            serde_json::from_str(r#"{"accessible":true,"isFolder":true}"#).unwrap();
        assert!(resp.accessible && resp.is_folder);

        let resp: ResolveResponse = serde_json::from_str(
            r#"{"type":"folder","files":[{"id":"1","name":"a.jpg","url":"https://drive.google.com/file/d/1/view","type":"image","mimeType":"image/jpeg"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.kind, CollectionKind::Folder);
        assert_eq!(resp.files[0].mime_type.as_deref(), Some("image/jpeg"));
    }
}

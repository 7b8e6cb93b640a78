use reqwest::{Url, header::CONTENT_TYPE};
use serde::Deserialize;

use super::ObjectStorage;
use crate::error::{Result, StorageError};

/// Object storage backed by the Firebase Storage REST API.
pub struct FirebaseStorageClient {
    base_url: Url,
    bucket: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

impl FirebaseStorageClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://firebasestorage.googleapis.com";

    pub fn new(base_url: &str, bucket: impl Into<String>) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| StorageError::InvalidUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            base_url,
            bucket: bucket.into(),
            api_key: None,
            client: reqwest::Client::builder()
                .user_agent(concat!("pokedit/", env!("CARGO_PKG_VERSION")))
                .build()?,
        })
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// `<base>/v0/b/<bucket>/o`, optionally followed by the encoded object path.
    fn objects_url(&self, path: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StorageError::InvalidUrl(self.base_url.to_string()))?;
            segments
                .pop_if_empty()
                .extend(["v0", "b", self.bucket.as_str(), "o"]);
            if let Some(path) = path {
                // The whole object path is one segment, slashes included
                segments.push(path);
            }
        }

        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }

        Ok(url)
    }

    async fn metadata(&self, path: &str) -> Result<ObjectMetadata> {
        let url = self.objects_url(Some(path))?;
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(StorageError::from_response(response).await);
        }

        Ok(response.json::<ObjectMetadata>().await?)
    }

    /// Public media URL for `path`. The API key never ends up in it.
    fn download_url(&self, path: &str, token: &str) -> Result<Url> {
        let mut url = self.objects_url(Some(path))?;
        url.set_query(None);
        url.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("token", token);
        Ok(url)
    }

    fn upload_url(&self, path: &str) -> Result<Url> {
        let mut url = self.objects_url(None)?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", path);
        Ok(url)
    }
}

/// First non-empty entry of a comma-separated `downloadTokens` value.
fn first_token(tokens: Option<&str>) -> Option<&str> {
    tokens?.split(',').map(str::trim).find(|t| !t.is_empty())
}

#[async_trait::async_trait]
impl ObjectStorage for FirebaseStorageClient {
    async fn upload_bytes(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let url = self.upload_url(path)?;
        tracing::debug!("Uploading {} bytes to {}", bytes.len(), path);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::from_response(response).await);
        }

        let uploaded = response.json::<ObjectMetadata>().await?;
        tracing::debug!("Uploaded object {}", uploaded.name);

        Ok(())
    }

    async fn resolve_url(&self, path: &str) -> Result<String> {
        let metadata = self.metadata(path).await?;

        let token = first_token(metadata.download_tokens.as_deref()).ok_or_else(|| {
            StorageError::Backend {
                status: 200,
                message: format!("object '{}' has no download token", metadata.name),
            }
        })?;

        Ok(self.download_url(path, token)?.into())
    }
}

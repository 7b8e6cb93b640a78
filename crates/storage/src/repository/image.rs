use crate::backend::ObjectStorage;
use crate::error::Result;

/// Folder that holds every uploaded Pokémon image.
pub const IMAGE_PREFIX: &str = "pokemons";

/// File name stem shared by uploaded images.
pub const IMAGE_ENTITY: &str = "pokemon";

const FALLBACK_EXTENSION: &str = "bin";

pub struct ImageRepository<'a> {
    storage: &'a dyn ObjectStorage,
}

impl<'a> ImageRepository<'a> {
    pub fn new(storage: &'a dyn ObjectStorage) -> Self {
        Self { storage }
    }

    /// Upload image bytes under a fresh timestamped path and return the
    /// public URL of the stored object.
    pub async fn upload(&self, source_uri: &str, bytes: Vec<u8>) -> Result<String> {
        let timestamp_ms = chrono::Utc::now().timestamp_millis();
        self.upload_at(source_uri, bytes, timestamp_ms).await
    }

    pub async fn upload_at(
        &self,
        source_uri: &str,
        bytes: Vec<u8>,
        timestamp_ms: i64,
    ) -> Result<String> {
        let extension = file_extension(source_uri);
        let path = storage_path(IMAGE_PREFIX, IMAGE_ENTITY, timestamp_ms, extension);
        let content_type = content_type_for(extension);

        tracing::debug!("Uploading image {} as {} ({})", source_uri, path, content_type);
        self.storage
            .upload_bytes(&path, bytes, content_type)
            .await?;

        self.storage.resolve_url(&path).await
    }
}

/// `<prefix>/<entity>_<timestamp_ms>.<extension>`
pub fn storage_path(prefix: &str, entity: &str, timestamp_ms: i64, extension: &str) -> String {
    format!("{}/{}_{}.{}", prefix, entity, timestamp_ms, extension)
}

/// Extension of the last path segment of `uri`, ignoring any query or
/// fragment. Falls back to `bin` when the segment has none.
pub fn file_extension(uri: &str) -> &str {
    let path = uri.split(['?', '#']).next().unwrap_or(uri);
    let file_name = path.rsplit('/').next().unwrap_or(path);

    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext,
        _ => FALLBACK_EXTENSION,
    }
}

pub fn content_type_for(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

use std::path::PathBuf;

use crate::error::{EditorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

/// An image chosen by the user, already read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedImage {
    /// Where the image came from; its extension names the uploaded file.
    pub uri: String,
    pub bytes: Vec<u8>,
}

/// Gallery access provided by the host platform.
#[async_trait::async_trait]
pub trait ImagePicker: Send + Sync {
    async fn request_permission(&self) -> Result<PermissionStatus>;

    /// `None` when the user dismissed the picker without choosing.
    async fn pick_image(&self) -> Result<Option<PickedImage>>;
}

/// Picker for terminal use: the "selection" is a path given up front.
pub struct FilePicker {
    path: Option<PathBuf>,
}

impl FilePicker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait::async_trait]
impl ImagePicker for FilePicker {
    async fn request_permission(&self) -> Result<PermissionStatus> {
        Ok(PermissionStatus::Granted)
    }

    async fn pick_image(&self) -> Result<Option<PickedImage>> {
        let Some(path) = &self.path else {
            return Ok(None);
        };

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| EditorError::Picker(format!("{}: {}", path.display(), e)))?;

        Ok(Some(PickedImage {
            uri: path.display().to_string(),
            bytes,
        }))
    }
}

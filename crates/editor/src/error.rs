use storage::error::StorageError;
use thiserror::Error;

use crate::alert::Alert;
use crate::session::SessionState;

pub type Result<T> = std::result::Result<T, EditorError>;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Image upload failed: {0}")]
    Upload(#[source] StorageError),

    #[error("Image picker failed: {0}")]
    Picker(String),

    #[error("Image editing is disabled for this session")]
    ImageEditDisabled,

    #[error("Cannot {action} while the session is {state}")]
    InvalidState {
        action: &'static str,
        state: SessionState,
    },
}

impl EditorError {
    /// Message to show the user; internal details stay in the logs.
    pub fn user_alert(&self) -> Alert {
        match self {
            Self::Storage(StorageError::NotFound) => {
                Alert::new("Error", "This Pokémon no longer exists.")
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                Alert::save_failed()
            }
            Self::Upload(e) => {
                tracing::error!("Image upload error: {:?}", e);
                Alert::upload_failed()
            }
            Self::Picker(msg) => {
                tracing::error!("Image picker error: {}", msg);
                Alert::new("Error", "Could not load the selected image.")
            }
            Self::ImageEditDisabled => Alert::new("Error", "Changing the image is not allowed here."),
            Self::InvalidState { .. } => Alert::new("Error", "Please wait for the current action to finish."),
        }
    }
}

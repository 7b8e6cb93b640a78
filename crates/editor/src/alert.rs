use std::fmt;

/// A blocking message for the person editing the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn missing_fields() -> Self {
        Self::new("Error", "Please fill in all fields before saving.")
    }

    pub fn saved() -> Self {
        Self::new("Success", "Pokémon updated successfully.")
    }

    pub fn save_failed() -> Self {
        Self::new("Error", "Failed to update. Please try again.")
    }

    pub fn upload_failed() -> Self {
        Self::new("Error", "Could not upload the image. Please try again.")
    }

    pub fn permission_required() -> Self {
        Self::new(
            "Permission required",
            "We need permission to access your photos.",
        )
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

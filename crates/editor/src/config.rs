use anyhow::{Context, Result, bail};
use storage::backend::{FirebaseStorageClient, FirestoreClient};

#[derive(Debug, Clone)]
pub struct Config {
    pub firestore_project_id: String,
    pub firestore_base_url: String,
    pub storage_bucket: String,
    pub storage_base_url: String,
    pub api_key: Option<String>,
    pub allow_image_edit: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            firestore_project_id: non_empty("FIRESTORE_PROJECT_ID")
                .context("Cannot load FIRESTORE_PROJECT_ID env variable")?,
            firestore_base_url: non_empty("FIRESTORE_BASE_URL")
                .unwrap_or_else(|| FirestoreClient::DEFAULT_BASE_URL.to_string()),
            storage_bucket: non_empty("FIREBASE_STORAGE_BUCKET")
                .context("Cannot load FIREBASE_STORAGE_BUCKET env variable")?,
            storage_base_url: non_empty("FIREBASE_STORAGE_BASE_URL")
                .unwrap_or_else(|| FirebaseStorageClient::DEFAULT_BASE_URL.to_string()),
            api_key: non_empty("FIREBASE_API_KEY"),
            allow_image_edit: match non_empty("ALLOW_IMAGE_EDIT") {
                Some(value) => parse_flag(&value)
                    .with_context(|| format!("ALLOW_IMAGE_EDIT must be a boolean, got '{}'", value))?,
                None => true,
            },
        })
    }

    pub fn firestore(&self) -> Result<FirestoreClient> {
        Ok(
            FirestoreClient::new(&self.firestore_base_url, &self.firestore_project_id)
                .context("Failed to create Firestore client")?
                .with_api_key(self.api_key.clone()),
        )
    }

    pub fn object_storage(&self) -> Result<FirebaseStorageClient> {
        Ok(
            FirebaseStorageClient::new(&self.storage_base_url, &self.storage_bucket)
                .context("Failed to create Firebase Storage client")?
                .with_api_key(self.api_key.clone()),
        )
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("unrecognized flag value '{}'", other),
    }
}

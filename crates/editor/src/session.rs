//! Edit session for a single Pokémon document.
//!
//! A session starts in [`SessionState::Loading`], becomes editable once
//! [`EditSession::load`] has run (whatever its result), and ends in
//! [`SessionState::Navigated`] after a successful submit or a cancel.

use std::fmt;
use std::sync::Arc;

use storage::dto::pokemon::describe_validation_errors;
use storage::error::StorageError;
use storage::models::Pokemon;
use storage::repository::{image::ImageRepository, pokemon::PokemonRepository};
use storage::{DocumentStore, ObjectStorage};
use validator::Validate;

use crate::alert::Alert;
use crate::error::{EditorError, Result};
use crate::form::{Field, FormState, ScreenParams};
use crate::picker::ImagePicker;

/// Remote collaborators of a session.
#[derive(Clone)]
pub struct Services {
    pub documents: Arc<dyn DocumentStore>,
    pub objects: Arc<dyn ObjectStorage>,
}

impl Services {
    pub fn new(documents: Arc<dyn DocumentStore>, objects: Arc<dyn ObjectStorage>) -> Self {
        Self { documents, objects }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorOptions {
    pub allow_image_edit: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            allow_image_edit: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Editing,
    Submitting,
    Navigated(Destination),
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::Editing => write!(f, "editing"),
            Self::Submitting => write!(f, "submitting"),
            Self::Navigated(Destination::Home) => write!(f, "closed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(Pokemon),
    /// No stored document; the screen parameters stay in the form.
    NotFound,
    /// Lookup failed; logged, the screen parameters stay in the form.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    Updated { url: String },
    PermissionDenied(Alert),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved {
        pokemon: Pokemon,
        alert: Alert,
        destination: Destination,
    },
    /// Nothing was written.
    Invalid { alert: Alert, errors: Vec<String> },
    /// The write failed; the form is kept so the user can retry.
    Failed { alert: Alert },
}

pub struct EditSession {
    id: String,
    form: FormState,
    state: SessionState,
    options: EditorOptions,
    services: Services,
}

impl EditSession {
    pub fn new(services: Services, params: ScreenParams, options: EditorOptions) -> Self {
        tracing::debug!("Opening editor with parameters: {:?}", params);

        Self {
            form: FormState::from_params(&params),
            id: params.id,
            state: SessionState::Loading,
            options,
            services,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Fetch the stored record and copy it into the form.
    ///
    /// Lookup problems are logged but never block editing.
    pub async fn load(&mut self) -> Result<LoadOutcome> {
        if self.state != SessionState::Loading {
            return Err(self.invalid_state("load"));
        }

        let repo = PokemonRepository::new(self.services.documents.as_ref());
        let outcome = match repo.find_by_id(&self.id).await {
            Ok(pokemon) => {
                tracing::info!("Loaded Pokémon {} ({})", self.id, pokemon.name);
                self.form.populate(&pokemon);
                LoadOutcome::Loaded(pokemon)
            }
            Err(StorageError::NotFound) => {
                tracing::warn!("No Pokémon found with id {}", self.id);
                LoadOutcome::NotFound
            }
            Err(e) => {
                tracing::error!("Failed to fetch Pokémon {}: {}", self.id, e);
                LoadOutcome::Failed
            }
        };

        self.state = SessionState::Editing;
        Ok(outcome)
    }

    pub fn edit(&mut self, field: Field, value: impl Into<String>) -> Result<()> {
        self.ensure_editable("edit")?;
        self.form.set(field, value);
        Ok(())
    }

    pub fn clear_image(&mut self) -> Result<()> {
        self.ensure_editable("clear the image")?;
        self.ensure_image_edit()?;
        self.form.clear_image();
        Ok(())
    }

    /// Ask the picker for a new image, upload it and point the form at the
    /// uploaded copy. The form is untouched unless every step succeeds.
    pub async fn pick_image(&mut self, picker: &dyn ImagePicker) -> Result<ImageOutcome> {
        self.ensure_editable("change the image")?;
        self.ensure_image_edit()?;

        let permission = picker.request_permission().await?;
        if !permission.is_granted() {
            tracing::warn!("Gallery permission not granted: {:?}", permission);
            return Ok(ImageOutcome::PermissionDenied(Alert::permission_required()));
        }

        let Some(picked) = picker.pick_image().await? else {
            return Ok(ImageOutcome::Cancelled);
        };

        let images = ImageRepository::new(self.services.objects.as_ref());
        let url = images
            .upload(&picked.uri, picked.bytes)
            .await
            .map_err(|e| {
                tracing::error!("Failed to upload image {}: {}", picked.uri, e);
                EditorError::Upload(e)
            })?;

        tracing::info!("Uploaded new image for Pokémon {}: {}", self.id, url);
        self.form.set_image(url.clone());

        Ok(ImageOutcome::Updated { url })
    }

    /// Validate the form and overwrite the stored document with it.
    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        self.ensure_editable("submit")?;

        let request = self.form.to_request();
        if let Err(errors) = request.validate() {
            let errors = describe_validation_errors(&errors);
            tracing::debug!("Rejected submit for {}: {:?}", self.id, errors);
            return Ok(SubmitOutcome::Invalid {
                alert: Alert::missing_fields(),
                errors,
            });
        }

        self.state = SessionState::Submitting;

        let repo = PokemonRepository::new(self.services.documents.as_ref());
        match repo.replace(&self.id, &request).await {
            Ok(pokemon) => {
                tracing::info!("Updated Pokémon {}", self.id);
                self.state = SessionState::Navigated(Destination::Home);
                Ok(SubmitOutcome::Saved {
                    pokemon,
                    alert: Alert::saved(),
                    destination: Destination::Home,
                })
            }
            Err(e) => {
                tracing::error!("Failed to update Pokémon {}: {}", self.id, e);
                self.state = SessionState::Editing;
                Ok(SubmitOutcome::Failed {
                    alert: Alert::save_failed(),
                })
            }
        }
    }

    /// Leave without saving.
    pub fn cancel(&mut self) -> Result<Destination> {
        if let SessionState::Navigated(_) = self.state {
            return Err(self.invalid_state("cancel"));
        }

        self.state = SessionState::Navigated(Destination::Home);
        Ok(Destination::Home)
    }

    // A submit future dropped before completion leaves the session in
    // `Submitting`; it is treated as editable so the user can retry.
    fn ensure_editable(&self, action: &'static str) -> Result<()> {
        match self.state {
            SessionState::Editing | SessionState::Submitting => Ok(()),
            _ => Err(self.invalid_state(action)),
        }
    }

    fn ensure_image_edit(&self) -> Result<()> {
        if self.options.allow_image_edit {
            Ok(())
        } else {
            Err(EditorError::ImageEditDisabled)
        }
    }

    fn invalid_state(&self, action: &'static str) -> EditorError {
        EditorError::InvalidState {
            action,
            state: self.state,
        }
    }
}

use validator::{Validate, ValidationErrors};

use crate::models::PokemonDocument;

/// Full replacement payload for a Pokémon document.
///
/// Every scalar field is required. The image reference is optional and an
/// empty string is normalized to `None` so it is stored as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct UpdatePokemonRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Type is required"))]
    pub category: String,

    #[validate(length(min = 1, message = "Height is required"))]
    pub height: String,

    #[validate(length(min = 1, message = "Weight is required"))]
    pub weight: String,

    #[validate(length(min = 1, message = "Number is required"))]
    pub number: String,

    pub image_uri: Option<String>,
}

impl UpdatePokemonRequest {
    /// Same payload with an empty image reference collapsed to `None`.
    pub fn normalized(mut self) -> Self {
        if self.image_uri.as_deref().is_some_and(str::is_empty) {
            self.image_uri = None;
        }
        self
    }
}

impl From<UpdatePokemonRequest> for PokemonDocument {
    fn from(req: UpdatePokemonRequest) -> Self {
        let req = req.normalized();
        Self {
            name: req.name,
            category: req.category,
            height: req.height,
            weight: req.weight,
            number: req.number,
            image_uri: req.image_uri,
        }
    }
}

/// Flattens validation errors into `field: message` lines, sorted by field.
pub fn describe_validation_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut lines: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                format!(
                    "{}: {}",
                    field,
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                )
            })
        })
        .collect();
    lines.sort();
    lines
}

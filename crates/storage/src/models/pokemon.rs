use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::backend::Document;
use crate::error::{Result, StorageError};

/// A Pokémon record as seen by the editor, keyed by its document id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: String,
    pub name: String,
    pub category: String,
    pub height: String,
    pub weight: String,
    pub number: String,
    pub image_uri: Option<String>,
}

impl Pokemon {
    pub fn from_document(id: impl Into<String>, document: Document) -> Result<Self> {
        let fields = PokemonDocument::from_document(document)?;
        Ok(fields.with_id(id))
    }
}

/// Field layout of a document in the `tblPokemon` collection.
///
/// Decoding is lenient: absent or `null` scalars become empty strings,
/// numbers written by other clients become their decimal text, and an
/// empty image reference is treated as no image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonDocument {
    #[serde(rename = "nomePokemon", default, deserialize_with = "lenient_string")]
    pub name: String,

    #[serde(rename = "tipo", default, deserialize_with = "lenient_string")]
    pub category: String,

    #[serde(rename = "altura", default, deserialize_with = "lenient_string")]
    pub height: String,

    #[serde(rename = "peso", default, deserialize_with = "lenient_string")]
    pub weight: String,

    #[serde(rename = "numero", default, deserialize_with = "lenient_string")]
    pub number: String,

    /// Always serialized, as `null` when there is no image.
    #[serde(rename = "imageUri", default, deserialize_with = "lenient_image")]
    pub image_uri: Option<String>,
}

impl PokemonDocument {
    pub fn from_document(document: Document) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(document))?)
    }

    pub fn into_document(self) -> Result<Document> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(StorageError::Serialization(serde::ser::Error::custom(
                format!("document serialized to non-object: {}", other),
            ))),
        }
    }

    pub fn with_id(self, id: impl Into<String>) -> Pokemon {
        Pokemon {
            id: id.into(),
            name: self.name,
            category: self.category,
            height: self.height,
            weight: self.weight,
            number: self.number,
            image_uri: self.image_uri,
        }
    }
}

impl From<Pokemon> for PokemonDocument {
    fn from(pokemon: Pokemon) -> Self {
        Self {
            name: pokemon.name,
            category: pokemon.category,
            height: pokemon.height,
            weight: pokemon.weight,
            number: pokemon.number,
            image_uri: pokemon.image_uri,
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_image<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

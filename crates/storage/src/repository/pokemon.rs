use crate::backend::DocumentStore;
use crate::dto::pokemon::UpdatePokemonRequest;
use crate::error::{Result, StorageError};
use crate::models::{Pokemon, PokemonDocument};

/// Collection holding one document per Pokémon.
pub const COLLECTION: &str = "tblPokemon";

pub struct PokemonRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> PokemonRepository<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Find a Pokémon by document id
    pub async fn find_by_id(&self, id: &str) -> Result<Pokemon> {
        let document = self
            .store
            .get_by_id(COLLECTION, id)
            .await?
            .ok_or(StorageError::NotFound)?;

        Pokemon::from_document(id, document)
    }

    /// Overwrite every field of an existing Pokémon
    pub async fn replace(&self, id: &str, req: &UpdatePokemonRequest) -> Result<Pokemon> {
        let fields = PokemonDocument::from(req.clone());
        let document = fields.clone().into_document()?;

        self.store.replace_by_id(COLLECTION, id, document).await?;

        Ok(fields.with_id(id))
    }
}

pub mod pokemon;

pub use pokemon::{Pokemon, PokemonDocument};

pub mod image;
pub mod pokemon;

use std::fmt;

use storage::dto::pokemon::UpdatePokemonRequest;
use storage::models::Pokemon;

/// Parameters handed over by the screen that opened the editor, usually a
/// list entry. The pre-fill values are used until (or unless) the stored
/// document is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenParams {
    pub id: String,
    pub name: Option<String>,
    pub category: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub number: Option<String>,
    pub image_uri: Option<String>,
}

impl ScreenParams {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl From<Pokemon> for ScreenParams {
    fn from(pokemon: Pokemon) -> Self {
        Self {
            id: pokemon.id,
            name: Some(pokemon.name),
            category: Some(pokemon.category),
            height: Some(pokemon.height),
            weight: Some(pokemon.weight),
            number: Some(pokemon.number),
            image_uri: pokemon.image_uri,
        }
    }
}

/// The five required text fields of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Category,
    Height,
    Weight,
    Number,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Category,
        Field::Height,
        Field::Weight,
        Field::Number,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Category => "type",
            Field::Height => "height (m)",
            Field::Weight => "weight (kg)",
            Field::Number => "number",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Editable copy of a record. The image is kept as a plain string where
/// empty means "no image".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    name: String,
    category: String,
    height: String,
    weight: String,
    number: String,
    image: String,
}

impl FormState {
    pub fn from_params(params: &ScreenParams) -> Self {
        let or_empty = |value: &Option<String>| value.clone().unwrap_or_default();

        Self {
            name: or_empty(&params.name),
            category: or_empty(&params.category),
            height: or_empty(&params.height),
            weight: or_empty(&params.weight),
            number: or_empty(&params.number),
            image: or_empty(&params.image_uri),
        }
    }

    /// Replace every field, image included, with the stored values.
    pub fn populate(&mut self, pokemon: &Pokemon) {
        self.name = pokemon.name.clone();
        self.category = pokemon.category.clone();
        self.height = pokemon.height.clone();
        self.weight = pokemon.weight.clone();
        self.number = pokemon.number.clone();
        self.image = pokemon.image_uri.clone().unwrap_or_default();
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Category => &self.category,
            Field::Height => &self.height,
            Field::Weight => &self.weight,
            Field::Number => &self.number,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Category => &mut self.category,
            Field::Height => &mut self.height,
            Field::Weight => &mut self.weight,
            Field::Number => &mut self.number,
        };
        *slot = value.into();
    }

    pub fn image(&self) -> Option<&str> {
        (!self.image.is_empty()).then_some(self.image.as_str())
    }

    pub fn set_image(&mut self, url: impl Into<String>) {
        self.image = url.into();
    }

    pub fn clear_image(&mut self) {
        self.image.clear();
    }

    pub fn empty_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_empty())
            .collect()
    }

    pub fn to_request(&self) -> UpdatePokemonRequest {
        UpdatePokemonRequest {
            name: self.name.clone(),
            category: self.category.clone(),
            height: self.height.clone(),
            weight: self.weight.clone(),
            number: self.number.clone(),
            image_uri: self.image().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pikachu() -> Pokemon {
        Pokemon {
            id: "P001".into(),
            name: "Pikachu".into(),
            category: "Electric".into(),
            height: "0.4".into(),
            weight: "6".into(),
            number: "25".into(),
            image_uri: None,
        }
    }

    #[test]
    fn test_missing_params_default_to_empty() {
        let form = FormState::from_params(&ScreenParams::new("P001"));

        for field in Field::ALL {
            assert_eq!(form.get(field), "");
        }
        assert_eq!(form.image(), None);
        assert_eq!(form.empty_fields(), Field::ALL.to_vec());
    }

    #[test]
    fn test_params_prefill_form() {
        let params = ScreenParams::from(Pokemon {
            image_uri: Some("https://cdn.test/p.png".into()),
            ..pikachu()
        });

        let form = FormState::from_params(&params);
        assert_eq!(form.get(Field::Name), "Pikachu");
        assert_eq!(form.get(Field::Number), "25");
        assert_eq!(form.image(), Some("https://cdn.test/p.png"));
        assert!(form.empty_fields().is_empty());
    }

    #[test]
    fn test_populate_overwrites_prefill_including_image() {
        let mut params = ScreenParams::new("P001");
        params.name = Some("Pika".into());
        params.image_uri = Some("https://old.test/p.png".into());
        let mut form = FormState::from_params(&params);

        form.populate(&pikachu());
        assert_eq!(form.get(Field::Name), "Pikachu");
        assert_eq!(form.image(), None);
    }

    #[test]
    fn test_request_mirrors_form() {
        let mut form = FormState::default();
        form.populate(&pikachu());
        form.set(Field::Weight, "6.1");

        let req = form.to_request();
        assert_eq!(req.weight, "6.1");
        assert_eq!(req.name, "Pikachu");
        assert_eq!(req.image_uri, None);

        form.set_image("https://cdn.test/new.png");
        assert_eq!(
            form.to_request().image_uri.as_deref(),
            Some("https://cdn.test/new.png")
        );

        form.clear_image();
        assert_eq!(form.to_request().image_uri, None);
    }
}

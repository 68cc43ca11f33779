//! Catalog entity models.
//!
//! [`Entity`] is the summary shape every list path produces, whichever remote
//! query it came from. [`EntityDetails`] is the full record shown on the
//! detail view.

use serde::{Deserialize, Serialize};

/// Base URL for the per-id front sprites published by the PokeAPI project.
pub const SPRITE_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

/// One catalog record as shown in list views.
///
/// Identity is `id`; two entities with the same id are the same creature even
/// if they were produced by different queries (the name index carries no
/// categories, the category index carries exactly one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub name: String,
    pub sprite_url: String,
    pub categories: Vec<String>,
}

impl Entity {
    /// Builds a summary from a `{name, url}` resource reference.
    ///
    /// The id is the trailing numeric path segment of `url`. Returns `None`
    /// when the URL does not end in a number.
    ///
    /// # Examples
    ///
    /// ```
    /// use pokedex::domain::Entity;
    ///
    /// let e = Entity::from_resource("pikachu", "https://pokeapi.co/api/v2/pokemon/25/").unwrap();
    /// assert_eq!(e.id, 25);
    /// assert!(e.sprite_url.ends_with("/25.png"));
    /// assert!(e.categories.is_empty());
    /// ```
    #[must_use]
    pub fn from_resource(name: &str, url: &str) -> Option<Self> {
        let id = parse_resource_id(url)?;
        Some(Self {
            id,
            name: name.to_string(),
            sprite_url: sprite_url(id),
            categories: Vec::new(),
        })
    }

    /// Returns the entity with `category` recorded as one of its categories.
    #[must_use]
    pub fn with_category(mut self, category: &str) -> Self {
        if !self.categories.iter().any(|c| c == category) {
            self.categories.push(category.to_string());
        }
        self
    }

    /// Catalog number padded to three digits, e.g. `#025`.
    #[must_use]
    pub fn number(&self) -> String {
        format!("#{:03}", self.id)
    }
}

/// Parses the trailing numeric path segment of a resource URL.
///
/// Both `.../pokemon/25/` and `.../pokemon/25` yield `25`.
#[must_use]
pub fn parse_resource_id(url: &str) -> Option<u32> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse::<u32>().ok())
}

/// Front sprite URL for an entity id.
#[must_use]
pub fn sprite_url(id: u32) -> String {
    format!("{SPRITE_BASE_URL}/{id}.png")
}

/// An ability entry of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    pub hidden: bool,
    pub slot: u32,
}

/// A base stat entry of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub name: String,
    pub base: u32,
    pub effort: u32,
}

/// Full record of one entity, as returned by the detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDetails {
    pub id: u32,
    pub name: String,
    /// Front sprite, if the API has one.
    pub sprite_url: Option<String>,
    /// Official artwork, if the API has one.
    pub artwork_url: Option<String>,
    /// Category names ordered by slot.
    pub categories: Vec<String>,
    /// Height in decimetres.
    pub height: u32,
    /// Weight in hectograms.
    pub weight: u32,
    pub abilities: Vec<Ability>,
    pub stats: Vec<Stat>,
}

impl EntityDetails {
    /// Collapses the details into the list summary shape.
    #[must_use]
    pub fn summary(&self) -> Entity {
        Entity {
            id: self.id,
            name: self.name.clone(),
            sprite_url: self
                .sprite_url
                .clone()
                .unwrap_or_else(|| sprite_url(self.id)),
            categories: self.categories.clone(),
        }
    }
}

/// One page of the remote paginated index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page<T> {
    /// Total number of records the API knows about.
    pub count: u32,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trailing_id_with_and_without_slash() {
        assert_eq!(parse_resource_id("https://pokeapi.co/api/v2/pokemon/6/"), Some(6));
        assert_eq!(parse_resource_id("https://pokeapi.co/api/v2/pokemon/151"), Some(151));
        assert_eq!(parse_resource_id("https://pokeapi.co/api/v2/pokemon/"), None);
        assert_eq!(parse_resource_id(""), None);
    }

    #[test]
    fn with_category_does_not_duplicate() {
        let e = Entity::from_resource("charmander", "https://pokeapi.co/api/v2/pokemon/4/")
            .unwrap()
            .with_category("fire")
            .with_category("fire");
        assert_eq!(e.categories, vec!["fire".to_string()]);
        assert_eq!(e.number(), "#004");
    }
}

//! Wire shapes of the PokeAPI responses.
//!
//! These mirror the JSON documents one-to-one and are converted into domain
//! types before leaving the `api` module. Fields the explorer never reads are
//! not declared; serde ignores them.

use crate::domain::{Ability, Entity, EntityDetails, Page, Stat};
use serde::Deserialize;

/// A `{name, url}` reference to another resource.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

/// Response of `GET /pokemon?offset&limit`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse {
    pub count: u32,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<NamedResource>,
}

/// Response of `GET /type/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeResponse {
    pub name: String,
    #[serde(default)]
    pub pokemon: Vec<TypeMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeMember {
    pub pokemon: NamedResource,
    #[serde(default)]
    pub slot: u32,
}

/// Response of `GET /pokemon/{id|name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DetailsResponse {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub sprites: Sprites,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    #[serde(default)]
    pub stats: Vec<StatEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sprites {
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: OtherSprites,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Artwork,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Artwork {
    pub front_default: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeSlot {
    pub slot: u32,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub slot: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatEntry {
    pub base_stat: u32,
    #[serde(default)]
    pub effort: u32,
    pub stat: NamedResource,
}

/// Converts resource references to entity summaries, dropping the ones whose
/// URL carries no numeric id.
pub(crate) fn summaries<'a, I>(resources: I) -> Vec<Entity>
where
    I: IntoIterator<Item = &'a NamedResource>,
{
    resources
        .into_iter()
        .filter_map(|r| {
            let entity = Entity::from_resource(&r.name, &r.url);
            if entity.is_none() {
                tracing::warn!(name = %r.name, url = %r.url, "skipping resource without numeric id");
            }
            entity
        })
        .collect()
}

impl From<ListResponse> for Page<Entity> {
    fn from(response: ListResponse) -> Self {
        Self {
            count: response.count,
            results: summaries(&response.results),
            next: response.next,
            previous: response.previous,
        }
    }
}

impl TypeResponse {
    /// Members of the type as summaries tagged with the type name, in the
    /// order the API lists them.
    #[must_use]
    pub fn into_entities(self) -> Vec<Entity> {
        let category = self.name;
        summaries(self.pokemon.iter().map(|m| &m.pokemon))
            .into_iter()
            .map(|e| e.with_category(&category))
            .collect()
    }
}

impl From<DetailsResponse> for EntityDetails {
    fn from(response: DetailsResponse) -> Self {
        let mut types = response.types;
        types.sort_by_key(|t| t.slot);

        Self {
            id: response.id,
            name: response.name,
            sprite_url: response.sprites.front_default,
            artwork_url: response.sprites.other.official_artwork.front_default,
            categories: types.into_iter().map(|t| t.kind.name).collect(),
            height: response.height,
            weight: response.weight,
            abilities: response
                .abilities
                .into_iter()
                .map(|a| Ability {
                    name: a.ability.name,
                    hidden: a.is_hidden,
                    slot: a.slot,
                })
                .collect(),
            stats: response
                .stats
                .into_iter()
                .map(|s| Stat {
                    name: s.stat.name,
                    base: s.base_stat,
                    effort: s.effort,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_response_converts_to_page() {
        let json = r#"{
            "count": 1302,
            "next": "https://pokeapi.co/api/v2/pokemon?offset=20&limit=20",
            "previous": null,
            "results": [
                {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/"},
                {"name": "broken", "url": "https://pokeapi.co/api/v2/pokemon/"}
            ]
        }"#;
        let response: ListResponse = serde_json::from_str(json).unwrap();
        let page: Page<Entity> = response.into();

        assert_eq!(page.count, 1302);
        assert!(page.previous.is_none());
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].id, 1);
    }

    #[test]
    fn type_response_tags_members() {
        let json = r#"{
            "name": "fire",
            "pokemon": [
                {"pokemon": {"name": "charmander", "url": "https://pokeapi.co/api/v2/pokemon/4/"}, "slot": 1},
                {"pokemon": {"name": "vulpix", "url": "https://pokeapi.co/api/v2/pokemon/37/"}, "slot": 1}
            ]
        }"#;
        let response: TypeResponse = serde_json::from_str(json).unwrap();
        let entities = response.into_entities();

        assert_eq!(entities.len(), 2);
        assert!(entities.iter().all(|e| e.categories == vec!["fire".to_string()]));
    }

    #[test]
    fn details_response_orders_types_by_slot() {
        let json = r#"{
            "id": 6,
            "name": "charizard",
            "height": 17,
            "weight": 905,
            "sprites": {
                "front_default": "https://example.test/6.png",
                "other": {"official-artwork": {"front_default": "https://example.test/art/6.png"}}
            },
            "types": [
                {"slot": 2, "type": {"name": "flying", "url": "https://pokeapi.co/api/v2/type/3/"}},
                {"slot": 1, "type": {"name": "fire", "url": "https://pokeapi.co/api/v2/type/10/"}}
            ],
            "abilities": [
                {"ability": {"name": "blaze", "url": "u"}, "is_hidden": false, "slot": 1},
                {"ability": {"name": "solar-power", "url": "u"}, "is_hidden": true, "slot": 3}
            ],
            "stats": [
                {"base_stat": 78, "effort": 0, "stat": {"name": "hp", "url": "u"}}
            ]
        }"#;
        let response: DetailsResponse = serde_json::from_str(json).unwrap();
        let details = EntityDetails::from(response);

        assert_eq!(details.categories, vec!["fire".to_string(), "flying".to_string()]);
        assert_eq!(details.artwork_url.as_deref(), Some("https://example.test/art/6.png"));
        assert!(details.abilities[1].hidden);
        assert_eq!(details.stats[0].base, 78);
    }
}

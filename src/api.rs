use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::task::{JoinError, JoinSet};

use crate::error::ApiError;
use crate::state::{
    AbilityDetail, CatalogEntry, LocalizedText, MoveDetail, MoveRef, NamedRef, PokemonRecord,
    SpeciesRecord, TypeRelations, Variety, VersionGroupDetail,
};

pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_CATALOG_LIMIT: u16 = 1025;

const ARTWORK_POINTER: &str = "/other/official-artwork/front_default";

#[derive(Clone, Debug, Deserialize)]
struct CatalogResponse {
    results: Vec<NamedRef>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    name: String,
    sprites: serde_json::Value,
    types: Vec<PokemonTypeSlot>,
    abilities: Vec<PokemonAbilitySlot>,
    moves: Vec<PokemonMoveSlot>,
    species: NamedRef,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    #[serde(rename = "type")]
    type_info: NamedRef,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonAbilitySlot {
    ability: NamedRef,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonMoveSlot {
    #[serde(rename = "move")]
    move_info: NamedRef,
    version_group_details: Vec<VersionGroupDetailResponse>,
}

#[derive(Clone, Debug, Deserialize)]
struct VersionGroupDetailResponse {
    #[serde(default)]
    level_learned_at: u16,
    move_learn_method: NamedRef,
    version_group: NamedRef,
}

#[derive(Clone, Debug, Deserialize)]
struct SpeciesResponse {
    name: String,
    flavor_text_entries: Vec<FlavorTextEntry>,
    varieties: Vec<VarietyResponse>,
}

#[derive(Clone, Debug, Deserialize)]
struct FlavorTextEntry {
    flavor_text: String,
    language: NamedRef,
}

#[derive(Clone, Debug, Deserialize)]
struct VarietyResponse {
    is_default: bool,
    pokemon: NamedRef,
}

#[derive(Clone, Debug, Deserialize)]
struct AbilityResponse {
    name: String,
    effect_entries: Vec<EffectEntry>,
}

#[derive(Clone, Debug, Deserialize)]
struct EffectEntry {
    effect: String,
    language: NamedRef,
}

#[derive(Clone, Debug, Deserialize)]
struct TypeResponse {
    name: String,
    damage_relations: DamageRelations,
}

#[derive(Clone, Debug, Deserialize)]
struct DamageRelations {
    double_damage_from: Vec<NamedRef>,
    double_damage_to: Vec<NamedRef>,
    half_damage_from: Vec<NamedRef>,
    half_damage_to: Vec<NamedRef>,
    no_damage_from: Vec<NamedRef>,
    no_damage_to: Vec<NamedRef>,
}

#[derive(Clone, Debug, Deserialize)]
struct MoveResponse {
    name: String,
}

/// Cloneable PokeAPI handle. Every url except the catalog one comes from a
/// previous response.
#[derive(Clone, Debug)]
pub struct PokeApi {
    client: reqwest::Client,
    base: String,
    catalog_limit: u16,
}

impl Default for PokeApi {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE, DEFAULT_CATALOG_LIMIT)
    }
}

impl PokeApi {
    pub fn new(base: impl Into<String>, catalog_limit: u16) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.into(),
            catalog_limit,
        }
    }

    pub fn catalog_url(&self) -> String {
        format!(
            "{}/pokemon?limit={}",
            self.base.trim_end_matches('/'),
            self.catalog_limit
        )
    }

    pub async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, ApiError> {
        let url = self.catalog_url();
        let bytes = self.fetch_bytes(&url).await?;
        parse_catalog(&url, &bytes)
    }

    pub async fn fetch_pokemon(&self, url: &str) -> Result<PokemonRecord, ApiError> {
        let bytes = self.fetch_bytes(url).await?;
        parse_pokemon(url, &bytes)
    }

    pub async fn fetch_species(&self, url: &str) -> Result<SpeciesRecord, ApiError> {
        let bytes = self.fetch_bytes(url).await?;
        parse_species(url, &bytes)
    }

    pub async fn fetch_ability(&self, url: &str) -> Result<AbilityDetail, ApiError> {
        let bytes = self.fetch_bytes(url).await?;
        parse_ability(url, &bytes)
    }

    pub async fn fetch_type(&self, url: &str) -> Result<TypeRelations, ApiError> {
        let bytes = self.fetch_bytes(url).await?;
        parse_type(url, &bytes)
    }

    pub async fn fetch_move(&self, url: &str) -> Result<MoveDetail, ApiError> {
        let bytes = self.fetch_bytes(url).await?;
        parse_move(url, &bytes)
    }

    /// Ability details in the order of `refs`; failed fetches are left out.
    pub async fn fetch_abilities(&self, refs: Vec<NamedRef>) -> Vec<AbilityDetail> {
        let api = self.clone();
        settle_ordered(refs, move |ability| {
            let api = api.clone();
            async move { api.fetch_ability(&ability.url).await }
        })
        .await
        .into_iter()
        .flatten()
        .collect()
    }

    /// Move details in the order of `refs`; failed fetches are left out.
    pub async fn fetch_moves(&self, refs: Vec<NamedRef>) -> Vec<MoveDetail> {
        let api = self.clone();
        settle_ordered(refs, move |move_ref| {
            let api = api.clone();
            async move { api.fetch_move(&move_ref.url).await }
        })
        .await
        .into_iter()
        .flatten()
        .collect()
    }

    /// Every type's relations, or the first error.
    pub async fn fetch_type_relations(
        &self,
        refs: Vec<NamedRef>,
    ) -> Result<Vec<TypeRelations>, ApiError> {
        let api = self.clone();
        join_all(refs, move |type_ref| {
            let api = api.clone();
            async move { api.fetch_type(&type_ref.url).await }
        })
        .await
    }

    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        tracing::debug!(url, "GET");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Runs one task per input and waits for all of them. Each result lands in
/// the slot of its input, so the output order never depends on completion
/// order. Failed slots stay `None`.
pub async fn settle_ordered<I, T, E, F, Fut>(inputs: Vec<I>, task: F) -> Vec<Option<T>>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let mut slots: Vec<Option<T>> = inputs.iter().map(|_| None).collect();
    let mut join_set = JoinSet::new();
    for (index, input) in inputs.into_iter().enumerate() {
        let fut = task(input);
        join_set.spawn(async move { (index, fut.await) });
    }

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, Ok(value))) => slots[index] = Some(value),
            Ok((index, Err(error))) => {
                tracing::warn!(slot = index, %error, "fetch failed, entry omitted");
            }
            Err(error) => tracing::warn!(%error, "fetch task did not finish"),
        }
    }
    slots
}

/// Barrier over one task per input: returns only once every task succeeded,
/// in input order, or with the first error. Dropping the set on error aborts
/// the tasks still running.
pub async fn join_all<I, T, E, F, Fut>(inputs: Vec<I>, task: F) -> Result<Vec<T>, E>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: From<JoinError> + Send + 'static,
{
    let mut slots: Vec<Option<T>> = inputs.iter().map(|_| None).collect();
    let mut join_set = JoinSet::new();
    for (index, input) in inputs.into_iter().enumerate() {
        let fut = task(input);
        join_set.spawn(async move { (index, fut.await) });
    }

    while let Some(joined) = join_set.join_next().await {
        let (index, result) = joined?;
        slots[index] = Some(result?);
    }
    Ok(slots.into_iter().flatten().collect())
}

fn decode<T: DeserializeOwned>(url: &str, bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

pub fn parse_catalog(url: &str, bytes: &[u8]) -> Result<Vec<CatalogEntry>, ApiError> {
    let response: CatalogResponse = decode(url, bytes)?;
    Ok(response
        .results
        .into_iter()
        .map(|entry| CatalogEntry {
            name: entry.name,
            url: entry.url,
        })
        .collect())
}

pub fn parse_pokemon(url: &str, bytes: &[u8]) -> Result<PokemonRecord, ApiError> {
    let response: PokemonResponse = decode(url, bytes)?;
    let sprite_url = response
        .sprites
        .pointer(ARTWORK_POINTER)
        .and_then(|value| value.as_str())
        .map(|value| value.to_string());
    let moves = response
        .moves
        .into_iter()
        .map(|slot| MoveRef {
            move_ref: slot.move_info,
            version_group_details: slot
                .version_group_details
                .into_iter()
                .map(|detail| VersionGroupDetail {
                    learn_method: detail.move_learn_method.name,
                    version_group: detail.version_group.name,
                    level_learned_at: detail.level_learned_at,
                })
                .collect(),
        })
        .collect();

    Ok(PokemonRecord {
        url: url.to_string(),
        name: response.name,
        sprite_url,
        types: response
            .types
            .into_iter()
            .map(|slot| slot.type_info)
            .collect(),
        abilities: response
            .abilities
            .into_iter()
            .map(|slot| slot.ability)
            .collect(),
        moves,
        species_url: response.species.url,
    })
}

pub fn parse_species(url: &str, bytes: &[u8]) -> Result<SpeciesRecord, ApiError> {
    let response: SpeciesResponse = decode(url, bytes)?;
    Ok(SpeciesRecord {
        url: url.to_string(),
        name: response.name,
        flavor_text_entries: response
            .flavor_text_entries
            .into_iter()
            .map(|entry| LocalizedText {
                text: entry.flavor_text,
                language: entry.language.name,
            })
            .collect(),
        varieties: response
            .varieties
            .into_iter()
            .map(|variety| Variety {
                is_default: variety.is_default,
                pokemon: variety.pokemon,
            })
            .collect(),
    })
}

pub fn parse_ability(url: &str, bytes: &[u8]) -> Result<AbilityDetail, ApiError> {
    let response: AbilityResponse = decode(url, bytes)?;
    Ok(AbilityDetail {
        url: url.to_string(),
        name: response.name,
        effect_entries: response
            .effect_entries
            .into_iter()
            .map(|entry| LocalizedText {
                text: entry.effect,
                language: entry.language.name,
            })
            .collect(),
    })
}

pub fn parse_type(url: &str, bytes: &[u8]) -> Result<TypeRelations, ApiError> {
    let response: TypeResponse = decode(url, bytes)?;
    let relations = response.damage_relations;
    Ok(TypeRelations {
        url: url.to_string(),
        name: response.name,
        double_damage_from: names(relations.double_damage_from),
        double_damage_to: names(relations.double_damage_to),
        half_damage_from: names(relations.half_damage_from),
        half_damage_to: names(relations.half_damage_to),
        no_damage_from: names(relations.no_damage_from),
        no_damage_to: names(relations.no_damage_to),
    })
}

pub fn parse_move(url: &str, bytes: &[u8]) -> Result<MoveDetail, ApiError> {
    let response: MoveResponse = decode(url, bytes)?;
    Ok(MoveDetail {
        url: url.to_string(),
        name: response.name,
    })
}

fn names(refs: Vec<NamedRef>) -> Vec<String> {
    refs.into_iter().map(|entry| entry.name).collect()
}

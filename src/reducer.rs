use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::effect::Effect;
use crate::state::{AppState, ContentMode, NamedRef, PokemonRecord, SelectedPokemon, SpeciesRecord};
use crate::view;

pub const SCROLL_PAGE: i16 = 10;

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.catalog_loading = true;
            DispatchResult::changed_with(Effect::LoadCatalog)
        }

        Action::CatalogDidLoad(entries) => {
            tracing::info!(count = entries.len(), "catalog loaded");
            state.catalog = entries;
            state.catalog_loading = false;
            state.selected_index = 0;
            state.rebuild_filtered();
            DispatchResult::changed()
        }

        Action::CatalogDidError(error) => {
            tracing::warn!(%error, "catalog fetch failed");
            state.catalog_loading = false;
            DispatchResult::changed()
        }

        Action::DexSelect(index) => {
            let moved = state.set_selected_index(index);
            let Some(url) = state.selected_entry().map(|entry| entry.url.clone()) else {
                return changed_if(moved);
            };
            let result = select(state, url);
            if moved && !result.changed {
                return DispatchResult::changed();
            }
            result
        }

        Action::SearchStart => {
            if state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = true;
            DispatchResult::changed()
        }

        Action::SearchCancel => {
            if !state.search.active && state.search.query.is_empty() {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            state.search.query.clear();
            state.rebuild_filtered();
            DispatchResult::changed()
        }

        Action::SearchSubmit => {
            if !state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            DispatchResult::changed()
        }

        Action::SearchInput(ch) => {
            state.search.query.push(ch);
            state.rebuild_filtered();
            DispatchResult::changed()
        }

        Action::SearchBackspace => {
            if state.search.query.pop().is_none() {
                return DispatchResult::unchanged();
            }
            state.rebuild_filtered();
            DispatchResult::changed()
        }

        Action::PokemonDidLoad { version, record } => {
            let url = record.url.clone();
            state.records.insert(url.clone(), record.clone());
            let requested = state.selection.requested.as_deref() == Some(url.as_str());
            if !state.selection.is_current(version) || !requested {
                tracing::debug!(version, url = %url, "dropping stale pokemon record");
                return DispatchResult::changed();
            }
            let effects = commit_record(state, record);
            DispatchResult::changed_with_many(effects)
        }

        Action::PokemonDidError {
            version,
            url,
            error,
        } => {
            tracing::warn!(version, url = %url, %error, "pokemon fetch failed");
            if !state.selection.is_current(version) {
                return DispatchResult::unchanged();
            }
            state.detail_loading = false;
            state.selection.requested = state.current_record().map(|record| record.url.clone());
            DispatchResult::changed_with_many(resume_species(state))
        }

        Action::SpeciesDidLoad { version, species } => {
            state.species.insert(species.url.clone(), species.clone());
            if !state.selection.is_current(version) {
                tracing::debug!(version, url = %species.url, "dropping stale species record");
                return DispatchResult::changed();
            }
            attach_species(state, species);
            DispatchResult::changed()
        }

        Action::SpeciesDidError {
            version,
            url,
            error,
        } => {
            tracing::warn!(version, url = %url, %error, "species fetch failed");
            if !state.selection.is_current(version) {
                return DispatchResult::unchanged();
            }
            state.detail_loading = false;
            DispatchResult::changed()
        }

        Action::SpriteDidLoad { url, sprite } => {
            if is_current_sprite(state, &url) {
                state.sprite_loading = false;
            }
            state.sprites.insert(url, sprite);
            DispatchResult::changed()
        }

        Action::SpriteDidError { url, error } => {
            tracing::warn!(url = %url, %error, "sprite fetch failed");
            if is_current_sprite(state, &url) {
                state.sprite_loading = false;
            }
            DispatchResult::changed()
        }

        Action::FormSelect(index) => {
            let Some(url) = state
                .current_species()
                .and_then(|species| species.varieties.get(index))
                .map(|variety| variety.pokemon.url.clone())
            else {
                return DispatchResult::unchanged();
            };
            select(state, url)
        }

        Action::ShowDescription => {
            if state.current_record().is_none() || state.content == ContentMode::Description {
                return DispatchResult::unchanged();
            }
            set_content(state, ContentMode::Description);
            DispatchResult::changed()
        }

        Action::ShowAbilities => {
            let Some(record) = state.current_record() else {
                return DispatchResult::unchanged();
            };
            let version = state.selection.version;
            let missing = missing_refs(record.abilities.iter(), |url| {
                state.abilities.contains_key(url)
            });
            set_content(state, ContentMode::Abilities);
            load_content(state, missing, |abilities| Effect::LoadAbilities {
                version,
                abilities,
            })
        }

        Action::ShowDamageRelations => {
            let Some(record) = state.current_record() else {
                return DispatchResult::unchanged();
            };
            let version = state.selection.version;
            let complete = record
                .types
                .iter()
                .all(|type_ref| state.type_relations.contains_key(&type_ref.url));
            // Relations resolve as one batch; a partial cache refetches every type.
            let types = if complete {
                Vec::new()
            } else {
                record.types.clone()
            };
            set_content(state, ContentMode::DamageRelations);
            load_content(state, types, |types| Effect::LoadTypeRelations { version, types })
        }

        Action::ShowMoves => {
            let Some(record) = state.current_record() else {
                return DispatchResult::unchanged();
            };
            let version = state.selection.version;
            let learnable = view::learnable_moves(&record.moves);
            let missing = missing_refs(learnable.iter().map(|move_ref| &move_ref.move_ref), |url| {
                state.moves.contains_key(url)
            });
            set_content(state, ContentMode::Moves);
            load_content(state, missing, |moves| Effect::LoadMoves { version, moves })
        }

        Action::AbilitiesDidLoad { version, abilities } => {
            for ability in abilities {
                state.abilities.insert(ability.url.clone(), ability);
            }
            finish_content(state, version, ContentMode::Abilities)
        }

        Action::TypeRelationsDidLoad { version, relations } => {
            for relation in relations {
                state.type_relations.insert(relation.url.clone(), relation);
            }
            finish_content(state, version, ContentMode::DamageRelations)
        }

        Action::TypeRelationsDidError { version, error } => {
            tracing::warn!(version, %error, "damage relations unavailable");
            finish_content(state, version, ContentMode::DamageRelations)
        }

        Action::MovesDidLoad { version, moves } => {
            for detail in moves {
                state.moves.insert(detail.url.clone(), detail);
            }
            finish_content(state, version, ContentMode::Moves)
        }

        Action::ContentScroll(delta) => {
            if state.current_record().is_none() {
                return DispatchResult::unchanged();
            }
            let last_line = view::content_line_count(state).saturating_sub(1);
            let max = u16::try_from(last_line).unwrap_or(u16::MAX);
            let next = state.content_scroll.saturating_add_signed(delta).min(max);
            if next == state.content_scroll {
                return DispatchResult::unchanged();
            }
            state.content_scroll = next;
            DispatchResult::changed()
        }

        Action::FocusNext => {
            if state.search.active {
                return DispatchResult::unchanged();
            }
            state.focus_next();
            DispatchResult::changed()
        }

        Action::FocusPrev => {
            if state.search.active {
                return DispatchResult::unchanged();
            }
            state.focus_prev();
            DispatchResult::changed()
        }

        Action::Reload => {
            tracing::info!("reloading");
            state.reset();
            state.selection.version += 1;
            state.catalog_loading = true;
            DispatchResult::changed_with(Effect::LoadCatalog)
        }

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Tick => {
            if !state.is_loading() {
                return DispatchResult::unchanged();
            }
            state.tick = state.tick.wrapping_add(1);
            DispatchResult::changed()
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

/// Makes `url` the requested selection. Re-selecting the requested url is a
/// no-op; anything else supersedes every fetch still in flight.
fn select(state: &mut AppState, url: String) -> DispatchResult<Effect> {
    if state.selection.requested.as_deref() == Some(url.as_str()) {
        return DispatchResult::unchanged();
    }
    state.selection.version += 1;
    state.selection.requested = Some(url.clone());
    state.detail_loading = true;

    if let Some(record) = state.records.get(&url).cloned() {
        return DispatchResult::changed_with_many(commit_record(state, record));
    }
    DispatchResult::changed_with(Effect::LoadPokemon {
        version: state.selection.version,
        url,
    })
}

fn commit_record(state: &mut AppState, record: PokemonRecord) -> Vec<Effect> {
    let version = state.selection.version;
    let species_url = record.species_url.clone();
    let sprite_url = record.sprite_url.clone();
    state.selection.current = Some(SelectedPokemon {
        record,
        species: None,
    });
    set_content(state, ContentMode::Description);

    let mut effects = Vec::new();
    state.sprite_loading = false;
    if state.config.sprites {
        if let Some(url) = sprite_url.filter(|url| !state.sprites.contains_key(url)) {
            state.sprite_loading = true;
            effects.push(Effect::LoadSprite { url });
        }
    }

    match state.species.get(&species_url).cloned() {
        Some(species) => attach_species(state, species),
        None => effects.push(Effect::LoadSpecies {
            version,
            url: species_url,
        }),
    }
    effects
}

fn attach_species(state: &mut AppState, species: SpeciesRecord) {
    let Some(current) = state.selection.current.as_mut() else {
        return;
    };
    if current.record.species_url != species.url {
        tracing::debug!(url = %species.url, "species does not belong to the loaded record");
        return;
    }
    current.species = Some(species);
    state.detail_loading = false;
    state.controls_visible = true;
}

/// After a failed navigation the loaded record stays on screen under a newer
/// version, so its species is attached from the table or fetched again.
fn resume_species(state: &mut AppState) -> Vec<Effect> {
    let Some(current) = state.selection.current.as_ref() else {
        return Vec::new();
    };
    if current.species.is_some() {
        return Vec::new();
    }
    let species_url = current.record.species_url.clone();
    match state.species.get(&species_url).cloned() {
        Some(species) => {
            attach_species(state, species);
            Vec::new()
        }
        None => {
            state.detail_loading = true;
            vec![Effect::LoadSpecies {
                version: state.selection.version,
                url: species_url,
            }]
        }
    }
}

fn is_current_sprite(state: &AppState, url: &str) -> bool {
    state
        .current_record()
        .and_then(|record| record.sprite_url.as_deref())
        == Some(url)
}

fn set_content(state: &mut AppState, mode: ContentMode) {
    state.content = mode;
    state.content_loading = false;
    state.content_scroll = 0;
}

fn missing_refs<'a>(
    refs: impl Iterator<Item = &'a NamedRef>,
    cached: impl Fn(&str) -> bool,
) -> Vec<NamedRef> {
    refs.filter(|named| !cached(&named.url)).cloned().collect()
}

fn load_content(
    state: &mut AppState,
    missing: Vec<NamedRef>,
    effect: impl FnOnce(Vec<NamedRef>) -> Effect,
) -> DispatchResult<Effect> {
    if missing.is_empty() {
        return DispatchResult::changed();
    }
    state.content_loading = true;
    DispatchResult::changed_with(effect(missing))
}

fn finish_content(state: &mut AppState, version: u64, mode: ContentMode) -> DispatchResult<Effect> {
    if !state.selection.is_current(version) || state.content != mode {
        tracing::debug!(version, ?mode, "content result no longer displayed");
        return DispatchResult::changed();
    }
    state.content_loading = false;
    DispatchResult::changed()
}

fn changed_if(changed: bool) -> DispatchResult<Effect> {
    if changed {
        DispatchResult::changed()
    } else {
        DispatchResult::unchanged()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        AbilityDetail, CatalogEntry, FocusArea, LocalizedText, MoveDetail, MoveRef, TypeRelations,
        Variety, VersionGroupDetail,
    };
    use pretty_assertions::assert_eq;

    const BULBASAUR: &str = "https://pokeapi.co/api/v2/pokemon/1/";
    const IVYSAUR: &str = "https://pokeapi.co/api/v2/pokemon/2/";

    fn record(name: &str, url: &str) -> PokemonRecord {
        PokemonRecord {
            url: url.to_string(),
            name: name.to_string(),
            sprite_url: None,
            types: vec![
                NamedRef::new("grass", "t/12"),
                NamedRef::new("poison", "t/4"),
            ],
            abilities: vec![
                NamedRef::new("overgrow", "a/65"),
                NamedRef::new("chlorophyll", "a/34"),
            ],
            moves: vec![MoveRef {
                move_ref: NamedRef::new("vine-whip", "m/22"),
                version_group_details: vec![VersionGroupDetail {
                    learn_method: "level-up".to_string(),
                    version_group: "red-blue".to_string(),
                    level_learned_at: 7,
                }],
            }],
            species_url: format!("s/{name}"),
        }
    }

    fn species(name: &str) -> SpeciesRecord {
        SpeciesRecord {
            url: format!("s/{name}"),
            name: name.to_string(),
            flavor_text_entries: vec![LocalizedText {
                text: "A strange seed".to_string(),
                language: "en".to_string(),
            }],
            varieties: vec![Variety {
                is_default: true,
                pokemon: NamedRef::new(name, BULBASAUR),
            }],
        }
    }

    fn catalog_state() -> AppState {
        let mut state = AppState::default();
        reducer(
            &mut state,
            Action::CatalogDidLoad(vec![
                CatalogEntry {
                    name: "bulbasaur".to_string(),
                    url: BULBASAUR.to_string(),
                },
                CatalogEntry {
                    name: "ivysaur".to_string(),
                    url: IVYSAUR.to_string(),
                },
            ]),
        );
        state
    }

    fn loaded_state() -> AppState {
        let mut state = catalog_state();
        reducer(&mut state, Action::DexSelect(0));
        let version = state.selection.version;
        reducer(
            &mut state,
            Action::PokemonDidLoad {
                version,
                record: record("bulbasaur", BULBASAUR),
            },
        );
        reducer(
            &mut state,
            Action::SpeciesDidLoad {
                version,
                species: species("bulbasaur"),
            },
        );
        state
    }

    #[test]
    fn init_requests_catalog() {
        let mut state = AppState::default();
        let result = reducer(&mut state, Action::Init);
        assert!(state.catalog_loading);
        assert_eq!(result.effects, vec![Effect::LoadCatalog]);
    }

    #[test]
    fn catalog_error_leaves_catalog_empty() {
        let mut state = AppState::default();
        reducer(&mut state, Action::Init);
        let result = reducer(&mut state, Action::CatalogDidError("offline".to_string()));
        assert!(result.changed);
        assert!(state.catalog.is_empty());
        assert!(!state.catalog_loading);
    }

    #[test]
    fn select_bumps_version_and_requests_record() {
        let mut state = catalog_state();
        let result = reducer(&mut state, Action::DexSelect(1));
        assert_eq!(state.selection.version, 1);
        assert_eq!(state.selection.requested.as_deref(), Some(IVYSAUR));
        assert!(state.detail_loading);
        assert_eq!(
            result.effects,
            vec![Effect::LoadPokemon {
                version: 1,
                url: IVYSAUR.to_string()
            }]
        );
    }

    #[test]
    fn reselecting_requested_entry_is_noop() {
        let mut state = catalog_state();
        reducer(&mut state, Action::DexSelect(0));
        let result = reducer(&mut state, Action::DexSelect(0));
        assert!(!result.changed);
        assert!(result.effects.is_empty());
        assert_eq!(state.selection.version, 1);
    }

    #[test]
    fn record_commit_requests_species_then_species_shows_controls() {
        let mut state = catalog_state();
        reducer(&mut state, Action::DexSelect(0));
        let result = reducer(
            &mut state,
            Action::PokemonDidLoad {
                version: 1,
                record: record("bulbasaur", BULBASAUR),
            },
        );
        assert_eq!(
            result.effects,
            vec![Effect::LoadSpecies {
                version: 1,
                url: "s/bulbasaur".to_string()
            }]
        );
        assert!(!state.controls_visible);
        assert_eq!(state.current_record().map(|r| r.name.as_str()), Some("bulbasaur"));

        reducer(
            &mut state,
            Action::SpeciesDidLoad {
                version: 1,
                species: species("bulbasaur"),
            },
        );
        assert!(state.controls_visible);
        assert!(!state.detail_loading);
        assert!(state.current_species().is_some());
    }

    #[test]
    fn stale_record_is_cached_but_not_committed() {
        let mut state = catalog_state();
        reducer(&mut state, Action::DexSelect(0));
        reducer(&mut state, Action::DexSelect(1));
        let result = reducer(
            &mut state,
            Action::PokemonDidLoad {
                version: 1,
                record: record("bulbasaur", BULBASAUR),
            },
        );
        assert!(result.effects.is_empty());
        assert!(state.current_record().is_none());
        assert!(state.records.contains_key(BULBASAUR));
        assert!(state.detail_loading);
    }

    #[test]
    fn cached_record_commits_without_fetch() {
        let mut state = loaded_state();
        reducer(&mut state, Action::DexSelect(1));
        let result = reducer(&mut state, Action::DexSelect(0));
        assert!(result.effects.is_empty());
        assert_eq!(state.selection.version, 3);
        assert_eq!(state.current_record().map(|r| r.url.as_str()), Some(BULBASAUR));
        assert!(state.current_species().is_some());
        assert!(!state.detail_loading);
    }

    #[test]
    fn stale_species_is_dropped() {
        let mut state = catalog_state();
        reducer(&mut state, Action::DexSelect(0));
        reducer(
            &mut state,
            Action::PokemonDidLoad {
                version: 1,
                record: record("bulbasaur", BULBASAUR),
            },
        );
        reducer(&mut state, Action::DexSelect(1));
        reducer(
            &mut state,
            Action::SpeciesDidLoad {
                version: 1,
                species: species("bulbasaur"),
            },
        );
        assert!(state.current_species().is_none());
        assert!(!state.controls_visible);
        assert!(state.species.contains_key("s/bulbasaur"));
    }

    #[test]
    fn pokemon_error_allows_retry() {
        let mut state = catalog_state();
        reducer(&mut state, Action::DexSelect(1));
        reducer(
            &mut state,
            Action::PokemonDidError {
                version: 1,
                url: IVYSAUR.to_string(),
                error: "timeout".to_string(),
            },
        );
        assert!(!state.detail_loading);
        assert_eq!(state.selection.requested, None);
        let result = reducer(&mut state, Action::DexSelect(1));
        assert_eq!(result.effects.len(), 1);
    }

    #[test]
    fn categories_are_ignored_without_selection() {
        let mut state = catalog_state();
        for action in [
            Action::ShowAbilities,
            Action::ShowDamageRelations,
            Action::ShowMoves,
            Action::ShowDescription,
        ] {
            let result = reducer(&mut state, action);
            assert!(!result.changed);
            assert!(result.effects.is_empty());
        }
    }

    #[test]
    fn abilities_fetch_only_missing_refs() {
        let mut state = loaded_state();
        state.abilities.insert(
            "a/65".to_string(),
            AbilityDetail {
                url: "a/65".to_string(),
                name: "overgrow".to_string(),
                effect_entries: Vec::new(),
            },
        );
        let result = reducer(&mut state, Action::ShowAbilities);
        assert!(state.content_loading);
        assert_eq!(
            result.effects,
            vec![Effect::LoadAbilities {
                version: 1,
                abilities: vec![NamedRef::new("chlorophyll", "a/34")],
            }]
        );
    }

    #[test]
    fn damage_relations_refetch_every_type_when_one_is_missing() {
        let mut state = loaded_state();
        state.type_relations.insert(
            "t/12".to_string(),
            TypeRelations {
                url: "t/12".to_string(),
                name: "grass".to_string(),
                ..TypeRelations::default()
            },
        );
        let result = reducer(&mut state, Action::ShowDamageRelations);
        let Some(Effect::LoadTypeRelations { types, .. }) = result.effects.first() else {
            panic!("expected type relations effect");
        };
        assert_eq!(types.len(), 2);
    }

    #[test]
    fn moves_request_only_learnable_moves() {
        let mut state = loaded_state();
        if let Some(current) = state.selection.current.as_mut() {
            current.record.moves.push(MoveRef {
                move_ref: NamedRef::new("string-shot", "m/81"),
                version_group_details: vec![VersionGroupDetail {
                    learn_method: "tutor".to_string(),
                    version_group: "crystal".to_string(),
                    level_learned_at: 0,
                }],
            });
        }
        let result = reducer(&mut state, Action::ShowMoves);
        assert_eq!(
            result.effects,
            vec![Effect::LoadMoves {
                version: 1,
                moves: vec![NamedRef::new("vine-whip", "m/22")],
            }]
        );
    }

    #[test]
    fn content_result_for_other_selection_keeps_loading_flag_of_current() {
        let mut state = loaded_state();
        reducer(&mut state, Action::ShowMoves);
        reducer(
            &mut state,
            Action::MovesDidLoad {
                version: 0,
                moves: vec![MoveDetail {
                    url: "m/22".to_string(),
                    name: "vine-whip".to_string(),
                }],
            },
        );
        assert!(state.content_loading);
        assert!(state.moves.contains_key("m/22"));

        reducer(
            &mut state,
            Action::MovesDidLoad {
                version: 1,
                moves: Vec::new(),
            },
        );
        assert!(!state.content_loading);
    }

    #[test]
    fn damage_relations_error_clears_loading() {
        let mut state = loaded_state();
        reducer(&mut state, Action::ShowDamageRelations);
        reducer(
            &mut state,
            Action::TypeRelationsDidError {
                version: 1,
                error: "500".to_string(),
            },
        );
        assert!(!state.content_loading);
        assert_eq!(state.content, ContentMode::DamageRelations);
        assert!(view::relation_blocks(&state).is_empty());
    }

    #[test]
    fn form_select_switches_to_variety() {
        let mut state = loaded_state();
        if let Some(current) = state.selection.current.as_mut() {
            if let Some(species) = current.species.as_mut() {
                species.varieties.push(Variety {
                    is_default: false,
                    pokemon: NamedRef::new("bulbasaur-gmax", "p/10186"),
                });
            }
        }
        assert!(!reducer(&mut state, Action::FormSelect(0)).changed);
        let result = reducer(&mut state, Action::FormSelect(1));
        assert_eq!(
            result.effects,
            vec![Effect::LoadPokemon {
                version: 2,
                url: "p/10186".to_string()
            }]
        );
    }

    #[test]
    fn reload_resets_but_keeps_version_and_config() {
        let mut state = loaded_state();
        state.config.language = "fr".to_string();
        state.terminal_size = (120, 40);
        let result = reducer(&mut state, Action::Reload);
        assert_eq!(result.effects, vec![Effect::LoadCatalog]);
        assert!(state.catalog.is_empty());
        assert!(state.current_record().is_none());
        assert!(!state.controls_visible);
        assert!(state.records.is_empty());
        assert_eq!(state.selection.version, 2);
        assert_eq!(state.config.language, "fr");
        assert_eq!(state.terminal_size, (120, 40));

        let stale = reducer(
            &mut state,
            Action::SpeciesDidLoad {
                version: 1,
                species: species("bulbasaur"),
            },
        );
        assert!(stale.changed);
        assert!(state.current_species().is_none());
    }

    #[test]
    fn search_filters_without_selecting() {
        let mut state = catalog_state();
        reducer(&mut state, Action::SearchStart);
        reducer(&mut state, Action::SearchInput('I'));
        reducer(&mut state, Action::SearchInput('v'));
        assert_eq!(state.filtered_indices, vec![1]);
        assert!(state.selection.requested.is_none());
        reducer(&mut state, Action::SearchSubmit);
        assert!(!state.search.active);
        assert_eq!(state.search.query, "Iv");
        reducer(&mut state, Action::SearchCancel);
        assert_eq!(state.filtered_indices, vec![0, 1]);
    }

    fn relations_state() -> AppState {
        let mut state = loaded_state();
        for (name, url) in [("grass", "t/12"), ("poison", "t/4")] {
            state.type_relations.insert(
                url.to_string(),
                TypeRelations {
                    url: url.to_string(),
                    name: name.to_string(),
                    ..TypeRelations::default()
                },
            );
        }
        reducer(&mut state, Action::ShowDamageRelations);
        state
    }

    #[test]
    fn scroll_pages_and_clamps_at_top() {
        let mut state = relations_state();
        assert!(!reducer(&mut state, Action::ContentScroll(-1)).changed);
        reducer(&mut state, Action::ContentScroll(SCROLL_PAGE));
        assert_eq!(state.content_scroll, 10);
        reducer(&mut state, Action::ContentScroll(-1));
        assert_eq!(state.content_scroll, 9);
        reducer(&mut state, Action::ShowAbilities);
        assert_eq!(state.content_scroll, 0);
    }

    #[test]
    fn scroll_stops_at_last_content_line() {
        let mut state = relations_state();
        // two blocks of a title and six lines, one blank line between them
        assert_eq!(view::content_line_count(&state), 15);
        for _ in 0..5 {
            reducer(&mut state, Action::ContentScroll(SCROLL_PAGE));
        }
        assert_eq!(state.content_scroll, 14);
        assert!(!reducer(&mut state, Action::ContentScroll(1)).changed);
        reducer(&mut state, Action::ContentScroll(-1));
        assert_eq!(state.content_scroll, 13);

        reducer(&mut state, Action::ShowDescription);
        assert!(!reducer(&mut state, Action::ContentScroll(1)).changed);
        assert_eq!(state.content_scroll, 0);
    }

    #[test]
    fn failed_navigation_resumes_species_of_loaded_record() {
        let mut state = catalog_state();
        reducer(&mut state, Action::DexSelect(0));
        reducer(
            &mut state,
            Action::PokemonDidLoad {
                version: 1,
                record: record("bulbasaur", BULBASAUR),
            },
        );
        reducer(&mut state, Action::DexSelect(1));
        let result = reducer(
            &mut state,
            Action::PokemonDidError {
                version: 2,
                url: IVYSAUR.to_string(),
                error: "timeout".to_string(),
            },
        );
        assert_eq!(state.selection.requested.as_deref(), Some(BULBASAUR));
        assert_eq!(
            result.effects,
            vec![Effect::LoadSpecies {
                version: 2,
                url: "s/bulbasaur".to_string()
            }]
        );
        assert!(state.detail_loading);

        // the first species fetch is stale; the reissued one commits
        reducer(
            &mut state,
            Action::SpeciesDidLoad {
                version: 1,
                species: species("bulbasaur"),
            },
        );
        assert!(state.current_species().is_none());
        reducer(
            &mut state,
            Action::SpeciesDidLoad {
                version: 2,
                species: species("bulbasaur"),
            },
        );
        assert!(state.current_species().is_some());
        assert!(state.controls_visible);
        assert!(!state.detail_loading);
    }

    #[test]
    fn failed_navigation_attaches_species_already_in_table() {
        let mut state = catalog_state();
        reducer(&mut state, Action::DexSelect(0));
        reducer(
            &mut state,
            Action::PokemonDidLoad {
                version: 1,
                record: record("bulbasaur", BULBASAUR),
            },
        );
        reducer(&mut state, Action::DexSelect(1));
        reducer(
            &mut state,
            Action::SpeciesDidLoad {
                version: 1,
                species: species("bulbasaur"),
            },
        );
        assert!(state.current_species().is_none());

        let result = reducer(
            &mut state,
            Action::PokemonDidError {
                version: 2,
                url: IVYSAUR.to_string(),
                error: "timeout".to_string(),
            },
        );
        assert!(result.effects.is_empty());
        assert!(state.current_species().is_some());
        assert!(state.controls_visible);
        assert!(!state.detail_loading);
    }

    #[test]
    fn superseded_sprite_keeps_current_sprite_loading() {
        let mut state = catalog_state();
        state.config.sprites = true;
        reducer(&mut state, Action::DexSelect(0));
        let mut bulbasaur = record("bulbasaur", BULBASAUR);
        bulbasaur.sprite_url = Some("art/1.png".to_string());
        reducer(
            &mut state,
            Action::PokemonDidLoad {
                version: 1,
                record: bulbasaur,
            },
        );
        reducer(&mut state, Action::DexSelect(1));
        let mut ivysaur = record("ivysaur", IVYSAUR);
        ivysaur.sprite_url = Some("art/2.png".to_string());
        let result = reducer(
            &mut state,
            Action::PokemonDidLoad {
                version: 2,
                record: ivysaur,
            },
        );
        assert!(result
            .effects
            .contains(&Effect::LoadSprite {
                url: "art/2.png".to_string()
            }));
        assert!(state.sprite_loading);

        reducer(
            &mut state,
            Action::SpriteDidError {
                url: "art/1.png".to_string(),
                error: "404".to_string(),
            },
        );
        assert!(state.sprite_loading);
        reducer(
            &mut state,
            Action::SpriteDidError {
                url: "art/2.png".to_string(),
                error: "404".to_string(),
            },
        );
        assert!(!state.sprite_loading);
    }

    #[test]
    fn tick_only_changes_while_loading() {
        let mut state = AppState::default();
        assert!(!reducer(&mut state, Action::Tick).changed);
        state.catalog_loading = true;
        assert!(reducer(&mut state, Action::Tick).changed);
    }

    #[test]
    fn focus_cycles_and_is_locked_while_searching() {
        let mut state = AppState::default();
        reducer(&mut state, Action::FocusNext);
        assert_eq!(state.focus, FocusArea::Forms);
        reducer(&mut state, Action::FocusPrev);
        reducer(&mut state, Action::FocusPrev);
        assert_eq!(state.focus, FocusArea::Content);
        reducer(&mut state, Action::SearchStart);
        assert!(!reducer(&mut state, Action::FocusNext).changed);
    }
}

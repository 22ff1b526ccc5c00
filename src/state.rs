use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::sprite::SpriteData;

pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
}

/// A `{name, url}` link as PokeAPI returns it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
    pub url: String,
}

impl NamedRef {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VersionGroupDetail {
    pub learn_method: String,
    pub version_group: String,
    pub level_learned_at: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveRef {
    #[serde(rename = "move")]
    pub move_ref: NamedRef,
    pub version_group_details: Vec<VersionGroupDetail>,
}

/// Primary record for one pokemon or form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonRecord {
    pub url: String,
    pub name: String,
    pub sprite_url: Option<String>,
    pub types: Vec<NamedRef>,
    pub abilities: Vec<NamedRef>,
    pub moves: Vec<MoveRef>,
    pub species_url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub text: String,
    pub language: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variety {
    pub is_default: bool,
    pub pokemon: NamedRef,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub url: String,
    pub name: String,
    pub flavor_text_entries: Vec<LocalizedText>,
    pub varieties: Vec<Variety>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityDetail {
    pub url: String,
    pub name: String,
    pub effect_entries: Vec<LocalizedText>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeRelations {
    pub url: String,
    pub name: String,
    pub double_damage_from: Vec<String>,
    pub double_damage_to: Vec<String>,
    pub half_damage_from: Vec<String>,
    pub half_damage_to: Vec<String>,
    pub no_damage_from: Vec<String>,
    pub no_damage_to: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveDetail {
    pub url: String,
    pub name: String,
}

/// The loaded pokemon. The species half only ever belongs to `record`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectedPokemon {
    pub record: PokemonRecord,
    pub species: Option<SpeciesRecord>,
}

/// Single authoritative selection slot.
///
/// `version` grows on every selection and is never reset, so results of a
/// fetch issued for an older selection can be recognised and dropped.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub version: u64,
    pub requested: Option<String>,
    pub current: Option<SelectedPokemon>,
}

impl Selection {
    pub fn is_current(&self, version: u64) -> bool {
        self.version == version
    }

    pub fn record(&self) -> Option<&PokemonRecord> {
        self.current.as_ref().map(|selected| &selected.record)
    }

    pub fn species(&self) -> Option<&SpeciesRecord> {
        self.current
            .as_ref()
            .and_then(|selected| selected.species.as_ref())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentMode {
    #[default]
    Description,
    Abilities,
    DamageRelations,
    Moves,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusArea {
    #[default]
    DexList,
    Forms,
    Content,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    pub language: String,
    pub sprites: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            sprites: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub config: ViewerConfig,
    pub terminal_size: (u16, u16),
    pub focus: FocusArea,

    pub catalog: Vec<CatalogEntry>,
    pub filtered_indices: Vec<usize>,
    pub selected_index: usize,
    pub search: SearchState,

    pub selection: Selection,
    pub controls_visible: bool,
    pub content: ContentMode,
    pub content_loading: bool,
    pub content_scroll: u16,

    // Session lookup tables keyed by resource url.
    pub records: HashMap<String, PokemonRecord>,
    pub species: HashMap<String, SpeciesRecord>,
    pub abilities: HashMap<String, AbilityDetail>,
    pub type_relations: HashMap<String, TypeRelations>,
    pub moves: HashMap<String, MoveDetail>,
    pub sprites: HashMap<String, SpriteData>,

    pub catalog_loading: bool,
    pub detail_loading: bool,
    pub sprite_loading: bool,
    pub tick: u64,
}

impl AppState {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            terminal_size: (80, 24),
            focus: FocusArea::DexList,
            catalog: Vec::new(),
            filtered_indices: Vec::new(),
            selected_index: 0,
            search: SearchState::default(),
            selection: Selection::default(),
            controls_visible: false,
            content: ContentMode::Description,
            content_loading: false,
            content_scroll: 0,
            records: HashMap::new(),
            species: HashMap::new(),
            abilities: HashMap::new(),
            type_relations: HashMap::new(),
            moves: HashMap::new(),
            sprites: HashMap::new(),
            catalog_loading: false,
            detail_loading: false,
            sprite_loading: false,
            tick: 0,
        }
    }

    /// Back to the state right after startup. Configuration, terminal size
    /// and the selection version survive.
    pub fn reset(&mut self) {
        let config = std::mem::take(&mut self.config);
        let terminal_size = self.terminal_size;
        let version = self.selection.version;
        *self = Self::new(config);
        self.terminal_size = terminal_size;
        self.selection.version = version;
    }

    pub fn selected_entry(&self) -> Option<&CatalogEntry> {
        self.filtered_indices
            .get(self.selected_index)
            .and_then(|idx| self.catalog.get(*idx))
    }

    pub fn visible_entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.filtered_indices
            .iter()
            .filter_map(|idx| self.catalog.get(*idx))
    }

    pub fn set_selected_index(&mut self, index: usize) -> bool {
        if self.filtered_indices.is_empty() {
            self.selected_index = 0;
            return false;
        }
        let bounded = index.min(self.filtered_indices.len() - 1);
        if bounded != self.selected_index {
            self.selected_index = bounded;
            return true;
        }
        false
    }

    pub fn rebuild_filtered(&mut self) {
        self.filtered_indices = crate::view::filter_catalog(&self.catalog, &self.search.query);
        if self.selected_index >= self.filtered_indices.len() {
            self.selected_index = 0;
        }
    }

    pub fn current_record(&self) -> Option<&PokemonRecord> {
        self.selection.record()
    }

    pub fn current_species(&self) -> Option<&SpeciesRecord> {
        self.selection.species()
    }

    pub fn is_loading(&self) -> bool {
        self.catalog_loading || self.detail_loading || self.content_loading || self.sprite_loading
    }

    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            FocusArea::DexList => FocusArea::Forms,
            FocusArea::Forms => FocusArea::Content,
            FocusArea::Content => FocusArea::DexList,
        };
    }

    pub fn focus_prev(&mut self) {
        self.focus = match self.focus {
            FocusArea::DexList => FocusArea::Content,
            FocusArea::Forms => FocusArea::DexList,
            FocusArea::Content => FocusArea::Forms,
        };
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("Catalog")
                .entry("total", ron_string(&self.catalog.len()))
                .entry("filtered", ron_string(&self.filtered_indices.len()))
                .entry("cursor", ron_string(&self.selected_index))
                .entry("search", ron_string(&self.search.query))
                .entry("search_active", ron_string(&self.search.active)),
            DebugSection::new("Selection")
                .entry("version", ron_string(&self.selection.version))
                .entry("requested", ron_string(&self.selection.requested))
                .entry(
                    "loaded",
                    ron_string(&self.current_record().map(|record| record.name.clone())),
                )
                .entry("species", ron_string(&self.current_species().is_some()))
                .entry("content", ron_string(&self.content))
                .entry("controls", ron_string(&self.controls_visible))
                .entry("focus", ron_string(&self.focus)),
            DebugSection::new("Status")
                .entry("catalog_loading", ron_string(&self.catalog_loading))
                .entry("detail_loading", ron_string(&self.detail_loading))
                .entry("content_loading", ron_string(&self.content_loading))
                .entry("sprite_loading", ron_string(&self.sprite_loading))
                .entry("records", ron_string(&self.records.len()))
                .entry("language", ron_string(&self.config.language)),
        ]
    }
}

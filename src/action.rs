use serde::{Deserialize, Serialize};

use crate::sprite::SpriteData;
use crate::state::{
    AbilityDetail, CatalogEntry, MoveDetail, PokemonRecord, SpeciesRecord, TypeRelations,
};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,
    CatalogDidLoad(Vec<CatalogEntry>),
    CatalogDidError(String),

    DexSelect(usize),

    SearchStart,
    SearchCancel,
    SearchSubmit,
    SearchInput(char),
    SearchBackspace,

    PokemonDidLoad { version: u64, record: PokemonRecord },
    PokemonDidError { version: u64, url: String, error: String },
    SpeciesDidLoad { version: u64, species: SpeciesRecord },
    SpeciesDidError { version: u64, url: String, error: String },
    SpriteDidLoad { url: String, sprite: SpriteData },
    SpriteDidError { url: String, error: String },

    FormSelect(usize),

    ShowDescription,
    ShowAbilities,
    ShowDamageRelations,
    ShowMoves,
    AbilitiesDidLoad { version: u64, abilities: Vec<AbilityDetail> },
    TypeRelationsDidLoad { version: u64, relations: Vec<TypeRelations> },
    TypeRelationsDidError { version: u64, error: String },
    MovesDidLoad { version: u64, moves: Vec<MoveDetail> },

    ContentScroll(i16),

    FocusNext,
    FocusPrev,

    Reload,
    UiTerminalResize(u16, u16),
    Tick,
    Quit,
}

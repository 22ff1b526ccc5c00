use crate::state::NamedRef;

/// Side effects returned by the reducer. Everything tied to a selection
/// carries the selection version it was issued for.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadCatalog,
    LoadPokemon { version: u64, url: String },
    LoadSpecies { version: u64, url: String },
    LoadSprite { url: String },
    LoadAbilities { version: u64, abilities: Vec<NamedRef> },
    LoadTypeRelations { version: u64, types: Vec<NamedRef> },
    LoadMoves { version: u64, moves: Vec<NamedRef> },
}

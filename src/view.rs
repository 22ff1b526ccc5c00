//! Display derivation. Everything the renderer shows is computed here from
//! `AppState` on demand; nothing in this module is stored.

use crate::state::{
    AppState, CatalogEntry, ContentMode, LocalizedText, MoveRef, TypeRelations, Variety,
    VersionGroupDetail,
};

pub const NO_DESCRIPTION: &str = "No description available.";
pub const UNKNOWN_METHOD: &str = "Unknown";
pub const LEARN_METHODS: [&str; 2] = ["level-up", "machine"];

const DESCRIPTION_GLYPHS: [char; 2] = ['\u{25B2}', '\u{25BC}'];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeBadge {
    pub type_name: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormOption {
    pub label: String,
    pub url: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailView {
    pub name: String,
    pub sprite_url: Option<String>,
    pub types: Vec<TypeBadge>,
    pub forms: Vec<FormOption>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationBlock {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentView {
    Empty,
    Loading,
    Description(String),
    Lines(Vec<String>),
    Relations(Vec<RelationBlock>),
}

/// Indices into `catalog` whose name contains `query`, ignoring case.
pub fn filter_catalog(catalog: &[CatalogEntry], query: &str) -> Vec<usize> {
    let query = query.to_lowercase();
    catalog
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.name.to_lowercase().contains(&query))
        .map(|(idx, _)| idx)
        .collect()
}

/// Strips the up/down arrow glyphs some flavor texts carry.
pub fn sanitize_description(text: &str) -> String {
    text.chars()
        .filter(|ch| !DESCRIPTION_GLYPHS.contains(ch))
        .collect()
}

pub fn localized<'a>(entries: &'a [LocalizedText], language: &str) -> Option<&'a str> {
    entries
        .iter()
        .find(|entry| entry.language == language)
        .map(|entry| entry.text.as_str())
}

pub fn description(entries: &[LocalizedText], language: &str) -> String {
    sanitize_description(localized(entries, language).unwrap_or(NO_DESCRIPTION))
}

pub fn form_options(varieties: &[Variety], loaded_name: &str) -> Vec<FormOption> {
    varieties
        .iter()
        .map(|variety| FormOption {
            label: variety.pokemon.name.clone(),
            url: variety.pokemon.url.clone(),
            selected: variety.pokemon.name == loaded_name,
        })
        .collect()
}

pub fn type_badges(state: &AppState) -> Vec<TypeBadge> {
    let Some(record) = state.current_record() else {
        return Vec::new();
    };
    record
        .types
        .iter()
        .map(|type_ref| TypeBadge {
            type_name: type_ref.name.clone(),
            label: type_ref.name.to_uppercase(),
        })
        .collect()
}

pub fn detail_view(state: &AppState) -> Option<DetailView> {
    let record = state.current_record()?;
    let forms = state
        .current_species()
        .map(|species| form_options(&species.varieties, &record.name))
        .unwrap_or_default();
    Some(DetailView {
        name: record.name.to_uppercase(),
        sprite_url: record.sprite_url.clone(),
        types: type_badges(state),
        forms,
    })
}

pub fn is_learnable(move_ref: &MoveRef) -> bool {
    move_ref
        .version_group_details
        .iter()
        .any(|detail| LEARN_METHODS.contains(&detail.learn_method.as_str()))
}

pub fn learnable_moves(moves: &[MoveRef]) -> Vec<&MoveRef> {
    moves.iter().filter(|move_ref| is_learnable(move_ref)).collect()
}

/// First level-up or machine entry in scan order, formatted for display.
pub fn learn_method_label(details: &[VersionGroupDetail]) -> String {
    details
        .iter()
        .find(|detail| LEARN_METHODS.contains(&detail.learn_method.as_str()))
        .map(|detail| detail.learn_method.replacen('-', " ", 1).to_uppercase())
        .unwrap_or_else(|| UNKNOWN_METHOD.to_string())
}

pub fn relation_list(names: &[String]) -> String {
    if names.is_empty() {
        "None".to_string()
    } else {
        names.join(", ")
    }
}

pub fn relation_block(relations: &TypeRelations) -> RelationBlock {
    RelationBlock {
        title: relations.name.to_uppercase(),
        lines: vec![
            format!(
                "Double damage from: {}",
                relation_list(&relations.double_damage_from)
            ),
            format!(
                "Double damage to: {}",
                relation_list(&relations.double_damage_to)
            ),
            format!(
                "Half damage from: {}",
                relation_list(&relations.half_damage_from)
            ),
            format!("Half damage to: {}", relation_list(&relations.half_damage_to)),
            format!("No damage from: {}", relation_list(&relations.no_damage_from)),
            format!("No damage to: {}", relation_list(&relations.no_damage_to)),
        ],
    }
}

pub fn ability_lines(state: &AppState) -> Vec<String> {
    let Some(record) = state.current_record() else {
        return Vec::new();
    };
    record
        .abilities
        .iter()
        .filter_map(|ability_ref| {
            let detail = state.abilities.get(&ability_ref.url)?;
            let effect = localized(&detail.effect_entries, &state.config.language)
                .unwrap_or(NO_DESCRIPTION);
            Some(format!("{}: {}", ability_ref.name.to_uppercase(), effect))
        })
        .collect()
}

pub fn move_lines(state: &AppState) -> Vec<String> {
    let Some(record) = state.current_record() else {
        return Vec::new();
    };
    learnable_moves(&record.moves)
        .into_iter()
        .filter_map(|move_ref| {
            let detail = state.moves.get(&move_ref.move_ref.url)?;
            Some(format!(
                "{} - Method: {}",
                detail.name.to_uppercase(),
                learn_method_label(&move_ref.version_group_details)
            ))
        })
        .collect()
}

/// All blocks, or none when any type of the selection is missing.
pub fn relation_blocks(state: &AppState) -> Vec<RelationBlock> {
    let Some(record) = state.current_record() else {
        return Vec::new();
    };
    let relations: Option<Vec<&TypeRelations>> = record
        .types
        .iter()
        .map(|type_ref| state.type_relations.get(&type_ref.url))
        .collect();
    relations
        .map(|all| all.into_iter().map(relation_block).collect())
        .unwrap_or_default()
}

pub fn content_view(state: &AppState) -> ContentView {
    if state.current_record().is_none() {
        return ContentView::Empty;
    }
    if state.content_loading {
        return ContentView::Loading;
    }
    match state.content {
        ContentMode::Description => match state.current_species() {
            Some(species) => ContentView::Description(description(
                &species.flavor_text_entries,
                &state.config.language,
            )),
            None => ContentView::Empty,
        },
        ContentMode::Abilities => ContentView::Lines(ability_lines(state)),
        ContentMode::Moves => ContentView::Lines(move_lines(state)),
        ContentMode::DamageRelations => ContentView::Relations(relation_blocks(state)),
    }
}

/// Unwrapped line count of the content pane. A description is one paragraph.
pub fn content_line_count(state: &AppState) -> usize {
    match content_view(state) {
        ContentView::Empty => 0,
        ContentView::Loading | ContentView::Description(_) => 1,
        ContentView::Lines(lines) => lines.len(),
        ContentView::Relations(blocks) => blocks
            .iter()
            .map(|block| block.lines.len() + 1)
            .sum::<usize>()
            + blocks.len().saturating_sub(1),
    }
}

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{
    Component, EventContext, EventKind, EventRoutingState, HandlerResponse, RenderContext,
};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps, SelectListStyle,
    SelectionStyle, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection,
    StatusBarStyle,
};

use crate::action::Action;
use crate::reducer::SCROLL_PAGE;
use crate::sprite;
use crate::sprite_backend;
use crate::state::{AppState, ContentMode, FocusArea};
use crate::view::{self, ContentView, DetailView};

const BG_PANEL: Color = Color::Rgb(20, 32, 46);
const BG_PANEL_ALT: Color = Color::Rgb(26, 40, 58);
const BG_HIGHLIGHT: Color = Color::Rgb(28, 92, 110);
const TEXT_MAIN: Color = Color::Rgb(232, 242, 244);
const TEXT_DIM: Color = Color::Rgb(176, 195, 207);
const ACCENT_RED: Color = Color::Rgb(220, 72, 64);
const ACCENT_GOLD: Color = Color::Rgb(228, 176, 88);
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];
const LIST_SCROLL_STEP: i16 = 3;

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PokedexComponentId {
    Search,
    DexList,
    Forms,
    Content,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PokedexContext {
    Search,
    DexList,
    Forms,
    Content,
}

impl EventRoutingState<PokedexComponentId, PokedexContext> for AppState {
    fn focused(&self) -> Option<PokedexComponentId> {
        if self.search.active {
            return Some(PokedexComponentId::Search);
        }
        match self.focus {
            FocusArea::DexList => Some(PokedexComponentId::DexList),
            FocusArea::Forms => Some(PokedexComponentId::Forms),
            FocusArea::Content => Some(PokedexComponentId::Content),
        }
    }

    fn modal(&self) -> Option<PokedexComponentId> {
        self.search.active.then_some(PokedexComponentId::Search)
    }

    fn binding_context(&self, id: PokedexComponentId) -> PokedexContext {
        match id {
            PokedexComponentId::Search => PokedexContext::Search,
            PokedexComponentId::DexList => PokedexContext::DexList,
            PokedexComponentId::Forms => PokedexContext::Forms,
            PokedexComponentId::Content => PokedexContext::Content,
        }
    }

    fn default_context(&self) -> PokedexContext {
        PokedexContext::DexList
    }
}

/// Where each routable component landed in the last frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScreenAreas {
    pub header: Rect,
    pub dex_list: Rect,
    pub forms: Rect,
    pub content: Rect,
}

pub struct PokedexUi {
    dex_list: SelectList,
    form_list: SelectList,
    status_bar: StatusBar,
}

impl Default for PokedexUi {
    fn default() -> Self {
        Self::new()
    }
}

impl PokedexUi {
    pub fn new() -> Self {
        Self {
            dex_list: SelectList::new(),
            form_list: SelectList::new(),
            status_bar: StatusBar::new(),
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        _render_ctx: RenderContext,
        event_ctx: &mut EventContext<PokedexComponentId>,
    ) {
        let areas = self.draw(frame, area, state);
        event_ctx.set_component_area(PokedexComponentId::DexList, areas.dex_list);
        event_ctx.set_component_area(PokedexComponentId::Forms, areas.forms);
        event_ctx.set_component_area(PokedexComponentId::Content, areas.content);
        if state.search.active {
            event_ctx.set_component_area(PokedexComponentId::Search, areas.header);
        }
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) -> ScreenAreas {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(area);

        render_header(frame, layout[0], state);
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
            .split(layout[1]);
        render_list(frame, body[0], state, &mut self.dex_list);
        let (forms, content) = render_detail(frame, body[1], state, &mut self.form_list);
        render_footer(frame, layout[2], state, &mut self.status_bar);

        ScreenAreas {
            header: layout[0],
            dex_list: body[0],
            forms,
            content,
        }
    }

    pub fn handle_list_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_list_event(event, state, &mut self.dex_list)
    }

    pub fn handle_forms_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_forms_event(event, state, &mut self.form_list)
    }
}

/// Keys that work regardless of focus. Category keys only exist once the
/// category controls are shown.
pub fn handle_global_event(event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
    match event {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(*width, *height)).with_render()
        }
        EventKind::Key(key) if !state.search.active => {
            let action = match key.code {
                KeyCode::Char('q') => Action::Quit,
                KeyCode::Tab => Action::FocusNext,
                KeyCode::BackTab => Action::FocusPrev,
                KeyCode::Char('/') => Action::SearchStart,
                KeyCode::Char('r') => Action::Reload,
                KeyCode::Char('i') if state.controls_visible => Action::ShowDescription,
                KeyCode::Char('a') if state.controls_visible => Action::ShowAbilities,
                KeyCode::Char('d') if state.controls_visible => Action::ShowDamageRelations,
                KeyCode::Char('m') if state.controls_visible => Action::ShowMoves,
                _ => return HandlerResponse::ignored(),
            };
            HandlerResponse::action(action)
        }
        _ => HandlerResponse::ignored(),
    }
}

pub fn handle_list_event(
    event: &EventKind,
    state: &AppState,
    dex_list: &mut SelectList,
) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            KeyCode::PageDown => vec![Action::DexSelect(offset_index(
                state.selected_index,
                SCROLL_PAGE,
            ))],
            KeyCode::PageUp => vec![Action::DexSelect(offset_index(
                state.selected_index,
                -SCROLL_PAGE,
            ))],
            _ => {
                let items = dex_items(state);
                let props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: state.selected_index.min(items.len().saturating_sub(1)),
                    is_focused: true,
                    style: list_style(None),
                    behavior: SelectListBehavior {
                        show_scrollbar: true,
                        wrap_navigation: false,
                    },
                    on_select: Action::DexSelect,
                    render_item: &|item| item.clone(),
                };
                dex_list.handle_event(event, props).into_iter().collect()
            }
        },
        EventKind::Scroll { delta, .. } => vec![Action::DexSelect(offset_index(
            state.selected_index,
            (*delta as i16).saturating_mul(LIST_SCROLL_STEP),
        ))],
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_forms_event(
    event: &EventKind,
    state: &AppState,
    form_list: &mut SelectList,
) -> HandlerResponse<Action> {
    let Some(detail) = view::detail_view(state) else {
        return HandlerResponse::ignored();
    };
    let items = form_items(&detail);
    if items.is_empty() {
        return HandlerResponse::ignored();
    }
    let props = SelectListProps {
        items: &items,
        count: items.len(),
        selected: selected_form(&detail),
        is_focused: true,
        style: list_style(Some(BG_PANEL_ALT)),
        behavior: SelectListBehavior {
            show_scrollbar: false,
            wrap_navigation: true,
        },
        on_select: Action::FormSelect,
        render_item: &|item| item.clone(),
    };
    handler_response(form_list.handle_event(event, props).into_iter().collect())
}

pub fn handle_content_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            KeyCode::Char('j') | KeyCode::Down => vec![Action::ContentScroll(1)],
            KeyCode::Char('k') | KeyCode::Up => vec![Action::ContentScroll(-1)],
            KeyCode::PageDown => vec![Action::ContentScroll(SCROLL_PAGE)],
            KeyCode::PageUp => vec![Action::ContentScroll(-SCROLL_PAGE)],
            _ => vec![],
        },
        EventKind::Scroll { delta, .. } => vec![Action::ContentScroll(*delta as i16)],
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_search_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            KeyCode::Esc => vec![Action::SearchCancel],
            KeyCode::Enter => vec![Action::SearchSubmit],
            KeyCode::Backspace => vec![Action::SearchBackspace],
            KeyCode::Char(ch) => vec![Action::SearchInput(ch)],
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn offset_index(index: usize, delta: i16) -> usize {
    if delta < 0 {
        index.saturating_sub(delta.unsigned_abs() as usize)
    } else {
        index.saturating_add(delta as usize)
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let search = if state.search.active {
        format!("/{}_", state.search.query)
    } else if state.search.query.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", state.search.query)
    };
    let header = Line::from(vec![
        Span::styled(
            "POKEDEX",
            Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  Search: "),
        Span::styled(search, Style::default().fg(ACCENT_GOLD)),
        Span::raw(format!(
            "  |  {}/{}",
            state.filtered_indices.len(),
            state.catalog.len()
        )),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(if state.search.active {
            Style::default().fg(ACCENT_GOLD)
        } else {
            Style::default().fg(TEXT_DIM)
        });
    frame.render_widget(Paragraph::new(header).block(block), area);
}

fn render_list(frame: &mut Frame, area: Rect, state: &AppState, dex_list: &mut SelectList) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("DEX")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(focus_border(state, FocusArea::DexList));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let items = dex_items(state);
    if items.is_empty() {
        let message = if state.catalog_loading {
            "Loading catalog..."
        } else {
            "No matches"
        };
        frame.render_widget(
            Paragraph::new(message).style(Style::default().fg(TEXT_DIM)),
            inner,
        );
        return;
    }
    let props = SelectListProps {
        items: &items,
        count: items.len(),
        selected: state.selected_index.min(items.len().saturating_sub(1)),
        is_focused: state.focus == FocusArea::DexList,
        style: list_style(None),
        behavior: SelectListBehavior {
            show_scrollbar: true,
            wrap_navigation: false,
        },
        on_select: Action::DexSelect,
        render_item: &|item| item.clone(),
    };
    dex_list.render(frame, inner, props);
}

/// Returns the forms and content areas.
fn render_detail(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    form_list: &mut SelectList,
) -> (Rect, Rect) {
    let detail = view::detail_view(state);
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(12),
            Constraint::Min(5),
        ])
        .split(area);
    render_title(frame, layout[0], state, detail.as_ref());

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(layout[1]);
    render_sprite(frame, middle[0], state, detail.as_ref());
    render_forms(frame, middle[1], state, detail.as_ref(), form_list);
    render_content(frame, layout[2], state);
    (middle[1], layout[2])
}

fn render_title(frame: &mut Frame, area: Rect, state: &AppState, detail: Option<&DetailView>) {
    let mut spans = Vec::new();
    match detail {
        Some(detail) => {
            spans.push(Span::styled(
                detail.name.clone(),
                Style::default().fg(TEXT_MAIN).add_modifier(Modifier::BOLD),
            ));
            for badge in &detail.types {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(
                    format!(" {} ", badge.label),
                    Style::default()
                        .bg(type_color(&badge.type_name))
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD),
                ));
            }
        }
        None if state.detail_loading => {
            spans.push(Span::styled("Loading...", Style::default().fg(TEXT_DIM)));
        }
        None => {}
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .title("DATA")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_sprite(frame: &mut Frame, area: Rect, state: &AppState, detail: Option<&DetailView>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("SPRITE")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sprite_url = detail.and_then(|detail| detail.sprite_url.as_deref());
    let loaded = sprite_url
        .filter(|_| state.config.sprites)
        .and_then(|url| state.sprites.get(url));
    if let Some(loaded) = loaded {
        let (cols, rows) = sprite::sprite_fit(loaded, inner.width, inner.height);
        let x = inner.x.saturating_add(inner.width.saturating_sub(cols) / 2);
        let y = inner.y.saturating_add(inner.height.saturating_sub(rows) / 2);
        sprite_backend::place_sprite(x, y, sprite::kitty_sequence(loaded, cols, rows));
        return;
    }

    sprite_backend::clear_sprite();
    let placeholder = match (detail, sprite_url) {
        (None, _) => "[select a pokemon]".to_string(),
        (Some(_), None) => "[no artwork]".to_string(),
        (Some(_), Some(_)) if state.sprite_loading => "[loading sprite]".to_string(),
        (Some(_), Some(url)) => url.to_string(),
    };
    let paragraph = Paragraph::new(placeholder)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(TEXT_DIM));
    frame.render_widget(paragraph, inner);
}

fn render_forms(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    detail: Option<&DetailView>,
    form_list: &mut SelectList,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("FORMS")
        .style(Style::default().bg(BG_PANEL_ALT).fg(TEXT_MAIN))
        .border_style(focus_border(state, FocusArea::Forms));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(detail) = detail else {
        return;
    };
    let items = form_items(detail);
    if items.is_empty() {
        return;
    }
    let props = SelectListProps {
        items: &items,
        count: items.len(),
        selected: selected_form(detail),
        is_focused: state.focus == FocusArea::Forms,
        style: list_style(Some(BG_PANEL_ALT)),
        behavior: SelectListBehavior {
            show_scrollbar: false,
            wrap_navigation: true,
        },
        on_select: Action::FormSelect,
        render_item: &|item| item.clone(),
    };
    form_list.render(frame, inner, props);
}

fn render_content(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = match state.content {
        ContentMode::Description => "DESCRIPTION",
        ContentMode::Abilities => "ABILITIES",
        ContentMode::DamageRelations => "DAMAGE RELATIONS",
        ContentMode::Moves => "MOVES",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(focus_border(state, FocusArea::Content));
    let paragraph = Paragraph::new(content_text(state))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((state.content_scroll, 0));
    frame.render_widget(paragraph, area);
}

pub fn content_text(state: &AppState) -> Text<'static> {
    match view::content_view(state) {
        ContentView::Empty => Text::default(),
        ContentView::Loading => Text::styled(
            format!("Loading {}", SPINNER[(state.tick % SPINNER.len() as u64) as usize]),
            Style::default().fg(TEXT_DIM),
        ),
        // Flavor texts carry hard line breaks and form feeds.
        ContentView::Description(text) => Text::from(text.replace(['\n', '\u{c}'], " ")),
        ContentView::Lines(lines) => {
            Text::from(lines.into_iter().map(Line::from).collect::<Vec<_>>())
        }
        ContentView::Relations(blocks) => {
            let mut lines = Vec::new();
            for block in blocks {
                if !lines.is_empty() {
                    lines.push(Line::default());
                }
                lines.push(Line::styled(
                    block.title,
                    Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
                ));
                lines.extend(block.lines.into_iter().map(Line::from));
            }
            Text::from(lines)
        }
    }
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let status = status_text(state);
    let (left_hints, center_hints) = status_hints(state);
    let status_items = [StatusBarItem::span(Span::styled(
        status,
        Style::default().fg(ACCENT_GOLD),
    ))];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: None,
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default()
            .fg(ACCENT_RED)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

fn status_text(state: &AppState) -> String {
    let label = if state.catalog_loading {
        "Loading catalog"
    } else if state.detail_loading {
        "Loading pokemon"
    } else if state.content_loading {
        "Loading details"
    } else if state.sprite_loading {
        "Loading sprite"
    } else {
        return String::new();
    };
    format!("{label} {}", SPINNER[(state.tick % SPINNER.len() as u64) as usize])
}

pub fn status_hints(
    state: &AppState,
) -> (Vec<StatusBarHint<'static>>, Vec<StatusBarHint<'static>>) {
    if state.search.active {
        let left = vec![
            StatusBarHint::new("Enter", "Apply"),
            StatusBarHint::new("Esc", "Clear"),
            StatusBarHint::new("Bksp", "Delete"),
        ];
        return (left, Vec::new());
    }

    let mut left = match state.focus {
        FocusArea::DexList => vec![
            StatusBarHint::new("j/k", "Move"),
            StatusBarHint::new("PgUp/PgDn", "Page"),
        ],
        FocusArea::Forms => vec![StatusBarHint::new("j/k", "Form")],
        FocusArea::Content => vec![StatusBarHint::new("j/k", "Scroll")],
    };
    if state.controls_visible {
        left.extend([
            StatusBarHint::new("i", "Info"),
            StatusBarHint::new("a", "Abilities"),
            StatusBarHint::new("d", "Damage"),
            StatusBarHint::new("m", "Moves"),
        ]);
    }

    let center = vec![
        StatusBarHint::new("Tab", "Focus"),
        StatusBarHint::new("/", "Search"),
        StatusBarHint::new("r", "Reload"),
        StatusBarHint::new("q", "Quit"),
    ];
    (left, center)
}

fn dex_items(state: &AppState) -> Vec<Line<'static>> {
    state
        .filtered_indices
        .iter()
        .filter_map(|idx| state.catalog.get(*idx).map(|entry| (*idx, entry)))
        .map(|(idx, entry)| {
            let requested = state.selection.requested.as_deref() == Some(entry.url.as_str());
            let style = if requested {
                Style::default().fg(ACCENT_GOLD)
            } else {
                Style::default().fg(TEXT_MAIN)
            };
            Line::from(vec![
                Span::styled(format!("#{:04} ", idx + 1), Style::default().fg(TEXT_DIM)),
                Span::styled(entry.name.clone(), style),
            ])
        })
        .collect()
}

fn form_items(detail: &DetailView) -> Vec<Line<'static>> {
    detail
        .forms
        .iter()
        .map(|form| Line::from(form.label.clone()))
        .collect()
}

fn selected_form(detail: &DetailView) -> usize {
    detail
        .forms
        .iter()
        .position(|form| form.selected)
        .unwrap_or(0)
}

fn list_style(bg: Option<Color>) -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg,
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(BG_HIGHLIGHT)
                    .fg(TEXT_MAIN)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}

fn focus_border(state: &AppState, area: FocusArea) -> Style {
    if state.focus == area && !state.search.active {
        Style::default().fg(ACCENT_RED)
    } else {
        Style::default().fg(TEXT_DIM)
    }
}

pub fn type_color(type_name: &str) -> Color {
    match type_name {
        "normal" => Color::Rgb(168, 167, 122),
        "fire" => Color::Rgb(238, 129, 48),
        "water" => Color::Rgb(99, 144, 240),
        "electric" => Color::Rgb(247, 208, 44),
        "grass" => Color::Rgb(122, 199, 76),
        "ice" => Color::Rgb(150, 217, 214),
        "fighting" => Color::Rgb(194, 46, 40),
        "poison" => Color::Rgb(163, 62, 161),
        "ground" => Color::Rgb(226, 191, 101),
        "flying" => Color::Rgb(169, 143, 243),
        "psychic" => Color::Rgb(249, 85, 135),
        "bug" => Color::Rgb(166, 185, 26),
        "rock" => Color::Rgb(182, 161, 54),
        "ghost" => Color::Rgb(115, 87, 151),
        "dragon" => Color::Rgb(111, 53, 252),
        "dark" => Color::Rgb(112, 87, 70),
        "steel" => Color::Rgb(183, 183, 206),
        "fairy" => Color::Rgb(214, 133, 173),
        _ => TEXT_DIM,
    }
}

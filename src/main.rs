use std::cell::RefCell;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, Keybindings, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use pokedex::action::Action;
use pokedex::api::{PokeApi, DEFAULT_API_BASE, DEFAULT_CATALOG_LIMIT};
use pokedex::effect::Effect;
use pokedex::reducer::reducer;
use pokedex::sprite;
use pokedex::sprite_backend::{self, SpriteBackend};
use pokedex::state::{AppState, ViewerConfig, DEFAULT_LANGUAGE};
use pokedex::ui::{self, PokedexComponentId, PokedexContext, PokedexUi};

#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "Pokedex viewer for PokeAPI")]
struct Args {
    /// PokeAPI base url
    #[arg(long, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Number of catalog entries to request
    #[arg(long, default_value_t = DEFAULT_CATALOG_LIMIT)]
    limit: u16,

    /// Language for descriptions and ability effects
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    language: String,

    /// Skip fetching artwork
    #[arg(long)]
    no_sprites: bool,

    /// Log file (defaults to pokedex.log in the temp dir)
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.clone())?;

    let api = PokeApi::new(args.api_base.clone(), args.limit);
    let config = ViewerConfig {
        language: args.language.clone(),
        sprites: !args.no_sprites,
    };
    tracing::info!(base = %args.api_base, limit = args.limit, "starting");

    let debug = DebugSession::new(args.debug);
    let state = debug
        .load_state_or_else_async(move || {
            let config = config.clone();
            async move { Ok::<AppState, io::Error>(AppState::new(config)) }
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = SpriteBackend::new(stdout, sprite_backend::sprite_slot());
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions, api).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    tracing::info!("exiting");
    Ok(())
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_logging(path: Option<PathBuf>) -> io::Result<()> {
    let path = path.unwrap_or_else(|| std::env::temp_dir().join("pokedex.log"));
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "pokedex=info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(io::Error::other)
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
    api: PokeApi,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(PokedexUi::new()));
    let mut bus: EventBus<AppState, Action, PokedexComponentId, PokedexContext> = EventBus::new();
    let keybindings: Keybindings<PokedexContext> = Keybindings::new();

    let ui_list = Rc::clone(&ui);
    bus.register(PokedexComponentId::DexList, move |event, state| {
        ui_list.borrow_mut().handle_list_event(&event.kind, state)
    });

    let ui_forms = Rc::clone(&ui);
    bus.register(PokedexComponentId::Forms, move |event, state| {
        ui_forms.borrow_mut().handle_forms_event(&event.kind, state)
    });

    bus.register(PokedexComponentId::Content, |event, state| {
        ui::handle_content_event(&event.kind, state)
    });

    bus.register(PokedexComponentId::Search, |event, state| {
        ui::handle_search_event(&event.kind, state)
    });

    bus.register_global(|event, state| ui::handle_global_event(&event.kind, state));

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(120), || Action::Tick);
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(effect, ctx, &api),
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>, api: &PokeApi) {
    let api = api.clone();
    match effect {
        Effect::LoadCatalog => {
            ctx.tasks().spawn(TaskKey::new("catalog"), async move {
                match api.fetch_catalog().await {
                    Ok(entries) => Action::CatalogDidLoad(entries),
                    Err(error) => Action::CatalogDidError(error.to_string()),
                }
            });
        }
        Effect::LoadPokemon { version, url } => {
            let key = format!("pokemon_{url}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match api.fetch_pokemon(&url).await {
                    Ok(record) => Action::PokemonDidLoad { version, record },
                    Err(error) => Action::PokemonDidError {
                        version,
                        url,
                        error: error.to_string(),
                    },
                }
            });
        }
        Effect::LoadSpecies { version, url } => {
            let key = format!("species_{url}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match api.fetch_species(&url).await {
                    Ok(species) => Action::SpeciesDidLoad { version, species },
                    Err(error) => Action::SpeciesDidError {
                        version,
                        url,
                        error: error.to_string(),
                    },
                }
            });
        }
        Effect::LoadSprite { url } => {
            let key = format!("sprite_{url}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match api.fetch_bytes(&url).await {
                    Ok(bytes) => match sprite::decode_sprite(&bytes) {
                        Ok(sprite) => Action::SpriteDidLoad { url, sprite },
                        Err(error) => Action::SpriteDidError { url, error },
                    },
                    Err(error) => Action::SpriteDidError {
                        url,
                        error: error.to_string(),
                    },
                }
            });
        }
        Effect::LoadAbilities { version, abilities } => {
            let key = format!("abilities_{version}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                let abilities = api.fetch_abilities(abilities).await;
                Action::AbilitiesDidLoad { version, abilities }
            });
        }
        Effect::LoadTypeRelations { version, types } => {
            let key = format!("types_{version}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match api.fetch_type_relations(types).await {
                    Ok(relations) => Action::TypeRelationsDidLoad { version, relations },
                    Err(error) => Action::TypeRelationsDidError {
                        version,
                        error: error.to_string(),
                    },
                }
            });
        }
        Effect::LoadMoves { version, moves } => {
            let key = format!("moves_{version}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                let moves = api.fetch_moves(moves).await;
                Action::MovesDidLoad { version, moves }
            });
        }
    }
}

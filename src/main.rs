//! Command-line entry point.
//!
//! One-shot subcommands print a single view and exit; `browse` runs an
//! interactive loop over stdin that drives the same event handler a GUI
//! would, with search input debounced before it reaches the address.
//!
//! # Browse Commands
//!
//! - `/text`: type into the search box (settles after 400 ms)
//! - `t <type>` / `t`: set or clear the type filter (one of the 18 types)
//! - `s <sort>`: `id-asc`, `id-desc`, `name-asc`, `name-desc`
//! - `f`: toggle favorites only
//! - `n` / `p` / `g <page>`: next, previous, go to page
//! - `* <row>`: star or un-star the entity on that row
//! - `o <row>`: open details for that row
//! - `r`: retry the failed detail view, or else the list
//! - `theme`: toggle light/dark
//! - `q`: quit

#![forbid(unsafe_code)]

use clap::{Parser, Subcommand, ValueEnum};
use pokedex::app::url_state::{back_link, UrlQuery};
use pokedex::app::{parse_category, ListOutput, SortKey, CATEGORIES};
use pokedex::domain::{EntityDetails, RemoteError};
use pokedex::query::Debouncer;
use pokedex::storage::{SharedStore, ThemeMode};
use pokedex::ui::{DetailViewModel, Renderer};
use pokedex::{handle_event, Action, AppState, Config, Event, Explorer};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "pokedex")]
#[command(about = "Browse, search and favorite Pokémon from PokeAPI")]
struct Cli {
    /// Config file (default: ~/.config/pokedex/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory for favorites, theme and logs
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Keep favorites and theme in memory only
    #[arg(long, global = true, default_value_t = false)]
    ephemeral: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one page of the list
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        /// One of the 18 types, e.g. `fire`
        #[arg(long = "type", value_parser = parse_category)]
        category: Option<String>,
        #[arg(long)]
        sort: Option<SortKey>,
        #[arg(long, default_value_t = false)]
        favorites: bool,
        /// Start from a query string such as `q=char&sort=name-desc`
        #[arg(long)]
        query: Option<String>,
    },
    /// Show details by id or name
    Show { target: String },
    /// Look up by exact name (no retries)
    Lookup { name: String },
    /// Star or un-star an entity id
    Fav { id: u32 },
    /// List starred entities
    Favorites,
    /// Show or change the theme
    Theme {
        #[arg(value_enum)]
        mode: Option<ThemeArg>,
    },
    /// Check that the API is reachable
    Ping,
    /// Interactive browsing
    Browse {
        #[arg(long)]
        query: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ThemeArg {
    Toggle,
    Light,
    Dark,
}

struct Context {
    config: Config,
    backend: SharedStore,
    explorer: Explorer,
    color: bool,
}

impl Context {
    fn renderer(&self, mode: ThemeMode) -> pokedex::Result<Renderer> {
        Ok(Renderer::new(self.config.palette(mode)?, self.color))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.to_string_lossy().into_owned());
    }

    pokedex::observability::init_tracing(&config);
    tracing::info!(base_url = %config.base_url, ephemeral = cli.ephemeral, "pokedex starting");

    match run(cli.command, config, cli.ephemeral).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: Config, ephemeral: bool) -> pokedex::Result<ExitCode> {
    let backend = pokedex::open_store(&config, ephemeral)?;
    let explorer = pokedex::build_explorer(&config)?;
    let ctx = Context {
        config,
        backend,
        explorer,
        color: io::stdout().is_terminal(),
    };

    match command {
        Commands::List {
            page,
            search,
            category,
            sort,
            favorites,
            query,
        } => {
            let mut state = pokedex::initialize(UrlQuery::new(query.as_deref().unwrap_or_default()), &ctx.backend)?;
            if let Some(search) = search {
                state.url.set_search(&search);
            }
            if let Some(category) = category {
                state.url.set_category(&category);
            }
            if let Some(sort) = sort {
                state.url.set_sort(sort);
            }
            if favorites {
                state.url.set_favorites_only(true);
            }
            if let Some(page) = page {
                state.url.set_page(page);
            }
            print_list(&ctx, &mut state).await
        }
        Commands::Favorites => {
            let mut state = pokedex::initialize(UrlQuery::default(), &ctx.backend)?;
            state.url.set_favorites_only(true);
            print_list(&ctx, &mut state).await
        }
        Commands::Show { target } => {
            let result = if target.trim().chars().all(|c| c.is_ascii_digit()) {
                ctx.explorer.details(&target).await
            } else {
                ctx.explorer.lookup(&target).await
            };
            print_detail(&ctx, result, "/")
        }
        Commands::Lookup { name } => {
            let result = ctx.explorer.lookup(&name).await;
            print_detail(&ctx, result, "/")
        }
        Commands::Fav { id } => {
            let mut state = pokedex::initialize(UrlQuery::default(), &ctx.backend)?;
            let starred = state.favorites.toggle(&id.to_string())?;
            let renderer = ctx.renderer(state.theme.get())?;
            let verb = if starred { "Added" } else { "Removed" };
            let preposition = if starred { "to" } else { "from" };
            renderer.render_message(&mut io::stdout(), &format!("{verb} #{id:03} {preposition} favorites"))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Theme { mode } => {
            let mut state = pokedex::initialize(UrlQuery::default(), &ctx.backend)?;
            match mode {
                None => {}
                Some(ThemeArg::Toggle) => {
                    state.theme.toggle()?;
                }
                Some(ThemeArg::Light) => state.theme.set(ThemeMode::Light)?,
                Some(ThemeArg::Dark) => state.theme.set(ThemeMode::Dark)?,
            }
            let current = state.theme.get();
            ctx.renderer(current)?
                .render_message(&mut io::stdout(), &format!("Theme: {current}"))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Ping => {
            let reachable = ctx.explorer.ping().await;
            let renderer = ctx.renderer(ThemeMode::default())?;
            let mut out = io::stdout();
            if reachable {
                renderer.render_message(&mut out, &format!("PokeAPI reachable at {}", ctx.config.base_url))?;
                Ok(ExitCode::SUCCESS)
            } else {
                renderer.render_error(&mut out, &format!("PokeAPI unreachable at {}", ctx.config.base_url))?;
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Browse { query } => {
            let state = pokedex::initialize(UrlQuery::new(query.as_deref().unwrap_or_default()), &ctx.backend)?;
            browse(&ctx, state).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn load(ctx: &Context, state: &mut AppState, retry: bool) -> pokedex::Result<()> {
    let view = state.view();
    let output: ListOutput = if retry {
        ctx.explorer.retry(&view, state.favorites.set()).await
    } else {
        ctx.explorer.load_list(&view, state.favorites.set()).await
    };
    handle_event(state, &Event::ListLoaded(output))?;
    Ok(())
}

fn draw_list(ctx: &Context, state: &AppState) -> pokedex::Result<()> {
    let Some(vm) = state.compute_viewmodel() else {
        return Ok(());
    };
    let mut out = io::stdout().lock();
    ctx.renderer(state.theme.get())?.render_list(&mut out, &vm)?;
    out.flush()?;
    Ok(())
}

async fn print_list(ctx: &Context, state: &mut AppState) -> pokedex::Result<ExitCode> {
    load(ctx, state, false).await?;
    draw_list(ctx, state)?;
    let failed = state.list.as_ref().is_some_and(|list| list.error.is_some());
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn print_detail(ctx: &Context, result: Result<EntityDetails, RemoteError>, back: &str) -> pokedex::Result<ExitCode> {
    let state = pokedex::initialize(UrlQuery::default(), &ctx.backend)?;
    let renderer = ctx.renderer(state.theme.get())?;
    let mut out = io::stdout().lock();
    match result {
        Ok(details) => {
            let favorite = state.favorites.is_favorite(&details.id.to_string());
            renderer.render_detail(&mut out, &DetailViewModel::build(&details, favorite, back))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            renderer.render_error(&mut out, &e.message)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// What one line of browse input asks for.
enum Input {
    Keystrokes(String),
    Event(Event),
    Help,
    /// Rejected input, with the message to show.
    Invalid(String),
}

fn parse_input(line: &str, state: &AppState) -> Input {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(text) = line.strip_prefix('/') {
        return Input::Keystrokes(text.to_string());
    }

    let mut parts = line.trim().splitn(2, ' ');
    let command = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).unwrap_or_default();
    let row = || {
        arg.parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| state.row_id(index))
    };

    let event = match command {
        "q" | "quit" => Event::Quit,
        "n" => Event::NextPage,
        "p" => Event::PreviousPage,
        "g" => match arg.parse() {
            Ok(page) => Event::GotoPage(page),
            Err(_) => return Input::Invalid(format!("unknown command: {line}")),
        },
        "t" => match parse_category(arg) {
            Ok(category) => Event::SelectCategory(category),
            Err(e) => return Input::Invalid(e),
        },
        "s" => match arg.parse() {
            Ok(sort) => Event::SelectSort(sort),
            Err(e) => return Input::Invalid(e),
        },
        "f" => Event::SetFavoritesOnly(!state.view().favorites_only),
        "r" => Event::Retry,
        "theme" => Event::ToggleTheme,
        "*" => match row() {
            Some(id) => Event::ToggleFavorite(id),
            None => return Input::Invalid(format!("no row {arg}")),
        },
        "o" => match row() {
            Some(id) => Event::OpenDetail(id),
            None => return Input::Invalid(format!("no row {arg}")),
        },
        "" | "?" | "help" => return Input::Help,
        _ => return Input::Invalid(format!("unknown command: {line}")),
    };
    Input::Event(event)
}

const HELP: &str = "/text search | t <type> | s <sort> | f favorites | n p g <page> | * <row> star | o <row> open | r retry | theme | q quit";

fn print_help(ctx: &Context, state: &AppState) -> pokedex::Result<()> {
    let renderer = ctx.renderer(state.theme.get())?;
    let mut out = io::stdout();
    renderer.render_message(&mut out, HELP)?;
    renderer.render_message(&mut out, &format!("types: {}", CATEGORIES.join(" ")))?;
    Ok(())
}

async fn browse(ctx: &Context, mut state: AppState) -> pokedex::Result<()> {
    let mut debouncer = Debouncer::default().with_settled(state.view().search_text);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    load(ctx, &mut state, false).await?;
    draw_list(ctx, &state)?;
    print_help(ctx, &state)?;

    loop {
        let input = match debouncer.deadline() {
            Some(deadline) => {
                tokio::select! {
                    line = lines.next_line() => match line? {
                        Some(line) => Some(line),
                        None => break,
                    },
                    () = tokio::time::sleep_until(deadline.into()) => None,
                }
            }
            None => match lines.next_line().await? {
                Some(line) => Some(line),
                None => break,
            },
        };

        let event = match input {
            None => match debouncer.poll(Instant::now()) {
                Some(text) => Event::Search(text),
                None => continue,
            },
            Some(line) => match parse_input(&line, &state) {
                Input::Keystrokes(text) => {
                    debouncer.push(text, Instant::now());
                    continue;
                }
                Input::Event(event) => event,
                Input::Help => {
                    print_help(ctx, &state)?;
                    continue;
                }
                Input::Invalid(message) => {
                    ctx.renderer(state.theme.get())?.render_error(&mut io::stdout(), &message)?;
                    continue;
                }
            },
        };

        let (redraw, actions) = match handle_event(&mut state, &event) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "event failed");
                ctx.renderer(state.theme.get())?.render_error(&mut io::stdout(), &e.to_string())?;
                continue;
            }
        };

        let mut quit = false;
        let mut listed = false;
        for action in actions {
            match action {
                Action::ReloadList => {
                    load(ctx, &mut state, false).await?;
                    listed = true;
                }
                Action::Retry => {
                    load(ctx, &mut state, true).await?;
                    listed = true;
                }
                Action::ShowDetail(id) => open_detail(ctx, &mut state, id).await?,
                Action::RetryDetail(id) => {
                    ctx.explorer.invalidate_details(&id.to_string());
                    open_detail(ctx, &mut state, id).await?;
                }
                Action::Quit => quit = true,
            }
        }
        if quit {
            break;
        }
        if redraw || listed {
            draw_list(ctx, &state)?;
        }
    }

    tracing::info!("browse session ended");
    Ok(())
}

/// Loads and shows one detail view. A failure is reported to the handler so
/// the next `r` retries this detail rather than the list.
async fn open_detail(ctx: &Context, state: &mut AppState, id: u32) -> pokedex::Result<()> {
    let result = ctx.explorer.details(&id.to_string()).await;
    let renderer = ctx.renderer(state.theme.get())?;
    let mut out = io::stdout().lock();
    match result {
        Ok(details) => {
            let favorite = state.favorites.is_favorite(&details.id.to_string());
            let back = back_link(&state.url.params());
            renderer.render_detail(&mut out, &DetailViewModel::build(&details, favorite, back))?;
        }
        Err(e) => {
            renderer.render_error(&mut out, &e.message)?;
            renderer.render_message(&mut out, pokedex::ui::viewmodel::RETRY_HINT)?;
            drop(out);
            handle_event(state, &Event::DetailFailed(id))?;
        }
    }
    Ok(())
}

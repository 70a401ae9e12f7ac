//! abreview: paired video review in the terminal.
//!
//! `abreview review <task>` browses the recorded choices for a task,
//! `abreview test <task>` records new ones, and `abreview stats <task>`
//! prints the preference summary to stdout.
//!
//! # Startup sequence
//!
//! 1. Parse the command line and load the config file. Config errors are
//!    soft: defaults are used and the error is logged once tracing is up.
//! 2. Initialise tracing into the log file (the TUI owns the terminal).
//! 3. `install_panic_hook()` before `init_tui()` so a panic restores the
//!    terminal before its message prints.
//! 4. Spawn the event task, the SIGTERM watch and the loader, then issue the
//!    first load.
//!
//! The event loop exits only via `break`; `restore_tui()` runs after it on
//! every path except a panic, which the hook covers.

mod app;
mod config;
mod event;
mod loader;
mod player;
mod theme;
mod tui;
mod ui;

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use abreview_core::api::ApiClient;
use abreview_core::engine::MediaRequest;
use abreview_core::stats::Summary;

use app::{AppState, ViewMode};
use config::{Config, Overrides, PlayerKind};
use event::AppEvent;
use loader::LoadRequest;
use ui::keybindings::{handle_key, handle_mouse, KeyAction};

#[derive(Parser, Debug)]
#[command(name = "abreview", version, about = "Blind A/B video comparison in the terminal")]
struct Cli {
    /// Base URL of the results API.
    #[arg(long, global = true, env = "ABREVIEW_API_URL")]
    api_url: Option<String>,

    /// Origin that serves the uploaded videos (defaults to the API URL).
    #[arg(long, global = true, env = "ABREVIEW_MEDIA_URL")]
    media_url: Option<String>,

    /// Config file to read instead of the XDG default.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Do not launch players; list the media URLs instead.
    #[arg(long, global = true)]
    no_player: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse the recorded choices of a task.
    Review { task_id: String },
    /// Run a blind test and record a choice for each pair.
    Test { task_id: String },
    /// Print the preference summary of a task.
    Stats { task_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_file = cli.config.clone().unwrap_or_else(config::config_path);
    let (mut config, config_error) = match config::load(&config_file) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    config.apply_overrides(Overrides {
        api_url: cli.api_url,
        media_url: cli.media_url,
        no_player: cli.no_player,
    });

    init_tracing(&config)?;
    if let Some(e) = config_error {
        warn!(path = %config_file.display(), error = %e, "using default config");
    }

    let client = ApiClient::new(&config.api_url, config.media_base(), config.timeout())
        .context("failed to build API client")?;
    info!(api = %config.api_url, media = %config.media_base(), "starting");

    match cli.command {
        Command::Review { task_id } => run_tui(config, client, ViewMode::Review, task_id).await,
        Command::Test { task_id } => run_tui(config, client, ViewMode::BlindTest, task_id).await,
        Command::Stats { task_id } => print_stats(&client, &task_id).await,
    }
}

/// Routes tracing into the configured log file. `ABREVIEW_LOG` takes an
/// `EnvFilter` directive string.
fn init_tracing(config: &Config) -> anyhow::Result<()> {
    if let Some(parent) = config.log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("failed to open log file {}", config.log_file.display()))?;

    let filter = EnvFilter::try_from_env("ABREVIEW_LOG")
        .unwrap_or_else(|_| EnvFilter::new("abreview=info,abreview_core=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

async fn print_stats(client: &ApiClient, task_id: &str) -> anyhow::Result<()> {
    let results = client
        .detailed_results(task_id)
        .await
        .with_context(|| format!("failed to load results for task {task_id}"))?;
    let summary = Summary::from_results(&results);
    let folders = &results.header.folders;

    println!("{} ({})", results.header.task_name, results.header.task_id);
    println!(
        "  evaluated      {}/{} ({:.1}%)",
        summary.evaluated, summary.total, summary.completion_rate
    );
    println!("  {:<14} {} ({:.1}%)", folders.folder_a, summary.a_wins, summary.a_percent);
    println!("  {:<14} {} ({:.1}%)", folders.folder_b, summary.b_wins, summary.b_percent);
    println!("  {:<14} {} ({:.1}%)", "tie", summary.ties, summary.tie_percent);
    if summary.unrecognized > 0 {
        println!("  {:<14} {}", "unrecognized", summary.unrecognized);
    }
    println!("  {}", summary.verdict.describe(folders));
    Ok(())
}

/// Hands a media request to the player backend, if one is enabled.
fn open_media(config: &Config, request: Option<MediaRequest>, tx: &UnboundedSender<AppEvent>) {
    let Some(request) = request else { return };
    if config.player == PlayerKind::Mpv {
        player::open_pair(request, config.mpv_path.clone(), tx.clone());
    }
}

fn load_request(state: &mut AppState) -> LoadRequest {
    let token = state.begin_load();
    let task_id = state.task_id.clone();
    match state.view {
        ViewMode::Review => LoadRequest::Results { token, task_id },
        ViewMode::BlindTest => LoadRequest::Task { token, task_id },
    }
}

async fn run_tui(
    config: Config,
    client: ApiClient,
    view: ViewMode,
    task_id: String,
) -> anyhow::Result<()> {
    let theme = theme::Theme::from_name(&config.theme);
    let mut state = AppState::new(
        view,
        task_id,
        config.media_base().to_owned(),
        config.player == PlayerKind::Mpv,
    );

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm().context("failed to register SIGTERM handler")?;
    let mut terminal = tui::init_tui().context("failed to initialise terminal")?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    event::spawn_sigterm_watch(term_flag, handler.tx.clone());
    let tx = handler.tx;
    let mut rx = handler.rx;
    let loads = loader::spawn_loader(client, tx.clone());

    let _ = loads.send(load_request(&mut state));

    // Draw errors are held here so the terminal is restored before returning.
    let mut draw_error: Option<std::io::Error> = None;

    'event_loop: while let Some(event) = rx.recv().await {
        match event {
            AppEvent::Render => {
                if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut state, &theme)) {
                    draw_error = Some(e);
                    break 'event_loop;
                }
            }
            AppEvent::Key(key) => {
                let action = handle_key(key, &mut state);
                if dispatch(action, &mut state, &config, &tx, &loads) {
                    break 'event_loop;
                }
            }
            AppEvent::Mouse(mouse) => {
                let action = handle_mouse(mouse, &mut state);
                if dispatch(action, &mut state, &config, &tx, &loads) {
                    break 'event_loop;
                }
            }
            AppEvent::Loaded { token, result } => {
                let request = state.apply_loaded(token, result);
                open_media(&config, request, &tx);
            }
            AppEvent::Submitted { token, index, result } => {
                let request = state.apply_submitted(token, index, result);
                open_media(&config, request, &tx);
            }
            AppEvent::MediaReady { generation, left, right, errors } => {
                if state.apply_media_ready(generation, left, right, errors) {
                    event::schedule_autoplay(tx.clone(), generation);
                }
            }
            AppEvent::MediaTime { side, generation } => {
                if let Some(engine) = state.engine.as_mut() {
                    engine.time_update(side, generation);
                }
            }
            AppEvent::Autoplay { generation } => {
                if let Some(engine) = state.engine.as_mut() {
                    engine.autoplay(generation);
                }
            }
            AppEvent::Tick => state.expire_status(),
            // ratatui picks up the new size on the next draw.
            AppEvent::Resize => {}
            AppEvent::Quit => {
                info!("SIGTERM received");
                break 'event_loop;
            }
        }
    }

    state.shutdown();
    tui::restore_tui().context("failed to restore terminal")?;
    info!("exiting");
    match draw_error {
        Some(e) => Err(e).context("terminal draw failed"),
        None => Ok(()),
    }
}

/// Carries out a dispatcher action. Returns true when the loop should exit.
fn dispatch(
    action: KeyAction,
    state: &mut AppState,
    config: &Config,
    tx: &UnboundedSender<AppEvent>,
    loads: &UnboundedSender<LoadRequest>,
) -> bool {
    match action {
        KeyAction::Continue => {}
        KeyAction::Quit => return true,
        KeyAction::Reload => {
            let _ = loads.send(load_request(state));
        }
        KeyAction::OpenMedia(request) => open_media(config, Some(request), tx),
        KeyAction::Submit(ticket) => {
            let _ = loads.send(LoadRequest::Submit {
                token: ticket.token,
                index: ticket.index,
                pair_id: ticket.pair_id,
                choice: ticket.choice,
                is_blind: ticket.is_blind,
            });
        }
    }
    false
}

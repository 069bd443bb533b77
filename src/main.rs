// ============================================================================
// LazyTicker - Recherche de titres et movers du marché indien
// ============================================================================
// Programme TUI : bandeau des movers, recherche "as-you-type" et page détail
// avec graphique et favoris
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements, ticks et rendering
// 3. Async dans sync : tokio::runtime::Runtime, les tâches tournent sur ses
//    threads et l'UI lit leurs résultats sans bloquer
// 4. RAII : dropper le poller ou la page détail avorte leurs tâches
// ============================================================================

use std::io;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tokio::sync::mpsc::{error::TryRecvError, unbounded_channel, UnboundedReceiver};
use tracing::{debug, error, info, warn};

use lazyticker::api::MarketClient;
use lazyticker::app::App;
use lazyticker::config::Config;
use lazyticker::favorites::FileStore;
use lazyticker::feed::{FeedPoller, FeedUpdate};
use lazyticker::search::SearchSettings;
use lazyticker::ui::events::{self, Event, EventHandler};
use lazyticker::ui::home::{self, HomeTarget};
use lazyticker::ui::render;

// ============================================================================
// Logging
// ============================================================================
// Les logs vont dans un fichier : stdout appartient au TUI
// ============================================================================

/// Initialise le logging dans `<log_dir>/lazyticker.log` (rotation quotidienne)
fn init_logging(config: &Config) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = &config.log_dir;
    std::fs::create_dir_all(log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "lazyticker.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true) // Les tâches tokio tournent sur plusieurs threads
                .with_line_number(true),
        )
        .with(
            // RUST_LOG prend le dessus, sinon debug pour lazyticker et info ailleurs
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazyticker=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

fn main() -> Result<()> {
    // .env optionnel, les variables déjà définies gardent la priorité
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(api_base = %config.api_base, index = %config.index, "LazyTicker starting up");

    // CONCEPT RUST : Exécuter du code async depuis une boucle sync
    // - Le runtime garde ses threads de travail
    // - Les contrôleurs reçoivent un Handle pour y lancer leurs tâches
    let runtime = tokio::runtime::Runtime::new()?;
    let handle = runtime.handle().clone();

    let api = Arc::new(MarketClient::new(&config)?);
    let store = Box::new(FileStore::in_dir(&config.data_dir));
    let settings = SearchSettings {
        debounce: config.debounce,
        hide_delay: config.hide_delay,
    };
    let mut app = App::new(api.clone(), handle.clone(), store, settings);

    // Bandeau : premier fetch immédiat, puis toutes les poll_interval
    let (feed_tx, feed_rx) = unbounded_channel::<FeedUpdate>();
    let poller = FeedPoller::spawn(&handle, api, config.poll_interval, feed_tx);

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::default();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, feed_rx);

    // Arrêt des tâches avant de rendre le terminal
    drop(poller);
    drop(app);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Event loop
// ============================================================================
// À chaque itération :
//   0. appliquer les mises à jour du bandeau
//   1. tick : résultats des requêtes, debounce, masquage différé
//   2. render
//   3. input
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    mut feed_rx: UnboundedReceiver<FeedUpdate>,
) -> Result<()> {
    while app.is_running() {
        // 0. Bandeau : on ne garde que la dernière liste reçue
        loop {
            match feed_rx.try_recv() {
                Ok(update) => app.apply_feed(update),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("Movers feed disconnected");
                    break;
                }
            }
        }

        // 1. Tick
        app.tick(Instant::now());

        // 2. Render
        terminal.draw(|frame| render(frame, app))?;

        // 3. Input
        match events.next() {
            Ok(event) => {
                let area = terminal.size()?;
                handle_event(app, event, area, Instant::now());
            }
            Err(e) => {
                error!(error = ?e, "Failed to read terminal event");
            }
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================
// CONCEPT RUST : Pattern matching avec guards
// - l'ordre des bras compte : Ctrl+C d'abord, puis le champ de recherche
//   focalisé (il capture toutes les lettres, 'q' compris)
// ============================================================================

fn handle_event(app: &mut App, event: Event, area: Rect, now: Instant) {
    if events::is_ctrl_c_event(&event) {
        info!("User pressed Ctrl+C, quitting");
        app.quit();
        return;
    }

    match &event {
        Event::Tick => {}
        Event::Mouse(_) => handle_mouse(app, &event, area, now),
        Event::Key(_) if app.is_on_home() && app.search.is_focused() => {
            handle_search_key(app, &event, now)
        }
        Event::Key(_) if app.is_on_home() => handle_home_key(app, &event),
        Event::Key(_) => handle_detail_key(app, &event),
    }
}

/// Touches quand le champ de recherche a le focus
fn handle_search_key(app: &mut App, event: &Event, now: Instant) {
    app.cancel_quit();

    if events::is_escape_event(event) {
        debug!("User left the search box");
        app.search.blur(now);
    } else if events::is_enter_event(event) {
        app.select_highlighted();
    } else if events::is_up_event(event) {
        app.search.highlight_previous();
    } else if events::is_down_event(event) {
        app.search.highlight_next();
    } else if events::is_backspace_event(event) {
        app.search.pop_char(now);
    } else if let Some(c) = events::get_char_from_event(event) {
        app.search.push_char(c, now);
    }
}

/// Touches de l'accueil, champ non focalisé
fn handle_home_key(app: &mut App, event: &Event) {
    if events::is_quit_event(event) {
        confirm_or_quit(app);
        return;
    }
    app.cancel_quit();

    if events::is_focus_search_event(event) {
        debug!("User focused the search box");
        app.search.focus();
    }
}

/// Touches de la page détail
fn handle_detail_key(app: &mut App, event: &Event) {
    if events::is_quit_event(event) {
        confirm_or_quit(app);
        return;
    }
    app.cancel_quit();

    if events::is_escape_event(event) || events::is_backspace_event(event) {
        app.back_home();
    } else if events::is_favorite_event(event) {
        app.toggle_favorite();
    } else if let Some(detail) = app.detail.as_mut() {
        if events::is_next_range_event(event) {
            detail.next_range();
        } else if events::is_previous_range_event(event) {
            detail.previous_range();
        } else if let Some(range) = events::get_range_from_event(event) {
            detail.set_range(range);
        }
    }
}

/// Two-step quit : première pression = confirmation, seconde = sortie
fn confirm_or_quit(app: &mut App) {
    if app.is_awaiting_quit_confirmation() {
        info!("User confirmed quit");
        app.quit();
    } else {
        info!("User requested quit (awaiting confirmation)");
        app.request_quit();
    }
}

/// Clics souris sur l'accueil
///
/// Un clic sur un résultat fait perdre le focus AVANT de sélectionner :
/// la sélection doit gagner sur le masquage différé.
fn handle_mouse(app: &mut App, event: &Event, area: Rect, now: Instant) {
    let Some((column, row)) = events::get_left_click(event) else {
        return;
    };
    if !app.is_on_home() {
        return;
    }
    app.cancel_quit();

    let zones = home::layout_for(area, app);
    let offset = home::results_offset(&zones, app.search.highlighted());
    match home::hit_test(&zones, app.search.results().len(), offset, column, row) {
        HomeTarget::SearchBox => app.search.focus(),
        HomeTarget::Result(index) => {
            app.search.blur(now);
            app.select_result(index);
        }
        HomeTarget::Elsewhere => app.search.blur(now),
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal en mode TUI (raw mode, alternate screen, souris)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal dans son état initial
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

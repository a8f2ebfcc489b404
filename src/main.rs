mod app;
mod cli;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::cli::CliAction;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::PeriodicRefresher;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use kickoff_api::Coordinates;
use kickoff_api::client::{IpGeolocation, KickoffApi};
use log::{error, info};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = AppSettings::load();

    match cli::parse_args(std::env::args().skip(1)) {
        Ok(CliAction::Run) => {}
        Ok(CliAction::Exit(text)) => {
            println!("{text}");
            return Ok(());
        }
        Ok(CliAction::Create(path)) => return cli::create_match(&path, &settings).await,
        Ok(CliAction::Profile(path)) => return cli::save_profile(&path, &settings).await,
        Err(usage) => {
            eprintln!("{usage}");
            std::process::exit(2);
        }
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(settings.log_level)?;
    tui_logger::set_default_level(settings.log_level);
    info!("using match service at {}", settings.api_base);

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_task = spawn_network_worker(&settings, network_req_rx, network_resp_tx);

    // Periodic feed refresh thread (every 60s)
    let periodic_updater = PeriodicRefresher::new(ui_event_tx.clone());
    let periodic_task = tokio::spawn(periodic_updater.run());

    let app = Arc::new(Mutex::new(App::new(settings)));

    // Trigger initial loads on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();
    periodic_task.abort();

    Ok(())
}

/// A fixed pin wins over IP lookup; with neither, distances are disabled.
fn spawn_network_worker(
    settings: &AppSettings,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
) -> JoinHandle<()> {
    let client = KickoffApi::new(settings.api_base.clone());
    let email = settings.viewer_email.clone();
    match settings.location {
        Some(pin) => {
            let worker = NetworkWorker::new(client, Some(pin), email, requests, responses);
            tokio::spawn(worker.run())
        }
        None if settings.geoip => {
            let worker =
                NetworkWorker::new(client, IpGeolocation::new(), email, requests, responses);
            tokio::spawn(worker.run())
        }
        None => {
            let worker =
                NetworkWorker::new(client, None::<Coordinates>, email, requests, responses);
            tokio::spawn(worker.run())
        }
    }
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }
        }
    }
}

async fn request_matches(app: &Arc<Mutex<App>>, network_requests: &mpsc::Sender<NetworkRequest>) {
    let generation = app.lock().await.next_fetch_generation();
    let _ = network_requests
        .send(NetworkRequest::LoadMatches { generation })
        .await;
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let has_viewer = app.lock().await.has_viewer();
            let _ = network_requests.send(NetworkRequest::LocateViewer).await;
            request_matches(app, network_requests).await;
            if has_viewer {
                let _ = network_requests.send(NetworkRequest::LoadProfile).await;
            }
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
        UiEvent::RefreshTick => {
            request_matches(app, network_requests).await;
            true
        }
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::MatchesLoaded { generation, snapshot } => {
            app.lock().await.on_matches_loaded(generation, snapshot);
        }
        NetworkResponse::LocationResolved { location } => {
            app.lock().await.on_location_resolved(location);
        }
        NetworkResponse::ProfileLoaded { profile } => {
            app.lock().await.on_profile_loaded(profile);
        }
        NetworkResponse::RosterLoaded { match_id, roster } => {
            app.lock().await.on_roster_loaded(match_id, roster);
        }
        NetworkResponse::MatchJoined { match_id, roster } => {
            app.lock().await.on_match_joined(match_id, roster);
            request_matches(app, network_requests).await;
        }
        NetworkResponse::MatchLeft { match_id } => {
            app.lock().await.on_match_left(match_id);
            request_matches(app, network_requests).await;
        }
        NetworkResponse::MatchDeleted { match_id } => {
            app.lock().await.on_match_deleted(match_id);
            request_matches(app, network_requests).await;
        }
        NetworkResponse::Error { message } => {
            error!("Network error: {message}");
            app.lock().await.on_error(message);
        }
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}

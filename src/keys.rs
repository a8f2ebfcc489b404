use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    if let (Char('c'), KeyModifiers::CONTROL) = (key_event.code, key_event.modifiers) {
        crate::cleanup_terminal();
        std::process::exit(0);
    }

    if guard.state.feed.composing_search {
        let feed = &mut guard.state.feed;
        match key_event.code {
            Char(c) => feed.push_search(c),
            KeyCode::Backspace => feed.pop_search(),
            KeyCode::Enter => feed.composing_search = false,
            KeyCode::Esc => {
                feed.search.clear();
                feed.selected = 0;
                feed.composing_search = false;
            }
            _ => {}
        }
        return;
    }

    if guard.state.detail.confirm_delete {
        guard.state.detail.confirm_delete = false;
        if let (Char('y'), Some(match_id)) =
            (key_event.code, guard.state.detail.match_id().map(str::to_string))
        {
            drop(guard);
            let _ = network_requests
                .send(NetworkRequest::DeleteMatch { match_id })
                .await;
        }
        return;
    }

    let mut request = None;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Matches),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Detail),
        (_, Char('3'), _) => {
            guard.update_tab(MenuItem::Profile);
            if !guard.state.profile.loaded {
                request = Some(NetworkRequest::LoadProfile);
            }
        }
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Feed
        (MenuItem::Matches, Char('l') | KeyCode::Right, _) => guard.state.feed.next_day(),
        (MenuItem::Matches, Char('h') | KeyCode::Left, _) => guard.state.feed.prev_day(),
        (MenuItem::Matches, Char('j') | KeyCode::Down, _) => guard.select_next(),
        (MenuItem::Matches, Char('k') | KeyCode::Up, _) => guard.select_prev(),
        (MenuItem::Matches, Char('m'), _) => guard.state.feed.toggle_scope(),
        (MenuItem::Matches, Char('/'), _) => guard.state.feed.composing_search = true,
        (MenuItem::Matches, KeyCode::Esc, _) => {
            guard.state.feed.search.clear();
            guard.state.feed.selected = 0;
        }
        (MenuItem::Matches, Char('r'), _) => {
            let generation = guard.next_fetch_generation();
            request = Some(NetworkRequest::LoadMatches { generation });
        }
        (MenuItem::Matches, KeyCode::Enter, _) => {
            if let Some(match_id) = guard.open_selected()
                && guard.has_viewer()
            {
                request = Some(NetworkRequest::LoadRoster { match_id });
            }
        }

        // Match detail
        (MenuItem::Detail, Char('j') | KeyCode::Down, _) => {
            guard.state.detail.scroll_offset = guard.state.detail.scroll_offset.saturating_add(1);
        }
        (MenuItem::Detail, Char('k') | KeyCode::Up, _) => {
            guard.state.detail.scroll_offset = guard.state.detail.scroll_offset.saturating_sub(1);
        }
        (MenuItem::Detail, Char('a'), _) => {
            request = guard
                .state
                .detail
                .match_id()
                .map(|id| NetworkRequest::JoinMatch { match_id: id.to_string() });
        }
        (MenuItem::Detail, Char('x'), _) => {
            request = guard
                .state
                .detail
                .match_id()
                .map(|id| NetworkRequest::LeaveMatch { match_id: id.to_string() });
        }
        (MenuItem::Detail, Char('d'), _) => {
            if guard.can_delete() {
                guard.state.detail.confirm_delete = true;
            }
        }
        (MenuItem::Detail, KeyCode::Esc, _) => guard.update_tab(MenuItem::Matches),

        // Profile
        (MenuItem::Profile, Char('r'), _) => request = Some(NetworkRequest::LoadProfile),

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    if let Some(request) = request {
        drop(guard);
        let _ = network_requests.send(request).await;
    }
}

use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::date_strip::DateStrip;
use crate::components::match_card::{CARD_HEIGHT, MatchCard};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use kickoff_api::{FeedEntry, Scope};
use log::error;

static TABS: &[&str; 3] = &["Matches", "Match", "Profile"];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);
    let entries = app.feed_entries();

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Matches => draw_feed(f, layout.main, app, &entries),
            MenuItem::Detail => draw_detail(f, layout.main, app),
            MenuItem::Profile => draw_profile(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }
        draw_status(f, layout.status, app);
        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        error!("failed to draw frame: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Matches => 0,
        MenuItem::Detail => 1,
        MenuItem::Profile => 2,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

// ---------------------------------------------------------------------------
// Matches tab
// ---------------------------------------------------------------------------

fn draw_feed(f: &mut Frame, area: Rect, app: &App, entries: &[FeedEntry]) {
    let feed = &app.state.feed;
    let block = default_border(Color::White).title(format!(" {} ", feed.scope.label()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [header, strip, search, _gap, list] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(inner);

    let selected_date = feed.selected_date();
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                selected_date.format("%A %d %B").to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {} matches", entries.len()),
                Style::default().fg(Color::DarkGray),
            ),
        ])),
        header,
    );

    let days = feed.days();
    f.render_widget(
        DateStrip { days: &days, selected: feed.selected_day, today: feed.today },
        strip,
    );

    let search_line = if feed.composing_search {
        Line::from(vec![
            Span::styled("Search: ", Style::default().fg(Color::Yellow)),
            Span::raw(format!("{}_", feed.search)),
        ])
    } else if !feed.search.is_empty() {
        Line::from(vec![
            Span::styled("Search: ", Style::default().fg(Color::DarkGray)),
            Span::raw(feed.search.clone()),
            Span::styled("  (Esc clears)", Style::default().fg(Color::DarkGray)),
        ])
    } else {
        Line::from(Span::styled(
            "h/l=day  j/k=move  Enter=open  m=mine/all  /=search  r=refresh",
            Style::default().fg(Color::DarkGray),
        ))
    };
    f.render_widget(Paragraph::new(search_line), search);

    if entries.is_empty() {
        let msg = if !feed.loaded {
            match app.state.last_error.as_deref() {
                Some(err) => format!("Could not load matches:\n{err}"),
                None => "Loading matches...".to_string(),
            }
        } else if feed.scope == Scope::Mine && app.settings.viewer_email.is_none() {
            "Set KICKOFF_EMAIL to see the matches you created.".to_string()
        } else if !feed.search.is_empty() {
            format!("No matches for \"{}\" on this day.", feed.search)
        } else {
            "No matches on this day.".to_string()
        };
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            list,
        );
        return;
    }

    let visible = (list.height / CARD_HEIGHT).max(1) as usize;
    let first = feed.selected.saturating_sub(visible - 1);
    for (slot, (idx, entry)) in entries.iter().enumerate().skip(first).take(visible).enumerate() {
        let y = list.y + slot as u16 * CARD_HEIGHT;
        let height = CARD_HEIGHT.min(list.bottom().saturating_sub(y));
        if height < 3 {
            break;
        }
        f.render_widget(
            MatchCard { entry, selected: idx == feed.selected },
            Rect::new(list.x, y, list.width, height),
        );
    }
}

// ---------------------------------------------------------------------------
// Match tab
// ---------------------------------------------------------------------------

fn draw_detail(f: &mut Frame, area: Rect, app: &App) {
    let detail = &app.state.detail;
    let Some(entry) = detail.entry.as_ref() else {
        let block = default_border(Color::White).title(" Match ");
        f.render_widget(
            Paragraph::new("Pick a match on the Matches tab and press Enter.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
        return;
    };
    let game = &entry.game;
    let label = Style::default().fg(Color::DarkGray);
    let row = |name: &'static str, value: String| {
        Line::from(vec![Span::styled(format!("{name:<10}"), label), Span::raw(value)])
    };

    let mut lines = vec![
        row("Date", game.date.format("%A %d %B %Y").to_string()),
        row("Time", game.time_range_label()),
        row("Where", game.location.clone()),
    ];
    if let Some(distance) = entry.distance_label() {
        lines.push(row("Distance", distance));
    }
    if let Some(url) = game.maps_url() {
        lines.push(row("Map", url));
    }
    lines.push(row("Price", format!("{:.0} MAD", game.price)));
    let format = game.format().map(|f| f.label().to_string()).unwrap_or_default();
    lines.push(row(
        "Places",
        format!("{format} {} / {} · {}", game.joined_players.len(), game.capacity, entry.places_label())
            .trim()
            .to_string(),
    ));
    if let Some(creator) = game.creator_email.as_deref() {
        lines.push(row("Organizer", creator.to_string()));
    }
    if let Some(link) = game.communication_link.as_deref() {
        lines.push(row("Group", link.to_string()));
    }
    if !game.description.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(game.description.clone()));
    }

    lines.push(Line::default());
    let players = detail
        .roster
        .as_ref()
        .map(|r| r.players.as_slice())
        .unwrap_or(game.joined_players.as_slice());
    lines.push(Line::from(Span::styled(
        format!("Players ({})", players.len()),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    if players.is_empty() {
        lines.push(Line::from(Span::styled("Nobody yet.", label)));
    }
    for player in players {
        lines.push(Line::from(format!("  {}", player.display_name())));
    }

    lines.push(Line::default());
    let mut actions = Vec::new();
    if app.has_viewer() {
        if app.viewer_has_joined() {
            actions.push("x=leave");
        } else if !entry.is_full {
            actions.push("a=join");
        }
        if app.can_delete() {
            actions.push("d=delete");
        }
    } else {
        actions.push("set KICKOFF_EMAIL to join");
    }
    actions.push("Esc=back");
    lines.push(Line::from(Span::styled(actions.join("  "), label)));

    let border = if detail.confirm_delete { Color::Red } else { Color::White };
    let block = default_border(border).title(Line::from(Span::styled(
        format!(" {} ", game.name),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((detail.scroll_offset, 0)),
        area,
    );
}

// ---------------------------------------------------------------------------
// Profile and help
// ---------------------------------------------------------------------------

fn draw_profile(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Profile ");
    let label = Style::default().fg(Color::DarkGray);

    let lines = match (app.settings.viewer_email.as_deref(), &app.state.profile) {
        (None, _) => vec![Line::from("Set KICKOFF_EMAIL to see your profile.")],
        (Some(_), profile) if !profile.loaded => vec![Line::from("Loading profile...")],
        (Some(email), profile) => match profile.profile.as_ref() {
            None => vec![
                Line::from(format!("No profile found for {email}.")),
                Line::from("Create one with `kickoff profile <profile.json>`, then press r."),
            ],
            Some(p) => {
                let row = |name: &'static str, value: String| {
                    Line::from(vec![Span::styled(format!("{name:<12}"), label), Span::raw(value)])
                };
                let mut lines = vec![
                    row("Name", p.full_name()),
                    row("Email", p.email.clone()),
                    row("Phone", p.phone.clone()),
                ];
                if let Some(birth) = p.birth_date {
                    lines.push(row("Born", birth.format("%d/%m/%Y").to_string()));
                }
                if let Some(gender) = p.gender.as_deref() {
                    lines.push(row("Gender", gender.to_string()));
                }
                lines
            }
        },
    };

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::White).title(" Help ");
    let key = Style::default().fg(Color::Yellow);
    let rows: &[(&str, &str)] = &[
        ("1 2 3", "Matches, Match, Profile tabs"),
        ("h/l ←/→", "previous / next day"),
        ("j/k ↑/↓", "move selection or scroll"),
        ("Enter", "open the selected match"),
        ("m", "toggle open matches / my matches"),
        ("/", "search by name or place (Enter keeps, Esc clears)"),
        ("r", "refresh"),
        ("a / x", "join / leave the open match"),
        ("d", "delete a match you created"),
        ("f", "full screen"),
        ("\"", "show logs"),
        ("q", "quit"),
    ];
    let lines: Vec<Line> = rows
        .iter()
        .map(|(k, v)| Line::from(vec![Span::styled(format!("{k:<10}"), key), Span::raw(*v)]))
        .collect();
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(logs, area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let line = if app.state.detail.confirm_delete {
        Line::from(Span::styled(
            " Delete this match? y to confirm, any other key cancels",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
    } else if let Some(err) = app.state.last_error.as_deref() {
        Line::from(Span::styled(format!(" {err}"), Style::default().fg(Color::Red)))
    } else if let Some(notice) = app.state.notice.as_deref() {
        Line::from(Span::styled(format!(" {notice}"), Style::default().fg(Color::Green)))
    } else {
        let who = app.settings.viewer_email.as_deref().unwrap_or("anonymous");
        let skipped = app.state.feed.skipped;
        let mut text = format!(" {who}");
        if skipped > 0 {
            text.push_str(&format!(" · {skipped} unreadable matches hidden"));
        }
        Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

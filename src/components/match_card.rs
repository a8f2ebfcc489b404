use kickoff_api::FeedEntry;
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Widget};

/// Three content rows plus borders.
pub const CARD_HEIGHT: u16 = 5;

pub struct MatchCard<'a> {
    pub entry: &'a FeedEntry,
    pub selected: bool,
}

/// Short status shown in the card's top-right corner.
pub fn status_label(entry: &FeedEntry) -> String {
    if entry.is_in_progress() {
        format!("Playing now · {}", entry.places_label())
    } else {
        entry.places_label()
    }
}

pub fn where_label(entry: &FeedEntry) -> String {
    let place = entry.game.short_location();
    let place = if place.is_empty() { entry.game.location.clone() } else { place };
    match entry.distance_label() {
        Some(distance) if place.is_empty() => distance,
        Some(distance) => format!("{place} · {distance}"),
        None => place,
    }
}

pub fn details_label(entry: &FeedEntry) -> String {
    let game = &entry.game;
    let format = game
        .format()
        .map(|f| f.label().to_string())
        .unwrap_or_else(|| format!("{} players", game.capacity));
    let joined = game.joined_players.len();
    format!("{format} · {joined}/{} joined · {:.0} MAD", game.capacity, game.price)
}

impl Widget for MatchCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let entry = self.entry;
        let border = if self.selected { Color::Green } else { Color::DarkGray };
        let status_color = if entry.is_full {
            Color::Red
        } else if entry.is_in_progress() {
            Color::Yellow
        } else {
            Color::Green
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(Line::from(Span::styled(
                format!(" {} ", entry.game.name),
                Style::default().add_modifier(Modifier::BOLD),
            )))
            .title(
                Line::from(Span::styled(
                    format!(" {} ", status_label(entry)),
                    Style::default().fg(status_color),
                ))
                .right_aligned(),
            );

        let lines = vec![
            Line::from(vec![
                Span::styled(
                    entry.game.time_range_label(),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw("  "),
                Span::raw(where_label(entry)),
            ]),
            Line::from(Span::styled(
                details_label(entry),
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                entry.game.description.clone(),
                Style::default().fg(Color::DarkGray),
            )),
        ];

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

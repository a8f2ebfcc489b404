use chrono::{Datelike, NaiveDate};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::Widget;

/// Columns taken by one day cell, gap included: "Tue 10 ".
pub const DAY_CELL_WIDTH: u16 = 7;

/// Horizontal strip of selectable days. Scrolls so the selected day stays on screen.
pub struct DateStrip<'a> {
    pub days: &'a [NaiveDate],
    pub selected: usize,
    pub today: NaiveDate,
}

impl DateStrip<'_> {
    /// First visible day index for a strip that fits `visible` cells.
    pub fn first_visible(&self, visible: usize) -> usize {
        if visible == 0 || self.days.len() <= visible {
            return 0;
        }
        let max_first = self.days.len() - visible;
        self.selected.saturating_sub(visible - 1).min(max_first)
    }
}

pub fn day_label(day: NaiveDate, today: NaiveDate) -> String {
    if day == today {
        "Today ".to_string()
    } else {
        format!("{} {:02}", day.format("%a"), day.day())
    }
}

impl Widget for DateStrip<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < DAY_CELL_WIDTH || area.height == 0 {
            return;
        }
        let visible = (area.width / DAY_CELL_WIDTH) as usize;
        let first = self.first_visible(visible);

        for (slot, (idx, day)) in self
            .days
            .iter()
            .enumerate()
            .skip(first)
            .take(visible)
            .enumerate()
        {
            let style = if idx == self.selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else if day.weekday().num_days_from_monday() >= 5 {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Gray)
            };
            let x = area.x + slot as u16 * DAY_CELL_WIDTH;
            buf.set_stringn(
                x,
                area.y,
                day_label(*day, self.today),
                (DAY_CELL_WIDTH - 1) as usize,
                style,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn selected_day_stays_visible() {
        let days: Vec<NaiveDate> = (1..=21).map(day).collect();
        let strip = |selected| DateStrip { days: &days, selected, today: day(1) };

        assert_eq!(strip(0).first_visible(7), 0);
        assert_eq!(strip(6).first_visible(7), 0);
        assert_eq!(strip(7).first_visible(7), 1);
        assert_eq!(strip(20).first_visible(7), 14);
        assert_eq!(strip(20).first_visible(30), 0);
    }

    #[test]
    fn labels_today_specially() {
        assert_eq!(day_label(day(10), day(10)), "Today ");
        assert_eq!(day_label(day(11), day(10)), "Wed 11");
    }
}

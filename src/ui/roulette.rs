use std::ops::Range;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::{accent_color, bold, centered_rows, gold_bold, hint};
use crate::{app::RouletteState, catalog::Catalog};

const SEPARATOR: &str = " · ";

pub fn render(state: &RouletteState, catalog: Catalog, area: Rect, buf: &mut Buffer) {
    let highlight = match state {
        RouletteState::Spinning { highlight, .. } => Some(*highlight),
        RouletteState::Revealed { result, .. } => catalog
            .subjects()
            .iter()
            .position(|s| s.name == result.subject),
        RouletteState::Ready => None,
    };

    let mut lines = vec![
        wheel_line(catalog, highlight, area.width.saturating_sub(2)),
        Line::default(),
    ];

    match state {
        RouletteState::Ready => {
            lines.push(Line::from(Span::styled("STUDY CASINO", bold().fg(Color::LightMagenta))));
            lines.push(Line::from(Span::styled(
                "Spin to discover your next study session!",
                Style::default().fg(Color::Gray),
            )));
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "[Enter] SPIN THE WHEEL 🎰",
                gold_bold().add_modifier(Modifier::REVERSED),
            )));
            lines.push(Line::default());
            lines.push(Line::from(Span::styled("(b) back  (q) quit", hint())));
        }
        RouletteState::Spinning { .. } => {
            lines.push(Line::from(Span::styled("SPINNING...", gold_bold())));
            lines.push(Line::from(Span::styled(
                "Let fate decide your academic destiny!",
                Style::default().fg(Color::Gray),
            )));
        }
        RouletteState::Revealed { result, .. } => {
            let color = catalog
                .find(&result.subject)
                .map(|s| accent_color(s.accent))
                .unwrap_or(Color::Yellow);
            lines.push(Line::from(Span::styled("🎉 JACKPOT! 🎉", gold_bold())));
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(result.subject.clone(), bold().fg(color))));
            lines.push(Line::from(Span::styled(
                format!("{} minutes", result.minutes),
                gold_bold(),
            )));
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                format!(
                    "Get ready to study {} for {} minutes",
                    result.subject, result.minutes
                ),
                Style::default().fg(Color::Gray),
            )));
            lines.push(Line::from(Span::styled("(Enter) go now", hint())));
        }
    }

    let height = lines.len() as u16 + 2;
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Roulette"))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(centered_rows(area, height), buf);
}

fn wheel_line(catalog: Catalog, highlight: Option<usize>, max_width: u16) -> Line<'static> {
    let subjects = catalog.subjects();
    let widths: Vec<usize> = subjects.iter().map(|s| s.name.width()).collect();
    let visible = visible_window(&widths, highlight.unwrap_or(0), max_width as usize);

    let mut spans = Vec::new();
    for idx in visible {
        if !spans.is_empty() {
            spans.push(Span::styled(SEPARATOR, Style::default().fg(Color::DarkGray)));
        }
        let subject = &subjects[idx];
        let style = if Some(idx) == highlight {
            bold()
                .fg(Color::Black)
                .bg(accent_color(subject.accent))
        } else {
            Style::default()
                .fg(accent_color(subject.accent))
                .add_modifier(Modifier::DIM)
        };
        spans.push(Span::styled(subject.name, style));
    }
    Line::from(spans)
}

/// Largest run of entries around `center` whose rendered width fits `max_width`
fn visible_window(widths: &[usize], center: usize, max_width: usize) -> Range<usize> {
    if widths.is_empty() {
        return 0..0;
    }
    let center = center.min(widths.len() - 1);
    let sep = SEPARATOR.width();

    let mut range = center..center + 1;
    let mut used = widths[center];
    loop {
        let mut grew = false;
        if range.end < widths.len() && used + sep + widths[range.end] <= max_width {
            used += sep + widths[range.end];
            range.end += 1;
            grew = true;
        }
        if range.start > 0 && used + sep + widths[range.start - 1] <= max_width {
            used += sep + widths[range.start - 1];
            range.start -= 1;
            grew = true;
        }
        if !grew {
            return range;
        }
    }
}

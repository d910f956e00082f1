use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use super::{bold, centered_rows, gold_bold, hint};

pub fn render(area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::from(Span::styled(
            "S T U D Y   C A S I N O",
            bold().fg(Color::LightMagenta),
        )),
        Line::default(),
        Line::from(Span::styled("Where every study session is a jackpot! 🎰", gold_bold())),
        Line::default(),
        Line::from(Span::styled(
            "Spin the wheel, earn tokens, build streaks and hit your weekly goal.",
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            "Knowledge has never been this rewarding!",
            Style::default().fg(Color::Gray),
        )),
        Line::default(),
        Line::from(Span::styled(
            "[Enter] START PLAYING",
            gold_bold().add_modifier(Modifier::REVERSED),
        )),
        Line::default(),
        Line::from(Span::styled("(q) quit", hint())),
    ];

    let height = lines.len() as u16;
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(centered_rows(area, height), buf);
}

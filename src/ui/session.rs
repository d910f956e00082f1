use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use super::{accent_color, bold, gold_bold, hint};
use crate::{
    catalog::Catalog,
    countdown::{format_clock, Phase},
    proof::MIN_PROOF_CHARS,
    session::StudySession,
};

pub fn render(session: &StudySession, catalog: Catalog, area: Rect, buf: &mut Buffer) {
    match session.phase() {
        Phase::Idle | Phase::Running => render_timer(session, catalog, area, buf),
        Phase::Expired => render_proof(session, area, buf),
    }
}

fn render_timer(session: &StudySession, catalog: Catalog, area: Rect, buf: &mut Buffer) {
    let spin = session.spin();
    let countdown = session.countdown();
    let color = catalog
        .find(&spin.subject)
        .map(|s| accent_color(s.accent))
        .unwrap_or(Color::Yellow);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(3), // clock
            Constraint::Length(3), // progress
            Constraint::Min(4),    // rules / lock notice
            Constraint::Length(1), // keys
        ])
        .split(area);

    Paragraph::new(vec![
        Line::from(Span::styled(format!("{} Session", spin.subject), bold().fg(color))),
        Line::from(Span::styled(
            format!("{} minute study session", spin.minutes),
            gold_bold(),
        )),
    ])
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    Paragraph::new(Span::styled(
        format_clock(countdown.remaining_secs()),
        gold_bold(),
    ))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(color))
        .ratio(countdown.progress().clamp(0.0, 1.0))
        .label(format!("{:.0}%", countdown.progress() * 100.0))
        .render(chunks[2], buf);

    let (body, keys) = if countdown.is_running() {
        let mut lines = vec![
            Line::from(Span::styled("🚫 PHONE LOCKED", bold().fg(Color::Red))),
            Line::from("📱 Focus time! Stay on task until the session ends."),
        ];
        if let Some(reminder) = session.reminder() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                reminder,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            )));
        }
        (
            lines,
            "(x) abandon and start over  (esc) emergency exit, loses progress",
        )
    } else {
        (
            vec![
                Line::from(Span::styled("📱 Session Rules:", gold_bold())),
                Line::from("• Your phone is \"locked\" during the session"),
                Line::from(format!(
                    "• Focus completely on {} for {} minutes",
                    spin.subject, spin.minutes
                )),
                Line::from("• Take notes, solve problems, or read actively"),
                Line::from("• Submit proof of study when the timer ends"),
            ],
            "(enter) 🔒 lock phone & start  (b) back to wheel",
        )
    };

    Paragraph::new(body)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    Paragraph::new(Span::styled(keys, hint()))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
}

fn render_proof(session: &StudySession, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // headline
            Constraint::Min(5),    // notes
            Constraint::Length(2), // counter / error
            Constraint::Length(1), // keys
        ])
        .split(area);

    Paragraph::new(vec![
        Line::from(Span::styled("🎯 TIME'S UP! 🎯", gold_bold())),
        Line::from(Span::styled(
            "Prove you studied to unlock your rewards!",
            Style::default().fg(Color::Yellow),
        )),
    ])
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let mut text = session.proof_text().to_string();
    text.push('▏');
    Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("What did you learn? Notes, insights, key takeaways"),
        )
        .wrap(Wrap { trim: false })
        .render(chunks[1], buf);

    let chars = session.proof_chars();
    let status = match session.proof_error() {
        Some(err) => Line::from(Span::styled(err.to_string(), bold().fg(Color::Red))),
        None if chars >= MIN_PROOF_CHARS => Line::from(Span::styled(
            format!("{chars} characters, ready to claim"),
            Style::default().fg(Color::Green),
        )),
        None => Line::from(Span::styled(
            format!("{chars}/{MIN_PROOF_CHARS} characters"),
            Style::default().fg(Color::Gray),
        )),
    };
    Paragraph::new(status)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        "(enter) submit proof & claim rewards 💰  (esc) back to wheel",
        hint(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);
}

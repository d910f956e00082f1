pub mod dashboard;
pub mod roulette;
pub mod session;
pub mod welcome;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::Widget,
    Frame,
};

use crate::{
    app::{App, View},
    catalog::Accent,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

pub fn draw(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([Constraint::Min(0)])
            .split(area)[0];

        match self.view() {
            View::Welcome => welcome::render(area, buf),
            View::Roulette(state) => roulette::render(state, self.selector().catalog(), area, buf),
            View::Session(session) => session::render(session, self.selector().catalog(), area, buf),
            View::Dashboard(dashboard) => dashboard::render(dashboard, self.settings(), area, buf),
        }
    }
}

pub(crate) fn accent_color(accent: Accent) -> Color {
    match accent {
        Accent::Gold => Color::Yellow,
        Accent::Purple => Color::Magenta,
        Accent::Pink => Color::LightMagenta,
        Accent::Green => Color::Green,
        Accent::Blue => Color::LightBlue,
    }
}

pub(crate) fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub(crate) fn gold_bold() -> Style {
    bold().fg(Color::Yellow)
}

pub(crate) fn hint() -> Style {
    Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC)
}

/// Split `area` vertically, centring a block of `height` rows
pub(crate) fn centered_rows(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    let top = (area.height - height) / 2;
    Rect {
        x: area.x,
        y: area.y + top,
        width: area.width,
        height,
    }
}

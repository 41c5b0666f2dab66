use crate::ui::{centered_rect, theme::Theme};
use crate::util::human::fmt_bytes;
use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
    layout::{Constraint, Direction, Layout},
    Frame,
};

/// New-drive capacity picker: a percentage of the pool, moved in fixed steps.
#[derive(Debug, Clone, PartialEq)]
pub struct SizePicker {
    pool_bytes: u64,
    percent:    u32,
    step:       u32,
}

impl SizePicker {
    pub fn new(pool_bytes: u64, percent: u32, step: u32) -> Self {
        let step = step.clamp(1, 100);
        Self { pool_bytes, percent: percent.clamp(step, 100), step }
    }

    pub fn increase(&mut self) {
        self.percent = (self.percent + self.step).min(100);
    }

    pub fn decrease(&mut self) {
        self.percent = self.percent.saturating_sub(self.step).max(self.step);
    }

    pub fn percent(&self) -> u32 { self.percent }

    /// Requested size, rounded up to whole 512-byte sectors.
    pub fn size_bytes(&self) -> u64 {
        let bytes = (self.pool_bytes as f64 * f64::from(self.percent) / 100.0) as u64;
        bytes.div_ceil(512).saturating_mul(512)
    }
}

pub fn render(f: &mut Frame, picker: &SizePicker, theme: &Theme) {
    let area = centered_rect(44, 7, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_focused)
        .title(Span::styled(" New drive capacity ", theme.title));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let label = Line::from(vec![
        Span::styled(format!("  {:>3}%  ", picker.percent()), theme.title),
        Span::styled(fmt_bytes(picker.size_bytes()), theme.text),
    ]);
    f.render_widget(Paragraph::new(label), rows[0]);

    let fraction = f64::from(picker.percent()) / 100.0;
    f.render_widget(
        Gauge::default().gauge_style(theme.pool_style(fraction)).ratio(fraction).label(""),
        rows[1],
    );

    f.render_widget(
        Paragraph::new(Span::styled("  ↑↓ size   Enter format   Esc cancel", theme.text_dim)),
        rows[3],
    );
}

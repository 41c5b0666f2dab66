use crate::capacity::CapacityReading;
use crate::ui::theme::Theme;
use crate::util::human::{fmt_bytes, fmt_fraction};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

pub fn render_capacity(f: &mut Frame, area: Rect, reading: &CapacityReading, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(Span::styled("Pool Usage", theme.title));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.height == 0 { return; }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    match reading {
        CapacityReading::Known { fraction, usage } => {
            let style = theme.pool_style(*fraction);
            let label = Line::from(vec![
                Span::styled(format!(" used {}", fmt_bytes(usage.allocated)), style),
                Span::styled(format!("  of {}", fmt_bytes(usage.total)), theme.text_dim),
                Span::styled(format!("  free {}", fmt_bytes(usage.free())), theme.text_dim),
            ]);
            f.render_widget(Paragraph::new(label), rows[0]);

            let gauge = Gauge::default()
                .gauge_style(style)
                .ratio(fraction.clamp(0.0, 1.0))
                .label(fmt_fraction(*fraction));
            f.render_widget(gauge, rows[1]);
        }
        CapacityReading::Unknown => {
            f.render_widget(
                Paragraph::new(Span::styled(" capacity: unknown", theme.text_dim)),
                rows[0],
            );
        }
    }
}

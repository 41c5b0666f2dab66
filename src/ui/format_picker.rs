use crate::models::format::DriveFormat;
use crate::ui::{centered_rect, theme::Theme};
use crate::util::human::fmt_bytes;
use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, selected: DriveFormat, size_bytes: u64, theme: &Theme) {
    let area = centered_rect(44, 10, f.area());
    f.render_widget(Clear, area);

    let title = format!(" Format new {} drive ", fmt_bytes(size_bytes));
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_focused)
        .title(Span::styled(title, theme.title));

    let mut lines = vec![Line::from("")];
    for format in DriveFormat::ALL {
        lines.push(if format == selected {
            Line::from(Span::styled(format!("  ▶ {}", format.label()), theme.selected))
        } else {
            Line::from(Span::styled(format!("    {}", format.label()), theme.text))
        });
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  ↑↓ format   Enter create   Esc size",
        theme.text_dim,
    )));

    f.render_widget(Paragraph::new(lines).block(block), area);
}

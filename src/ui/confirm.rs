use crate::ui::{centered_rect, theme::Theme};
use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, drive_name: &str, theme: &Theme) {
    let area = centered_rect(44, 6, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.crit)
        .title(Span::styled(" Remove drive ", theme.title));

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Destroy ", theme.text),
            Span::styled(drive_name.to_string(), theme.crit),
            Span::styled(" and all its data?", theme.text),
        ]),
        Line::from(Span::styled("  y / Enter to remove, Esc to keep", theme.text_dim)),
    ];

    f.render_widget(Paragraph::new(lines).block(block), area);
}

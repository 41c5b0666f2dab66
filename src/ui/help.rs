use crate::ui::{centered_rect, theme::Theme};
use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, theme: &Theme) {
    let area = centered_rect(52, 18, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_focused)
        .title(Span::styled(" Keybindings (? or Esc to close) ", theme.title));

    let lines = vec![
        key_line(theme, "Navigation", ""),
        key_line(theme, "  ↑↓ / j k",      "Previous / next entry (wraps)"),
        key_line(theme, "  Tab / S-Tab",    "Next / previous entry"),
        key_line(theme, "  Enter / l",      "Open entry"),
        key_line(theme, "  Esc / h",        "Back / cancel"),
        Line::from(""),
        key_line(theme, "Drives", ""),
        key_line(theme, "  n",              "New drive (size, then format)"),
        key_line(theme, "  d / Del",        "Remove selected drive"),
        key_line(theme, "  r",              "Rescan the thin pool"),
        Line::from(""),
        key_line(theme, "Other", ""),
        key_line(theme, "  t",              "Cycle color theme"),
        key_line(theme, "  q / Ctrl-C",     "Quit"),
    ];

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn key_line<'a>(theme: &Theme, key: &'a str, desc: &'a str) -> Line<'a> {
    if desc.is_empty() {
        return Line::from(Span::styled(key, theme.title));
    }
    Line::from(vec![
        Span::styled(format!("{:<16}", key), theme.footer_key),
        Span::styled(desc, theme.text),
    ])
}

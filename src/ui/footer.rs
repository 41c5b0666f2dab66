use crate::app::Mode;
use crate::ui::theme::Theme;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render_footer(f: &mut Frame, area: Rect, mode: &Mode, theme: &Theme) {
    let keys: &[(&str, &str)] = match mode {
        Mode::Browse => &[
            ("↑↓/jk", "Select"), ("Enter", "Open"), ("n", "New"), ("d", "Remove"),
            ("r", "Rescan"), ("t", "Theme"), ("?", "Help"), ("q", "Quit"),
        ],
        Mode::PickingSize(_) => &[
            ("↑↓", "Size"), ("Enter", "Next"), ("Esc", "Cancel"),
        ],
        Mode::PickingFormat { .. } => &[
            ("↑↓", "Format"), ("Enter", "Create"), ("Esc", "Size"),
        ],
        Mode::ConfirmRemove { .. } => &[
            ("y/Enter", "Remove"), ("Esc", "Keep"),
        ],
    };

    let mut spans: Vec<Span> = vec![Span::styled(" ", theme.footer_bg)];
    for (key, desc) in keys {
        spans.push(Span::styled(format!(" {} ", key), theme.footer_key));
        spans.push(Span::styled(format!("{}  ", desc), theme.footer_text));
    }

    f.render_widget(Paragraph::new(Line::from(spans)).style(theme.footer_bg), area);
}

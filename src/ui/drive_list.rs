use crate::navigable::{PoolSummary, RowKind, SummaryRow};
use crate::ui::theme::Theme;
use crate::util::human::fmt_bytes;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

pub fn render_drive_list(
    f: &mut Frame,
    area: Rect,
    summary: &PoolSummary,
    state: &mut ListState,
    theme: &Theme,
) {
    let title = format!("Drives  ({} total)", summary.drive_count());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_focused)
        .title(Span::styled(title, theme.title));

    let items: Vec<ListItem> = summary.rows.iter().map(|r| row(r, theme)).collect();

    // Nothing highlighted when the selection is empty.
    state.select(summary.selected);

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.selected)
        .highlight_symbol("▶ ");

    f.render_stateful_widget(list, area, state);
}

fn row(r: &SummaryRow, theme: &Theme) -> ListItem<'static> {
    let spans = match r.kind {
        RowKind::Drive => vec![
            Span::styled(format!("  {:<16}", r.label), theme.text),
            Span::styled(
                format!("{:>10}", r.size_bytes.map(fmt_bytes).unwrap_or_default()),
                theme.text_dim,
            ),
        ],
        RowKind::Item => vec![Span::styled(format!("  + {}", r.label), theme.item)],
    };
    ListItem::new(Line::from(spans))
}

use crate::app::{App, Mode};
use crate::navigable::Navigable;
use crate::ui::{
    capacity_bar::render_capacity,
    confirm,
    drive_list::render_drive_list,
    footer::render_footer,
    format_picker,
    help,
    size_picker,
};
use crate::util::human::fmt_fraction;
use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render(f: &mut Frame, app: &mut App) {
    let area    = f.area();
    let theme   = app.theme.clone();
    let summary = app.multitool.render();

    // ── Root: header | body | status | footer ──────────────────────
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    // ── Header: title, pool names, clock ───────────────────────────
    let left  = " multitool ".to_string();
    let used  = summary.capacity.fraction().map(fmt_fraction).unwrap_or_else(|| "?".into());
    let pool  = format!(" {} / {}  {} used ", summary.volume_group, summary.thin_pool, used);
    let right = format!(" {} ", Local::now().format("%H:%M:%S"));
    let pad = (area.width as usize)
        .saturating_sub(left.chars().count() + pool.chars().count() + right.chars().count());

    let header = Line::from(vec![
        Span::styled(left, theme.title),
        Span::styled(pool, theme.text),
        Span::styled(" ".repeat(pad), theme.header),
        Span::styled(right, theme.text_dim),
    ]);
    f.render_widget(Paragraph::new(header).style(theme.header), root[0]);

    // ── Body: drive list above the capacity panel ──────────────────
    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(4)])
        .split(root[1]);

    render_drive_list(f, body[0], &summary, &mut app.list_state, &theme);
    render_capacity(f, body[1], &summary.capacity, &theme);

    // ── Status line ────────────────────────────────────────────────
    let status = match &app.status {
        Some(s) if s.is_error => Span::styled(format!(" ✗ {}", s.text), theme.crit),
        Some(s)               => Span::styled(format!(" {}", s.text), theme.ok),
        None                  => Span::styled("", theme.text_dim),
    };
    f.render_widget(Paragraph::new(Line::from(status)), root[2]);

    render_footer(f, root[3], &app.mode, &theme);

    // ── Overlays ───────────────────────────────────────────────────
    match &app.mode {
        Mode::PickingSize(picker) => size_picker::render(f, picker, &theme),
        Mode::PickingFormat { picker, format } => {
            format_picker::render(f, *format, picker.size_bytes(), &theme)
        }
        Mode::ConfirmRemove { name, .. } => confirm::render(f, name, &theme),
        Mode::Browse => {}
    }
    if app.show_help {
        help::render(f, &theme);
    }
}

pub mod capacity_bar;
pub mod confirm;
pub mod dashboard;
pub mod drive_list;
pub mod footer;
pub mod format_picker;
pub mod help;
pub mod size_picker;
pub mod theme;

use ratatui::layout::Rect;

/// A `width` x `height` box centred in `r`, shrunk to fit.
pub fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let w = width.min(r.width);
    let h = height.min(r.height);
    Rect::new(
        r.x + (r.width.saturating_sub(w)) / 2,
        r.y + (r.height.saturating_sub(h)) / 2,
        w, h,
    )
}

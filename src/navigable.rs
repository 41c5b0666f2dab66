use crate::capacity::CapacityReading;

/// What the GUI framework needs from a menu item.
///
/// Each navigation callback returns whether the event meant anything.
pub trait Navigable {
    fn on_select(&mut self) -> bool;
    fn on_next(&mut self) -> bool;
    fn on_prev(&mut self) -> bool;
    fn render(&self) -> PoolSummary;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Drive,
    Item,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub kind:       RowKind,
    pub label:      String,
    pub size_bytes: Option<u64>,
    pub selected:   bool,
}

/// Read-only snapshot of the pool for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolSummary {
    pub volume_group: String,
    pub thin_pool:    String,
    pub rows:         Vec<SummaryRow>,
    pub selected:     Option<usize>,
    pub capacity:     CapacityReading,
}

impl PoolSummary {
    pub fn drive_count(&self) -> usize {
        self.rows.iter().filter(|r| r.kind == RowKind::Drive).count()
    }
}

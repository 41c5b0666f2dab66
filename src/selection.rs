/// Cursor over the registry's list of entries.
///
/// Only an index is kept. The registry calls [`Selection::revalidate`] after
/// every change to the list, so `Selected(i)` always satisfies `i < len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Empty,
    Selected(usize),
}

impl Selection {
    pub fn index(&self) -> Option<usize> {
        match *self {
            Selection::Empty       => None,
            Selection::Selected(i) => Some(i),
        }
    }

    pub fn is_selected(&self) -> bool { self.index().is_some() }

    /// Advance with wraparound. Returns false when there is nothing selected.
    pub fn next(&mut self, len: usize) -> bool {
        self.step(len, 1)
    }

    /// Retreat with wraparound. Returns false when there is nothing selected.
    pub fn prev(&mut self, len: usize) -> bool {
        self.step(len, len.saturating_sub(1))
    }

    fn step(&mut self, len: usize, delta: usize) -> bool {
        match *self {
            Selection::Empty => false,
            Selection::Selected(_) if len == 0 => {
                *self = Selection::Empty;
                false
            }
            Selection::Selected(i) => {
                *self = Selection::Selected((i % len + delta) % len);
                true
            }
        }
    }

    /// Re-check the cursor after the list changed.
    ///
    /// `previous` is the entry that was selected before the change. The
    /// selection survives only if that same entry still sits at the same
    /// index; otherwise it falls back to the first entry, or to `Empty` when
    /// the list is empty.
    pub fn revalidate<K: PartialEq>(&mut self, previous: Option<&K>, entries: &[K]) {
        *self = match (*self, previous) {
            _ if entries.is_empty() => Selection::Empty,
            (Selection::Selected(i), Some(prev)) if entries.get(i) == Some(prev) => {
                Selection::Selected(i)
            }
            _ => Selection::Selected(0),
        };
    }
}

use crate::backend::VolumeBackend;
use crate::capacity;
use crate::config::PoolNames;
use crate::error::{MultitoolError, Result};
use crate::models::drive::VirtualDrive;
use crate::models::format::DriveFormat;
use crate::models::volume::{LogicalVolume, PoolUsage, VolumeId};
use crate::navigable::{Navigable, PoolSummary, RowKind, SummaryRow};
use crate::selection::Selection;
use std::collections::HashSet;

const SECTOR: u64 = 512;

/// Handle for a non-drive entry the host put in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemId(usize);

/// One position in the navigable list: drives first, then registered items.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEntry {
    Drive(VolumeId),
    Item(ItemId),
}

#[derive(Debug)]
struct RegisteredItem {
    id:    ItemId,
    label: String,
}

/// The virtual drive registry for one thin pool, plus the selection cursor
/// over its list.
///
/// Every mutation runs in the same order: backend first, then the drive
/// list, then selection re-validation. A backend error returns before the
/// list is touched.
pub struct Multitool<B: VolumeBackend> {
    names:       PoolNames,
    backend:     B,
    name_prefix: String,
    drives:      Vec<VirtualDrive>,
    items:       Vec<RegisteredItem>,
    selection:   Selection,
    closed:      bool,
}

impl<B: VolumeBackend> Multitool<B> {
    /// Take ownership of an opened backend and load the drives already in
    /// the pool. The backend is closed again if loading fails.
    pub fn init(names: PoolNames, backend: B, name_prefix: impl Into<String>) -> Result<Self> {
        let mut tool = Self {
            names,
            backend,
            name_prefix: name_prefix.into(),
            drives:      Vec::new(),
            items:       Vec::new(),
            selection:   Selection::Empty,
            closed:      false,
        };
        tool.rescan_drives()?;
        tracing::info!(
            vg = %tool.names.volume_group,
            pool = %tool.names.thin_pool,
            drives = tool.drives.len(),
            "multitool ready"
        );
        Ok(tool)
    }

    /// Close the backend. Dropping does the same; this just makes the point
    /// of release explicit.
    pub fn shutdown(mut self) {
        self.close_backend();
    }

    fn close_backend(&mut self) {
        if !self.closed {
            self.closed = true;
            self.backend.close();
        }
    }

    // ── Drive lifecycle ───────────────────────────────────────────────

    /// Create a thin volume of at least `size` bytes and append its drive.
    ///
    /// If the chosen name turns out to be taken by a volume created outside
    /// the registry, the registry is rescanned and the add retried once.
    pub fn add_drive(&mut self, size: u64) -> Result<&VirtualDrive> {
        let size = round_to_sector(size)?;
        let volume = match self.create_next(size) {
            Err(MultitoolError::BackendAllocation(msg)) if self.next_name_taken_outside() => {
                tracing::info!(reason = %msg, "drive name taken out-of-band, rescanning");
                self.rescan_drives()?;
                self.create_next(size)?
            }
            other => other?,
        };
        tracing::info!(name = %volume.name, size_bytes = volume.size_bytes, "drive created");

        let previous = self.selected_entry();
        self.drives.push(VirtualDrive::new(volume));
        self.revalidate(previous);
        Ok(&self.drives[self.drives.len() - 1])
    }

    fn create_next(&mut self, size: u64) -> Result<LogicalVolume> {
        let name = self.next_drive_name();
        self.backend.create_volume(&name, size)
    }

    fn next_name_taken_outside(&self) -> bool {
        let name = self.next_drive_name();
        self.backend
            .list_volumes()
            .map(|vols| vols.iter().any(|v| v.name == name))
            .unwrap_or(false)
    }

    /// Partition and format the drive whose volume is `id`. The record
    /// stays in the registry whether or not this succeeds.
    pub fn format_drive(&mut self, id: &VolumeId, format: DriveFormat) -> Result<()> {
        let drive = self
            .drives
            .iter()
            .find(|d| d.id() == id)
            .ok_or_else(|| MultitoolError::DriveNotFound(id.to_string()))?;
        if let Err(e) = self.backend.format_volume(drive.volume(), format) {
            tracing::warn!(name = %drive.name(), error = %e, "drive format failed");
            return Err(e);
        }
        tracing::info!(name = %drive.name(), format = format.label(), "drive formatted");
        Ok(())
    }

    /// Destroy the drive whose volume is `id`. The record is kept if the
    /// backend refuses.
    pub fn remove_drive(&mut self, id: &VolumeId) -> Result<()> {
        let pos = self
            .drives
            .iter()
            .position(|d| d.id() == id)
            .ok_or_else(|| MultitoolError::DriveNotFound(id.to_string()))?;
        let previous = self.selected_entry();

        if let Err(e) = self.backend.remove_volume(self.drives[pos].volume()) {
            tracing::warn!(name = %self.drives[pos].name(), error = %e, "drive removal refused");
            return Err(e);
        }

        let drive = self.drives.remove(pos);
        tracing::info!(name = %drive.name(), "drive removed");
        self.revalidate(previous);
        Ok(())
    }

    /// Rebuild every record from the volumes the backend reports.
    ///
    /// Drive references taken before the call cannot outlive it.
    pub fn rescan_drives(&mut self) -> Result<()> {
        let volumes = self.backend.list_volumes()?;
        let previous = self.selected_entry();

        self.drives = volumes.into_iter().map(VirtualDrive::new).collect();
        tracing::debug!(drives = self.drives.len(), "drives rescanned");
        self.revalidate(previous);
        Ok(())
    }

    /// Smallest `<prefix><n>` not taken by a known drive.
    pub fn next_drive_name(&self) -> String {
        let taken: HashSet<&str> = self.drives.iter().map(|d| d.name()).collect();
        (0..)
            .map(|n| format!("{}{}", self.name_prefix, n))
            .find(|name| !taken.contains(name.as_str()))
            .unwrap_or_default()
    }

    // ── List entries ──────────────────────────────────────────────────

    /// Put a non-drive entry at the end of the list.
    pub fn register_item(&mut self, label: impl Into<String>) -> ItemId {
        let previous = self.selected_entry();
        let id = ItemId(self.items.len());
        self.items.push(RegisteredItem { id, label: label.into() });
        self.revalidate(previous);
        id
    }

    pub fn entries(&self) -> Vec<ListEntry> {
        (0..self.len()).filter_map(|i| self.entry_at(i)).collect()
    }

    fn len(&self) -> usize { self.drives.len() + self.items.len() }

    fn entry_at(&self, index: usize) -> Option<ListEntry> {
        match self.drives.get(index) {
            Some(d) => Some(ListEntry::Drive(d.id().clone())),
            None    => self.items.get(index - self.drives.len()).map(|it| ListEntry::Item(it.id)),
        }
    }

    fn revalidate(&mut self, previous: Option<ListEntry>) {
        let entries = self.entries();
        self.selection.revalidate(previous.as_ref(), &entries);
    }

    // ── Queries ───────────────────────────────────────────────────────

    pub fn drives(&self) -> &[VirtualDrive] { &self.drives }

    pub fn drive(&self, id: &VolumeId) -> Option<&VirtualDrive> {
        self.drives.iter().find(|d| d.id() == id)
    }

    pub fn drive_by_name(&self, name: &str) -> Option<&VirtualDrive> {
        self.drives.iter().find(|d| d.name() == name)
    }

    #[cfg(test)]
    pub fn selection(&self) -> Selection { self.selection }

    pub fn selected_entry(&self) -> Option<ListEntry> {
        self.selection.index().and_then(|i| self.entry_at(i))
    }

    pub fn selected_drive(&self) -> Option<&VirtualDrive> {
        self.selection.index().and_then(|i| self.drives.get(i))
    }

    pub fn pool_names(&self) -> &PoolNames { &self.names }

    /// Allocated fraction of the thin pool.
    pub fn percent_used(&self) -> Result<f64> {
        capacity::percent_used(&self.backend)
    }

    pub fn pool_usage(&self) -> Result<PoolUsage> {
        self.backend.pool_usage()
    }

    #[cfg(test)]
    pub fn backend_mut(&mut self) -> &mut B { &mut self.backend }
}

impl<B: VolumeBackend> Navigable for Multitool<B> {
    fn on_select(&mut self) -> bool {
        self.selection.is_selected()
    }

    fn on_next(&mut self) -> bool {
        let len = self.len();
        self.selection.next(len)
    }

    fn on_prev(&mut self) -> bool {
        let len = self.len();
        self.selection.prev(len)
    }

    fn render(&self) -> PoolSummary {
        let selected = self.selection.index();
        let drive_rows = self.drives.iter().map(|d| (RowKind::Drive, d.name(), Some(d.size_bytes())));
        let item_rows  = self.items.iter().map(|it| (RowKind::Item, it.label.as_str(), None));
        let rows = drive_rows
            .chain(item_rows)
            .enumerate()
            .map(|(i, (kind, label, size_bytes))| SummaryRow {
                kind,
                label: label.to_string(),
                size_bytes,
                selected: selected == Some(i),
            })
            .collect();

        PoolSummary {
            volume_group: self.names.volume_group.clone(),
            thin_pool:    self.names.thin_pool.clone(),
            rows,
            selected,
            capacity:     capacity::reading(&self.backend),
        }
    }
}

impl<B: VolumeBackend> Drop for Multitool<B> {
    fn drop(&mut self) {
        self.close_backend();
    }
}

fn round_to_sector(size: u64) -> Result<u64> {
    if size == 0 {
        return Err(MultitoolError::InvalidDriveSize(size));
    }
    size.div_ceil(SECTOR)
        .checked_mul(SECTOR)
        .ok_or(MultitoolError::InvalidDriveSize(size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;
    use crate::capacity::CapacityReading;

    const GIB: u64 = 1 << 30;

    fn names() -> PoolNames {
        PoolNames { volume_group: "VolGroup00".into(), thin_pool: "thinpool".into() }
    }

    fn tool(capacity: u64) -> Multitool<MemoryBackend> {
        Multitool::init(names(), MemoryBackend::new(&names(), capacity), "Drive").unwrap()
    }

    fn id_at(tool: &Multitool<MemoryBackend>, index: usize) -> VolumeId {
        tool.drives()[index].id().clone()
    }

    fn assert_selection_valid(tool: &Multitool<MemoryBackend>) {
        let n = tool.entries().len();
        match tool.selection() {
            Selection::Empty       => assert_eq!(n, 0),
            Selection::Selected(i) => assert!(i < n, "selection {i} out of range {n}"),
        }
    }

    #[test]
    fn navigation_scenario() {
        let mut t = tool(GIB);
        assert!(!t.on_next());
        assert_eq!(t.selection(), Selection::Empty);

        t.add_drive(100).unwrap();
        assert_eq!(t.selection(), Selection::Selected(0));
        t.add_drive(200).unwrap();
        assert_eq!(t.selection(), Selection::Selected(0));

        assert!(t.on_next());
        assert_eq!(t.selection(), Selection::Selected(1));

        let second = id_at(&t, 1);
        t.remove_drive(&second).unwrap();
        assert_eq!(t.drives().len(), 1);
        assert_eq!(t.selection(), Selection::Selected(0));

        let first = id_at(&t, 0);
        t.remove_drive(&first).unwrap();
        assert!(t.drives().is_empty());
        assert_eq!(t.selection(), Selection::Empty);
        assert!(!t.on_select());
    }

    #[test]
    fn zero_size_is_rejected_before_the_backend() {
        let mut t = tool(GIB);
        assert!(matches!(t.add_drive(0), Err(MultitoolError::InvalidDriveSize(0))));
        assert!(t.drives().is_empty());
        assert_eq!(t.pool_usage().unwrap().allocated, 0);
    }

    #[test]
    fn sizes_round_up_to_whole_sectors() {
        let mut t = tool(GIB);
        assert_eq!(t.add_drive(1).unwrap().size_bytes(), 512);
        assert_eq!(t.add_drive(1024).unwrap().size_bytes(), 1024);
        assert!(matches!(t.add_drive(u64::MAX), Err(MultitoolError::InvalidDriveSize(_))));
    }

    #[test]
    fn allocation_failure_changes_nothing() {
        let mut t = tool(GIB);
        t.add_drive(4096).unwrap();
        t.add_drive(4096).unwrap();
        t.on_next();
        let before_used = t.percent_used().unwrap();

        let err = t.add_drive(GIB * 4).unwrap_err();
        assert!(matches!(err, MultitoolError::BackendAllocation(_)));
        assert_eq!(t.drives().len(), 2);
        assert_eq!(t.selection(), Selection::Selected(1));
        assert_eq!(t.percent_used().unwrap(), before_used);
    }

    #[test]
    fn removing_selected_middle_drive_resets_to_first() {
        let mut t = tool(GIB);
        for _ in 0..3 { t.add_drive(512).unwrap(); }
        t.on_next();
        let middle = id_at(&t, 1);
        t.remove_drive(&middle).unwrap();
        assert_eq!(t.selection(), Selection::Selected(0));
        assert!(t.drive(&middle).is_none());
    }

    #[test]
    fn removing_an_earlier_drive_resets_shifted_selection() {
        let mut t = tool(GIB);
        for _ in 0..3 { t.add_drive(512).unwrap(); }
        t.on_prev();
        assert_eq!(t.selection(), Selection::Selected(2));
        let first = id_at(&t, 0);
        t.remove_drive(&first).unwrap();
        assert_eq!(t.selection(), Selection::Selected(0));
    }

    #[test]
    fn removing_a_later_drive_keeps_selection() {
        let mut t = tool(GIB);
        for _ in 0..3 { t.add_drive(512).unwrap(); }
        t.on_next();
        let last = id_at(&t, 2);
        t.remove_drive(&last).unwrap();
        assert_eq!(t.selection(), Selection::Selected(1));
    }

    #[test]
    fn unknown_drive_is_not_found() {
        let mut t = tool(GIB);
        t.add_drive(512).unwrap();
        let err = t.remove_drive(&VolumeId::new("nope")).unwrap_err();
        assert!(matches!(err, MultitoolError::DriveNotFound(_)));
        assert_eq!(t.drives().len(), 1);
        assert_eq!(t.selection(), Selection::Selected(0));
    }

    #[test]
    fn identity_not_size_decides_removal() {
        let mut t = tool(GIB);
        t.add_drive(512).unwrap();
        t.add_drive(512).unwrap();
        let second = id_at(&t, 1);
        t.remove_drive(&second).unwrap();
        assert_eq!(t.drives().len(), 1);
        assert_eq!(t.drives()[0].name(), "Drive0");
    }

    #[test]
    fn refused_removal_keeps_the_record() {
        let mut t = tool(GIB);
        t.add_drive(512).unwrap();
        t.add_drive(512).unwrap();
        t.on_next();
        let busy = id_at(&t, 1);
        t.backend_mut().set_busy(&busy, true);

        let err = t.remove_drive(&busy).unwrap_err();
        assert!(matches!(err, MultitoolError::BackendDeallocation(_)));
        assert!(t.drive(&busy).is_some());
        assert_eq!(t.selection(), Selection::Selected(1));
    }

    #[test]
    fn usage_moves_with_add_and_remove() {
        let mut t = tool(GIB);
        let empty = t.percent_used().unwrap();
        let id = t.add_drive(GIB / 4).unwrap().id().clone();
        let after_add = t.percent_used().unwrap();
        assert!(after_add >= empty);
        t.remove_drive(&id).unwrap();
        assert!(t.percent_used().unwrap() <= after_add);
    }

    #[test]
    fn rescan_is_deterministic() {
        let mut t = tool(GIB);
        for size in [512, 1024, 2048] { t.add_drive(size).unwrap(); }

        t.rescan_drives().unwrap();
        let first: Vec<(VolumeId, u64)> =
            t.drives().iter().map(|d| (d.id().clone(), d.size_bytes())).collect();
        t.rescan_drives().unwrap();
        let second: Vec<(VolumeId, u64)> =
            t.drives().iter().map(|d| (d.id().clone(), d.size_bytes())).collect();

        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn rescan_picks_up_out_of_band_changes() {
        let mut t = tool(GIB);
        t.add_drive(512).unwrap();
        let outside: LogicalVolume = t.backend_mut().create_volume("Backup", 4096).unwrap();
        let gone = id_at(&t, 0);
        let volume = t.drives()[0].volume().clone();
        t.backend_mut().remove_volume(&volume).unwrap();

        t.rescan_drives().unwrap();
        assert_eq!(t.drives().len(), 1);
        assert!(t.drive(&outside.id).is_some());
        assert!(t.drive(&gone).is_none());
        assert_eq!(t.selection(), Selection::Selected(0));
    }

    #[test]
    fn failed_rescan_keeps_stale_list() {
        let mut t = tool(GIB);
        t.add_drive(512).unwrap();
        t.backend_mut().set_offline(true);
        assert!(matches!(t.rescan_drives(), Err(MultitoolError::BackendQuery(_))));
        assert_eq!(t.drives().len(), 1);
        assert_selection_valid(&t);
    }

    #[test]
    fn init_loads_existing_volumes() {
        let mut backend = MemoryBackend::new(&names(), GIB);
        backend.create_volume("Drive0", 512).unwrap();
        backend.create_volume("Drive1", 512).unwrap();
        let t = Multitool::init(names(), backend, "Drive").unwrap();
        assert_eq!(t.drives().len(), 2);
        assert_eq!(t.selection(), Selection::Selected(0));
    }

    #[test]
    fn names_fill_gaps() {
        let mut t = tool(GIB);
        for _ in 0..3 { t.add_drive(512).unwrap(); }
        let first = id_at(&t, 0);
        t.remove_drive(&first).unwrap();
        assert_eq!(t.next_drive_name(), "Drive0");
        assert_eq!(t.add_drive(512).unwrap().name(), "Drive0");
        assert_eq!(t.next_drive_name(), "Drive3");
    }

    #[test]
    fn registered_items_follow_drives() {
        let mut t = tool(GIB);
        let new_drive = t.register_item("New Drive");
        assert_eq!(t.selected_entry(), Some(ListEntry::Item(new_drive)));
        assert!(t.selected_drive().is_none());

        t.add_drive(512).unwrap();
        // the item shifted from 0 to 1, so the cursor falls back to the first entry
        assert_eq!(t.entries().len(), 2);
        assert_eq!(t.selection(), Selection::Selected(0));
        assert!(t.selected_drive().is_some());

        assert!(t.on_next());
        assert_eq!(t.selected_entry(), Some(ListEntry::Item(new_drive)));
        assert!(t.on_next());
        assert_eq!(t.selection(), Selection::Selected(0));
    }

    #[test]
    fn selection_stays_valid_through_mixed_operations() {
        let mut t = tool(64 * 1024);
        let sizes = [512u64, 8192, 0, 1024, 1 << 40, 4096, 2048];
        for (step, size) in sizes.iter().enumerate() {
            let _ = t.add_drive(*size);
            assert_selection_valid(&t);
            if step % 2 == 1 {
                t.on_next();
                if let Some(id) = t.selected_drive().map(|d| d.id().clone()) {
                    t.remove_drive(&id).unwrap();
                }
                assert_selection_valid(&t);
            }
        }
        while let Some(id) = t.drives().first().map(|d| d.id().clone()) {
            t.remove_drive(&id).unwrap();
            assert_selection_valid(&t);
        }
        assert_eq!(t.selection(), Selection::Empty);
    }

    #[test]
    fn render_highlights_selection_and_usage() {
        let mut t = tool(4096);
        t.add_drive(1024).unwrap();
        t.add_drive(1024).unwrap();
        t.on_next();

        let summary = t.render();
        assert_eq!(summary.drive_count(), 2);
        assert_eq!(summary.selected, Some(1));
        assert!(!summary.rows[0].selected);
        assert!(summary.rows[1].selected);
        assert_eq!(summary.capacity.fraction(), Some(0.5));
    }

    #[test]
    fn render_tolerates_empty_list_and_unknown_usage() {
        let mut t = tool(4096);
        t.backend_mut().set_offline(true);
        let summary = t.render();
        assert!(summary.rows.is_empty());
        assert_eq!(summary.selected, None);
        assert_eq!(summary.capacity, CapacityReading::Unknown);
    }

    #[test]
    fn name_taken_out_of_band_is_rescanned_and_retried() {
        let mut t = tool(GIB);
        let outside = t.backend_mut().create_volume("Drive0", 4096).unwrap();

        let name = t.add_drive(512).unwrap().name().to_string();
        assert_eq!(name, "Drive1");
        assert_eq!(t.drives().len(), 2);
        assert!(t.drive(&outside.id).is_some());
        assert_eq!(t.add_drive(512).unwrap().name(), "Drive2");
    }

    #[test]
    fn plain_allocation_failure_does_not_rescan() {
        let mut t = tool(4096);
        t.add_drive(512).unwrap();
        let backup = t.backend_mut().create_volume("Backup", 512).unwrap();

        assert!(t.add_drive(1 << 40).is_err());
        // an unrelated out-of-band volume stays invisible until a rescan
        assert!(t.drive(&backup.id).is_none());
        assert_eq!(t.drives().len(), 1);
    }

    #[test]
    fn formats_a_new_drive() {
        let mut t = tool(GIB);
        let id = t.add_drive(4096).unwrap().id().clone();
        t.format_drive(&id, DriveFormat::Universal).unwrap();
        assert_eq!(t.backend_mut().format_of(&id), Some(DriveFormat::Universal));
    }

    #[test]
    fn failed_format_keeps_the_record() {
        let mut t = tool(GIB);
        let id = t.add_drive(4096).unwrap().id().clone();
        t.backend_mut().set_format_broken(true);

        let err = t.format_drive(&id, DriveFormat::Windows).unwrap_err();
        assert!(matches!(err, MultitoolError::Format(_)));
        assert!(t.drive(&id).is_some());
        assert_eq!(t.selection(), Selection::Selected(0));
    }

    #[test]
    fn formatting_an_unknown_drive_is_not_found() {
        let mut t = tool(GIB);
        let err = t.format_drive(&VolumeId::new("nope"), DriveFormat::Linux).unwrap_err();
        assert!(matches!(err, MultitoolError::DriveNotFound(_)));
    }

    #[test]
    fn shutdown_closes_backend_once() {
        let backend = MemoryBackend::new(&names(), GIB);
        let closes = backend.close_count();
        let t = Multitool::init(names(), backend, "Drive").unwrap();
        assert_eq!(closes.get(), 0);
        t.shutdown();
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn drop_closes_backend_once() {
        let backend = MemoryBackend::new(&names(), GIB);
        let closes = backend.close_count();
        {
            let mut t = Multitool::init(names(), backend, "Drive").unwrap();
            t.add_drive(512).unwrap();
        }
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn failed_init_closes_backend() {
        let mut backend = MemoryBackend::new(&names(), GIB);
        backend.set_offline(true);
        let closes = backend.close_count();
        assert!(matches!(
            Multitool::init(names(), backend, "Drive"),
            Err(MultitoolError::BackendQuery(_))
        ));
        assert_eq!(closes.get(), 1);
    }
}

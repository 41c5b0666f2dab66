use crate::backend::VolumeBackend;
use crate::config::PoolNames;
use crate::error::{MultitoolError, Result};
use crate::models::format::DriveFormat;
use crate::models::volume::{LogicalVolume, PoolUsage, VolumeId};
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// In-process thin pool with a fixed capacity.
///
/// Allocation is charged at the full virtual size of each volume, so the
/// pool can never be over-committed. Backs `--simulate` and the tests.
#[derive(Debug)]
pub struct MemoryBackend {
    vg:        String,
    pool:      String,
    capacity:  u64,
    volumes:   Vec<LogicalVolume>,
    formats:   HashMap<VolumeId, DriveFormat>,
    busy:      HashSet<VolumeId>,
    offline:   bool,
    fmt_fail:  bool,
    next_uuid: u64,
    closes:    Rc<Cell<u32>>,
}

impl MemoryBackend {
    pub fn new(names: &PoolNames, capacity: u64) -> Self {
        tracing::info!(capacity, "using in-memory thin pool");
        Self {
            vg:        names.volume_group.clone(),
            pool:      names.thin_pool.clone(),
            capacity,
            volumes:   Vec::new(),
            formats:   HashMap::new(),
            busy:      HashSet::new(),
            offline:   false,
            fmt_fail:  false,
            next_uuid: 0,
            closes:    Rc::new(Cell::new(0)),
        }
    }

    fn allocated(&self) -> u64 {
        self.volumes.iter().map(|v| v.size_bytes).sum()
    }

    /// A busy volume refuses removal, like an LV that is still open.
    #[cfg(test)]
    pub fn set_busy(&mut self, id: &VolumeId, busy: bool) {
        if busy { self.busy.insert(id.clone()); } else { self.busy.remove(id); }
    }

    /// While offline every query fails.
    #[cfg(test)]
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// While broken every format fails, like a missing mkfs.
    #[cfg(test)]
    pub fn set_format_broken(&mut self, broken: bool) {
        self.fmt_fail = broken;
    }

    #[cfg(test)]
    pub fn format_of(&self, id: &VolumeId) -> Option<DriveFormat> {
        self.formats.get(id).copied()
    }

    /// Shared count of `close` calls; it survives the backend being dropped.
    #[cfg(test)]
    pub fn close_count(&self) -> Rc<Cell<u32>> {
        Rc::clone(&self.closes)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline {
            return Err(MultitoolError::BackendQuery(format!("{}/{} is offline", self.vg, self.pool)));
        }
        Ok(())
    }
}

impl VolumeBackend for MemoryBackend {
    fn create_volume(&mut self, name: &str, size_bytes: u64) -> Result<LogicalVolume> {
        if self.volumes.iter().any(|v| v.name == name) {
            return Err(MultitoolError::BackendAllocation(format!("volume {name} already exists")));
        }
        let free = self.capacity.saturating_sub(self.allocated());
        if size_bytes > free {
            return Err(MultitoolError::BackendAllocation(format!(
                "insufficient free space in {}/{}: requested {size_bytes}, free {free}",
                self.vg, self.pool,
            )));
        }

        self.next_uuid += 1;
        let volume = LogicalVolume {
            id:         VolumeId::new(format!("mem-{:08x}", self.next_uuid)),
            name:       name.to_string(),
            path:       format!("/dev/{}/{}", self.vg, name),
            size_bytes,
            pool:       self.pool.clone(),
        };
        self.volumes.push(volume.clone());
        Ok(volume)
    }

    fn remove_volume(&mut self, volume: &LogicalVolume) -> Result<()> {
        if self.busy.contains(&volume.id) {
            return Err(MultitoolError::BackendDeallocation(format!("{} is in use", volume.name)));
        }
        let pos = self.volumes.iter().position(|v| v.id == volume.id).ok_or_else(|| {
            MultitoolError::BackendDeallocation(format!("{} does not exist", volume.name))
        })?;
        self.volumes.remove(pos);
        self.formats.remove(&volume.id);
        Ok(())
    }

    fn list_volumes(&self) -> Result<Vec<LogicalVolume>> {
        self.check_online()?;
        let mut vols = self.volumes.clone();
        vols.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(vols)
    }

    fn pool_usage(&self) -> Result<PoolUsage> {
        self.check_online()?;
        Ok(PoolUsage { allocated: self.allocated(), total: self.capacity })
    }

    fn format_volume(&mut self, volume: &LogicalVolume, format: DriveFormat) -> Result<()> {
        if !self.volumes.iter().any(|v| v.id == volume.id) {
            return Err(MultitoolError::Format(format!("{} does not exist", volume.name)));
        }
        if self.fmt_fail {
            return Err(MultitoolError::Format(format!("mkfs failed on {}", volume.path)));
        }
        self.formats.insert(volume.id.clone(), format);
        Ok(())
    }

    fn close(&mut self) {
        self.closes.set(self.closes.get() + 1);
        tracing::info!(vg = %self.vg, pool = %self.pool, "closed in-memory thin pool");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> PoolNames {
        PoolNames { volume_group: "vg".into(), thin_pool: "pool".into() }
    }

    #[test]
    fn charges_full_virtual_size() {
        let mut b = MemoryBackend::new(&names(), 1000);
        b.create_volume("a", 600).unwrap();
        let err = b.create_volume("b", 500).unwrap_err();
        assert!(matches!(err, MultitoolError::BackendAllocation(_)));
        assert_eq!(b.pool_usage().unwrap(), PoolUsage { allocated: 600, total: 1000 });
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut b = MemoryBackend::new(&names(), 1000);
        b.create_volume("a", 10).unwrap();
        assert!(b.create_volume("a", 10).is_err());
    }

    #[test]
    fn lists_in_name_order_with_unique_ids() {
        let mut b = MemoryBackend::new(&names(), 1000);
        let z = b.create_volume("z", 10).unwrap();
        let a = b.create_volume("a", 10).unwrap();
        assert_ne!(z.id, a.id);

        let names: Vec<String> = b.list_volumes().unwrap().into_iter().map(|v| v.name).collect();
        assert_eq!(names, ["a", "z"]);
    }

    #[test]
    fn busy_volume_cannot_be_removed() {
        let mut b = MemoryBackend::new(&names(), 1000);
        let v = b.create_volume("a", 10).unwrap();
        b.set_busy(&v.id, true);
        assert!(matches!(b.remove_volume(&v), Err(MultitoolError::BackendDeallocation(_))));
        b.set_busy(&v.id, false);
        b.remove_volume(&v).unwrap();
        assert!(b.list_volumes().unwrap().is_empty());
    }

    #[test]
    fn records_format_until_removal() {
        let mut b = MemoryBackend::new(&names(), 1000);
        let v = b.create_volume("a", 10).unwrap();
        b.format_volume(&v, DriveFormat::Linux).unwrap();
        assert_eq!(b.format_of(&v.id), Some(DriveFormat::Linux));

        b.remove_volume(&v).unwrap();
        assert_eq!(b.format_of(&v.id), None);
        assert!(matches!(b.format_volume(&v, DriveFormat::Linux), Err(MultitoolError::Format(_))));
    }

    #[test]
    fn counts_closes() {
        let mut b = MemoryBackend::new(&names(), 1000);
        let closes = b.close_count();
        b.close();
        drop(b);
        assert_eq!(closes.get(), 1);
    }
}

pub mod command;
pub mod format;
pub mod lvm;
pub mod memory;

use crate::error::Result;
use crate::models::format::DriveFormat;
use crate::models::volume::{LogicalVolume, PoolUsage};

/// The narrow interface the registry uses to talk to the volume manager.
///
/// Calls are synchronous and may block on I/O. Implementations resolve the
/// volume group and thin pool when they are opened; every method works on
/// that one pool.
pub trait VolumeBackend {
    /// Create a thin volume named `name` with a virtual size of `size_bytes`.
    fn create_volume(&mut self, name: &str, size_bytes: u64) -> Result<LogicalVolume>;

    fn remove_volume(&mut self, volume: &LogicalVolume) -> Result<()>;

    /// Thin volumes currently in the pool, ordered by name.
    fn list_volumes(&self) -> Result<Vec<LogicalVolume>>;

    fn pool_usage(&self) -> Result<PoolUsage>;

    /// Partition the volume and put a fresh filesystem on it.
    fn format_volume(&mut self, volume: &LogicalVolume, format: DriveFormat) -> Result<()>;

    /// Release the backend handle. Called once, at shutdown.
    fn close(&mut self) {}
}

impl<B: VolumeBackend + ?Sized> VolumeBackend for Box<B> {
    fn create_volume(&mut self, name: &str, size_bytes: u64) -> Result<LogicalVolume> {
        (**self).create_volume(name, size_bytes)
    }

    fn remove_volume(&mut self, volume: &LogicalVolume) -> Result<()> {
        (**self).remove_volume(volume)
    }

    fn list_volumes(&self) -> Result<Vec<LogicalVolume>> {
        (**self).list_volumes()
    }

    fn pool_usage(&self) -> Result<PoolUsage> {
        (**self).pool_usage()
    }

    fn format_volume(&mut self, volume: &LogicalVolume, format: DriveFormat) -> Result<()> {
        (**self).format_volume(volume, format)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

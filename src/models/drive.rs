use crate::models::volume::{LogicalVolume, VolumeId};
use serde::Serialize;

/// A virtual drive: the user-facing record for one thin logical volume.
#[derive(Debug, Clone, Serialize)]
pub struct VirtualDrive {
    #[serde(flatten)]
    volume: LogicalVolume,
}

impl VirtualDrive {
    pub fn new(volume: LogicalVolume) -> Self {
        Self { volume }
    }

    pub fn id(&self)         -> &VolumeId      { &self.volume.id }
    pub fn name(&self)       -> &str           { &self.volume.name }
    pub fn path(&self)       -> &str           { &self.volume.path }
    pub fn size_bytes(&self) -> u64            { self.volume.size_bytes }
    pub fn volume(&self)     -> &LogicalVolume { &self.volume }
}

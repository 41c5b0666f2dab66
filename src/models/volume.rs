use serde::Serialize;
use std::fmt;

// ── Volume identity ──────────────────────────────────────────────────

/// Backend handle of a logical volume (the LVM UUID).
///
/// Two volumes are the same volume only if their ids match; name and size
/// say nothing about identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VolumeId(String);

impl VolumeId {
    pub fn new(uuid: impl Into<String>) -> Self { Self(uuid.into()) }
}

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Logical volume ───────────────────────────────────────────────────

/// One thin logical volume as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicalVolume {
    #[serde(rename = "uuid")]
    pub id:         VolumeId,
    pub name:       String,
    pub path:       String,
    pub size_bytes: u64,
    pub pool:       String,   // thin pool the volume draws from
}

// ── Pool usage ───────────────────────────────────────────────────────

/// Data usage of the thin pool, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoolUsage {
    pub allocated: u64,
    pub total:     u64,
}

impl PoolUsage {
    pub fn free(&self) -> u64 { self.total.saturating_sub(self.allocated) }

    /// Allocated fraction in `[0, 1]`, `None` for a zero-sized pool.
    pub fn fraction(&self) -> Option<f64> {
        if self.total == 0 { return None; }
        Some((self.allocated as f64 / self.total as f64).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_is_clamped() {
        let over = PoolUsage { allocated: 150, total: 100 };
        assert_eq!(over.fraction(), Some(1.0));
        assert_eq!(over.free(), 0);

        let half = PoolUsage { allocated: 50, total: 100 };
        assert_eq!(half.fraction(), Some(0.5));
    }

    #[test]
    fn empty_pool_has_no_fraction() {
        assert_eq!(PoolUsage { allocated: 0, total: 0 }.fraction(), None);
    }
}

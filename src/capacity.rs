use crate::backend::VolumeBackend;
use crate::error::{MultitoolError, Result};
use crate::models::volume::PoolUsage;

/// What the display shows for pool usage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CapacityReading {
    Known { fraction: f64, usage: PoolUsage },
    Unknown,
}

impl CapacityReading {
    pub fn fraction(&self) -> Option<f64> {
        match self {
            CapacityReading::Known { fraction, .. } => Some(*fraction),
            CapacityReading::Unknown                => None,
        }
    }
}

/// Allocated fraction of the thin pool, in `[0, 1]`.
pub fn percent_used<B: VolumeBackend + ?Sized>(backend: &B) -> Result<f64> {
    measure(backend).map(|(fraction, _)| fraction)
}

/// Same as [`percent_used`], folding failures into `Unknown`.
pub fn reading<B: VolumeBackend + ?Sized>(backend: &B) -> CapacityReading {
    match measure(backend) {
        Ok((fraction, usage)) => CapacityReading::Known { fraction, usage },
        Err(e) => {
            tracing::debug!(error = %e, "pool usage unavailable");
            CapacityReading::Unknown
        }
    }
}

fn measure<B: VolumeBackend + ?Sized>(backend: &B) -> Result<(f64, PoolUsage)> {
    let usage = backend.pool_usage()?;
    let fraction = usage
        .fraction()
        .ok_or_else(|| MultitoolError::BackendQuery("pool reports zero capacity".into()))?;
    Ok((fraction, usage))
}

use crate::backend::command::Toolbox;
use crate::backend::{format, VolumeBackend};
use crate::config::PoolNames;
use crate::error::{MultitoolError, Result};
use crate::models::format::DriveFormat;
use crate::models::volume::{LogicalVolume, PoolUsage, VolumeId};
use nix::unistd::Uid;
use std::path::Path;

const REQUIRED_TOOLS: [&str; 4] = ["vgs", "lvs", "lvcreate", "lvremove"];

const LV_FIELDS: &str = "lv_name,lv_uuid,lv_path,lv_size,pool_lv";

/// Volume backend driving the lvm2 command line tools.
pub struct LvmTools {
    vg:     String,
    pool:   String,
    tools:  Toolbox,
    closed: bool,
}

impl LvmTools {
    /// Resolve the volume group and thin pool. Any failure here is fatal to
    /// startup.
    pub fn open(names: &PoolNames) -> Result<Self> {
        let tools = Toolbox::default();
        for tool in REQUIRED_TOOLS {
            if tools.locate(tool).is_none() {
                return Err(MultitoolError::BackendOpen(format!(
                    "{tool} not found in PATH (install lvm2)"
                )));
            }
        }
        if !Uid::effective().is_root() {
            return Err(MultitoolError::BackendOpen("LVM operations require root".into()));
        }

        let vg   = names.volume_group.clone();
        let pool = names.thin_pool.clone();

        tools.run("vgs", &["--noheadings", "-o", "vg_name", &vg], MultitoolError::BackendOpen)?;

        let target = format!("{vg}/{pool}");
        let attr = tools.run(
            "lvs",
            &["--noheadings", "-o", "lv_attr", &target],
            MultitoolError::BackendOpen,
        )?;
        if !is_thin_pool(attr.trim()) {
            return Err(MultitoolError::BackendOpen(format!("'{target}' is not a thin pool")));
        }

        tracing::info!(vg = %vg, pool = %pool, "opened LVM thin pool");
        Ok(Self { vg, pool, tools, closed: false })
    }

    #[cfg(test)]
    fn with_tools(vg: &str, pool: &str, tools: Toolbox) -> Self {
        Self { vg: vg.into(), pool: pool.into(), tools, closed: false }
    }

    fn read_volume(&self, name: &str) -> Result<LogicalVolume> {
        let target = format!("{}/{}", self.vg, name);
        let out = self.tools.run("lvs", &lvs_args(LV_FIELDS, &target), MultitoolError::BackendQuery)?;
        parse_volumes(&out, &self.vg, &self.pool)
            .into_iter()
            .next()
            .ok_or_else(|| MultitoolError::BackendQuery(format!("{target} not reported by lvs")))
    }

    fn lvremove(&self, name: &str) -> Result<()> {
        let target = format!("{}/{}", self.vg, name);
        tracing::debug!(target = %target, "lvremove");
        self.tools.run("lvremove", &["--force", "--yes", &target], MultitoolError::BackendDeallocation)?;
        Ok(())
    }
}

impl VolumeBackend for LvmTools {
    fn create_volume(&mut self, name: &str, size_bytes: u64) -> Result<LogicalVolume> {
        let size = format!("{size_bytes}b");
        tracing::debug!(name, size_bytes, "lvcreate");
        self.tools.run(
            "lvcreate",
            &[
                "--yes", "--type", "thin",
                "--virtualsize", &size,
                "--name", name,
                "--thinpool", &self.pool,
                &self.vg,
            ],
            MultitoolError::BackendAllocation,
        )?;

        match self.read_volume(name) {
            Ok(volume) => Ok(volume),
            Err(e) => {
                // An unreported volume would hold pool space and its name.
                if let Err(undo) = self.lvremove(name) {
                    tracing::error!(name, error = %undo, "could not roll back new volume");
                }
                Err(MultitoolError::BackendAllocation(format!("created {name} but {e}")))
            }
        }
    }

    fn remove_volume(&mut self, volume: &LogicalVolume) -> Result<()> {
        self.lvremove(&volume.name)
    }

    fn list_volumes(&self) -> Result<Vec<LogicalVolume>> {
        let out = self.tools.run("lvs", &lvs_args(LV_FIELDS, &self.vg), MultitoolError::BackendQuery)?;
        Ok(parse_volumes(&out, &self.vg, &self.pool))
    }

    fn pool_usage(&self) -> Result<PoolUsage> {
        let target = format!("{}/{}", self.vg, self.pool);
        let out = self.tools.run(
            "lvs",
            &lvs_args("lv_size,data_percent", &target),
            MultitoolError::BackendQuery,
        )?;
        parse_pool_usage(&out)
            .ok_or_else(|| MultitoolError::BackendQuery(format!("no usage reported for {target}")))
    }

    fn format_volume(&mut self, volume: &LogicalVolume, format: DriveFormat) -> Result<()> {
        format::format_device(&self.tools, Path::new(&volume.path), format)
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            tracing::info!(vg = %self.vg, pool = %self.pool, "closed LVM thin pool");
        }
    }
}

// ── Command plumbing ─────────────────────────────────────────────────

fn lvs_args<'a>(fields: &'a str, target: &'a str) -> [&'a str; 11] {
    [
        "--noheadings", "--units", "b", "--nosuffix",
        "--separator", "\t",
        "-O", "lv_name",
        "-o", fields,
        target,
    ]
}

// ── Output parsing ───────────────────────────────────────────────────

fn split_row(line: &str) -> Vec<&str> {
    line.split('\t').map(str::trim).collect()
}

/// First character of `lv_attr` is the volume type; `t` marks a thin pool.
fn is_thin_pool(attr: &str) -> bool {
    attr.starts_with('t')
}

/// Parse `lv_name,lv_uuid,lv_path,lv_size,pool_lv` rows, keeping only thin
/// volumes of `pool`.
fn parse_volumes(output: &str, vg: &str, pool: &str) -> Vec<LogicalVolume> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() { return None; }
            let cols = split_row(line);
            if cols.len() < 5 || cols[4] != pool { return None; }
            let path = if cols[2].is_empty() {
                format!("/dev/{}/{}", vg, cols[0])
            } else {
                cols[2].to_string()
            };
            Some(LogicalVolume {
                id:         VolumeId::new(cols[1]),
                name:       cols[0].to_string(),
                path,
                size_bytes: cols[3].parse().ok()?,
                pool:       pool.to_string(),
            })
        })
        .collect()
}

/// Parse a `lv_size,data_percent` row for the thin pool.
fn parse_pool_usage(output: &str) -> Option<PoolUsage> {
    let line = output.lines().map(str::trim).find(|l| !l.is_empty())?;
    let cols = split_row(line);
    if cols.len() < 2 { return None; }
    let total: u64   = cols[0].parse().ok()?;
    let percent: f64 = cols[1].parse().ok()?;
    let allocated = (total as f64 * percent / 100.0).round() as u64;
    Some(PoolUsage { allocated: allocated.min(total), total })
}

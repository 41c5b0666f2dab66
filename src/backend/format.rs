use crate::backend::command::Toolbox;
use crate::error::{MultitoolError, Result};
use crate::models::format::DriveFormat;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

const PARTITION_WAIT: Duration = Duration::from_millis(1000);

/// Write an msdos label with one partition spanning `device`, then make a
/// filesystem on that partition through a loop device.
pub fn format_device(tools: &Toolbox, device: &Path, format: DriveFormat) -> Result<()> {
    let device = device.to_string_lossy();
    let mkpart = format!("mkpart primary {} 0% 100%", format.partition_type());
    tools.run("parted", &["--script", &device, "mklabel msdos", &mkpart], MultitoolError::Format)?;

    let loop_dev = tools
        .run("losetup", &["--find", "--show", "--partscan", &device], MultitoolError::Format)?
        .trim()
        .to_string();
    if loop_dev.is_empty() {
        return Err(MultitoolError::Format(format!("losetup attached no device for {device}")));
    }

    let result = make_filesystem(tools, &loop_dev, format);

    // The loop device must not outlive the format, even on failure.
    if let Err(e) = tools.run("losetup", &["--detach", &loop_dev], MultitoolError::Format) {
        tracing::warn!(loop_dev = %loop_dev, error = %e, "could not detach loop device");
    }
    result?;

    tracing::info!(device = %device, format = format.label(), "drive formatted");
    Ok(())
}

fn make_filesystem(tools: &Toolbox, loop_dev: &str, format: DriveFormat) -> Result<()> {
    tools.run("partprobe", &[loop_dev], MultitoolError::Format)?;

    let partition = PathBuf::from(format!("{loop_dev}p1"));
    wait_for_path(&partition, PARTITION_WAIT)?;

    let partition = partition.to_string_lossy();
    let (mkfs, opts) = format.mkfs();
    let mut args: Vec<&str> = opts.to_vec();
    args.push(&partition);
    tools.run(mkfs, &args, MultitoolError::Format)?;
    Ok(())
}

fn wait_for_path(path: &Path, timeout: Duration) -> Result<()> {
    let start = Instant::now();
    while !path.exists() {
        if start.elapsed() >= timeout {
            return Err(MultitoolError::Format(format!("{} did not appear", path.display())));
        }
        thread::sleep(Duration::from_millis(20));
    }
    Ok(())
}

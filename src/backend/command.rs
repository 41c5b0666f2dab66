use crate::error::{MultitoolError, Result};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

/// Locates and runs host tools, from `PATH` or a fixed search path.
#[derive(Debug, Clone, Default)]
pub struct Toolbox {
    search_path: Option<OsString>,
}

impl Toolbox {
    /// Only look for tools in `dir`.
    #[cfg(test)]
    pub fn in_dir(dir: &std::path::Path) -> Self {
        Self { search_path: Some(dir.as_os_str().to_owned()) }
    }

    pub fn locate(&self, tool: &str) -> Option<PathBuf> {
        match &self.search_path {
            Some(path) => which::which_in(tool, Some(path), "/").ok(),
            None       => which::which(tool).ok(),
        }
    }

    /// Run `command`, mapping a missing tool, a spawn failure or a non-zero
    /// exit through `fail`. Returns stdout.
    pub fn run(
        &self,
        command: &str,
        args: &[&str],
        fail: fn(String) -> MultitoolError,
    ) -> Result<String> {
        let program = self
            .locate(command)
            .ok_or_else(|| fail(format!("{command} not found in PATH")))?;
        let output = Command::new(&program)
            .args(args)
            .output()
            .map_err(|e| fail(format!("{command}: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(command, stderr = %stderr.trim(), "host tool failed");
            return Err(fail(format!("{command} failed: {}", stderr.trim())));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}


#[cfg(test)]
mod tests {
    use super::stubs::*;
    use super::*;

    #[test]
    fn returns_stdout_of_successful_tool() {
        let dir = tempfile::tempdir().unwrap();
        write_stub(dir.path(), "vgs", "echo '  VolGroup00'");
        let tools = Toolbox::in_dir(dir.path());

        let out = tools.run("vgs", &["--noheadings"], MultitoolError::BackendQuery).unwrap();
        assert_eq!(out.trim(), "VolGroup00");
        assert_eq!(calls(dir.path()), vec!["vgs --noheadings"]);
    }

    #[test]
    fn non_zero_exit_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        write_stub(dir.path(), "lvs", "echo 'lock timeout' >&2; exit 5");
        let tools = Toolbox::in_dir(dir.path());

        match tools.run("lvs", &[], MultitoolError::BackendQuery) {
            Err(MultitoolError::BackendQuery(msg)) => assert!(msg.contains("lock timeout")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_tool_maps_through_fail() {
        let dir = tempfile::tempdir().unwrap();
        let tools = Toolbox::in_dir(dir.path());
        assert!(tools.locate("parted").is_none());
        assert!(matches!(
            tools.run("parted", &[], MultitoolError::Format),
            Err(MultitoolError::Format(_))
        ));
    }
}

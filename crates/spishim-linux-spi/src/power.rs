//! Runtime power management control through sysfs
//!
//! Some SPI controllers autosuspend between transfers and lose their
//! configuration or add wake-up latency. Writing `on` to the device's
//! `power/control` file keeps the controller powered.

use crate::error::{LinuxSpiError, Result};

use spishim_core::error::Result as CoreResult;
use spishim_core::port::PowerManagement;

use std::path::{Path, PathBuf};

/// `power/control` file of the Quark X1000 SPI controller (PCI 00:07.1)
pub const QUARK_POWER_CONTROL_PATH: &str = "/sys/devices/pci0000:00/0000:00:07.1/power/control";

/// Value that disables runtime suspend
const POWER_ON: &str = "on";

/// Disables runtime autosuspend by writing to a sysfs `power/control` file
#[derive(Debug, Clone)]
pub struct SysfsPowerControl {
    path: PathBuf,
}

impl SysfsPowerControl {
    /// Control the device whose `power/control` file is at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the control file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `on` to the control file
    pub fn keep_on(&self) -> Result<()> {
        std::fs::write(&self.path, POWER_ON).map_err(|e| LinuxSpiError::PowerControlFailed {
            path: self.path.display().to_string(),
            source: e,
        })?;
        log::debug!("linux_spi: Disabled autosuspend via {}", self.path.display());
        Ok(())
    }
}

impl PowerManagement for SysfsPowerControl {
    fn disable_autosuspend(&mut self) -> CoreResult<()> {
        self.keep_on().map_err(|e| {
            log::debug!("linux_spi: {}", e);
            e.kind()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spishim_core::Error as CoreError;

    #[test]
    fn test_writes_on() {
        let path = std::env::temp_dir().join(format!("spishim-power-{}", std::process::id()));
        std::fs::write(&path, "auto").unwrap();

        let mut pm = SysfsPowerControl::new(&path);
        pm.disable_autosuspend().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "on");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_fails() {
        let mut pm = SysfsPowerControl::new("/nonexistent/spishim/power/control");
        assert_eq!(
            pm.disable_autosuspend(),
            Err(CoreError::PowerManagementFailed)
        );
    }
}

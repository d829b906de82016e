use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

#[cfg(windows)]
const EXECUTABLE_NAMES: &[&str] = &["sam.cmd", "sam.exe", "sam"];
#[cfg(not(windows))]
const EXECUTABLE_NAMES: &[&str] = &["sam"];

/// Finds the `sam` executable.
///
/// Order: configured location, standard install locations, then `PATH`.
#[derive(Debug, Clone, Default)]
pub struct SamCliLocator {
    configured: Option<PathBuf>,
    standard_locations: Vec<PathBuf>,
    search_path: Option<OsString>,
}

impl SamCliLocator {
    /// Locator over the real environment
    pub fn from_env(configured: Option<PathBuf>) -> Self {
        Self {
            configured,
            standard_locations: standard_locations(),
            search_path: std::env::var_os("PATH"),
        }
    }

    /// Locator that only looks where it is told to
    pub fn isolated() -> Self {
        Self::default()
    }

    pub fn with_configured(mut self, path: impl Into<PathBuf>) -> Self {
        self.configured = Some(path.into());
        self
    }

    pub fn with_standard_locations(mut self, locations: Vec<PathBuf>) -> Self {
        self.standard_locations = locations;
        self
    }

    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn locate(&self) -> Option<PathBuf> {
        if let Some(configured) = &self.configured {
            if is_executable(configured) {
                debug!("Using configured SAM CLI at {}", configured.display());
                return Some(configured.clone());
            }
            debug!(
                "Configured SAM CLI location {} is not executable, searching",
                configured.display()
            );
        }

        if let Some(found) = self.standard_locations.iter().find(|p| is_executable(p)) {
            debug!("Found SAM CLI at standard location {}", found.display());
            return Some(found.clone());
        }

        let search_path = self.search_path.as_ref()?;
        for dir in std::env::split_paths(search_path) {
            for name in EXECUTABLE_NAMES {
                let candidate = dir.join(name);
                if is_executable(&candidate) {
                    debug!("Found SAM CLI on PATH at {}", candidate.display());
                    return Some(candidate);
                }
            }
        }

        None
    }
}

fn standard_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();

    if cfg!(windows) {
        locations.push(PathBuf::from(
            r"C:\Program Files\Amazon\AWSSAMCLI\bin\sam.cmd",
        ));
        locations.push(PathBuf::from(
            r"C:\Program Files (x86)\Amazon\AWSSAMCLI\bin\sam.cmd",
        ));
    } else {
        locations.push(PathBuf::from("/usr/local/bin/sam"));
        locations.push(PathBuf::from("/usr/bin/sam"));
        locations.push(PathBuf::from("/opt/homebrew/bin/sam"));
        if let Some(home) = std::env::var_os("HOME") {
            locations.push(PathBuf::from(home).join(".local/bin/sam"));
        }
    }

    locations
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn fake_sam(dir: &Path, mode: u32) -> PathBuf {
        let path = dir.join("sam");
        std::fs::write(&path, "#!/bin/sh\necho 'SAM CLI, version 1.0.0'\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn test_configured_location_wins() {
        let configured = TempDir::new().unwrap();
        let on_path = TempDir::new().unwrap();
        let expected = fake_sam(configured.path(), 0o755);
        fake_sam(on_path.path(), 0o755);

        let locator = SamCliLocator::isolated()
            .with_configured(&expected)
            .with_search_path(on_path.path().as_os_str());
        assert_eq!(locator.locate(), Some(expected));
    }

    #[test]
    fn test_standard_location_before_path() {
        let standard = TempDir::new().unwrap();
        let on_path = TempDir::new().unwrap();
        let expected = fake_sam(standard.path(), 0o755);
        fake_sam(on_path.path(), 0o755);

        let locator = SamCliLocator::isolated()
            .with_configured("/nonexistent/sam")
            .with_standard_locations(vec![PathBuf::from("/nonexistent/bin/sam"), expected.clone()])
            .with_search_path(on_path.path().as_os_str());
        assert_eq!(locator.locate(), Some(expected));
    }

    #[test]
    fn test_searches_path_entries() {
        let empty = TempDir::new().unwrap();
        let bin = TempDir::new().unwrap();
        let expected = fake_sam(bin.path(), 0o755);

        let search_path = std::env::join_paths([empty.path(), bin.path()]).unwrap();
        let locator = SamCliLocator::isolated().with_search_path(search_path);
        assert_eq!(locator.locate(), Some(expected));
    }

    #[test]
    fn test_non_executable_is_skipped() {
        let bin = TempDir::new().unwrap();
        fake_sam(bin.path(), 0o644);

        let locator = SamCliLocator::isolated().with_search_path(bin.path().as_os_str());
        assert_eq!(locator.locate(), None);
    }
}

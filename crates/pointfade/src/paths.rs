use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories_next::ProjectDirs;

pub const ENV_CONFIG_DIR: &str = "POINTFADE_CONFIG_DIR";
pub const CONFIG_FILE_NAME: &str = "pointfade.toml";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "Pointfade";
const APPLICATION: &str = "pointfade";

/// Which rule picked the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    Flag,
    Environment,
    Platform,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::Flag => write!(f, "--config flag"),
            ConfigOrigin::Environment => write!(f, "{ENV_CONFIG_DIR}"),
            ConfigOrigin::Platform => write!(f, "platform config directory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    path: PathBuf,
    origin: ConfigOrigin,
}

impl ConfigLocation {
    /// Resolves the config file: explicit flag, then `$POINTFADE_CONFIG_DIR`,
    /// then the platform config directory.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Ok(Self {
                path: path.to_path_buf(),
                origin: ConfigOrigin::Flag,
            });
        }
        if let Some(dir) = env_override(ENV_CONFIG_DIR) {
            return Ok(Self {
                path: dir.join(CONFIG_FILE_NAME),
                origin: ConfigOrigin::Environment,
            });
        }
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
            .ok_or_else(|| anyhow!("failed to determine user directories"))?;
        Ok(Self {
            path: project_dirs.config_dir().join(CONFIG_FILE_NAME),
            origin: ConfigOrigin::Platform,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> ConfigOrigin {
        self.origin
    }

    /// A file named on the command line must exist; discovered ones are optional.
    pub fn is_required(&self) -> bool {
        self.origin == ConfigOrigin::Flag
    }
}

fn env_override(name: &str) -> Option<PathBuf> {
    match env::var_os(name) {
        Some(value) if !value.is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::*;

    fn env_lock() -> &'static Mutex<()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    struct EnvGuard {
        key: &'static str,
        previous: Option<OsString>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &Path) -> Self {
            let previous = env::var_os(key);
            env::set_var(key, value);
            Self { key, previous }
        }

        fn clear(key: &'static str) -> Self {
            let previous = env::var_os(key);
            env::remove_var(key);
            Self { key, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = self.previous.take() {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    #[test]
    fn flag_wins_over_environment() {
        let _guard = env_lock().lock().unwrap();
        let root = TempDir::new().unwrap();
        let _env = EnvGuard::set(ENV_CONFIG_DIR, root.path());

        let explicit = root.path().join("custom.toml");
        let location = ConfigLocation::discover(Some(&explicit)).unwrap();
        assert_eq!(location.path(), explicit.as_path());
        assert_eq!(location.origin(), ConfigOrigin::Flag);
        assert!(location.is_required());
    }

    #[test]
    fn environment_directory_is_used_when_set() {
        let _guard = env_lock().lock().unwrap();
        let root = TempDir::new().unwrap();
        let _env = EnvGuard::set(ENV_CONFIG_DIR, root.path());

        let location = ConfigLocation::discover(None).unwrap();
        assert_eq!(location.path(), root.path().join(CONFIG_FILE_NAME));
        assert_eq!(location.origin(), ConfigOrigin::Environment);
        assert!(!location.is_required());
    }

    #[test]
    fn falls_back_to_platform_directory() {
        let _guard = env_lock().lock().unwrap();
        let _env = EnvGuard::clear(ENV_CONFIG_DIR);

        // Some CI sandboxes have no home directory; nothing to check there.
        if let Ok(location) = ConfigLocation::discover(None) {
            assert_eq!(location.origin(), ConfigOrigin::Platform);
            assert!(location.path().ends_with(CONFIG_FILE_NAME));
        }
    }
}

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories_next::ProjectDirs;
use sceneconfig::CONFIG_FILE_NAME;

pub const ENV_CONFIG_DIR: &str = "CLOUDHIGH_CONFIG_DIR";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "CloudHigh";
const APPLICATION: &str = "cloudhigh";

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
}

impl AppPaths {
    pub fn discover() -> Result<Self> {
        if let Some(config_dir) = env_override(ENV_CONFIG_DIR) {
            return Ok(Self { config_dir });
        }
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
            .ok_or_else(|| anyhow!("failed to determine user directories"))?;
        Ok(Self {
            config_dir: project_dirs.config_dir().to_path_buf(),
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }
}

fn env_override(name: &str) -> Option<PathBuf> {
    match env::var_os(name) {
        Some(value) if !value.as_os_str().is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

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
    fn env_override_takes_precedence() {
        let _guard = env_lock().lock().unwrap();
        let root = TempDir::new().unwrap();
        let config_dir = root.path().join("config");
        let _config_guard = EnvGuard::set(ENV_CONFIG_DIR, &config_dir);

        let paths = AppPaths::discover().unwrap();

        assert_eq!(paths.config_dir(), config_dir.as_path());
        assert_eq!(paths.config_file(), config_dir.join("cloudhigh.toml"));
    }

    #[test]
    fn empty_override_is_ignored() {
        let _guard = env_lock().lock().unwrap();
        let _config_guard = EnvGuard::set(ENV_CONFIG_DIR, Path::new(""));
        assert_eq!(env_override(ENV_CONFIG_DIR), None);
    }
}

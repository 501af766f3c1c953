use std::path::Path;

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use pin_selector::CpuId;
use serde::Deserialize;

use crate::affinity;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PinConfigFile {
    /// CPUs to rotate over; `None` means every logical CPU of the host
    pub cpus: Option<Vec<CpuId>>,

    /// Worker threads sharing the selector
    pub workers: usize,

    /// Pins each worker draws before exiting
    pub rounds_per_worker: usize,

    /// Bind workers to the drawn core instead of only recording the draw
    pub apply_affinity: bool,

    pub log_dir: String,
    pub log_level: String,
}

impl Default for PinConfigFile {
    fn default() -> Self {
        Self {
            cpus: None,
            workers: 4,
            rounds_per_worker: 8,
            apply_affinity: false,
            log_dir: "./logs".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl PinConfigFile {
    /// Configured CPU list, falling back to every host CPU
    pub fn cpu_ids(&self) -> Vec<CpuId> {
        self.cpus.clone().unwrap_or_else(affinity::default_cpu_ids)
    }
}

/// Load a TOML config file, overridden by `PIN_*` environment variables
///
/// `PIN_CPUS` takes a comma separated list, e.g. `PIN_CPUS=0,2,4`.
pub fn load_pin_config<P: AsRef<Path>>(path: P) -> Result<PinConfigFile, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path.as_ref()))
        .add_source(Environment::with_prefix("PIN").try_parsing(true).list_separator(",").with_list_parse_key("cpus"))
        .build()?;

    config.try_deserialize()
}

/// Load pin config with fallback to default
pub fn load_pin_config_or_default(path: &str) -> PinConfigFile {
    match load_pin_config(path) {
        Ok(config) => {
            tracing::info!("Loaded pin config from {path}");
            config
        }
        Err(err) => {
            tracing::warn!("Failed to load pin config from {}: {}. Using defaults.", path, err);
            PinConfigFile::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use super::*;

    // `PIN_*` variables are process-wide; every test that loads a file holds this
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pin.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = PinConfigFile::default();
        assert_eq!(config.cpus, None);
        assert_eq!(config.workers, 4);
        assert_eq!(config.rounds_per_worker, 8);
        assert!(!config.apply_affinity);
        assert_eq!(config.cpu_ids(), affinity::default_cpu_ids());
    }

    #[test]
    fn test_load_full_config() {
        let (_dir, path) = write_config(
            r#"
            cpus = [3, 7, 3]
            workers = 2
            rounds_per_worker = 5
            apply_affinity = true
            log_dir = "/tmp/pin-logs"
            log_level = "debug"
            "#,
        );

        let _env = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let config = load_pin_config(&path).unwrap();
        assert_eq!(config.cpus, Some(vec![3, 7, 3]));
        assert_eq!(config.cpu_ids(), vec![3, 7, 3]);
        assert_eq!(config.workers, 2);
        assert_eq!(config.rounds_per_worker, 5);
        assert!(config.apply_affinity);
        assert_eq!(config.log_dir, "/tmp/pin-logs");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let (_dir, path) = write_config("workers = 16\n");

        let _env = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let config = load_pin_config(&path).unwrap();
        assert_eq!(config.workers, 16);
        assert_eq!(config.cpus, None);
        assert_eq!(config.rounds_per_worker, 8);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let _env = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        assert!(load_pin_config(&path).is_err());

        let config = load_pin_config_or_default(path.to_str().unwrap());
        assert_eq!(config.workers, PinConfigFile::default().workers);
    }

    #[test]
    fn test_env_overrides() {
        let (_dir, path) = write_config("workers = 2\nrounds_per_worker = 9\n");
        let _env = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        std::env::set_var("PIN_CPUS", "0,2,4");
        std::env::set_var("PIN_ROUNDS_PER_WORKER", "3");
        let result = load_pin_config(&path);
        std::env::remove_var("PIN_CPUS");
        std::env::remove_var("PIN_ROUNDS_PER_WORKER");

        let config = result.unwrap();
        assert_eq!(config.cpus, Some(vec![0, 2, 4]));
        assert_eq!(config.rounds_per_worker, 3);
        // Untouched keys keep the file value
        assert_eq!(config.workers, 2);
    }
}

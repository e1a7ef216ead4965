// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, RoborunError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::RoborunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.runner, raw.paths, raw.job))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_runner(cfg)?;
    validate_job(cfg)?;
    Ok(())
}

fn validate_runner(cfg: &RawConfigFile) -> Result<()> {
    if cfg.runner.binary.trim().is_empty() {
        return Err(RoborunError::ConfigError(
            "[runner].binary must not be empty".to_string(),
        ));
    }

    if cfg.runner.test_root.as_os_str().is_empty() {
        return Err(RoborunError::ConfigError(
            "[runner].test_root must be set to the directory containing test definitions"
                .to_string(),
        ));
    }

    if !cfg.runner.test_root.is_dir() {
        return Err(RoborunError::ConfigError(format!(
            "[runner].test_root {:?} is not an existing directory",
            cfg.runner.test_root
        )));
    }

    if cfg.runner.stop_grace_secs == 0 {
        return Err(RoborunError::ConfigError(
            "[runner].stop_grace_secs must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_job(cfg: &RawConfigFile) -> Result<()> {
    if cfg.job.log_capacity == 0 {
        return Err(RoborunError::ConfigError(
            "[job].log_capacity must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

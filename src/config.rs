// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::commands::transactions::MAX_HISTORY;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Daftar", "daftar"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_edit_timeout_secs")]
    pub edit_timeout_secs: u64,
}

fn default_history_limit() -> usize {
    MAX_HISTORY
}

fn default_edit_timeout_secs() -> u64 {
    300
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: None,
            history_limit: default_history_limit(),
            edit_timeout_secs: default_edit_timeout_secs(),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")
}

pub fn settings_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("settings.json"))
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join("daftar.sqlite"))
}

impl Settings {
    /// Reads settings from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Read settings {}", path.display()))?;
        let mut settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        settings.history_limit = settings.history_limit.clamp(1, MAX_HISTORY);
        Ok(settings)
    }

    /// Platform settings file; unreadable files fall back to defaults.
    pub fn load() -> Self {
        match settings_path().and_then(|p| Self::load_from(&p)) {
            Ok(s) => s,
            Err(err) => {
                log::warn!("using default settings: {err:#}");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, format!("{json}\n"))?;
        Ok(())
    }

    pub fn resolved_db_path(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(p) => Ok(p.clone()),
            None => default_db_path(),
        }
    }
}

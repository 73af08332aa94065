use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde_json::json;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::settings::{PlannerSettings, ResolvedSettings};

/// Planner settings backed by a YAML or JSON file. A missing file means
/// product defaults.
pub struct SettingsService {
    path: PathBuf,
    cache: RwLock<Option<PlannerSettings>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingsFormat {
    Yaml,
    Json,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> AppResult<PlannerSettings> {
        let cached = self
            .cache
            .read()
            .map_err(|_| AppError::other("settings cache lock poisoned"))?
            .clone();
        match cached {
            Some(settings) => Ok(settings),
            None => self.reload(),
        }
    }

    pub fn resolved(&self) -> AppResult<ResolvedSettings> {
        self.get()?.resolve()
    }

    /// Re-reads the file, validates it and refreshes the cache. On error the
    /// previously cached value is kept.
    pub fn reload(&self) -> AppResult<PlannerSettings> {
        let settings = self.load_from_disk()?;
        settings.resolve()?;

        let mut guard = self
            .cache
            .write()
            .map_err(|_| AppError::other("settings cache lock poisoned"))?;
        *guard = Some(settings.clone());
        Ok(settings)
    }

    fn load_from_disk(&self) -> AppResult<PlannerSettings> {
        let format = detect_format(&self.path)?;
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    target: "planner::settings",
                    path = %self.path.display(),
                    "settings file not found, using defaults"
                );
                return Ok(PlannerSettings::default());
            }
            Err(err) => return Err(err.into()),
        };

        if raw.trim().is_empty() {
            return Ok(PlannerSettings::default());
        }

        let settings = match format {
            SettingsFormat::Yaml => serde_yaml::from_str(&raw)?,
            SettingsFormat::Json => serde_json::from_str(&raw)?,
        };
        info!(
            target: "planner::settings",
            path = %self.path.display(),
            "planner settings loaded"
        );
        Ok(settings)
    }
}

fn detect_format(path: &Path) -> AppResult<SettingsFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("yaml") | Some("yml") => Ok(SettingsFormat::Yaml),
        Some("json") => Ok(SettingsFormat::Json),
        _ => Err(AppError::configuration_with_details(
            "settings file must be .yaml, .yml or .json",
            json!({"path": path.display().to_string()}),
        )),
    }
}

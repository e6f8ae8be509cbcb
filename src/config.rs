use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Smallest figure the six-panel layouts fit into.
pub const MIN_WIDTH: u32 = 800;
pub const MIN_HEIGHT: u32 = 600;

/// Report settings. Every field has a default, so a config file only needs the ones it changes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Mean efficiency (percent) an LMUL must exceed to be recommended as balanced.
    pub balanced_threshold: f64,
    /// Same, for the conservative recommendation.
    pub conservative_threshold: f64,
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            balanced_threshold: 40f64,
            conservative_threshold: 60f64,
            title: "RISC-V Vector LMUL Performance Analysis".to_string(),
            width: 2000,
            height: 1500,
        }
    }
}

impl ReportConfig {
    pub fn load(path: &Path) -> Result<ReportConfig> {
        let file = File::open(path).map_err(|source| Error::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ReportConfig =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::Json {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }
    /// Loads `path` if given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<ReportConfig> {
        path.map_or_else(|| Ok(ReportConfig::default()), ReportConfig::load)
    }
    pub fn validate(&self) -> Result<()> {
        if self.width < MIN_WIDTH || self.height < MIN_HEIGHT {
            return Err(Error::Config(format!(
                "figure size {}x{} is below the {}x{} minimum",
                self.width, self.height, MIN_WIDTH, MIN_HEIGHT
            )));
        }
        Ok(())
    }
    /// Replaces the title if it is still the default one, so a title from a config file wins.
    pub fn with_default_title(mut self, title: &str) -> ReportConfig {
        if self.title == ReportConfig::default().title {
            self.title = title.to_string();
        }
        self
    }
}

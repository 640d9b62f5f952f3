use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::env::var_os;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "lcm1602.json";

/// A piece of static text shown after startup.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Line {
    pub row: u8,
    #[serde(default)]
    pub column: u8,
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Config {
    pub lines: Vec<Line>,
    /// Row to keep the local time on, refreshed every second. `None` exits after drawing `lines`.
    #[serde(default)]
    pub clock_row: Option<u8>,
}

impl Config {
    fn path() -> PathBuf {
        let config_str = var_os("CONFIG_FILE");
        let config_str: &OsStr = config_str.as_deref().unwrap_or(OsStr::new(DEFAULT_CONFIG_FILE));
        PathBuf::from(config_str)
    }

    /// Loads the config from `CONFIG_FILE`. `Ok(None)` only if the file does not exist.
    pub fn try_load() -> eyre::Result<Option<Self>> {
        Self::try_load_from(&Self::path())
    }

    pub fn try_load_from(config_path: &Path) -> eyre::Result<Option<Self>> {
        if !config_path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(config_path)?;
        let reader = std::io::BufReader::new(file);
        let config = serde_json::from_reader(reader)
            .wrap_err_with(|| format!("Could not parse {}", config_path.display()))?;
        Ok(Some(config))
    }

    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, config_path: &Path) -> std::io::Result<()> {
        let file = std::fs::File::create(config_path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            lines: vec![Line {
                row: 1,
                column: 0,
                text: "LCM1602 ready".to_string(),
            }],
            clock_row: Some(2),
        }
    }
}

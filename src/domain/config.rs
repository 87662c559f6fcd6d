use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::domain::bank::{DEFAULT_ANNUAL_RATE, DEFAULT_OVERDRAFT_FEE, DEFAULT_OVERDRAFT_LIMIT};

/// The file name looked up when no configuration path is given.
pub const DEFAULT_CONFIG_FILE: &str = "desk.toml";

/// Errors reading or writing the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// The configuration file.
        path: PathBuf,
        /// The underlying failure.
        source: std::io::Error,
    },

    /// The file is not valid TOML for any known version.
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        /// The configuration file.
        path: PathBuf,
        /// The parser's error.
        source: toml::de::Error,
    },

    /// The configuration could not be rendered as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The file could not be written.
    #[error("failed to write config file {}: {source}", path.display())]
    Write {
        /// The configuration file.
        path: PathBuf,
        /// The underlying failure.
        source: std::io::Error,
    },
}

/// The on-disk format of the inventory file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreFormat {
    /// `id,nombre,cantidad,precio` rows.
    #[default]
    Csv,
    /// A versioned JSON document.
    Json,
}

impl StoreFormat {
    /// Guesses the format from a file extension, if it names one.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for StoreFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown store format '{other}' (expected csv or json)")),
        }
    }
}

impl fmt::Display for StoreFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Json => "json",
        })
    }
}

/// An item written into a freshly created inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedItem {
    /// The item key.
    pub id: String,
    /// The item name.
    pub name: String,
    /// Units in stock.
    #[serde(default)]
    pub quantity: i64,
    /// Unit price.
    #[serde(default)]
    pub price: f64,
}

/// Where and how the inventory is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySettings {
    /// Path of the inventory file, relative to the working directory.
    #[serde(default = "default_inventory_path")]
    pub path: PathBuf,

    /// File format. When absent, inferred from the path's extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<StoreFormat>,

    /// Added to the inventory the first time its file is created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<SeedItem>,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            path: default_inventory_path(),
            format: None,
            seed: Some(SeedItem {
                id: "1600713778".to_string(),
                name: "Adriel Sánchez".to_string(),
                quantity: 0,
                price: 0.0,
            }),
        }
    }
}

impl InventorySettings {
    /// The configured format, else the one the path implies, else CSV.
    #[must_use]
    pub fn resolved_format(&self) -> StoreFormat {
        self.format
            .or_else(|| StoreFormat::from_path(&self.path))
            .unwrap_or_default()
    }
}

fn default_inventory_path() -> PathBuf {
    PathBuf::from("inventario.csv")
}

/// Defaults for accounts opened from the console.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BankSettings {
    /// Annual rate for savings accounts.
    #[serde(default = "default_annual_rate")]
    pub annual_rate: f64,
    /// Overdraft limit for checking accounts.
    #[serde(default = "default_overdraft_limit")]
    pub overdraft_limit: f64,
    /// Overdraft fee for checking accounts.
    #[serde(default = "default_overdraft_fee")]
    pub overdraft_fee: f64,
}

impl Default for BankSettings {
    fn default() -> Self {
        Self {
            annual_rate: DEFAULT_ANNUAL_RATE,
            overdraft_limit: DEFAULT_OVERDRAFT_LIMIT,
            overdraft_fee: DEFAULT_OVERDRAFT_FEE,
        }
    }
}

const fn default_annual_rate() -> f64 {
    DEFAULT_ANNUAL_RATE
}

const fn default_overdraft_limit() -> f64 {
    DEFAULT_OVERDRAFT_LIMIT
}

const fn default_overdraft_fee() -> f64 {
    DEFAULT_OVERDRAFT_FEE
}

/// What the script dashboard browses and how it runs scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSettings {
    /// Directory the unit folders live in.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Menu key to unit folder name.
    #[serde(default = "default_units")]
    pub units: BTreeMap<String, String>,

    /// Extension (without the dot) of the files listed as scripts.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Program used to run a script.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    /// Clear the screen before drawing each menu.
    #[serde(default = "default_clear_screen")]
    pub clear_screen: bool,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            units: default_units(),
            extension: default_extension(),
            interpreter: default_interpreter(),
            clear_screen: default_clear_screen(),
        }
    }
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_units() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("1".to_string(), "Unidad 1".to_string()),
        ("2".to_string(), "Unidad 2".to_string()),
    ])
}

fn default_extension() -> String {
    "py".to_string()
}

fn default_interpreter() -> String {
    "python3".to_string()
}

const fn default_clear_screen() -> bool {
    true
}

/// Settings for every program in the toolkit.
///
/// Every section is optional in the file; missing sections and fields take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Inventory storage.
    pub inventory: InventorySettings,
    /// Bank account defaults.
    pub bank: BankSettings,
    /// Script dashboard.
    pub dashboard: DashboardSettings,
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::debug!("no config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            result => result,
        }
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        inventory: InventorySettings,

        #[serde(default)]
        bank: BankSettings,

        #[serde(default)]
        dashboard: DashboardSettings,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                inventory,
                bank,
                dashboard,
            } => Self {
                inventory,
                bank,
                dashboard,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            inventory: config.inventory,
            bank: config.bank,
            dashboard: config.dashboard,
        }
    }
}

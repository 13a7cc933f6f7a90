use std::{
    collections::HashSet,
    fs,
    path::PathBuf,
    sync::{LazyLock, PoisonError, RwLock},
    time::Duration,
};

use documented::{Documented, DocumentedFields};
use pkgview_utils::{
    path::{resolve_path, xdg_config_home, xdg_data_dirs, xdg_data_home},
    time::parse_std_duration,
};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;
use tracing::{debug, info};

use crate::{
    annotations::annotate_toml_table,
    display::DisplaySettings,
    error::{ConfigError, Result},
    listing::SortKey,
};

/// Prefix marking an `application_dirs` entry as system scope.
pub const SYSTEM_DIR_PREFIX: &str = "system:";

/// Application's configuration
#[derive(Clone, Debug, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Config {
    /// Include system applications in listings.
    /// Default: false
    pub include_system: Option<bool>,

    /// Default ordering of the application list: "none", "name" or "package".
    /// Default: "name"
    pub sort: Option<SortKey>,

    /// Locale used to pick localized application names, e.g. "en_US".
    /// Default: derived from $LANG
    pub locale: Option<String>,

    /// Directories scanned for desktop entries, in precedence order.
    /// Prefix an entry with "system:" to mark its applications as system applications.
    /// Default: $XDG_DATA_HOME/applications, then system:<dir>/applications for each $XDG_DATA_DIRS entry
    pub application_dirs: Option<Vec<String>>,

    /// Data directories searched for themed icons (icons/hicolor) and pixmaps.
    /// Default: $XDG_DATA_HOME, then each $XDG_DATA_DIRS entry
    pub icon_dirs: Option<Vec<String>>,

    /// Image used when an application has no resolvable icon.
    /// Default: the bundled icon
    pub default_icon: Option<String>,

    /// Artificial delay applied after each application lookup, e.g. "50ms".
    /// Default: "0ms"
    pub lookup_delay: Option<String>,

    /// Display settings for terminal output
    pub display: Option<DisplaySettings>,
}

/// One entry of the application search path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplicationDir {
    pub path: PathBuf,
    pub system: bool,
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("PKGVIEW_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("pkgview").join("config.toml"),
    })
});

pub fn init() -> Result<()> {
    let config = Config::new()?;
    let mut global_config = CONFIG.write().unwrap_or_else(PoisonError::into_inner);
    *global_config = Some(config);
    Ok(())
}

pub fn get_config() -> Config {
    {
        let config_guard = CONFIG.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(config) = config_guard.as_ref() {
            return config.clone();
        }
    }

    let mut config_guard = CONFIG.write().unwrap_or_else(PoisonError::into_inner);
    config_guard.get_or_insert_with(Config::default_config).clone()
}

pub fn config_path() -> PathBuf {
    CONFIG_PATH
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .to_path_buf()
}

pub fn set_config_path(path: PathBuf) {
    let mut config_path = CONFIG_PATH.write().unwrap_or_else(PoisonError::into_inner);
    *config_path = path;
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            include_system: Some(false),
            sort: Some(SortKey::default()),
            locale: None,
            application_dirs: None,
            icon_dirs: None,
            default_icon: None,
            lookup_delay: Some("0ms".to_string()),
            display: Some(DisplaySettings {
                progress_style: Some(Default::default()),
                icons: Some(true),
                spinners: Some(true),
            }),
        }
    }

    /// Creates a new configuration by loading it from the configuration file.
    /// If the configuration file is not found, it uses the default configuration.
    pub fn new() -> Result<Self> {
        if std::env::var("PKGVIEW_STEALTH").is_ok() {
            return Ok(Self::default_config());
        }

        let config_path = config_path();

        let mut config = match fs::read_to_string(&config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    "no config file at {}, using defaults",
                    config_path.display()
                );
                Self::default_config()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    pub fn resolve(&mut self) -> Result<()> {
        self.include_system.get_or_insert(false);
        self.sort.get_or_insert_with(SortKey::default);
        self.lookup_delay.get_or_insert_with(|| "0ms".to_string());

        if let Some(delay) = &self.lookup_delay {
            if parse_std_duration(delay).is_none() {
                return Err(ConfigError::InvalidLookupDelay(delay.clone()));
            }
        }

        if let Some(locale) = &self.locale {
            if locale.trim().is_empty() {
                return Err(ConfigError::EmptyLocale);
            }
        }

        if let Some(dirs) = &self.application_dirs {
            let mut seen_dirs = HashSet::new();
            for dir in dirs {
                let path = dir.strip_prefix(SYSTEM_DIR_PREFIX).unwrap_or(dir).trim();
                if !seen_dirs.insert(path) {
                    return Err(ConfigError::DuplicateApplicationDir(path.to_string()));
                }
            }
        }

        Ok(())
    }

    pub fn include_system(&self) -> bool {
        self.include_system.unwrap_or(false)
    }

    pub fn sort(&self) -> SortKey {
        self.sort.unwrap_or_default()
    }

    /// The configured locale, else the language part of `$LANG` (`en_US.UTF-8` → `en_US`).
    pub fn locale(&self) -> Option<String> {
        if let Some(locale) = &self.locale {
            return Some(locale.clone());
        }

        std::env::var("LANG")
            .ok()
            .and_then(|lang| {
                lang.split(['.', '@'])
                    .next()
                    .map(str::to_string)
            })
            .filter(|lang| !lang.is_empty() && lang != "C" && lang != "POSIX")
    }

    pub fn get_application_dirs(&self) -> Result<Vec<ApplicationDir>> {
        let Some(dirs) = &self.application_dirs else {
            let mut dirs = vec![ApplicationDir {
                path: xdg_data_home().join("applications"),
                system: false,
            }];
            dirs.extend(xdg_data_dirs().into_iter().map(|dir| {
                ApplicationDir {
                    path: dir.join("applications"),
                    system: true,
                }
            }));
            return Ok(dirs);
        };

        dirs.iter()
            .map(|entry| -> Result<ApplicationDir> {
                let (raw, system) = match entry.strip_prefix(SYSTEM_DIR_PREFIX) {
                    Some(rest) => (rest, true),
                    None => (entry.as_str(), false),
                };
                Ok(ApplicationDir {
                    path: resolve_path(raw)?,
                    system,
                })
            })
            .collect()
    }

    pub fn get_icon_dirs(&self) -> Result<Vec<PathBuf>> {
        let Some(dirs) = &self.icon_dirs else {
            let mut dirs = vec![xdg_data_home()];
            dirs.extend(xdg_data_dirs());
            return Ok(dirs);
        };

        dirs.iter()
            .map(|dir| resolve_path(dir).map_err(ConfigError::from))
            .collect()
    }

    pub fn default_icon_path(&self) -> Result<Option<PathBuf>> {
        self.default_icon
            .as_deref()
            .map(resolve_path)
            .transpose()
            .map_err(Into::into)
    }

    pub fn lookup_delay(&self) -> Duration {
        self.lookup_delay
            .as_deref()
            .and_then(parse_std_duration)
            .unwrap_or(Duration::ZERO)
    }

    pub fn display(&self) -> DisplaySettings {
        self.display.clone().unwrap_or_default()
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;

        annotate_toml_table::<Config>(doc.as_table_mut())?;

        if let Some(display_table) = doc.get_mut("display").and_then(|item| item.as_table_mut()) {
            annotate_toml_table::<DisplaySettings>(display_table)?;
        }

        Ok(doc)
    }
}

pub fn generate_default_config() -> Result<()> {
    let config_path = config_path();

    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    let def_config = Config::default_config();
    let annotated_doc = def_config.to_annotated_document()?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&config_path, annotated_doc.to_string())?;
    info!(
        "Default configuration file generated with documentation at: {}",
        config_path.display()
    );
    Ok(())
}

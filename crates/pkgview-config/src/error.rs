use miette::Diagnostic;
use pkgview_utils::error::{PathError, UtilsError};
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(pkgview_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(pkgview_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(pkgview_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("Duplicate application directory: {0}")]
    #[diagnostic(
        code(pkgview_config::duplicate_application_dir),
        help("Each directory in `application_dirs` must appear only once")
    )]
    DuplicateApplicationDir(String),

    #[error("Invalid lookup delay: {0}")]
    #[diagnostic(
        code(pkgview_config::invalid_lookup_delay),
        help("Use a duration such as `50ms`, `1s` or `0ms`")
    )]
    InvalidLookupDelay(String),

    #[error("Locale must not be empty")]
    #[diagnostic(
        code(pkgview_config::empty_locale),
        help("Remove the `locale` key or set it to a value such as `en_US`")
    )]
    EmptyLocale,

    #[error("IO error: {0}")]
    #[diagnostic(code(pkgview_config::io))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(pkgview_config::utils))]
    Utils(#[from] UtilsError),

    #[error("Failed to parse TOML: {0}")]
    #[diagnostic(code(pkgview_config::toml))]
    Toml(#[from] toml_edit::TomlError),

    #[error("Encountered unexpected TOML item: {0}")]
    #[diagnostic(code(pkgview_config::unexpected_toml_item))]
    UnexpectedTomlItem(String),
}

impl From<PathError> for ConfigError {
    fn from(err: PathError) -> Self {
        Self::Utils(UtilsError::Path(err))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

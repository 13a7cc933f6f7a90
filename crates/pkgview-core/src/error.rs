//! Error types for pkgview-core.

use miette::Diagnostic;
use pkgview_config::error::ConfigError;
use pkgview_utils::error::PathError;
use thiserror::Error;

/// Failure of a single query against a [`PackageRegistry`](crate::registry::PackageRegistry).
#[derive(Error, Diagnostic, Debug)]
pub enum RegistryError {
    #[error("Package '{0}' not found")]
    #[diagnostic(
        code(pkgview::registry::package_not_found),
        help("The application may have been uninstalled while listing")
    )]
    PackageNotFound(String),

    #[error("No label for package '{0}'")]
    #[diagnostic(code(pkgview::registry::missing_label))]
    MissingLabel(String),

    #[error("No icon found for package '{0}'")]
    #[diagnostic(
        code(pkgview::registry::icon_not_found),
        help("Install an icon theme or set `default_icon` in the config")
    )]
    IconNotFound(String),
}

/// Core error type for pkgview operations.
#[derive(Error, Diagnostic, Debug)]
pub enum PkgviewError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    #[diagnostic(
        code(pkgview::path),
        help("Check the path and any environment variables it references")
    )]
    PathError(#[from] PathError),

    #[error("Error while {action}")]
    #[diagnostic(code(pkgview::io), help("Check file permissions"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    #[diagnostic(code(pkgview::error))]
    Custom(String),
}

/// Trait for adding context to IO errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, PkgviewError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, PkgviewError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            PkgviewError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}

use error::PkgviewError;

pub mod desktop_entry;
pub mod enumerator;
pub mod error;
pub mod models;
pub mod registry;
pub mod sort;

pub type PkgviewResult<T> = std::result::Result<T, PkgviewError>;

pub mod loader;
pub mod presenter;
pub mod progress;

pub use loader::{LoadListener, LoadStatus, LoadTask, PackageLoader};
pub use presenter::{PackagesPresenter, PackagesView};

#[cfg(test)]
pub(crate) mod test_utils;

pub mod annotations;
pub mod config;
pub mod display;
pub mod error;
pub mod listing;

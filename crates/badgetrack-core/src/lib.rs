pub mod browser;
pub mod bucket;
pub mod config;
pub mod error;
pub mod event;
pub mod keys;
pub mod recorder;
pub mod stats;
pub mod store;

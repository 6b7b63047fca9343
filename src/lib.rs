pub mod api;
pub mod catalog;
pub mod config;
pub mod interactive;
pub mod logging;
pub mod query;
pub mod store;

pub mod api;
pub mod app;
pub mod common;
pub mod config;
pub mod database;
pub mod entity;
pub mod logger;
pub mod params;
pub mod search;
pub mod serde;
pub mod server;

pub use app::AppState;

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod provider;
pub mod services;
pub mod state;

pub use app::app;

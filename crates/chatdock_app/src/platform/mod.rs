//! Terminal host for the chat widget.
mod app;
mod config;
mod logging;
mod surface;

pub use app::run_app;

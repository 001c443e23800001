//! HTTP read surface and command-line entry points for pressroom.

pub mod api;
pub mod cli;
pub mod commands;
pub mod logging;
pub mod metrics;
pub mod state;

pub use api::create_router;
pub use state::AppState;

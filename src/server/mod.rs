mod book_routes;
pub mod config;
mod http_layers;
pub mod metrics;
#[allow(clippy::module_inception)]
pub mod server;
pub(self) mod session;
pub mod state;
mod upload_routes;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, make_metrics_app, run_server};
pub use state::ServerState;

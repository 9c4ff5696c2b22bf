pub mod config;
mod http_layers;
mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use http_layers::RequestsLoggingLevel;
pub use server::run_server;

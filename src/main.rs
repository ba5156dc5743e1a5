/*
 * Responsibility
 * - start the tokio runtime
 * - call app::run() (no logic here)
 */
use anyhow::Result;

mod api;
mod app;
mod config;
mod error;
mod headers;
mod middleware;
mod services;
mod settings;
mod state;

#[tokio::main]
async fn main() -> Result<()> {
    app::run().await
}

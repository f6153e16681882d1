//! Serve command - HTTP front ends over the QA chain

use crate::chain::RetrievalQa;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::server::{serve, shutdown_signal, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Resolve the listen address, preferring an explicit `--bind`
pub fn resolve_bind(config: &Config, bind: Option<&str>) -> Result<SocketAddr> {
    match bind {
        Some(addr) => addr
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", addr, e))),
        None => config.bind_addr(),
    }
}

/// Serve until Ctrl-C
pub async fn cmd_serve(config: &Config, qa: RetrievalQa, bind: Option<&str>) -> Result<()> {
    let addr = resolve_bind(config, bind)?;
    let listener = TcpListener::bind(addr).await?;
    println!("Serving on http://{}  (Ctrl-C to stop)", listener.local_addr()?);

    serve(listener, Arc::new(AppState { qa }), shutdown_signal()).await
}

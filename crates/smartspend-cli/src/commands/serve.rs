//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};

pub async fn cmd_serve(host: &str, port: u16, static_dir: Option<&Path>) -> Result<()> {
    println!("🚀 Starting SmartSpend web server...");
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "gemini".to_string());
    println!("   AI backend: {}", backend);
    if backend.eq_ignore_ascii_case("gemini") && std::env::var("GEN_API_KEY").is_err() {
        println!();
        println!("   ⚠️  GEN_API_KEY not set - receipt analysis and the assistant will fail");
    }
    println!();

    let static_dir = static_dir.map(|p| p.to_string_lossy().to_string());
    smartspend_server::serve(host, port, static_dir.as_deref())
        .await
        .context("Server failed")
}

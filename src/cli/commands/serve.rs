//! Web server command.

use console::style;

use crate::config::Settings;

const DEFAULT_PORT: u16 = 5000;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: &str) -> anyhow::Result<()> {
    let addr = normalize_bind_address(bind);

    println!("{} Preparing database...", style("→").cyan());
    settings.ensure_directories()?;
    let ctx = settings.create_db_context();
    if let Err(e) = ctx.init_schema().await {
        eprintln!("  {} Schema setup failed: {}", style("✗").red(), e);
        return Err(anyhow::anyhow!("Database setup failed: {}", e));
    }
    println!("  {} Database ready", style("✓").green());

    println!(
        "{} Starting sitesearch API at http://{}",
        style("→").cyan(),
        addr
    );
    println!("  Search backend: {}", settings.elasticsearch_url);
    println!(
        "  Token store: {}",
        settings.cache_backend.as_deref().unwrap_or("memory")
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings, &addr).await
}

/// Accept a port ("5000"), a host ("0.0.0.0") or host:port.
fn normalize_bind_address(bind: &str) -> String {
    if let Ok(port) = bind.parse::<u16>() {
        return format!("127.0.0.1:{}", port);
    }
    if let Some((_, port)) = bind.rsplit_once(':') {
        if port.parse::<u16>().is_ok() {
            return bind.to_string();
        }
    }
    format!("{}:{}", bind, DEFAULT_PORT)
}

//! Initialize command.

use console::style;

use crate::config::Settings;

/// Initialize the data directory and database.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    let ctx = settings.create_db_context();
    ctx.init_schema().await?;

    let websites = ctx.websites().list().await?;
    if websites.is_empty() {
        println!("{} No websites registered yet", style("!").yellow());
        println!("  Add one with: sitesearch website add <name> <domain>");
    }

    println!(
        "{} Initialized sitesearch database at {}",
        style("✓").green(),
        settings.database_url()
    );

    Ok(())
}

//! Website management commands.

use console::style;

use crate::config::Settings;

use super::super::helpers::{short_time, truncate};

/// Register a tenant website.
pub async fn cmd_website_add(settings: &Settings, name: &str, domain: &str) -> anyhow::Result<()> {
    let repo = settings.create_db_context().websites();

    if let Some(existing) = repo.get_by_domain(domain).await? {
        println!(
            "{} Website '{}' already registered as '{}' (id {})",
            style("!").yellow(),
            existing.domain,
            existing.name,
            existing.id
        );
        return Ok(());
    }

    let site = repo.add(name, domain).await?;
    println!(
        "{} Added website '{}' ({}), id {}",
        style("✓").green(),
        site.name,
        site.domain,
        site.id
    );
    Ok(())
}

/// List registered websites.
pub async fn cmd_website_list(settings: &Settings) -> anyhow::Result<()> {
    let sites = settings.create_db_context().websites().list().await?;

    if sites.is_empty() {
        println!(
            "{} No websites registered. Use 'sitesearch website add' first.",
            style("!").yellow()
        );
        return Ok(());
    }

    println!("\n{}", style("Websites").bold());
    println!("{}", "-".repeat(70));
    println!("{:<5} {:<25} {:<25} Added", "ID", "Name", "Domain");
    println!("{}", "-".repeat(70));
    for site in sites {
        println!(
            "{:<5} {:<25} {:<25} {}",
            site.id,
            truncate(&site.name, 24),
            truncate(&site.domain, 24),
            short_time(&site.created_at)
        );
    }
    Ok(())
}

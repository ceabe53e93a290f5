//! Credential management commands.

use console::style;

use crate::config::Settings;
use crate::repository::util::is_unique_violation;

use super::super::helpers::{short_time, truncate};

/// Issue credentials for the website owning `domain`.
pub async fn cmd_credential_issue(
    settings: &Settings,
    domain: &str,
    description: &str,
    limit: i32,
) -> anyhow::Result<()> {
    let ctx = settings.create_db_context();

    let Some(site) = ctx.websites().get_by_domain(domain).await? else {
        println!(
            "{} No website registered for '{}'. Add it with 'sitesearch website add'.",
            style("✗").red(),
            domain
        );
        return Ok(());
    };

    let credential = match ctx.credentials().issue(site.id, description, limit).await {
        Ok(c) => c,
        Err(e) if is_unique_violation(&e) => {
            println!(
                "{} A credential described as '{}' already exists",
                style("✗").red(),
                description
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "{} Issued credential for {} ({})",
        style("✓").green(),
        site.domain,
        credential.description
    );
    println!("  appkey:    {}", style(&credential.appkey).cyan());
    println!("  appsecret: {}", style(&credential.appsecret).cyan());
    println!(
        "  {}",
        style("Store the secret now; listings only show its prefix.").dim()
    );
    Ok(())
}

/// List credentials with their websites.
pub async fn cmd_credential_list(settings: &Settings) -> anyhow::Result<()> {
    let rows = settings.create_db_context().credentials().list().await?;

    if rows.is_empty() {
        println!("{} No credentials issued", style("!").yellow());
        return Ok(());
    }

    println!("\n{}", style("Credentials").bold());
    println!("{}", "-".repeat(96));
    println!(
        "{:<34} {:<9} {:<20} {:<20} {:<6} Issued",
        "Appkey", "Secret", "Description", "Website", "Limit"
    );
    println!("{}", "-".repeat(96));
    for (credential, site) in rows {
        println!(
            "{:<34} {:<9} {:<20} {:<20} {:<6} {}",
            credential.appkey,
            credential.masked_secret(),
            truncate(&credential.description, 19),
            truncate(&site.domain, 19),
            credential.frequency_limit,
            short_time(&credential.created_at)
        );
    }
    Ok(())
}

/// Revoke a credential.
pub async fn cmd_credential_revoke(settings: &Settings, appkey: &str) -> anyhow::Result<()> {
    if settings.create_db_context().credentials().revoke(appkey).await? {
        println!("{} Revoked {}", style("✓").green(), appkey);
        println!("  Requests with its live session token now fail authorization.");
    } else {
        println!("{} No credential with appkey {}", style("✗").red(), appkey);
    }
    Ok(())
}

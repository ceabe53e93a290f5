//! Feedback and bad-URL review commands.

use console::style;

use crate::config::Settings;

use super::super::helpers::{short_time, truncate};

fn status_mark(checked: bool) -> String {
    if checked {
        style("✓").green().to_string()
    } else {
        style("•").yellow().to_string()
    }
}

pub async fn cmd_feedback_list(settings: &Settings, unchecked_only: bool) -> anyhow::Result<()> {
    let entries = settings
        .create_db_context()
        .submissions()
        .list_feedback(unchecked_only)
        .await?;

    if entries.is_empty() {
        println!("{} No feedback", style("!").yellow());
        return Ok(());
    }

    println!("\n{}", style("Feedback").bold());
    for entry in entries {
        println!(
            "{} #{:<5} {} {:<30} {}",
            status_mark(entry.checked),
            entry.id,
            short_time(&entry.created_at),
            truncate(&entry.email, 30),
            entry.ip.as_deref().unwrap_or("-")
        );
        println!("    {}", truncate(&entry.content, 100));
    }
    Ok(())
}

pub async fn cmd_feedback_check(settings: &Settings, id: i32) -> anyhow::Result<()> {
    if settings.create_db_context().submissions().check_feedback(id).await? {
        println!("{} Feedback #{} marked as processed", style("✓").green(), id);
    } else {
        println!("{} No feedback with id {}", style("✗").red(), id);
    }
    Ok(())
}

pub async fn cmd_badurl_list(settings: &Settings, unchecked_only: bool) -> anyhow::Result<()> {
    let reports = settings
        .create_db_context()
        .submissions()
        .list_bad_urls(unchecked_only)
        .await?;

    if reports.is_empty() {
        println!("{} No bad URL reports", style("!").yellow());
        return Ok(());
    }

    println!("\n{}", style("Bad URL reports").bold());
    for report in reports {
        println!(
            "{} #{:<5} {} {}",
            status_mark(report.checked),
            report.id,
            short_time(&report.created_at),
            report.url
        );
        println!("    {}", truncate(&report.reason, 100));
    }
    Ok(())
}

pub async fn cmd_badurl_check(settings: &Settings, id: i32) -> anyhow::Result<()> {
    if settings.create_db_context().submissions().check_bad_url(id).await? {
        println!("{} Report #{} marked as processed", style("✓").green(), id);
    } else {
        println!("{} No report with id {}", style("✗").red(), id);
    }
    Ok(())
}

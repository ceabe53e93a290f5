//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod credential;
mod init;
mod serve;
mod sign;
mod submission;
mod website;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::load_settings;
use crate::models::DEFAULT_FREQUENCY_LIMIT;

#[derive(Parser)]
#[command(name = "sitesearch")]
#[command(about = "Signed multi-tenant search gateway over Elasticsearch")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Run the HTTP API server
    Serve {
        /// Address to bind: port, host, or host:port (default from config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Manage tenant websites
    Website {
        #[command(subcommand)]
        command: WebsiteCommands,
    },

    /// Manage API credentials
    Credential {
        #[command(subcommand)]
        command: CredentialCommands,
    },

    /// Review user feedback
    Feedback {
        #[command(subcommand)]
        command: ReviewCommands,
    },

    /// Review reported bad URLs
    Badurl {
        #[command(subcommand)]
        command: ReviewCommands,
    },

    /// Compute a request signature (client tooling)
    Sign {
        /// Request timestamp in milliseconds
        #[arg(long)]
        timestamp: i64,
        /// Session token
        #[arg(long)]
        token: String,
        /// Application key
        #[arg(long)]
        appkey: String,
    },
}

#[derive(Subcommand)]
enum WebsiteCommands {
    /// Register a website
    Add {
        /// Display name
        name: String,
        /// Domain used to scope searches (e.g. example.com)
        domain: String,
    },
    /// List registered websites
    List,
}

#[derive(Subcommand)]
enum CredentialCommands {
    /// Issue a new appkey/appsecret pair for a website
    Issue {
        /// Domain of the owning website
        domain: String,
        /// Unique description (e.g. "mobile app")
        description: String,
        /// Requests per minute recorded on the credential (informational only;
        /// the per-IP limit is set by `rate_limit_per_minute`)
        #[arg(short, long, default_value_t = DEFAULT_FREQUENCY_LIMIT)]
        limit: i32,
    },
    /// List credentials with their websites
    List,
    /// Delete a credential
    Revoke {
        /// Application key to revoke
        appkey: String,
    },
}

#[derive(Subcommand)]
enum ReviewCommands {
    /// List submissions, newest first
    List {
        /// Only show entries not yet processed
        #[arg(short, long)]
        unchecked: bool,
    },
    /// Mark a submission as processed
    Check {
        /// Submission ID
        id: i32,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Signing needs neither config nor database.
    if let Commands::Sign {
        timestamp,
        ref token,
        ref appkey,
    } = cli.command
    {
        sign::cmd_sign(timestamp, token, appkey);
        return Ok(());
    }

    let (settings, _config) = load_settings(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.bind.clone());
            serve::cmd_serve(&settings, &bind).await
        }
        Commands::Website { command } => match command {
            WebsiteCommands::Add { name, domain } => {
                website::cmd_website_add(&settings, &name, &domain).await
            }
            WebsiteCommands::List => website::cmd_website_list(&settings).await,
        },
        Commands::Credential { command } => match command {
            CredentialCommands::Issue {
                domain,
                description,
                limit,
            } => credential::cmd_credential_issue(&settings, &domain, &description, limit).await,
            CredentialCommands::List => credential::cmd_credential_list(&settings).await,
            CredentialCommands::Revoke { appkey } => {
                credential::cmd_credential_revoke(&settings, &appkey).await
            }
        },
        Commands::Feedback { command } => match command {
            ReviewCommands::List { unchecked } => {
                submission::cmd_feedback_list(&settings, unchecked).await
            }
            ReviewCommands::Check { id } => submission::cmd_feedback_check(&settings, id).await,
        },
        Commands::Badurl { command } => match command {
            ReviewCommands::List { unchecked } => {
                submission::cmd_badurl_list(&settings, unchecked).await
            }
            ReviewCommands::Check { id } => submission::cmd_badurl_check(&settings, id).await,
        },
        Commands::Sign { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_credential_issue() {
        let cli = Cli::try_parse_from([
            "sitesearch",
            "credential",
            "issue",
            "example.com",
            "mobile app",
            "--limit",
            "10",
        ])
        .unwrap();
        match cli.command {
            Commands::Credential {
                command:
                    CredentialCommands::Issue {
                        domain,
                        description,
                        limit,
                    },
            } => {
                assert_eq!(domain, "example.com");
                assert_eq!(description, "mobile app");
                assert_eq!(limit, 10);
            }
            _ => panic!("expected credential issue"),
        }
    }

    #[test]
    fn test_issue_limit_help_names_the_enforced_setting() {
        use clap::CommandFactory;
        let mut cli = Cli::command();
        let issue = cli
            .find_subcommand_mut("credential")
            .and_then(|c| c.find_subcommand_mut("issue"))
            .expect("credential issue subcommand");
        let limit = issue
            .get_arguments()
            .find(|a| a.get_id() == "limit")
            .expect("--limit argument");
        let help = limit
            .get_long_help()
            .or_else(|| limit.get_help())
            .map(|h| h.to_string())
            .unwrap_or_default();

        assert!(help.contains("informational"));
        assert!(help.contains("rate_limit_per_minute"));
    }

    #[test]
    fn test_parse_review_flags() {
        let cli = Cli::try_parse_from(["sitesearch", "-v", "badurl", "list", "--unchecked"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Badurl {
                command: ReviewCommands::List { unchecked: true }
            }
        ));
    }
}

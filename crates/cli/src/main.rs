mod config;
mod list;
mod output;
mod profile_cmd;
mod scope_cmd;
mod watch;

use clap::{Parser, Subcommand};
use opchecklist_core::{CompletionFilter, PeriodFilter};
use std::path::PathBuf;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "opchecklist", about = "Operational checklists grouped by period")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch checklists for an event and print them grouped by operational period
    List {
        /// Event id (defaults to `view.event_id` from config)
        #[arg(long)]
        event: Option<String>,

        /// Operational period treated as current
        #[arg(long)]
        current_period: Option<String>,

        /// Case-insensitive substring match on checklist names
        #[arg(long)]
        search: Option<String>,

        /// `incident-level`, a period id, or `period:<id>` for ids that clash with a keyword
        #[arg(long)]
        period: Option<PeriodFilter>,

        /// all, not-started, in-progress or complete
        #[arg(long, default_value = "all")]
        status: CompletionFilter,

        /// Include archived checklists
        #[arg(long)]
        archived: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show or set the visibility scope (own position vs. all positions)
    Scope {
        #[arg(long, value_enum)]
        set: Option<scope_cmd::ScopeArg>,
    },

    /// Show or set the stored user profile
    Profile {
        /// Comma-separated position labels; the first is primary
        #[arg(long)]
        positions: Option<String>,

        #[arg(long, value_enum)]
        role: Option<profile_cmd::RoleArg>,
    },

    /// Replay JSONL realtime events through the reconciler
    Watch {
        /// Event file, or `-` for stdin
        #[arg(long)]
        events: PathBuf,

        /// Refetch the list after the replay
        #[arg(long)]
        refresh: bool,

        /// Event id (defaults to `view.event_id` from config)
        #[arg(long)]
        event: Option<String>,
    },

    /// Show or set configuration
    Config {
        /// Set the server URL
        #[arg(long)]
        server: Option<String>,

        /// Set the API key
        #[arg(long)]
        api_key: Option<String>,

        /// Set the default event id
        #[arg(long)]
        event: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List {
            event,
            current_period,
            search,
            period,
            status,
            archived,
            format,
        } => {
            list::run_list(list::ListArgs {
                event,
                current_period,
                search,
                period,
                status,
                archived,
                format,
            })
            .await
        }
        Commands::Scope { set } => scope_cmd::run_scope(set),
        Commands::Profile { positions, role } => {
            if positions.is_none() && role.is_none() {
                profile_cmd::show_profile()
            } else {
                profile_cmd::set_profile(positions, role)
            }
        }
        Commands::Watch {
            events,
            refresh,
            event,
        } => watch::run_watch(&events, refresh, event).await,
        Commands::Config {
            server,
            api_key,
            event,
        } => {
            if server.is_none() && api_key.is_none() && event.is_none() {
                config::show_config()
            } else {
                config::set_config(server, api_key, event)
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

//! CLI command definitions for the `coachd` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod extract;
pub mod user;

use clap::{Parser, Subcommand};

/// Identity coaching backend.
#[derive(Parser)]
#[command(name = "coachd", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "COACH_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn,coachd=info,coach_api=info",
            1 => "info,coach_core=debug,coach_infra=debug,coach_api=debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the REST API server and the background job worker.
    Serve {
        /// Address to listen on (overrides `[server] bind`).
        #[arg(long)]
        bind: Option<String>,
    },

    /// Create a user together with their coaching state.
    CreateUser {
        /// Name the coach addresses the user by.
        name: String,
    },

    /// Send one message as the user and print the coach's reply.
    Chat {
        /// User id (UUID).
        user_id: String,
        /// Message text.
        text: String,

        /// Print the exact prompt sent to the oracle.
        #[arg(long)]
        show_prompt: bool,
    },

    /// Run note extraction over the user's chat history now.
    Extract {
        /// User id (UUID).
        user_id: String,
    },

    /// Stop the coach from raising an identity category with the user.
    SkipCategory {
        /// User id (UUID).
        user_id: String,
        /// Category value, e.g. `spiritual` or `maker_of_money`.
        category: String,
    },
}

/// Parse a user id argument.
pub(crate) fn parse_user_id(raw: &str) -> anyhow::Result<coach_types::user::UserId> {
    raw.trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid user id '{raw}': expected a UUID"))
}

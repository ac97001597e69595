use clap::{Parser, Subcommand};

/// Duplexer webhook — approval gate for queued document jobs
#[derive(Parser)]
#[command(name = "duplexer-webhook", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the webhook server
    Serve {
        /// Port to bind (overrides WEBHOOK_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Inspect or decide approvals directly in the pending directory
    Approval {
        #[command(subcommand)]
        command: ApprovalCommands,
    },
}

#[derive(Subcommand)]
pub enum ApprovalCommands {
    /// List tokens that have a .pending marker
    List,
    /// Show the status of a token
    Status { token: String },
    /// Approve a pending token
    Approve { token: String },
    /// Reject a pending token
    Reject { token: String },
}

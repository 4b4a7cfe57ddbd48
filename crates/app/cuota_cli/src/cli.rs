//! Command-line interface definition.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cuota", version, about = "Cuota loan-management client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and persist the session.
    Login {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
    },
    /// Show the current session state.
    Status,
    /// Print the logged-in user.
    Whoami,
    /// Force a token refresh.
    Refresh,
    /// Keep the session fresh until interrupted.
    Watch,
    /// Clear the persisted session.
    Logout,
}

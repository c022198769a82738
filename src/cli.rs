use clap::{Parser, Subcommand};

/// opsboard — operational status board
#[derive(Parser)]
#[command(name = "opsboard", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the status server
    Serve {
        /// Port to bind (overrides server.port from the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Hash a password for the accounts section of the config file
    HashPassword {
        password: String,
    },
}

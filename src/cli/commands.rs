use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `dbot` - EC2 state watcher, disk alerts and a chat relay over Telegram.
#[derive(Parser, Debug)]
#[command(name = "dbot")]
#[command(version)]
#[command(about = "Personal operations assistant over Telegram.", long_about = None)]
pub struct Cli {
    /// Config file (defaults to $DBOT_CONFIG, then $XDG_CONFIG_HOME/dbot.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log at DEBUG instead of INFO
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the daemon: instance poller, disk monitor, retention sweeper and Telegram bot
    Run,

    /// Reconcile the registry and print every instance plus daemon health
    Status,

    /// Start stopped instances and stop running ones
    Toggle {
        /// Instance names or unique prefixes
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Send one message to the assistant and print the reply
    Chat {
        #[arg(short, long)]
        message: String,
    },

    /// Trim the conversation log
    Clean {
        /// Turns to keep (defaults to chat.retain)
        #[arg(long)]
        keep: Option<usize>,
    },

    /// Print current disk usage of the watched path
    Disk,
}

pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "linkdrop")]
#[command(about = "Share-handoff queue between a share helper and its host app", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the share pipeline and append the result to the queue
    Save {
        /// Shared text, as delivered by a plain-text provider
        text: Vec<String>,
        /// Direct URL payload, as delivered by a URL-typed provider
        #[arg(long)]
        url: Option<String>,
        /// Pre-rendered caption accompanying the share
        #[arg(long)]
        caption: Option<String>,
        /// Title to apply at confirm time, as if edited by the user
        #[arg(long)]
        title: Option<String>,
        /// Resolve a display thumbnail before confirming
        #[arg(long)]
        thumbnail: bool,
    },
    /// List queued items without clearing them
    List,
    /// Clear the queue (the redirect preference is kept)
    Clear,
    /// Set the redirect-after-share preference
    Redirect {
        #[arg(value_parser = clap::value_parser!(bool))]
        enabled: bool,
    },
    /// Subscribe to the queue and print each delivered snapshot
    Watch,
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "postboard")]
#[command(author, version, about = "Write, list and delete your blog posts")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Signed-in user ID (overrides the config session)
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Signed-in user email (overrides the config session)
    #[arg(long, global = true)]
    pub email: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List your posts, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new post
    Create {
        /// Post title
        #[arg(short, long)]
        title: String,

        /// Post content
        #[arg(short = 'b', long)]
        content: String,

        /// Image file to attach
        #[arg(short, long)]
        image: Option<PathBuf>,
    },

    /// Delete one of your posts and its image
    Delete {
        /// ID of the post to delete
        #[arg(required = true)]
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

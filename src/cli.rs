//! Command-line interface definitions for Tube Tracker.
//!
//! This module defines the CLI arguments and subcommands using the `clap`
//! crate. The API key can be provided via flag or environment variable.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Tube Tracker application.
///
/// # Examples
///
/// ```sh
/// # Check monetization signals for two channels
/// tube_tracker check UCabc… UCdef…
///
/// # Resolve a channel from a share URL
/// tube_tracker lookup "https://www.youtube.com/@somehandle" --api-key YOUR_KEY
///
/// # Search channels and keep only those with 10k+ subscribers
/// tube_tracker search "cooking" --min-subscribers 10000
/// ```
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Write the result JSON to a file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Infer monetization status for one or more channels from public pages
    Check {
        /// Channel ids to check (`UC…`)
        #[arg(required = true)]
        channel_ids: Vec<String>,

        /// How many checks to run concurrently; keep low to avoid upstream blocks
        #[arg(long, default_value_t = 2)]
        concurrency: usize,
    },

    /// Look up one channel by id or URL and print its normalized record
    Lookup {
        /// Channel id (`UC…`) or any public channel URL
        target: String,

        /// YouTube Data API key
        #[arg(long, env = "YOUTUBE_API_KEY")]
        api_key: String,
    },

    /// Search channels by keyword
    Search {
        /// Free-text search query
        query: String,

        /// YouTube Data API key
        #[arg(long, env = "YOUTUBE_API_KEY")]
        api_key: String,

        /// Drop channels below this subscriber count
        #[arg(long, default_value_t = 1000)]
        min_subscribers: u64,

        /// Search page size
        #[arg(long, default_value_t = 25)]
        max_results: u32,

        /// Continuation token from a previous result page
        #[arg(long)]
        page_token: Option<String>,
    },
}

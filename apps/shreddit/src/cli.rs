use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};

use crate::captions::Genre;
use crate::layout::{Band, FontFamily};
use crate::reddit::Category;
use crate::store::DEFAULT_GALLERY_SIZE;

/// Meme generator: pictures from Reddit, captions typed or written by AI.
#[derive(Parser, Debug)]
#[command(name = "shreddit", version)]
#[command(about = "🎸 Make memes from Reddit pictures, with optional AI captions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Caption a picture (URL or local file) and save the meme
    #[command(group(ArgGroup::new("theme").args(["band", "genre"])))]
    Make {
        /// Image URL or local path (png, jpg, jpeg, gif)
        source: String,

        #[arg(
            short,
            long,
            default_value = "",
            conflicts_with_all = ["ai", "band", "genre"],
            help = "Top caption"
        )]
        top: String,

        #[arg(
            short,
            long,
            default_value = "",
            conflicts_with_all = ["ai", "band", "genre"],
            help = "Bottom caption"
        )]
        bottom: String,

        #[arg(long, help = "Let the AI write the captions")]
        ai: bool,

        #[arg(long, help = "AI captions themed on this band (implies --ai)")]
        band: Option<String>,

        #[arg(long, help = "AI captions themed on this genre (implies --ai)")]
        genre: Option<Genre>,

        #[arg(short, long, help = "Output file name inside the output directory")]
        output: Option<String>,
    },

    /// List image posts from a subreddit
    Browse {
        /// Subreddit name; defaults to the first configured meme subreddit
        subreddit: Option<String>,

        #[arg(short, long, default_value_t = Category::Hot, help = "hot, new, top or rising")]
        category: Category,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        #[arg(long, help = "Skip the HEAD request that checks each image is reachable")]
        no_validate: bool,
    },

    /// Search the meme subreddits by keyword
    Search {
        keyword: String,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Show the biggest meme subreddits
    Trending {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Find pictures of a band, optionally turning one into an AI meme
    Band {
        name: String,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        #[arg(long, help = "Make an AI meme from result N (1-based)")]
        pick: Option<usize>,
    },

    /// Find pictures for a music genre, optionally turning one into an AI meme
    Genre {
        genre: Genre,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        #[arg(long, help = "Make an AI meme from result N (1-based)")]
        pick: Option<usize>,
    },

    /// List the supported music genres
    Genres,

    /// Replace the captions of an existing meme with AI-written ones
    #[command(group(ArgGroup::new("theme").args(["band", "genre"])))]
    Regenerate {
        path: PathBuf,

        #[arg(long)]
        band: Option<String>,

        #[arg(long)]
        genre: Option<Genre>,
    },

    /// List recently generated memes
    Gallery {
        #[arg(short, long, default_value_t = DEFAULT_GALLERY_SIZE)]
        limit: usize,
    },

    /// Print the caption layout for a canvas as JSON, without drawing
    Layout {
        text: String,

        #[arg(long, default_value_t = 800)]
        width: i64,

        #[arg(long, default_value_t = 600)]
        height: i64,

        #[arg(long, default_value = "top", help = "top or bottom")]
        band: Band,

        #[arg(long, help = "Width table: impact, anton or dejavu_sans")]
        font: Option<FontFamily>,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the current settings (secrets masked)
    Show,

    /// Save Reddit API credentials
    Reddit {
        client_id: String,
        client_secret: String,

        #[arg(long)]
        user_agent: Option<String>,
    },

    /// Turn AI captions on or off
    #[command(group(ArgGroup::new("switch").args(["enable", "disable"]).required(true)))]
    Ai {
        #[arg(long)]
        enable: bool,

        #[arg(long)]
        disable: bool,

        #[arg(long)]
        temp_dir: Option<PathBuf>,

        #[arg(long)]
        model: Option<String>,
    },
}

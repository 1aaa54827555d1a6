//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Atelier - AI wardrobe assistant backed by Gemini
#[derive(Parser, Debug)]
#[command(name = "atelier")]
#[command(about = "AI wardrobe assistant backed by Gemini", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Show each traffic class's countdown; cooldowns live only within one process, so a fresh run reports ready
    Status,

    /// Ask the stylist a question
    Ask {
        /// The question
        prompt: String,

        /// Use the high-capability model with extended reasoning
        #[arg(long)]
        deep: bool,
    },

    /// Categorize a clothing photo
    Analyze {
        /// Path to a JPEG photo
        image: PathBuf,

        /// Detect every garment in the photo instead of a single item
        #[arg(long)]
        separate: bool,
    },

    /// Suggest outfits from a wardrobe export
    Suggest {
        /// Path to the wardrobe JSON export
        wardrobe: PathBuf,

        /// Occasion or brief, e.g. "gallery opening"
        prompt: String,
    },

    /// Analyse a wardrobe and recommend purchases
    Shop {
        /// Path to the wardrobe JSON export
        wardrobe: PathBuf,
    },

    /// Find boutiques and tailors near a location
    Boutiques {
        /// Latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },

    /// Generate a fashion image
    Image {
        /// What to draw
        prompt: String,

        /// Aspect ratio, e.g. 1:1, 3:4, 9:16
        #[arg(long, default_value = "1:1")]
        aspect_ratio: String,

        /// Output size: 1K, 2K or 4K
        #[arg(long, default_value = "1K")]
        size: String,

        /// Write the PNG here instead of printing a data URL
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Generate a short portrait style video
    Video {
        /// What the video shows
        prompt: String,

        /// Where to write the MP4
        #[arg(long)]
        out: PathBuf,
    },
}

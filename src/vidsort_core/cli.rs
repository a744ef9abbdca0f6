use clap::{Parser, Subcommand};
use simplelog::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Organize loosely-named video files into a Movies/Series library")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable file logging to vidsort.log
    #[arg(long = "log", global = true)]
    pub log: bool,

    /// Log level for file logging (debug, info, warn, error)
    #[arg(long, default_value_t = LevelFilter::Debug, global = true)]
    pub log_level: LevelFilter,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Preview the moves organizing would perform, without touching anything
    Scan {
        /// Directory containing the videos to classify
        #[arg(required = true)]
        source_dir: PathBuf,

        /// Move grouped subtitles and archives along with their video
        #[arg(long)]
        move_sidecars: bool,

        /// Create Season NN subfolders for series episodes
        #[arg(long)]
        season_folders: bool,

        /// Scan subdirectories too, not just the top level
        #[arg(long)]
        recursive: bool,
    },

    /// Organize the directory: scan, then execute the planned moves
    Organize {
        /// Directory containing the videos to organize
        #[arg(required = true)]
        source_dir: PathBuf,

        /// Move grouped subtitles and archives along with their video
        #[arg(long)]
        move_sidecars: bool,

        /// Create Season NN subfolders for series episodes
        #[arg(long)]
        season_folders: bool,

        /// Scan subdirectories too, not just the top level
        #[arg(long)]
        recursive: bool,
    },

    /// Revert the most recent organize batch
    Undo {
        /// Directory that was organized (holds the undo record)
        #[arg(required = true)]
        source_dir: PathBuf,
    },

    /// Rename a folder in place to title case
    TitleCase {
        /// Folder to rename
        #[arg(required = true)]
        dir: PathBuf,

        /// Rename the immediate subfolders instead of the folder itself
        #[arg(long)]
        children: bool,
    },
}

//! Command line for the `photoswipe` binary.

use std::{path::PathBuf, time::Duration};

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;

use crate::{
    filter::{parse_date, FilterSpec},
    library::{LibraryOptions, DEFAULT_DEBOUNCE},
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Swipe through photos, stage favorite/keep/trash and apply on confirm"
)]
pub struct Args {
    /// Folder that holds the photo library
    #[arg(value_name = "DIRECTORY")]
    pub directory: PathBuf,

    /// Include photos in subfolders
    #[arg(short = 'r', long = "recursive", default_value_t = false)]
    pub recursive: bool,

    /// Longest side (pixels) photos are decoded to for display
    #[arg(short = 's', long = "display-size", default_value_t = 1024)]
    pub display_size: u32,

    /// Number of threads applying confirmed changes
    #[arg(short = 'j', long = "workers", default_value_t = 4)]
    pub workers: usize,

    /// Log what a commit would do instead of changing the library
    #[arg(short = 'd', long, default_value_t = false)]
    pub dry_run: bool,

    /// First day (YYYY-MM-DD) of the initial date filter
    #[arg(long = "from", value_name = "DATE", requires = "to")]
    pub from: Option<String>,

    /// Last day (YYYY-MM-DD, inclusive) of the initial date filter
    #[arg(long = "to", value_name = "DATE", requires = "from")]
    pub to: Option<String>,

    /// Start filtered to the last 30 days
    #[arg(long = "last-30-days", conflicts_with_all = ["from", "to"])]
    pub last_30_days: bool,

    /// Milliseconds to wait for a burst of library changes to settle
    #[arg(long = "debounce-ms", default_value_t = DEFAULT_DEBOUNCE.as_millis() as u64)]
    pub debounce_ms: u64,
}

/// Validated settings for one review session.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    pub library: LibraryOptions,
    pub display_size: u32,
    pub initial_filter: FilterSpec,
}

impl Args {
    pub fn into_config(self) -> Result<ReviewConfig> {
        self.into_config_at(Local::now().date_naive())
    }

    pub fn into_config_at(self, today: NaiveDate) -> Result<ReviewConfig> {
        if !self.directory.is_dir() {
            return Err(anyhow!("{} is not a directory", self.directory.display()));
        }
        if self.workers == 0 {
            return Err(anyhow!("--workers must be at least 1"));
        }
        if self.display_size == 0 {
            return Err(anyhow!("--display-size must be at least 1"));
        }

        let initial_filter = match (&self.from, &self.to) {
            (Some(from), Some(to)) => FilterSpec::date_range(date_arg(from)?, date_arg(to)?),
            (None, None) if self.last_30_days => FilterSpec::last_days(today, 30),
            (None, None) => FilterSpec::All,
            _ => return Err(anyhow!("--from and --to must be given together")),
        };

        Ok(ReviewConfig {
            library: LibraryOptions {
                root: self.directory,
                recursive: self.recursive,
                workers: self.workers,
                dry_run: self.dry_run,
                debounce: Duration::from_millis(self.debounce_ms),
            },
            display_size: self.display_size,
            initial_filter,
        })
    }
}

fn date_arg(text: &str) -> Result<NaiveDate> {
    parse_date(text).ok_or_else(|| anyhow!("invalid date {text:?}, expected YYYY-MM-DD"))
}

use clap::{Args, Parser, Subcommand};
use school_directory_common::FilterCriteria;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "school-directory")]
#[command(about = "Submit schools with photos and browse the directory", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a new school with up to 10 images
    Add {
        /// School name
        #[arg(long)]
        name: Option<String>,

        /// Street address
        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        state: Option<String>,

        /// 10-digit contact number
        #[arg(long)]
        contact: Option<String>,

        /// Contact email
        #[arg(long)]
        email: Option<String>,

        /// Image files
        images: Vec<PathBuf>,

        /// Also take every image in this folder
        #[arg(long)]
        image_dir: Option<PathBuf>,
    },

    /// List schools
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Run the image carousel over the listing
    Browse {
        #[command(flatten)]
        filter: FilterArgs,

        /// How long to run
        #[arg(long, default_value = "15")]
        seconds: u64,
    },

    /// Remove stored images (in-process backend only)
    DeleteImages {
        #[arg(required = true)]
        images: Vec<String>,
    },

    /// Show or change settings
    Config {
        /// Remote API base URL
        #[arg(long)]
        set_api_url: Option<String>,

        /// Print current settings
        #[arg(long)]
        show: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Name contains (case-insensitive)
    #[arg(long)]
    pub name: Option<String>,

    /// Exact city
    #[arg(long)]
    pub city: Option<String>,

    /// Exact state
    #[arg(long)]
    pub state: Option<String>,
}

impl FilterArgs {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            name_query: self.name.clone().unwrap_or_default(),
            city: self.city.clone(),
            state: self.state.clone(),
        }
    }
}

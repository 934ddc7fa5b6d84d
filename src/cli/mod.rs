use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod errors;
mod handlers;
mod types;
mod validation;

pub use handlers::*;
pub use types::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Embedding model to use instead of the one in config.yaml
    #[clap(long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the similarity matrix of queries against references
    Score {
        #[clap(flatten)]
        text_args: TextArgs,
    },
    /// Print the best matching reference for every query
    Match {
        #[clap(flatten)]
        text_args: TextArgs,
    },
    /// Match every record of a scraped CSV/JSON file against the intents
    Analyze {
        /// A .csv or .json file of scraped records
        input: PathBuf,

        /// Column holding the text to classify (e.g. "Post", "Comment Text")
        #[clap(short, long)]
        column: String,

        /// Output CSV path. Defaults to <input>_intents_<date>.csv
        #[clap(short, long)]
        output: Option<PathBuf>,

        /// Print JSON to stdout instead of writing a CSV
        #[clap(long, default_value = "false")]
        json: bool,
    },
    /// Print the normalized form of each text
    Normalize {
        #[clap(required = true, allow_hyphen_values = true)]
        texts: Vec<String>,
    },
    /// List configured intents
    Intents {},
}

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::commands;

#[derive(Parser)]
#[command(name = "twstock")]
#[command(about = "TWSE daily price history and listing tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ListSource {
    /// Scrape the exchange's ISIN listing page
    Twse,
    /// Read a CSV listing from a url
    Web,
    /// Read a CSV listing from a local file
    File,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch or update one symbol's daily price history
    History {
        /// Stock ID to get history for
        #[arg(short, long)]
        stock: Option<String>,
        /// Path to the history csv for reading/writing.
        /// Default: storage/[stock_id]/history.csv
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
    /// Obtain the security listing
    List {
        /// Where to get the list from
        #[arg(short, long, value_enum, default_value = "twse")]
        src: ListSource,
        /// Read the listing from a file in csv format
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Read the listing from a url that serves csv
        #[arg(short, long)]
        url: Option<String>,
        /// Write the listing to a file in csv format
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the listing
        #[arg(short, long)]
        verbose: bool,
    },
}

pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::History { stock, path } => {
            commands::history::run(stock, path);
        }
        Commands::List {
            src,
            file,
            url,
            output,
            verbose,
        } => {
            commands::list::run(src, file, url, output, verbose);
        }
    }
}

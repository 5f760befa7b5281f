use std::path::PathBuf;

use tracing::{info, warn};

use crate::cli::ListSource;
use crate::constants::TWSE_LISTING_URL;
use crate::error::Result;
use crate::models::ListedSecurity;
use crate::services::listing;

pub fn run(
    src: ListSource,
    file: Option<PathBuf>,
    url: Option<String>,
    output: Option<PathBuf>,
    verbose: bool,
) {
    match fetch_listing(src, file, url) {
        Ok(Some(securities)) => {
            if verbose {
                for s in &securities {
                    println!("{}\t{}\t{}\t{}\t{}", s.id, s.name, s.kind, s.class, s.begin_date);
                }
            }
            if let Some(output) = output {
                match listing::write_csv(&securities, &output) {
                    Ok(()) => info!("wrote {} securities to {}", securities.len(), output.display()),
                    Err(e) => {
                        eprintln!("❌ Writing listing failed: {}", e);
                        std::process::exit(1);
                    }
                }
            }
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("❌ Listing failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Resolve the listing from the selected source. `Ok(None)` means a
/// required input was missing and has already been reported.
fn fetch_listing(
    src: ListSource,
    file: Option<PathBuf>,
    url: Option<String>,
) -> Result<Option<Vec<ListedSecurity>>> {
    match src {
        ListSource::Twse => {
            if file.is_some() || url.is_some() {
                warn!("input file or url is ignored in twse mode");
            }
            Ok(Some(listing::from_twse(TWSE_LISTING_URL)?))
        }
        ListSource::Web => {
            let Some(url) = url else {
                println!("Url is not specified");
                return Ok(None);
            };
            Ok(Some(listing::from_csv_url(&url)?))
        }
        ListSource::File => {
            let Some(file) = file else {
                println!("You have to specify an input file");
                return Ok(None);
            };
            Ok(Some(listing::from_csv_file(&file)?))
        }
    }
}

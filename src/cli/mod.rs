//! Command-line parsing for the quarterly exchange-rate downloader.
//!
//! Only the shape of `--since` is checked here (a real `YYYY-MM-DD` date).
//! Whether it lies in the future depends on "today" and is decided by the
//! boundary calculator.

use std::path::PathBuf;

use clap::Parser;

use crate::quarter::parse_date;

#[derive(Debug, Parser)]
#[command(
    name = "fxq",
    version,
    about = "Retrieve quarterly exchange rate data from the US Treasury.",
    long_about = "Retrieve quarterly exchange rate data from the US Treasury and store it as one \
Parquet file per record date.\n\n\
Without flags, fetches everything since the close of the previous quarter (the current quarter \
is still being published). With --since, fetches everything since the close of the quarter \
containing that date."
)]
pub struct Cli {
    /// Date, inclusive, in the format YYYY-MM-DD; rounded forward to the end of its quarter.
    #[arg(short = 's', long, value_name = "YYYY-MM-DD", value_parser = validate_date_str)]
    pub since: Option<String>,

    /// Directory to write `<record_date>.parquet` files into.
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Read every written file back and check its row count.
    #[arg(long)]
    pub verify: bool,

    /// Log progress to stderr.
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

fn validate_date_str(raw: &str) -> Result<String, String> {
    parse_date(raw)
        .map(|_| raw.to_string())
        .map_err(|e| e.message().to_string())
}

use std::path::PathBuf;

use clap::Parser;

use crate::config;
use crate::sync::{Pipeline, ProcessError};

#[derive(Parser)]
#[command(name = "mytagbox")]
enum Cli {
    /// Sync MyTag comment labels into file metadata, the local tag database,
    /// and the rekordbox XML collection
    Sync(SyncArgs),
}

#[derive(clap::Args)]
struct SyncArgs {
    /// Path to the JSON configuration file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
}

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli {
        Cli::Sync(args) => sync(args),
    }
}

fn sync(args: SyncArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load(&args.config)?;
    let mut pipeline = Pipeline::new(&config)?;
    let files = pipeline.files()?;

    if files.is_empty() {
        eprintln!("No audio files to process. Nothing to do.");
        return Ok(());
    }

    let total = files.len();
    eprintln!("Processing {total} files\n");

    let mut processed = 0u32;
    let mut skipped = 0u32;
    let mut db_tags_added = 0usize;
    let mut catalog_updates = 0usize;

    for (i, file) in files.iter().enumerate() {
        let idx = i + 1;
        let label = file.display();
        match pipeline.process_file(file) {
            Ok(report) => {
                processed += 1;
                db_tags_added += report.db_tags_added;
                if report.catalog_updated {
                    catalog_updates += 1;
                }
                eprintln!(
                    "[{idx}/{total}] {label} ... {} fields, {} new tags{}",
                    report.fields_written,
                    report.db_tags_added,
                    if report.catalog_updated {
                        ", rekordbox updated"
                    } else {
                        ""
                    }
                );
            }
            Err(ProcessError::File(e)) => {
                skipped += 1;
                eprintln!("[{idx}/{total}] SKIP {label}: {e}");
            }
            // A store that can no longer be read or rewritten is fatal.
            Err(ProcessError::Store(e)) => return Err(e.into()),
        }
    }

    eprintln!("\nDone: {processed} processed, {skipped} skipped ({db_tags_added} new tags)");
    eprintln!("Tag database: {}", pipeline.db_path().display());
    if let Some(path) = pipeline.catalog_path() {
        eprintln!(
            "Rekordbox XML: {} ({catalog_updates} tracks updated)",
            path.display()
        );
    }
    Ok(())
}

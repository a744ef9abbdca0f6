use anyhow::Result;
use clap::Parser;
use simplelog::{CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, WriteLogger};
use std::fs::File;
use vidsort::vidsort_core::organize::{CancelToken, Organizer, title_case_children, title_case_folder};
use vidsort::vidsort_core::plan::{OpKind, PlanOptions};
use vidsort::vidsort_core::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize loggers
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Warn,
        Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )];

    if cli.log {
        loggers.push(WriteLogger::new(
            cli.log_level,
            Config::default(),
            File::create("vidsort.log")?,
        ));
    }

    CombinedLogger::init(loggers)?;

    match cli.command {
        Commands::Scan {
            source_dir,
            move_sidecars,
            season_folders,
            recursive,
        } => {
            let options = PlanOptions {
                move_sidecars,
                season_folders,
            };
            let mut organizer = Organizer::new(&source_dir, options, recursive)?;
            let report = organizer.scan()?;

            if report.plan.is_empty() {
                println!("Nothing to move (no matching files or already organized).");
            } else {
                println!("Previewing {} operations:\n", report.plan.move_count());
                let mut i = 0;
                for op in &report.plan.operations {
                    if op.kind != OpKind::Move {
                        continue;
                    }
                    i += 1;
                    let name = op.source.file_name().unwrap_or_default().to_string_lossy();
                    println!("{}. {}\n   -> {}", i, name, op.destination.display());
                }
            }

            for path in &report.plan.already_organized {
                println!("Already organized: {}", path.display());
            }
            for path in &report.unrecognized {
                println!("Unrecognized: {}", path.display());
            }
            println!("\nScan complete: {report}");
        }

        Commands::Organize {
            source_dir,
            move_sidecars,
            season_folders,
            recursive,
        } => {
            let options = PlanOptions {
                move_sidecars,
                season_folders,
            };
            let mut organizer = Organizer::new(&source_dir, options, recursive)?;
            organizer.scan()?;
            let report = organizer.organize(&CancelToken::default())?;

            for m in &report.moved {
                println!("Moved: {} -> {}", m.source.display(), m.destination.display());
            }
            for failure in &report.failures.failures {
                println!("Error moving {}: {}", failure.source.display(), failure.error);
            }
            println!("\nOrganize complete: {report}");
        }

        Commands::Undo { source_dir } => {
            let mut organizer = Organizer::new(&source_dir, PlanOptions::default(), false)?;
            let report = organizer.undo(&CancelToken::default())?;

            for m in &report.restored {
                println!("Restored: {} -> {}", m.source.display(), m.destination.display());
            }
            for failure in &report.failures.failures {
                println!("Undo error for {}: {}", failure.source.display(), failure.error);
            }
            println!("\nUndo complete: {report}");
        }

        Commands::TitleCase { dir, children } => {
            if children {
                let (renamed, failures) = title_case_children(&dir)?;
                for (old, new) in &renamed {
                    println!("Renamed: {} -> {}", old.display(), new.display());
                }
                for failure in &failures.failures {
                    println!("Error renaming {}: {}", failure.source.display(), failure.error);
                }
                println!("\nTitle case complete: {} renamed, {} errors", renamed.len(), failures.len());
            } else {
                match title_case_folder(&dir)? {
                    Some(new_path) => {
                        println!("Renamed: {} -> {}", dir.display(), new_path.display())
                    }
                    None => println!("Already title case: {}", dir.display()),
                }
            }
        }
    }

    Ok(())
}

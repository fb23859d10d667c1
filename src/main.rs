mod scanner;
mod store;
mod table;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hspdump", about = "Extract item and name tables from HSP game-data scripts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract equipment/wand records with their inv attributes
    Items {
        /// Item-definition script
        #[arg(short, long, default_value = "start.hsp")]
        input: PathBuf,
        /// Destination CSV
        #[arg(short, long, default_value = "output.csv")]
        output: PathBuf,
    },
    /// Extract localized item names
    Names {
        /// Name-table script
        #[arg(short, long, default_value = "start2.hsp")]
        input: PathBuf,
        /// Destination CSV
        #[arg(short, long, default_value = "output2.csv")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Items { input, output } => {
            let text = read_script(&input)?;
            let result = scanner::process_items(&text);
            write_csv(&output, &result.csv)?;
            println!(
                "Discovered {} inv indices; kept {} of {} records -> {}",
                result.indices,
                result.kept,
                result.total,
                output.display()
            );
        }
        Commands::Names { input, output } => {
            let text = read_script(&input)?;
            let result = scanner::process_names(&text);
            write_csv(&output, &result.csv)?;
            println!("Wrote {} name records -> {}", result.total, output.display());
        }
    }
    Ok(())
}

fn read_script(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn write_csv(path: &Path, csv: &str) -> anyhow::Result<()> {
    fs::write(path, format!("{}\n", csv)).with_context(|| format!("writing {}", path.display()))
}

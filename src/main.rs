mod assemblee;
mod enrich;
mod extract;
mod fetch;
mod output;
mod parties;
mod senat;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "amdt_scraper",
    about = "French parliamentary amendment scraper (Assemblée nationale / Sénat)"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape Assemblée nationale amendment JSON documents (PLF 2024)
    Assemblee {
        /// First article number of the range
        #[arg(long, default_value_t = assemblee::DEFAULT_START)]
        start: u32,
        /// Last article number of the range, inclusive
        #[arg(long, default_value_t = assemblee::DEFAULT_END)]
        end: u32,
        /// Endpoint family root
        #[arg(long, default_value = assemblee::DEFAULT_BASE_URL)]
        base_url: String,
        /// Output spreadsheet path
        #[arg(short, long, default_value = "article_data.csv")]
        out: PathBuf,
    },
    /// Scrape Sénat amendment HTML pages (Simplification bill, dossier 550)
    Senat {
        /// Dossier root (serves liste_discussion.json and amendment pages)
        #[arg(long, default_value = senat::DEFAULT_BASE_URL)]
        base_url: String,
        /// Senator roster endpoint
        #[arg(long, default_value = senat::DEFAULT_ROSTER_URL)]
        roster_url: String,
        /// Output spreadsheet path
        #[arg(short, long, default_value = "simplif_data.csv")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    match cli.command {
        Commands::Assemblee {
            start,
            end,
            base_url,
            out,
        } => {
            println!("Scraping amendments {}..={} from {}", start, end, base_url);
            let stats = assemblee::run(&base_url, start, end, &out).await?;
            println!(
                "Done: {} requested, {} collected, {} dropped. Data saved to {}",
                stats.total,
                stats.ok,
                stats.dropped,
                out.display()
            );
        }
        Commands::Senat {
            base_url,
            roster_url,
            out,
        } => {
            println!("Scraping amendments listed under {}", base_url);
            let stats = senat::run(&base_url, &roster_url, &out).await?;
            println!(
                "Done: {} listed, {} collected, {} dropped. Data saved to {}",
                stats.total,
                stats.ok,
                stats.dropped,
                out.display()
            );
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

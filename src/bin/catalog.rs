//! Sort Catalog CLI
//!
//! Scans, imports and searches sorts, and manages the catalog configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sort_catalog::{Catalog, CatalogConfig, SortSummary};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sort-catalog")]
#[command(about = "Discover, import and classify sorting algorithms")]
struct Cli {
    /// Config file (defaults to sort-catalog.toml and friends)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover built-in and plugin sorts and print the classified lists
    Scan {
        /// Also print rejected candidates and suggestions
        #[arg(short, long)]
        verbose: bool,
    },

    /// Compile and import sort source files
    Import {
        /// Source files; each must declare its package
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Fuzzy-search accepted sorts by name
    Search {
        query: String,
        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Write a JSON report of the catalog
    Report {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect or create the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration
    Init {
        #[arg(default_value = "sort-catalog.toml")]
        path: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CatalogConfig::load_from(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan { verbose } => {
            let mut catalog = Catalog::from_config(&config)?;
            let stats = catalog.scan_and_register_all()?;

            println!(
                "🔍 {} candidates, {} accepted, {} rejected ({} plugin modules)",
                stats.candidates, stats.accepted, stats.rejected, stats.modules
            );
            print_lists(&catalog);

            if verbose {
                print_findings(&catalog);
            } else if let Some(diagnostics) = catalog.diagnostics() {
                println!();
                println!("⚠️  {} sort(s) rejected (use --verbose)", diagnostics.len());
            }
            Ok(())
        }

        Commands::Import { files } => {
            let mut catalog = Catalog::from_config(&config)?;
            catalog.scan_and_register_all()?;

            let batch = files.len() > 1;
            let mut failed = 0;
            for file in &files {
                match catalog.import_single(file, !batch) {
                    Ok(name) => println!("✅ {}", name),
                    Err(e) => {
                        println!("❌ {}: {}", file.display(), e);
                        failed += 1;
                    }
                }
            }
            if batch {
                catalog.reorder();
            }

            println!();
            print_lists(&catalog);

            if failed > 0 {
                anyhow::bail!("{} of {} import(s) failed", failed, files.len());
            }
            Ok(())
        }

        Commands::Search { query, limit } => {
            let mut catalog = Catalog::from_config(&config)?;
            catalog.scan_and_register_all()?;

            let results = catalog.search(&query, limit);
            if results.is_empty() {
                println!("No sorts match '{}'", query);
            }
            for result in results {
                println!(
                    "  {:>4}  {} [{}] {}",
                    result.score,
                    result.summary.list_name,
                    result.summary.category,
                    result.summary.sort_type
                );
            }
            Ok(())
        }

        Commands::Report { output } => {
            let mut catalog = Catalog::from_config(&config)?;
            catalog.scan_and_register_all()?;

            let json = catalog.report().to_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("📄 Report written to {}", path.display());
                }
                None => println!("{}", json),
            }
            Ok(())
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", toml::to_string_pretty(&config)?);
                Ok(())
            }
            ConfigAction::Init { path, force } => {
                if std::path::Path::new(&path).exists() && !force {
                    anyhow::bail!("{} already exists (use --force to overwrite)", path);
                }
                CatalogConfig::default().save(&path)?;
                println!("✅ Wrote default configuration to {}", path);
                Ok(())
            }
        },
    }
}

fn print_lists(catalog: &Catalog) {
    print_axis("Comparison sorts", &catalog.comparison_summaries());
    print_axis("Distribution sorts", &catalog.distribution_summaries());
}

fn print_axis(title: &str, sorts: &[SortSummary]) {
    println!();
    println!("{} ({}):", title, sorts.len());
    let mut category = "";
    for sort in sorts {
        if sort.category != category {
            category = &sort.category;
            println!("  {}", category);
        }
        println!("    {:>3}  {}", sort.id, sort.list_name);
    }
}

fn print_findings(catalog: &Catalog) {
    if let Some(diagnostics) = catalog.diagnostics() {
        println!();
        println!("❌ Rejected:");
        for line in diagnostics {
            println!("  └─ {}", line);
        }
    }
    if let Some(suggestions) = catalog.suggestions() {
        println!();
        println!("💡 Suggestions:");
        for text in suggestions {
            for line in text.lines() {
                println!("  {}", line);
            }
        }
    }
}

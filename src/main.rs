//! Growlog CLI
//!
//! Command-line interface for the grow journal:
//! - Log in with a personal access token
//! - Browse experiments and entries
//! - Submit new entries (with photos) as atomic commits
//! - Chart measurements

use chrono::{NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use growlog::auth::{self, Credentials};
use growlog::cache::OfflineCache;
use growlog::config::{self, Config};
use growlog::journal::{
    filter_entries, render_chart, series, summarize, Entry, JournalStore, Measurements, Metric,
    NewExperiment,
};
use growlog::remote::{GitClient, RemoteError};
use growlog::JournalError;

#[derive(Parser)]
#[command(name = "growlog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Git-backed hydroponics grow journal")]
#[command(
    long_about = "Growlog keeps a hydroponics journal in a git repository.\nEvery entry you add lands as one commit: the entry document, the\nexperiment index, and any photos, all together."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Store credentials for the journal repository
    Login {
        /// Personal access token
        #[arg(long)]
        token: String,
        /// Repository owner
        #[arg(long)]
        owner: String,
        /// Repository name
        #[arg(long)]
        repo: String,
    },

    /// Remove stored credentials
    Logout,

    /// List experiments
    Experiments,

    /// Start a new experiment
    NewExperiment {
        /// Path-safe identifier (lowercase, digits, hyphens)
        slug: String,
        /// Display name
        name: String,
        /// Free-text description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Start date (default: today)
        #[arg(long)]
        started: Option<NaiveDate>,
    },

    /// List an experiment's entries
    Entries {
        /// Experiment slug
        slug: String,
        /// Filter entries by text (notes and dates)
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one entry
    Show {
        /// Experiment slug
        slug: String,
        /// Entry date or filename (e.g. 2026-08-26 or 2026-08-26-2.json)
        entry: String,
    },

    /// Add a journal entry
    Add {
        /// Experiment slug
        slug: String,
        /// Entry date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Time of day, HH:MM
        #[arg(long)]
        time: Option<NaiveTime>,
        /// Observation notes
        #[arg(short, long, default_value = "")]
        notes: String,
        /// pH reading
        #[arg(long)]
        ph: Option<f64>,
        /// EC reading (mS/cm)
        #[arg(long)]
        ec: Option<f64>,
        /// Water temperature (°C)
        #[arg(long)]
        water_temp: Option<f64>,
        /// Photo files to attach (compressed before upload)
        #[arg(short, long)]
        photo: Vec<PathBuf>,
    },

    /// Chart a measurement across an experiment
    Chart {
        /// Experiment slug
        slug: String,
        /// Measurement (ph, ec, water-temp)
        metric: Metric,
        /// Bar width in characters
        #[arg(long, default_value = "40")]
        width: usize,
    },

    /// Show credentials, remote, and cache health
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load_default();
    init_tracing(&config);

    match cli.command {
        Commands::Login { token, owner, repo } => {
            let creds = Credentials::new(token, owner, repo);
            auth::save(&creds)?;
            println!("Logged in to {}", creds.repo_slug());
        }

        Commands::Logout => {
            auth::clear()?;
            println!("Logged out");
        }

        Commands::Experiments => {
            let store = build_store(&config)?;
            let fetched = store.experiments().await?;
            warn_if_stale(fetched.stale);

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&fetched.value)?);
            } else if fetched.value.experiments.is_empty() {
                println!("No experiments yet.");
                println!();
                println!("Start one with:");
                println!("  growlog new-experiment basil-dwc \"Basil (DWC)\"");
            } else {
                println!(
                    "{:<16} {:<24} {:<12} {}",
                    "Slug", "Name", "Started", "Status"
                );
                println!("{}", "-".repeat(64));
                for exp in &fetched.value.experiments {
                    println!(
                        "{:<16} {:<24} {:<12} {}",
                        exp.slug, exp.name, exp.started, exp.status
                    );
                }
            }
        }

        Commands::NewExperiment {
            slug,
            name,
            description,
            started,
        } => {
            let store = build_store(&config)?;
            let outcome = store
                .create_experiment(NewExperiment {
                    slug: slug.clone(),
                    name,
                    description,
                    started: started.unwrap_or_else(|| Utc::now().date_naive()),
                })
                .await?;
            println!(
                "Started experiment {} (commit {})",
                slug,
                short_sha(&outcome.commit_sha)
            );
        }

        Commands::Entries { slug, search } => {
            let store = build_store(&config)?;
            let fetched = store.entries(&slug).await?;
            warn_if_stale(fetched.stale);

            let query = search.unwrap_or_default();
            let matched = filter_entries(&fetched.value, &query);

            if cli.format == "json" {
                let docs: Vec<&Entry> = matched.iter().map(|(_, e)| e).collect();
                println!("{}", serde_json::to_string_pretty(&docs)?);
            } else if matched.is_empty() {
                println!("No entries.");
            } else {
                println!(
                    "{:<22} {:<6} {:<6} {:<7} {:<7} {}",
                    "File", "pH", "EC", "Temp", "Photos", "Notes"
                );
                println!("{}", "-".repeat(80));
                for (filename, entry) in matched {
                    let m = entry.measurements.unwrap_or_default();
                    println!(
                        "{:<22} {:<6} {:<6} {:<7} {:<7} {}",
                        filename,
                        fmt_reading(m.ph),
                        fmt_reading(m.ec),
                        fmt_reading(m.water_temp),
                        entry.photos.len(),
                        truncate(&entry.notes, 36)
                    );
                }
            }
        }

        Commands::Show { slug, entry } => {
            let store = build_store(&config)?;
            let filename = if entry.ends_with(".json") {
                entry
            } else {
                format!("{}.json", entry)
            };
            let fetched = store.entry(&slug, &filename).await?;
            warn_if_stale(fetched.stale);

            let entry = fetched.value;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&entry)?);
            } else {
                match entry.time {
                    Some(time) => println!("{} {}", entry.date, time.format("%H:%M")),
                    None => println!("{}", entry.date),
                }
                if let Some(m) = &entry.measurements {
                    let mut parts = Vec::new();
                    if let Some(ph) = m.ph {
                        parts.push(format!("pH {:.1}", ph));
                    }
                    if let Some(ec) = m.ec {
                        parts.push(format!("EC {:.2} mS/cm", ec));
                    }
                    if let Some(t) = m.water_temp {
                        parts.push(format!("water {:.1}°C", t));
                    }
                    println!("{}", parts.join("  |  "));
                }
                if !entry.notes.is_empty() {
                    println!();
                    println!("{}", entry.notes);
                }
                if !entry.photos.is_empty() {
                    println!();
                    println!("Photos:");
                    for photo in &entry.photos {
                        println!("  {}", photo);
                    }
                }
            }
        }

        Commands::Add {
            slug,
            date,
            time,
            notes,
            ph,
            ec,
            water_temp,
            photo,
        } => {
            for path in &photo {
                if !path.exists() {
                    eprintln!("Photo not found: {:?}", path);
                    std::process::exit(1);
                }
            }

            let mut entry = Entry::new(date.unwrap_or_else(|| Utc::now().date_naive()))
                .notes(notes)
                .measurements(Measurements { ph, ec, water_temp });
            if let Some(t) = time {
                entry = entry.time(t);
            }

            let store = build_store(&config)?;
            match store.submit(&slug, entry, &photo).await {
                Ok(receipt) => {
                    println!(
                        "Committed {} as {} ({} photo{})",
                        receipt.entry_file,
                        short_sha(&receipt.commit_sha),
                        receipt.photos.len(),
                        if receipt.photos.len() == 1 { "" } else { "s" }
                    );
                }
                Err(JournalError::Remote(RemoteError::RefConflict(_))) => {
                    eprintln!("The branch moved while committing (another submission won).");
                    eprintln!("Nothing was recorded; run the same command again.");
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Chart {
            slug,
            metric,
            width,
        } => {
            let store = build_store(&config)?;
            let fetched = store.entries(&slug).await?;
            warn_if_stale(fetched.stale);

            let s = series(&fetched.value, metric);
            if let Some(summary) = summarize(&s) {
                println!(
                    "{} for {} ({} readings)",
                    metric, slug, summary.count
                );
                println!(
                    "min {:.2}  max {:.2}  mean {:.2}  latest {:.2} {}",
                    summary.min, summary.max, summary.mean, summary.latest,
                    metric.unit()
                );
                println!();
                print!("{}", render_chart(&s, width));
            } else {
                println!("No {} readings for {}.", metric, slug);
            }
        }

        Commands::Status => {
            println!("Growlog v{}", env!("CARGO_PKG_VERSION"));
            println!();

            match auth::load() {
                Ok(creds) => {
                    println!("Repository: {}", creds.repo_slug());
                    println!("Branch:     {}", config.remote.branch);

                    let client = GitClient::new(&config.remote, &creds)?;
                    match client.get_ref(&config.remote.branch).await {
                        Ok(r) => println!("Remote:     ok (head {})", short_sha(&r.object.sha)),
                        Err(e) => println!("Remote:     unreachable ({})", e),
                    }
                }
                Err(e) => println!("Credentials: {}", e),
            }

            let cache = OfflineCache::new(&config.cache);
            let stats = cache.stats();
            println!(
                "Cache:      {} files, {} KB",
                stats.files,
                stats.bytes / 1024
            );
        }

        Commands::Config { output } => {
            let content = config::generate_default_config();
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", content);
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| format!("growlog={}", config.logging.level)),
    );
    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn build_store(config: &Config) -> anyhow::Result<JournalStore> {
    let creds = auth::load()?;
    let client = GitClient::new(&config.remote, &creds)?;
    let cache = OfflineCache::new(&config.cache);
    Ok(JournalStore::new(client, cache, config))
}

fn warn_if_stale(stale: bool) {
    if stale {
        eprintln!("(offline: showing last fetched data)");
    }
}

fn short_sha(sha: &str) -> &str {
    &sha[..sha.len().min(8)]
}

fn fmt_reading(value: Option<f64>) -> String {
    value.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    let line = s.lines().next().unwrap_or("");
    if line.chars().count() <= max {
        line.to_string()
    } else {
        let cut: String = line.chars().take(max - 1).collect();
        format!("{}…", cut)
    }
}

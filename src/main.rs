use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use api_catalog::export::{self, Format};
use api_catalog::parser::detail::{self, DetailContext};
use api_catalog::parser::messages::MessageRow;
use api_catalog::{Catalog, Scanner, Settings, Version};

#[derive(Parser)]
#[command(name = "api_catalog", about = "Versioned catalog of engine event functions from HTML docs")]
struct Cli {
    /// Settings file (TOML); API_CATALOG_* environment variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep documentation roots and write the merged catalog
    Scan {
        /// Documentation root per version, as VERSION=PATH (repeatable)
        #[arg(short, long = "docs", value_parser = parse_root, required = true)]
        docs: Vec<(Version, PathBuf)>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Extract a single message detail page and print what was found
    Inspect {
        page: PathBuf,
        /// Namespace for unqualified parameter types
        #[arg(short, long, default_value = "")]
        namespace: String,
        /// Callback name (default: last dotted segment of the file name)
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long, default_value = "0")]
        version: Version,
    },
}

fn parse_root(s: &str) -> Result<(Version, PathBuf), String> {
    let (version, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected VERSION=PATH, got {:?}", s))?;
    let version = version.parse::<Version>().map_err(|e| e.to_string())?;
    Ok((version, PathBuf::from(path)))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("loading settings")?;

    match cli.command {
        Commands::Scan {
            docs,
            output,
            format,
        } => {
            let scanner = Scanner::new(settings)?;
            let mut catalog = Catalog::new();
            let summaries = run_scan(&scanner, &mut catalog, docs)?;

            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    export::write(&catalog, format, BufWriter::new(file))?;
                }
                None => export::write(&catalog, format, io::stdout().lock())?,
            }

            let callbacks: usize = summaries.iter().map(|s| s.observations).sum();
            eprintln!(
                "Catalogued {} types from {} versions ({} callback observations) in {}",
                catalog.len(),
                summaries.len(),
                callbacks,
                format_duration(t0.elapsed())
            );
            Ok(())
        }
        Commands::Inspect {
            page,
            namespace,
            name,
            version,
        } => {
            let scanner = Scanner::new(settings)?;
            let name = name.or_else(|| callback_name(&page)).ok_or_else(|| {
                anyhow!("cannot derive a callback name from {}", page.display())
            })?;
            let row = MessageRow {
                name,
                href: page.display().to_string(),
                summary: String::new(),
            };
            let rel_path = page.display().to_string();
            let ctx = DetailContext {
                namespace: &namespace,
                version: &version,
                rel_path: &rel_path,
            };
            let obs = detail::extract(&row, &page, ctx, scanner.selectors())
                .ok_or_else(|| anyhow!("no callback signature found in {}", page.display()))?;
            let mut out = io::stdout().lock();
            serde_json::to_writer_pretty(&mut out, &obs)?;
            writeln!(out)?;
            Ok(())
        }
    }
}

fn run_scan(
    scanner: &Scanner,
    catalog: &mut Catalog,
    docs: Vec<(Version, PathBuf)>,
) -> anyhow::Result<Vec<api_catalog::ScanSummary>> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:>10} [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let summaries = scanner.scan_all(catalog, docs, |version, ev| {
        if ev.completed == 1 {
            pb.set_prefix(version.to_string());
            pb.reset();
        }
        pb.set_length(ev.total as u64);
        pb.set_position(ev.completed as u64);
    });
    pb.finish_and_clear();
    Ok(summaries?)
}

/// `MonoBehaviour.OnCollisionEnter.html` → `OnCollisionEnter`.
fn callback_name(page: &Path) -> Option<String> {
    let stem = page.file_stem()?.to_str()?;
    stem.rsplit('.')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
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

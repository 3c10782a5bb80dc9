//! manifest-concat CLI
//!
//! Entry point for the `manifest-concat` command-line tool.

use clap::{Args, Parser, Subcommand};
use manifest_concat::config::CONFIG_FILE_NAME;
use manifest_concat::{ManifestDiscovery, ManifestDocument, ResolveContext, TaskConfig};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "manifest-concat")]
#[command(about = "Resolve JSON require manifests into concatenation jobs", version)]
struct Cli {
    /// Log added files and effective options
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover manifests and print the resulting jobs
    Resolve {
        #[command(flatten)]
        task: TaskArgs,

        /// Source directories to scan for manifests
        #[arg(long, short = 's')]
        src: Vec<PathBuf>,

        /// Scan source directories recursively
        #[arg(long, short = 'r', num_args = 0..=1, default_missing_value = "true")]
        recursive: Option<bool>,

        /// Write the job set document to this file
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Resolve a single manifest and show how it was interpreted
    Explain {
        /// Path to the manifest file
        manifest: PathBuf,

        #[command(flatten)]
        task: TaskArgs,

        /// Output in human-readable format instead of JSON
        #[arg(long)]
        human: bool,
    },
}

/// Task-level settings shared by both subcommands
#[derive(Args)]
struct TaskArgs {
    /// Path to task config file (default: manifest-concat.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(long, short = 'd')]
    dest: Option<PathBuf>,

    /// File extension to collect and emit
    #[arg(long, short = 'e')]
    extension: Option<String>,

    /// Offset applied to `require` paths
    #[arg(long)]
    cwd: Option<String>,

    /// Prepend a banner naming the manifest
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    banner: Option<bool>,

    /// Ask for a source map next to each output
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    source_map: Option<bool>,
}

impl TaskArgs {
    fn overrides(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if let Some(dest) = &self.dest {
            map.insert("dest".into(), Value::String(dest.to_string_lossy().into_owned()));
        }
        if let Some(ext) = &self.extension {
            map.insert("extension".into(), Value::String(ext.clone()));
        }
        if let Some(cwd) = &self.cwd {
            map.insert("cwd".into(), Value::String(cwd.clone()));
        }
        if let Some(banner) = self.banner {
            map.insert("banner".into(), Value::Bool(banner));
        }
        if let Some(source_map) = self.source_map {
            map.insert("source_map".into(), Value::Bool(source_map));
        }
        map
    }

    fn load(&self, mut overrides: Map<String, Value>) -> TaskConfig {
        overrides.extend(self.overrides());
        let config_path = self
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

        if self.config.is_some() && !config_path.exists() {
            eprintln!("Config file not found: {}", config_path.display());
            process::exit(1);
        }

        match TaskConfig::build(Some(&config_path), Some(Value::Object(overrides))) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                process::exit(1);
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Resolve {
            task,
            src,
            recursive,
            out,
            json,
        } => {
            run_resolve(&task, src, recursive, out, json);
        }
        Commands::Explain {
            manifest,
            task,
            human,
        } => {
            run_explain(&manifest, &task, human);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn current_dir() -> PathBuf {
    match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Cannot determine working directory: {}", e);
            process::exit(1);
        }
    }
}

fn run_resolve(
    task: &TaskArgs,
    src: Vec<PathBuf>,
    recursive: Option<bool>,
    out: Option<PathBuf>,
    json_output: bool,
) {
    let mut overrides = Map::new();
    if !src.is_empty() {
        let src: Vec<Value> = src
            .iter()
            .map(|p| Value::String(p.to_string_lossy().into_owned()))
            .collect();
        overrides.insert("src".into(), Value::Array(src));
    }
    if let Some(recursive) = recursive {
        overrides.insert("recursive".into(), Value::Bool(recursive));
    }

    let config = task.load(overrides);
    if let Err(e) = config.require_sources() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    let report = ManifestDiscovery::from_config(&config, current_dir()).discover(&config.src);

    if let Some(ref path) = out {
        if let Err(e) = report.jobs.write_to_file(path) {
            eprintln!("Error writing job set: {}", e);
            process::exit(1);
        }
    }

    if json_output {
        match report.jobs.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    if report.jobs.is_empty() {
        println!("No jobs produced ({} manifests found).", report.documents.len());
    } else {
        println!("Jobs ({} total):\n", report.jobs.len());
        for job in &report.jobs.jobs {
            println!("  {}", job.id);
            println!("    Destination: {}", job.destination.display());
            if let Some(map) = job.source_map_destination() {
                println!("    Source map: {}", map.display());
            }
            if job.options.banner.is_some() {
                println!("    Banner: yes");
            }
            println!("    Sources ({}):", job.sources.len());
            for source in &job.sources {
                println!("      {}", source.display());
            }
            println!();
        }
    }

    for document in report.invalid() {
        println!("Skipped: {}", document.source_path().display());
    }
    for root in &report.skipped_roots {
        println!("Skipped source: {}", root.display());
    }
    if let Some(ref path) = out {
        println!("Job set written to: {}", path.display());
    }
}

fn run_explain(manifest: &Path, task: &TaskArgs, human: bool) {
    let config = task.load(Map::new());
    let base_dir = current_dir();
    let dest = config.dest.clone();

    let ctx = ResolveContext {
        base_dir: &base_dir,
        dest: dest.as_deref(),
        options: &config.options,
    };
    let document = ManifestDocument::load(manifest, &ctx);

    if human {
        println!("Manifest: {}", document.source_path().display());
        println!("  Task id: {}", document.task_id());
        if let Some(err) = document.load_error() {
            println!("  Error: {}", err);
        }
        let options = document.options();
        println!("  Extension: {}", options.extension);
        if !options.cwd.is_empty() {
            println!("  Cwd: {}", options.cwd);
        }
        println!("  Banner: {}", options.banner);
        println!("  Source map: {}", options.source_map);
        println!("  Directives:");
        for directive in document.directives() {
            println!("    {}", directive);
        }
        println!("  Files ({}):", document.resolved_contents().len());
        for file in document.resolved_contents() {
            println!("    {}", file.display());
        }
        match document.target() {
            Some(target) => println!("  Target: {}", target.display()),
            None => println!("  Target: (none)"),
        }
        println!("  Valid: {}", document.is_valid());
    } else {
        let mut value = match serde_json::to_value(&document) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        };
        value["valid"] = Value::Bool(document.is_valid());
        value["directives"] = Value::Array(
            document
                .directives()
                .iter()
                .map(|d| Value::String(d.to_string()))
                .collect(),
        );
        match serde_json::to_string_pretty(&value) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    }

    if !document.is_valid() {
        process::exit(1);
    }
}

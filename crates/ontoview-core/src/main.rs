//! OntoView CLI - inspect ontology sets without the serving layer
//!
//! Commands:
//! - `sets` - List declared sets and versions
//! - `load` - Load one version and print its statistics
//! - `tree` - Resolve a root document and print its import tree
//! - `resolve-iri` - Find the loaded set that defines an IRI

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ontoview_config::{ConfigLoader, LogFormat, OntoviewConfig, CONFIG_FILE_NAME};
use ontoview_core::{ImportResolver, IndexedStore, ResolveOptions, SetCacheManager};

/// OntoView - ontology set loader and cache diagnostics
#[derive(Parser)]
#[command(name = "ontoview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List declared sets and their versions
    Sets {
        /// Configuration file
        #[arg(short, long, default_value = CONFIG_FILE_NAME)]
        config: PathBuf,
    },

    /// Load a set version and print its statistics
    Load {
        /// Configuration file
        #[arg(short, long, default_value = CONFIG_FILE_NAME)]
        config: PathBuf,

        /// Set identifier
        #[arg(short, long)]
        set: String,

        /// Version (defaults to the set's default version)
        #[arg(long)]
        version: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a root document and print its import tree
    Tree {
        /// Root ontology document
        root: PathBuf,

        /// Directory all imports must stay within
        #[arg(short, long)]
        base_dir: Option<PathBuf>,

        /// Maximum import depth
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Load auto-load sets and report which one defines an IRI
    ResolveIri {
        /// Configuration file
        #[arg(short, long, default_value = CONFIG_FILE_NAME)]
        config: PathBuf,

        /// IRI to look up
        #[arg(short, long)]
        iri: String,

        /// Additional sets to load before the lookup (default versions)
        #[arg(short, long)]
        load: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.command {
        Commands::Sets { config } | Commands::Load { config, .. } => Some(load_config(config)?),
        Commands::ResolveIri { config, .. } => Some(load_config(config)?),
        Commands::Tree { .. } => None,
    };
    init_logging(cli.verbose, config.as_ref())?;

    match cli.command {
        Commands::Sets { .. } => cmd_sets(config.unwrap_or_default()),
        Commands::Load {
            set, version, json, ..
        } => cmd_load(config.unwrap_or_default(), set, version, json),
        Commands::Tree {
            root,
            base_dir,
            max_depth,
        } => cmd_tree(root, base_dir, max_depth),
        Commands::ResolveIri { iri, load, .. } => {
            cmd_resolve_iri(config.unwrap_or_default(), iri, load)
        }
    }
}

fn load_config(path: &Path) -> Result<OntoviewConfig> {
    ConfigLoader::new()
        .load_file(path)
        .with_context(|| format!("Failed to load configuration from {:?}", path))
}

fn init_logging(verbose: bool, config: Option<&OntoviewConfig>) -> Result<()> {
    let level = if verbose {
        Level::DEBUG
    } else {
        config
            .and_then(|c| c.logging.level.parse::<Level>().ok())
            .unwrap_or(Level::INFO)
    };
    let format = config.map(|c| c.logging.format).unwrap_or_default();

    match format {
        LogFormat::Json => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Text => {
            let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

/// List declared sets
fn cmd_sets(config: OntoviewConfig) -> Result<()> {
    let manager = SetCacheManager::new(&config).context("Invalid set catalog")?;

    for set in manager.list_sets() {
        let auto = if set.auto_load { " [auto-load]" } else { "" };
        println!("{} - {}{}", set.id, set.display_name(), auto);
        if let Some(ref description) = set.description {
            println!("    {}", description);
        }
        let default = manager.default_version(&set.id)?;
        for version in &set.versions {
            let marker = if version.version == default { "*" } else { " " };
            let released = version.release.released_at.as_deref().unwrap_or("-");
            println!(
                "  {} {:<12} released {:<12} {}",
                marker,
                version.version,
                released,
                version.root_path.display()
            );
        }
    }
    Ok(())
}

/// Load one set version and print statistics
fn cmd_load(
    config: OntoviewConfig,
    set: String,
    version: Option<String>,
    json: bool,
) -> Result<()> {
    let manager = SetCacheManager::new(&config).context("Invalid set catalog")?;
    let version = match version {
        Some(v) => v,
        None => manager.default_version(&set)?.to_string(),
    };

    let start = Instant::now();
    let loaded = manager
        .get_set(&set, &version)
        .with_context(|| format!("Failed to load {}@{}", set, version))?;
    info!("Loaded in {:?}", start.elapsed());

    if json {
        println!("{}", serde_json::to_string_pretty(loaded.stats())?);
        return Ok(());
    }

    let stats = loaded.stats();
    println!("Set:                {}", loaded.key());
    println!("Documents:          {}", stats.documents);
    println!("Statements:         {}", stats.store.statements);
    println!("Distinct subjects:  {}", stats.store.subjects);
    println!("Blank nodes:        {}", stats.store.blank_nodes);
    println!("Unresolved imports: {}", stats.unresolved_imports);
    println!("Import depth:       {}", stats.max_import_depth);

    println!();
    println!("Ontologies:");
    for (identifier, meta) in loaded.ontologies() {
        let version_info = meta.header.version_info.as_deref().unwrap_or("-");
        println!(
            "  {} (depth {}, {} statements, version {})",
            identifier, meta.depth, meta.statement_count, version_info
        );
    }
    Ok(())
}

/// Resolve a root document directly and print its import tree
fn cmd_tree(root: PathBuf, base_dir: Option<PathBuf>, max_depth: Option<usize>) -> Result<()> {
    let mut options = ResolveOptions::default();
    if let Some(base) = base_dir {
        options = options.with_allowed_base(base);
    }
    if let Some(depth) = max_depth {
        options = options.with_max_depth(depth);
    }

    let resolved = ImportResolver::new(options)
        .resolve(&root)
        .with_context(|| format!("Failed to resolve imports of {:?}", root))?;

    print!("{}", resolved.tree.render());

    let store = IndexedStore::build(&resolved.multi_graph);
    println!();
    println!(
        "{} documents, {} statements, {} unresolved imports",
        resolved.multi_graph.len(),
        store.len(),
        resolved.tree.unresolved().len()
    );
    Ok(())
}

/// Report which loaded set defines an IRI
fn cmd_resolve_iri(config: OntoviewConfig, iri: String, load: Vec<String>) -> Result<()> {
    let manager = SetCacheManager::new(&config).context("Invalid set catalog")?;
    manager.preload_auto_sets();
    for set in &load {
        manager
            .get_set_default(set)
            .with_context(|| format!("Failed to load {}", set))?;
    }

    match manager.resolve_iri(&iri) {
        Some(key) => println!("{} -> {}", iri, key),
        None => println!("{} not found in loaded sets", iri),
    }
    Ok(())
}

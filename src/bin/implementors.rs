//! Query the implementors index of a generated documentation site.
//!
//! Loads every fragment under `<root>/implementors/`, replays them through
//! the activation handshake (optionally signalling page readiness part way
//! through), and answers questions about the merged result.
//!
//! Usage:
//!   implementors interfaces
//!   implementors keys core::fmt::Display
//!   implementors lookup core::fmt::Display --library petgraph
//!   implementors lookup core::fmt::Display --exclude core,alloc --json
//!   implementors library petgraph
//!   implementors --activate-after 0 dump
//!   implementors check implementors/core/fmt/trait.Display.js

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use implementors::load_plan::{activate_after_from_env, load_order_from_env};
use implementors::{
    Catalog, Descriptor, FragmentLoader, IMPLEMENTORS_DIR, InterfacePath, LibraryKey, LoadOrder,
    build_catalog, find_doc_root, split_list,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const ENV_LOG: &str = "IMPLEMENTORS_LOG";

#[derive(Parser, Debug)]
#[command(name = "implementors")]
#[command(about = "Merge and query documentation implementor fragments")]
struct Cli {
    /// Documentation root containing `implementors/` (or set IMPLEMENTORS_ROOT).
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Fragment load order: discovered or reverse (or set IMPLEMENTORS_ORDER).
    #[arg(long, global = true, value_parser = ["discovered", "reverse"])]
    order: Option<String>,
    /// Signal page readiness after this many fragments ran (default: after all).
    #[arg(long, global = true)]
    activate_after: Option<usize>,
    /// Log activation and loading details to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List interfaces that have implementor fragments.
    Interfaces,
    /// List libraries implementing an interface.
    Keys { interface: String },
    /// Print descriptors for an interface.
    Lookup {
        interface: String,
        /// Only this library's descriptors.
        #[arg(long)]
        library: Option<String>,
        /// Libraries to leave out, comma or space separated.
        #[arg(long)]
        exclude: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Print every interface a library implements.
    Library {
        library: String,
        #[arg(long)]
        json: bool,
    },
    /// Print the whole merged catalog as JSON.
    Dump,
    /// Parse fragment files and report what they contribute.
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn setup_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("implementors=debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

struct LoadOptions {
    root: Option<PathBuf>,
    order: Option<String>,
    activate_after: Option<usize>,
}

fn run(cli: Cli) -> Result<()> {
    let options = LoadOptions {
        root: cli.root,
        order: cli.order,
        activate_after: cli.activate_after,
    };

    match cli.command {
        Command::Check { files } => check(&files)?,
        Command::Interfaces => {
            let catalog = load_catalog(&options)?;
            for interface in catalog.interfaces() {
                println!("{interface}");
            }
        }
        Command::Keys { interface } => {
            let interface = InterfacePath::parse(&interface)?;
            let catalog = load_catalog(&options)?;
            for library in catalog.query(&interface).keys() {
                println!("{library}");
            }
        }
        Command::Lookup {
            interface,
            library,
            exclude,
            json,
        } => {
            let interface = InterfacePath::parse(&interface)?;
            let catalog = load_catalog(&options)?;
            lookup(&catalog, &interface, library, exclude, json)?;
        }
        Command::Library { library, json } => {
            let catalog = load_catalog(&options)?;
            let library = LibraryKey::from(library);
            let found = catalog.implementors_by_library(&library);
            if json {
                let body: serde_json::Map<String, serde_json::Value> = found
                    .iter()
                    .map(|(interface, descriptors)| (interface.to_string(), json!(descriptors)))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                for (interface, descriptors) in found {
                    println!("{interface}");
                    print_descriptors(descriptors);
                }
            }
        }
        Command::Dump => {
            let catalog = load_catalog(&options)?;
            println!("{}", serde_json::to_string_pretty(&catalog.snapshot())?);
        }
    }
    Ok(())
}

/// CLI flags win over the environment; unset means "every fragment, then ready".
fn load_catalog(options: &LoadOptions) -> Result<Catalog> {
    let order = match options.order.as_deref() {
        Some(raw) => LoadOrder::try_from(raw)?,
        None => load_order_from_env()?.unwrap_or_default(),
    };
    let activate_after = match options.activate_after {
        Some(value) => Some(value),
        None => activate_after_from_env()?,
    };
    let doc_root =
        find_doc_root(options.root.as_deref()).context("locating documentation root")?;
    build_catalog(&doc_root, order, activate_after)
        .with_context(|| format!("loading fragments under {}", doc_root.display()))
}

fn lookup(
    catalog: &Catalog,
    interface: &InterfacePath,
    library: Option<String>,
    exclude: Option<String>,
    json: bool,
) -> Result<()> {
    let excluded: Vec<LibraryKey> = exclude
        .as_deref()
        .map(split_list)
        .unwrap_or_default()
        .into_iter()
        .map(LibraryKey::from)
        .collect();

    let mut selected = catalog.foreign_implementors(interface, &excluded);
    if let Some(library) = library.map(LibraryKey::from) {
        selected.retain(|(key, _)| **key == library);
    }

    if json {
        let body: serde_json::Map<String, serde_json::Value> = selected
            .iter()
            .map(|(library, descriptors)| (library.to_string(), json!(descriptors)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        for (_, descriptors) in selected {
            print_descriptors(descriptors);
        }
    }
    Ok(())
}

fn check(files: &[PathBuf]) -> Result<()> {
    let loader = FragmentLoader::new()?;
    for path in files {
        let (interface, contributions) = loader.read(path)?;
        let descriptors: usize = contributions.iter().map(|c| c.descriptors.len()).sum();
        let interface = interface
            .or_else(|| interface_from_location(path))
            .map(|i| i.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}\t{}\t{} libraries\t{} descriptors",
            path.display(),
            interface,
            contributions.len(),
            descriptors
        );
    }
    Ok(())
}

/// Interface implied by a path that runs through an `implementors/` directory.
fn interface_from_location(path: &Path) -> Option<InterfacePath> {
    let relative: PathBuf = path
        .components()
        .skip_while(|component| component.as_os_str() != IMPLEMENTORS_DIR)
        .skip(1)
        .collect();
    InterfacePath::from_fragment_path(&relative).ok()
}

fn print_descriptors(descriptors: &[Descriptor]) {
    for descriptor in descriptors {
        println!("{}", descriptor.as_markup());
    }
}

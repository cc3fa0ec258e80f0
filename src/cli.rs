use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::load_config;
use crate::store::GraphStore;

#[derive(Parser, Debug)]
#[command(name = "tge", version, about = "Task graph engine: layout, import and progress for task trees")]
pub struct Args {
    /// Input graph JSON (persisted format) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Treat input as a reduced producer document and rebuild the full graph
    #[arg(long = "import")]
    pub import: bool,

    /// Re-derive slots from on-screen order and re-run the layout
    #[arg(long = "auto-layout")]
    pub auto_layout: bool,

    /// Print completion progress for a node id instead of writing a document
    #[arg(long = "progress", value_name = "NODE_ID")]
    pub progress: Option<String>,

    /// Start from the built-in demo tree instead of reading input
    #[arg(long = "demo")]
    pub demo: bool,

    /// Config JSON overriding layout constants
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,
}

pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let mut store = if args.demo {
        GraphStore::demo(config)
    } else {
        let input = read_input(args.input.as_deref())?;
        let mut store = GraphStore::new(config);
        if args.import {
            store.load_reduced(&input)?;
        } else {
            store.deserialize(&input)?;
        }
        store
    };

    if args.auto_layout {
        store.apply_auto_layout();
    }

    if let Some(node_id) = args.progress.as_deref() {
        if store.node(node_id).is_none() {
            return Err(anyhow::anyhow!("no such node: {node_id}"));
        }
        println!("{:.3}", store.progress(node_id));
        return Ok(());
    }

    let json = store.serialize()?;
    write_output(&json, args.output.as_deref())?;
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_output(json: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

use crate::config::load_config;
use crate::document::{TopologyDocument, read_document, write_document};
use crate::engine::Engine;
use crate::model::{SiteId, Snapshot};
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "netcanvas", version, about = "Network topology layout engine")]
pub struct Args {
    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a topology document from a snapshot
    Layout {
        #[command(flatten)]
        io: IoArgs,

        /// Write the diagnostics payload to this file
        #[arg(short = 'd', long = "diagnostics")]
        diagnostics: Option<PathBuf>,
    },
    /// Move one site of an existing document
    Drag {
        #[command(flatten)]
        io: IoArgs,

        #[arg(long = "site")]
        site: SiteId,

        #[arg(long = "dx", allow_hyphen_values = true, default_value_t = 0.0)]
        dx: f32,

        #[arg(long = "dy", allow_hyphen_values = true, default_value_t = 0.0)]
        dy: f32,
    },
    /// Resize one site of an existing document
    Resize {
        #[command(flatten)]
        io: IoArgs,

        #[arg(long = "site")]
        site: SiteId,

        #[arg(short = 'w', long = "width")]
        width: f32,

        #[arg(short = 'H', long = "height")]
        height: f32,
    },
}

#[derive(ClapArgs, Debug)]
pub struct IoArgs {
    /// Input file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let mut engine = Engine::new(config)?;

    match args.command {
        Command::Layout { io, diagnostics } => {
            let input = read_input(io.input.as_deref())?;
            let snapshot: Snapshot =
                serde_json::from_str(&input).context("snapshot is not valid JSON")?;
            let output = engine.build(&snapshot)?;
            if let Some(path) = diagnostics {
                let json = serde_json::to_string_pretty(&output.diagnostics)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
            write_output(&output.document, io.output.as_deref())
        }
        Command::Drag { io, site, dx, dy } => {
            let document = load_document(io.input.as_deref())?;
            let next = engine.drag(&document, site, dx, dy)?;
            write_output(&next, io.output.as_deref())
        }
        Command::Resize {
            io,
            site,
            width,
            height,
        } => {
            let document = load_document(io.input.as_deref())?;
            let next = engine.resize(&document, site, width, height)?;
            write_output(&next, io.output.as_deref())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn load_document(path: Option<&Path>) -> Result<TopologyDocument> {
    match path {
        Some(path) if path != Path::new("-") => read_document(path),
        _ => {
            let input = read_input(None)?;
            serde_json::from_str(&input).context("document is not valid JSON")
        }
    }
}

fn write_output(document: &TopologyDocument, path: Option<&Path>) -> Result<()> {
    if let Some(path) = path {
        return write_document(path, document);
    }
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, document)?;
    writeln!(stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_drag_with_negative_offsets() {
        let args = Args::try_parse_from([
            "netcanvas", "drag", "-i", "doc.json", "--site", "3", "--dx", "-40", "--dy", "12.5",
        ])
        .unwrap();
        match args.command {
            Command::Drag { site, dx, dy, .. } => {
                assert_eq!(site, 3);
                assert_eq!(dx, -40.0);
                assert_eq!(dy, 12.5);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let args = Args::try_parse_from([
            "netcanvas", "resize", "--site", "1", "-w", "400", "-H", "300", "-c", "cfg.json5",
        ])
        .unwrap();
        assert_eq!(args.config.as_deref(), Some(Path::new("cfg.json5")));
    }
}

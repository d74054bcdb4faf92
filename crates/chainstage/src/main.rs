use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use chainstage::{
    composer,
    source_map::{OriginalLocation, SourceMap, original_location_for},
};
use clap::{ArgAction, Parser, Subcommand};
use log::{LevelFilter, debug};

/// Inspect and chain source maps the way the loader stage does
#[derive(Debug, Parser)]
#[command(name = "chainstage", version, about)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Chain MAP through the map of the stage that ran before it
    Compose {
        /// Map emitted by the later stage
        map: PathBuf,

        /// Map emitted by the earlier stage
        #[arg(long)]
        upstream: PathBuf,

        /// Source in MAP that UPSTREAM describes [default: UPSTREAM's `file`]
        #[arg(long)]
        anchor: Option<String>,

        /// Write the composed map here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve a generated position to its original location
    Lookup {
        map: PathBuf,

        /// 1-based generated line
        #[arg(long)]
        line: u32,

        /// 0-based generated column
        #[arg(long, default_value_t = 0)]
        column: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Command::Compose {
            map,
            upstream,
            anchor,
            output,
        } => run_compose(&map, &upstream, anchor, output.as_deref()),
        Command::Lookup { map, line, column } => run_lookup(&map, line, column),
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn read_map(path: &Path) -> Result<SourceMap> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read source map {}", path.display()))?;
    SourceMap::from_slice(&bytes)
        .with_context(|| format!("Failed to parse source map {}", path.display()))
}

fn run_compose(
    map_path: &Path,
    upstream_path: &Path,
    anchor: Option<String>,
    output: Option<&Path>,
) -> Result<()> {
    let map = read_map(map_path)?;
    let mut upstream = read_map(upstream_path)?;
    if let Some(anchor) = anchor {
        debug!("Anchoring upstream map at {anchor}");
        upstream.set_file(Some(anchor.as_str()));
    }

    let composed = composer::compose(&map, &upstream).with_context(|| {
        format!(
            "Failed to compose {} through {}",
            map_path.display(),
            upstream_path.display()
        )
    })?;
    let mut json = Vec::new();
    composed.to_writer(&mut json)?;

    match output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&json)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

fn run_lookup(map_path: &Path, line: u32, column: u32) -> Result<()> {
    let line = line
        .checked_sub(1)
        .ok_or_else(|| anyhow!("Lines are 1-based, got 0"))?;
    let map = read_map(map_path)?;
    let location = original_location_for(&map, line, column);
    writeln!(io::stdout().lock(), "{}", describe(location))?;
    Ok(())
}

/// `source:line:column (name)` with a 1-based line, or `unmapped`
fn describe(location: Option<OriginalLocation<'_>>) -> String {
    let Some(location) = location else {
        return "unmapped".to_owned();
    };
    let line = u64::from(location.line) + 1;
    match location.name {
        Some(name) => format!("{}:{line}:{} ({name})", location.source, location.column),
        None => format!("{}:{line}:{}", location.source, location.column),
    }
}

use std::{
    io::Write as _,
    path::PathBuf,
    process::ExitCode,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use terramask::{
    ArtifactKind, ArtifactQuery, CreateRequest, ErrorKind, FetchRequest, ImageSource, Layout,
    MapboxStaticSource, Pipeline, SourceConfig, TerraError, TerraResult, Threshold,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "terramask", version)]
struct Cli {
    /// Data directory holding `projects/` and `projects.json`.
    #[arg(long, env = "TERRAMASK_ROOT", default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch imagery for a project and (re)generate its heatmap and mask.
    Create(CreateArgs),
    /// Print all projects as JSON.
    List,
    /// Write one artifact to a file (or stdout).
    Read(ReadArgs),
    /// Rename a project.
    Rename {
        /// Current name.
        old: String,
        /// New name.
        new: String,
    },
    /// Delete a project and its artifacts.
    Delete {
        /// Project name.
        name: String,
    },
    /// Report registry entries and directories that are out of step.
    Audit,
}

#[derive(Parser, Debug)]
struct CreateArgs {
    /// Project name.
    name: String,

    /// Latitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// Web-map zoom level.
    #[arg(long)]
    zoom: u8,

    /// Image width in pixels.
    #[arg(long)]
    width: u32,

    /// Image height in pixels.
    #[arg(long)]
    height: u32,

    /// Mask threshold (0-255).
    #[arg(long, default_value = "128", value_parser = parse_threshold)]
    threshold: Threshold,

    /// Mapbox access token.
    #[arg(long, env = "MAPBOX_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Mapbox API origin.
    #[arg(long, default_value = "https://api.mapbox.com")]
    mapbox_url: String,

    /// Mapbox style id.
    #[arg(long, default_value = "mapbox/satellite-v9")]
    style: String,

    /// Fetch timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[derive(Parser, Debug)]
struct ReadArgs {
    /// Project name.
    name: String,

    /// Artifact to read: source (alias image), heatmap or mask.
    #[arg(long, default_value = "source", value_parser = ArtifactKind::parse)]
    kind: ArtifactKind,

    /// Regenerate the mask at this threshold instead of reading the stored one.
    #[arg(long, value_parser = parse_threshold)]
    threshold: Option<Threshold>,

    /// Output path. Writes to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn parse_threshold(raw: &str) -> TerraResult<Threshold> {
    let level = raw
        .parse::<i64>()
        .map_err(|_| TerraError::invalid_input(format!("threshold {raw:?} is not an integer")))?;
    Threshold::from_i64(level)
}

/// Stand-in for commands that never fetch.
struct NoSource;

impl ImageSource for NoSource {
    fn fetch(&self, _req: &FetchRequest) -> TerraResult<Vec<u8>> {
        Err(TerraError::invalid_input("no image source configured"))
    }
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            exit_code_for(&err)
        }
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("terramask=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let layout = Layout::under(&cli.root);
    match cli.cmd {
        Command::Create(args) => cmd_create(layout, args),
        Command::List => {
            let pipeline = Pipeline::new(layout, NoSource);
            print_json(&pipeline.list_projects()?)
        }
        Command::Read(args) => cmd_read(layout, args),
        Command::Rename { old, new } => {
            Pipeline::new(layout, NoSource).rename(&old, &new)?;
            eprintln!("renamed {old} -> {new}");
            Ok(())
        }
        Command::Delete { name } => {
            Pipeline::new(layout, NoSource).delete(&name)?;
            eprintln!("deleted {name}");
            Ok(())
        }
        Command::Audit => {
            let report = Pipeline::new(layout, NoSource).audit()?;
            print_json(&report)
        }
    }
}

fn cmd_create(layout: Layout, args: CreateArgs) -> anyhow::Result<()> {
    let source = MapboxStaticSource::new(SourceConfig {
        api_key: args.api_key,
        base_url: args.mapbox_url,
        style: args.style,
        timeout: Duration::from_secs(args.timeout_secs),
    })?;
    let pipeline = Pipeline::new(layout, source);

    pipeline.create_or_refresh(&CreateRequest {
        name: args.name.clone(),
        lat: args.lat,
        lon: args.lon,
        zoom: args.zoom,
        width: args.width,
        height: args.height,
        threshold: args.threshold,
    })?;

    eprintln!("created {}", args.name);
    Ok(())
}

fn cmd_read(layout: Layout, args: ReadArgs) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(layout, NoSource);
    let query = ArtifactQuery::from_request(args.kind, args.threshold);
    let bytes = pipeline.read_artifact(&args.name, query)?;

    match args.out {
        Some(out) => {
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(&out, &bytes)
                .with_context(|| format!("write '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes).context("write artifact to stdout")?;
            stdout.flush().context("flush stdout")?;
        }
    }
    Ok(())
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{text}");
    Ok(())
}

fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    let Some(err) = err.downcast_ref::<TerraError>() else {
        return ExitCode::FAILURE;
    };
    ExitCode::from(match err.kind() {
        ErrorKind::InvalidInput => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Conflict => 4,
        ErrorKind::Fetch => 5,
        ErrorKind::Decode => 6,
        ErrorKind::Encode | ErrorKind::Io | ErrorKind::Registry | ErrorKind::Other => 1,
    })
}

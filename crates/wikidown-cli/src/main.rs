use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;
use wikidown_config::Config;
use wikidown_engine::{
    FileRegion, IoError, PreviewRegion, RenderTrigger, SourceRegion, TextRegion, io,
};

mod page;

use page::{Page, PageRegion};

#[derive(Parser)]
#[command(name = "wikidown")]
#[command(version, about = "Render wiki markdown to HTML", long_about = None)]
#[command(after_help = "EXAMPLES:
    wikidown page.md                    Print the rendered fragment
    wikidown page.md -o page.html -s    Write a standalone page
    wikidown page.md -o page.html -w    Re-render whenever page.md changes
    wikidown page.md -s --save-config   Make standalone pages the default
    cat page.md | wikidown -            Render from stdin")]
struct Cli {
    /// Markdown file to render, or `-` for stdin
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (defaults to the configured output directory, then stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Wrap the rendered markup in a complete HTML page
    #[arg(short, long)]
    standalone: bool,

    /// Page title for standalone output (defaults to the input file name)
    #[arg(short, long)]
    title: Option<String>,

    /// Keep running and re-render whenever the input file changes
    #[arg(short, long)]
    watch: bool,

    /// Config file to use instead of ~/.config/wikidown/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Save the effective settings (including --standalone) to the config file
    #[arg(long)]
    save_config: bool,
}

/// Where the raw markdown comes from.
enum Source {
    Stdin(TextRegion),
    File(FileRegion),
}

impl SourceRegion for Source {
    fn raw_text(&self) -> Result<String, IoError> {
        match self {
            Source::Stdin(region) => region.raw_text(),
            Source::File(region) => region.raw_text(),
        }
    }
}

/// Where rendered markup goes.
enum Output {
    Stdout,
    File(FileRegion),
}

impl PreviewRegion for Output {
    fn replace_markup(&mut self, markup: &str) -> Result<(), IoError> {
        match self {
            Output::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(markup.as_bytes())?;
                stdout.write_all(b"\n")?;
                stdout.flush()?;
                Ok(())
            }
            Output::File(region) => region.replace_markup(markup),
        }
    }
}

/// Standalone pages and bare fragments behind one preview type.
enum Preview {
    Fragment(Output),
    Page(PageRegion<Output>),
}

impl PreviewRegion for Preview {
    fn replace_markup(&mut self, markup: &str) -> Result<(), IoError> {
        match self {
            Preview::Fragment(output) => output.replace_markup(markup),
            Preview::Page(page) => page.replace_markup(markup),
        }
    }
}

fn main() -> ExitCode {
    // RUST_LOG overrides the default level
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref(), cli.save_config)?;
    if cli.standalone {
        config.output.standalone = true;
    }
    if cli.save_config {
        save_config(&config, cli.config.as_deref())?;
    }

    let from_stdin = cli.input.as_os_str() == "-";

    if cli.watch && from_stdin {
        bail!("--watch needs an input file, not stdin");
    }

    let source = if from_stdin {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read markdown from stdin")?;
        Source::Stdin(TextRegion::new(raw))
    } else {
        Source::File(FileRegion::new(&cli.input))
    };

    let output_path = resolve_output_path(
        cli.output.as_deref(),
        config.output.directory.as_deref(),
        (!from_stdin).then_some(cli.input.as_path()),
    );
    if cli.watch && output_path.is_none() {
        bail!("--watch needs an output file (-o or [output] directory in config)");
    }

    let output = match &output_path {
        Some(path) => Output::File(FileRegion::new(path)),
        None => Output::Stdout,
    };

    let preview = if config.output.standalone {
        let title = cli
            .title
            .clone()
            .unwrap_or_else(|| default_title(&cli.input, from_stdin));
        Preview::Page(PageRegion::new(
            Page::new(title, config.output.stylesheet.clone()),
            output,
        ))
    } else {
        Preview::Fragment(output)
    };

    let mut trigger = RenderTrigger::new(source, preview);
    trigger
        .on_load()
        .with_context(|| format!("Failed to render {}", cli.input.display()))?;

    if cli.watch {
        log::info!(
            "Watching {} every {:?}",
            cli.input.display(),
            config.watch.poll_interval()
        );
        watch(&mut trigger, &cli.input, config.watch.poll_interval())?;
    }

    Ok(())
}

/// Loads the config file, or defaults when there is none.
///
/// An explicitly named file must exist unless it is about to be created.
fn load_config(path: Option<&Path>, creating: bool) -> Result<Config> {
    let loaded = match path {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    match loaded {
        Some(config) => Ok(config),
        None => {
            if let Some(path) = path
                && !creating
            {
                bail!("Config file not found: {}", path.display());
            }
            log::debug!(
                "No config file at {}, using defaults",
                Config::config_path().display()
            );
            Ok(Config::default())
        }
    }
}

fn save_config(config: &Config, path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(path) => {
            config.save_to_path(path)?;
            path.to_path_buf()
        }
        None => {
            config.save()?;
            Config::config_path()
        }
    };
    log::info!("Saved settings to {}", path.display());
    Ok(())
}

/// Picks the output file: explicit path first, then `<directory>/<stem>.html`.
fn resolve_output_path(
    explicit: Option<&Path>,
    directory: Option<&Path>,
    input: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let directory = directory?;
    let stem = input?.file_stem()?;
    Some(directory.join(format!("{}.html", stem.to_string_lossy())))
}

fn default_title(input: &Path, from_stdin: bool) -> String {
    if from_stdin {
        return "wikidown".to_string();
    }
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "wikidown".to_string())
}

/// Polls the input's modification time and re-renders on every change.
fn watch<P: PreviewRegion>(
    trigger: &mut RenderTrigger<Source, P>,
    input: &Path,
    interval: Duration,
) -> Result<()> {
    let mut last_seen = io::modified_at(input)?;

    loop {
        thread::sleep(interval);

        let modified = match io::modified_at(input) {
            Ok(modified) => modified,
            Err(e) => {
                log::warn!("Cannot check {}: {e}", input.display());
                continue;
            }
        };
        if modified == last_seen {
            continue;
        }
        last_seen = modified;

        match trigger.on_input() {
            Ok(()) => log::info!("Re-rendered {} (pass {})", input.display(), trigger.passes()),
            Err(e) => log::warn!("Render failed: {e}"),
        }
    }
}

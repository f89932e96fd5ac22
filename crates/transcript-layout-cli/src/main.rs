use anyhow::{Context, Result, bail};
use relative_path::RelativePathBuf;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
    time::Duration,
};
use transcript_layout_config::{Config, OverlayMode};
use transcript_layout_engine::{
    FixedMetrics, Overlay, RenderOptions, build::BuildOptions, render_transcript,
};

const USAGE: &str = "\
Usage: transcript-layout render <transcript.json> [-o <out.json>] [--config <config.toml>]
       transcript-layout job <job.json> [--config <config.toml>]";

#[derive(Debug, PartialEq)]
enum Command {
    Render {
        input: PathBuf,
        output: Option<PathBuf>,
    },
    Job {
        job: PathBuf,
    },
}

#[derive(Debug, PartialEq)]
struct Args {
    command: Command,
    config: Option<PathBuf>,
}

/// A batch of pages of one witness. Paths are relative to the job file.
#[derive(Debug, Deserialize)]
struct Job {
    sigil: String,
    transcripts: Vec<JobPage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobPage {
    page_no: u32,
    json: RelativePathBuf,
    out: RelativePathBuf,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut rest = args.iter().skip(1);
    let Some(command) = rest.next() else {
        bail!("No command given");
    };

    let mut positional = Vec::new();
    let mut output = None;
    let mut config = None;
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "-o" | "--output" => {
                let value = rest.next().with_context(|| format!("{arg} needs a path"))?;
                output = Some(PathBuf::from(value));
            }
            "--config" => {
                let value = rest.next().context("--config needs a path")?;
                config = Some(PathBuf::from(value));
            }
            flag if flag.starts_with('-') => bail!("Unknown option {flag}"),
            path => positional.push(PathBuf::from(path)),
        }
    }

    let mut positional = positional.into_iter();
    let (Some(path), None) = (positional.next(), positional.next()) else {
        bail!("Expected exactly one input file");
    };
    let command = match command.as_str() {
        "render" => Command::Render {
            input: path,
            output,
        },
        "job" if output.is_none() => Command::Job { job: path },
        "job" => bail!("job writes the outputs named in the job file; -o is not allowed"),
        other => bail!("Unknown command {other}"),
    };
    Ok(Args { command, config })
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_path(path)?
            .with_context(|| format!("Config file {} not found", path.display()))?,
        None => Config::load()?.unwrap_or_default(),
    };
    Ok(config)
}

fn render_options(config: &Config) -> RenderOptions {
    RenderOptions {
        iterations: config.iterations,
        build: BuildOptions {
            overlay: match config.overlay {
                OverlayMode::None => Overlay::None,
                OverlayMode::Overlay => Overlay::Overlay,
            },
            strip_whitespace: config.strip_whitespace.clone(),
        },
        time_budget: (config.time_budget_secs > 0)
            .then(|| Duration::from_secs(config.time_budget_secs)),
    }
}

fn metrics(config: &Config) -> FixedMetrics {
    FixedMetrics {
        char_width: config.metrics.char_width,
        line_height: config.metrics.line_height,
        small_scale: config.metrics.small_scale,
    }
}

/// Renders one transcript to `output`, or to stdout.
fn render_file(
    input: &Path,
    output: Option<&Path>,
    options: &RenderOptions,
    metrics: &FixedMetrics,
) -> Result<()> {
    let json = fs::read_to_string(input)
        .with_context(|| format!("Failed to read transcript {}", input.display()))?;
    let rendering = render_transcript(&json, options, metrics)
        .with_context(|| format!("Failed to render {}", input.display()))?;
    log::info!(
        "{}: {} components, {}/{} settled after {} passes",
        input.display(),
        rendering.report.components,
        rendering.report.settled,
        rendering.report.components,
        rendering.report.passes
    );

    let tree = rendering.output().context("Nothing was rendered")?;
    let content = serde_json::to_string_pretty(&tree)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => println!("{content}"),
    }
    Ok(())
}

/// Renders every page of a job. Pages are independent; a failing page is
/// reported and the rest still render.
fn run_job(job_path: &Path, options: &RenderOptions, metrics: &FixedMetrics) -> Result<usize> {
    let content = fs::read_to_string(job_path)
        .with_context(|| format!("Failed to read job {}", job_path.display()))?;
    let job: Job = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse job {}", job_path.display()))?;
    let base = job_path.parent().unwrap_or(Path::new("."));
    log::info!("{}: {} pages", job.sigil, job.transcripts.len());

    let mut failed = 0;
    for page in &job.transcripts {
        let input = page.json.to_path(base);
        let output = page.out.to_path(base);
        if let Err(e) = render_file(&input, Some(&output), options, metrics) {
            log::error!("{} page {}: {e:#}", job.sigil, page.page_no);
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{failed} of {} pages of {} failed", job.transcripts.len(), job.sigil);
    }
    Ok(job.transcripts.len())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    let config = load_config(args.config.as_deref())?;
    let options = render_options(&config);
    let metrics = metrics(&config);

    match args.command {
        Command::Render { input, output } => {
            render_file(&input, output.as_deref(), &options, &metrics)?;
        }
        Command::Job { job } => {
            let pages = run_job(&job, &options, &metrics)?;
            log::info!("Rendered {pages} pages");
        }
    }
    Ok(())
}

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context as _;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use tracing_subscriber::filter::LevelFilter;

use shapetrace::io::{self, OutputKind};
use shapetrace::{Color, Model, ModelConfig, Settings, ShapeType};

#[derive(Parser, Debug)]
#[command(name = "shapetrace", version, about = "Reproduce an image with geometric primitives")]
struct Cli {
    /// Input image path.
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Output path (.png, .jpg, .svg, .gif, or `-` for SVG on stdout).
    /// Put `%d` in the path to save numbered frames.
    #[arg(short = 'o', long = "output", required = true)]
    outputs: Vec<String>,

    /// Number of shapes; repeat the flag to run several batches. Each batch
    /// takes the -m, -a and --rep values given before it.
    #[arg(short = 'n', long = "count", required = true, value_parser = clap::value_parser!(u32).range(1..))]
    counts: Vec<u32>,

    /// Background color (hex); defaults to the average input color.
    #[arg(long)]
    bg: Option<String>,

    /// Shape alpha, 0 lets the search pick it [default: 128].
    #[arg(short = 'a', long)]
    alpha: Vec<u8>,

    /// Resize large input images to this size.
    #[arg(short = 'r', long)]
    resize: Option<u32>,

    /// Output image size.
    #[arg(short = 's', long)]
    size: Option<u32>,

    /// 0=combo 1=triangle 2=rect 3=ellipse 4=circle 5=rotatedrect 6=beziers 7=rotatedellipse 8=polygon [default: 1]
    #[arg(short = 'm', long, value_parser = clap::value_parser!(u8).range(0..=8))]
    mode: Vec<u8>,

    /// Number of parallel workers (0 uses all cores).
    #[arg(short = 'j', long, default_value_t = 0)]
    workers: usize,

    /// Save every Nth frame (needs `%d` in the output path).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    nth: u32,

    /// Extra shapes per step found with a reduced search [default: 0].
    #[arg(long)]
    rep: Vec<u32>,

    /// Seed for the worker random streams.
    #[arg(long)]
    seed: Option<u64>,

    /// Settings JSON; missing file means defaults.
    #[arg(long, default_value = "shapetrace.json")]
    config: PathBuf,

    /// -v for progress, -vv for search details.
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

const DEFAULT_MODE: u8 = 1;
const DEFAULT_ALPHA: u8 = 128;
const DEFAULT_REPEAT: u32 = 0;

/// one `-n` run with the shape settings in force where it appeared
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Batch {
    count: u32,
    mode: u8,
    alpha: u8,
    repeat: u32,
}

/// values of a repeatable flag paired with their position on the command line
fn positioned<T: Copy>(matches: &ArgMatches, id: &str, values: &[T]) -> Vec<(usize, T)> {
    matches
        .indices_of(id)
        .map(|indices| indices.zip(values.iter().copied()).collect())
        .unwrap_or_default()
}

/// last value given before `index`, or `default`
fn value_before<T: Copy>(values: &[(usize, T)], index: usize, default: T) -> T {
    values
        .iter()
        .take_while(|(i, _)| *i < index)
        .last()
        .map_or(default, |&(_, v)| v)
}

/// a lone `-n` takes the final flag values wherever they appear
fn batches(cli: &Cli, matches: &ArgMatches) -> Vec<Batch> {
    let counts = positioned(matches, "counts", &cli.counts);
    let modes = positioned(matches, "mode", &cli.mode);
    let alphas = positioned(matches, "alpha", &cli.alpha);
    let repeats = positioned(matches, "rep", &cli.rep);

    let single = counts.len() == 1;
    counts
        .iter()
        .map(|&(index, count)| {
            let at = if single { usize::MAX } else { index };
            Batch {
                count,
                mode: value_before(&modes, at, DEFAULT_MODE),
                alpha: value_before(&alphas, at, DEFAULT_ALPHA),
                repeat: value_before(&repeats, at, DEFAULT_REPEAT),
            }
        })
        .collect()
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    init_tracing(cli.verbose);

    let settings = Settings::load(&cli.config)
        .with_context(|| format!("load settings '{}'", cli.config.display()))?;
    let input_resize = cli.resize.unwrap_or(settings.output.input_resize);
    let output_size = cli.size.unwrap_or(settings.output.size);

    // reject unknown extensions before spending any time on the search
    let outputs = cli
        .outputs
        .iter()
        .map(|o| Ok((o.as_str(), OutputKind::from_path(o)?)))
        .collect::<shapetrace::Result<Vec<_>>>()?;

    tracing::debug!(input = %cli.input.display(), "reading input");
    let input = io::load_image(&cli.input)
        .with_context(|| format!("read input '{}'", cli.input.display()))?;
    let input = io::thumbnail(input, input_resize);

    let background = match &cli.bg {
        Some(hex) => Color::from_hex(hex)?,
        None => Color::average(&input),
    };

    let batches = batches(&cli, &matches);
    let config = ModelConfig {
        output_size,
        workers: cli.workers,
        seed: cli.seed,
        search: settings.search,
    };
    let mut model = Model::with_config(input, background, &config)?;
    tracing::info!(frame = 0, t = 0.0, score = model.score(), "run algorithm");

    let start = Instant::now();
    let mut frame = 0usize;
    for (j, batch) in batches.iter().enumerate() {
        let kind = ShapeType::from_mode(batch.mode).context("shape mode out of range")?;
        tracing::info!(
            count = batch.count,
            mode = batch.mode,
            alpha = batch.alpha,
            repeat = batch.repeat,
            "batch"
        );
        for i in 0..batch.count {
            frame += 1;
            let t = Instant::now();
            let n = model.step(kind, batch.alpha, batch.repeat);
            let nps = n as f64 / t.elapsed().as_secs_f64().max(1e-9);
            tracing::info!(
                frame,
                t = start.elapsed().as_secs_f64(),
                score = model.score(),
                n,
                nps = nps.round() as u64,
                "step"
            );

            let last = j + 1 == batches.len() && i + 1 == batch.count;
            for &(output, format) in &outputs {
                let numbered = output.contains('%');
                let save_frame = numbered && format != OutputKind::Gif && frame % cli.nth as usize == 0;
                if !(save_frame || last) {
                    continue;
                }
                let path = if numbered { io::frame_path(output, frame) } else { output.to_owned() };
                write_output(&model, &settings, &path, format)?;
            }
        }
    }

    tracing::info!(
        shapes = model.shapes().len(),
        improvement = model.improvement_percent(),
        psnr = model.metrics().psnr,
        "done"
    );
    Ok(())
}

fn write_output(model: &Model, settings: &Settings, path: &str, format: OutputKind) -> anyhow::Result<()> {
    tracing::info!(output = path, "writing");
    let out = &settings.output;
    match format {
        OutputKind::Png => io::save_png(path, &model.render()),
        OutputKind::Jpeg => io::save_jpg(path, &model.render(), out.jpeg_quality),
        OutputKind::Svg => io::save_file(path, &model.svg()),
        OutputKind::Gif => {
            let frames = model.frames(out.frame_delta)?;
            io::save_gif(path, frames, out.gif_delay_ms, out.gif_last_delay_ms)
        }
    }
    .with_context(|| format!("write output '{path}'"))
}

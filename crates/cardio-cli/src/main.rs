use anyhow::{bail, Context, Result};
use cardio_lib::{
    classifier::EcgClassifier,
    config::ClassifierConfig,
    io::{csv as csv_io, request::ClassifyRequest, text as text_io, wfdb as wfdb_io},
    metrics::{rhythm_summary, RhythmSummary},
    plot::{self as model, figure_from_beats, figure_from_signal, Figure, Series},
    signal::{PeakSet, RRSeries, TimeSeries},
    synth::SyntheticEcg,
};
use clap::{Args, Parser, Subcommand};
use log::info;
use plotters::prelude::*;
use serde::Serialize;
use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(
    name = "cardio",
    version,
    about = "Rule-based ECG classification: Normal, ST-T abnormality or LVH"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the samples come from. Plain text on stdin when nothing is given.
#[derive(Args, Debug)]
struct InputArgs {
    /// Text file of samples separated by newlines, commas or whitespace
    #[arg(long)]
    input: Option<PathBuf>,
    /// CSV file with a header row
    #[arg(long, conflicts_with = "input")]
    csv: Option<PathBuf>,
    /// Column of --csv holding the lead
    #[arg(long, default_value = "ecg")]
    column: String,
    /// WFDB header (.hea); the record's sampling rate takes precedence over --fs
    #[arg(long, conflicts_with_all = ["input", "csv"])]
    wfdb_header: Option<PathBuf>,
    #[arg(long, default_value_t = 0)]
    wfdb_lead: usize,
    /// Sampling rate in Hz; defaults to the configuration's
    #[arg(long)]
    fs: Option<u32>,
    /// TOML file overriding classifier thresholds
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one lead and print the classification as JSON
    Classify {
        #[command(flatten)]
        input: InputArgs,
        /// JSON request envelope {"signal": [...], "sampling_rate": 250}; "-" reads stdin
        #[arg(long, conflicts_with_all = ["input", "csv", "wfdb_header"])]
        json: Option<PathBuf>,
    },
    /// Band-pass, normalize and print QRS peak indices with a rhythm summary
    DetectPeaks {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print the fixed-length beat windows cut around each peak
    ExtractBeats {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Generate a synthetic ECG trace as newline-delimited samples
    Synth {
        #[arg(long, default_value_t = 250)]
        fs: u32,
        #[arg(long, default_value_t = 10.0)]
        duration_s: f64,
        #[arg(long, default_value_t = 8)]
        beats: usize,
        #[arg(long, default_value_t = 3.0)]
        r_amplitude: f64,
        #[arg(long, default_value_t = 2.0)]
        s_amplitude: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        st_offset: f64,
        #[arg(long, default_value_t = 0.0)]
        noise: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render the overlaid beats (or, with --trace, the filtered trace) to PNG
    PlotBeats {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        trace: bool,
    },
    /// Print the default configuration as TOML
    DefaultConfig,
}

#[derive(Serialize)]
struct PeakReport {
    fs: f64,
    peaks: PeakSet,
    heart_rate: f64,
    /// Rate implied by the mean RR interval.
    mean_hr_bpm: f64,
    rhythm: RhythmSummary,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Classify { input, json } => cmd_classify(&input, json.as_deref())?,
        Commands::DetectPeaks { input } => cmd_detect_peaks(&input)?,
        Commands::ExtractBeats { input } => cmd_extract_beats(&input)?,
        Commands::Synth {
            fs,
            duration_s,
            beats,
            r_amplitude,
            s_amplitude,
            st_offset,
            noise,
            seed,
            out,
        } => {
            let synth = SyntheticEcg {
                sampling_rate: fs,
                duration_s,
                beat_count: beats,
                r_amplitude,
                s_amplitude,
                st_offset,
                noise_amplitude: noise,
                seed,
                ..SyntheticEcg::default()
            };
            cmd_synth(&synth, out.as_deref())?
        }
        Commands::PlotBeats { input, out, trace } => cmd_plot_beats(&input, &out, trace)?,
        Commands::DefaultConfig => print!("{}", ClassifierConfig::default().to_toml_string()?),
    }
    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("reading stdin")?;
    Ok(buf)
}

fn read_samples(input: Option<&Path>) -> Result<Vec<f64>> {
    match input {
        Some(path) => text_io::read_f64_series(path),
        None => text_io::parse_f64_series(&read_stdin()?),
    }
}

fn load_config(args: &InputArgs) -> Result<ClassifierConfig> {
    let mut cfg = match &args.config {
        Some(path) => ClassifierConfig::load(path)?,
        None => ClassifierConfig::default(),
    };
    if let Some(fs) = args.fs {
        cfg.sampling_rate = fs;
    }
    Ok(cfg)
}

/// Load the lead and the configuration matching its sampling rate.
fn load_input(args: &InputArgs) -> Result<(ClassifierConfig, TimeSeries)> {
    let mut cfg = load_config(args)?;
    if let Some(header) = &args.wfdb_header {
        let ts = wfdb_io::load_wfdb_lead(header, args.wfdb_lead)?;
        cfg.sampling_rate = ts.fs.round() as u32;
        return Ok((cfg, ts));
    }
    let data = match &args.csv {
        Some(path) => csv_io::read_csv_column(path, &args.column)?,
        None => read_samples(args.input.as_deref())?,
    };
    info!("loaded {} samples at {} Hz", data.len(), cfg.sampling_rate);
    let fs = cfg.fs();
    Ok((cfg, TimeSeries { fs, data }))
}

fn cmd_classify(args: &InputArgs, json: Option<&Path>) -> Result<()> {
    if let Some(path) = json {
        let request = if path == Path::new("-") {
            ClassifyRequest::from_json_str(&read_stdin()?)?
        } else {
            ClassifyRequest::load(path)?
        };
        let response = request.run(&load_config(args)?);
        println!("{}", serde_json::to_string(&response)?);
        if !response.is_success() {
            bail!("classification failed with status {}", response.status_code());
        }
        return Ok(());
    }

    let (cfg, ts) = load_input(args)?;
    let classifier = EcgClassifier::new(cfg)?;
    let result = classifier.classify(&ts.data)?;
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}

fn cmd_detect_peaks(args: &InputArgs) -> Result<()> {
    let (cfg, ts) = load_input(args)?;
    let classifier = EcgClassifier::new(cfg)?;
    let filtered = classifier.preprocess(&ts.data)?;
    let peaks = classifier.detect_peaks(&filtered);
    let rhythm = rhythm_summary(&RRSeries::from_peaks(&peaks, ts.fs));
    let report = PeakReport {
        fs: ts.fs,
        heart_rate: peaks.len() as f64 * 60.0 / ts.duration(),
        mean_hr_bpm: rhythm.mean_hr_bpm(),
        peaks,
        rhythm,
    };
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

fn cmd_extract_beats(args: &InputArgs) -> Result<()> {
    let (cfg, ts) = load_input(args)?;
    let classifier = EcgClassifier::new(cfg)?;
    let filtered = classifier.preprocess(&ts.data)?;
    let peaks = classifier.detect_peaks(&filtered);
    let beats = classifier.extract_beats(&filtered, &peaks);
    println!("{}", serde_json::to_string(&beats)?);
    Ok(())
}

fn cmd_synth(synth: &SyntheticEcg, out: Option<&Path>) -> Result<()> {
    let text = text_io::format_f64_series(&synth.generate());
    match out {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn cmd_plot_beats(args: &InputArgs, out: &Path, trace: bool) -> Result<()> {
    let (cfg, ts) = load_input(args)?;
    let classifier = EcgClassifier::new(cfg)?;
    let filtered = TimeSeries {
        fs: ts.fs,
        data: classifier.preprocess(&ts.data)?,
    };
    let peaks = classifier.detect_peaks(&filtered.data);
    let fig = if trace {
        figure_from_signal("filtered lead", &filtered, Some(&peaks), 4096)
    } else {
        figure_from_beats(&classifier.extract_beats(&filtered.data, &peaks), ts.fs)
    };
    draw_plotters_figure(out, &fig)
}

fn draw_plotters_figure(path: &Path, fig: &Figure) -> Result<()> {
    let Some((x_min, x_max, y_min, y_max)) = fig.bounds() else {
        bail!("nothing to plot");
    };
    let backend = BitMapBackend::new(path, (800, 480));
    let root = backend.into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .caption(
            fig.title.clone().unwrap_or_else(|| "Plot".into()),
            ("sans-serif", 24),
        )
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    chart
        .configure_mesh()
        .x_desc(fig.x.label.clone().unwrap_or_default())
        .y_desc(fig.y.label.clone().unwrap_or_default())
        .draw()?;
    for series in &fig.series {
        match series {
            Series::Line(line) => {
                let width = line.style.width.round().max(1.0) as u32;
                let style = rgb(line.style.color).stroke_width(width);
                chart.draw_series(LineSeries::new(
                    line.points.iter().map(|p| (p[0], p[1])),
                    style,
                ))?;
            }
            Series::Markers(markers) => {
                let style = rgb(markers.color).filled();
                chart.draw_series(
                    markers
                        .points
                        .iter()
                        .map(|p| Circle::new((p[0], p[1]), 4, style)),
                )?;
            }
        }
    }
    root.present()?;
    Ok(())
}

fn rgb(color: model::Color) -> RGBColor {
    let (r, g, b) = color.rgb();
    RGBColor(r, g, b)
}

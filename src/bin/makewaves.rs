use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use scopeplot::scope::frame::ChannelSelection;
use scopeplot::scope::plot::{render_figure, FigureOptions, PlotStyle};
use scopeplot::scripts::NullScript;
use scopeplot::wavegen::{write_scopy_export, WaveSpec, Waveform};
#[derive(Clone, Copy, Debug, ValueEnum)]
enum WaveArg {
    /// Square wave, for FFT testing.
    Square,
    /// 10 Hz + 20 Hz sine sum, for filter testing.
    Sines,
}
impl From<WaveArg> for Waveform {
    fn from(value: WaveArg) -> Self {
        match value {
            WaveArg::Square => Waveform::Square,
            WaveArg::Sines => Waveform::TwoSines,
        }
    }
}
/// Fabricate Scopy-format CSV exports for testing without hardware.
#[derive(Parser, Debug)]
#[command(name = "makewaves", version, about)]
struct Args {
    /// Waveform to synthesise.
    #[arg(long, value_enum, default_value = "sines")]
    waveform: WaveArg,
    /// Number of samples.
    #[arg(long, default_value_t = 1000)]
    samples: usize,
    /// Capture duration in seconds.
    #[arg(long, default_value_t = 1.0)]
    duration: f64,
    /// Square wave frequency in Hz (ignored for the sine sum).
    #[arg(long, default_value_t = 5.0)]
    frequency: f64,
    /// Output CSV path; defaults to the waveform's canonical name.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Also render a preview PNG next to the CSV.
    #[arg(long)]
    preview: bool,
}
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let spec = WaveSpec {
        waveform: args.waveform.into(),
        samples: args.samples,
        duration_s: args.duration,
        square_frequency_hz: args.frequency,
    };
    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(spec.default_file_name()));
    let file = File::create(&out).with_context(|| format!("creating {}", out.display()))?;
    write_scopy_export(BufWriter::new(file), &spec)
        .with_context(|| format!("writing {}", out.display()))?;
    println!("{}", spec.title());
    println!("Scopy export written to {}", out.display());
    if args.preview {
        let frame = spec.frame();
        let selection = ChannelSelection::all(&frame);
        let options = FigureOptions {
            style: PlotStyle::default(),
            title: spec.title(),
            display_frequency: false,
        };
        let mut script = NullScript;
        let png = render_figure(&frame, &selection, &options, &mut script)
            .context("rendering the preview")?;
        let preview_path = out.with_extension("png");
        std::fs::write(&preview_path, png)
            .with_context(|| format!("writing {}", preview_path.display()))?;
        info!("preview rendered to {}", preview_path.display());
        println!("Preview written to {}", preview_path.display());
    }
    Ok(())
}

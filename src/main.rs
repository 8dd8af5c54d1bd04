use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use scopeplot::config::{Preferences, DEFAULT_PREFERENCES_FILE};
use scopeplot::report::LabReport;
use scopeplot::scope::export::ScopyExport;
use scopeplot::scope::frame::TraceFrame;
use scopeplot::scope::plot::{render_figure, FigureOptions, PlotStyle};
use scopeplot::scope::scale::EngScale;
use scopeplot::scripts;
use scopeplot::ui::Console;
#[derive(Parser, Debug)]
#[command(
    name = "scopeplot",
    version,
    about = "Plot ADALM2000 Scopy oscilloscope CSV exports"
)]
struct Args {
    /// Directory searched for CSV exports.
    #[arg(long, default_value = "./TestData")]
    data_dir: PathBuf,
    /// Data file extension to search for.
    #[arg(long, default_value = "csv")]
    extension: String,
    /// Preferences file; created on the first run.
    #[arg(long, default_value = DEFAULT_PREFERENCES_FILE)]
    preferences: PathBuf,
}
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    run_session(&args, Console::new(stdin, stdout))
}
fn run_session<R: BufRead, W: Write>(args: &Args, mut console: Console<R, W>) -> Result<()> {
    let mut report = LabReport::with_intro("scopeplot", env!("CARGO_PKG_VERSION"));
    println!("\nProgram: scopeplot: v{}", env!("CARGO_PKG_VERSION"));
    println!("Plot CSV text file data generated by ADALM-2000 Active Learning Module");
    let mut prefs = Preferences::load(&args.preferences)
        .with_context(|| format!("reading {}", args.preferences.display()))?;
    // Pick an export; re-prompt when a file refuses to parse.
    let (data_file, export) = loop {
        let Some(candidate) = console.select_data_file(&args.data_dir, &args.extension)? else {
            println!("Program terminated");
            return Ok(());
        };
        match ScopyExport::from_path(&candidate) {
            Ok(export) => break (candidate, export),
            Err(err) => {
                println!("Read error for {}: {err}", candidate.display());
                println!("Make another selection...");
            }
        }
    };
    println!("File selected: {}", data_file.display());
    report.push(format!("File selected: {}", data_file.display()));
    report.push(export.info.export_date_note());
    if export.info.release_label().is_none() {
        let warning = format!(
            "Warning: this version of Scopy has not been tested: {}",
            export.info.scopy_version
        );
        println!("\n{warning}");
        report.push(warning);
    }
    report.push(export.info.version_note());
    if export.skipped_rows > 0 {
        report.push(format!(
            "Skipped {} malformed data rows during import",
            export.skipped_rows
        ));
    }
    let selection = console.select_channels(&export.frame)?;
    let window = console.select_time_window(&export.frame)?;
    let windowed = export.frame.crop(&window)?;
    console.select_custom_script(&mut prefs, &export.frame)?;
    if let Err(err) = prefs.store(&args.preferences) {
        warn!("could not store preferences: {err}");
    }
    let mut script = scripts::build_script(&prefs.custom_script, &prefs)?;
    if let Err(err) = script.prepare(&windowed) {
        println!("\nCustom {} plot script error: {err}", script.name());
        println!("Continuing without the custom plot...");
    }
    let title = figure_title(&export, &windowed);
    report.push(format!("Plot title: {title}"));
    report.push(channel_note(&selection.labels));
    report.push(format!(
        "Time window selected: [{:.6}, {:.6}] S",
        window.start_s, window.end_s
    ));
    let (width, height) = console.select_figure_size()?;
    let options = FigureOptions {
        style: PlotStyle::with_size(width, height),
        title,
        display_frequency: prefs.display_frequency,
    };
    let png = render_figure(&windowed, &selection, &options, script.as_mut())
        .context("rendering the figure")?;
    if let Some(summary) = script.summary() {
        report.push(summary);
    }
    report.push(format!("Plot size selected: ({width}, {height}) pixels"));
    let image_file = console.select_output_file(&data_file)?;
    let text_file = match &image_file {
        Some(path) => {
            fs::write(path, &png).with_context(|| format!("writing {}", path.display()))?;
            report.push(format!("Plot data saved to file: {}", path.display()));
            let text_path = path.with_extension("txt");
            report.push(format!(
                "Message queue saved in file: {}",
                text_path.display()
            ));
            Some(text_path)
        }
        None => {
            report.push("Plot data not saved to file");
            None
        }
    };
    println!("\n{}", report.render());
    if let Some(path) = text_file {
        report
            .write_to(&path)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    println!("Program exiting normally now...");
    Ok(())
}
fn figure_title(export: &ScopyExport, windowed: &TraceFrame) -> String {
    let time_scale = EngScale::for_time(&windowed.time_s);
    let (start, end) = windowed.time_span().unwrap_or((0.0, 0.0));
    let time_per_div = time_scale.apply_value(end - start) / 10.0;
    let rate_scale = EngScale::for_frequency(export.info.sample_rate_hz);
    format!(
        "{} {} [Nr of samples: {}, Sample rate: {} {}, Time/Div: {:.2} {}]",
        export.info.device,
        export.info.tool,
        export.info.nr_of_samples,
        rate_scale.apply_value(export.info.sample_rate_hz),
        rate_scale.frequency_unit(),
        time_per_div,
        time_scale.time_unit()
    )
}
fn channel_note(labels: &[String]) -> String {
    format!(
        "List of 'Y-axis' data channels selected to plot: {}",
        labels.join(", ")
    )
}
#[cfg(test)]
mod tests {
    use super::*;
    use scopeplot::wavegen::{write_scopy_export, WaveSpec};
    use std::fs::File;
    use std::io::Cursor;
    #[test]
    fn scripted_session_writes_image_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("data_2SineWaves.csv");
        write_scopy_export(File::create(&csv_path).unwrap(), &WaveSpec::default()).unwrap();
        let args = Args {
            data_dir: dir.path().to_path_buf(),
            extension: "csv".into(),
            preferences: dir.path().join("preferences.json"),
        };
        // File 0; single channel auto-selected; full window; null script
        // (index 2); default figure size; first suggested output file.
        let input = "0\n\n\n2\n\n0\n";
        let console = Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        run_session(&args, console).unwrap();
        let png = std::fs::read(dir.path().join("data_2SineWaves.png")).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
        let report = std::fs::read_to_string(dir.path().join("data_2SineWaves.txt")).unwrap();
        assert!(report.starts_with("Lab Report (recap of plot selections):"));
        assert!(report.contains("data_2SineWaves.csv"));
        assert!(report.contains("Plot size selected: (800, 600) pixels"));
        let prefs = Preferences::load(&args.preferences).unwrap();
        assert_eq!(prefs.custom_script, "null");
    }
    #[test]
    fn fft_session_appends_the_script_summary() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("waves.csv");
        write_scopy_export(File::create(&csv_path).unwrap(), &WaveSpec::default()).unwrap();
        let args = Args {
            data_dir: dir.path().to_path_buf(),
            extension: "csv".into(),
            preferences: dir.path().join("preferences.json"),
        };
        // File 0; full window; fft script (index 1) keeping the default
        // channel but no decimation and two peaks; default size; save.
        let input = "0\n\n\n1\n\n1\n2\n0.1\n\n0\n";
        let console = Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        run_session(&args, console).unwrap();
        let report = std::fs::read_to_string(dir.path().join("waves.txt")).unwrap();
        assert!(report.contains("Custom FFT Plot using: CH1(V)"));
        let prefs = Preferences::load(&args.preferences).unwrap();
        assert_eq!(prefs.custom_script, "fft");
        assert_eq!(prefs.fft.reduce, 1);
        assert_eq!(prefs.fft.peak_count, 2);
    }
}

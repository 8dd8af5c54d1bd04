use std::f64::consts::PI;
use std::io::Write;
use chrono::Local;
use crate::scope::error::ScopeError;
use crate::scope::frame::TraceFrame;
/// Version hash written into generated exports; matches a Scopy build the
/// plotter recognises.
const GENERATOR_VERSION_HASH: &str = "48fb6a9";
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    /// Square wave at a configurable frequency, amplitude +/-1.
    Square,
    /// Sum of 10 Hz and 20 Hz unit sines, for filter testing.
    TwoSines,
}
/// Recipe for a synthetic Scopy export.
#[derive(Clone, Copy, Debug)]
pub struct WaveSpec {
    pub waveform: Waveform,
    pub samples: usize,
    pub duration_s: f64,
    pub square_frequency_hz: f64,
}
impl Default for WaveSpec {
    fn default() -> Self {
        Self {
            waveform: Waveform::TwoSines,
            samples: 1000,
            duration_s: 1.0,
            square_frequency_hz: 5.0,
        }
    }
}
impl WaveSpec {
    pub fn sample_rate_hz(&self) -> f64 {
        self.samples as f64 / self.duration_s
    }
    pub fn validate(&self) -> Result<(), ScopeError> {
        if self.samples < 2 {
            return Err(ScopeError::ScriptParams(
                "need at least two samples".into(),
            ));
        }
        if self.duration_s <= 0.0 || self.square_frequency_hz <= 0.0 {
            return Err(ScopeError::ScriptParams(
                "duration and frequency must be positive".into(),
            ));
        }
        Ok(())
    }
    pub fn title(&self) -> String {
        match self.waveform {
            Waveform::Square => format!(
                "{} Hz Square Wave: sample rate of {} Hz",
                self.square_frequency_hz,
                self.sample_rate_hz()
            ),
            Waveform::TwoSines => format!(
                "10 Hz and 20 Hz Sine Waves: sample rate of {} Hz",
                self.sample_rate_hz()
            ),
        }
    }
    pub fn default_file_name(&self) -> &'static str {
        match self.waveform {
            Waveform::Square => "data_1SquareWave.csv",
            Waveform::TwoSines => "data_2SineWaves.csv",
        }
    }
    /// Time axis (inclusive of the endpoint) and channel values.
    pub fn synthesise(&self) -> (Vec<f64>, Vec<f64>) {
        let step = self.duration_s / (self.samples - 1).max(1) as f64;
        let time: Vec<f64> = (0..self.samples).map(|i| i as f64 * step).collect();
        let values = match self.waveform {
            Waveform::Square => time
                .iter()
                .map(|t| {
                    let phase = (2.0 * PI * self.square_frequency_hz * t).sin();
                    if phase >= 0.0 {
                        1.0
                    } else {
                        -1.0
                    }
                })
                .collect(),
            Waveform::TwoSines => time
                .iter()
                .map(|t| (2.0 * PI * 10.0 * t).sin() + (2.0 * PI * 20.0 * t).sin())
                .collect(),
        };
        (time, values)
    }
    /// Frame view of the synthesised data, for preview rendering.
    pub fn frame(&self) -> TraceFrame {
        let (time_s, values) = self.synthesise();
        TraceFrame {
            sample_rate_hz: self.sample_rate_hz(),
            time_heading: "Time(S)".into(),
            time_s,
            channel_labels: vec!["CH1(V)".into()],
            channels: vec![values],
        }
    }
}
/// Write a single-channel Scopy-format export: the 7 metadata lines, the
/// heading row, then one row per sample.
pub fn write_scopy_export<W: Write>(writer: W, spec: &WaveSpec) -> Result<(), ScopeError> {
    spec.validate()?;
    let (time, values) = spec.synthesise();
    let exported_on = Local::now().format("%A %B %d/%m/%Y").to_string();
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);
    let rate = spec.sample_rate_hz();
    let metadata = [
        (";Scopy version", GENERATOR_VERSION_HASH.to_owned()),
        (";Exported on", exported_on),
        (";Device", "M2K".to_owned()),
        (";Nr of samples", spec.samples.to_string()),
        (";Sample rate", format!("{rate}")),
        (";Tool", "Oscilloscope".to_owned()),
        (";Additional Information", String::new()),
    ];
    for (key, value) in metadata {
        csv_writer.write_record([key, value.as_str()])?;
    }
    csv_writer.write_record(["Sample", "Time(S)", "CH1(V)"])?;
    for (i, (t, v)) in time.iter().zip(&values).enumerate() {
        csv_writer.write_record([i.to_string(), t.to_string(), v.to_string()])?;
    }
    csv_writer.flush()?;
    Ok(())
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::export::ScopyExport;
    use crate::scope::fft::dominant_frequency;
    use std::io::Cursor;
    #[test]
    fn square_wave_swings_between_rails() {
        let spec = WaveSpec {
            waveform: Waveform::Square,
            ..WaveSpec::default()
        };
        let (time, values) = spec.synthesise();
        assert_eq!(time.len(), 1000);
        assert!((time[999] - 1.0).abs() < 1e-9);
        assert!(values.iter().all(|v| *v == 1.0 || *v == -1.0));
        assert_eq!(values[0], 1.0);
        assert!(values.contains(&-1.0));
    }
    #[test]
    fn two_sines_carry_both_tones() {
        let spec = WaveSpec::default();
        let (_, values) = spec.synthesise();
        assert!(values[0].abs() < 1e-9);
        assert!(values.iter().all(|v| v.abs() <= 2.0));
        let peak = dominant_frequency(&values, spec.sample_rate_hz()).unwrap();
        assert!(peak.frequency_hz > 8.0 && peak.frequency_hz < 22.0);
    }
    #[test]
    fn generated_export_parses_back() {
        let spec = WaveSpec::default();
        let mut buffer = Vec::new();
        write_scopy_export(&mut buffer, &spec).unwrap();
        let export = ScopyExport::from_reader(Cursor::new(buffer)).unwrap();
        assert_eq!(export.info.device, "M2K");
        assert_eq!(export.info.nr_of_samples, 1000);
        assert!((export.info.sample_rate_hz - 1000.0).abs() < 1e-9);
        assert_eq!(export.frame.channel_labels, vec!["CH1(V)"]);
        assert_eq!(export.frame.samples_per_channel(), 1000);
        assert_eq!(export.skipped_rows, 0);
        assert!(export.info.release_label().is_some());
    }
    #[test]
    fn invalid_specs_are_rejected() {
        let spec = WaveSpec {
            samples: 1,
            ..WaveSpec::default()
        };
        assert!(spec.validate().is_err());
        let spec = WaveSpec {
            duration_s: 0.0,
            ..WaveSpec::default()
        };
        assert!(write_scopy_export(Vec::new(), &spec).is_err());
    }
}

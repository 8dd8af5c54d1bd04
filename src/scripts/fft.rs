use log::debug;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use crate::config::FftPrefs;
use crate::scope::error::ScopeError;
use crate::scope::fft::{decimate, find_peaks, SpectrumBuilder};
use crate::scope::frame::TraceFrame;
use crate::scope::plot::{format_tick, PlotArea, PlotStyle};
use crate::scope::scale::{self, EngScale};
use crate::scripts::CustomScript;
/// Fewer samples than this after decimation makes the spectrum meaningless.
const MIN_DECIMATED_SAMPLES: usize = 8;
/// Appends a magnitude-vs-frequency plot of one channel, with the strongest
/// peaks marked by dashed vertical lines and listed in the legend.
pub struct FftScript {
    prefs: FftPrefs,
    active: bool,
    peak_labels: Vec<String>,
}
impl FftScript {
    pub fn new(prefs: FftPrefs) -> Self {
        Self {
            prefs,
            active: false,
            peak_labels: Vec::new(),
        }
    }
    fn peak_title(&self) -> &'static str {
        if self.peak_labels.len() == 1 {
            "FFT Peak Value"
        } else {
            "Largest FFT Peak Values"
        }
    }
}
impl CustomScript for FftScript {
    fn name(&self) -> &'static str {
        "fft"
    }
    fn prepare(&mut self, frame: &TraceFrame) -> Result<(), ScopeError> {
        frame.channel(&self.prefs.channel)?;
        self.prefs.reduce = self.prefs.reduce.max(1);
        let remaining = frame.samples_per_channel() / self.prefs.reduce;
        if remaining < MIN_DECIMATED_SAMPLES {
            return Err(ScopeError::ScriptParams(format!(
                "reduce factor {} leaves {} samples; need at least {MIN_DECIMATED_SAMPLES}",
                self.prefs.reduce, remaining
            )));
        }
        self.active = true;
        Ok(())
    }
    fn is_active(&self) -> bool {
        self.active
    }
    fn render(
        &mut self,
        row: &PlotArea<'_>,
        frame: &TraceFrame,
        style: &PlotStyle,
    ) -> Result<(), ScopeError> {
        let samples = frame.channel(&self.prefs.channel)?;
        let reduced = decimate(samples, self.prefs.reduce);
        let rate = frame.sample_rate_hz / self.prefs.reduce as f64;
        debug!(
            "fft script: {} samples at {rate} Hz after 1:{} decimation",
            reduced.len(),
            self.prefs.reduce
        );
        let spectrum = SpectrumBuilder::compute(&reduced, rate);
        let freq_scale = EngScale::for_frequency(spectrum.max_frequency_hz());
        let mag_scale = EngScale::for_voltage(&spectrum.magnitudes);
        let xs = freq_scale.apply(&spectrum.frequencies_hz);
        let ys = mag_scale.apply(&spectrum.magnitudes);
        let x_max = xs.last().copied().unwrap_or(1.0);
        let y_max = ys.iter().copied().fold(1e-3f64, f64::max) * 1.05;
        let color = style.script_color();
        let mut chart = ChartBuilder::on(row)
            .margin(10)
            .x_label_area_size(32)
            .y_label_area_size(52)
            .caption("Magnitude vs Spectrum", ("sans-serif", 16))
            .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;
        chart
            .configure_mesh()
            .x_labels(11)
            .y_labels(5)
            .light_line_style(BLACK.mix(0.08))
            .bold_line_style(BLACK.mix(0.25))
            .x_label_formatter(&format_tick)
            .y_label_formatter(&format_tick)
            .x_desc(scale::frequency_heading(freq_scale))
            .y_desc(scale::voltage_heading(&self.prefs.channel, mag_scale))
            .axis_desc_style(("sans-serif", 14).into_font().color(&color))
            .draw()?;
        chart.draw_series(LineSeries::new(
            xs.iter().copied().zip(ys.iter().copied()),
            &color,
        ))?;
        self.peak_labels.clear();
        if self.prefs.peak_count != 0 {
            let peaks = find_peaks(&spectrum, self.prefs.min_peak_height);
            let shown = if self.prefs.peak_count < 0 {
                peaks.len()
            } else {
                peaks.len().min(self.prefs.peak_count as usize)
            };
            for (i, peak) in peaks.iter().take(shown).enumerate() {
                let marker = marker_color(&style.palette, i);
                let x = freq_scale.apply_value(peak.frequency_hz);
                let y = mag_scale.apply_value(peak.magnitude);
                let label = format!(
                    "{:.2} {}, {:.2} {}",
                    x,
                    freq_scale.frequency_unit(),
                    y,
                    mag_scale.voltage_unit()
                );
                chart
                    .draw_series(DashedLineSeries::new(
                        [(x, 0.0), (x, y)],
                        4,
                        4,
                        marker.stroke_width(1),
                    ))?
                    .label(label.clone())
                    .legend(move |(lx, ly)| {
                        PathElement::new(vec![(lx, ly), (lx + 20, ly)], marker)
                    });
                self.peak_labels.push(label);
            }
            if !self.peak_labels.is_empty() {
                chart
                    .configure_series_labels()
                    .position(SeriesLabelPosition::UpperRight)
                    .border_style(BLACK.mix(0.2))
                    .background_style(WHITE.mix(0.85))
                    .draw()?;
            }
        }
        Ok(())
    }
    fn summary(&self) -> Option<String> {
        if !self.active {
            return None;
        }
        let mut text = format!("Custom FFT Plot using: {}", self.prefs.channel);
        if self.prefs.reduce > 1 {
            text.push_str(&format!(
                ", with dataset reduced by a factor of: {}",
                self.prefs.reduce
            ));
        }
        if !self.peak_labels.is_empty() {
            text.push_str(&format!("\n\t{}:", self.peak_title()));
            for label in &self.peak_labels {
                text.push_str(&format!("\n\t\t{label}"));
            }
        }
        Some(text)
    }
}
/// Peak markers cycle backwards through the palette, skipping the trace
/// colour the spectrum itself is drawn with.
fn marker_color(palette: &[RGBColor], i: usize) -> RGBColor {
    if palette.len() < 2 {
        return palette.first().copied().unwrap_or(BLACK);
    }
    let wheel = (palette.len() - 1) as isize;
    let idx = (-1 - i as isize).rem_euclid(wheel) as usize;
    palette[idx]
}

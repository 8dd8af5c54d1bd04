use log::debug;
use plotters::prelude::*;
use crate::config::ButterPrefs;
use crate::scope::error::ScopeError;
use crate::scope::filter::{ButterFilter, ButterKind};
use crate::scope::frame::TraceFrame;
use crate::scope::plot::{format_tick, padded_range, PlotArea, PlotStyle};
use crate::scope::scale::{self, EngScale};
use crate::scripts::CustomScript;
const RESPONSE_POINTS: usize = 512;
/// Appends a phase-corrected Butterworth filter row: the filtered trace on
/// the left two thirds, the filter's frequency response on the right third.
pub struct ButterScript {
    prefs: ButterPrefs,
    active: bool,
    filter: Option<ButterFilter>,
    time_heading: String,
}
impl ButterScript {
    pub fn new(prefs: ButterPrefs) -> Self {
        Self {
            prefs,
            active: false,
            filter: None,
            time_heading: String::new(),
        }
    }
    fn filter(&self) -> Result<&ButterFilter, ScopeError> {
        self.filter
            .as_ref()
            .ok_or_else(|| ScopeError::ScriptParams("filter script not prepared".into()))
    }
    fn title(&self, filter: &ButterFilter) -> String {
        let mut text = format!(
            "{} Filter [Order: {}",
            capitalise(self.prefs.kind.as_str()),
            filter.effective_order()
        );
        match self.prefs.kind {
            ButterKind::Lowpass => text.push_str(&format!(", Cutoff: {}", self.prefs.low_cut_hz)),
            ButterKind::Highpass => text.push_str(&format!(", Cutoff: {}", self.prefs.high_cut_hz)),
            ButterKind::Bandpass | ButterKind::Bandstop => text.push_str(&format!(
                ", Lo: {}, Hi: {}",
                self.prefs.low_cut_hz, self.prefs.high_cut_hz
            )),
        }
        text.push(']');
        text
    }
}
impl CustomScript for ButterScript {
    fn name(&self) -> &'static str {
        "butter"
    }
    fn prepare(&mut self, frame: &TraceFrame) -> Result<(), ScopeError> {
        frame.channel(&self.prefs.channel)?;
        let filter = ButterFilter {
            kind: self.prefs.kind,
            order: self.prefs.order,
            low_cut_hz: self.prefs.low_cut_hz,
            high_cut_hz: self.prefs.high_cut_hz,
            sample_rate_hz: frame.sample_rate_hz,
        };
        filter.validate()?;
        // Zero-phase filtering reflects the capture at both ends; reject
        // captures shorter than that padding up front.
        let min_len = 3 * (filter.effective_order() + 1);
        if frame.samples_per_channel() <= min_len {
            return Err(ScopeError::ScriptParams(format!(
                "capture of {} samples is too short for order {} zero-phase filtering",
                frame.samples_per_channel(),
                self.prefs.order
            )));
        }
        self.filter = Some(filter);
        self.time_heading = frame.time_heading.clone();
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
        let filter = *self.filter()?;
        let samples = frame.channel(&self.prefs.channel)?;
        let filtered = filter.apply(samples)?;
        debug!(
            "butter script: filtered {} samples ({} filter, order {})",
            filtered.len(),
            self.prefs.kind.as_str(),
            filter.effective_order()
        );
        let (width, _) = row.dim_in_pixel();
        let (trace_area, response_area) = row.split_horizontally((width * 2 / 3) as i32);
        let color = style.script_color();
        // Filtered trace, voltage vs time.
        let time_scale = EngScale::for_time(&frame.time_s);
        let scaled_time = time_scale.apply(&frame.time_s);
        let volt_scale = EngScale::for_voltage(&filtered);
        let scaled = volt_scale.apply(&filtered);
        let (y_min, y_max) = padded_range(&scaled);
        let t_min = scaled_time.iter().copied().fold(f64::INFINITY, f64::min);
        let t_max = scaled_time.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut trace_chart = ChartBuilder::on(&trace_area)
            .margin(10)
            .x_label_area_size(32)
            .y_label_area_size(52)
            .caption(self.title(&filter), ("sans-serif", 16))
            .build_cartesian_2d(t_min..t_max, y_min..y_max)?;
        trace_chart
            .configure_mesh()
            .x_labels(11)
            .y_labels(5)
            .light_line_style(BLACK.mix(0.08))
            .bold_line_style(BLACK.mix(0.25))
            .x_label_formatter(&format_tick)
            .y_label_formatter(&format_tick)
            .x_desc(scale::time_heading(time_scale))
            .y_desc(scale::voltage_heading(&self.prefs.channel, volt_scale))
            .axis_desc_style(("sans-serif", 14).into_font().color(&color))
            .draw()?;
        trace_chart.draw_series(LineSeries::new(
            scaled_time.iter().copied().zip(scaled.iter().copied()),
            &color,
        ))?;
        // Frequency response with the critical points marked.
        let response = filter.frequency_response(RESPONSE_POINTS)?;
        let freq_scale = EngScale::for_frequency(
            response.frequencies_hz.last().copied().unwrap_or(1.0),
        );
        let xs = freq_scale.apply(&response.frequencies_hz);
        let x_max = xs.last().copied().unwrap_or(1.0);
        let gain_max = response.gains.iter().copied().fold(1.0f64, f64::max) * 1.1;
        let royal_blue = RGBColor(65, 105, 225);
        let mut response_chart = ChartBuilder::on(&response_area)
            .margin(10)
            .x_label_area_size(32)
            .y_label_area_size(40)
            .caption("Frequency Response", ("sans-serif", 16))
            .build_cartesian_2d(0.0..x_max, 0.0..gain_max)?;
        response_chart
            .configure_mesh()
            .x_labels(6)
            .y_labels(5)
            .light_line_style(BLACK.mix(0.08))
            .bold_line_style(BLACK.mix(0.25))
            .x_label_formatter(&format_tick)
            .y_label_formatter(&format_tick)
            .x_desc(scale::frequency_heading(freq_scale))
            .y_desc("Gain (Vo / Vi)")
            .axis_desc_style(("sans-serif", 14).into_font().color(&royal_blue))
            .draw()?;
        response_chart.draw_series(LineSeries::new(
            xs.iter().copied().zip(response.gains.iter().copied()),
            royal_blue.stroke_width(2),
        ))?;
        for cutoff in filter.cutoffs_hz() {
            let x = freq_scale.apply_value(cutoff);
            response_chart.draw_series(std::iter::once(PathElement::new(
                vec![(x, 0.0), (x, gain_max)],
                GREEN,
            )))?;
            response_chart.draw_series(std::iter::once(Circle::new(
                (x, std::f64::consts::FRAC_1_SQRT_2),
                3,
                BLACK.filled(),
            )))?;
        }
        Ok(())
    }
    fn summary(&self) -> Option<String> {
        if !self.active {
            return None;
        }
        let filter = self.filter.as_ref()?;
        let mut text = format!(
            "Custom Phase Corrected Butterworth Filter Plot using {}, {}:",
            self.time_heading, self.prefs.channel
        );
        text.push_str(&format!(
            "\n\t\t(Filter: {}, Order: {}",
            self.prefs.kind.as_str(),
            filter.effective_order()
        ));
        match self.prefs.kind {
            ButterKind::Lowpass => {
                text.push_str(&format!(", Cutoff: {} Hz", self.prefs.low_cut_hz))
            }
            ButterKind::Highpass => {
                text.push_str(&format!(", Cutoff: {} Hz", self.prefs.high_cut_hz))
            }
            ButterKind::Bandpass | ButterKind::Bandstop => text.push_str(&format!(
                ", Lowcut: {} Hz, Highcut: {} Hz",
                self.prefs.low_cut_hz, self.prefs.high_cut_hz
            )),
        }
        let rate_scale = EngScale::for_frequency(filter.sample_rate_hz);
        text.push_str(&format!(
            ", Sample rate: {} {})",
            rate_scale.apply_value(filter.sample_rate_hz),
            rate_scale.frequency_unit()
        ));
        Some(text)
    }
}
fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::coord::Shift;
use plotters::prelude::*;
use crate::scope::error::ScopeError;
use crate::scope::fft::dominant_frequency;
use crate::scope::frame::{ChannelSelection, TraceFrame};
use crate::scope::scale::{self, EngScale};
use crate::scripts::CustomScript;
/// One row of the figure grid, handed to custom scripts as their canvas.
pub type PlotArea<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub palette: Vec<RGBColor>,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: WHITE,
            palette: vec![
                RGBColor(255, 165, 0), // orange
                MAGENTA,
                GREEN,
                BLUE,
                CYAN,
                RED,
                RGBColor(128, 0, 128), // purple
            ],
        }
    }
}
impl PlotStyle {
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
    pub fn channel_color(&self, idx: usize) -> RGBColor {
        self.palette[idx % self.palette.len()]
    }
    /// Custom scripts draw with the last palette entry.
    pub fn script_color(&self) -> RGBColor {
        self.palette.last().copied().unwrap_or(BLACK)
    }
}
#[derive(Clone, Debug)]
pub struct FigureOptions {
    pub style: PlotStyle,
    pub title: String,
    pub display_frequency: bool,
}
/// Render the full figure: one grid row per selected channel, plus one row
/// for the custom script when it is active. The script draws against the
/// whole frame, so it may use channels outside the selection. Returns
/// encoded PNG bytes.
pub fn render_figure(
    full_frame: &TraceFrame,
    selection: &ChannelSelection,
    options: &FigureOptions,
    script: &mut dyn CustomScript,
) -> Result<Vec<u8>, ScopeError> {
    let frame = full_frame.select(selection)?;
    if frame.num_channels() == 0 || frame.samples_per_channel() == 0 {
        return Err(ScopeError::Plot("nothing selected to plot".into()));
    }
    let style = &options.style;
    let script_row = script.is_active();
    let rows = frame.num_channels() + usize::from(script_row);
    let time_scale = EngScale::for_time(&frame.time_s);
    let scaled_time = time_scale.apply(&frame.time_s);
    let (t_min, t_max) = padded_range_tight(&scaled_time);
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let areas = root.split_evenly((rows, 1));
        for (idx, samples) in frame.channels.iter().enumerate() {
            let color = style.channel_color(idx);
            let volt_scale = EngScale::for_voltage(samples);
            let scaled = volt_scale.apply(samples);
            let (y_min, y_max) = padded_range(&scaled);
            let mut builder = ChartBuilder::on(&areas[idx]);
            builder
                .margin(10)
                .x_label_area_size(32)
                .y_label_area_size(52);
            if idx == 0 {
                builder.caption(&options.title, ("sans-serif", 18));
            }
            let mut chart = builder.build_cartesian_2d(t_min..t_max, y_min..y_max)?;
            // The time axis caption repeats on every channel row when a
            // script row follows; otherwise only the bottom row carries it.
            let show_time_desc = script_row || idx + 1 == frame.num_channels();
            {
                let mut mesh = chart.configure_mesh();
                mesh.x_labels(11)
                    .y_labels(6)
                    .light_line_style(BLACK.mix(0.08))
                    .bold_line_style(BLACK.mix(0.25))
                    .x_label_formatter(&format_tick)
                    .y_label_formatter(&format_tick)
                    .y_desc(scale::voltage_heading(
                        &frame.channel_labels[idx],
                        volt_scale,
                    ))
                    .axis_desc_style(("sans-serif", 14).into_font().color(&color));
                if show_time_desc {
                    mesh.x_desc(scale::time_heading(time_scale));
                }
                mesh.draw()?;
            }
            let points = scaled_time.iter().copied().zip(scaled.iter().copied());
            let series = chart.draw_series(LineSeries::new(points, &color))?;
            if options.display_frequency {
                if let Some(peak) = dominant_frequency(samples, frame.sample_rate_hz) {
                    let freq_scale = EngScale::for_frequency(peak.frequency_hz);
                    series
                        .label(format!(
                            "Frequency via FFT: {:.2} {}",
                            freq_scale.apply_value(peak.frequency_hz),
                            freq_scale.frequency_unit()
                        ))
                        .legend(move |(x, y)| {
                            PathElement::new(vec![(x, y), (x + 20, y)], color)
                        });
                    chart
                        .configure_series_labels()
                        .position(SeriesLabelPosition::UpperRight)
                        .border_style(BLACK.mix(0.2))
                        .background_style(WHITE.mix(0.85))
                        .draw()?;
                }
            }
        }
        if script_row {
            script.render(&areas[rows - 1], full_frame, style)?;
        }
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
/// Min/max of `values` with 5% headroom on both sides.
pub(crate) fn padded_range(values: &[f64]) -> (f64, f64) {
    let (min, max) = padded_range_tight(values);
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}
fn padded_range_tight(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (-1.0, 1.0);
    }
    if (max - min).abs() < f64::EPSILON {
        (min - 1.0, max + 1.0)
    } else {
        (min, max)
    }
}
pub(crate) fn format_tick(value: &f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 100.0 {
        format!("{value:.0}")
    } else if magnitude >= 1.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.3}")
    }
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ScopeError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| ScopeError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripts::NullScript;
    fn frame() -> TraceFrame {
        let time_s: Vec<f64> = (0..256).map(|i| i as f64 / 1000.0).collect();
        let ch1: Vec<f64> = time_s
            .iter()
            .map(|t| (2.0 * std::f64::consts::PI * 20.0 * t).sin())
            .collect();
        let ch2: Vec<f64> = time_s.iter().map(|t| t * 0.5).collect();
        TraceFrame {
            sample_rate_hz: 1000.0,
            time_heading: "Time(S)".into(),
            time_s,
            channel_labels: vec!["CH1(V)".into(), "CH2(V)".into()],
            channels: vec![ch1, ch2],
        }
    }
    fn options() -> FigureOptions {
        FigureOptions {
            style: PlotStyle::with_size(320, 240),
            title: "M2K Oscilloscope [Nr of samples: 256]".into(),
            display_frequency: false,
        }
    }
    #[test]
    fn renders_png_for_channel_rows() {
        let frame = frame();
        let selection = ChannelSelection::all(&frame);
        let mut script = NullScript::default();
        let png = render_figure(&frame, &selection, &options(), &mut script).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    }
    #[test]
    fn renders_a_reordered_subset() {
        let frame = frame();
        let selection = ChannelSelection::new(vec!["CH2(V)".into()]);
        let mut script = NullScript::default();
        let png = render_figure(&frame, &selection, &options(), &mut script).unwrap();
        assert!(!png.is_empty());
    }
    #[test]
    fn frequency_legend_render_still_produces_png() {
        let mut opts = options();
        opts.display_frequency = true;
        let frame = frame();
        let selection = ChannelSelection::all(&frame);
        let mut script = NullScript::default();
        let png = render_figure(&frame, &selection, &opts, &mut script).unwrap();
        assert!(!png.is_empty());
    }
    #[test]
    fn empty_selection_is_an_error() {
        let empty = TraceFrame {
            sample_rate_hz: 1000.0,
            time_heading: "Time(S)".into(),
            time_s: vec![],
            channel_labels: vec![],
            channels: vec![],
        };
        let selection = ChannelSelection::all(&empty);
        let mut script = NullScript::default();
        assert!(render_figure(&empty, &selection, &options(), &mut script).is_err());
    }
    #[test]
    fn tick_formatting_tracks_magnitude() {
        assert_eq!(format_tick(&250.0), "250");
        assert_eq!(format_tick(&2.5), "2.5");
        assert_eq!(format_tick(&0.25), "0.250");
    }
}

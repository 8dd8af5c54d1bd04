use crate::scope::error::ScopeError;
/// Parsed capture: shared time axis plus one sample vector per channel.
#[derive(Clone, Debug)]
pub struct TraceFrame {
    pub sample_rate_hz: f64,
    pub time_heading: String,
    pub time_s: Vec<f64>,
    pub channel_labels: Vec<String>,
    pub channels: Vec<Vec<f64>>, // channel -> samples
}
impl TraceFrame {
    pub fn validate(&self) -> Result<(), ScopeError> {
        if self.sample_rate_hz <= 0.0 {
            return Err(ScopeError::InvalidSampleRate);
        }
        if self.channel_labels.len() != self.channels.len() {
            return Err(ScopeError::MalformedExport(format!(
                "{} channel labels for {} channels",
                self.channel_labels.len(),
                self.channels.len()
            )));
        }
        for (label, samples) in self.channel_labels.iter().zip(&self.channels) {
            if samples.len() != self.time_s.len() {
                return Err(ScopeError::MalformedExport(format!(
                    "channel {label} has {} samples for {} time points",
                    samples.len(),
                    self.time_s.len()
                )));
            }
        }
        Ok(())
    }
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }
    pub fn samples_per_channel(&self) -> usize {
        self.time_s.len()
    }
    pub fn time_span(&self) -> Option<(f64, f64)> {
        match (self.time_s.first(), self.time_s.last()) {
            (Some(first), Some(last)) => Some((*first, *last)),
            _ => None,
        }
    }
    pub fn channel(&self, heading: &str) -> Result<&[f64], ScopeError> {
        self.channel_labels
            .iter()
            .position(|label| label == heading)
            .map(|idx| self.channels[idx].as_slice())
            .ok_or_else(|| ScopeError::UnknownChannel {
                heading: heading.to_owned(),
                available: self.channel_labels.clone(),
            })
    }
    /// Reordered subset of channels, in the order the user picked them.
    pub fn select(&self, selection: &ChannelSelection) -> Result<TraceFrame, ScopeError> {
        let mut labels = Vec::with_capacity(selection.labels.len());
        let mut channels = Vec::with_capacity(selection.labels.len());
        for label in &selection.labels {
            channels.push(self.channel(label)?.to_vec());
            labels.push(label.clone());
        }
        Ok(TraceFrame {
            sample_rate_hz: self.sample_rate_hz,
            time_heading: self.time_heading.clone(),
            time_s: self.time_s.clone(),
            channel_labels: labels,
            channels,
        })
    }
    /// Rows whose time lies inside the window, inclusive on both ends.
    pub fn crop(&self, window: &TimeWindow) -> Result<TraceFrame, ScopeError> {
        let keep: Vec<usize> = self
            .time_s
            .iter()
            .enumerate()
            .filter(|(_, t)| window.contains(**t))
            .map(|(i, _)| i)
            .collect();
        if keep.is_empty() {
            return Err(ScopeError::EmptyWindow {
                start: window.start_s,
                end: window.end_s,
            });
        }
        let time_s = keep.iter().map(|&i| self.time_s[i]).collect();
        let channels = self
            .channels
            .iter()
            .map(|samples| keep.iter().map(|&i| samples[i]).collect())
            .collect();
        Ok(TraceFrame {
            sample_rate_hz: self.sample_rate_hz,
            time_heading: self.time_heading.clone(),
            time_s,
            channel_labels: self.channel_labels.clone(),
            channels,
        })
    }
}
/// Ordered list of channel headings chosen for plotting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelSelection {
    pub labels: Vec<String>,
}
impl ChannelSelection {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }
    pub fn all(frame: &TraceFrame) -> Self {
        Self {
            labels: frame.channel_labels.clone(),
        }
    }
}
/// Inclusive time range in seconds, normalised so `start_s <= end_s`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWindow {
    pub start_s: f64,
    pub end_s: f64,
}
impl TimeWindow {
    pub fn new(start_s: f64, end_s: f64) -> Self {
        if start_s <= end_s {
            Self { start_s, end_s }
        } else {
            Self {
                start_s: end_s,
                end_s: start_s,
            }
        }
    }
    pub fn full(frame: &TraceFrame) -> Self {
        let (start_s, end_s) = frame.time_span().unwrap_or((0.0, 0.0));
        Self { start_s, end_s }
    }
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start_s && t <= self.end_s
    }
}

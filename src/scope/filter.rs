use rustfft::num_complex::Complex64;
use sci_rs::signal::filter::design::{
    iirfilter_dyn, DigitalFilter, FilterBandType, FilterOutputType, FilterType, Sos,
};
use sci_rs::signal::filter::sosfiltfilt_dyn;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use crate::scope::error::ScopeError;
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButterKind {
    Lowpass,
    Highpass,
    Bandpass,
    Bandstop,
}
impl ButterKind {
    pub const ALL: [ButterKind; 4] = [
        ButterKind::Lowpass,
        ButterKind::Highpass,
        ButterKind::Bandpass,
        ButterKind::Bandstop,
    ];
    pub fn as_str(&self) -> &'static str {
        match self {
            ButterKind::Lowpass => "lowpass",
            ButterKind::Highpass => "highpass",
            ButterKind::Bandpass => "bandpass",
            ButterKind::Bandstop => "bandstop",
        }
    }
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name.trim().to_lowercase())
    }
    fn band_type(&self) -> FilterBandType {
        match self {
            ButterKind::Lowpass => FilterBandType::Lowpass,
            ButterKind::Highpass => FilterBandType::Highpass,
            ButterKind::Bandpass => FilterBandType::Bandpass,
            ButterKind::Bandstop => FilterBandType::Bandstop,
        }
    }
}
/// Zero-phase Butterworth filter: SOS design applied forward and backward
/// (`filtfilt` semantics), which doubles the effective order.
#[derive(Clone, Copy, Debug)]
pub struct ButterFilter {
    pub kind: ButterKind,
    pub order: usize,
    pub low_cut_hz: f64,
    pub high_cut_hz: f64,
    pub sample_rate_hz: f64,
}
/// Gain curve of a designed filter, for the response subplot.
#[derive(Clone, Debug)]
pub struct FrequencyResponse {
    pub frequencies_hz: Vec<f64>,
    pub gains: Vec<f64>,
}
impl ButterFilter {
    /// Cutoffs the design actually uses: lowpass reads the low cut, highpass
    /// the high cut, band filters both.
    pub fn cutoffs_hz(&self) -> Vec<f64> {
        match self.kind {
            ButterKind::Lowpass => vec![self.low_cut_hz],
            ButterKind::Highpass => vec![self.high_cut_hz],
            ButterKind::Bandpass | ButterKind::Bandstop => {
                vec![self.low_cut_hz, self.high_cut_hz]
            }
        }
    }
    /// Reported order: forward-backward filtering doubles the design order.
    pub fn effective_order(&self) -> usize {
        self.order * 2
    }
    pub fn validate(&self) -> Result<(), ScopeError> {
        if self.order < 1 {
            return Err(ScopeError::ScriptParams(
                "filter order must be an integer greater than 0".into(),
            ));
        }
        if self.sample_rate_hz <= 0.0 {
            return Err(ScopeError::InvalidSampleRate);
        }
        let cutoffs = self.cutoffs_hz();
        if cutoffs.iter().any(|c| *c <= 0.0) {
            return Err(ScopeError::ScriptParams(format!(
                "{} cutoff frequencies must be greater than 0",
                self.kind.as_str()
            )));
        }
        if matches!(self.kind, ButterKind::Bandpass | ButterKind::Bandstop)
            && self.high_cut_hz < self.low_cut_hz
        {
            return Err(ScopeError::ScriptParams(
                "band filter high cut must be at or above the low cut".into(),
            ));
        }
        let highest = cutoffs.iter().fold(0.0f64, |acc, c| acc.max(*c));
        if self.sample_rate_hz <= 2.0 * highest {
            return Err(ScopeError::ScriptParams(format!(
                "sample rate must exceed twice the highest cutoff (Nyquist); cutoffs should stay below {}",
                self.sample_rate_hz / 2.0
            )));
        }
        Ok(())
    }
    fn normalised_cutoffs(&self, sample_rate_hz: f64) -> Vec<f64> {
        let nyquist = sample_rate_hz / 2.0;
        self.cutoffs_hz().iter().map(|c| c / nyquist).collect()
    }
    fn design_sos(&self) -> Result<Vec<Sos<f64>>, ScopeError> {
        let designed = iirfilter_dyn(
            self.order,
            self.normalised_cutoffs(self.sample_rate_hz),
            None,
            None,
            Some(self.kind.band_type()),
            Some(FilterType::Butterworth),
            Some(false),
            Some(FilterOutputType::Sos),
            None,
        );
        match designed {
            DigitalFilter::Sos(sos) => Ok(sos.sos),
            _ => Err(ScopeError::FilterDesign(
                "expected SOS output from iirfilter_dyn".into(),
            )),
        }
    }
    fn design_ba(&self, order: usize, sample_rate_hz: f64) -> Result<(Vec<f64>, Vec<f64>), ScopeError> {
        let designed = iirfilter_dyn(
            order,
            self.normalised_cutoffs(sample_rate_hz),
            None,
            None,
            Some(self.kind.band_type()),
            Some(FilterType::Butterworth),
            Some(false),
            Some(FilterOutputType::Ba),
            None,
        );
        match designed {
            DigitalFilter::Ba(ba) => Ok((ba.b, ba.a)),
            _ => Err(ScopeError::FilterDesign(
                "expected Ba output from iirfilter_dyn".into(),
            )),
        }
    }
    /// Zero-phase filtering of one channel.
    pub fn apply(&self, samples: &[f64]) -> Result<Vec<f64>, ScopeError> {
        self.validate()?;
        // sosfiltfilt pads with reflected samples; reject captures shorter
        // than the padding it needs.
        let min_len = 3 * (self.effective_order() + 1);
        if samples.len() <= min_len {
            return Err(ScopeError::FilterDesign(format!(
                "capture of {} samples is too short for zero-phase filtering (need more than {min_len})",
                samples.len()
            )));
        }
        let sos = self.design_sos()?;
        Ok(sosfiltfilt_dyn(samples.iter(), &sos))
    }
    /// Gain |H| sampled on `points` frequencies. The response is shown for
    /// the doubled order at a display rate of five times the highest cutoff,
    /// so the knee sits in frame.
    pub fn frequency_response(&self, points: usize) -> Result<FrequencyResponse, ScopeError> {
        self.validate()?;
        let highest = self
            .cutoffs_hz()
            .into_iter()
            .fold(0.0f64, |acc, c| acc.max(c));
        let display_rate_hz = highest * 5.0;
        let (b, a) = self.design_ba(self.effective_order(), display_rate_hz)?;
        let nyquist = display_rate_hz / 2.0;
        let points = points.max(2);
        let mut frequencies_hz = Vec::with_capacity(points);
        let mut gains = Vec::with_capacity(points);
        for i in 0..points {
            let freq = nyquist * i as f64 / (points - 1) as f64;
            let w = PI * i as f64 / (points - 1) as f64;
            let z = Complex64::new(0.0, -w).exp();
            let numerator = evaluate_polynomial(&b, z);
            let denominator = evaluate_polynomial(&a, z);
            let gain = if denominator.norm() == 0.0 {
                0.0
            } else {
                (numerator / denominator).norm()
            };
            frequencies_hz.push(freq);
            gains.push(gain);
        }
        Ok(FrequencyResponse {
            frequencies_hz,
            gains,
        })
    }
}
fn evaluate_polynomial(coefficients: &[f64], z_inv: Complex64) -> Complex64 {
    // Coefficients are ascending powers of z^-1: sum(c[k] * z_inv^k).
    coefficients
        .iter()
        .rev()
        .fold(Complex64::new(0.0, 0.0), |acc, c| acc * z_inv + c)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::fft::dominant_frequency;
    use std::f64::consts::PI;
    fn two_tone(n: usize, sample_rate_hz: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64 / sample_rate_hz;
                0.5 * (2.0 * PI * 10.0 * t).sin() + 2.0 * (2.0 * PI * 200.0 * t).sin()
            })
            .collect()
    }
    fn lowpass_50hz() -> ButterFilter {
        ButterFilter {
            kind: ButterKind::Lowpass,
            order: 4,
            low_cut_hz: 50.0,
            high_cut_hz: 0.0,
            sample_rate_hz: 2000.0,
        }
    }
    #[test]
    fn lowpass_removes_high_tone() {
        let samples = two_tone(4000, 2000.0);
        assert!((dominant_frequency(&samples, 2000.0).unwrap().frequency_hz - 200.0).abs() < 1.0);
        let filtered = lowpass_50hz().apply(&samples).unwrap();
        assert_eq!(filtered.len(), samples.len());
        let peak = dominant_frequency(&filtered, 2000.0).unwrap();
        assert!((peak.frequency_hz - 10.0).abs() < 1.0);
    }
    #[test]
    fn gain_drops_to_half_sqrt_two_at_cutoff() {
        let response = lowpass_50hz().frequency_response(501).unwrap();
        let cutoff_gain = response
            .frequencies_hz
            .iter()
            .zip(&response.gains)
            .min_by(|a, b| {
                (a.0 - 50.0).abs().total_cmp(&(b.0 - 50.0).abs())
            })
            .map(|(_, g)| *g)
            .unwrap();
        assert!((cutoff_gain - std::f64::consts::FRAC_1_SQRT_2).abs() < 0.05);
        assert!(response.gains[0] > 0.99);
    }
    #[test]
    fn validation_rejects_bad_parameters() {
        let mut filter = lowpass_50hz();
        filter.order = 0;
        assert!(filter.validate().is_err());
        let mut filter = lowpass_50hz();
        filter.low_cut_hz = 0.0;
        assert!(filter.validate().is_err());
        let reversed = ButterFilter {
            kind: ButterKind::Bandpass,
            order: 3,
            low_cut_hz: 1100.0,
            high_cut_hz: 500.0,
            sample_rate_hz: 1.0e6,
        };
        assert!(reversed.validate().is_err());
        let above_nyquist = ButterFilter {
            kind: ButterKind::Lowpass,
            order: 3,
            low_cut_hz: 1500.0,
            high_cut_hz: 0.0,
            sample_rate_hz: 2000.0,
        };
        assert!(above_nyquist.validate().is_err());
    }
    #[test]
    fn short_captures_are_rejected() {
        let samples = vec![0.0; 8];
        assert!(lowpass_50hz().apply(&samples).is_err());
    }
    #[test]
    fn kind_parsing_round_trips() {
        for kind in ButterKind::ALL {
            assert_eq!(ButterKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(ButterKind::from_name("Bandpass"), Some(ButterKind::Bandpass));
        assert_eq!(ButterKind::from_name("chebyshev"), None);
    }
}

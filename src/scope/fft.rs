use rustfft::{num_complex::Complex64, FftPlanner};
/// Single-channel magnitude spectrum in the same units as the input samples.
#[derive(Clone, Debug)]
pub struct Spectrum {
    pub sample_rate_hz: f64,
    pub frequencies_hz: Vec<f64>,
    pub magnitudes: Vec<f64>,
}
impl Spectrum {
    pub fn max_frequency_hz(&self) -> f64 {
        self.frequencies_hz.last().copied().unwrap_or(0.0)
    }
}
/// Computes normalised half spectra: `2/N * |FFT|` over the first `N/2` bins.
pub struct SpectrumBuilder;
impl SpectrumBuilder {
    pub fn compute(samples: &[f64], sample_rate_hz: f64) -> Spectrum {
        let n = samples.len();
        let bins = n / 2;
        if bins == 0 {
            return Spectrum {
                sample_rate_hz,
                frequencies_hz: Vec::new(),
                magnitudes: Vec::new(),
            };
        }
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(n);
        let mut buffer: Vec<Complex64> = samples
            .iter()
            .map(|v| Complex64::new(*v, 0.0))
            .collect();
        fft.process(&mut buffer);
        let scale = 2.0 / n as f64;
        let magnitudes = buffer
            .iter()
            .take(bins)
            .map(|c| c.norm() * scale)
            .collect();
        let frequencies_hz = (0..bins)
            .map(|k| k as f64 * sample_rate_hz / n as f64)
            .collect();
        Spectrum {
            sample_rate_hz,
            frequencies_hz,
            magnitudes,
        }
    }
}
/// Keep every `factor`-th sample; narrows the plotted frequency range by the
/// same factor. A factor of 1 (or 0) leaves the data untouched.
pub fn decimate(samples: &[f64], factor: usize) -> Vec<f64> {
    let factor = factor.max(1);
    samples.iter().step_by(factor).copied().collect()
}
/// One local maximum of a spectrum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpectralPeak {
    pub frequency_hz: f64,
    pub magnitude: f64,
}
/// Local maxima at or above `min_magnitude`, strongest first.
pub fn find_peaks(spectrum: &Spectrum, min_magnitude: f64) -> Vec<SpectralPeak> {
    let mags = &spectrum.magnitudes;
    let mut peaks: Vec<SpectralPeak> = (1..mags.len().saturating_sub(1))
        .filter(|&i| mags[i] > mags[i - 1] && mags[i] > mags[i + 1] && mags[i] >= min_magnitude)
        .map(|i| SpectralPeak {
            frequency_hz: spectrum.frequencies_hz[i],
            magnitude: mags[i],
        })
        .collect();
    peaks.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
    peaks
}
/// Strongest spectral peak of a channel, for the per-plot frequency legend.
pub fn dominant_frequency(samples: &[f64], sample_rate_hz: f64) -> Option<SpectralPeak> {
    let spectrum = SpectrumBuilder::compute(samples, sample_rate_hz);
    find_peaks(&spectrum, 0.0).into_iter().next()
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    fn sine(freq_hz: f64, sample_rate_hz: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq_hz * i as f64 / sample_rate_hz).sin())
            .collect()
    }
    #[test]
    fn unit_sine_has_unit_peak_at_its_frequency() {
        let samples = sine(50.0, 1000.0, 1000);
        let spectrum = SpectrumBuilder::compute(&samples, 1000.0);
        assert_eq!(spectrum.magnitudes.len(), 500);
        let peak = find_peaks(&spectrum, 0.0)[0];
        assert!((peak.frequency_hz - 50.0).abs() < 1e-6);
        assert!((peak.magnitude - 1.0).abs() < 1e-6);
    }
    #[test]
    fn peaks_rank_by_magnitude() {
        let mut samples = sine(50.0, 1000.0, 1000);
        let second: Vec<f64> = sine(120.0, 1000.0, 1000).iter().map(|v| v * 0.5).collect();
        for (a, b) in samples.iter_mut().zip(second) {
            *a += b;
        }
        let spectrum = SpectrumBuilder::compute(&samples, 1000.0);
        let peaks = find_peaks(&spectrum, 0.1);
        assert!(peaks.len() >= 2);
        assert!((peaks[0].frequency_hz - 50.0).abs() < 1e-6);
        assert!((peaks[1].frequency_hz - 120.0).abs() < 1e-6);
    }
    #[test]
    fn min_magnitude_filters_small_peaks() {
        let mut samples = sine(50.0, 1000.0, 1000);
        let second: Vec<f64> = sine(120.0, 1000.0, 1000).iter().map(|v| v * 0.05).collect();
        for (a, b) in samples.iter_mut().zip(second) {
            *a += b;
        }
        let spectrum = SpectrumBuilder::compute(&samples, 1000.0);
        let peaks = find_peaks(&spectrum, 0.5);
        assert_eq!(peaks.len(), 1);
        assert!((peaks[0].frequency_hz - 50.0).abs() < 1e-6);
    }
    #[test]
    fn decimation_halves_rate_and_length() {
        let samples = sine(10.0, 1000.0, 1000);
        let reduced = decimate(&samples, 2);
        assert_eq!(reduced.len(), 500);
        assert_eq!(reduced[1], samples[2]);
        assert_eq!(decimate(&samples, 1).len(), samples.len());
    }
    #[test]
    fn dominant_frequency_matches_signal() {
        let samples = sine(25.0, 1000.0, 2000);
        let peak = dominant_frequency(&samples, 1000.0).unwrap();
        assert!((peak.frequency_hz - 25.0).abs() < 0.5);
    }
}

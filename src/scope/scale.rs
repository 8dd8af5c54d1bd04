/// Engineering-notation scale: raw values are multiplied by `10^exponent`
/// so the plotted magnitudes stay in a readable range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngScale {
    pub exponent: i32,
}
const TIME_UNITS: [(i32, &str); 4] = [(0, "S"), (3, "mS"), (6, "uS"), (9, "nS")];
const VOLT_UNITS: [(i32, &str); 5] = [(0, "V"), (3, "mV"), (6, "uV"), (9, "nV"), (12, "pV")];
const FREQ_UNITS: [(i32, &str); 3] = [(0, "Hz"), (-3, "kHz"), (-6, "MHz")];
impl EngScale {
    pub fn identity() -> Self {
        Self { exponent: 0 }
    }
    /// Smallest exponent in steps of 3 (up to `max_exponent`) that lifts the
    /// absolute peak of `values` to at least 1.
    pub fn for_values(values: &[f64], max_exponent: i32) -> Self {
        let peak = values.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
        if peak == 0.0 {
            return Self::identity();
        }
        let mut exponent = 0;
        while exponent < max_exponent && peak * 10f64.powi(exponent) < 1.0 {
            exponent += 3;
        }
        Self { exponent }
    }
    pub fn for_time(values: &[f64]) -> Self {
        Self::for_values(values, 9)
    }
    pub fn for_voltage(values: &[f64]) -> Self {
        Self::for_values(values, 12)
    }
    /// Frequency axes scale downwards: pick Hz, kHz or MHz so the axis peak
    /// stays under 1000.
    pub fn for_frequency(max_hz: f64) -> Self {
        let mut exponent = 0;
        while exponent > -6 && max_hz * 10f64.powi(exponent) >= 1000.0 {
            exponent -= 3;
        }
        Self { exponent }
    }
    pub fn multiplier(&self) -> f64 {
        10f64.powi(self.exponent)
    }
    pub fn apply_value(&self, value: f64) -> f64 {
        value * self.multiplier()
    }
    pub fn apply(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| self.apply_value(*v)).collect()
    }
    pub fn time_unit(&self) -> &'static str {
        unit_for(&TIME_UNITS, self.exponent)
    }
    pub fn voltage_unit(&self) -> &'static str {
        unit_for(&VOLT_UNITS, self.exponent)
    }
    pub fn frequency_unit(&self) -> &'static str {
        unit_for(&FREQ_UNITS, self.exponent)
    }
}
fn unit_for(table: &[(i32, &'static str)], exponent: i32) -> &'static str {
    table
        .iter()
        .find(|(e, _)| *e == exponent)
        .map(|(_, u)| *u)
        .unwrap_or(table[0].1)
}
/// `Time(S)` style heading for a rescaled time axis.
pub fn time_heading(scale: EngScale) -> String {
    format!("Time ({})", scale.time_unit())
}
/// Rewrite a voltage heading such as `CH1(V)` for a rescaled axis: `CH1(mV)`.
pub fn voltage_heading(heading: &str, scale: EngScale) -> String {
    let unit = scale.voltage_unit();
    match heading.rfind("(V)") {
        Some(idx) => format!("{}({})", &heading[..idx], unit),
        None => format!("{} ({})", heading.trim_end(), unit),
    }
}
pub fn frequency_heading(scale: EngScale) -> String {
    format!("Frequency ({})", scale.frequency_unit())
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn millisecond_range_scales_to_ms() {
        let scale = EngScale::for_time(&[-0.004, 0.004]);
        assert_eq!(scale.exponent, 3);
        assert_eq!(scale.time_unit(), "mS");
        assert!((scale.apply_value(0.004) - 4.0).abs() < 1e-9);
    }
    #[test]
    fn unit_range_keeps_identity() {
        let scale = EngScale::for_voltage(&[-1.5, 2.0]);
        assert_eq!(scale.exponent, 0);
        assert_eq!(scale.voltage_unit(), "V");
    }
    #[test]
    fn microvolt_range_scales_up() {
        let scale = EngScale::for_voltage(&[2.5e-6]);
        assert_eq!(scale.exponent, 6);
        assert_eq!(scale.voltage_unit(), "uV");
    }
    #[test]
    fn zero_signal_does_not_scale() {
        assert_eq!(EngScale::for_voltage(&[0.0, 0.0]).exponent, 0);
    }
    #[test]
    fn frequency_scales_down() {
        assert_eq!(EngScale::for_frequency(500.0).frequency_unit(), "Hz");
        assert_eq!(EngScale::for_frequency(5_000.0).frequency_unit(), "kHz");
        assert_eq!(EngScale::for_frequency(2_000_000.0).frequency_unit(), "MHz");
    }
    #[test]
    fn heading_rewrites() {
        let scale = EngScale { exponent: 3 };
        assert_eq!(voltage_heading("CH1(V)", scale), "CH1(mV)");
        assert_eq!(voltage_heading("M1", scale), "M1 (mV)");
        assert_eq!(time_heading(EngScale { exponent: 6 }), "Time (uS)");
    }
}

use crate::scope::error::ScopeError;
use crate::scope::frame::TraceFrame;
use crate::scope::plot::{PlotArea, PlotStyle};
use crate::scripts::CustomScript;
/// Placeholder script: never active, draws nothing, reports nothing.
#[derive(Debug, Default)]
pub struct NullScript;
impl CustomScript for NullScript {
    fn name(&self) -> &'static str {
        "null"
    }
    fn prepare(&mut self, _frame: &TraceFrame) -> Result<(), ScopeError> {
        Ok(())
    }
    fn is_active(&self) -> bool {
        false
    }
    fn render(
        &mut self,
        _row: &PlotArea<'_>,
        _frame: &TraceFrame,
        _style: &PlotStyle,
    ) -> Result<(), ScopeError> {
        Ok(())
    }
    fn summary(&self) -> Option<String> {
        None
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn stays_inactive() {
        let mut script = NullScript;
        let frame = TraceFrame {
            sample_rate_hz: 1000.0,
            time_heading: "Time(S)".into(),
            time_s: vec![0.0],
            channel_labels: vec!["CH1(V)".into()],
            channels: vec![vec![0.0]],
        };
        script.prepare(&frame).unwrap();
        assert!(!script.is_active());
        assert!(script.summary().is_none());
    }
}

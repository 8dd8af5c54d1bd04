use std::collections::BTreeMap;
use once_cell::sync::Lazy;
use crate::config::Preferences;
use crate::scope::error::ScopeError;
use crate::scope::frame::TraceFrame;
use crate::scope::plot::{PlotArea, PlotStyle};
pub mod butter;
pub mod fft;
pub mod null;
pub use butter::ButterScript;
pub use fft::FftScript;
pub use null::NullScript;
/// Uniform interface for the pluggable transform drawn into the last grid
/// row of the figure.
pub trait CustomScript {
    fn name(&self) -> &'static str;
    /// Check parameters against the loaded capture. On error the script is
    /// left inactive and the session continues without it.
    fn prepare(&mut self, frame: &TraceFrame) -> Result<(), ScopeError>;
    fn is_active(&self) -> bool;
    /// Draw into the grid row. The script owns the row and may subdivide it.
    fn render(
        &mut self,
        row: &PlotArea<'_>,
        frame: &TraceFrame,
        style: &PlotStyle,
    ) -> Result<(), ScopeError>;
    /// Entry for the lab report once the script has rendered.
    fn summary(&self) -> Option<String>;
}
type ScriptFactory = fn(&Preferences) -> Box<dyn CustomScript>;
static REGISTRY: Lazy<BTreeMap<&'static str, ScriptFactory>> = Lazy::new(|| {
    let mut registry: BTreeMap<&'static str, ScriptFactory> = BTreeMap::new();
    registry.insert("null", |_| Box::<NullScript>::default());
    registry.insert("fft", |prefs| Box::new(FftScript::new(prefs.fft.clone())));
    registry.insert("butter", |prefs| {
        Box::new(ButterScript::new(prefs.butter.clone()))
    });
    registry
});
pub fn registered_names() -> Vec<&'static str> {
    REGISTRY.keys().copied().collect()
}
/// Instantiate a script by its registered name, with parameters recalled
/// from the preferences.
pub fn build_script(
    name: &str,
    prefs: &Preferences,
) -> Result<Box<dyn CustomScript>, ScopeError> {
    REGISTRY
        .get(name)
        .map(|factory| factory(prefs))
        .ok_or_else(|| ScopeError::UnknownScript {
            name: name.to_owned(),
            registered: registered_names().iter().map(|n| n.to_string()).collect(),
        })
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn registry_lists_the_three_scripts() {
        assert_eq!(registered_names(), vec!["butter", "fft", "null"]);
    }
    #[test]
    fn builds_scripts_by_name() {
        let prefs = Preferences::default();
        for name in registered_names() {
            let script = build_script(name, &prefs).unwrap();
            assert_eq!(script.name(), name);
        }
    }
    #[test]
    fn unknown_name_reports_the_registry() {
        let err = build_script("fir", &Preferences::default()).err().unwrap();
        match err {
            ScopeError::UnknownScript { name, registered } => {
                assert_eq!(name, "fir");
                assert_eq!(registered, vec!["butter", "fft", "null"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

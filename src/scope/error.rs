use thiserror::Error;
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("preferences error: {0}")]
    Preferences(#[from] serde_json::Error),
    #[error("malformed Scopy export: {0}")]
    MalformedExport(String),
    #[error("sample rate must be greater than zero")]
    InvalidSampleRate,
    #[error("channel {heading:?} not found; available: {available:?}")]
    UnknownChannel {
        heading: String,
        available: Vec<String>,
    },
    #[error("time window [{start}, {end}] does not intersect the capture")]
    EmptyWindow { start: f64, end: f64 },
    #[error("no custom script named {name:?}; registered: {registered:?}")]
    UnknownScript {
        name: String,
        registered: Vec<String>,
    },
    #[error("invalid script parameters: {0}")]
    ScriptParams(String),
    #[error("filter design failed: {0}")]
    FilterDesign(String),
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for ScopeError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        ScopeError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for ScopeError {
    fn from(value: image::ImageError) -> Self {
        ScopeError::Plot(value.to_string())
    }
}

pub mod error;
pub mod export;
pub mod fft;
pub mod filter;
pub mod frame;
pub mod plot;
pub mod scale;
pub use error::ScopeError;
pub use export::{ExportInfo, ScopyExport};
pub use fft::{Spectrum, SpectrumBuilder};
pub use filter::{ButterFilter, ButterKind};
pub use frame::{ChannelSelection, TimeWindow, TraceFrame};
pub use plot::{render_figure, FigureOptions, PlotArea, PlotStyle};
pub use scale::EngScale;

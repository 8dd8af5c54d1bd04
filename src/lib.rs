pub mod config;
pub mod report;
pub mod scope;
pub mod scripts;
pub mod ui;
pub mod wavegen;
pub use config::Preferences;
pub use report::LabReport;
pub use scope::ScopeError;

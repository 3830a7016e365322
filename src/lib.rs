pub mod analysis;
pub mod config;
pub mod document;
pub mod error;
pub mod models;
pub mod storage;
pub mod taxonomy;

pub use analysis::{BatchReport, Classifier, ClassifyPipeline};
pub use config::{Config, PipelineConfig};
pub use document::{Document, HtmlDocument};
pub use error::{Error, Result};
pub use taxonomy::Taxonomy;

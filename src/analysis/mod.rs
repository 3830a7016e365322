pub mod classifier;
pub mod pipeline;

pub use classifier::Classifier;
pub use pipeline::{BatchReport, ClassifyPipeline};

pub mod engine;
pub mod evaluator;
pub mod form;
pub mod pipeline;
pub mod stats;
pub mod targets;
pub mod vitals;

pub use crate::domain::model::{BatchResult, Evaluation, MeasurementInput, MeasurementRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;

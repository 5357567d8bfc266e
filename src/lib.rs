pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::LocalStorage;
pub use crate::core::{
    engine::BatchEngine, evaluator::evaluate, form::BmiForm, pipeline::BatchPipeline,
    vitals::VitalsEntry,
};
pub use domain::model::{BmiResult, Evaluation, MeasurementInput, ReductionGoal};
pub use utils::error::{RegistryError, Result};

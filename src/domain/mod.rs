// Domain layer: models and ports. No knowledge of files, HTTP or the CLI.

pub mod model;
pub mod ports;

// Domain layer: core models, transform options and ports (interfaces).

pub mod model;
pub mod options;
pub mod ports;

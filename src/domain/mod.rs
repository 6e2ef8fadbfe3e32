// Domain layer: the output schema and the ports (interfaces) to external systems.

pub mod model;
pub mod ports;

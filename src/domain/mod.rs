// Domain layer: exposure models, ports and the region table. No I/O here.

pub mod model;
pub mod ports;
pub mod region;

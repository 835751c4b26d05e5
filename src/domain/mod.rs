// Domain layer: records flowing through the sync jobs and the ports the adapters implement.

pub mod model;
pub mod ports;

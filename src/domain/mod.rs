// Domain layer: backend records, session tokens and the ports the client depends on.

pub mod model;
pub mod ports;
pub mod session;

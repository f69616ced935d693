//! Serial wire protocol: framing, packet model, and codec glue

pub mod framing;
pub mod packet;
pub mod wire;

//! Optional external decoders (MDC1200/FleetSync, DTMF), invoked as opaque
//! subprocesses on the raw audio segment. See §4.9 and §6 "External decoders".

mod subprocess;

pub use subprocess::{run, DecodeMode};

pub mod gate;

pub use gate::{AdmissionGate, GatePermit, GateStats};

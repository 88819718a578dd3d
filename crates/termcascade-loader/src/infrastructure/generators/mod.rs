//! Dynamic profile generators backed by the local system.
//!
//! - `shells` – one profile per login shell listed in a shells file.
//! - `fixed`  – a preset list of profiles (demos and tests).

pub mod fixed;
pub mod shells;

pub use fixed::FixedProfileGenerator;
pub use shells::ShellsProfileGenerator;

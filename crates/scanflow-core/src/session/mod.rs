//! Session domain module.
//!
//! Contains the scan session state machine and the types it collects while
//! walking a capture attempt.
//!
//! # Module Structure
//!
//! - `intent`: what kind of artifact is being captured (`ScanIntent`)
//! - `target`: who the action applies to (`Subject`, `ResolvedTarget`)
//! - `step`: the discriminated session state (`SessionStep`)
//! - `machine`: the state machine itself (`ScanSession`)

mod intent;
mod machine;
mod step;
mod target;


pub use intent::ScanIntent;
pub use machine::ScanSession;
pub use step::SessionStep;
pub use target::{ResolvedTarget, Subject};

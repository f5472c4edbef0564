//! Command-line front-ends for one-off ECS task runs.
//!
//! Two binaries share this crate: `ecsrun` (flag-driven, derives the
//! task from a reference task definition) and `ecsrun-basic` (seven
//! positional arguments, writes the rendered document to a local JSON
//! file before submission).

pub mod args;
pub mod artifact;
pub mod output;

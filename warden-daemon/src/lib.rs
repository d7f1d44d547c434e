//! Reconciliation between layered configuration and a local supervisord
//! instance: path layout, staleness detection, config rendering, and
//! lifecycle transitions. The daemon itself and its control protocol are
//! external; this crate only renders their fixed-format contract and shells
//! out to their binaries.

pub mod config;
pub mod control;
mod error;
pub mod paths;
pub mod process;
pub mod reconcile;

pub use control::{ControlClient, ControlVerb, LogStream, SupervisorCtl};
pub use error::DaemonError;
pub use process::{Launcher, Supervisord};
pub use reconcile::{Instance, InstanceReport, RunOutcome};

//! # Towline Driver Contract
//!
//! The harness core drives the target application through the object-safe
//! [`Browser`] and [`Page`] traits defined here; the concrete UI-automation
//! protocol behind them is an integration concern. The crate also ships a
//! [`simulated`] driver that models the dispatch application's screens with
//! synthetic latency and fault injection, so the full harness can run
//! without a browser.

pub mod dom;
pub mod error;
pub mod page;
pub mod simulated;

pub use error::{DriverError, DriverResult};
pub use page::{Browser, Page};
pub use simulated::{SimulatedBrowser, SimulationConfig};

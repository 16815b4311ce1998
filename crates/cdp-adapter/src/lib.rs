//! Chromium backend for WebPilot.
//!
//! [`ChromiumBrowser`] launches a local Chromium through the DevTools protocol
//! and implements the low-level action primitives; each navigation opens a
//! tab exposed as a [`ChromiumPage`] for analysis.

mod browser;
mod config;
mod error;
mod page;
mod registry;

pub use browser::ChromiumBrowser;
pub use config::ChromiumConfig;
pub use error::AdapterError;
pub use page::ChromiumPage;

//! The `qsw-controller` library crate provides an asynchronous client for
//! monitoring and managing QNAP QSW switches through their REST API.
//!
//! Core functionalities of this crate include:
//!
//! - Opening a session on a switch, checking it before each operation and
//!   opening a new one when it expires
//! - Reading every monitoring endpoint of a switch concurrently and caching
//!   the results, computing values such as port speeds between updates
//! - Running maintenance operations, such as firmware checks, live firmware
//!   updates, configuration backups and reboots
//!
//! Requests are sent with `reqwest` on top of the `tokio` executor. The
//! number of requests in flight for a switch is bounded, since switches
//! struggle with many concurrent connections.
//!
//! ```no_run
//! use qsw_controller::api::QswApi;
//! use qsw_controller::options::ConnectionOptions;
//!
//! # async fn run() -> qsw_controller::error::Result<()> {
//! let options = ConnectionOptions::new("http://192.168.1.200", "admin", "password");
//! let mut api = QswApi::new(options)?;
//!
//! let board = api.validate().await?;
//! println!("Connected to {:?}", board.model());
//!
//! api.update().await?;
//! println!("{:?}", api.data());
//!
//! api.logout().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// The client of a switch.
pub mod api;
/// Cached switch data and its serializable snapshot.
pub mod device;
/// Raw access to the switch endpoints.
pub mod endpoints;
/// Error management.
pub mod error;
/// Connection options.
pub mod options;

mod session;
mod transport;

#[cfg(test)]
mod tests;

//! Structured logging for the unit-of-work engine
//!
//! - [`init`] installs the global subscriber once per process for a
//!   [`Profile`]
//! - `log_op_start!`, `log_op_end!` and `log_op_error!` emit the boundary
//!   events of a public operation using the field names of
//!   [`schema`](crate::types::schema)
//! - [`test_capture`] records events in memory for assertions
//!
//! ```rust
//! use unitwork_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Boundary events belong to `UnitOfWork`. The registry, the end-points and
//! the commands only emit `debug!`/`trace!` detail.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};

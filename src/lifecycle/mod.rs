//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → assemble state → bind listener → serve
//!
//! Shutdown (shutdown.rs):
//!     SIGTERM/SIGINT → stop accepting → drain in-flight → exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then store/guard, then listener
//! - Shutdown drains in-flight requests before exit

pub mod shutdown;

pub use shutdown::signal_received;

//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → init logging → register components → run endpoints
//!
//! Shutdown (shutdown.rs):
//!     Signal received → hooks run LIFO on the "shutdown" thread → done
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger shutdown
//!     second SIGTERM/SIGINT → forced exit
//!
//! Tickers (ticker.rs):
//!     periodic task → cancelled by its own shutdown hook
//! ```
//!
//! # Design Decisions
//! - Shutdown is one-shot and the only process-wide cancellation signal
//! - Hooks are registered by whatever starts a resource, so teardown
//!   mirrors startup in reverse
//! - Shutdown has timeout: main stops waiting after the configured deadline

pub mod shutdown;
pub mod signals;
pub mod ticker;

pub use shutdown::Shutdown;

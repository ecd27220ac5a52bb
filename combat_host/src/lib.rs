//! combat_host - Runs a combat session behind a single-writer queue
//!
//! One [`SessionWorker`] task owns the [`CombatSession`](combat_core::CombatSession).
//! Clients talk to it through cloneable [`SessionHandle`]s; their commands are
//! applied strictly one at a time. Open reaction windows are closed when their
//! deadline passes, and every committed event is broadcast to subscribers.

pub mod config;
pub mod error;
pub mod handle;
pub mod host;
pub mod worker;

pub use config::HostConfig;
pub use error::{HostError, Result};
pub use handle::SessionHandle;
pub use host::SessionHost;
pub use worker::{Command, SessionWorker};

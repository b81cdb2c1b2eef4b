//! Focus-Timer Synchronizer
//!
//! Client-side mirror of the remote pomodoro operation log:
//! - ObjectId-compatible id generation
//! - Mutex-guarded session state shared by concurrent handlers
//! - Operation composition with override/stored/default precedence
//! - Context recovery for stateless handlers after a restart
//! - Loose-typed response ingest with terminal-status detection

pub mod error;
pub mod ingest;
pub mod object_id;
pub mod service;
pub mod state;
pub mod types;

pub use error::{FocusError, FocusResult};
pub use object_id::ObjectIdGenerator;
pub use service::FocusSyncService;
pub use state::{FocusSessionState, FocusStateStore};
pub use types::{ControlOptions, FocusBatchRequest, FocusOp, FocusOperation, StartOptions, StopOptions};

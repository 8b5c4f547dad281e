pub mod blocklist;
pub mod config;
pub mod error;
pub mod ipc;
pub mod messages;
pub mod presenter;
pub mod query;
pub mod runtime;
pub mod session;
pub mod snapshot;

pub use blocklist::BlockFilter;
pub use error::{IpcError, PresentError};
pub use ipc::{IpcClient, IpcRequest, IpcResponse};
pub use messages::WarningMessage;
pub use presenter::Presenter;
pub use query::{observe, SnapshotSource};
pub use runtime::{RuntimeHandle, SessionRuntime};
pub use session::Session;
pub use snapshot::{format_clock, SessionState, TimerSnapshot};

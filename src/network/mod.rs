//! Network Module
//!
//! HTTP server and connection handling.
//!
//! ## Architecture
//! - Single accept loop on the runtime
//! - One tokio task per connection, capped by a semaphore
//! - Requests routed through `dispatch` into the shared `TodoStore`

mod server;
mod connection;

pub use server::{Server, ShutdownHandle};
pub use connection::{dispatch, Connection};

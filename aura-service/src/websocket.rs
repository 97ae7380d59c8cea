//! WebSocket support for chat connections
//!
//! Each connection carries exactly one chat session. The client drives the
//! session with typed JSON messages and receives transcript and option
//! updates as they happen.

mod handlers;
mod manager;
pub mod messages;

pub use handlers::handle_ws_connection;
pub use manager::WebSocketManager;

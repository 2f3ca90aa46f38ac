//! # swquery – Spacewalk / Satellite XML-RPC client
//!
//! Inventory and package queries against a Spacewalk (or Red Hat
//! Satellite 5) server through its `/rpc/api` XML-RPC endpoint.
//!
//! ## Modules
//!
//! - **types**: Session token, system id, credentials, client config, query kinds
//! - **error**: Crate-specific error types
//! - **xmlrpc**: XML-RPC value model, request encoder, response decoder
//! - **transport**: `RpcTransport` seam + reqwest-backed HTTP transport
//! - **client**: Typed wrappers for the `auth.*` / `system.*` methods
//! - **session**: Scoped login / logout around a query body
//! - **projector**: Field projection over returned records
//! - **resolver**: System name → system id lookup
//! - **dispatch**: Query kind → remote listing → projected names
//! - **service**: One-call façade wiring everything together

pub mod types;
pub mod error;
pub mod xmlrpc;
pub mod transport;
pub mod client;
pub mod session;
pub mod projector;
pub mod resolver;
pub mod dispatch;
pub mod service;

pub use client::SpacewalkClient;
pub use dispatch::dispatch;
pub use error::{SpacewalkError, SpacewalkErrorKind, SpacewalkResult};
pub use projector::{project, Record, NAME_FIELD};
pub use resolver::resolve_system_id;
pub use service::{query_with, run_query};
pub use session::with_session;
pub use transport::{HttpTransport, RpcTransport};
pub use types::*;
pub use xmlrpc::{Value, XmlRpcError, XmlRpcResult};

//! XML-RPC wire format.
//!
//! Covers the part of XML-RPC that Spacewalk speaks:
//! - Scalar types `int` / `i4` / `i8`, `boolean`, `string`, `double`,
//!   `dateTime.iso8601`, `base64`, plus the `nil` extension
//! - `struct` and `array` containers, arbitrarily nested
//! - `methodCall` encoding and `methodResponse` decoding (params or fault)

pub mod value;
pub mod codec;

pub use codec::{decode_response, encode_call};
pub use value::{Value, DATETIME_FORMAT};

/// Errors produced while talking XML-RPC.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum XmlRpcError {
    /// Document is not well-formed XML
    #[error("XML error: {0}")]
    Xml(String),
    /// Well-formed XML that does not follow the XML-RPC grammar
    #[error("decode error: {0}")]
    Decode(String),
    /// Server answered with a `<fault>`
    #[error("fault {code}: {message}")]
    Fault { code: i64, message: String },
    /// Non-2xx HTTP status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// Connection, TLS or timeout failure
    #[error("transport error: {0}")]
    Transport(String),
}

pub type XmlRpcResult<T> = Result<T, XmlRpcError>;

impl From<reqwest::Error> for XmlRpcError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Transport(format!("HTTP timeout: {e}"))
        } else if e.is_connect() {
            Self::Transport(format!("Connection failed: {e}"))
        } else {
            Self::Transport(format!("HTTP error: {e}"))
        }
    }
}

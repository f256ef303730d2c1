//! # XML-RPC codec and transport for rTorrent.
//!
//! usage:
//!
//! ```rust,ignore
//! use rtorrent_xmlrpc::{Client, Config, Value};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(Config::new("http://localhost:8000/RPC2"))?;
//!     let hostname = client.call("system.hostname", &[]).await?;
//!     println!("rTorrent runs on {}", hostname.as_str()?);
//!     Ok(())
//! }
//! ```
//!
//! The codec itself is synchronous and stateless:
//!
//! ```rust,ignore
//! use rtorrent_xmlrpc::{MethodResponse, Value, decode_response, encode_response};
//!
//! let doc = encode_response(&Value::Array(vec![Value::Int(1), Value::from("two")]));
//! let decoded = decode_response(&doc).unwrap();
//! assert_eq!(
//!     decoded,
//!     MethodResponse::Success(Value::Array(vec![Value::Int(1), Value::from("two")]))
//! );
//! ```

mod client;
mod decode;
mod encode;
mod error;
mod message;
mod value;

#[cfg(test)]
use proptest as _;

pub use client::{Client, Config, DEFAULT_ADDR, DEFAULT_TIMEOUT};
pub use decode::{decode_call, decode_response};
pub use encode::{encode_call, encode_fault, encode_response};
pub use error::{Error, Result};
pub use message::{Fault, MethodCall, MethodResponse};
pub use value::{DateTime, Value, ValueKind};

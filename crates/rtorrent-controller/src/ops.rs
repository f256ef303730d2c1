//! Internal trait abstracting the XML-RPC transport.
//!
//! This module provides the [`XmlRpcOps`] trait which abstracts the underlying
//! XML-RPC client, enabling mocking in tests.

use rtorrent_xmlrpc::{Client, Error as XmlRpcError, Value};

/// Internal trait that abstracts one remote call.
/// This allows for mocking in tests.
#[cfg_attr(test, mockall::automock)]
#[allow(async_fn_in_trait)]
pub(crate) trait XmlRpcOps {
    async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, XmlRpcError>;
}

impl XmlRpcOps for Client {
    async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, XmlRpcError> {
        Client::call(self, method, &args).await
    }
}

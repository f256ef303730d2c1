//! Call and response envelopes.

use crate::{
    encode,
    error::{Error, Result},
    value::Value,
};

/// A named remote invocation with ordered positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    /// The method name, e.g. `d.multicall2`.
    pub name: String,
    /// Positional arguments in call order.
    pub params: Vec<Value>,
}

impl MethodCall {
    /// Creates a call with the given arguments.
    pub fn new(name: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Appends one argument.
    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.params.push(arg.into());
        self
    }

    /// Serializes the call into a request document.
    pub fn encode(&self) -> Vec<u8> {
        encode::encode_call(&self.name, &self.params)
    }
}

/// A fault reported by the server in place of a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// The `faultCode` member.
    pub code: i32,
    /// The `faultString` member.
    pub message: String,
}

/// A decoded response document.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    /// The single returned value.
    Success(Value),
    /// The server reported a fault.
    Fault(Fault),
}

impl MethodResponse {
    /// Returns the success value, turning a fault into [`Error::RemoteFault`].
    pub fn into_result(self) -> Result<Value> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Fault(Fault { code, message }) => Err(Error::RemoteFault { code, message }),
        }
    }
}

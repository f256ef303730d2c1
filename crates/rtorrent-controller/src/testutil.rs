//! Shared test utilities and fixtures.

use rtorrent_xmlrpc::Value;

/// A `d.multicall2` row in `TORRENT_FIELDS` order.
pub(crate) fn make_torrent_row(hash: &str, name: &str) -> Value {
    Value::Array(vec![
        Value::from(name),
        Value::Long(5_665_497_088),
        Value::from(hash),
        Value::from("linux"),
        Value::from("/downloads/temp"),
        Value::Int(1),
        Value::Int(0),
        Value::Int(1500),
        Value::Int(1_729_000_000),
        Value::Int(0),
        Value::Int(1_729_000_100),
    ])
}

/// An `f.multicall` row in `FILE_FIELDS` order.
pub(crate) fn make_file_row(path: &str, size: i64) -> Value {
    Value::Array(vec![Value::from(path), Value::Long(size)])
}

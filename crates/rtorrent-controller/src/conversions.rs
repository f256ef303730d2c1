//! Conversions from decoded XML-RPC values to rtorrent_types.
//!
//! The row wrappers exist to satisfy the orphan rule since `TryFrom` and the
//! target types are both defined outside this crate.

use rtorrent_types::{Field, File, Torrent};
use rtorrent_xmlrpc::{Error as XmlRpcError, Value};

/// Fields requested per torrent by `d.multicall2`, in row order.
pub(crate) const TORRENT_FIELDS: [Field; 11] = [
    Field::DName,
    Field::DSizeInBytes,
    Field::DHash,
    Field::DLabel,
    Field::DDirectory,
    Field::DIsActive,
    Field::DComplete,
    Field::DRatio,
    Field::DCreationTime,
    Field::DFinishedTime,
    Field::DStartedTime,
];

/// Fields requested per file by `f.multicall`, in row order.
pub(crate) const FILE_FIELDS: [Field; 2] = [Field::FPath, Field::FSizeInBytes];

/// Wrapper for converting one `d.multicall2` row into a `Torrent`.
#[derive(Debug)]
pub(crate) struct TorrentRow<'a>(pub(crate) &'a [Value]);

/// Wrapper for converting one `f.multicall` row into a `File`.
#[derive(Debug)]
pub(crate) struct FileRow<'a>(pub(crate) &'a [Value]);

impl TryFrom<TorrentRow<'_>> for Torrent {
    type Error = XmlRpcError;

    fn try_from(row: TorrentRow<'_>) -> Result<Self, Self::Error> {
        let fields = check_len(row.0, TORRENT_FIELDS.len())?;
        Ok(Self {
            name: fields[0].as_str()?.to_owned(),
            size: fields[1].as_long()?,
            hash: fields[2].as_str()?.to_owned(),
            label: fields[3].as_str()?.to_owned(),
            path: fields[4].as_str()?.to_owned(),
            completed: fields[6].as_long()? > 0,
            ratio: ratio_from_permille(fields[7].as_long()?),
            created: fields[8].as_long()?,
            finished: fields[9].as_long()?,
            started: fields[10].as_long()?,
        })
    }
}

impl TryFrom<FileRow<'_>> for File {
    type Error = XmlRpcError;

    fn try_from(row: FileRow<'_>) -> Result<Self, Self::Error> {
        let fields = check_len(row.0, FILE_FIELDS.len())?;
        Ok(Self {
            path: fields[0].as_str()?.to_owned(),
            size: fields[1].as_long()?,
        })
    }
}

fn check_len(row: &[Value], expected: usize) -> Result<&[Value], XmlRpcError> {
    if row.len() < expected {
        return Err(XmlRpcError::Protocol(format!(
            "row has {} fields, expected {expected}",
            row.len()
        )));
    }
    Ok(row)
}

/// rTorrent reports ratios in per-mille.
pub(crate) fn ratio_from_permille(permille: i64) -> f64 {
    permille as f64 / 1000.0
}

/// Unwraps a scalar result that some daemons wrap in a one-element array.
pub(crate) fn single(value: Value) -> Result<Value, XmlRpcError> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .next()
            .ok_or_else(|| XmlRpcError::Protocol("expected a value, got an empty array".into())),
        other => Ok(other),
    }
}

/// Splits a multicall result into its rows.
///
/// Rows are arrays of field values. They may arrive as a plain list of rows, or
/// with every group of rows wrapped in one more array level.
pub(crate) fn multicall_rows(value: &Value) -> Result<Vec<&[Value]>, XmlRpcError> {
    let mut rows = Vec::new();
    for item in value.as_array()? {
        let inner = item.as_array()?;
        if inner.is_empty() {
            continue;
        }
        if inner.iter().all(|v| matches!(v, Value::Array(_))) {
            for row in inner {
                rows.push(row.as_array()?);
            }
        } else {
            rows.push(inner);
        }
    }
    Ok(rows)
}

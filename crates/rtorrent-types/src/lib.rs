//! # rTorrent Types
//!
//! This crate defines the domain types and the client trait for controlling an rTorrent daemon.

use std::fmt;

use thiserror::Error;

/// Error type for rTorrent operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RTorrentError {
    /// Network-related errors (connection failures, timeouts, HTTP errors, etc.)
    #[error("network error: {0}")]
    Network(String),

    /// Authentication errors
    #[error("authentication required")]
    Unauthorized,

    /// The daemon answered with a fault
    #[error("{method} failed with fault {code}: {message}")]
    Fault {
        /// The remote method that failed.
        method: String,
        /// Fault code reported by the daemon.
        code: i32,
        /// Fault message reported by the daemon.
        message: String,
    },

    /// The response could not be decoded or did not have the expected shape
    #[error("{method} returned an unexpected response: {reason}")]
    UnexpectedResponse {
        /// The remote method whose response was rejected.
        method: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Invalid client configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// An attribute of a download item ("d.") or file item ("f.") that can be queried or set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Name of the download item.
    DName,
    /// Label of the download item, stored in `custom1`.
    DLabel,
    /// Size in bytes of the download item.
    DSizeInBytes,
    /// Info hash of the download item.
    DHash,
    /// Base path of the download item.
    DBasePath,
    /// Directory of the download item.
    DDirectory,
    /// Whether the download item is active.
    DIsActive,
    /// Whether the download item is open.
    DIsOpen,
    /// State of the download item: 0 stopped, 1 started.
    DState,
    /// Ratio of the download item, in per-mille.
    DRatio,
    /// Whether the download item is complete.
    DComplete,
    /// Completed bytes of the download item.
    DCompletedBytes,
    /// Download rate of the download item.
    DDownRate,
    /// Upload rate of the download item.
    DUpRate,
    /// Creation date of the torrent.
    DCreationTime,
    /// Date the download finished.
    DFinishedTime,
    /// Date the download started.
    DStartedTime,
    /// Path of a file item.
    FPath,
    /// Size in bytes of a file item.
    FSizeInBytes,
}

impl Field {
    /// The rTorrent command for this field, e.g. `d.name`.
    pub const fn cmd(self) -> &'static str {
        match self {
            Self::DName => "d.name",
            Self::DLabel => "d.custom1",
            Self::DSizeInBytes => "d.size_bytes",
            Self::DHash => "d.hash",
            Self::DBasePath => "d.base_path",
            Self::DDirectory => "d.directory",
            Self::DIsActive => "d.is_active",
            Self::DIsOpen => "d.is_open",
            Self::DState => "d.state",
            Self::DRatio => "d.ratio",
            Self::DComplete => "d.complete",
            Self::DCompletedBytes => "d.completed_bytes",
            Self::DDownRate => "d.down.rate",
            Self::DUpRate => "d.up.rate",
            Self::DCreationTime => "d.creation_date",
            Self::DFinishedTime => "d.timestamp.finished",
            Self::DStartedTime => "d.timestamp.started",
            Self::FPath => "f.path",
            Self::FSizeInBytes => "f.size_bytes",
        }
    }

    /// The form used in multicall field lists, e.g. `d.name=`.
    pub fn query(self) -> String {
        format!("{}=", self.cmd())
    }

    /// Pairs the field with a value to be set when adding a torrent.
    pub fn set_value(self, value: impl Into<String>) -> FieldValue {
        FieldValue {
            field: self,
            value: value.into(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cmd())
    }
}

/// A field assignment, rendered as an rTorrent command such as `d.custom1.set="my-label"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    /// The field to set.
    pub field: Field,
    /// The value to set it to.
    pub value: String,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.set=\"{}\"", self.field, self.value)
    }
}

/// A named view of download items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    /// All torrents.
    #[default]
    Main,
    /// Torrents that have been started.
    Started,
    /// Torrents that have been stopped.
    Stopped,
    /// Torrents that are currently hashing.
    Hashing,
    /// Torrents that are currently seeding.
    Seeding,
}

impl View {
    /// The view name as rTorrent knows it.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Started => "started",
            Self::Stopped => "stopped",
            Self::Hashing => "hashing",
            Self::Seeding => "seeding",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// rTorrent client trait.
#[allow(async_fn_in_trait)]
pub trait RTorrent {
    /// Add a torrent by URL and start it. `extra` commands are applied to the new item.
    async fn add(&self, url: &str, extra: &[FieldValue]) -> Result<(), RTorrentError>;
    /// Add a torrent by URL without starting it.
    async fn add_stopped(&self, url: &str, extra: &[FieldValue]) -> Result<(), RTorrentError>;
    /// Add a torrent from the contents of a .torrent file and start it.
    async fn add_torrent(&self, data: &[u8], extra: &[FieldValue]) -> Result<(), RTorrentError>;
    /// Add a torrent from the contents of a .torrent file without starting it.
    async fn add_torrent_stopped(
        &self,
        data: &[u8],
        extra: &[FieldValue],
    ) -> Result<(), RTorrentError>;
    /// The IP address the daemon is bound to.
    async fn ip(&self) -> Result<String, RTorrentError>;
    /// The host name reported by the daemon.
    async fn name(&self) -> Result<String, RTorrentError>;
    /// Total bytes downloaded.
    async fn down_total(&self) -> Result<i64, RTorrentError>;
    /// Current download rate, in bytes per second.
    async fn down_rate(&self) -> Result<i64, RTorrentError>;
    /// Total bytes uploaded.
    async fn up_total(&self) -> Result<i64, RTorrentError>;
    /// Current upload rate, in bytes per second.
    async fn up_rate(&self) -> Result<i64, RTorrentError>;
    /// All torrents in the given view.
    async fn torrents(&self, view: View) -> Result<Vec<Torrent>, RTorrentError>;
    /// The torrent with the given info hash.
    async fn torrent(&self, hash: &str) -> Result<Torrent, RTorrentError>;
    /// Remove the torrent. Local data is kept.
    async fn delete(&self, torrent: &Torrent) -> Result<(), RTorrentError>;
    /// The files of the torrent.
    async fn files(&self, torrent: &Torrent) -> Result<Vec<File>, RTorrentError>;
    /// Set the label of the torrent.
    async fn set_label(&self, torrent: &Torrent, label: &str) -> Result<(), RTorrentError>;
    /// Transfer status of the torrent.
    async fn status(&self, torrent: &Torrent) -> Result<Status, RTorrentError>;
    /// Start the torrent.
    async fn start(&self, torrent: &Torrent) -> Result<(), RTorrentError>;
    /// Stop the torrent.
    async fn stop(&self, torrent: &Torrent) -> Result<(), RTorrentError>;
    /// Close the torrent.
    async fn close(&self, torrent: &Torrent) -> Result<(), RTorrentError>;
    /// Open the torrent.
    async fn open(&self, torrent: &Torrent) -> Result<(), RTorrentError>;
    /// Pause the torrent.
    async fn pause(&self, torrent: &Torrent) -> Result<(), RTorrentError>;
    /// Resume the torrent.
    async fn resume(&self, torrent: &Torrent) -> Result<(), RTorrentError>;
    /// Whether the torrent is active.
    async fn is_active(&self, torrent: &Torrent) -> Result<bool, RTorrentError>;
    /// Whether the torrent is open.
    async fn is_open(&self, torrent: &Torrent) -> Result<bool, RTorrentError>;
    /// The torrent state: 0 for stopped, 1 for started or paused.
    async fn state(&self, torrent: &Torrent) -> Result<i64, RTorrentError>;
}

/// Torrent information.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Torrent {
    /// Info hash.
    pub hash: String,
    /// Name.
    pub name: String,
    /// Download directory.
    pub path: String,
    /// Size in bytes.
    pub size: i64,
    /// Label.
    pub label: String,
    /// Whether all pieces are complete.
    pub completed: bool,
    /// Upload ratio.
    pub ratio: f64,
    /// Creation date of the torrent, Unix seconds.
    pub created: i64,
    /// Date the download started, Unix seconds.
    pub started: i64,
    /// Date the download finished, Unix seconds.
    pub finished: i64,
}

impl fmt::Display for Torrent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Torrent:")?;
        writeln!(f, "\tHash: {}", self.hash)?;
        writeln!(f, "\tName: {}", self.name)?;
        writeln!(f, "\tPath: {}", self.path)?;
        writeln!(f, "\tLabel: {}", self.label)?;
        writeln!(f, "\tSize: {} bytes", self.size)?;
        writeln!(f, "\tCompleted: {}", self.completed)?;
        writeln!(f, "\tRatio: {}", self.ratio)
    }
}

/// Transfer status of a torrent.
#[derive(Debug, Clone, PartialEq, Default)]
#[allow(missing_docs)]
pub struct Status {
    pub completed: bool,

    pub completed_bytes: i64,

    pub down_rate: i64,

    pub up_rate: i64,

    pub ratio: f64,

    pub size: i64,
}

/// A file within a torrent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct File {
    /// Path relative to the torrent's directory.
    pub path: String,
    /// Size in bytes.
    pub size: i64,
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File:")?;
        writeln!(f, "\tPath: {}", self.path)?;
        writeln!(f, "\tSize: {} bytes", self.size)
    }
}

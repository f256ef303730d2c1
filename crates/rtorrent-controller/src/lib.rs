//! # rTorrent controller using XML-RPC.
//!
//! usage:
//!
//! ```rust,ignore
//! use rtorrent_controller::{Config, RTorrentClient};
//! use rtorrent_types::{Field, RTorrent, View};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RTorrentClient::new(Config::new("http://localhost:8000/RPC2"))?;
//!     client
//!         .add(
//!             "https://releases.ubuntu.com/ubuntu.iso.torrent",
//!             &[Field::DLabel.set_value("linux")],
//!         )
//!         .await?;
//!     for torrent in client.torrents(View::Main).await? {
//!         println!("{torrent}");
//!     }
//!     Ok(())
//! }
//! ```
//!

mod client;
mod conversions;
mod ops;

#[cfg(test)]
mod testutil;

pub use client::RTorrentClient;
pub use rtorrent_xmlrpc::{Client as XmlRpcClient, Config};

#[cfg(test)]
use axum as _;
#[cfg(test)]
use reqwest as _;
#[cfg(test)]
use test_log as _;
#[cfg(test)]
use tracing_subscriber as _;

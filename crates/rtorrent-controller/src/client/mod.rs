//! rTorrent XML-RPC client implementation.

use tracing::debug;

use rtorrent_types::{Field, FieldValue, File, RTorrent, RTorrentError, Status, Torrent, View};
use rtorrent_xmlrpc::{Client, Config, Error as XmlRpcError, Value};

use crate::conversions::{
    FILE_FIELDS, FileRow, TORRENT_FIELDS, TorrentRow, multicall_rows, ratio_from_permille, single,
};
use crate::ops::XmlRpcOps;

#[cfg(test)]
mod tests;

/// RTorrentClient controls an rTorrent daemon over XML-RPC.
#[allow(missing_debug_implementations, private_bounds)]
pub struct RTorrentClient<T: XmlRpcOps = Client> {
    client: T,
}

impl RTorrentClient {
    /// Create a new RTorrentClient for the configured endpoint.
    ///
    /// No request is sent until the first operation.
    pub fn new(config: Config) -> Result<Self, RTorrentError> {
        debug!("Connecting to rTorrent XML-RPC at {}", config.addr);
        let client = Client::new(config).map_err(|e| map_client_error("", e))?;
        Ok(Self { client })
    }

    /// Create a new RTorrentClient on top of an existing XML-RPC client, e.g. one
    /// built with [`Client::with_http_client`].
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Create a new RTorrentClient configured from the `RTORRENT_*` environment variables.
    pub fn from_env() -> Result<Self, RTorrentError> {
        Self::new(Config::from_env())
    }
}

#[allow(private_bounds)]
impl<T: XmlRpcOps> RTorrentClient<T> {
    /// Create a RTorrentClient with a custom client implementation.
    /// This is primarily useful for testing with mocks.
    #[cfg(test)]
    pub(crate) fn with_client(client: T) -> Self {
        Self { client }
    }

    async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, RTorrentError> {
        debug!("Calling {method} with {args:?}");
        let value = self
            .client
            .call(method, args)
            .await
            .map_err(|e| map_client_error(method, e))?;
        debug!("{method} returned {value:?}");
        Ok(value)
    }

    /// Calls a method that takes no arguments and returns one scalar.
    async fn global(&self, method: &str) -> Result<Value, RTorrentError> {
        let value = self.call(method, Vec::new()).await?;
        single(value).map_err(|e| unexpected(method, e))
    }

    async fn global_long(&self, method: &str) -> Result<i64, RTorrentError> {
        self.global(method)
            .await?
            .as_long()
            .map_err(|e| unexpected(method, e))
    }

    async fn global_string(&self, method: &str) -> Result<String, RTorrentError> {
        let value = self.global(method).await?;
        value
            .as_str()
            .map(str::to_owned)
            .map_err(|e| unexpected(method, e))
    }

    /// Calls `method` with the info hash as the only argument.
    async fn on_hash(&self, method: &str, hash: &str) -> Result<Value, RTorrentError> {
        let value = self.call(method, vec![Value::from(hash)]).await?;
        single(value).map_err(|e| unexpected(method, e))
    }

    async fn field_long(&self, hash: &str, field: Field) -> Result<i64, RTorrentError> {
        self.on_hash(field.cmd(), hash)
            .await?
            .as_long()
            .map_err(|e| unexpected(field.cmd(), e))
    }

    async fn field_string(&self, hash: &str, field: Field) -> Result<String, RTorrentError> {
        let value = self.on_hash(field.cmd(), hash).await?;
        value
            .as_str()
            .map(str::to_owned)
            .map_err(|e| unexpected(field.cmd(), e))
    }

    /// Sends a command whose result is ignored.
    async fn command(&self, method: &str, torrent: &Torrent) -> Result<(), RTorrentError> {
        self.call(method, vec![Value::from(torrent.hash.as_str())])
            .await?;
        Ok(())
    }

    async fn load(
        &self,
        method: &str,
        source: Value,
        extra: &[FieldValue],
    ) -> Result<(), RTorrentError> {
        // the first argument is the (empty) target
        let mut args = Vec::with_capacity(2 + extra.len());
        args.push(Value::from(""));
        args.push(source);
        args.extend(extra.iter().map(|fv| Value::from(fv.to_string())));
        self.call(method, args).await?;
        Ok(())
    }
}

#[allow(private_bounds)]
impl<T: XmlRpcOps> RTorrent for RTorrentClient<T> {
    async fn add(&self, url: &str, extra: &[FieldValue]) -> Result<(), RTorrentError> {
        debug!("Adding torrent from URL: {url}");
        self.load("load.start", Value::from(url), extra).await
    }

    async fn add_stopped(&self, url: &str, extra: &[FieldValue]) -> Result<(), RTorrentError> {
        debug!("Adding stopped torrent from URL: {url}");
        self.load("load.normal", Value::from(url), extra).await
    }

    async fn add_torrent(&self, data: &[u8], extra: &[FieldValue]) -> Result<(), RTorrentError> {
        debug!("Adding torrent from {} bytes of metainfo", data.len());
        self.load("load.raw_start", Value::from(data), extra).await
    }

    async fn add_torrent_stopped(
        &self,
        data: &[u8],
        extra: &[FieldValue],
    ) -> Result<(), RTorrentError> {
        debug!("Adding stopped torrent from {} bytes of metainfo", data.len());
        self.load("load.raw", Value::from(data), extra).await
    }

    async fn ip(&self) -> Result<String, RTorrentError> {
        self.global_string("network.bind_address").await
    }

    async fn name(&self) -> Result<String, RTorrentError> {
        self.global_string("system.hostname").await
    }

    async fn down_total(&self) -> Result<i64, RTorrentError> {
        self.global_long("throttle.global_down.total").await
    }

    async fn down_rate(&self) -> Result<i64, RTorrentError> {
        self.global_long("throttle.global_down.rate").await
    }

    async fn up_total(&self) -> Result<i64, RTorrentError> {
        self.global_long("throttle.global_up.total").await
    }

    async fn up_rate(&self) -> Result<i64, RTorrentError> {
        self.global_long("throttle.global_up.rate").await
    }

    async fn torrents(&self, view: View) -> Result<Vec<Torrent>, RTorrentError> {
        const METHOD: &str = "d.multicall2";
        debug!("Listing torrents in view {view}");
        let mut args = vec![Value::from(""), Value::from(view.as_str())];
        args.extend(TORRENT_FIELDS.iter().map(|f| Value::from(f.query())));

        let result = self.call(METHOD, args).await?;
        let torrents = multicall_rows(&result)
            .and_then(|rows| {
                rows.into_iter()
                    .map(|row| Torrent::try_from(TorrentRow(row)))
                    .collect::<Result<Vec<_>, _>>()
            })
            .map_err(|e| unexpected(METHOD, e))?;
        debug!("Torrents in view {view}: {}", torrents.len());

        Ok(torrents)
    }

    async fn torrent(&self, hash: &str) -> Result<Torrent, RTorrentError> {
        debug!("Getting torrent {hash}");
        let torrent = Torrent {
            hash: hash.to_owned(),
            name: self.field_string(hash, Field::DName).await?,
            size: self.field_long(hash, Field::DSizeInBytes).await?,
            label: self.field_string(hash, Field::DLabel).await?,
            path: self.field_string(hash, Field::DDirectory).await?,
            completed: self.field_long(hash, Field::DComplete).await? > 0,
            ratio: ratio_from_permille(self.field_long(hash, Field::DRatio).await?),
            created: self.field_long(hash, Field::DCreationTime).await?,
            finished: self.field_long(hash, Field::DFinishedTime).await?,
            started: self.field_long(hash, Field::DStartedTime).await?,
        };
        debug!("Torrent {hash}: {torrent:?}");

        Ok(torrent)
    }

    async fn delete(&self, torrent: &Torrent) -> Result<(), RTorrentError> {
        debug!("Deleting torrent {}", torrent.hash);
        self.command("d.erase", torrent).await
    }

    async fn files(&self, torrent: &Torrent) -> Result<Vec<File>, RTorrentError> {
        const METHOD: &str = "f.multicall";
        debug!("Listing files of torrent {}", torrent.hash);
        let mut args = vec![Value::from(torrent.hash.as_str()), Value::Int(0)];
        args.extend(FILE_FIELDS.iter().map(|f| Value::from(f.query())));

        let result = self.call(METHOD, args).await?;
        let files = multicall_rows(&result)
            .and_then(|rows| {
                rows.into_iter()
                    .map(|row| File::try_from(FileRow(row)))
                    .collect::<Result<Vec<_>, _>>()
            })
            .map_err(|e| unexpected(METHOD, e))?;

        Ok(files)
    }

    async fn set_label(&self, torrent: &Torrent, label: &str) -> Result<(), RTorrentError> {
        debug!("Setting label of torrent {} to {label:?}", torrent.hash);
        let args = vec![Value::from(torrent.hash.as_str()), Value::from(label)];
        self.call("d.custom1.set", args).await?;
        Ok(())
    }

    async fn status(&self, torrent: &Torrent) -> Result<Status, RTorrentError> {
        let hash = torrent.hash.as_str();
        debug!("Getting status of torrent {hash}");
        let status = Status {
            completed: self.field_long(hash, Field::DComplete).await? > 0,
            completed_bytes: self.field_long(hash, Field::DCompletedBytes).await?,
            down_rate: self.field_long(hash, Field::DDownRate).await?,
            up_rate: self.field_long(hash, Field::DUpRate).await?,
            ratio: ratio_from_permille(self.field_long(hash, Field::DRatio).await?),
            size: self.field_long(hash, Field::DSizeInBytes).await?,
        };
        debug!("Status of torrent {hash}: {status:?}");

        Ok(status)
    }

    async fn start(&self, torrent: &Torrent) -> Result<(), RTorrentError> {
        debug!("Starting torrent {}", torrent.hash);
        self.command("d.start", torrent).await
    }

    async fn stop(&self, torrent: &Torrent) -> Result<(), RTorrentError> {
        debug!("Stopping torrent {}", torrent.hash);
        self.command("d.stop", torrent).await
    }

    async fn close(&self, torrent: &Torrent) -> Result<(), RTorrentError> {
        debug!("Closing torrent {}", torrent.hash);
        self.command("d.close", torrent).await
    }

    async fn open(&self, torrent: &Torrent) -> Result<(), RTorrentError> {
        debug!("Opening torrent {}", torrent.hash);
        self.command("d.open", torrent).await
    }

    async fn pause(&self, torrent: &Torrent) -> Result<(), RTorrentError> {
        debug!("Pausing torrent {}", torrent.hash);
        self.command("d.pause", torrent).await
    }

    async fn resume(&self, torrent: &Torrent) -> Result<(), RTorrentError> {
        debug!("Resuming torrent {}", torrent.hash);
        self.command("d.resume", torrent).await
    }

    async fn is_active(&self, torrent: &Torrent) -> Result<bool, RTorrentError> {
        // active = 1; inactive = 0
        Ok(self.field_long(&torrent.hash, Field::DIsActive).await? == 1)
    }

    async fn is_open(&self, torrent: &Torrent) -> Result<bool, RTorrentError> {
        // open = 1; closed = 0
        Ok(self.field_long(&torrent.hash, Field::DIsOpen).await? == 1)
    }

    async fn state(&self, torrent: &Torrent) -> Result<i64, RTorrentError> {
        self.field_long(&torrent.hash, Field::DState).await
    }
}

fn unexpected(method: &str, err: XmlRpcError) -> RTorrentError {
    RTorrentError::UnexpectedResponse {
        method: method.to_owned(),
        reason: err.to_string(),
    }
}

/// Maps XML-RPC client errors to rTorrent errors.
fn map_client_error(method: &str, err: XmlRpcError) -> RTorrentError {
    match err {
        XmlRpcError::Unauthorized => RTorrentError::Unauthorized,
        XmlRpcError::RemoteFault { code, message } => RTorrentError::Fault {
            method: method.to_owned(),
            code,
            message,
        },
        XmlRpcError::Network(msg) => RTorrentError::Network(msg),
        XmlRpcError::Http(status) => RTorrentError::Network(format!("HTTP status {status}")),
        XmlRpcError::InvalidUrl(msg) => RTorrentError::Config(msg),
        err @ (XmlRpcError::Parse(_)
        | XmlRpcError::Protocol(_)
        | XmlRpcError::IncompleteInput
        | XmlRpcError::TypeMismatch { .. }) => unexpected(method, err),
    }
}

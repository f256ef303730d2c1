//! Tests for the RTorrentClient.

use rtorrent_types::{Field, RTorrent, RTorrentError, Torrent, View};
use rtorrent_xmlrpc::{Error as XmlRpcError, Value, ValueKind};

use super::{RTorrentClient, map_client_error};
use crate::ops::MockXmlRpcOps;
use crate::testutil::{make_file_row, make_torrent_row};

fn torrent(hash: &str) -> Torrent {
    Torrent {
        hash: hash.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_add_by_url() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call()
        .withf(|method, args| {
            method == "load.start"
                && *args
                    == vec![
                        Value::from(""),
                        Value::from("https://example.com/ubuntu.torrent"),
                        Value::from(r#"d.custom1.set="my-label""#),
                        Value::from(r#"d.base_path.set="/some/valid/path""#),
                    ]
        })
        .times(1)
        .returning(|_, _| Ok(Value::Int(0)));

    let client = RTorrentClient::with_client(mock);
    let result = client
        .add(
            "https://example.com/ubuntu.torrent",
            &[
                Field::DLabel.set_value("my-label"),
                Field::DBasePath.set_value("/some/valid/path"),
            ],
        )
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_add_stopped_by_url() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call()
        .withf(|method, args| {
            method == "load.normal"
                && *args == vec![Value::from(""), Value::from("magnet:?xt=urn:btih:abc")]
        })
        .times(1)
        .returning(|_, _| Ok(Value::Int(0)));

    let client = RTorrentClient::with_client(mock);
    let result = client.add_stopped("magnet:?xt=urn:btih:abc", &[]).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_add_torrent_data_is_binary() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call()
        .withf(|method, args| {
            method == "load.raw_start"
                && args.len() == 3
                && args[1] == Value::Binary(b"d8:announce0:e".to_vec())
                && args[2] == Value::from(r#"d.custom1.set="tv""#)
        })
        .times(1)
        .returning(|_, _| Ok(Value::Int(0)));
    mock.expect_call()
        .withf(|method, args| method == "load.raw" && args.len() == 2)
        .times(1)
        .returning(|_, _| Ok(Value::Int(0)));

    let client = RTorrentClient::with_client(mock);
    client
        .add_torrent(b"d8:announce0:e", &[Field::DLabel.set_value("tv")])
        .await
        .unwrap();
    client
        .add_torrent_stopped(b"d8:announce0:e", &[])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_add_fault() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call().returning(|_, _| {
        Err(XmlRpcError::RemoteFault {
            code: -503,
            message: "Could not create download".to_string(),
        })
    });

    let client = RTorrentClient::with_client(mock);
    let result = client.add("not-a-torrent", &[]).await;

    match result.unwrap_err() {
        RTorrentError::Fault {
            method,
            code,
            message,
        } => {
            assert_eq!(method, "load.start");
            assert_eq!(code, -503);
            assert_eq!(message, "Could not create download");
        }
        other => panic!("Expected Fault, got {other:?}"),
    }
}

#[tokio::test]
async fn test_ip_unwraps_single_element_array() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call()
        .withf(|method, args| method == "network.bind_address" && args.is_empty())
        .returning(|_, _| Ok(Value::Array(vec![Value::from("0.0.0.0")])));

    let client = RTorrentClient::with_client(mock);
    assert_eq!(client.ip().await.unwrap(), "0.0.0.0");
}

#[tokio::test]
async fn test_name_plain_string() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call()
        .withf(|method, _| method == "system.hostname")
        .returning(|_, _| Ok(Value::from("seedbox")));

    let client = RTorrentClient::with_client(mock);
    assert_eq!(client.name().await.unwrap(), "seedbox");
}

#[tokio::test]
async fn test_name_wrong_type() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call().returning(|_, _| Ok(Value::Int(1)));

    let client = RTorrentClient::with_client(mock);
    match client.name().await.unwrap_err() {
        RTorrentError::UnexpectedResponse { method, reason } => {
            assert_eq!(method, "system.hostname");
            assert!(reason.contains("expected string"), "{reason}");
        }
        other => panic!("Expected UnexpectedResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn test_ip_empty_array() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call().returning(|_, _| Ok(Value::Array(vec![])));

    let client = RTorrentClient::with_client(mock);
    assert!(matches!(
        client.ip().await,
        Err(RTorrentError::UnexpectedResponse { .. })
    ));
}

#[tokio::test]
async fn test_throttle_totals_and_rates() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call().returning(|method, _| {
        Ok(match method {
            "throttle.global_down.total" => Value::Long(5_000_000_000),
            "throttle.global_down.rate" => Value::Int(2048),
            // legacy daemons send integers as text
            "throttle.global_up.total" => Value::from("1024"),
            "throttle.global_up.rate" => Value::Array(vec![Value::Int(7)]),
            other => panic!("unexpected method {other}"),
        })
    });

    let client = RTorrentClient::with_client(mock);
    assert_eq!(client.down_total().await.unwrap(), 5_000_000_000);
    assert_eq!(client.down_rate().await.unwrap(), 2048);
    assert_eq!(client.up_total().await.unwrap(), 1024);
    assert_eq!(client.up_rate().await.unwrap(), 7);
}

#[tokio::test]
async fn test_throttle_non_numeric() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call().returning(|_, _| Ok(Value::from("abc")));

    let client = RTorrentClient::with_client(mock);
    assert!(matches!(
        client.down_rate().await,
        Err(RTorrentError::UnexpectedResponse { .. })
    ));
}

#[tokio::test]
async fn test_list_torrents_success() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call()
        .withf(|method, args| {
            method == "d.multicall2"
                && args.len() == 13
                && args[0] == Value::from("")
                && args[1] == Value::from("main")
                && args[2] == Value::from("d.name=")
                && args[5] == Value::from("d.custom1=")
                && args[12] == Value::from("d.timestamp.started=")
        })
        .returning(|_, _| {
            Ok(Value::Array(vec![
                make_torrent_row("HASH1", "torrent1"),
                make_torrent_row("HASH2", "torrent2"),
            ]))
        });

    let client = RTorrentClient::with_client(mock);
    let torrents = client.torrents(View::Main).await.unwrap();

    assert_eq!(torrents.len(), 2);
    assert_eq!(torrents[0].hash, "HASH1");
    assert_eq!(torrents[0].name, "torrent1");
    assert_eq!(torrents[1].hash, "HASH2");
    assert_eq!(torrents[1].name, "torrent2");
    assert_eq!(torrents[1].ratio, 1.5);
}

#[tokio::test]
async fn test_list_torrents_wrapped_rows() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call()
        .withf(|_, args| args[1] == Value::from("seeding"))
        .returning(|_, _| {
            Ok(Value::Array(vec![Value::Array(vec![
                make_torrent_row("HASH1", "torrent1"),
                make_torrent_row("HASH2", "torrent2"),
            ])]))
        });

    let client = RTorrentClient::with_client(mock);
    let torrents = client.torrents(View::Seeding).await.unwrap();

    let hashes: Vec<_> = torrents.iter().map(|t| t.hash.as_str()).collect();
    assert_eq!(hashes, ["HASH1", "HASH2"]);
}

#[tokio::test]
async fn test_list_torrents_empty() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call().returning(|_, _| Ok(Value::Array(vec![])));

    let client = RTorrentClient::with_client(mock);
    assert!(client.torrents(View::Main).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_torrents_bad_row() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call().returning(|_, _| {
        Ok(Value::Array(vec![Value::Array(vec![
            Value::from("name"),
            Value::Double(1.0),
        ])]))
    });

    let client = RTorrentClient::with_client(mock);
    match client.torrents(View::Main).await.unwrap_err() {
        RTorrentError::UnexpectedResponse { method, .. } => assert_eq!(method, "d.multicall2"),
        other => panic!("Expected UnexpectedResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_single_torrent() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call()
        .withf(|_, args| *args == vec![Value::from("HASH1")])
        .times(9)
        .returning(|method, _| {
            Ok(match method {
                "d.name" => Value::from("ubuntu.iso"),
                "d.size_bytes" => Value::Long(5_665_497_088),
                "d.custom1" => Value::from(""),
                "d.directory" => Value::from("/downloads/temp"),
                "d.complete" => Value::Int(0),
                "d.ratio" => Value::Int(250),
                "d.creation_date" => Value::Int(100),
                "d.timestamp.finished" => Value::Int(0),
                "d.timestamp.started" => Value::Int(300),
                other => panic!("unexpected method {other}"),
            })
        });

    let client = RTorrentClient::with_client(mock);
    let torrent = client.torrent("HASH1").await.unwrap();

    assert_eq!(torrent.hash, "HASH1");
    assert_eq!(torrent.name, "ubuntu.iso");
    assert_eq!(torrent.size, 5_665_497_088);
    assert_eq!(torrent.label, "");
    assert_eq!(torrent.path, "/downloads/temp");
    assert!(!torrent.completed);
    assert_eq!(torrent.ratio, 0.25);
    assert_eq!(torrent.created, 100);
    assert_eq!(torrent.finished, 0);
    assert_eq!(torrent.started, 300);
}

#[tokio::test]
async fn test_get_torrent_unknown_hash() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call().times(1).returning(|_, _| {
        Err(XmlRpcError::RemoteFault {
            code: -501,
            message: "Could not find info-hash.".to_string(),
        })
    });

    let client = RTorrentClient::with_client(mock);
    match client.torrent("MISSING").await.unwrap_err() {
        RTorrentError::Fault { method, code, .. } => {
            assert_eq!(method, "d.name");
            assert_eq!(code, -501);
        }
        other => panic!("Expected Fault, got {other:?}"),
    }
}

#[tokio::test]
async fn test_files() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call()
        .withf(|method, args| {
            method == "f.multicall"
                && *args
                    == vec![
                        Value::from("HASH1"),
                        Value::Int(0),
                        Value::from("f.path="),
                        Value::from("f.size_bytes="),
                    ]
        })
        .returning(|_, _| {
            Ok(Value::Array(vec![
                make_file_row("disc1/a.iso", 100),
                make_file_row("disc2/b.iso", 200),
            ]))
        });

    let client = RTorrentClient::with_client(mock);
    let files = client.files(&torrent("HASH1")).await.unwrap();

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].path, "disc1/a.iso");
    assert_eq!(files[0].size, 100);
    assert_eq!(files[1].path, "disc2/b.iso");
    assert_eq!(files[1].size, 200);
}

#[tokio::test]
async fn test_set_label() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call()
        .withf(|method, args| {
            method == "d.custom1.set" && *args == vec![Value::from("HASH1"), Value::from("TestLabel")]
        })
        .times(1)
        .returning(|_, _| Ok(Value::from("TestLabel")));

    let client = RTorrentClient::with_client(mock);
    assert!(client.set_label(&torrent("HASH1"), "TestLabel").await.is_ok());
}

#[tokio::test]
async fn test_status() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call().times(6).returning(|method, _| {
        Ok(match method {
            "d.complete" => Value::Int(1),
            "d.completed_bytes" => Value::Long(4096),
            "d.down.rate" => Value::Int(10),
            "d.up.rate" => Value::Int(20),
            "d.ratio" => Value::Int(2000),
            "d.size_bytes" => Value::from("4096"),
            other => panic!("unexpected method {other}"),
        })
    });

    let client = RTorrentClient::with_client(mock);
    let status = client.status(&torrent("HASH1")).await.unwrap();

    assert!(status.completed);
    assert_eq!(status.completed_bytes, 4096);
    assert_eq!(status.down_rate, 10);
    assert_eq!(status.up_rate, 20);
    assert_eq!(status.ratio, 2.0);
    assert_eq!(status.size, 4096);
}

#[tokio::test]
async fn test_item_commands() {
    let t = torrent("HASH1");
    for expected in [
        "d.erase", "d.start", "d.stop", "d.close", "d.open", "d.pause", "d.resume",
    ] {
        let mut mock = MockXmlRpcOps::new();
        mock.expect_call()
            .withf(move |method, args| method == expected && *args == vec![Value::from("HASH1")])
            .times(1)
            .returning(|_, _| Ok(Value::Int(0)));

        let client = RTorrentClient::with_client(mock);
        let result = match expected {
            "d.erase" => client.delete(&t).await,
            "d.start" => client.start(&t).await,
            "d.stop" => client.stop(&t).await,
            "d.close" => client.close(&t).await,
            "d.open" => client.open(&t).await,
            "d.pause" => client.pause(&t).await,
            "d.resume" => client.resume(&t).await,
            _ => unreachable!(),
        };
        assert!(result.is_ok(), "{expected} failed: {result:?}");
    }
}

#[tokio::test]
async fn test_is_active_is_open_state() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call().returning(|method, _| {
        Ok(match method {
            "d.is_active" => Value::Int(1),
            "d.is_open" => Value::Int(0),
            "d.state" => Value::from("1"),
            other => panic!("unexpected method {other}"),
        })
    });

    let client = RTorrentClient::with_client(mock);
    let t = torrent("HASH1");
    assert!(client.is_active(&t).await.unwrap());
    assert!(!client.is_open(&t).await.unwrap());
    assert_eq!(client.state(&t).await.unwrap(), 1);
}

#[tokio::test]
async fn test_stop_network_error() {
    let mut mock = MockXmlRpcOps::new();

    mock.expect_call()
        .returning(|_, _| Err(XmlRpcError::Network("connection refused".to_string())));

    let client = RTorrentClient::with_client(mock);
    match client.stop(&torrent("HASH1")).await.unwrap_err() {
        RTorrentError::Network(msg) => assert_eq!(msg, "connection refused"),
        other => panic!("Expected Network, got {other:?}"),
    }
}

#[test]
fn test_map_client_error() {
    assert_eq!(
        map_client_error("d.start", XmlRpcError::Unauthorized),
        RTorrentError::Unauthorized
    );
    assert_eq!(
        map_client_error("d.start", XmlRpcError::Http(502)),
        RTorrentError::Network("HTTP status 502".to_string())
    );
    assert!(matches!(
        map_client_error("", XmlRpcError::InvalidUrl("bad".to_string())),
        RTorrentError::Config(_)
    ));
    assert_eq!(
        map_client_error("d.start", XmlRpcError::IncompleteInput),
        RTorrentError::UnexpectedResponse {
            method: "d.start".to_string(),
            reason: "incomplete input: document ended unexpectedly".to_string(),
        }
    );
    match map_client_error(
        "d.name",
        XmlRpcError::TypeMismatch {
            expected: ValueKind::String,
            actual: ValueKind::Int,
        },
    ) {
        RTorrentError::UnexpectedResponse { method, reason } => {
            assert_eq!(method, "d.name");
            assert_eq!(reason, "type mismatch: expected string, found i4");
        }
        other => panic!("Expected UnexpectedResponse, got {other:?}"),
    }
}

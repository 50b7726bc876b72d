//! Session tests - drive `run_session` over an in-memory duplex

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use pipeworks::adapter::{run_session, Session};
use pipeworks::core::{GameConfig, Phase};

async fn read_json_line<R>(lines: &mut tokio::io::Lines<R>) -> serde_json::Value
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let line = tokio::time::timeout(Duration::from_secs(5), lines.next_line())
        .await
        .expect("timeout waiting for line")
        .expect("io error")
        .expect("expected line");
    serde_json::from_str(&line).expect("invalid json")
}

/// Skip pushed events until a message of `kind` shows up
async fn read_until<R>(lines: &mut tokio::io::Lines<R>, kind: &str) -> serde_json::Value
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    loop {
        let v = read_json_line(lines).await;
        if v["type"] == kind {
            return v;
        }
    }
}

fn quick_config() -> GameConfig {
    GameConfig {
        grid_columns: 5,
        grid_rows: 4,
        countdown_secs: 1,
        flow_step_ms: 10,
        ..GameConfig::default()
    }
}

#[tokio::test]
async fn test_session_plays_round_to_completion() {
    let (client, server) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server);
    let (client_read, mut client_write) = tokio::io::split(client);

    let session = Session::new(quick_config(), 11).unwrap();
    let handle = tokio::spawn(run_session(BufReader::new(server_read), server_write, session, 5));
    let mut lines = BufReader::new(client_read).lines();

    client_write
        .write_all(b"{\"type\":\"hello\",\"seq\":1,\"client\":{\"name\":\"test\",\"version\":\"1.0.0\"}}\n")
        .await
        .unwrap();
    let welcome = read_until(&mut lines, "welcome").await;
    assert_eq!(welcome["seq"], 1);
    assert_eq!(welcome["columns"], 5);
    assert_eq!(welcome["rows"], 4);

    let obs = read_until(&mut lines, "observation").await;
    assert_eq!(obs["phase"], "placing");
    assert_eq!(obs["tiles"].as_array().unwrap().len(), 2);
    assert_eq!(obs["queue"].as_array().unwrap().len(), 5);

    // Keep reading until the flow is over; the countdown ends it on its own.
    let finished = loop {
        let v = read_json_line(&mut lines).await;
        if v["type"] == "event" && v["event"] == "flow_finished" {
            break v;
        }
    };
    assert!(finished["score"].is_u64());
    assert!(finished["end"]["kind"].is_string());

    client_write.shutdown().await.unwrap();
    drop(client_write);
    let session = handle.await.unwrap().unwrap();
    assert_eq!(session.round().phase(), Phase::Finished);
}

#[tokio::test]
async fn test_session_reports_errors_with_seq() {
    let (client, server) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server);
    let (client_read, mut client_write) = tokio::io::split(client);

    let config = GameConfig {
        countdown_secs: 60,
        ..quick_config()
    };
    let session = Session::new(config, 5).unwrap();
    let handle = tokio::spawn(run_session(BufReader::new(server_read), server_write, session, 5));
    let mut lines = BufReader::new(client_read).lines();

    client_write
        .write_all(b"{\"type\":\"observe\",\"seq\":1}\n")
        .await
        .unwrap();
    let err = read_until(&mut lines, "error").await;
    assert_eq!(err["code"], "handshake_required");
    assert_eq!(err["seq"], 1);

    client_write
        .write_all(b"{\"type\":\"hello\",\"seq\":2}\n{\"seq\":3,\"type\":\n")
        .await
        .unwrap();
    read_until(&mut lines, "welcome").await;
    let err = read_until(&mut lines, "error").await;
    assert_eq!(err["code"], "invalid_json");
    assert_eq!(err["seq"], 3);

    client_write
        .write_all(b"{\"type\":\"place\",\"seq\":4,\"col\":9,\"row\":0}\n")
        .await
        .unwrap();
    let err = read_until(&mut lines, "error").await;
    assert_eq!(err["code"], "out_of_bounds");
    assert_eq!(err["seq"], 4);

    client_write.shutdown().await.unwrap();
    drop(client_write);
    let session = handle.await.unwrap().unwrap();
    assert_eq!(session.round().grid().len(), 2);
}

#[tokio::test]
async fn test_session_ends_on_eof() {
    let (client, server) = tokio::io::duplex(1024);
    let (server_read, server_write) = tokio::io::split(server);
    drop(client);

    let session = Session::new(quick_config(), 1).unwrap();
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        run_session(BufReader::new(server_read), server_write, session, 5),
    )
    .await
    .expect("session should stop when input closes");
    assert!(result.is_ok());
}

use std::sync::Arc;
use std::time::Duration;

use bkview::config::AppConfig;
use bkview::context::AppContext;
use bkview::rpc::{ClientError, RpcClient, RpcServer};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

async fn start_server() -> (Arc<RpcServer>, RpcClient) {
    let config = AppConfig {
        rpc_bind: "127.0.0.1:0".parse().unwrap(),
        ..AppConfig::default()
    };
    let ctx = AppContext::new(config).expect("valid config");
    let server = Arc::new(
        RpcServer::bind(ctx.clone(), ctx.config.rpc_bind)
            .await
            .expect("bind"),
    );
    let client = RpcClient::new(server.local_addr().expect("local addr"));

    let running = server.clone();
    tokio::spawn(async move { running.start().await });

    (server, client)
}

#[tokio::test]
async fn test_daemon_status() {
    let (server, client) = start_server().await;

    let status: Value = timeout(Duration::from_secs(1), client.call("daemon.status", None))
        .await
        .expect("timeout waiting for response")
        .expect("call failed");

    assert_eq!(status["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(status["file_size_base"], "decimal");

    server.shutdown();
}

#[tokio::test]
async fn test_render_jobs_over_rpc() {
    let (server, client) = start_server().await;

    let params = json!({"jsonrpc": "2.0", "id": null, "result": {"jobs": [
        {"jobid": 7, "name": "catalog", "client": "dir-fd", "level": "F",
         "type": "B", "jobstatus": "E", "jobbytes": 0}
    ]}});

    let views: Value = timeout(
        Duration::from_secs(1),
        client.call("jobs.render", Some(params)),
    )
    .await
    .expect("timeout waiting for response")
    .expect("call failed");

    assert_eq!(views[0]["jobid"], "7");
    assert_eq!(views[0]["level"], "Full");
    assert_eq!(views[0]["status"]["category"], "Failure");
    assert_eq!(views[0]["actions"], json!(["Details", "Rerun"]));
    assert_eq!(views[0]["bytes"], "0.00 B");

    server.shutdown();
}

#[tokio::test]
async fn test_rpc_error_reaches_client() {
    let (server, client) = start_server().await;

    let result: Result<Value, ClientError> = timeout(
        Duration::from_secs(1),
        client.call("mode.decode", Some(json!({"mode": -1}))),
    )
    .await
    .expect("timeout waiting for response");

    match result {
        Err(ClientError::Rpc(error)) => assert_eq!(error.code, -32602),
        other => panic!("expected invalid params, got {:?}", other),
    }

    server.shutdown();
}

#[tokio::test]
async fn test_malformed_line_gets_parse_error() {
    let (server, client) = start_server().await;
    // Make sure the listener is accepting before using a raw socket.
    let _: Value = client.call("daemon.status", None).await.expect("call failed");

    let addr = server.local_addr().expect("local addr");
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream.write_all(b"{not json\n").await.expect("write");

    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    timeout(Duration::from_secs(1), reader.read_line(&mut line))
        .await
        .expect("timeout waiting for response")
        .expect("read");

    let response: Value = serde_json::from_str(&line).expect("response is JSON");
    assert_eq!(response["error"]["code"], -32700);
    assert_eq!(response["id"], Value::Null);

    server.shutdown();
}

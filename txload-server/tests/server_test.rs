//! Transaction server tests over loopback sockets

use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use txload_config::ServerConfig;
use txload_core::TransactionId;
use txload_resilience::ShutdownCoordinator;
use txload_server::TransactionServer;

async fn start_server(listeners: usize) -> (Arc<ShutdownCoordinator>, txload_server::ServerHandle) {
    let coordinator = Arc::new(ShutdownCoordinator::with_timeouts(
        Duration::from_secs(2),
        Duration::from_millis(200),
    ));
    let server = TransactionServer::new(ServerConfig::default(), coordinator.clone());

    let mut bound = Vec::new();
    for _ in 0..listeners {
        bound.push(TcpListener::bind("127.0.0.1:0").await.unwrap());
    }
    let handle = server.start_on(bound);
    (coordinator, handle)
}

async fn request(stream: &mut TcpStream, payload: &str) -> String {
    stream.write_all(payload.as_bytes()).await.unwrap();
    let mut buf = [0u8; 1024];
    let n = stream.read(&mut buf).await.unwrap();
    String::from_utf8(buf[..n].to_vec()).unwrap()
}

#[tokio::test]
async fn test_reply_names_the_serving_port() {
    let (coordinator, handle) = start_server(2).await;

    for bound in handle.bound() {
        let mut stream = TcpStream::connect(bound.local_addr).await.unwrap();
        let reply = request(&mut stream, r#"{"name": "user_1", "age": 21}"#).await;

        let id: TransactionId = reply.parse().unwrap();
        assert_eq!(id.port(), bound.port);
        assert_eq!(reply, format!("tx_{}_{}", bound.port, id.timestamp()));
    }

    coordinator.shutdown().await.unwrap();
    handle.join().await;
}

#[tokio::test]
async fn test_successive_requests_get_distinct_ids() {
    let (coordinator, handle) = start_server(1).await;
    let addr = handle.local_addrs()[0];
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let first = request(&mut stream, "a").await;
    let second = request(&mut stream, "b").await;
    assert_ne!(first, second);

    let first: TransactionId = first.parse().unwrap();
    let second: TransactionId = second.parse().unwrap();
    assert!(second.timestamp() > first.timestamp());

    drop(stream);
    coordinator.shutdown().await.unwrap();
    handle.join().await;
}

#[tokio::test]
async fn test_shutdown_stops_accept_loop() {
    let (coordinator, handle) = start_server(1).await;
    let addr = handle.local_addrs()[0];

    // An open connection must not hold the shutdown up
    let mut stream = TcpStream::connect(addr).await.unwrap();
    request(&mut stream, "x").await;

    coordinator.shutdown().await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle.join())
        .await
        .expect("accept loop did not stop");
    assert_eq!(coordinator.active_task_count(), 0);

    // The listener is gone
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_stats_count_connections_and_replies() {
    let (coordinator, handle) = start_server(1).await;
    let addr = handle.local_addrs()[0];

    for _ in 0..2 {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        request(&mut stream, "payload").await;
    }

    // Counters are bumped after the reply is written
    let mut stats = handle.stats();
    for _ in 0..50 {
        if stats.replies == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        stats = handle.stats();
    }
    assert_eq!(stats.connections, 2);
    assert_eq!(stats.replies, 2);

    coordinator.shutdown().await.unwrap();
    handle.join().await;
}

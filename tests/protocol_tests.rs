//! Integration Tests for the Text Protocol
//!
//! Drives the TCP listener end to end with real sockets, plus scripted
//! conversations against the connection handler.

use std::time::Duration;

use snapcache::server::{handle_connection, serve};
use snapcache::SharedCache;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;

const DAY: Duration = Duration::from_secs(86_400);

// == Helper Functions ==

struct TestServer {
    addr: std::net::SocketAddr,
    cache: SharedCache,
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

async fn start_server(max_entries: usize) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cache = SharedCache::with_capacity(max_entries);
    let (stop_tx, mut stop_rx) = watch::channel(false);

    let handle = tokio::spawn(serve(listener, cache.clone(), DAY, async move {
        let _ = stop_rx.changed().await;
    }));

    TestServer {
        addr,
        cache,
        stop_tx,
        handle,
    }
}

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, writer) = stream.into_split();
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    async fn send(&mut self, line: &str) -> String {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .await
            .unwrap();
        let mut reply = String::new();
        self.reader.read_line(&mut reply).await.unwrap();
        reply.trim_end_matches('\n').to_string()
    }
}

// == Command Tests ==

#[tokio::test]
async fn test_set_get_delete_over_tcp() {
    let server = start_server(100).await;
    let mut client = Client::connect(server.addr).await;

    assert_eq!(client.send("SET user alice").await, "OK");
    assert_eq!(client.send("GET user").await, "alice");
    assert_eq!(client.send("DELETE user").await, "1");
    assert_eq!(client.send("DELETE user").await, "0");
    assert_eq!(client.send("GET user").await, "Key not found");
}

#[tokio::test]
async fn test_errors_keep_connection_open() {
    let server = start_server(100).await;
    let mut client = Client::connect(server.addr).await;

    assert_eq!(
        client.send("SET onlykey").await,
        "Error: SET format is 'SET key value [duration_seconds]'"
    );
    assert_eq!(
        client.send("SET k v soon").await,
        "Error: Invalid duration, must be a number in seconds"
    );
    assert_eq!(client.send("GET").await, "Error: GET format is 'GET key'");
    assert_eq!(
        client.send("DELETE a b").await,
        "Error: DELETE format is 'DELETE key'"
    );
    assert_eq!(
        client.send("FLUSH").await,
        "Error: Unknown command 'FLUSH'"
    );

    // Still usable afterwards
    assert_eq!(client.send("SET k v").await, "OK");
    assert_eq!(client.send("GET k").await, "v");
}

#[tokio::test]
async fn test_verbs_are_case_insensitive() {
    let server = start_server(100).await;
    let mut client = Client::connect(server.addr).await;

    assert_eq!(client.send("set k v").await, "OK");
    assert_eq!(client.send("Get k").await, "v");
    assert_eq!(client.send("delete k").await, "1");
}

#[tokio::test]
async fn test_expiry_with_explicit_seconds() {
    let server = start_server(100).await;
    let mut client = Client::connect(server.addr).await;

    assert_eq!(client.send("SET short v 1").await, "OK");
    assert_eq!(client.send("SET forever v 0").await, "OK");
    assert_eq!(client.send("GET short").await, "v");

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert_eq!(client.send("GET short").await, "Key not found");
    assert_eq!(client.send("GET forever").await, "v");
}

#[tokio::test]
async fn test_read_protects_key_from_eviction() {
    let server = start_server(2).await;
    let mut client = Client::connect(server.addr).await;

    assert_eq!(client.send("SET a 1").await, "OK");
    assert_eq!(client.send("SET b 2").await, "OK");
    assert_eq!(client.send("GET a").await, "1");
    assert_eq!(client.send("SET c 3").await, "OK");

    assert_eq!(client.send("GET a").await, "1");
    assert_eq!(client.send("GET b").await, "Key not found");
    assert_eq!(client.send("GET c").await, "3");
    assert_eq!(server.cache.stats().await.evictions, 1);
}

#[tokio::test]
async fn test_clients_share_one_cache() {
    let server = start_server(100).await;
    let mut writer = Client::connect(server.addr).await;
    let mut reader = Client::connect(server.addr).await;

    assert_eq!(writer.send("SET shared hello").await, "OK");
    assert_eq!(reader.send("GET shared").await, "hello");
    assert_eq!(reader.send("DELETE shared").await, "1");
    assert_eq!(writer.send("GET shared").await, "Key not found");
}

// == Shutdown Tests ==

#[tokio::test]
async fn test_listener_stops_on_shutdown() {
    let server = start_server(100).await;
    let mut client = Client::connect(server.addr).await;
    assert_eq!(client.send("SET k v").await, "OK");

    server.stop_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), server.handle)
        .await
        .expect("listener should stop")
        .unwrap();

    // Connections that were already open keep working
    assert_eq!(client.send("GET k").await, "v");
}

// == Scripted Conversations ==

#[tokio::test]
async fn test_scripted_conversation_skips_blank_lines() {
    let stream = tokio_test::io::Builder::new()
        .read(b"SET a 1\n")
        .write(b"OK\n")
        .read(b"\n   \n")
        .read(b"GET a\n")
        .write(b"1\n")
        .build();

    handle_connection(stream, SharedCache::with_capacity(10), DAY)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_scripted_conversation_drops_unterminated_line() {
    let cache = SharedCache::with_capacity(10);
    let stream = tokio_test::io::Builder::new()
        .read(b"SET a 1\n")
        .write(b"OK\n")
        .read(b"SET b 2")
        .build();

    handle_connection(stream, cache.clone(), DAY).await.unwrap();

    assert_eq!(cache.get("a").await, Some(b"1".to_vec()));
    assert_eq!(cache.get("b").await, None);
}

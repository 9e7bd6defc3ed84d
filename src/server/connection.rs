//! Connection Handling
//!
//! Per-client loop: read a line, run it against the cache, write the reply.
//! Protocol errors are answered on the same connection, which stays open.

use std::io;
use std::time::Duration;

use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tracing::debug;

use crate::cache::SharedCache;
use crate::server::command::{Command, CommandError, Reply};

/// Runs one command against the cache.
///
/// `default_ttl` applies to `SET` without an explicit duration.
pub async fn execute(cache: &SharedCache, command: Command, default_ttl: Duration) -> Reply {
    match command {
        Command::Set { key, value, ttl } => {
            cache.set(key, value, ttl.unwrap_or(default_ttl)).await;
            Reply::Ok
        }
        Command::Get { key } => match cache.get(&key).await {
            Some(value) => Reply::Value(value),
            None => Reply::NotFound,
        },
        Command::Delete { key } => Reply::Deleted(cache.delete(&key).await),
    }
}

/// Longest accepted line, newline included. Longer lines are discarded
/// and answered with an error.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Serves one client until it disconnects or the transport fails.
///
/// A final line without a trailing newline is discarded, as the peer is
/// already gone by then.
pub async fn handle_connection<S>(
    stream: S,
    cache: SharedCache,
    default_ttl: Duration,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = (&mut reader)
            .take(MAX_LINE_BYTES as u64)
            .read_until(b'\n', &mut line)
            .await?;
        if read == 0 {
            return Ok(());
        }

        let reply = if line.last() == Some(&b'\n') {
            match Command::parse(&line) {
                Ok(Some(command)) => execute(&cache, command, default_ttl).await,
                Ok(None) => continue,
                Err(err) => {
                    debug!(error = %err, "Rejected command");
                    Reply::from(err)
                }
            }
        } else if line.len() < MAX_LINE_BYTES {
            return Ok(());
        } else {
            debug!(limit = MAX_LINE_BYTES, "Discarding oversized line");
            if !discard_line(&mut reader).await? {
                return Ok(());
            }
            Reply::from(CommandError::LineTooLong)
        };

        writer.write_all(&reply.to_bytes()).await?;
        writer.flush().await?;
    }
}

/// Skips input up to and including the next newline. Returns false on EOF.
async fn discard_line<R>(reader: &mut R) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(false);
        }
        match buf.iter().position(|&b| b == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(true);
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    const DAY: Duration = Duration::from_secs(86_400);

    async fn converse_bytes(cache: SharedCache, input: &[u8]) -> Vec<u8> {
        let (client, server) = duplex(4096);
        let handle = tokio::spawn(handle_connection(server, cache, DAY));
        let (mut client_rx, mut client_tx) = tokio::io::split(client);

        let input = input.to_vec();
        let sender = tokio::spawn(async move {
            client_tx.write_all(&input).await.unwrap();
            client_tx.shutdown().await.unwrap();
        });

        let mut output = Vec::new();
        client_rx.read_to_end(&mut output).await.unwrap();
        sender.await.unwrap();
        handle.await.unwrap().unwrap();
        output
    }

    async fn converse(cache: SharedCache, input: &str) -> String {
        String::from_utf8(converse_bytes(cache, input.as_bytes()).await).unwrap()
    }

    #[tokio::test]
    async fn test_execute_set_uses_default_ttl() {
        let cache = SharedCache::with_capacity(10);

        let reply = execute(
            &cache,
            Command::Set {
                key: "k".into(),
                value: b"v".to_vec(),
                ttl: None,
            },
            DAY,
        )
        .await;

        assert_eq!(reply, Reply::Ok);
        let store = cache.lock().await;
        assert!(store.peek("k").and_then(|e| e.expires_at).is_some());
    }

    #[tokio::test]
    async fn test_execute_set_zero_ttl_never_expires() {
        let cache = SharedCache::with_capacity(10);

        execute(
            &cache,
            Command::Set {
                key: "k".into(),
                value: b"v".to_vec(),
                ttl: Some(Duration::ZERO),
            },
            DAY,
        )
        .await;

        let store = cache.lock().await;
        assert_eq!(store.peek("k").and_then(|e| e.expires_at), None);
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let cache = SharedCache::with_capacity(10);

        let output = converse(
            cache.clone(),
            "SET greeting hello\nGET greeting\nDELETE greeting\nDELETE greeting\nGET greeting\n",
        )
        .await;

        assert_eq!(output, "OK\nhello\n1\n0\nKey not found\n");
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_errors_do_not_close_connection() {
        let cache = SharedCache::with_capacity(10);

        let output = converse(cache, "PING\nSET k\nSET k v x\n\nset k v 10\nget k\n").await;

        assert_eq!(
            output,
            "Error: Unknown command 'PING'\n\
             Error: SET format is 'SET key value [duration_seconds]'\n\
             Error: Invalid duration, must be a number in seconds\n\
             OK\n\
             v\n"
        );
    }

    #[tokio::test]
    async fn test_unterminated_last_line_is_dropped() {
        let cache = SharedCache::with_capacity(10);

        let output = converse(cache.clone(), "SET a 1\nSET b 2").await;

        assert_eq!(output, "OK\n");
        assert_eq!(cache.get("b").await, None);
    }

    #[tokio::test]
    async fn test_crlf_lines_are_accepted() {
        let cache = SharedCache::with_capacity(10);

        let output = converse(cache, "SET k v\r\nGET k\r\n").await;

        assert_eq!(output, "OK\nv\n");
    }

    #[tokio::test]
    async fn test_binary_value_is_stored_verbatim() {
        let cache = SharedCache::with_capacity(10);

        let output = converse_bytes(cache.clone(), b"SET k \xff\xfe\nGET k\n").await;

        assert_eq!(output, b"OK\n\xff\xfe\n");
        assert_eq!(cache.get("k").await, Some(vec![0xff, 0xfe]));
    }

    #[tokio::test]
    async fn test_oversized_line_is_rejected_and_connection_survives() {
        let cache = SharedCache::with_capacity(10);
        let mut input = b"SET big ".to_vec();
        input.resize(MAX_LINE_BYTES + 100, b'x');
        input.extend_from_slice(b"\nSET k v\nGET k\n");

        let output = converse(cache.clone(), std::str::from_utf8(&input).unwrap()).await;

        assert_eq!(output, "Error: Line too long\nOK\nv\n");
        assert_eq!(cache.get("big").await, None);
    }

    #[tokio::test]
    async fn test_line_just_under_limit_is_accepted() {
        let cache = SharedCache::with_capacity(10);
        let mut input = b"SET big ".to_vec();
        input.resize(MAX_LINE_BYTES - 1, b'x');
        input.push(b'\n');

        let output = converse_bytes(cache.clone(), &input).await;

        assert_eq!(output, b"OK\n");
        let stored = cache.get("big").await.unwrap();
        assert_eq!(stored.len(), MAX_LINE_BYTES - 1 - b"SET big ".len());
    }
}

//! Helpers for tests that need HTTP behavior wiremock cannot produce.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serves `response` verbatim to the first connection, then closes it.
///
/// Used to simulate a server that promises more bytes than it sends.
pub async fn serve_raw_once(response: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind raw test server");
    let addr = listener.local_addr().expect("raw test server address");

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
        let _ = socket.write_all(&response).await;
        let _ = socket.flush().await;
    });

    format!("http://{}", addr)
}

/// Response headers declaring `declared` bytes followed by a shorter `body`.
pub fn truncated_response(declared: usize, body: &[u8]) -> Vec<u8> {
    let mut response = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        declared
    )
    .into_bytes();
    response.extend_from_slice(body);
    response
}

/// A base URL on which nothing is listening.
pub fn refused_uri() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe port");
    let addr = listener.local_addr().expect("probe port address");
    drop(listener);
    format!("http://{}", addr)
}

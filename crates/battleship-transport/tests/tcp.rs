//! Integration tests for the TCP line transport.
//!
//! These spin up a real listener on an OS-assigned port and talk to it
//! with a plain `tokio::net::TcpStream`, so the framing is checked byte
//! for byte.

use battleship_transport::{
    Connection, MAX_LINE_BYTES, TcpConnection, TcpTransport, Transport,
    TransportError,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Binds a transport, connects one client, and returns both ends.
async fn connected_pair() -> (TcpTransport, TcpConnection, TcpStream) {
    let mut transport = TcpTransport::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = transport.local_addr().expect("should have local addr");

    let client = TcpStream::connect(addr).await.expect("should connect");
    let server_conn = transport.accept().await.expect("should accept");
    (transport, server_conn, client)
}

#[tokio::test]
async fn test_send_line_appends_newline() {
    let (_transport, conn, client) = connected_pair().await;

    conn.send_line("WELCOME Battleship TCP").await.expect("send");

    let mut lines = BufReader::new(client).lines();
    let line = lines.next_line().await.expect("read").expect("line");
    assert_eq!(line, "WELCOME Battleship TCP");
}

#[tokio::test]
async fn test_recv_line_strips_lf_and_crlf() {
    let (_transport, conn, mut client) = connected_pair().await;

    client.write_all(b"CREATE_PLAYER\nLIST_GAMES\r\n").await.unwrap();

    assert_eq!(conn.recv_line().await.unwrap().as_deref(), Some("CREATE_PLAYER"));
    assert_eq!(conn.recv_line().await.unwrap().as_deref(), Some("LIST_GAMES"));
}

#[tokio::test]
async fn test_recv_line_clean_close_returns_none() {
    let (_transport, conn, client) = connected_pair().await;

    drop(client);

    assert!(conn.recv_line().await.unwrap().is_none());
}

#[tokio::test]
async fn test_recv_line_unterminated_tail_is_returned() {
    let (_transport, conn, mut client) = connected_pair().await;

    client.write_all(b"QUIT").await.unwrap();
    client.shutdown().await.unwrap();

    assert_eq!(conn.recv_line().await.unwrap().as_deref(), Some("QUIT"));
    assert!(conn.recv_line().await.unwrap().is_none());
}

#[tokio::test]
async fn test_recv_line_oversized_line_is_skipped_and_next_line_read() {
    let (_transport, conn, mut client) = connected_pair().await;

    let mut huge = vec![b'A'; 3 * MAX_LINE_BYTES];
    huge.extend_from_slice(b"\nHELP\n");
    client.write_all(&huge).await.unwrap();

    let result = conn.recv_line().await;
    assert!(matches!(result, Err(TransportError::LineTooLong(_))));
    assert_eq!(conn.recv_line().await.unwrap().as_deref(), Some("HELP"));
}

#[tokio::test]
async fn test_recv_line_line_at_limit_is_accepted() {
    let (_transport, conn, mut client) = connected_pair().await;

    let mut line = vec![b'B'; MAX_LINE_BYTES];
    line.extend_from_slice(b"\r\n");
    client.write_all(&line).await.unwrap();

    let received = conn.recv_line().await.unwrap().unwrap();
    assert_eq!(received.len(), MAX_LINE_BYTES);
}

#[tokio::test]
async fn test_close_ends_client_stream() {
    let (_transport, conn, client) = connected_pair().await;

    conn.send_line("BYE").await.unwrap();
    conn.close().await.expect("close");

    let mut lines = BufReader::new(client).lines();
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("BYE"));
    assert!(lines.next_line().await.unwrap().is_none());
}

#[tokio::test]
async fn test_accept_assigns_increasing_ids() {
    let mut transport = TcpTransport::bind("127.0.0.1:0").await.unwrap();
    let addr = transport.local_addr().unwrap();

    let _c1 = TcpStream::connect(addr).await.unwrap();
    let first = transport.accept().await.unwrap();
    let _c2 = TcpStream::connect(addr).await.unwrap();
    let second = transport.accept().await.unwrap();

    assert!(second.id().into_inner() > first.id().into_inner());
    assert!(first.peer_addr().ip().is_loopback());
}

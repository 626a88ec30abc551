//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on an OS-assigned port and talk to it with
//! a `tokio-tungstenite` client, so the bytes really cross a socket.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::Arc;
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use parlor_transport::{Connection, Handshake, Transport, WebSocketTransport};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds on `127.0.0.1:0`, connects one client and returns both ends.
    async fn connected_pair()
    -> (parlor_transport::WebSocketConnection, ClientWs) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("should have local addr");

        let server_handle = tokio::spawn(async move {
            let pending = transport.accept().await.expect("should accept");
            pending.complete().await.expect("handshake should succeed")
        });

        let (client_ws, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}"))
                .await
                .expect("client should connect");
        let server_conn = server_handle.await.expect("task should complete");
        (server_conn, client_ws)
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (server_conn, mut client_ws) = connected_pair().await;

        // --- Server sends, client receives ---
        server_conn
            .send(br#"{"event":"startGame"}"#)
            .await
            .expect("send should succeed");

        let msg = client_ws.next().await.unwrap().unwrap();
        assert!(msg.is_text(), "UTF-8 payloads go out as text frames");
        assert_eq!(msg.into_data().as_ref(), br#"{"event":"startGame"}"#);

        // --- Client sends, server receives ---
        client_ws
            .send(Message::Text("hello from client".to_string().into()))
            .await
            .unwrap();

        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, b"hello from client");

        // --- Clean close ---
        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_binary_frames_are_accepted() {
        let (server_conn, mut client_ws) = connected_pair().await;

        client_ws
            .send(Message::Binary(vec![1, 2, 3].into()))
            .await
            .unwrap();

        let received = server_conn.recv().await.unwrap().unwrap();
        assert_eq!(received, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_websocket_send_is_not_blocked_by_pending_recv() {
        let (server_conn, mut client_ws) = connected_pair().await;
        let server_conn = Arc::new(server_conn);

        // Park a reader on the connection; the client never writes.
        let reader = Arc::clone(&server_conn);
        let pending = tokio::spawn(async move { reader.recv().await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(
            Duration::from_secs(1),
            server_conn.send(b"while reading"),
        )
        .await
        .expect("send must not wait for the reader")
        .expect("send should succeed");

        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"while reading");

        pending.abort();
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (server_conn, mut client_ws) = connected_pair().await;

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_websocket_connection_ids_are_unique() {
        let (first, _c1) = connected_pair().await;
        let (second, _c2) = connected_pair().await;
        assert_ne!(first.id(), second.id());
    }

    #[tokio::test]
    async fn test_websocket_accept_does_not_wait_for_handshake() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("should have local addr");

        // A peer that opens TCP and never sends the upgrade request.
        let _idle = tokio::net::TcpStream::connect(addr).await.unwrap();
        let stalled = tokio::time::timeout(Duration::from_secs(1), transport.accept())
            .await
            .expect("accept must not wait on the peer")
            .expect("should accept");

        // The next peer is still served while the first one sits idle.
        let client = tokio::spawn(async move {
            tokio_tungstenite::connect_async(format!("ws://{addr}")).await
        });
        let pending = tokio::time::timeout(Duration::from_secs(1), transport.accept())
            .await
            .expect("second accept must not queue behind the idle peer")
            .expect("should accept");
        let id = pending.id();
        assert_ne!(id, stalled.id());

        let conn = pending.complete().await.expect("handshake should succeed");
        assert_eq!(conn.id(), id, "the id assigned on accept carries over");
        client.await.unwrap().expect("client should connect");

        // The idle peer's handshake just waits; callers bound it.
        let idle_upgrade =
            tokio::time::timeout(Duration::from_millis(100), stalled.complete()).await;
        assert!(idle_upgrade.is_err(), "idle handshake should still be pending");
    }
}

//! Integration tests for the WebSocket transport against a real client.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::Arc;
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use tabletop_transport::{Connection, Transport, WebSocketConnection, WebSocketTransport};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds on a random port, connects one client, and returns both ends.
    async fn connected_pair() -> (WebSocketConnection, ClientWs) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("should have addr");

        let server_handle =
            tokio::spawn(async move { transport.accept().await.expect("should accept") });

        let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        let server_conn = server_handle.await.expect("task should complete");
        (server_conn, client)
    }

    #[tokio::test]
    async fn test_websocket_send_and_receive() {
        let (server_conn, mut client) = connected_pair().await;
        assert!(server_conn.id().into_inner() > 0);

        server_conn
            .send(br#"{"hello":"client"}"#)
            .await
            .expect("send should succeed");
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_text(), "utf-8 payloads go out as text frames");
        assert_eq!(msg.into_data().as_ref(), br#"{"hello":"client"}"#);

        client
            .send(Message::Text("hello from client".to_string().into()))
            .await
            .unwrap();
        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, b"hello from client");

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_send_is_not_blocked_by_pending_recv() {
        let (server_conn, mut client) = connected_pair().await;
        let server_conn = Arc::new(server_conn);

        // Park a reader on the connection; the client sends nothing yet.
        let reader = {
            let conn = Arc::clone(&server_conn);
            tokio::spawn(async move { conn.recv().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(Duration::from_secs(1), server_conn.send(b"pushed"))
            .await
            .expect("send must not wait for the reader")
            .expect("send should succeed");
        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"pushed");

        client.send(Message::Text("late".to_string().into())).await.unwrap();
        let received = reader.await.unwrap().unwrap().unwrap();
        assert_eq!(received, b"late");
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (server_conn, mut client) = connected_pair().await;

        client.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }
}

//! One persistent connection to the game server.
//!
//! The [`Connection`] owns the socket. A single receive loop reads every
//! frame and either completes the caller waiting on its correlation ID or
//! hands it to the [`BroadcastRouter`]. Requests go out through the writer
//! task.
//!
//! ```text
//!              ┌────────────┐   correlation id   ┌──────────────┐
//! socket ────► │ FrameBuffer│ ──────────────────►│ PendingTable │──► caller
//!  (read)      └────────────┘        │           └──────────────┘
//!                                    │ 0 / 1
//!                                    ▼
//!                            ┌──────────────┐    ┌────────────┐
//!                            │ Broadcast-   │───►│ EventQueue │──► UI tick
//!                            │ Router       │    └────────────┘
//!                            └──────────────┘
//! ```

use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::broadcast::{event_queue, BroadcastRouter, CloseReason, EventQueue, Phase};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::pending::{PendingGuard, PendingTable};
use crate::protocol::{FrameBuffer, Opcode, ResponseFrame};
use crate::writer::{spawn_writer_task, OutboundFrame, WriterHandle};

/// Size of the socket read buffer.
const READ_BUFFER_SIZE: usize = 64 * 1024;

struct Shared {
    pending: Arc<PendingTable>,
    writer: WriterHandle,
    shutdown: watch::Sender<bool>,
    status: watch::Receiver<Option<CloseReason>>,
    phase: watch::Receiver<Phase>,
    request_timeout: Option<Duration>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}

/// Handle to a running connection. Cheap to clone.
///
/// Dropping the last handle shuts the connection down.
#[derive(Clone)]
pub struct Connection {
    shared: Arc<Shared>,
}

impl Connection {
    /// Start the receive loop and writer task over an already-open stream.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start<R, W>(reader: R, writer: W, config: &ClientConfig) -> (Connection, EventQueue)
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (writer, writer_task) = spawn_writer_task(writer, config.writer_channel_capacity);
        let (events, queue) = event_queue();
        let (router, phase) = BroadcastRouter::new(events);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (status_tx, status_rx) = watch::channel(None);
        let pending = Arc::new(PendingTable::new());

        let receive = ReceiveLoop {
            frames: FrameBuffer::with_max_payload(config.max_payload_size),
            pending: pending.clone(),
            router,
        };
        tokio::spawn(receive.run(reader, shutdown_rx, writer_task, status_tx));

        let shared = Shared {
            pending,
            writer,
            shutdown: shutdown_tx,
            status: status_rx,
            phase,
            request_timeout: config.request_timeout(),
        };

        (
            Connection {
                shared: Arc::new(shared),
            },
            queue,
        )
    }

    /// Send a request and wait for its response payload.
    pub async fn call(&self, opcode: Opcode, payload: Bytes) -> Result<Bytes> {
        self.call_until(opcode, payload, std::future::pending()).await
    }

    /// Like [`call`](Self::call), but gives up with `Cancelled` once `cancel`
    /// resolves.
    ///
    /// Giving up only stops waiting; the server may still act on the request.
    pub async fn call_until<F>(&self, opcode: Opcode, payload: Bytes, cancel: F) -> Result<Bytes>
    where
        F: Future<Output = ()>,
    {
        let pending = &self.shared.pending;
        let (id, rx) = pending.register(opcode)?;
        let _guard = PendingGuard::new(pending, id);

        self.shared
            .writer
            .send(OutboundFrame::request(opcode, id, payload))
            .await?;
        tracing::trace!(correlation_id = id, %opcode, "Request sent");

        let timeout = self.shared.request_timeout;
        let deadline = async move {
            match timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            response = rx => response.unwrap_or(Err(ClientError::ConnectionClosed)),
            _ = cancel => Err(ClientError::Cancelled { operation: opcode }),
            _ = deadline => Err(ClientError::Timeout { operation: opcode }),
        }
    }

    /// Ask the receive loop to stop. Pending calls fail with `ConnectionClosed`.
    pub fn shutdown(&self) {
        self.shared.shutdown.send_replace(true);
    }

    /// Wait until the connection has stopped and return why.
    pub async fn closed(&self) -> CloseReason {
        let mut status = self.shared.status.clone();
        let _ = status.wait_for(Option::is_some).await;
        let reason = status.borrow().clone();
        reason.unwrap_or(CloseReason::Requested)
    }

    pub fn is_closed(&self) -> bool {
        self.shared.status.borrow().is_some()
    }

    /// Current broadcast phase.
    pub fn phase(&self) -> Phase {
        *self.shared.phase.borrow()
    }

    /// Receiver notified on every phase change.
    pub fn phase_changes(&self) -> watch::Receiver<Phase> {
        self.shared.phase.clone()
    }

    /// Requests still waiting for a response.
    pub fn pending_count(&self) -> usize {
        self.shared.pending.len()
    }

    /// Request frames accepted by the writer but not yet flushed.
    pub fn queued_frames(&self) -> usize {
        self.shared.writer.pending_count()
    }

    /// Handle that does not keep the connection alive.
    pub fn downgrade(&self) -> WeakConnection {
        WeakConnection {
            shared: Arc::downgrade(&self.shared),
        }
    }
}

/// Non-owning [`Connection`] handle for background tasks.
#[derive(Clone)]
pub struct WeakConnection {
    shared: Weak<Shared>,
}

impl WeakConnection {
    /// `None` once every strong handle is gone.
    pub fn upgrade(&self) -> Option<Connection> {
        self.shared.upgrade().map(|shared| Connection { shared })
    }
}

/// State owned by the receive task.
struct ReceiveLoop {
    frames: FrameBuffer,
    pending: Arc<PendingTable>,
    router: BroadcastRouter,
}

impl ReceiveLoop {
    async fn run<R>(
        mut self,
        reader: R,
        shutdown: watch::Receiver<bool>,
        mut writer_task: JoinHandle<Result<()>>,
        status: watch::Sender<Option<CloseReason>>,
    ) where
        R: AsyncRead + Unpin,
    {
        let reason = self.read_until_closed(reader, shutdown, &mut writer_task).await;

        // Stop the writer so the write half closes with the read half.
        writer_task.abort();

        let failed = self.pending.fail_all();
        match &reason {
            CloseReason::Requested | CloseReason::PeerClosed => {
                tracing::debug!(%reason, failed, "Connection closed")
            }
            CloseReason::Protocol(_) | CloseReason::Io(_) => {
                tracing::error!(%reason, failed, "Connection lost")
            }
        }

        self.router.connection_lost(reason.clone());
        status.send_replace(Some(reason));
    }

    async fn read_until_closed<R>(
        &mut self,
        mut reader: R,
        mut shutdown: watch::Receiver<bool>,
        writer_task: &mut JoinHandle<Result<()>>,
    ) -> CloseReason
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = vec![0u8; READ_BUFFER_SIZE];

        loop {
            tokio::select! {
                biased;

                _ = stop_requested(&mut shutdown) => return CloseReason::Requested,

                finished = &mut *writer_task => {
                    return match finished {
                        Ok(Ok(())) => CloseReason::Requested,
                        Ok(Err(e)) => CloseReason::Io(e.to_string()),
                        Err(e) => CloseReason::Io(format!("writer task stopped: {}", e)),
                    };
                }

                read = reader.read(&mut buf) => {
                    let n = match read {
                        Ok(0) => {
                            return match self.frames.finish() {
                                Ok(()) => CloseReason::PeerClosed,
                                Err(e) => CloseReason::Protocol(e.to_string()),
                            };
                        }
                        Ok(n) => n,
                        Err(e) => return CloseReason::Io(e.to_string()),
                    };

                    let frames = match self.frames.push(&buf[..n]) {
                        Ok(frames) => frames,
                        Err(e) => return CloseReason::Protocol(e.to_string()),
                    };

                    for frame in frames {
                        if let Err(e) = self.dispatch(frame) {
                            return CloseReason::Protocol(e.to_string());
                        }
                    }
                }
            }
        }
    }

    fn dispatch(&self, frame: ResponseFrame) -> Result<()> {
        self.router.observe_frame();

        if let Some(channel) = frame.channel() {
            return self.router.route(channel, frame.payload());
        }

        let id = frame.correlation_id();
        if !self.pending.complete(id, frame.payload) {
            tracing::warn!(correlation_id = id, "Dropping response with no pending request");
        }
        Ok(())
    }
}

/// Resolves once a stop is requested or every `Connection` handle is gone.
async fn stop_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::BroadcastEvent;
    use crate::protocol::{build_response_frame, RequestFrame, REQUEST_HEADER_SIZE};
    use tokio::io::{duplex, AsyncWriteExt, DuplexStream};

    fn test_config() -> ClientConfig {
        ClientConfig {
            heartbeat_interval_ms: None,
            ..ClientConfig::default()
        }
    }

    fn open() -> (Connection, EventQueue, DuplexStream) {
        let (client, server) = duplex(64 * 1024);
        let (reader, writer) = tokio::io::split(client);
        let (conn, queue) = Connection::start(reader, writer, &test_config());
        (conn, queue, server)
    }

    async fn read_request(server: &mut DuplexStream) -> RequestFrame {
        let mut header = [0u8; REQUEST_HEADER_SIZE];
        server.read_exact(&mut header).await.unwrap();
        let len = u32::from_be_bytes([header[8], header[9], header[10], header[11]]) as usize;
        let mut frame = header.to_vec();
        frame.resize(REQUEST_HEADER_SIZE + len, 0);
        server.read_exact(&mut frame[REQUEST_HEADER_SIZE..]).await.unwrap();
        RequestFrame::parse(&frame).unwrap()
    }

    #[tokio::test]
    async fn test_call_gets_its_response() {
        let (conn, _queue, mut server) = open();

        let call = tokio::spawn({
            let conn = conn.clone();
            async move { conn.call(Opcode::Connect, Bytes::from_static(b"ann")).await }
        });

        let request = read_request(&mut server).await;
        assert_eq!(request.opcode(), Opcode::Connect);
        assert_eq!(request.payload(), b"ann");
        server
            .write_all(&build_response_frame(request.correlation_id(), b"welcome"))
            .await
            .unwrap();

        assert_eq!(call.await.unwrap().unwrap(), Bytes::from_static(b"welcome"));
        assert_eq!(conn.pending_count(), 0);
        assert_eq!(conn.phase(), Phase::LobbyBroadcast);
    }

    #[tokio::test]
    async fn test_call_until_cancel_removes_entry() {
        let (conn, _queue, mut server) = open();
        let (cancel_tx, cancel_rx) = tokio::sync::oneshot::channel::<()>();

        let call = tokio::spawn({
            let conn = conn.clone();
            async move {
                conn.call_until(Opcode::ListLobby, Bytes::new(), async {
                    let _ = cancel_rx.await;
                })
                .await
            }
        });

        let request = read_request(&mut server).await;
        assert_eq!(conn.pending_count(), 1);
        cancel_tx.send(()).unwrap();

        let err = call.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            ClientError::Cancelled {
                operation: Opcode::ListLobby
            }
        ));
        assert_eq!(conn.pending_count(), 0);

        // A late response is an orphan and must not break the connection.
        server
            .write_all(&build_response_frame(request.correlation_id(), b""))
            .await
            .unwrap();
        tokio::task::yield_now().await;
        assert!(!conn.is_closed());
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let (client, mut server) = duplex(4096);
        let (reader, writer) = tokio::io::split(client);
        let config = ClientConfig {
            request_timeout_ms: Some(20),
            ..test_config()
        };
        let (conn, _queue) = Connection::start(reader, writer, &config);

        let err = conn.call(Opcode::Heartbeat, Bytes::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout { .. }));
        assert_eq!(conn.pending_count(), 0);

        let _ = read_request(&mut server).await;
    }

    #[tokio::test]
    async fn test_shutdown_fails_pending_and_refuses_new_calls() {
        let (conn, mut queue, mut server) = open();

        let call = tokio::spawn({
            let conn = conn.clone();
            async move { conn.call(Opcode::Ready, Bytes::new()).await }
        });
        let _ = read_request(&mut server).await;

        conn.shutdown();
        assert_eq!(conn.closed().await, CloseReason::Requested);
        assert!(matches!(
            call.await.unwrap(),
            Err(ClientError::ConnectionClosed)
        ));
        assert!(matches!(
            conn.call(Opcode::Ready, Bytes::new()).await,
            Err(ClientError::ConnectionClosed)
        ));
        assert_eq!(
            queue.drain(),
            vec![BroadcastEvent::Disconnected(CloseReason::Requested)]
        );
        assert_eq!(conn.phase(), Phase::Init);
    }

    #[tokio::test]
    async fn test_peer_close_on_frame_boundary() {
        let (conn, _queue, server) = open();
        drop(server);
        assert_eq!(conn.closed().await, CloseReason::PeerClosed);
        assert!(conn.is_closed());
    }

    #[tokio::test]
    async fn test_oversized_frame_is_protocol_error() {
        let (client, mut server) = duplex(4096);
        let (reader, writer) = tokio::io::split(client);
        let config = ClientConfig {
            max_payload_size: 4,
            ..test_config()
        };
        let (conn, _queue) = Connection::start(reader, writer, &config);

        server
            .write_all(&build_response_frame(9, b"too large"))
            .await
            .unwrap();
        assert!(matches!(conn.closed().await, CloseReason::Protocol(_)));
    }
}

//! Typed RPC facade and client builder.
//!
//! [`GameClient`] exposes one async method per server verb on top of a
//! [`Connection`]. The [`ClientBuilder`] provides a fluent API for
//! configuring and opening the TCP connection.
//!
//! # Example
//!
//! ```ignore
//! use wordgrid_client::GameClient;
//!
//! #[tokio::main]
//! async fn main() -> wordgrid_client::Result<()> {
//!     let (client, mut events) = GameClient::builder()
//!         .host("127.0.0.1")
//!         .port(8080)
//!         .open()
//!         .await?;
//!
//!     let me = client.connect("ann").await?;
//!     let lobby = client.create_lobby(4).await?;
//!
//!     for event in events.drain() {
//!         println!("{:?}", event);
//!     }
//!     client.disconnect().await
//! }
//! ```

use std::future::Future;
use std::time::Duration;

use prost::Message;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::task::JoinHandle;

use crate::broadcast::EventQueue;
use crate::codec::ProtoCodec;
use crate::config::ClientConfig;
use crate::connection::{Connection, WeakConnection};
use crate::error::{ClientError, Result};
use crate::model::{CancelOutcome, GameSnapshot, TurnResult};
use crate::protocol::Opcode;
use crate::schema::{
    CancelRequest, CancelResponse, Cards, CardsResponse, ConnectRequest, ConnectResponse, CreateRequest,
    Empty, FinishTurnResponse, HandCard, JoinRequest, ListResponse, Lobby, LobbyInfo,
    LobbyResponse, Player, RpcResponse, SetTileRequest, StartResponse, StatusResponse,
};
use crate::transport::connect_tcp;

/// Typed access to every server verb. Cheap to clone.
#[derive(Clone)]
pub struct GameClient {
    conn: Connection,
}

impl GameClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Wrap an existing connection. No heartbeat is started.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Start a connection over an already-open stream.
    ///
    /// Starts the heartbeat task if `config` enables it.
    pub fn from_io<R, W>(reader: R, writer: W, config: &ClientConfig) -> (Self, EventQueue)
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (conn, events) = Connection::start(reader, writer, config);
        let client = Self::new(conn);
        if let Some(interval) = config.heartbeat_interval() {
            client.spawn_heartbeat(interval);
        }
        (client, events)
    }

    /// Underlying connection (phase, close status, shutdown).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Send `req` and decode the response, failing on `success == false`.
    pub async fn call<Req, Res>(&self, opcode: Opcode, req: &Req) -> Result<Res>
    where
        Req: Message,
        Res: RpcResponse,
    {
        self.call_until(opcode, req, std::future::pending()).await
    }

    /// Like [`call`](Self::call), abandoning the wait when `cancel` resolves.
    pub async fn call_until<Req, Res, F>(&self, opcode: Opcode, req: &Req, cancel: F) -> Result<Res>
    where
        Req: Message,
        Res: RpcResponse,
        F: Future<Output = ()>,
    {
        let body = self
            .conn
            .call_until(opcode, ProtoCodec::encode(req), cancel)
            .await?;
        let res: Res = ProtoCodec::decode(&body)?;
        if !res.success() {
            return Err(ClientError::Rpc { operation: opcode });
        }
        Ok(res)
    }

    async fn call_empty<Res: RpcResponse>(&self, opcode: Opcode) -> Result<Res> {
        self.call(opcode, &Empty {}).await
    }

    async fn call_status(&self, opcode: Opcode) -> Result<()> {
        self.call_empty::<StatusResponse>(opcode).await.map(|_| ())
    }

    /// Log in under `name`.
    pub async fn connect(&self, name: &str) -> Result<Player> {
        let req = ConnectRequest {
            name: name.to_string(),
        };
        let res: ConnectResponse = self.call(Opcode::Connect, &req).await?;
        res.player.ok_or(ClientError::MissingField {
            operation: Opcode::Connect,
            field: "player",
        })
    }

    /// Log out, then close the connection whatever the server answered.
    pub async fn disconnect(&self) -> Result<()> {
        let result = self.call_status(Opcode::Disconnect).await;
        self.conn.shutdown();
        result
    }

    pub async fn heartbeat(&self) -> Result<()> {
        self.call_status(Opcode::Heartbeat).await
    }

    pub async fn create_lobby(&self, max_players: u32) -> Result<Lobby> {
        let res: LobbyResponse = self
            .call(Opcode::CreateLobby, &CreateRequest { max_players })
            .await?;
        lobby_of(res, Opcode::CreateLobby)
    }

    pub async fn join_lobby(&self, lobby_id: u32) -> Result<Lobby> {
        let res: LobbyResponse = self
            .call(Opcode::JoinLobby, &JoinRequest { lobby_id })
            .await?;
        lobby_of(res, Opcode::JoinLobby)
    }

    pub async fn quit_lobby(&self) -> Result<()> {
        self.call_status(Opcode::QuitLobby).await
    }

    pub async fn list_lobbies(&self) -> Result<Vec<LobbyInfo>> {
        let res: ListResponse = self.call_empty(Opcode::ListLobby).await?;
        Ok(res.lobby_infos.map(|l| l.lobby_infos).unwrap_or_default())
    }

    /// Mark this player ready in the current lobby.
    pub async fn set_ready(&self) -> Result<bool> {
        let res: StatusResponse = self.call_empty(Opcode::Ready).await?;
        Ok(res.success)
    }

    pub async fn start_game(&self) -> Result<GameSnapshot> {
        let res: StartResponse = self.call_empty(Opcode::StartGame).await?;
        Ok(GameSnapshot::from(res))
    }

    /// Place hand card `card_index` at `(x, y)`.
    pub async fn set_tile(&self, x: u32, y: u32, card_index: u32) -> Result<bool> {
        let req = SetTileRequest { x, y, card_index };
        let res: StatusResponse = self.call(Opcode::SetTile, &req).await?;
        Ok(res.success)
    }

    pub async fn finish_turn(&self) -> Result<TurnResult> {
        let res: FinishTurnResponse = self.call_empty(Opcode::FinishTurn).await?;
        Ok(TurnResult::from(res))
    }

    pub async fn get_new_card(&self) -> Result<Vec<HandCard>> {
        let res: CardsResponse = self.call_empty(Opcode::GetNewCard).await?;
        Ok(Cards::hand(res.cards))
    }

    /// Take back the tile placed at `(x, y)` this turn.
    pub async fn cancel(&self, x: u32, y: u32) -> Result<CancelOutcome> {
        let res: CancelResponse = self.call(Opcode::Cancel, &CancelRequest { x, y }).await?;
        Ok(CancelOutcome::from(res))
    }

    /// Leave the running game.
    pub async fn exit(&self) -> Result<()> {
        self.call_status(Opcode::Exit).await
    }

    /// Send `Heartbeat` every `interval` until the connection closes.
    ///
    /// Between beats the task holds only a weak handle. Each beat waits at
    /// most `interval` for its answer, so dropping every handle closes the
    /// connection within one interval.
    pub fn spawn_heartbeat(&self, interval: Duration) -> JoinHandle<()> {
        spawn_heartbeat_task(self.conn.downgrade(), interval)
    }
}

fn lobby_of(res: LobbyResponse, operation: Opcode) -> Result<Lobby> {
    res.lobby.ok_or(ClientError::MissingField {
        operation,
        field: "lobby",
    })
}

fn spawn_heartbeat_task(conn: WeakConnection, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let Some(conn) = conn.upgrade() else {
                return;
            };
            if conn.is_closed() {
                return;
            }

            // Bounded so the strong handle is released even if the server never answers.
            match tokio::time::timeout(interval, GameClient::new(conn).heartbeat()).await {
                Ok(Ok(())) => tracing::trace!("Heartbeat acknowledged"),
                Ok(Err(e)) if e.is_fatal() => {
                    tracing::debug!("Heartbeat stopped: {}", e);
                    return;
                }
                Ok(Err(e)) => tracing::warn!("Heartbeat failed: {}", e),
                Err(_) => tracing::warn!("Heartbeat unanswered after {:?}", interval),
            }
        }
    })
}

/// Builder for configuring and opening a [`GameClient`].
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::from_config(ClientConfig::default())
    }

    /// Start from a loaded configuration.
    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Default: 5 seconds
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Fail calls that get no response within `timeout`.
    ///
    /// Default: wait indefinitely
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Heartbeat period, or `None` to disable.
    ///
    /// Default: 20 seconds
    pub fn heartbeat_interval(mut self, interval: Option<Duration>) -> Self {
        self.config.heartbeat_interval_ms = interval.map(|i| i.as_millis() as u64);
        self
    }

    /// Default: 16 MB
    pub fn max_payload_size(mut self, size: u32) -> Self {
        self.config.max_payload_size = size;
        self
    }

    /// Set the writer channel capacity.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.writer_channel_capacity = capacity;
        self
    }

    /// Configuration this builder will open with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Connect over TCP and start the connection.
    pub async fn open(self) -> Result<(GameClient, EventQueue)> {
        self.config.validate()?;
        let stream = connect_tcp(&self.config.address(), self.config.connect_timeout()).await?;
        let (reader, writer) = stream.into_split();
        Ok(GameClient::from_io(reader, writer, &self.config))
    }

    /// Start the connection over an already-open stream.
    pub fn open_io<R, W>(self, reader: R, writer: W) -> Result<(GameClient, EventQueue)>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        self.config.validate()?;
        Ok(GameClient::from_io(reader, writer, &self.config))
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

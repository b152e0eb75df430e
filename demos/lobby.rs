//! Log in, list lobbies, join or create one, and print broadcasts.
//!
//! Server address comes from `WORDGRID_HOST` / `WORDGRID_PORT`.
//!
//! ```text
//! WORDGRID_PORT=8080 RUST_LOG=debug cargo run --example lobby -- ann
//! ```

use std::time::Duration;

use wordgrid_client::{BroadcastEvent, ClientBuilder, ClientConfig, GameNotice, LobbyNotice};

/// UI tick period.
const TICK: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> wordgrid_client::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let name = std::env::args().nth(1).unwrap_or_else(|| "guest".to_string());
    let config = ClientConfig::from_env()?;
    let (client, mut events) = ClientBuilder::from_config(config).open().await?;

    let me = client.connect(&name).await?;
    tracing::info!(id = me.id, name = %me.name, "Logged in");

    let lobbies = client.list_lobbies().await?;
    let open = lobbies
        .iter()
        .find(|info| info.current_players < info.max_players);
    let lobby = match open {
        Some(info) => client.join_lobby(info.id).await?,
        None => client.create_lobby(4).await?,
    };
    tracing::info!(lobby = lobby.id, players = lobby.players.len(), "In lobby");
    client.set_ready().await?;

    let mut ticker = tokio::time::interval(TICK);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                client.disconnect().await?;
                return Ok(());
            }
        }

        for event in events.drain() {
            match event {
                BroadcastEvent::Lobby(LobbyNotice::RosterUpdated { change, lobby }) => {
                    let players = lobby.map(|l| l.players.len()).unwrap_or(0);
                    tracing::info!(?change, players, "Roster changed");
                }
                BroadcastEvent::Lobby(LobbyNotice::Destroyed { .. }) => {
                    tracing::info!("Lobby destroyed");
                    return Ok(());
                }
                BroadcastEvent::Lobby(LobbyNotice::GameStarted(game)) => {
                    let next = game.next_player.map(|p| p.name).unwrap_or_default();
                    tracing::info!(hand = game.hand.len(), %next, "Game started");
                }
                BroadcastEvent::Game(GameNotice::TurnAdvanced(turn)) => {
                    tracing::info!(words = ?turn.words, "Turn finished");
                }
                BroadcastEvent::Game(notice) => tracing::info!(?notice, "Game event"),
                BroadcastEvent::Disconnected(reason) => {
                    tracing::warn!(%reason, "Disconnected");
                    return Ok(());
                }
            }
        }
    }
}

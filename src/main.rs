//! Terminal front-end for roomsync.
//!
//! A minimal presentation collaborator: it attaches to a room, prints
//! each change to the reconciled message list, and submits stdin lines
//! as messages. All synchronization logic lives in the library.

use std::error::Error;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use roomsync::adapters::WebSocketTransport;
use roomsync::application::{ClientIdentity, RoomSession};
use roomsync::config::AppConfig;
use roomsync::domain::foundation::RoomId;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.client.log_level)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let identity = match &config.client.display_name {
        Some(name) => ClientIdentity::named(name.clone()),
        None => ClientIdentity::random(),
    };
    let room_id = match &config.client.room {
        Some(room) => RoomId::new(room.clone()),
        None => RoomId::generate(),
    };

    info!(room_id = %room_id, user = identity.display_name(), "joining room");

    let transport = WebSocketTransport::new(config.connection.clone());
    let mut session = RoomSession::attach(&transport, room_id, identity).await?;

    println!(
        "joined room {} as {}",
        session.room_id(),
        session.identity().display_name()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            applied = session.next_event() => match applied {
                Some(_) => render(&session),
                None => break,
            },
            line = lines.next_line() => match line? {
                Some(line) => {
                    if let Err(error) = session.submit(&line).await {
                        eprintln!("{error}");
                    } else {
                        render(&session);
                    }
                }
                None => break,
            },
        }
    }

    Ok(())
}

/// Prints the newest entry of the reconciled list.
fn render(session: &RoomSession) {
    if let Some(message) = session.messages().last() {
        let marker = if message.is_user() { "" } else { "*" };
        println!(
            "[{}] {}{}: {}",
            session.messages().len(),
            marker,
            message.user,
            message.content
        );
    }
}

//! Echo server answering every request over the WebSocket transport.
//!
//! Listens on `127.0.0.1:7878` (or the address passed as the first
//! argument). Requests are answered with their own payload; subscriptions
//! get the payload back as a streamed reply followed by the end marker.
//! Run the `echo_client` demo against it.

use async_trait::async_trait;
use sockd::{Entity, Listener, Message, Server, Session, SockdError};
use tracing::info;

struct EchoListener;

#[async_trait]
impl Listener for EchoListener {
    async fn on_open(&self, session: Session) -> Result<(), SockdError> {
        info!(
            session_id = %session.session_id(),
            path = ?session.path(),
            remote = ?session.remote_address(),
            "connection opened",
        );
        Ok(())
    }

    async fn on_message(&self, session: Session, message: Message) -> Result<(), SockdError> {
        info!(
            event = %message.event(),
            bytes = message.data().len(),
            "echoing message",
        );
        if message.is_request() {
            session.reply_end(&message, message.entity().clone()).await?;
        } else if message.is_subscribe() {
            session.reply(&message, message.entity().clone()).await?;
            session.reply_end(&message, Entity::empty()).await?;
        }
        Ok(())
    }

    async fn on_close(&self, session: Session) {
        info!(session_id = %session.session_id(), "connection closed");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:7878".to_owned());
    let server = Server::builder(addr).listener(EchoListener).bind().await?;
    info!(addr = %server.local_addr()?, "echo server ready");
    server.run().await;
    Ok(())
}

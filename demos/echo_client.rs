//! Client for the `echo_server` demo.
//!
//! Start `echo_server` first. The client sends one request, prints the
//! echoed reply, then drains a short subscription before closing.

use futures::StreamExt;
use sockd::{Client, Entity};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://127.0.0.1:7878/echo?user=demo".to_owned());
    let client = Client::builder(url).connect().await?;
    let session = client.session();
    info!(session_id = %session.session_id(), "connected");

    let reply = session
        .request("demo.echo", Entity::from_text("hello sockd"))
        .await?
        .await?;
    info!(reply = %reply.entity().data_as_text(), "request answered");

    let mut replies = session
        .subscribe("demo.echo", Entity::from_text("stream me"))
        .await?;
    while let Some(message) = replies.next().await {
        info!(
            flag = %message.flag(),
            data = %message.entity().data_as_text(),
            "subscription reply",
        );
    }

    client.close().await;
    info!("echo client done");
    Ok(())
}

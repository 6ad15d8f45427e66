//! Utilities for exercising [`sockd`] channels against in-memory
//! transports during tests.
//!
//! The pipe assistant routes every frame a channel writes through the
//! real binary codec before handing the decoded result to the test, so
//! assertions see exactly what a peer would receive.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use sockd::Config;
//! use sockd_testing::pipe_channel;
//!
//! # async fn example() {
//! let (channel, mut tap) = pipe_channel(Arc::new(Config::client()));
//! channel.send_ping().await.unwrap();
//! let frame = tap.next_frame().await.unwrap();
//! assert_eq!(frame.flag(), sockd::Flag::Ping);
//! # }
//! ```

pub mod harness;
pub mod logging;
pub mod pipe;
pub mod recording;

pub use harness::ServerHarness;
pub use logging::{LoggerHandle, logger};
pub use pipe::{
    FrameTap,
    PipeAssistant,
    PipeTarget,
    client_config,
    handshake_server,
    pipe_channel,
    server_config,
};
pub use recording::RecordingListener;

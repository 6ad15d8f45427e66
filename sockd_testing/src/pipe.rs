//! In-memory frame pipe standing in for a real transport.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use bytes::BytesMut;
use rstest::fixture;
use sockd::{
    BinaryFrameCodec, Channel, ChannelAssistant, Config, DispatchOutcome, ExecutionStrategy,
    ExecutorConfig, Flag, Frame, FrameCodec, Processor, Role, SockdError,
};
use tokio::sync::mpsc;

#[cfg(test)]
mod tests;

/// Write side handed to the channel under test.
pub struct PipeTarget {
    frames: mpsc::UnboundedSender<Frame>,
    open: Arc<AtomicBool>,
}

/// Observes every frame the channel wrote, in order.
pub struct FrameTap {
    frames: mpsc::UnboundedReceiver<Frame>,
    open: Arc<AtomicBool>,
}

impl FrameTap {
    /// Wait for the next written frame.
    ///
    /// Returns `None` once the channel, and with it the write side of
    /// the pipe, has been dropped.
    pub async fn next_frame(&mut self) -> Option<Frame> { self.frames.recv().await }

    /// Frames written so far, without waiting.
    pub fn drain(&mut self) -> Vec<Frame> {
        let mut drained = Vec::new();
        while let Ok(frame) = self.frames.try_recv() {
            drained.push(frame);
        }
        drained
    }

    /// Fail the transport so further writes error.
    pub fn sever(&self) { self.open.store(false, Ordering::Release); }
}

/// Assistant that loops writes back to the test through the real codec.
pub struct PipeAssistant {
    codec: BinaryFrameCodec,
}

impl PipeAssistant {
    #[must_use]
    pub const fn new(max_frame_size: usize) -> Self {
        Self {
            codec: BinaryFrameCodec::new(max_frame_size),
        }
    }
}

#[async_trait]
impl ChannelAssistant for PipeAssistant {
    type Target = PipeTarget;

    async fn write(&self, target: &PipeTarget, frame: &Frame) -> Result<(), SockdError> {
        if !target.open.load(Ordering::Acquire) {
            return Err(SockdError::ChannelClosed);
        }
        // Round-trip the wire format so tests observe what a peer would
        // decode, not what the channel handed down.
        let mut buf = BytesMut::new();
        self.codec.encode(frame, &mut buf)?;
        let decoded = self
            .codec
            .decode(&mut buf)?
            .expect("encode emits whole frames");
        target
            .frames
            .send(decoded)
            .map_err(|_| SockdError::ChannelClosed)
    }

    fn read(&self, buffer: &mut BytesMut) -> Result<Option<Frame>, SockdError> {
        Ok(self.codec.decode(buffer)?)
    }

    fn is_valid(&self, target: &PipeTarget) -> bool { target.open.load(Ordering::Acquire) }

    async fn close(&self, target: &PipeTarget) -> Result<(), SockdError> {
        target.open.store(false, Ordering::Release);
        Ok(())
    }

    fn remote_address(&self, _target: &PipeTarget) -> Option<String> {
        Some("pipe:peer".to_owned())
    }

    fn local_address(&self, _target: &PipeTarget) -> Option<String> {
        Some("pipe:local".to_owned())
    }
}

/// A channel bound to an in-memory pipe, plus the tap observing it.
#[must_use]
pub fn pipe_channel(config: Arc<Config>) -> (Arc<Channel>, FrameTap) {
    let (tx, rx) = mpsc::unbounded_channel();
    let open = Arc::new(AtomicBool::new(true));
    let target = PipeTarget {
        frames: tx,
        open: Arc::clone(&open),
    };
    let assistant = Arc::new(PipeAssistant::new(config.max_frame_size()));
    let channel = Channel::new(target, config, assistant);
    (channel, FrameTap { frames: rx, open })
}

/// Client-role config dispatching callbacks inline for determinism.
#[fixture]
pub fn client_config() -> Arc<Config> { inline_config(Role::Client) }

/// Server-role config dispatching callbacks inline for determinism.
#[fixture]
pub fn server_config() -> Arc<Config> { inline_config(Role::Server) }

fn inline_config(role: Role) -> Arc<Config> {
    let executor = ExecutorConfig {
        strategy: ExecutionStrategy::Inline,
        ..ExecutorConfig::default()
    };
    Arc::new(
        Config::builder(role)
            .executor(executor)
            .build()
            .expect("config builds"),
    )
}

/// Complete a handshake on a server-role channel.
///
/// Feeds a connect frame for `url` into `processor` and drains the
/// acknowledgement from `tap`.
///
/// # Panics
///
/// Panics if the processor rejects the connect or never acknowledges it.
pub async fn handshake_server(
    channel: &Arc<Channel>,
    processor: &Processor,
    tap: &mut FrameTap,
    url: &str,
) {
    let sid = channel.config().next_sid();
    let outcome = processor.on_receive(channel, Frame::connect(sid, url)).await;
    assert!(
        matches!(outcome, DispatchOutcome::Ok),
        "connect rejected: {outcome:?}"
    );
    let ack = tap.next_frame().await.expect("connack written");
    assert_eq!(ack.flag(), Flag::Connack, "handshake not acknowledged");
    assert!(channel.handshake_completed());
}

use std::sync::Arc;

use rstest::rstest;
use sockd::{Config, Entity, Flag, Frame, Listener, Message, Processor, SockdError};

use crate::{
    pipe::{client_config, pipe_channel, server_config},
    recording::RecordingListener,
};

#[rstest]
#[tokio::test]
async fn writes_round_trip_the_wire_format(client_config: Arc<Config>) {
    let (channel, mut tap) = pipe_channel(client_config);
    let entity = Entity::builder()
        .data(&b"hello"[..])
        .meta("Trace-Id", "t1")
        .build();
    let frame = Frame::with_message(Message::new(Flag::Message, "10", "files.upload", entity));

    channel.send(frame, None).await.expect("send succeeds");

    let received = tap.next_frame().await.expect("frame written");
    assert_eq!(received.flag(), Flag::Message);
    let message = received.into_message().expect("message frame");
    assert_eq!(message.sid(), "10");
    assert_eq!(message.event(), "files.upload");
    assert_eq!(message.meta_value("Trace-Id"), Some("t1"));
    assert_eq!(message.data().as_ref(), b"hello");
}

#[rstest]
#[tokio::test]
async fn severed_pipes_refuse_writes(client_config: Arc<Config>) {
    let (channel, tap) = pipe_channel(client_config);
    tap.sever();

    let result = channel.send_ping().await;

    assert!(matches!(result, Err(SockdError::ChannelClosed)));
    assert!(!channel.is_valid());
}

#[rstest]
#[tokio::test]
async fn handshake_server_establishes_the_channel(server_config: Arc<Config>) {
    let (channel, mut tap) = pipe_channel(server_config);
    let listener = Arc::new(RecordingListener::default());
    let processor = Processor::new(Arc::clone(&listener) as Arc<dyn Listener>);

    super::handshake_server(&channel, &processor, &mut tap, "ws://test/files?user=a").await;

    assert!(channel.handshake_completed());
    assert_eq!(listener.opened(), 1);
}

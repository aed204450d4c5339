//! Realtime transport for native targets over `tokio-tungstenite`.
//!
//! Subscriptions run on the current `LocalSet`: the insert callback is not
//! `Send`, so the channel task is spawned with `tokio::task::spawn_local`.
//! Releasing the subscription flips a watch flag; the task sends
//! `phx_leave`, closes the socket, and exits. Callers that are about to shut
//! the runtime down await [`TungsteniteRealtime::closed`] so that exit is
//! not cut short.

#[cfg(test)]
#[path = "socket_test.rs"]
mod socket_test;

use std::cell::RefCell;
use std::rc::Rc;

use futures_util::{SinkExt, StreamExt};
use store::realtime::{
    ChannelSession, ChannelSpec, HEARTBEAT_INTERVAL, INITIAL_BACKOFF_MS, SessionEnd, SessionEvent, reconnect_delay,
};
use store::{InsertHandler, RealtimeConnector, StoreError, Subscription};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

/// [`RealtimeConnector`] backed by a tokio websocket.
///
/// Must be used from inside a `tokio::task::LocalSet`.
#[derive(Clone, Debug, Default)]
pub struct TungsteniteRealtime {
    tasks: Rc<RefCell<Vec<JoinHandle<()>>>>,
}

impl TungsteniteRealtime {
    /// Wait for every channel task started so far to finish.
    ///
    /// Only returns once the matching subscriptions have been released.
    pub async fn closed(&self) {
        let tasks: Vec<_> = self.tasks.borrow_mut().drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "realtime channel task aborted");
            }
        }
    }
}

impl RealtimeConnector for TungsteniteRealtime {
    fn subscribe(&self, channel: ChannelSpec, on_insert: InsertHandler) -> Result<Subscription, StoreError> {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::task::spawn_local(channel_loop(channel, on_insert, stop_rx));
        self.tasks.borrow_mut().push(task);
        Ok(Subscription::new(move || {
            let _ = stop_tx.send(true);
        }))
    }
}

async fn channel_loop(spec: ChannelSpec, on_insert: InsertHandler, mut stop: watch::Receiver<bool>) {
    let mut backoff_ms = INITIAL_BACKOFF_MS;

    loop {
        let end = match run_session(&spec, &on_insert, &mut stop).await {
            Ok(SessionEnd::Released) => {
                tracing::debug!(topic = %spec.topic(), "realtime channel released");
                return;
            }
            Ok(end) => {
                tracing::info!(topic = %spec.topic(), "realtime channel disconnected");
                Some(end)
            }
            Err(e) => {
                tracing::warn!(topic = %spec.topic(), error = %e, "realtime channel failed");
                None
            }
        };

        backoff_ms = reconnect_delay(end, backoff_ms);
        tokio::select! {
            biased;
            _ = stop.changed() => return,
            () = tokio::time::sleep(std::time::Duration::from_millis(u64::from(backoff_ms))) => {}
        }
    }
}

async fn run_session(
    spec: &ChannelSpec,
    on_insert: &InsertHandler,
    stop: &mut watch::Receiver<bool>,
) -> Result<SessionEnd, String> {
    let mut session = ChannelSession::new(spec.clone());
    let (stream, _) = tokio::select! {
        biased;
        _ = stop.changed() => return Ok(SessionEnd::Released),
        connected = connect_async(session.socket_url()) => connected.map_err(|e| e.to_string())?,
    };
    let (mut ws_write, mut ws_read) = stream.split();

    ws_write
        .send(WsMessage::Text(session.join().into()))
        .await
        .map_err(|e| e.to_string())?;

    let mut heartbeat = tokio::time::interval_at(tokio::time::Instant::now() + HEARTBEAT_INTERVAL, HEARTBEAT_INTERVAL);
    let mut joined = false;

    loop {
        tokio::select! {
            biased;
            _ = stop.changed() => {
                let _ = ws_write.send(WsMessage::Text(session.leave().into())).await;
                let _ = ws_write.close().await;
                return Ok(SessionEnd::Released);
            }
            _ = heartbeat.tick() => {
                ws_write
                    .send(WsMessage::Text(session.heartbeat().into()))
                    .await
                    .map_err(|e| e.to_string())?;
            }
            frame = ws_read.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => match session.handle_text(text.as_str()) {
                    SessionEvent::Insert(msg) => on_insert(msg),
                    SessionEvent::Joined => {
                        joined = true;
                        tracing::debug!(topic = %session.topic(), "joined realtime channel");
                    }
                    SessionEvent::JoinFailed(reason) => return Err(format!("join refused: {reason}")),
                    SessionEvent::Closed(reason) => {
                        tracing::debug!(%reason, "realtime channel closed by server");
                        return Ok(SessionEnd::Dropped { joined });
                    }
                    SessionEvent::Ignored => {}
                },
                Some(Ok(WsMessage::Close(_))) | None => return Ok(SessionEnd::Dropped { joined }),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.to_string()),
            },
        }
    }
}

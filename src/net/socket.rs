//! Realtime websocket transport for the browser.
//!
//! DESIGN
//! ======
//! Each subscription spawns one local task that opens the Phoenix socket,
//! joins the table channel, sends heartbeats, and forwards decoded inserts
//! to the subscription callback. On disconnect it reconnects with
//! exponential backoff; a session that reached `Joined` resets the delay.
//!
//! Releasing the [`store::Subscription`] fires a oneshot that every await
//! point races against, so the task sends `phx_leave` when it can and exits.
//!
//! All websocket code is gated behind `#[cfg(feature = "hydrate")]`.

#[cfg(test)]
#[path = "socket_test.rs"]
mod socket_test;

#[cfg(any(test, feature = "hydrate"))]
use std::time::Duration;

#[cfg(any(test, feature = "hydrate"))]
pub(crate) fn interval_millis(interval: Duration) -> u32 {
    u32::try_from(interval.as_millis()).unwrap_or(u32::MAX)
}

#[cfg(feature = "hydrate")]
pub use browser::BrowserRealtime;

#[cfg(feature = "hydrate")]
mod browser {
    use futures::channel::oneshot;
    use futures::future::{Either, Shared};
    use futures::{FutureExt, SinkExt, StreamExt};
    use gloo_net::websocket::Message as WsMessage;
    use gloo_net::websocket::futures::WebSocket;
    use store::realtime::{
        ChannelSession, ChannelSpec, HEARTBEAT_INTERVAL, INITIAL_BACKOFF_MS, SessionEnd, SessionEvent,
        reconnect_delay,
    };
    use store::{InsertHandler, RealtimeConnector, StoreError, Subscription};

    use super::interval_millis;

    type StopSignal = Shared<oneshot::Receiver<()>>;

    /// [`RealtimeConnector`] over a `gloo-net` websocket.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct BrowserRealtime;

    impl RealtimeConnector for BrowserRealtime {
        fn subscribe(&self, channel: ChannelSpec, on_insert: InsertHandler) -> Result<Subscription, StoreError> {
            let (stop_tx, stop_rx) = oneshot::channel::<()>();
            leptos::task::spawn_local(channel_loop(channel, on_insert, stop_rx.shared()));
            Ok(Subscription::new(move || {
                let _ = stop_tx.send(());
            }))
        }
    }

    async fn channel_loop(spec: ChannelSpec, on_insert: InsertHandler, stop: StopSignal) {
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let end = match run_session(&spec, &on_insert, stop.clone()).await {
                Ok(SessionEnd::Released) => {
                    log::debug!("realtime channel {} released", spec.topic());
                    return;
                }
                Ok(end) => {
                    log::info!("realtime channel {} disconnected", spec.topic());
                    Some(end)
                }
                Err(e) => {
                    log::warn!("realtime channel {} failed: {e}", spec.topic());
                    None
                }
            };

            backoff_ms = reconnect_delay(end, backoff_ms);
            let sleep = gloo_timers::future::sleep(std::time::Duration::from_millis(u64::from(backoff_ms)));
            if let Either::Right(_) = futures::future::select(Box::pin(sleep), stop.clone()).await {
                return;
            }
        }
    }

    /// Connect, join, and pump frames until the socket drops or `stop` fires.
    async fn run_session(
        spec: &ChannelSpec,
        on_insert: &InsertHandler,
        stop: StopSignal,
    ) -> Result<SessionEnd, String> {
        let mut session = ChannelSession::new(spec.clone());
        let ws = WebSocket::open(session.socket_url()).map_err(|e| e.to_string())?;
        let (mut ws_write, ws_read) = ws.split();

        ws_write
            .send(WsMessage::Text(session.join()))
            .await
            .map_err(|e| e.to_string())?;

        let mut frames = ws_read.fuse();
        let mut ticks = gloo_timers::future::IntervalStream::new(interval_millis(HEARTBEAT_INTERVAL)).fuse();
        let mut stop = stop.fuse();
        let mut joined = false;

        loop {
            futures::select! {
                _ = stop => {
                    let _ = ws_write.send(WsMessage::Text(session.leave())).await;
                    return Ok(SessionEnd::Released);
                }
                _ = ticks.next() => {
                    ws_write
                        .send(WsMessage::Text(session.heartbeat()))
                        .await
                        .map_err(|e| e.to_string())?;
                }
                frame = frames.next() => match frame {
                    Some(Ok(WsMessage::Text(text))) => match session.handle_text(&text) {
                        SessionEvent::Insert(msg) => on_insert(msg),
                        SessionEvent::Joined => {
                            joined = true;
                            log::debug!("joined realtime channel {}", session.topic());
                        }
                        SessionEvent::JoinFailed(reason) => return Err(format!("join refused: {reason}")),
                        SessionEvent::Closed(reason) => {
                            log::debug!("realtime channel closed by server: {reason}");
                            return Ok(SessionEnd::Dropped { joined });
                        }
                        SessionEvent::Ignored => {}
                    },
                    Some(Ok(WsMessage::Bytes(_))) => {}
                    Some(Err(e)) => return Err(e.to_string()),
                    None => return Ok(SessionEnd::Dropped { joined }),
                },
            }
        }
    }
}

use super::*;
use std::time::Duration;
use store::Message;

fn unreachable_channel() -> ChannelSpec {
    ChannelSpec {
        socket_url: "ws://127.0.0.1:9/realtime/v1/websocket?apikey=k&vsn=1.0.0".to_owned(),
        schema: "public".to_owned(),
        table: "messages".to_owned(),
        access_token: "k".to_owned(),
    }
}

#[tokio::test]
async fn released_channel_task_runs_to_completion() {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let transport = TungsteniteRealtime::default();
            let sub = transport
                .subscribe(unreachable_channel(), Rc::new(|_: Message| {}))
                .unwrap();
            sub.unsubscribe();

            tokio::time::timeout(Duration::from_secs(5), transport.closed())
                .await
                .expect("channel task should exit after release");
            assert!(transport.tasks.borrow().is_empty());
        })
        .await;
}

#[tokio::test]
async fn release_during_backoff_stops_reconnecting() {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let transport = TungsteniteRealtime::default();
            let sub = transport
                .subscribe(unreachable_channel(), Rc::new(|_: Message| {}))
                .unwrap();
            // Let the first connect fail and the loop enter its backoff sleep.
            tokio::time::sleep(Duration::from_millis(200)).await;
            drop(sub);

            tokio::time::timeout(Duration::from_secs(5), transport.closed())
                .await
                .expect("channel task should exit while backing off");
        })
        .await;
}

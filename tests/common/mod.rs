#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};

use traffic_feed::error::SourceError;
use traffic_feed::feed::{EngineSettings, FlowSource, RawFlow};

/// Upstream body: oldest first, `malicious` marks by index
pub fn feed_body(count: usize, malicious: &[usize]) -> Value {
    let flows: Vec<Value> = (0..count)
        .map(|i| {
            let mut flow = json!({
                "source_ip": format!("10.0.0.{}", i + 1),
                "dest_ip": "192.0.2.10",
                "protocol": if i % 2 == 0 { "TCP" } else { "dns" },
                "port": 53 + i as u64,
                "packets": 100 * i as u64,
                "bytes": 1000 * i as u64,
                "status": "Active",
                "action": "allow"
            });
            if malicious.contains(&i) {
                flow["is_malicious"] = json!(true);
                flow["malicious_reason"] = json!("matched blocklist");
            }
            flow
        })
        .collect();
    Value::Array(flows)
}

pub fn raw_batch(count: usize, malicious: &[usize]) -> Vec<RawFlow> {
    serde_json::from_value(feed_body(count, malicious)).unwrap()
}

pub fn fast_settings() -> EngineSettings {
    EngineSettings {
        poll_interval: Duration::from_millis(10),
        fetch_timeout: Duration::from_secs(5),
        max_backoff: Duration::from_millis(10),
        ..Default::default()
    }
}

/// Serve `app` on an ephemeral local port
pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Source whose replies are pushed by the test, one per fetch.
pub struct ControlledSource {
    replies: Mutex<mpsc::Receiver<Result<Vec<RawFlow>, SourceError>>>,
    calls: mpsc::UnboundedSender<()>,
}

pub struct SourceHandle {
    pub replies: mpsc::Sender<Result<Vec<RawFlow>, SourceError>>,
    pub calls: mpsc::UnboundedReceiver<()>,
}

impl ControlledSource {
    pub fn new() -> (Self, SourceHandle) {
        let (reply_tx, reply_rx) = mpsc::channel(8);
        let (call_tx, call_rx) = mpsc::unbounded_channel();
        (
            Self {
                replies: Mutex::new(reply_rx),
                calls: call_tx,
            },
            SourceHandle {
                replies: reply_tx,
                calls: call_rx,
            },
        )
    }
}

impl FlowSource for ControlledSource {
    async fn fetch(&self) -> Result<Vec<RawFlow>, SourceError> {
        let _ = self.calls.send(());
        let reply = self.replies.lock().await.recv().await;
        reply.unwrap_or_else(|| Err(SourceError::Transport("script closed".to_string())))
    }
}

//! In-process stand-ins for the archive API and the runtime sleeper, so the
//! request/retry path runs against a loopback socket with no real delays.

use crate::climate::retry::Sleep;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Records every requested delay instead of waiting it out.
pub(crate) struct RecordingSleep {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleep {
    pub(crate) fn new() -> Self {
        Self {
            slept: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

impl Sleep for RecordingSleep {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

/// Loopback HTTP server that answers with a scripted list of raw responses,
/// one per request in order; the last response repeats once the script runs
/// out. Counts the requests it served.
pub(crate) struct ScriptedArchive {
    base_url: String,
    hits: Arc<AtomicUsize>,
}

impl ScriptedArchive {
    pub(crate) async fn serve(responses: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let mut buf = [0u8; 4096];
                let mut request = Vec::new();
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            request.extend_from_slice(&buf[..n]);
                            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                                break;
                            }
                        }
                    }
                }
                let served = counter.fetch_add(1, Ordering::SeqCst);
                let response = responses
                    .get(served)
                    .or_else(|| responses.last())
                    .cloned()
                    .unwrap_or_default();
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        Self { base_url, hits }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Raw HTTP/1.1 response with the given status line, extra headers, and body.
pub(crate) fn response(status: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut raw = format!("HTTP/1.1 {status}\r\n");
    for (name, value) in headers {
        raw.push_str(&format!("{name}: {value}\r\n"));
    }
    raw.push_str(&format!(
        "content-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    ));
    raw
}

/// JSON body in the archive's parallel-array shape.
pub(crate) fn series_body(days: &[(&str, f64, f64)]) -> String {
    let time: Vec<&str> = days.iter().map(|(date, _, _)| *date).collect();
    let hi: Vec<f64> = days.iter().map(|(_, hi, _)| *hi).collect();
    let lo: Vec<f64> = days.iter().map(|(_, _, lo)| *lo).collect();
    serde_json::json!({
        "daily": {
            "time": time,
            "temperature_2m_max": hi,
            "temperature_2m_min": lo,
        }
    })
    .to_string()
}

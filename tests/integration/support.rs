use async_trait::async_trait;
use framemerge::delivery::{ArtifactSource, ResultDelivery};
use framemerge::error::MergeError;
use framemerge::graph::{Arrow, ArrowStatus, CanvasSnapshot, Frame, Shape};
use framemerge::merge::{MergeResponse, MergeService};
use framemerge::sequence::MergeRequest;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Merge service returning a canned response and recording what it was sent.
pub struct FakeMergeService {
    response: Result<MergeResponse, MergeError>,
    requests: Mutex<Vec<Vec<String>>>,
}

impl FakeMergeService {
    pub fn returning(url: &str) -> Self {
        Self::with_response(Ok(MergeResponse {
            video_url: url.to_string(),
        }))
    }

    pub fn with_response(response: Result<MergeResponse, MergeError>) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl MergeService for FakeMergeService {
    async fn submit(&self, request: &MergeRequest) -> Result<MergeResponse, MergeError> {
        self.requests.lock().push(request.video_urls().to_vec());
        self.response.clone()
    }
}

/// Delivery that counts invocations and always succeeds.
#[derive(Default)]
pub struct CountingDelivery {
    pub calls: AtomicUsize,
}

impl CountingDelivery {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResultDelivery for CountingDelivery {
    async fn deliver(&self, _result_url: &str) -> Result<PathBuf, MergeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PathBuf::from("merged.mp4"))
    }
}

/// Artifact source whose downloads always fail.
pub struct UnreachableSource;

#[async_trait]
impl ArtifactSource for UnreachableSource {
    async fn fetch_into(
        &self,
        url: &str,
        _sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, MergeError> {
        Err(MergeError::DownloadFailed(format!("connection refused: {}", url)))
    }
}

/// R -A1-> F1 -A2-> F2, with F2 selected.
pub fn two_step_canvas(second: Arrow) -> CanvasSnapshot {
    let mut snapshot = CanvasSnapshot::from_shapes(vec![
        Shape::Frame(Frame::new("R")),
        Shape::Arrow(
            Arrow::new("A1", "R", "F1")
                .with_status(ArrowStatus::Done)
                .with_video("url1"),
        ),
        Shape::Frame(Frame::new("F1")),
        Shape::Arrow(second),
        Shape::Frame(Frame::new("F2")),
    ])
    .unwrap();
    snapshot.select(vec!["F2".into()]);
    snapshot
}

pub fn done_second_arrow() -> Arrow {
    Arrow::new("A2", "F1", "F2")
        .with_status(ArrowStatus::Done)
        .with_video("url2")
}

/// Loopback HTTP server that answers exactly one request.
///
/// Returns the base URL and a handle yielding the raw request it received.
pub async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
        request
    });
    (format!("http://{}", addr), handle)
}

/// Base URL of a loopback port nothing listens on.
pub fn unbound_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Client that ignores proxy settings from the environment.
pub fn loopback_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

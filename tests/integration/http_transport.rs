use crate::support::{loopback_client, serve_once, unbound_url};
use framemerge::delivery::{FileDelivery, HttpArtifactSource, ResultDelivery};
use framemerge::error::MergeError;
use framemerge::merge::{HttpMergeClient, MergeService, DEFAULT_MERGE_PATH};
use framemerge::sequence::MergeRequest;
use tempfile::TempDir;

fn request() -> MergeRequest {
    MergeRequest::from_videos(vec!["url1".to_string(), "url2".to_string()]).unwrap()
}

fn merge_client(base_url: &str, token: Option<&str>) -> HttpMergeClient {
    HttpMergeClient::new(
        loopback_client(),
        format!("{}{}", base_url, DEFAULT_MERGE_PATH),
        token.map(str::to_string),
    )
}

#[tokio::test]
async fn merge_client_posts_ordered_urls_with_bearer_token() {
    let (base_url, server) = serve_once("200 OK", r#"{"video_url":"https://x/out.mp4"}"#).await;

    let response = merge_client(&base_url, Some("secret-token"))
        .submit(&request())
        .await
        .unwrap();

    assert_eq!(response.video_url, "https://x/out.mp4");
    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /api/jobs/video/merge HTTP/1.1"), "{raw}");
    assert!(
        raw.to_lowercase().contains("authorization: bearer secret-token"),
        "{raw}"
    );
    assert!(raw.ends_with(r#"{"video_urls":["url1","url2"]}"#), "{raw}");
}

#[tokio::test]
async fn merge_client_reports_server_error_body() {
    let (base_url, server) =
        serve_once("500 Internal Server Error", r#"{"error":"Insufficient credits"}"#).await;

    let err = merge_client(&base_url, None)
        .submit(&request())
        .await
        .unwrap_err();

    assert_eq!(err, MergeError::ServerError("Insufficient credits".to_string()));
    let raw = server.await.unwrap();
    assert!(!raw.to_lowercase().contains("authorization:"), "{raw}");
}

#[tokio::test]
async fn merge_client_reports_status_without_error_field() {
    let (base_url, _server) = serve_once("500 Internal Server Error", "{}").await;

    let err = merge_client(&base_url, None)
        .submit(&request())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        MergeError::ServerError("HTTP error! status: 500".to_string())
    );
}

#[tokio::test]
async fn merge_client_connection_failure_is_server_error() {
    let err = merge_client(&unbound_url(), None)
        .submit(&request())
        .await
        .unwrap_err();

    assert!(matches!(err, MergeError::ServerError(_)), "{err:?}");
}

#[tokio::test]
async fn download_streams_body_into_output_dir() {
    let (base_url, _server) = serve_once("200 OK", "merged-video-bytes").await;
    let temp = TempDir::new().unwrap();
    let delivery = FileDelivery::new(
        HttpArtifactSource::new(loopback_client()),
        temp.path().join("renders"),
    );

    let path = delivery
        .deliver(&format!("{}/out.mp4", base_url))
        .await
        .unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), b"merged-video-bytes");
    assert_eq!(std::fs::read_dir(temp.path().join("renders")).unwrap().count(), 1);
}

#[tokio::test]
async fn download_non_success_status_is_download_failure() {
    let (base_url, _server) = serve_once("404 Not Found", r#"{"error":"gone"}"#).await;
    let temp = TempDir::new().unwrap();
    let delivery = FileDelivery::new(
        HttpArtifactSource::new(loopback_client()),
        temp.path().to_path_buf(),
    );

    let err = delivery
        .deliver(&format!("{}/out.mp4", base_url))
        .await
        .unwrap_err();

    assert!(matches!(err, MergeError::DownloadFailed(_)), "{err:?}");
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn download_connection_failure_is_download_failure() {
    let temp = TempDir::new().unwrap();
    let delivery = FileDelivery::new(
        HttpArtifactSource::new(loopback_client()),
        temp.path().to_path_buf(),
    );

    let err = delivery
        .deliver(&format!("{}/out.mp4", unbound_url()))
        .await
        .unwrap_err();

    assert!(matches!(err, MergeError::DownloadFailed(_)), "{err:?}");
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

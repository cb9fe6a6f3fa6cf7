use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use thiserror::Error;

use crate::classify::types::{ClassifyResponse, Prediction, SelectedScan};
use crate::config::ClassifierConfig;

/// Shown whenever a round trip fails without a service-reported reason.
pub const FALLBACK_ERROR: &str = "An error occurred while classifying.";

const CLASSIFY_PATH: &str = "/classify";

#[derive(Debug, Error)]
enum SubmitError {
    #[error("could not read scan: {0}")]
    Read(#[from] std::io::Error),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Posts scans to `{base_url}/classify` as multipart form data. One reqwest
/// client is shared across all submissions.
#[derive(Clone)]
pub struct ClassifyClient {
    classify_url: String,
    http: reqwest::Client,
}

impl ClassifyClient {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            classify_url: format!("{}{}", config.base_url, CLASSIFY_PATH),
            http: reqwest::Client::new(),
        }
    }

    /// Submit a scan and fold every outcome into a displayable `Prediction`.
    /// Transport and file errors never escape; they become the generic
    /// fallback text, with the cause kept in the log.
    pub async fn classify(&self, scan: &SelectedScan) -> Prediction {
        match self.post_scan(scan).await {
            Ok(prediction) => prediction,
            Err(e) => {
                log::error!("classification of {} failed: {e}", scan.file_name);
                Prediction::Failed(FALLBACK_ERROR.to_string())
            }
        }
    }

    async fn post_scan(&self, scan: &SelectedScan) -> Result<Prediction, SubmitError> {
        let bytes = tokio::fs::read(&scan.path).await?;
        let part = Part::bytes(bytes)
            .file_name(scan.file_name.clone())
            .mime_str(&scan.mime_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&self.classify_url)
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(Self::interpret(status, &body))
    }

    /// Map status and body to a prediction. A `class` field counts only on a
    /// success status; a reported `error` is honored on any status.
    /// Everything else becomes the generic fallback.
    fn interpret(status: StatusCode, body: &str) -> Prediction {
        match serde_json::from_str::<ClassifyResponse>(body) {
            Ok(ClassifyResponse {
                class: Some(label), ..
            }) if status.is_success() => Prediction::Label(label),
            Ok(ClassifyResponse {
                error: Some(reason), ..
            }) => Prediction::Failed(reason),
            Ok(_) => {
                log::warn!("classifier replied {status} without a class or error field");
                Prediction::Failed(FALLBACK_ERROR.to_string())
            }
            Err(e) => {
                log::warn!("classifier replied {status} with an unparseable body: {e}");
                Prediction::Failed(FALLBACK_ERROR.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    struct StubClassifier {
        base_url: String,
        requests: mpsc::Receiver<String>,
        handle: thread::JoinHandle<()>,
    }

    /// Minimal HTTP/1.1 server answering one connection per canned response.
    fn stub_classifier(responses: Vec<(&'static str, &'static str)>) -> StubClassifier {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let _ = tx.send(read_request(&mut stream));
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).unwrap();
            }
        });

        StubClassifier {
            base_url,
            requests: rx,
            handle,
        }
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let header_end = loop {
            let n = stream.read(&mut chunk).unwrap();
            assert!(n > 0, "connection closed before headers were complete");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())?
            })
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = stream.read(&mut chunk).unwrap();
            assert!(n > 0, "connection closed before the body was complete");
            buf.extend_from_slice(&chunk[..n]);
        }

        String::from_utf8_lossy(&buf).into_owned()
    }

    fn client_for(base_url: &str) -> ClassifyClient {
        ClassifyClient::new(&ClassifierConfig::with_base_url(base_url).unwrap())
    }

    fn temp_scan(name: &str, bytes: &[u8]) -> SelectedScan {
        let path = std::env::temp_dir().join(format!("client-{}-{}", std::process::id(), name));
        std::fs::write(&path, bytes).unwrap();
        SelectedScan::from_path(path)
    }

    #[tokio::test]
    async fn success_reply_maps_to_its_label() {
        let stub = stub_classifier(vec![("200 OK", r#"{"class":"glioma"}"#)]);
        let scan = temp_scan("scan.png", b"not really a png");
        let client = client_for(&stub.base_url);

        let prediction = client.classify(&scan).await;
        assert_eq!(prediction, Prediction::Label("glioma".to_string()));

        let request = stub.requests.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(request.starts_with("POST /classify HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("multipart/form-data"));
        assert!(request.contains(r#"name="file""#));
        assert!(request.contains(&format!(r#"filename="{}""#, scan.file_name)));
        assert!(request.to_ascii_lowercase().contains("content-type: image/png"));
        assert!(request.contains("not really a png"));
        stub.handle.join().unwrap();
    }

    #[tokio::test]
    async fn service_error_is_shown_verbatim() {
        let stub = stub_classifier(vec![(
            "500 Internal Server Error",
            r#"{"error":"unsupported format"}"#,
        )]);
        let scan = temp_scan("broken.png", b"corrupt");
        let client = client_for(&stub.base_url);

        let prediction = client.classify(&scan).await;
        assert_eq!(prediction, Prediction::Failed("unsupported format".to_string()));
        stub.handle.join().unwrap();
    }

    #[tokio::test]
    async fn success_without_label_falls_back() {
        let stub = stub_classifier(vec![("200 OK", "{}")]);
        let scan = temp_scan("empty-reply.png", b"scan");
        let client = client_for(&stub.base_url);

        let prediction = client.classify(&scan).await;
        assert_eq!(prediction, Prediction::Failed(FALLBACK_ERROR.to_string()));
        stub.handle.join().unwrap();
    }

    #[tokio::test]
    async fn label_on_error_status_is_not_trusted() {
        let stub = stub_classifier(vec![(
            "503 Service Unavailable",
            r#"{"class":"glioma tumor"}"#,
        )]);
        let scan = temp_scan("untrusted.png", b"scan");
        let client = client_for(&stub.base_url);

        let prediction = client.classify(&scan).await;
        assert_eq!(prediction, Prediction::Failed(FALLBACK_ERROR.to_string()));
        stub.handle.join().unwrap();
    }

    #[tokio::test]
    async fn unparseable_body_falls_back() {
        let stub = stub_classifier(vec![("200 OK", "<html>oops</html>")]);
        let scan = temp_scan("html-reply.png", b"scan");
        let client = client_for(&stub.base_url);

        let prediction = client.classify(&scan).await;
        assert_eq!(prediction, Prediction::Failed(FALLBACK_ERROR.to_string()));
        stub.handle.join().unwrap();
    }

    #[tokio::test]
    async fn unreachable_service_falls_back() {
        let unused_port = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", unused_port.local_addr().unwrap());
        drop(unused_port);

        let scan = temp_scan("offline.png", b"scan");
        let client = client_for(&base_url);

        let prediction = client.classify(&scan).await;
        assert_eq!(prediction, Prediction::Failed(FALLBACK_ERROR.to_string()));
    }

    #[tokio::test]
    async fn unreadable_scan_falls_back_without_a_request() {
        let scan = SelectedScan::from_path("/nowhere/missing.png".into());
        let client = client_for("http://127.0.0.1:1");

        let prediction = client.classify(&scan).await;
        assert_eq!(prediction, Prediction::Failed(FALLBACK_ERROR.to_string()));
    }

    #[tokio::test]
    async fn repeat_submission_of_the_same_scan_is_stable() {
        let stub = stub_classifier(vec![
            ("200 OK", r#"{"class":"no tumor"}"#),
            ("200 OK", r#"{"class":"no tumor"}"#),
        ]);
        let scan = temp_scan("repeat.png", b"same scan bytes");
        let client = client_for(&stub.base_url);

        let first = client.classify(&scan).await;
        let second = client.classify(&scan).await;
        assert_eq!(first, Prediction::Label("no tumor".to_string()));
        assert_eq!(first, second);
        stub.handle.join().unwrap();
    }

    #[test]
    fn label_wins_over_error_on_success_replies() {
        let prediction = ClassifyClient::interpret(
            StatusCode::OK,
            r#"{"class":"no tumor","error":"ignored"}"#,
        );
        assert_eq!(prediction, Prediction::Label("no tumor".to_string()));
    }

    #[test]
    fn reported_error_is_honored_even_on_success_status() {
        let prediction =
            ClassifyClient::interpret(StatusCode::OK, r#"{"error":"model not loaded"}"#);
        assert_eq!(prediction, Prediction::Failed("model not loaded".to_string()));
    }
}

//! HTTP client for the remote OCR endpoint

use anyhow::Context;
use base64::Engine;
use std::path::Path;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use super::{parse_response, OcrOutput, OcrRequest, Recognizer};
use crate::config::OcrSettings;
use crate::error::{AnnotatorError, Result};

/// OCR client posting images to a configured endpoint
pub struct HttpOcrClient {
    client: reqwest::Client,
    runtime: Runtime,
    settings: OcrSettings,
}

impl HttpOcrClient {
    /// Create a client for the endpoint in `settings`
    pub fn new(settings: OcrSettings) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if settings.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(settings.timeout_secs));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;

        Ok(Self {
            client,
            runtime,
            settings,
        })
    }

    /// Build the JSON request body for raw file bytes
    pub fn build_request(&self, bytes: &[u8]) -> OcrRequest {
        OcrRequest {
            file: base64::engine::general_purpose::STANDARD.encode(bytes),
            file_type: self.settings.file_type,
            visualize: self.settings.visualize,
            use_doc_unwarping: self.settings.use_doc_unwarping,
        }
    }

    /// Async recognition
    pub async fn recognize_async(&self, image_path: &Path) -> Result<OcrOutput> {
        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|e| AnnotatorError::ImageDecode {
                path: image_path.to_path_buf(),
                source: image::ImageError::IoError(e),
            })?;

        info!(
            "Sending {:?} ({} bytes) to OCR endpoint {}",
            image_path,
            bytes.len(),
            self.settings.endpoint
        );

        let response = self
            .client
            .post(&self.settings.endpoint)
            .json(&self.build_request(&bytes))
            .send()
            .await
            .map_err(|e| AnnotatorError::transport("failed to send OCR request", e))?;

        let status = response.status();
        let response = response.error_for_status().map_err(|e| {
            AnnotatorError::transport(format!("OCR endpoint returned status {status}"), e)
        })?;

        let text = response
            .text()
            .await
            .map_err(|e| AnnotatorError::transport("failed to read OCR response", e))?;
        debug!("OCR response: {} bytes", text.len());

        let body: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| AnnotatorError::MalformedResponse(format!("body is not JSON: {e}")))?;

        let output = parse_response(&body)?;
        if output.is_empty() {
            warn!("OCR endpoint found no text in {:?}", image_path);
        } else {
            info!("OCR recognized {} regions", output.len());
        }
        Ok(output)
    }
}

impl Recognizer for HttpOcrClient {
    fn recognize(&self, image_path: &Path) -> Result<OcrOutput> {
        self.runtime.block_on(self.recognize_async(image_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;
    use tempfile::TempDir;

    /// Serve exactly one HTTP response on a loopback port, returning the
    /// endpoint URL and a handle yielding the request body that was received.
    fn one_shot_server(status_line: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/ocr", listener.local_addr().unwrap());

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            let header_end = loop {
                let n = stream.read(&mut chunk).unwrap();
                assert!(n > 0, "connection closed before headers");
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .map(|v| v.trim().parse::<usize>().unwrap())
                .unwrap_or(0);

            while buf.len() < header_end + content_length {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();

            String::from_utf8_lossy(&buf[header_end..]).into_owned()
        });

        (url, handle)
    }

    fn client_for(url: String) -> HttpOcrClient {
        HttpOcrClient::new(OcrSettings {
            endpoint: url,
            timeout_secs: 10,
            ..OcrSettings::default()
        })
        .unwrap()
    }

    fn image_file(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("scan.png");
        std::fs::write(&path, b"fake image bytes").unwrap();
        path
    }

    #[test]
    fn test_build_request_encodes_file() {
        let client = client_for("http://localhost:1/ocr".to_string());
        let request = client.build_request(b"hello");
        assert_eq!(request.file, "aGVsbG8=");
        assert_eq!(request.file_type, 1);
        assert!(!request.visualize);
        assert!(!request.use_doc_unwarping);
    }

    #[test]
    fn test_recognize_success() {
        let body = serde_json::json!({
            "result": { "ocrResults": [ { "prunedResult": {
                "dt_polys": [[[0, 0], [10, 0], [10, 10], [0, 10]]],
                "rec_texts": ["Hello"],
                "rec_scores": [0.9]
            } } ] }
        })
        .to_string();
        let (url, server) = one_shot_server("200 OK", body);
        let dir = TempDir::new().unwrap();
        let path = image_file(&dir);

        let output = client_for(url).recognize(&path).unwrap();

        assert_eq!(output.texts, vec!["Hello".to_string()]);
        assert_eq!(output.boxes.len(), 1);

        let sent: serde_json::Value = serde_json::from_str(&server.join().unwrap()).unwrap();
        let expected_file = base64::engine::general_purpose::STANDARD.encode(b"fake image bytes");
        assert_eq!(sent["file"], expected_file.as_str());
        assert_eq!(sent["fileType"], 1);
        assert_eq!(sent["visualize"], false);
        assert_eq!(sent["useDocUnwarping"], false);
    }

    #[test]
    fn test_recognize_error_status_is_transport_error() {
        let (url, server) = one_shot_server("500 Internal Server Error", "{}".to_string());
        let dir = TempDir::new().unwrap();
        let path = image_file(&dir);

        let result = client_for(url).recognize(&path);

        assert!(matches!(result, Err(AnnotatorError::Transport { .. })));
        server.join().unwrap();
    }

    #[test]
    fn test_recognize_missing_rec_texts_is_malformed() {
        let body = serde_json::json!({
            "result": { "ocrResults": [ { "prunedResult": {
                "dt_polys": [[[0, 0], [10, 0], [10, 10], [0, 10]]],
                "rec_scores": [0.9]
            } } ] }
        })
        .to_string();
        let (url, server) = one_shot_server("200 OK", body);
        let dir = TempDir::new().unwrap();
        let path = image_file(&dir);

        let result = client_for(url).recognize(&path);

        assert!(matches!(result, Err(AnnotatorError::MalformedResponse(_))));
        server.join().unwrap();
    }

    #[test]
    fn test_recognize_non_json_body_is_malformed() {
        let (url, server) = one_shot_server("200 OK", "<html>oops</html>".to_string());
        let dir = TempDir::new().unwrap();
        let path = image_file(&dir);

        let result = client_for(url).recognize(&path);

        assert!(matches!(result, Err(AnnotatorError::MalformedResponse(_))));
        server.join().unwrap();
    }

    #[test]
    fn test_recognize_unreachable_endpoint() {
        // Bind and drop to get a port nothing is listening on
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let dir = TempDir::new().unwrap();
        let path = image_file(&dir);

        let result = client_for(format!("http://127.0.0.1:{port}/ocr")).recognize(&path);

        assert!(matches!(result, Err(AnnotatorError::Transport { .. })));
    }

    #[test]
    fn test_recognize_missing_file() {
        let client = client_for("http://127.0.0.1:1/ocr".to_string());
        let result = client.recognize(Path::new("/nonexistent/scan.png"));
        assert!(matches!(result, Err(AnnotatorError::ImageDecode { .. })));
    }
}

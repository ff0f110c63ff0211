//! XML-RPC transports: plain HTTP and raw SCGI sockets.

use async_trait::async_trait;
use regex_lite::Regex;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use url::Url;

use super::TorrentClientError;

static SCGI_HEADER_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*?\n").expect("valid scgi header regex"));

/// Carries an encoded XML-RPC call to the client and returns the raw reply.
#[async_trait]
pub trait XmlRpcTransport: Send + Sync {
    /// Human-readable endpoint for logs.
    fn endpoint(&self) -> String;

    async fn send(&self, body: &str) -> Result<String, TorrentClientError>;
}

/// XML-RPC over HTTP POST.
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: &str, timeout_secs: u32) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl XmlRpcTransport for HttpTransport {
    fn endpoint(&self) -> String {
        self.url.clone()
    }

    async fn send(&self, body: &str) -> Result<String, TorrentClientError> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TorrentClientError::Timeout
                } else {
                    TorrentClientError::ConnectionFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(TorrentClientError::UnexpectedResponse(format!(
                "HTTP {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| TorrentClientError::ConnectionFailed(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ScgiEndpoint {
    Tcp { host: String, port: u16 },
    Unix(PathBuf),
}

/// XML-RPC over SCGI, on a TCP port or a Unix socket.
#[derive(Debug)]
pub struct ScgiTransport {
    endpoint: ScgiEndpoint,
    timeout: Duration,
}

impl ScgiTransport {
    /// Parse `scgi://host:port` or `scgi:///path/to/socket`.
    pub fn from_url(url: &str, timeout_secs: u32) -> Result<Self, TorrentClientError> {
        let parsed = Url::parse(url).map_err(|e| TorrentClientError::InvalidUrl(e.to_string()))?;
        if parsed.scheme() != "scgi" {
            return Err(TorrentClientError::InvalidUrl(format!(
                "expected scgi:// URL, got {}",
                url
            )));
        }

        let endpoint = match parsed.host_str() {
            Some(host) if !host.is_empty() => {
                let port = parsed.port().ok_or_else(|| {
                    TorrentClientError::InvalidUrl(format!("missing port in {}", url))
                })?;
                ScgiEndpoint::Tcp {
                    host: host.to_string(),
                    port,
                }
            }
            _ => {
                if parsed.path().is_empty() || parsed.path() == "/" {
                    return Err(TorrentClientError::InvalidUrl(format!(
                        "missing socket path in {}",
                        url
                    )));
                }
                ScgiEndpoint::Unix(PathBuf::from(parsed.path()))
            }
        };

        Ok(Self {
            endpoint,
            timeout: Duration::from_secs(timeout_secs as u64),
        })
    }

    async fn round_trip(&self, request: &[u8]) -> Result<Vec<u8>, TorrentClientError> {
        let io_error = |e: std::io::Error| TorrentClientError::ConnectionFailed(e.to_string());

        match &self.endpoint {
            ScgiEndpoint::Tcp { host, port } => {
                let stream = TcpStream::connect((host.as_str(), *port))
                    .await
                    .map_err(io_error)?;
                exchange(stream, request).await.map_err(io_error)
            }
            #[cfg(unix)]
            ScgiEndpoint::Unix(path) => {
                let stream = tokio::net::UnixStream::connect(path)
                    .await
                    .map_err(io_error)?;
                exchange(stream, request).await.map_err(io_error)
            }
            #[cfg(not(unix))]
            ScgiEndpoint::Unix(path) => Err(TorrentClientError::InvalidUrl(format!(
                "unix sockets are not supported on this platform: {}",
                path.display()
            ))),
        }
    }
}

#[async_trait]
impl XmlRpcTransport for ScgiTransport {
    fn endpoint(&self) -> String {
        match &self.endpoint {
            ScgiEndpoint::Tcp { host, port } => format!("scgi://{}:{}", host, port),
            ScgiEndpoint::Unix(path) => format!("scgi://{}", path.display()),
        }
    }

    async fn send(&self, body: &str) -> Result<String, TorrentClientError> {
        let request = scgi_request(body.as_bytes());
        let response = tokio::time::timeout(self.timeout, self.round_trip(&request))
            .await
            .map_err(|_| TorrentClientError::Timeout)??;

        if response.is_empty() {
            return Err(TorrentClientError::ConnectionFailed(
                "connection closed without a response".to_string(),
            ));
        }
        split_scgi_response(&String::from_utf8_lossy(&response))
    }
}

async fn exchange<S>(mut stream: S, request: &[u8]) -> std::io::Result<Vec<u8>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(request).await?;
    stream.flush().await?;

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await?;
    Ok(response)
}

/// Frame a body as an SCGI request: a netstring of NUL-separated headers
/// (`CONTENT_LENGTH` first) followed by the body.
fn scgi_request(body: &[u8]) -> Vec<u8> {
    let mut headers = Vec::new();
    for (key, value) in [
        ("CONTENT_LENGTH", body.len().to_string()),
        ("SCGI", "1".to_string()),
    ] {
        headers.extend_from_slice(key.as_bytes());
        headers.push(0);
        headers.extend_from_slice(value.as_bytes());
        headers.push(0);
    }

    let mut request = format!("{}:", headers.len()).into_bytes();
    request.extend_from_slice(&headers);
    request.push(b',');
    request.extend_from_slice(body);
    request
}

/// Drop the CGI-style headers in front of the XML body.
fn split_scgi_response(response: &str) -> Result<String, TorrentClientError> {
    SCGI_HEADER_END
        .find(response)
        .map(|m| response[m.end()..].to_string())
        .ok_or_else(|| {
            TorrentClientError::UnexpectedResponse("could not find response body".to_string())
        })
}

//! Media fetching
//!
//! Downloads whole media files on a small tokio runtime: `http(s)` URLs via
//! reqwest, `file://` URLs and plain paths from disk. Remote bodies are read
//! chunk by chunk under a size cap, and the timeout applies per chunk so a
//! slow but live download is not cut off. Results are handed to a callback so
//! the audio thread never blocks on the network.

use crate::error::{AudioError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

/// Default cap on a single media file (64 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 64 * 1024 * 1024;

/// Fetch configuration
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Connect timeout, and the longest wait for any single body chunk
    pub timeout: Duration,

    /// User agent sent to media hosts
    pub user_agent: String,

    /// Largest media file accepted, in bytes
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("lyra/", env!("CARGO_PKG_VERSION")).to_string(),
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// Where a media URL points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaLocation {
    /// HTTP(S) resource
    Remote(Url),

    /// File on disk
    Local(PathBuf),
}

impl MediaLocation {
    /// Classify a raw URL or path
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AudioError::UnsupportedLocation(String::new()));
        }

        match Url::parse(raw) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(MediaLocation::Remote(url)),
                "file" => url
                    .to_file_path()
                    .map(MediaLocation::Local)
                    .map_err(|()| AudioError::UnsupportedLocation(raw.to_string())),
                // `C:\music\a.mp3` parses with a one-letter scheme
                scheme if scheme.len() == 1 => Ok(MediaLocation::Local(PathBuf::from(raw))),
                _ => Err(AudioError::UnsupportedLocation(raw.to_string())),
            },
            Err(_) => Ok(MediaLocation::Local(PathBuf::from(raw))),
        }
    }

    /// Lowercase file extension, used as a decoder hint
    pub fn extension(&self) -> Option<String> {
        let ext = match self {
            MediaLocation::Remote(url) => {
                let name = url.path_segments()?.next_back()?;
                Path::new(name).extension()?.to_str()?.to_string()
            }
            MediaLocation::Local(path) => path.extension()?.to_str()?.to_string(),
        };
        Some(ext.to_ascii_lowercase())
    }
}

/// Background media downloader
pub struct Fetcher {
    runtime: tokio::runtime::Runtime,
    client: reqwest::Client,
    limits: Limits,
}

/// Per-fetch limits shared with spawned tasks
#[derive(Debug, Clone, Copy)]
struct Limits {
    chunk_timeout: Duration,
    max_bytes: u64,
}

impl Fetcher {
    /// Create a fetcher with its own runtime
    pub fn new(settings: &FetchSettings) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("lyra-fetch")
            .enable_all()
            .build()
            .map_err(|e| AudioError::Runtime(e.to_string()))?;

        let client = reqwest::Client::builder()
            .connect_timeout(settings.timeout)
            .user_agent(settings.user_agent.clone())
            .build()?;

        let limits = Limits {
            chunk_timeout: settings.timeout,
            max_bytes: settings.max_bytes,
        };

        Ok(Self {
            runtime,
            client,
            limits,
        })
    }

    /// Fetch `location` in the background and pass the bytes to `on_done`
    ///
    /// Aborting the returned task drops the request and skips the callback.
    pub fn spawn<F>(&self, location: MediaLocation, on_done: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<Vec<u8>>) + Send + 'static,
    {
        let client = self.client.clone();
        let limits = self.limits;
        self.runtime.spawn(async move {
            on_done(fetch_bytes(&client, &location, limits).await);
        })
    }
}

async fn fetch_bytes(
    client: &reqwest::Client,
    location: &MediaLocation,
    limits: Limits,
) -> Result<Vec<u8>> {
    match location {
        MediaLocation::Remote(url) => fetch_remote(client, url, limits).await,
        MediaLocation::Local(path) => {
            debug!(path = %path.display(), "Reading local media");
            let len = tokio::fs::metadata(path).await?.len();
            if len > limits.max_bytes {
                return Err(AudioError::TooLarge {
                    limit: limits.max_bytes,
                    location: path.display().to_string(),
                });
            }
            Ok(tokio::fs::read(path).await?)
        }
    }
}

async fn fetch_remote(client: &reqwest::Client, url: &Url, limits: Limits) -> Result<Vec<u8>> {
    debug!(url = %url, "Fetching remote media");
    let stalled = || AudioError::Stalled(url.to_string());
    let too_large = || AudioError::TooLarge {
        limit: limits.max_bytes,
        location: url.to_string(),
    };

    let mut response = tokio::time::timeout(limits.chunk_timeout, client.get(url.clone()).send())
        .await
        .map_err(|_| stalled())??;

    let status = response.status();
    if !status.is_success() {
        return Err(AudioError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let declared = response.content_length();
    if declared.is_some_and(|len| len > limits.max_bytes) {
        warn!(url = %url, declared = ?declared, "Media larger than fetch limit");
        return Err(too_large());
    }

    let mut body = Vec::with_capacity(declared.unwrap_or(0) as usize);
    while let Some(chunk) = tokio::time::timeout(limits.chunk_timeout, response.chunk())
        .await
        .map_err(|_| stalled())??
    {
        if (body.len() + chunk.len()) as u64 > limits.max_bytes {
            warn!(url = %url, "Media body exceeded fetch limit");
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_locations() {
        assert!(matches!(
            MediaLocation::parse("https://cdn.test/a.mp4").unwrap(),
            MediaLocation::Remote(_)
        ));
        assert_eq!(
            MediaLocation::parse("/music/a.mp3").unwrap(),
            MediaLocation::Local(PathBuf::from("/music/a.mp3"))
        );
        assert_eq!(
            MediaLocation::parse("relative/a.flac").unwrap(),
            MediaLocation::Local(PathBuf::from("relative/a.flac"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn file_urls_become_paths() {
        assert_eq!(
            MediaLocation::parse("file:///music/a%20b.mp3").unwrap(),
            MediaLocation::Local(PathBuf::from("/music/a b.mp3"))
        );
    }

    #[test]
    fn rejects_unsupported_schemes() {
        assert!(matches!(
            MediaLocation::parse("ftp://host/a.mp3"),
            Err(AudioError::UnsupportedLocation(_))
        ));
        assert!(MediaLocation::parse("   ").is_err());
    }

    #[test]
    fn extension_hint() {
        let remote = MediaLocation::parse("https://cdn.test/x/Song_320.MP4?token=abc").unwrap();
        assert_eq!(remote.extension().as_deref(), Some("mp4"));

        let local = MediaLocation::parse("/music/track.flac").unwrap();
        assert_eq!(local.extension().as_deref(), Some("flac"));

        let bare = MediaLocation::parse("https://cdn.test/stream").unwrap();
        assert_eq!(bare.extension(), None);
    }

    #[test]
    fn fetches_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("media.bin");
        std::fs::write(&path, b"not really audio").unwrap();

        let fetcher = Fetcher::new(&FetchSettings::default()).unwrap();
        let (tx, rx) = crossbeam_channel::bounded(1);
        fetcher.spawn(MediaLocation::Local(path), move |result| {
            tx.send(result).unwrap();
        });

        let bytes = rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
        assert_eq!(bytes, b"not really audio");
    }

    /// Run one fetch to completion, bypassing any proxy set in the environment
    fn fetch_blocking(settings: &FetchSettings, location: MediaLocation) -> Result<Vec<u8>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let limits = Limits {
            chunk_timeout: settings.timeout,
            max_bytes: settings.max_bytes,
        };
        runtime.block_on(fetch_bytes(&client, &location, limits))
    }

    /// Serve one canned HTTP response on loopback
    fn serve_once(head: &'static str, body: Vec<u8>) -> Url {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let _ = socket.write_all(head.as_bytes());
            let _ = socket.write_all(&body);
        });

        Url::parse(&format!("http://{addr}/track.mp3")).unwrap()
    }

    fn small_limit() -> FetchSettings {
        FetchSettings {
            max_bytes: 16,
            timeout: Duration::from_secs(5),
            ..FetchSettings::default()
        }
    }

    #[test]
    fn remote_body_within_limit() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\n",
            b"audio".to_vec(),
        );
        let bytes = fetch_blocking(&small_limit(), MediaLocation::Remote(url)).unwrap();
        assert_eq!(bytes, b"audio");
    }

    #[test]
    fn declared_length_over_limit_is_rejected() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 64\r\nConnection: close\r\n\r\n",
            vec![0; 64],
        );
        let result = fetch_blocking(&small_limit(), MediaLocation::Remote(url));
        assert!(matches!(result, Err(AudioError::TooLarge { limit: 16, .. })));
    }

    #[test]
    fn undeclared_body_over_limit_is_rejected() {
        // No Content-Length: the body runs until the connection closes
        let url = serve_once("HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n", vec![0; 64]);
        let result = fetch_blocking(&small_limit(), MediaLocation::Remote(url));
        assert!(matches!(result, Err(AudioError::TooLarge { .. })));
    }

    #[test]
    fn http_error_status() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            Vec::new(),
        );
        let result = fetch_blocking(&small_limit(), MediaLocation::Remote(url));
        assert!(matches!(result, Err(AudioError::Http { status: 404, .. })));
    }

    #[test]
    fn local_file_over_limit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.mp3");
        std::fs::write(&path, vec![0u8; 64]).unwrap();

        let result = fetch_blocking(&small_limit(), MediaLocation::Local(path));
        assert!(matches!(result, Err(AudioError::TooLarge { limit: 16, .. })));
    }

    #[test]
    fn missing_local_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(&FetchSettings::default()).unwrap();
        let (tx, rx) = crossbeam_channel::bounded(1);
        fetcher.spawn(MediaLocation::Local(dir.path().join("nope.mp3")), move |result| {
            tx.send(result).unwrap();
        });

        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(result, Err(AudioError::Io(_))));
    }
}

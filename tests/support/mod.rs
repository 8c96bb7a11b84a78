use anyhow::{Context, Result};
use serde_json::Value;
use skindex::{SourceKind, SourceLocation, SourceSet};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Directory of source documents that a `SourceSet` can point at.
pub struct FixtureRoot {
    dir: TempDir,
}

impl FixtureRoot {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to allocate fixture dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, kind: SourceKind, document: &Value) -> &Self {
        let path = self.dir.path().join(kind.document_name());
        fs::write(&path, serde_json::to_vec(document).expect("fixture serializes"))
            .expect("failed to write fixture document");
        self
    }

    pub fn write_raw(&self, kind: SourceKind, body: &str) -> &Self {
        fs::write(self.dir.path().join(kind.document_name()), body)
            .expect("failed to write fixture document");
        self
    }

    pub fn sources(&self) -> SourceSet {
        SourceSet::from_root(self.path().to_str().expect("utf-8 temp path"))
            .with_timeout(Duration::from_secs(5))
    }
}

/// Serve one canned HTTP response per connection until the test ends.
///
/// Returns the base URL of the bound loopback port.
pub async fn serve_once_per_request(status_line: &'static str, body: String) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("binding loopback listener")?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let body = body.clone();
            tokio::spawn(async move {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;
                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    Ok(format!("http://{addr}"))
}

/// Like [`serve_once_per_request`] with status 200, but every response is
/// held back for `delay` first.
pub async fn serve_delayed(delay: Duration, body: String) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("binding loopback listener")?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let body = body.clone();
            tokio::spawn(async move {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;
                tokio::time::sleep(delay).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    Ok(format!("http://{addr}"))
}

/// Accept connections and read the request, but never answer.
pub async fn serve_silent() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("binding loopback listener")?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;
                tokio::time::sleep(Duration::from_secs(3600)).await;
                drop(socket);
            });
        }
    });
    Ok(format!("http://{addr}"))
}

pub fn http(url: String) -> SourceLocation {
    SourceLocation::Http(url)
}

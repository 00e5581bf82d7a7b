//! Test daemon management.
//!
//! Spawns and manages cachewatch instances for integration testing.

use std::path::PathBuf;
use std::process::{Child, Command};
use std::time::Duration;
use tokio::time::sleep;

/// A test daemon instance.
pub struct TestDaemon {
    child: Child,
    port: u16,
    data_dir: PathBuf,
    http: reqwest::Client,
}

impl TestDaemon {
    /// Spawn a daemon serving HTTP on `port` with one local and one
    /// clustered cache.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        let data_dir = std::env::temp_dir().join(format!("cachewatch-test-{}", port));
        std::fs::create_dir_all(&data_dir)?;

        let config_path = data_dir.join("cachewatch.toml");
        let config_content = format!(
            r#"
[server]
name = "test.cachewatch"
metrics_port = {}
bind = "127.0.0.1"

[[container]]
name = "local"

[[container.cache]]
name = "default"

[[container]]
name = "clustered"

[[container.cache]]
name = "default"
clustered = true
stages = ["transactions", "management"]
concurrency_level = 64
version = "9.4.0"
"#,
            port
        );
        std::fs::write(&config_path, config_content)?;

        let child = Command::new(env!("CARGO_BIN_EXE_cachewatch"))
            .arg(&config_path)
            .env("RUST_LOG", "warn")
            .spawn()?;

        let daemon = Self {
            child,
            port,
            data_dir,
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()?,
        };

        // Wait for the HTTP surface to start listening
        daemon.wait_until_ready().await?;

        Ok(daemon)
    }

    /// Wait until the daemon is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Daemon failed to start within 5 seconds")
    }

    /// Get the daemon address.
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// GET a path on this daemon.
    pub async fn get(&self, path: &str) -> anyhow::Result<reqwest::Response> {
        let url = format!("http://{}{}", self.address(), path);
        Ok(self.http.get(url).send().await?)
    }

    /// GET a path and return the status code with the JSON body.
    pub async fn get_json(&self, path: &str) -> anyhow::Result<(u16, serde_json::Value)> {
        let response = self.get(path).await?;
        let status = response.status().as_u16();
        Ok((status, response.json::<serde_json::Value>().await?))
    }
}

impl Drop for TestDaemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}

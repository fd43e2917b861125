use crate::Result;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

/// Test fixture for a disposable, single-node Redis server.
pub struct RedisServer {
    container: ContainerAsync<GenericImage>,
}

impl RedisServer {
    pub async fn new() -> Result<Self> {
        Self::start(None).await
    }

    /// Starts Redis with `requirepass` set.
    pub async fn with_password(password: &str) -> Result<Self> {
        Self::start(Some(password)).await
    }

    async fn start(password: Option<&str>) -> Result<Self> {
        let image = GenericImage::new("redis", "8.6.0")
            .with_exposed_port(6379_u16.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"));

        let container = match password {
            Some(password) => {
                image
                    .with_cmd(["redis-server", "--requirepass", password])
                    .start()
                    .await?
            }
            None => image.start().await?,
        };

        Ok(Self { container })
    }

    pub async fn host(&self) -> Result<String> {
        let host = self.container.get_host().await?.to_string();

        Ok(match host.as_str() {
            "localhost" => String::from("127.0.0.1"),
            _ => host,
        })
    }

    pub async fn port(&self) -> Result<u16> {
        Ok(self.container.get_host_port_ipv4(6379).await?)
    }

    /// Returns `host:port`, the form the gateway's `REDIS_URL` takes.
    pub async fn address(&self) -> Result<String> {
        Ok(format!("{}:{}", self.host().await?, self.port().await?))
    }

    /// Returns the underlying container reference.
    pub fn container(&self) -> &ContainerAsync<GenericImage> {
        &self.container
    }
}

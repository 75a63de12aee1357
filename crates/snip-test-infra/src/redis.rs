use crate::Result;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};

/// Test fixture for a single disposable Redis server.
pub struct RedisServer {
    container: ContainerAsync<GenericImage>,
}

impl RedisServer {
    pub async fn new() -> Result<Self> {
        let container = GenericImage::new("redis", "8.6.0")
            .with_exposed_port(6379_u16.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"))
            .start()
            .await?;
        Ok(Self { container })
    }

    pub async fn host(&self) -> Result<String> {
        let host = self.container.get_host().await?.to_string();

        match host.as_str() {
            "localhost" => Ok(String::from("127.0.0.1")),
            _ => Ok(host),
        }
    }

    pub async fn port(&self) -> Result<u16> {
        Ok(self.container.get_host_port_ipv4(6379).await?)
    }

    /// A `redis://` URL for the server.
    pub async fn url(&self) -> Result<String> {
        Ok(format!("redis://{}:{}", self.host().await?, self.port().await?))
    }

    /// Opens a multiplexed connection to the server.
    pub async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        let client = redis::Client::open(self.url().await?)?;
        Ok(client.get_multiplexed_async_connection().await?)
    }
}

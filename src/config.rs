use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};

/// How the accept loop waits for clients.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcceptMode {
    /// Suspend until a client connects.
    Blocking,
    /// Never suspend; retry immediately on would-block.
    NonBlocking,
}

/// How the read loop decides a request is complete.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestFraming {
    /// Stop on the first read shorter than the chunk size.
    ShortRead,
    /// Stop once the announced content-length worth of body has arrived.
    ContentLength,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,

    pub accept_mode: AcceptMode,
    pub framing: RequestFraming,

    /// Transient-failure retry caps for accept and read. `None` retries
    /// forever, which is the historical behavior.
    pub max_accept_retries: Option<u32>,
    pub max_read_retries: Option<u32>,

    pub document_root: String,
    pub server_name: String,

    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,

            accept_mode: AcceptMode::Blocking,
            framing: RequestFraming::ShortRead,

            max_accept_retries: None,
            max_read_retries: None,

            document_root: "./".to_string(),
            server_name: "simplehttpd/0.1".to_string(),

            debug: false,
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: &str) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                eprintln!("Fail to read {}: {err}", path);
                eprintln!("Fall back to default config");
                return ServerConfig::default();
            }
        };

        match toml::from_str::<ServerConfig>(content.as_str()) {
            Ok(server_config) => server_config,
            Err(err) => {
                eprintln!("Fail to deserialize config file {}: {err}", path);
                eprintln!("Fall back to default config");
                ServerConfig::default()
            }
        }
    }
}

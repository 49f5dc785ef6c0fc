use crate::transport::TransportConfig;
use relaymesh_core::{IceServerConfig, RoomLinkTemplate};
use thiserror::Error;
use url::Url;

pub const DEFAULT_RELAY_URL: &str = "ws://127.0.0.1:3000/signal";
pub const DEFAULT_UPLOAD_URL: &str = "http://127.0.0.1:3000/api/interview/answer-video";
pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:5173";
pub const DEFAULT_PATH: &str = "/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not a valid URL ({value}): {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{name} must use one of {expected:?}, got {scheme}")]
    UnsupportedScheme {
        name: &'static str,
        scheme: String,
        expected: &'static [&'static str],
    },
}

/// Endpoints and ICE servers for one client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub relay_url: String,
    pub upload_url: String,
    pub links: RoomLinkTemplate,
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_owned(),
            upload_url: DEFAULT_UPLOAD_URL.to_owned(),
            links: RoomLinkTemplate::new(DEFAULT_ORIGIN, DEFAULT_PATH),
            ice_servers: TransportConfig::default().ice_servers,
        }
    }
}

impl ClientConfig {
    /// Reads `RELAYMESH_*` and `TURN_*` variables, keeping defaults for
    /// anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_owned())
        };

        let relay_url = get("RELAYMESH_RELAY_URL", DEFAULT_RELAY_URL);
        let upload_url = get("RELAYMESH_UPLOAD_URL", DEFAULT_UPLOAD_URL);
        let origin = get("RELAYMESH_ORIGIN", DEFAULT_ORIGIN);
        let path = get("RELAYMESH_PATH", DEFAULT_PATH);

        let ice_servers = match lookup("TURN_URL").filter(|v| !v.trim().is_empty()) {
            Some(url) => {
                let mut servers = TransportConfig::default().ice_servers;
                servers.push(IceServerConfig {
                    urls: vec![url],
                    username: lookup("TURN_USERNAME"),
                    credential: lookup("TURN_CREDENTIAL"),
                });
                servers
            }
            None => TransportConfig::default().ice_servers,
        };

        let config = Self {
            relay_url,
            upload_url,
            links: RoomLinkTemplate::new(origin, path),
            ice_servers,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("RELAYMESH_RELAY_URL", &self.relay_url, &["ws", "wss"])?;
        check_url("RELAYMESH_UPLOAD_URL", &self.upload_url, &["http", "https"])?;
        check_url("RELAYMESH_ORIGIN", self.links.origin(), &["http", "https"])?;
        Ok(())
    }

    pub fn upload_endpoint(&self) -> Result<Url, ConfigError> {
        check_url("RELAYMESH_UPLOAD_URL", &self.upload_url, &["http", "https"])
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            ice_servers: self.ice_servers.clone(),
        }
    }
}

fn check_url(
    name: &'static str,
    value: &str,
    expected: &'static [&'static str],
) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        name,
        value: value.to_owned(),
        source,
    })?;
    if !expected.contains(&url.scheme()) {
        return Err(ConfigError::UnsupportedScheme {
            name,
            scheme: url.scheme().to_owned(),
            expected,
        });
    }
    Ok(url)
}

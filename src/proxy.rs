use std::time::Duration;

use reqwest::{Client, Proxy};

use crate::error::InputError;

const SCHEMES: [&str; 3] = ["http://", "https://", "socks5://"];
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Prefix `http://` onto proxies given without a supported scheme.
pub fn normalize_proxy(raw: &str) -> String {
    let proxy = raw.trim();
    if SCHEMES.iter().any(|scheme| proxy.starts_with(scheme)) {
        proxy.to_string()
    } else {
        format!("http://{proxy}")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProxyPool {
    proxies: Vec<String>,
}

impl ProxyPool {
    /// Build a pool that can serve `accounts` key-file slots.
    pub fn new(lines: &[String], accounts: usize) -> Result<Self, InputError> {
        let proxies: Vec<String> = lines
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| normalize_proxy(line))
            .collect();
        if proxies.is_empty() {
            return Err(InputError::EmptyProxyList);
        }
        if proxies.len() < accounts {
            return Err(InputError::NotEnoughProxies {
                keys: accounts,
                proxies: proxies.len(),
            });
        }
        Ok(Self { proxies })
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn for_slot(&self, slot: usize) -> Option<&str> {
        if self.proxies.is_empty() {
            None
        } else {
            Some(&self.proxies[slot % self.proxies.len()])
        }
    }
}

/// HTTP client for task claiming, routed through `proxy` when given.
pub fn http_client(proxy: Option<&str>) -> Result<Client, InputError> {
    let mut builder = Client::builder().timeout(HTTP_TIMEOUT);
    if let Some(proxy_url) = proxy {
        let proxy = Proxy::all(proxy_url).map_err(|e| InputError::InvalidProxy {
            proxy: proxy_url.to_string(),
            message: e.to_string(),
        })?;
        builder = builder.proxy(proxy);
    }
    builder.build().map_err(|e| InputError::InvalidProxy {
        proxy: proxy.unwrap_or("none").to_string(),
        message: e.to_string(),
    })
}

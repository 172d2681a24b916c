use anyhow::Result;
use reqwest::Client;
use serde::Serialize;

use crate::http_client::probe_client;

/// Payload for a discovered subdomain.
#[derive(Debug, Clone, Serialize)]
pub struct SubdomainHit {
    pub url: String,
    pub status: u16,
}

/// Probes `{label}.{domain}` over HTTPS then HTTP.
#[derive(Clone)]
pub struct SubdomainScanner {
    client: Client,
    domain: String,
}

impl SubdomainScanner {
    pub fn new(domain: &str, timeout_secs: u64) -> Self {
        Self {
            client: probe_client(timeout_secs),
            domain: domain.to_string(),
        }
    }

    /// Success is any response below 400 on either scheme. Connection
    /// failures are misses, not errors: a label that doesn't resolve is the
    /// expected case, not a fault.
    pub async fn check(&self, label: &str) -> Result<Option<SubdomainHit>> {
        for scheme in ["https", "http"] {
            let url = format!("{scheme}://{label}.{domain}", domain = self.domain);
            match self.client.get(&url).send().await {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if status < 400 {
                        return Ok(Some(SubdomainHit {
                            url: resp.url().to_string(),
                            status,
                        }));
                    }
                }
                Err(_) => continue,
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unresolvable_label_is_a_miss() {
        let scanner = SubdomainScanner::new("invalid.test", 2);
        let hit = scanner.check("nosuchlabel").await.unwrap();
        assert!(hit.is_none());
    }
}

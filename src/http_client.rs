use std::time::Duration;

use reqwest::{Client, ClientBuilder};

/// HTTP client tuned for high-volume probing: pooled connections, short
/// connect timeout, invalid certs accepted (targets in a pentest scope
/// frequently present self-signed or mismatched certificates).
pub fn probe_client(timeout_secs: u64) -> Client {
    ClientBuilder::new()
        .pool_max_idle_per_host(100)
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .tcp_nodelay(true)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(5)))
        .gzip(true)
        .brotli(true)
        .use_rustls_tls()
        .redirect(reqwest::redirect::Policy::limited(5))
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .danger_accept_invalid_certs(true)
        .build()
        .expect("reqwest client options are static and valid")
}

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;

/// Best-effort names for well-known ports, roughly the /etc/services entries
/// a scan is likely to hit.
static SERVICE_NAMES: Lazy<HashMap<u16, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (21, "ftp"),
        (22, "ssh"),
        (23, "telnet"),
        (25, "smtp"),
        (53, "domain"),
        (80, "http"),
        (110, "pop3"),
        (111, "rpcbind"),
        (135, "msrpc"),
        (139, "netbios-ssn"),
        (143, "imap"),
        (443, "https"),
        (445, "microsoft-ds"),
        (465, "smtps"),
        (587, "submission"),
        (993, "imaps"),
        (995, "pop3s"),
        (1433, "ms-sql-s"),
        (1521, "oracle"),
        (2049, "nfs"),
        (3306, "mysql"),
        (3389, "ms-wbt-server"),
        (5432, "postgresql"),
        (5900, "vnc"),
        (6379, "redis"),
        (8080, "http-proxy"),
        (8443, "https-alt"),
        (9200, "elasticsearch"),
        (11211, "memcached"),
        (27017, "mongodb"),
    ])
});

pub fn service_name(port: u16) -> &'static str {
    SERVICE_NAMES.get(&port).copied().unwrap_or("unknown")
}

/// Payload for an open port.
#[derive(Debug, Clone, Serialize)]
pub struct OpenPort {
    pub port: u16,
    pub service: &'static str,
    pub banner: Option<String>,
}

/// Resolve a hostname or IP literal to a single address, up front.
/// Resolution failure aborts the scan before any probes run.
pub async fn resolve_target(host: &str) -> Result<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }
    let mut addrs = lookup_host(format!("{host}:0"))
        .await
        .with_context(|| format!("cannot resolve hostname '{host}'"))?;
    match addrs.next() {
        Some(addr) => Ok(addr.ip()),
        None => bail!("hostname '{host}' resolved to no addresses"),
    }
}

/// TCP connect probe. Open ports yield a payload with a best-effort banner;
/// refused/filtered/timed-out connects are plain misses.
pub async fn probe_port(
    ip: IpAddr,
    port: u16,
    connect_timeout: Duration,
) -> Result<Option<OpenPort>> {
    let stream = match timeout(connect_timeout, TcpStream::connect((ip, port))).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(_)) | Err(_) => return Ok(None),
    };

    let banner = grab_banner(stream).await;
    Ok(Some(OpenPort {
        port,
        service: service_name(port),
        banner,
    }))
}

/// Read whatever the service volunteers in the first 500ms.
async fn grab_banner(mut stream: TcpStream) -> Option<String> {
    let mut buf = [0u8; 1024];
    let n = match timeout(Duration::from_millis(500), stream.read(&mut buf)).await {
        Ok(Ok(n)) if n > 0 => n,
        _ => return None,
    };
    let text = String::from_utf8_lossy(&buf[..n]);
    let cleaned = clean_banner(&text);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Collapse whitespace and cap length so banners fit on one report line.
fn clean_banner(raw: &str) -> String {
    let mut cleaned: String = raw
        .split_whitespace()
        .take(10)
        .collect::<Vec<_>>()
        .join(" ");
    if cleaned.len() > 50 {
        cleaned.truncate(47);
        cleaned.push_str("...");
    }
    cleaned
}

/// Parse a `start-end` or single-port range spec, validated to 1..=65535.
pub fn parse_port_range(spec: &str) -> Result<(u16, u16)> {
    let (start, end) = match spec.split_once('-') {
        Some((a, b)) => (
            a.trim().parse::<u16>().context("invalid start port")?,
            b.trim().parse::<u16>().context("invalid end port")?,
        ),
        None => {
            let p = spec.trim().parse::<u16>().context("invalid port")?;
            (p, p)
        }
    };
    if start == 0 || end == 0 {
        bail!("ports must be in 1-65535");
    }
    if start > end {
        bail!("start port {start} is greater than end port {end}");
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_service_names() {
        assert_eq!(service_name(22), "ssh");
        assert_eq!(service_name(443), "https");
        assert_eq!(service_name(49999), "unknown");
    }

    #[test]
    fn banner_cleanup() {
        assert_eq!(clean_banner("SSH-2.0-OpenSSH_9.6\r\n"), "SSH-2.0-OpenSSH_9.6");
        let long = "x".repeat(200);
        assert_eq!(clean_banner(&long).len(), 50);
        assert_eq!(clean_banner("  \r\n\t "), "");
    }

    #[test]
    fn port_range_parsing() {
        assert_eq!(parse_port_range("1-1024").unwrap(), (1, 1024));
        assert_eq!(parse_port_range("8080").unwrap(), (8080, 8080));
        assert!(parse_port_range("0-10").is_err());
        assert!(parse_port_range("100-5").is_err());
        assert!(parse_port_range("1-70000").is_err());
    }

    #[tokio::test]
    async fn resolve_ip_literal() {
        let ip = resolve_target("127.0.0.1").await.unwrap();
        assert_eq!(ip, "127.0.0.1".parse::<IpAddr>().unwrap());
    }

    #[tokio::test]
    async fn closed_port_is_a_miss() {
        // Bind a listener to learn a free port, then probe one past it
        // unbound; either way a refused connect must be a miss, not an error.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open_port = listener.local_addr().unwrap().port();
        let ip: IpAddr = "127.0.0.1".parse().unwrap();

        let hit = probe_port(ip, open_port, Duration::from_millis(500))
            .await
            .unwrap();
        assert!(hit.is_some());

        drop(listener);
        let miss = probe_port(ip, open_port, Duration::from_millis(500))
            .await
            .unwrap();
        assert!(miss.is_none());
    }
}

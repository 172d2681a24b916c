use std::net::IpAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::TokioAsyncResolver;

/// Record types queried when the user doesn't pick their own.
pub const DEFAULT_RECORD_TYPES: &[&str] = &["A", "AAAA", "TXT", "SOA", "MX", "CNAME", "NS", "SRV"];

/// Shared resolver handle; hickory's resolver is safe to share across
/// concurrent lookups.
#[derive(Clone)]
pub struct DnsEnumerator {
    resolver: Arc<TokioAsyncResolver>,
    domain: String,
}

impl DnsEnumerator {
    pub fn new(domain: &str, nameserver: Option<IpAddr>) -> Self {
        let config = match nameserver {
            Some(ip) => ResolverConfig::from_parts(
                None,
                vec![],
                NameServerConfigGroup::from_ips_clear(&[ip], 53, true),
            ),
            None => ResolverConfig::default(),
        };
        let resolver = TokioAsyncResolver::tokio(config, ResolverOpts::default());
        Self {
            resolver: Arc::new(resolver),
            domain: domain.to_string(),
        }
    }

    /// Probe one record type. No records of that type is a plain miss;
    /// NXDOMAIN and transport failures surface as probe errors.
    pub async fn query(&self, record_type: RecordType) -> Result<Option<Vec<String>>> {
        match self.resolver.lookup(self.domain.clone(), record_type).await {
            Ok(lookup) => {
                let records: Vec<String> = lookup.iter().map(|r| r.to_string()).collect();
                if records.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(records))
                }
            }
            Err(e) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => Ok(None),
                _ => Err(e).with_context(|| format!("{record_type} lookup failed")),
            },
        }
    }
}

/// Parse user-supplied record type names up front so a typo aborts before
/// any queries run.
pub fn parse_record_types(names: &[String]) -> Result<Vec<RecordType>> {
    names
        .iter()
        .map(|name| {
            name.trim()
                .to_uppercase()
                .parse::<RecordType>()
                .with_context(|| format!("unknown DNS record type '{name}'"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_parsing() {
        let types = parse_record_types(&["a".into(), "MX".into(), " txt ".into()]).unwrap();
        assert_eq!(types, vec![RecordType::A, RecordType::MX, RecordType::TXT]);

        assert!(parse_record_types(&["NOPE".into()]).is_err());
    }

    #[test]
    fn defaults_parse() {
        let names: Vec<String> = DEFAULT_RECORD_TYPES.iter().map(|s| s.to_string()).collect();
        assert_eq!(parse_record_types(&names).unwrap().len(), 8);
    }
}

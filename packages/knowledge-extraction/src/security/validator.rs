//! SSRF guard for outbound page fetches.

use std::collections::HashSet;
use std::net::IpAddr;

use ipnet::IpNet;
use url::{Host, Url};

use crate::error::{SecurityError, SecurityResult};

/// Private, loopback, link-local and metadata ranges.
const DEFAULT_BLOCKED_CIDRS: &[&str] = &[
    "0.0.0.0/8",
    "10.0.0.0/8",
    "100.64.0.0/10",
    "127.0.0.0/8",
    "169.254.0.0/16",
    "172.16.0.0/12",
    "192.168.0.0/16",
    "::1/128",
    "fc00::/7",
    "fe80::/10",
];

const DEFAULT_BLOCKED_HOSTS: &[&str] = &[
    "localhost",
    "metadata.google.internal",
    "metadata.gke.internal",
    "instance-data",
];

/// Decides whether a search result URL may be fetched.
///
/// Only `http`/`https` URLs are allowed, and hosts that name or resolve to
/// internal addresses are refused.
#[derive(Debug, Clone)]
pub struct UrlValidator {
    allowed_schemes: HashSet<String>,
    blocked_hosts: HashSet<String>,
    blocked_cidrs: Vec<IpNet>,
    /// Hosts exempt from every check (test servers)
    allowed_hosts: HashSet<String>,
}

impl Default for UrlValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlValidator {
    pub fn new() -> Self {
        Self {
            allowed_schemes: ["http", "https"].into_iter().map(String::from).collect(),
            blocked_hosts: DEFAULT_BLOCKED_HOSTS.iter().map(|h| h.to_string()).collect(),
            blocked_cidrs: DEFAULT_BLOCKED_CIDRS
                .iter()
                .filter_map(|c| c.parse().ok())
                .collect(),
            allowed_hosts: HashSet::new(),
        }
    }

    /// Exempt a host from validation.
    pub fn allow_host(mut self, host: impl Into<String>) -> Self {
        self.allowed_hosts.insert(host.into().to_ascii_lowercase());
        self
    }

    pub fn block_host(mut self, host: impl Into<String>) -> Self {
        self.blocked_hosts.insert(host.into().to_ascii_lowercase());
        self
    }

    pub fn block_cidr(mut self, cidr: IpNet) -> Self {
        self.blocked_cidrs.push(cidr);
        self
    }

    fn check_ip(&self, ip: IpAddr) -> SecurityResult<()> {
        match self.blocked_cidrs.iter().find(|net| net.contains(&ip)) {
            Some(_) => Err(SecurityError::BlockedCidr(ip.to_string())),
            None => Ok(()),
        }
    }

    /// Validate a URL without touching the network.
    ///
    /// Returns the parsed URL on success.
    pub fn validate(&self, url: &str) -> SecurityResult<Url> {
        let parsed = Url::parse(url)?;

        if !self.allowed_schemes.contains(parsed.scheme()) {
            return Err(SecurityError::DisallowedScheme(parsed.scheme().to_string()));
        }

        let host = parsed.host().ok_or(SecurityError::NoHost)?;
        let name = host.to_string().to_ascii_lowercase();
        if self.allowed_hosts.contains(&name) {
            return Ok(parsed);
        }
        if self.blocked_hosts.contains(&name) || name.ends_with(".localhost") {
            return Err(SecurityError::BlockedHost(name));
        }

        match host {
            Host::Ipv4(ip) => self.check_ip(IpAddr::V4(ip))?,
            Host::Ipv6(ip) => self.check_ip(IpAddr::V6(ip))?,
            Host::Domain(_) => {}
        }

        Ok(parsed)
    }

    /// Validate a URL and check every address its host resolves to.
    ///
    /// Catches public names pointing at internal addresses.
    pub async fn validate_with_dns(&self, url: &str) -> SecurityResult<Url> {
        let parsed = self.validate(url)?;

        let Some(Host::Domain(domain)) = parsed.host() else {
            return Ok(parsed);
        };
        if self.allowed_hosts.contains(&domain.to_ascii_lowercase()) {
            return Ok(parsed);
        }

        let port = parsed.port_or_known_default().unwrap_or(80);
        let addrs = tokio::net::lookup_host((domain, port))
            .await
            .map_err(|e| SecurityError::DnsResolution(format!("{domain}: {e}")))?;

        for addr in addrs {
            self.check_ip(addr.ip()).map_err(|_| {
                SecurityError::BlockedCidr(format!("{domain} resolved to {}", addr.ip()))
            })?;
        }

        Ok(parsed)
    }
}

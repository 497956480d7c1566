//! Hostname resolution restricted to IPv4 answers.

use std::net::{SocketAddr, ToSocketAddrs};

use log::{debug, warn};

use floe_protocol::Ipv4Address;

/// The transport the caller intends to reach the resolved addresses over.
///
/// The platform resolver hands back the same IPv4 answer set for both
/// transports, so the hint participates in diagnostics rather than
/// filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceHint {
    Udp,
    Tcp,
}

impl ServiceHint {
    fn name(self) -> &'static str {
        match self {
            ServiceHint::Udp => "udp",
            ServiceHint::Tcp => "tcp",
        }
    }
}

/// Returns every IPv4 address the platform resolver offers for `host` on
/// `port`, duplicates preserved.
///
/// The empty list is the ordinary "no match" result rather than an error;
/// resolver failures are logged and collapse into it as well.
pub fn resolve(host: &str, port: u16, hint: ServiceHint) -> Vec<Ipv4Address> {
    let answers = match (host, port).to_socket_addrs() {
        Ok(answers) => answers,
        Err(error) => {
            warn!("resolving '{host}' failed: {error}");
            return Vec::new();
        }
    };

    let candidates: Vec<Ipv4Address> = answers
        .filter_map(|answer| match answer {
            SocketAddr::V4(addr) => Some(Ipv4Address::from(addr)),
            SocketAddr::V6(_) => None,
        })
        .collect();

    if candidates.is_empty() {
        debug!("no IPv4 {} addresses found for '{host}'", hint.name());
    } else {
        debug!(
            "found {} IPv4 {} addresses for '{host}'",
            candidates.len(),
            hint.name()
        );
    }
    candidates
}

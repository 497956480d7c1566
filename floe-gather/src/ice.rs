//! ICE-style candidate gathering: local host addresses plus
//! server-reflexive endpoints learned from STUN Binding responses.

use std::net::IpAddr;
use std::time::Duration;

use log::{debug, info, warn};

use floe_protocol::attributes::{self, StunAttribute};
use floe_protocol::{
    ByteReader, ByteWriter, Ipv4Address, MessageClass, MessageMethod, RandomSource, StunMessage,
};

use crate::dns::{self, ServiceHint};
use crate::socket::{ReadySet, UdpChannel};

/// Well-known public STUN servers probed by default.
pub const DEFAULT_STUN_SERVERS: [&str; 7] = [
    "stun.12connect.com",
    "stun.12voip.com",
    "stun.1und1.de",
    "stun.2talk.co.nz",
    "stun.2talk.com",
    "stun.3clogic.com",
    "stun.3cx.com",
];

/// The registered STUN port.
pub const STUN_PORT: u16 = 3478;

/// Per-probe packet buffer size; a Binding exchange with a handful of
/// address attributes fits.
const PACKET_BYTES: usize = 92;

/// Which servers to probe and how long each readiness wait may take.
///
/// The timeout applies per wait cycle, not cumulatively across the whole
/// gather.
#[derive(Debug, Clone)]
pub struct GatherConfig {
    pub servers: Vec<(String, u16)>,
    pub wait_timeout: Duration,
}

impl Default for GatherConfig {
    fn default() -> Self {
        Self {
            servers: DEFAULT_STUN_SERVERS
                .iter()
                .map(|server| (server.to_string(), STUN_PORT))
                .collect(),
            wait_timeout: Duration::from_micros(1_000_000),
        }
    }
}

/// Enumerates the local machine's IPv4 interface addresses, loopback
/// excluded, as candidates with port 0.
pub fn discover_host_candidates() -> Vec<Ipv4Address> {
    let interfaces = match local_ip_address::list_afinet_netifas() {
        Ok(interfaces) => interfaces,
        Err(error) => {
            warn!("enumerating local interfaces failed: {error}");
            return Vec::new();
        }
    };

    let mut candidates = Vec::new();
    for (name, address) in interfaces {
        let IpAddr::V4(v4) = address else {
            debug!("skipping non-IPv4 address on interface '{name}'");
            continue;
        };
        if v4.is_loopback() {
            continue;
        }
        debug!("host candidate {v4} on interface '{name}'");
        candidates.push(Ipv4Address::new(u32::from(v4), 0));
    }
    candidates
}

/// Probes every resolved server IP with a STUN Binding request and harvests
/// the mapped addresses out of the success responses.
///
/// One socket and one fresh request per resolved IP; duplicate server IPs
/// get duplicate probes. Each socket is retired after its first ready
/// event, so a second response to the same probe is lost. The gather ends
/// when every probe has been answered or a wait cycle times out with
/// nothing ready.
pub fn discover_server_candidates(
    config: &GatherConfig,
    rng: &mut RandomSource,
) -> Vec<Ipv4Address> {
    let mut set = match ReadySet::new() {
        Ok(set) => set,
        Err(error) => {
            warn!("creating the readiness set failed: {error}");
            return Vec::new();
        }
    };

    for (server, port) in &config.servers {
        let addresses = dns::resolve(server, *port, ServiceHint::Udp);
        if addresses.is_empty() {
            continue;
        }
        for address in addresses {
            if let Err(error) = send_binding_probe(&mut set, server, address, rng) {
                warn!("probing '{server}' at {address} failed: {error}");
            }
        }
    }

    let mut candidates = Vec::new();
    while !set.is_empty() {
        let ready = match set.wait(config.wait_timeout) {
            Ok(ready) => ready,
            Err(error) => {
                warn!("waiting for responses failed: {error}");
                break;
            }
        };
        if ready.is_empty() {
            info!(
                "timed out with {} probe(s) still unanswered",
                set.len()
            );
            break;
        }
        for token in ready {
            let Some(channel) = set.remove(token) else {
                continue;
            };
            collect_response(&channel, &mut candidates);
        }
    }
    candidates
}

fn send_binding_probe(
    set: &mut ReadySet,
    server: &str,
    address: Ipv4Address,
    rng: &mut RandomSource,
) -> std::io::Result<()> {
    let channel = UdpChannel::open()?;

    let mut request = StunMessage::new(MessageClass::Request, MessageMethod::Binding);
    request.randomize_transaction_id(rng);

    let mut writer = ByteWriter::new(PACKET_BYTES);
    // A bare Binding request always fits the probe buffer.
    let size = match request.write_into(&mut writer) {
        Ok(size) => size,
        Err(error) => {
            warn!("serializing the Binding request failed: {error}");
            return Ok(());
        }
    };

    channel.send_to(&writer.data()[..size], address)?;
    info!("sent Binding request to '{server}' at {address}");
    set.insert(channel)?;
    Ok(())
}

/// Receives and decodes one response, appending any mapped address to the
/// candidate list. Malformed or non-Binding-success packets are logged and
/// dropped.
fn collect_response(channel: &UdpChannel, candidates: &mut Vec<Ipv4Address>) {
    let mut buf = [0u8; PACKET_BYTES];
    let (count, peer) = match channel.recv_from(&mut buf) {
        Ok(Some(received)) => received,
        Ok(None) => return,
        Err(error) => {
            warn!("receiving a response failed: {error}");
            return;
        }
    };

    let mut reader = ByteReader::new(&buf[..count]);
    let response = match StunMessage::read_from(&mut reader) {
        Ok(response) => response,
        Err(error) => {
            info!("dropping malformed packet from {peer}: {error}");
            return;
        }
    };

    if response.class() != MessageClass::SuccessResponse
        || response.method() != MessageMethod::Binding
    {
        info!(
            "dropping response from {peer} with class {:?}, method {:?}",
            response.class(),
            response.method()
        );
        return;
    }
    info!("Binding request to {peer} succeeded");

    for attribute in response.attributes() {
        log_attribute(peer, attribute);
        match attribute {
            StunAttribute::Address {
                attribute_type: attributes::MAPPED_ADDRESS,
                address,
            } => candidates.push(*address),
            StunAttribute::XorAddress { address } => candidates.push(*address),
            _ => {}
        }
    }
    for raw in response.unknown_attribute_types() {
        debug!("unrecognized attribute type 0x{raw:04x} from {peer}");
    }
}

fn log_attribute(peer: Ipv4Address, attribute: &StunAttribute) {
    match attribute {
        StunAttribute::Address {
            attribute_type,
            address,
        } => info!(
            "got {} from {peer}: {address}",
            address_attribute_name(*attribute_type)
        ),
        StunAttribute::XorAddress { address } => {
            info!("got XOR-MAPPED-ADDRESS from {peer}: {address}")
        }
        StunAttribute::String {
            attribute_type,
            value,
        } => info!(
            "got {} from {peer}: '{value}'",
            string_attribute_name(*attribute_type)
        ),
        StunAttribute::Error { code, reason } => {
            info!("got ERROR-CODE from {peer}: {code} '{reason}'")
        }
        StunAttribute::U16List { types } => {
            info!("got UNKNOWN-ATTRIBUTES from {peer}: {types:#06x?}")
        }
        StunAttribute::IntValue { value, .. } => info!("got PRIORITY from {peer}: {value}"),
    }
}

fn address_attribute_name(attribute_type: u16) -> &'static str {
    match attribute_type {
        attributes::MAPPED_ADDRESS => "MAPPED-ADDRESS",
        attributes::ALTERNATE_SERVER => "ALTERNATE-SERVER",
        attributes::DEPR_RESPONSE_ADDRESS => "RESPONSE-ADDRESS",
        attributes::DEPR_SOURCE_ADDRESS => "SOURCE-ADDRESS",
        attributes::DEPR_CHANGED_ADDRESS => "CHANGED-ADDRESS",
        attributes::DEPR_REFLECTED_FROM => "REFLECTED-FROM",
        _ => "address attribute",
    }
}

fn string_attribute_name(attribute_type: u16) -> &'static str {
    match attribute_type {
        attributes::USERNAME => "USERNAME",
        attributes::SOFTWARE => "SOFTWARE",
        attributes::REALM => "REALM",
        attributes::NONCE => "NONCE",
        attributes::DEPR_PASSWORD => "PASSWORD",
        _ => "string attribute",
    }
}

//! Binary codec for STUN messages (RFC 5389 subset) over bounds-checked,
//! big-endian byte buffers.
//!
//! The crate provides the in-memory structures used to encode and decode
//! STUN messages into bytes ready to be sent to a socket, plus the
//! fixed-size reader/writer and random source they are built on. Candidate
//! gathering over real sockets lives in the companion `floe-gather` crate.
//!
//! ```
//! use floe_protocol::{
//!     attributes, ByteReader, ByteWriter, MessageClass, MessageMethod, StunAttribute,
//!     StunMessage,
//! };
//!
//! // Build a request and serialize it into a fixed-size buffer.
//! let mut message = StunMessage::new(MessageClass::Request, MessageMethod::Binding);
//! message.add_attribute(StunAttribute::software("floe"));
//!
//! let mut writer = ByteWriter::new(92);
//! let written = message.write_into(&mut writer).unwrap();
//!
//! // `writer.data()[..written]` can now be sent to a socket if desired.
//! let mut reader = ByteReader::new(&writer.data()[..written]);
//! let decoded = StunMessage::read_from(&mut reader).unwrap();
//! assert_eq!(decoded.class(), MessageClass::Request);
//! assert_eq!(decoded.method(), MessageMethod::Binding);
//! assert_eq!(decoded.string(attributes::SOFTWARE), Some("floe"));
//! ```

pub mod attributes;
pub mod buffer;
pub mod errors;
mod message;
mod rng;
mod utils;

use std::net::{Ipv4Addr, SocketAddrV4};

pub use attributes::StunAttribute;
pub use buffer::{ByteReader, ByteWriter};
use errors::MessageDecodeError;
pub use message::StunMessage;
pub use rng::RandomSource;

/// Magic value that must be included in all STUN messages to clarify that
/// the message uses rfc5389, rather than the outdated rfc3489.
pub const MAGIC_COOKIE: u32 = 0x2112_A442;

/// Size of the fixed STUN message header.
pub const STUN_HEADER_BYTES: usize = 20;

/// An IPv4 endpoint with both fields held in host byte order.
///
/// Conversion to network byte order happens in exactly two places: the
/// socket layer (when marshaling a `sockaddr`) and the address attribute
/// codecs (which emit big-endian wire bytes). Everything in between works
/// in host order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Ipv4Address {
    pub ip: u32,
    pub port: u16,
}

impl Ipv4Address {
    pub const fn new(ip: u32, port: u16) -> Self {
        Self { ip, port }
    }

    pub fn addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.ip)
    }

    pub fn is_loopback(&self) -> bool {
        self.addr().is_loopback()
    }
}

impl From<SocketAddrV4> for Ipv4Address {
    fn from(addr: SocketAddrV4) -> Self {
        Self {
            ip: u32::from(*addr.ip()),
            port: addr.port(),
        }
    }
}

impl From<Ipv4Address> for SocketAddrV4 {
    fn from(addr: Ipv4Address) -> Self {
        SocketAddrV4::new(Ipv4Addr::from(addr.ip), addr.port)
    }
}

impl std::fmt::Display for Ipv4Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.addr(), self.port)
    }
}

/// The class for a given STUN message, as [defined in RFC5389][].
///
/// [defined in RFC5389]: https://datatracker.ietf.org/doc/html/rfc5389#section-6
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    /// Used by clients to request an operation from a server. The client
    /// would expect some response.
    Request,
    /// Used by clients to request an operation from a server. The client
    /// would NOT necessarily expect some response.
    Indication,
    /// Used by servers on messages containing a successful response to a
    /// user request.
    SuccessResponse,
    /// Used by servers on messages containing a response to a user request
    /// that indicates the presence of an error.
    ErrorResponse,
}

impl From<MessageClass> for u16 {
    fn from(other: MessageClass) -> u16 {
        match other {
            MessageClass::Request => 0b00,
            MessageClass::Indication => 0b01,
            MessageClass::SuccessResponse => 0b10,
            MessageClass::ErrorResponse => 0b11,
        }
    }
}

impl TryFrom<u16> for MessageClass {
    type Error = MessageDecodeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MessageClass::Request),
            1 => Ok(MessageClass::Indication),
            2 => Ok(MessageClass::SuccessResponse),
            3 => Ok(MessageClass::ErrorResponse),
            _ => Err(MessageDecodeError::InvalidMessageClass),
        }
    }
}

/// The method of a STUN message, as [defined in RFC5389][].
///
/// A method identifies the specific operation that the user wishes the
/// server to perform. Decoding rejects any method outside this set rather
/// than reconstructing arbitrary 12-bit codes.
///
/// [defined in RFC5389]: https://datatracker.ietf.org/doc/html/rfc5389#section-6
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageMethod {
    /// The Binding method; its success response carries a mapped-address
    /// attribute.
    Binding,
    /// The Shared Secret method from the outdated rfc3489. Recognized on
    /// decode only; nothing here sends it.
    SharedSecret,
}

impl From<MessageMethod> for u16 {
    fn from(other: MessageMethod) -> u16 {
        match other {
            MessageMethod::Binding => 0x001,
            MessageMethod::SharedSecret => 0x002,
        }
    }
}

impl TryFrom<u16> for MessageMethod {
    type Error = MessageDecodeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x001 => Ok(MessageMethod::Binding),
            0x002 => Ok(MessageMethod::SharedSecret),
            _ => Err(MessageDecodeError::InvalidMessageMethod),
        }
    }
}

/// Represents the 96-bit value of the transaction ID for a STUN message.
///
/// The transaction ID uniquely identifies a STUN transaction: it is
/// included in each request by a client, and servers echo it verbatim in
/// their responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionId {
    bytes: [u8; 12],
}

impl TransactionId {
    pub const ZERO: Self = Self { bytes: [0; 12] };

    /// Draws a fresh id from the given source, uniform over all 96 bits.
    pub fn random(rng: &mut RandomSource) -> Self {
        let mut bytes = [0; 12];
        let high = rng.draw(0u64, u64::MAX);
        let low = rng.draw(0u32, u32::MAX);
        bytes[..8].copy_from_slice(&high.to_be_bytes());
        bytes[8..].copy_from_slice(&low.to_be_bytes());
        Self { bytes }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut buf = [0; 12];
        buf.copy_from_slice(&bytes[0..12]);
        Self { bytes: buf }
    }
}

impl AsRef<[u8]> for TransactionId {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_address_display_and_conversions() {
        let address = Ipv4Address::new(0xac17_44e6, 40444);
        assert_eq!(address.to_string(), "172.23.68.230:40444");

        let socket_addr = SocketAddrV4::from(address);
        assert_eq!(socket_addr.to_string(), "172.23.68.230:40444");
        assert_eq!(Ipv4Address::from(socket_addr), address);
    }

    #[test]
    fn loopback_detection() {
        assert!(Ipv4Address::new(0x7f00_0001, 0).is_loopback());
        assert!(!Ipv4Address::new(0xac17_44e6, 0).is_loopback());
    }

    #[test]
    fn message_class_round_trip() {
        for raw in 0u16..4 {
            let class = MessageClass::try_from(raw).unwrap();
            assert_eq!(u16::from(class), raw);
        }
        assert!(matches!(
            MessageClass::try_from(4),
            Err(MessageDecodeError::InvalidMessageClass)
        ));
    }

    #[test]
    fn message_method_rejects_unrecognized_codes() {
        assert_eq!(MessageMethod::try_from(1), Ok(MessageMethod::Binding));
        assert_eq!(MessageMethod::try_from(2), Ok(MessageMethod::SharedSecret));
        for raw in [0u16, 3, 0x0fff] {
            assert!(matches!(
                MessageMethod::try_from(raw),
                Err(MessageDecodeError::InvalidMessageMethod)
            ));
        }
    }

    #[test]
    fn transaction_id_randomness() {
        let mut rng = RandomSource::from_seed([3; 32]);
        let first = TransactionId::random(&mut rng);
        let second = TransactionId::random(&mut rng);
        assert_ne!(first, second);
        assert_ne!(first, TransactionId::ZERO);
    }

    #[test]
    fn transaction_id_from_bytes_is_verbatim() {
        let bytes = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
        let id = TransactionId::from_bytes(&bytes);
        assert_eq!(id.as_ref(), &bytes);
    }
}

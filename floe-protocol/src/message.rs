//! The STUN message codec: 20-byte header plus an ordered attribute list.

use crate::attributes::StunAttribute;
use crate::buffer::{ByteReader, ByteWriter};
use crate::errors::{MessageDecodeError, MessageEncodeError};
use crate::rng::RandomSource;
use crate::utils::{decode_message_type, encode_message_type, padding_for_attribute_length};
use crate::{Ipv4Address, MessageClass, MessageMethod, TransactionId, MAGIC_COOKIE, STUN_HEADER_BYTES};

const ATTRIBUTE_HEADER_BYTES: u16 = 4;

/// Mask of the two most-significant bits of the wire type. They are what
/// distinguishes STUN framing from multiplexed RTP/RTCP on the same port
/// and must be zero.
const NON_STUN_BITS: u16 = 0b1100_0000_0000_0000;

/// A decoded (or to-be-encoded) STUN message.
///
/// `length` tracks the byte length of the attribute section and is kept in
/// sync by [`add_attribute`](Self::add_attribute) and
/// [`remove_attribute`](Self::remove_attribute). Attribute type codes that
/// the decoder does not recognize are preserved in
/// [`unknown_attribute_types`](Self::unknown_attribute_types) with their
/// bytes skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct StunMessage {
    class: MessageClass,
    method: MessageMethod,
    length: u16,
    transaction_id: TransactionId,
    attributes: Vec<StunAttribute>,
    unknown_attribute_types: Vec<u16>,
}

impl StunMessage {
    /// An empty message with a zeroed transaction id.
    pub fn new(class: MessageClass, method: MessageMethod) -> Self {
        Self {
            class,
            method,
            length: 0,
            transaction_id: TransactionId::ZERO,
            attributes: Vec::new(),
            unknown_attribute_types: Vec::new(),
        }
    }

    pub fn class(&self) -> MessageClass {
        self.class
    }

    pub fn method(&self) -> MessageMethod {
        self.method
    }

    /// Byte length of the attribute section (the fixed header excluded).
    pub fn attribute_length(&self) -> u16 {
        self.length
    }

    pub fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    pub fn set_type(&mut self, class: MessageClass, method: MessageMethod) {
        self.class = class;
        self.method = method;
    }

    /// Sets class and method from a raw wire type, e.g. when reusing a
    /// freshly-read message as a response template.
    pub fn set_type_raw(&mut self, wire_type: u16) -> Result<(), MessageDecodeError> {
        if wire_type & NON_STUN_BITS != 0 {
            return Err(MessageDecodeError::NonZeroStartingBits);
        }
        let (class, method) = decode_message_type(wire_type)?;
        self.class = class;
        self.method = method;
        Ok(())
    }

    pub fn set_transaction_id(&mut self, transaction_id: TransactionId) {
        self.transaction_id = transaction_id;
    }

    pub fn randomize_transaction_id(&mut self, rng: &mut RandomSource) {
        self.transaction_id = TransactionId::random(rng);
    }

    /// Appends an attribute and records its wire footprint in `length`.
    pub fn add_attribute(&mut self, attribute: StunAttribute) {
        self.length += ATTRIBUTE_HEADER_BYTES + attribute.length() + attribute.padding();
        self.attributes.push(attribute);
    }

    /// Removes the first attribute serializing under `attribute_type`.
    pub fn remove_attribute(&mut self, attribute_type: u16) -> bool {
        let Some(index) = self
            .attributes
            .iter()
            .position(|attribute| attribute.attribute_type() == attribute_type)
        else {
            return false;
        };
        let attribute = self.attributes.remove(index);
        self.length -= ATTRIBUTE_HEADER_BYTES + attribute.length() + attribute.padding();
        true
    }

    /// The full ordered attribute list, for generic iteration.
    pub fn attributes(&self) -> &[StunAttribute] {
        &self.attributes
    }

    /// Type codes seen during decoding but not recognized.
    pub fn unknown_attribute_types(&self) -> &[u16] {
        &self.unknown_attribute_types
    }

    /// The endpoint of the first address attribute stored under
    /// `attribute_type`. Succeeds only for the six address-layout codes.
    pub fn address(&self, attribute_type: u16) -> Option<Ipv4Address> {
        self.attributes.iter().find_map(|attribute| match attribute {
            StunAttribute::Address {
                attribute_type: stored,
                address,
            } if *stored == attribute_type => Some(*address),
            _ => None,
        })
    }

    /// The unmasked endpoint of the XOR-MAPPED-ADDRESS attribute.
    pub fn xor_address(&self) -> Option<Ipv4Address> {
        self.attributes.iter().find_map(|attribute| match attribute {
            StunAttribute::XorAddress { address } => Some(*address),
            _ => None,
        })
    }

    /// The value of the first string attribute stored under
    /// `attribute_type`. Succeeds only for the five string codes.
    pub fn string(&self, attribute_type: u16) -> Option<&str> {
        self.attributes.iter().find_map(|attribute| match attribute {
            StunAttribute::String {
                attribute_type: stored,
                value,
            } if *stored == attribute_type => Some(value.as_str()),
            _ => None,
        })
    }

    /// Code and reason phrase of the ERROR-CODE attribute.
    pub fn error(&self) -> Option<(u16, &str)> {
        self.attributes.iter().find_map(|attribute| match attribute {
            StunAttribute::Error { code, reason } => Some((*code, reason.as_str())),
            _ => None,
        })
    }

    /// The type codes listed in the UNKNOWN-ATTRIBUTES attribute.
    pub fn uint16_list(&self) -> Option<&[u16]> {
        self.attributes.iter().find_map(|attribute| match attribute {
            StunAttribute::U16List { types } => Some(types.as_slice()),
            _ => None,
        })
    }

    /// Serializes the message. Returns the number of bytes produced; on any
    /// failure the writer is rewound to where encoding started.
    pub fn write_into(&self, writer: &mut ByteWriter) -> Result<usize, MessageEncodeError> {
        let start = writer.offset();
        match self.write_into_inner(writer, start) {
            Ok(written) => Ok(written),
            Err(error) => {
                // start <= size always holds, so the reset cannot fail
                let _ = writer.reset(start);
                Err(error)
            }
        }
    }

    fn write_into_inner(
        &self,
        writer: &mut ByteWriter,
        start: usize,
    ) -> Result<usize, MessageEncodeError> {
        writer.write_numeric(encode_message_type(self.class, self.method))?;
        writer.write_numeric(self.length)?;
        writer.write_numeric(MAGIC_COOKIE)?;
        writer.write_bytes(self.transaction_id.as_ref())?;
        for attribute in &self.attributes {
            writer.write_numeric(attribute.attribute_type())?;
            writer.write_numeric(attribute.length())?;
            attribute.write_payload(writer)?;
        }
        Ok(writer.offset() - start)
    }

    /// Parses one message from the reader.
    ///
    /// Recognized attributes are decoded in wire order; unknown type codes
    /// are quarantined with their payload skipped (rounded up to four
    /// bytes). Any framing or payload violation fails the whole decode.
    pub fn read_from(reader: &mut ByteReader<'_>) -> Result<StunMessage, MessageDecodeError> {
        if reader.space() < STUN_HEADER_BYTES {
            return Err(MessageDecodeError::UnexpectedEndOfData);
        }

        let wire_type: u16 = reader.read_numeric()?;
        if wire_type & NON_STUN_BITS != 0 {
            return Err(MessageDecodeError::NonZeroStartingBits);
        }
        let (class, method) = decode_message_type(wire_type)?;

        let length: u16 = reader.read_numeric()?;
        if length % 4 != 0 {
            return Err(MessageDecodeError::UnalignedLength);
        }

        let cookie: u32 = reader.read_numeric()?;
        if cookie != MAGIC_COOKIE {
            return Err(MessageDecodeError::InvalidMagicCookie);
        }

        let mut id_bytes = [0u8; 12];
        reader.read_exact(&mut id_bytes)?;

        if reader.space() < length as usize {
            return Err(MessageDecodeError::UnexpectedEndOfData);
        }

        let mut message = StunMessage {
            class,
            method,
            length,
            transaction_id: TransactionId::from_bytes(&id_bytes),
            attributes: Vec::new(),
            unknown_attribute_types: Vec::new(),
        };

        let section_start = reader.offset();
        while reader.offset() - section_start < length as usize {
            let attribute_type: u16 = reader.read_numeric()?;
            let attribute_length: u16 = reader.read_numeric()?;
            match StunAttribute::for_type(attribute_type) {
                Some(mut attribute) => {
                    attribute.read_payload(reader, attribute_length)?;
                    message.attributes.push(attribute);
                }
                None => {
                    message.unknown_attribute_types.push(attribute_type);
                    let padded = attribute_length as usize
                        + padding_for_attribute_length(attribute_length as usize);
                    reader.skip(padded)?;
                }
            }
        }

        // An attribute that claimed bytes past the declared section length
        // means the framing lied about one of the two.
        if reader.offset() - section_start != length as usize {
            return Err(MessageDecodeError::UnexpectedEndOfData);
        }

        Ok(message)
    }
}

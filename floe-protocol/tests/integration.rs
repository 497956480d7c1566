//! Bit-exact wire scenarios for the STUN codec, built through the public
//! API only.

use floe_protocol::{
    attributes, ByteReader, ByteWriter, Ipv4Address, MessageClass, MessageMethod, StunAttribute,
    StunMessage, TransactionId,
};

const TX_ID: [u8; 12] = [
    0x29, 0x1f, 0xcd, 0x7c, 0xba, 0x58, 0xab, 0xd7, 0xf2, 0x41, 0x01, 0x00,
];

const TEST_ENDPOINT: Ipv4Address = Ipv4Address::new(0xac17_44e6, 0x9dfc);

#[rustfmt::skip]
const SUCCESS_HEADER: [u8; 20] = [
    0x01, 0x01,             // Binding success response
    0x00, 0x0c,             // 12 attribute bytes
    0x21, 0x12, 0xa4, 0x42, // magic cookie
    0x29, 0x1f, 0xcd, 0x7c, 0xba, 0x58, 0xab, 0xd7, 0xf2, 0x41, 0x01, 0x00,
];

fn packet(attribute_length: u16, attribute_bytes: &[u8]) -> Vec<u8> {
    let mut bytes = SUCCESS_HEADER.to_vec();
    bytes[2..4].copy_from_slice(&attribute_length.to_be_bytes());
    bytes.extend_from_slice(attribute_bytes);
    bytes
}

fn decode(bytes: &[u8]) -> StunMessage {
    StunMessage::read_from(&mut ByteReader::new(bytes)).unwrap()
}

fn encode(message: &StunMessage) -> Vec<u8> {
    let mut writer = ByteWriter::new(128);
    let written = message.write_into(&mut writer).unwrap();
    writer.data()[..written].to_vec()
}

fn response_template() -> StunMessage {
    let mut message = StunMessage::new(MessageClass::SuccessResponse, MessageMethod::Binding);
    message.set_transaction_id(TransactionId::from_bytes(&TX_ID));
    message
}

#[test]
fn empty_binding_request_is_twenty_fixed_bytes() {
    let message = StunMessage::new(MessageClass::Request, MessageMethod::Binding);
    let bytes = encode(&message);

    #[rustfmt::skip]
    let expected = [
        0x00, 0x01, 0x00, 0x00,
        0x21, 0x12, 0xa4, 0x42,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ];
    assert_eq!(bytes, expected);
}

#[test]
fn decode_mapped_address_response() {
    #[rustfmt::skip]
    let bytes = packet(12, &[
        0x00, 0x01, 0x00, 0x08,
        0x00, 0x01, 0x9d, 0xfc,
        0xac, 0x17, 0x44, 0xe6,
    ]);
    assert_eq!(bytes.len(), 32);

    let message = decode(&bytes);
    assert_eq!(message.class(), MessageClass::SuccessResponse);
    assert_eq!(message.method(), MessageMethod::Binding);
    assert_eq!(message.transaction_id().as_ref(), &TX_ID);
    assert_eq!(message.attributes().len(), 1);
    assert_eq!(message.address(attributes::MAPPED_ADDRESS), Some(TEST_ENDPOINT));
}

#[test]
fn decode_xor_mapped_address_response() {
    #[rustfmt::skip]
    let bytes = packet(12, &[
        0x00, 0x20, 0x00, 0x08,
        0x00, 0x01, 0xbc, 0xee,
        0x8d, 0x05, 0xe0, 0xa4,
    ]);

    let message = decode(&bytes);
    assert_eq!(message.xor_address(), Some(TEST_ENDPOINT));
}

#[test]
fn decode_username_attribute() {
    #[rustfmt::skip]
    let bytes = packet(12, &[
        0x00, 0x06, 0x00, 0x08,
        b'u', b's', b'e', b'r', b'n', b'a', b'm', b'e',
    ]);

    let message = decode(&bytes);
    assert_eq!(message.string(attributes::USERNAME), Some("username"));
}

#[test]
fn decode_error_code_attribute() {
    #[rustfmt::skip]
    let bytes = packet(20, &[
        0x00, 0x09, 0x00, 0x0d,
        0x00, 0x00, 0x04, 0x04,
        b'n', b'o', b't', b' ', b'f', b'o', b'u', b'n', b'd',
        0x00, 0x00, 0x00,
    ]);

    let message = decode(&bytes);
    assert_eq!(message.error(), Some((404, "not found")));
}

#[test]
fn decode_unknown_attributes_list() {
    #[rustfmt::skip]
    let bytes = packet(12, &[
        0x00, 0x0a, 0x00, 0x08,
        0x88, 0x88, 0x87, 0x88,
        0x69, 0x96, 0x88, 0xff,
    ]);

    let message = decode(&bytes);
    assert_eq!(
        message.uint16_list(),
        Some(&[0x8888, 0x8788, 0x6996, 0x88ff][..])
    );
}

#[test]
fn encode_mapped_address_response() {
    let mut message = response_template();
    message.add_attribute(StunAttribute::mapped_address(TEST_ENDPOINT));

    #[rustfmt::skip]
    let expected = packet(12, &[
        0x00, 0x01, 0x00, 0x08,
        0x00, 0x01, 0x9d, 0xfc,
        0xac, 0x17, 0x44, 0xe6,
    ]);
    assert_eq!(encode(&message), expected);
}

#[test]
fn encode_xor_mapped_address_response() {
    let mut message = response_template();
    message.add_attribute(StunAttribute::xor_mapped_address(TEST_ENDPOINT));

    #[rustfmt::skip]
    let expected = packet(12, &[
        0x00, 0x20, 0x00, 0x08,
        0x00, 0x01, 0xbc, 0xee,
        0x8d, 0x05, 0xe0, 0xa4,
    ]);
    assert_eq!(encode(&message), expected);
}

#[test]
fn encode_username_response() {
    let mut message = response_template();
    message.add_attribute(StunAttribute::username("username"));

    #[rustfmt::skip]
    let expected = packet(12, &[
        0x00, 0x06, 0x00, 0x08,
        b'u', b's', b'e', b'r', b'n', b'a', b'm', b'e',
    ]);
    assert_eq!(encode(&message), expected);
}

#[test]
fn encode_error_code_response() {
    let mut message = response_template();
    message.add_attribute(StunAttribute::error_code(404, "not found"));

    #[rustfmt::skip]
    let expected = packet(20, &[
        0x00, 0x09, 0x00, 0x0d,
        0x00, 0x00, 0x04, 0x04,
        b'n', b'o', b't', b' ', b'f', b'o', b'u', b'n', b'd',
        0x00, 0x00, 0x00,
    ]);
    assert_eq!(encode(&message), expected);
}

#[test]
fn encode_unknown_attributes_response() {
    let mut message = response_template();
    message.add_attribute(StunAttribute::unknown_attributes(vec![
        0x8888, 0x8788, 0x6996, 0x88ff,
    ]));

    #[rustfmt::skip]
    let expected = packet(12, &[
        0x00, 0x0a, 0x00, 0x08,
        0x88, 0x88, 0x87, 0x88,
        0x69, 0x96, 0x88, 0xff,
    ]);
    assert_eq!(encode(&message), expected);
}

#[test]
fn decode_of_encode_is_identity() {
    let mut message = response_template();
    message.add_attribute(StunAttribute::software("floe"));
    message.add_attribute(StunAttribute::xor_mapped_address(TEST_ENDPOINT));
    message.add_attribute(StunAttribute::mapped_address(TEST_ENDPOINT));

    let bytes = encode(&message);
    let decoded = decode(&bytes);
    assert_eq!(decoded, message);

    // ...and the re-encode is bit-identical.
    assert_eq!(encode(&decoded), bytes);
}

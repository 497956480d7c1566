use crate::errors::MessageDecodeError;
use crate::{MessageClass, MessageMethod};

/// Packs a class and method into the 16-bit wire type.
// [Stun's message structure] as of RFC5389 requires some interesting
// manipulation of the class and method into the first two bytes of the
// packet. Specifically:
//   * The first two bits are zero.
//   * The next 14 bits are shared between the class and method, with the
//     class using bits 4 and 8, and the method using the rest:
//     [M11 M10 M9 M8 M7 | C1 | M6 M5 M4 | C0 | M3 M2 M1 M0]
pub(crate) fn encode_message_type(class: MessageClass, method: MessageMethod) -> u16 {
    let mut wire_type = 0;

    let class_value = u16::from(class);
    wire_type += (class_value & 0b10) << 7;
    wire_type += (class_value & 0b01) << 4;

    let method_value = u16::from(method);
    wire_type += (method_value & 0b0000_1111_1000_0000) << 2;
    wire_type += (method_value & 0b0000_0000_0111_0000) << 1;
    wire_type += method_value & 0b0000_0000_0000_1111;

    wire_type
}

/// Unpacks the 16-bit wire type into a message class and method, rejecting
/// methods outside the recognized set.
pub(crate) fn decode_message_type(
    wire_type: u16,
) -> Result<(MessageClass, MessageMethod), MessageDecodeError> {
    let mut class_value = 0;
    class_value += (wire_type & 0b0000_0001_0000_0000) >> 7;
    class_value += (wire_type & 0b0000_0000_0001_0000) >> 4;

    let mut method_value = 0;
    method_value += (wire_type & 0b0011_1110_0000_0000) >> 2;
    method_value += (wire_type & 0b0000_0000_1110_0000) >> 1;
    method_value += wire_type & 0b0000_0000_0000_1111;

    Ok((
        MessageClass::try_from(class_value)?,
        MessageMethod::try_from(method_value)?,
    ))
}

const ALIGNMENT_BYTES: usize = 4;

/// Given the length of an attribute, determine how many bytes worth of
/// padding must be appended to the end of the attribute data section.
///
/// From the RFC:
/// > Since STUN aligns attributes on 32-bit boundaries, attributes whose
/// > content is not a multiple of 4 bytes are padded with 1, 2, or 3 bytes
/// > of padding so that its value contains a multiple of 4 bytes.
pub(crate) fn padding_for_attribute_length(length: usize) -> usize {
    let extra = length % ALIGNMENT_BYTES;
    if extra != 0 {
        ALIGNMENT_BYTES - extra
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_message_type() {
        assert_eq!(
            encode_message_type(MessageClass::Request, MessageMethod::Binding),
            0x0001
        );

        assert_eq!(
            encode_message_type(MessageClass::Indication, MessageMethod::Binding),
            0b0000_0000_0001_0001
        );

        assert_eq!(
            encode_message_type(MessageClass::SuccessResponse, MessageMethod::Binding),
            0b0000_0001_0000_0001
        );

        assert_eq!(
            encode_message_type(MessageClass::ErrorResponse, MessageMethod::Binding),
            0b0000_0001_0001_0001
        );

        assert_eq!(
            encode_message_type(MessageClass::ErrorResponse, MessageMethod::SharedSecret),
            0b0000_0001_0001_0010
        );
    }

    #[test]
    fn test_decode_message_type() {
        assert_eq!(
            decode_message_type(0b0000_0000_0000_0001),
            Ok((MessageClass::Request, MessageMethod::Binding))
        );

        assert_eq!(
            decode_message_type(0b0000_0000_0001_0001),
            Ok((MessageClass::Indication, MessageMethod::Binding)),
        );

        assert_eq!(
            decode_message_type(0b0000_0001_0000_0001),
            Ok((MessageClass::SuccessResponse, MessageMethod::Binding)),
        );

        assert_eq!(
            decode_message_type(0b0000_0001_0001_0001),
            Ok((MessageClass::ErrorResponse, MessageMethod::Binding))
        );

        assert_eq!(
            decode_message_type(0b0000_0001_0001_0010),
            Ok((MessageClass::ErrorResponse, MessageMethod::SharedSecret))
        );

        assert_eq!(
            decode_message_type(0b0000_0000_0000_0011),
            Err(MessageDecodeError::InvalidMessageMethod)
        );
    }

    #[test]
    fn encode_and_decode_are_inverse() {
        for class in [
            MessageClass::Request,
            MessageClass::Indication,
            MessageClass::SuccessResponse,
            MessageClass::ErrorResponse,
        ] {
            for method in [MessageMethod::Binding, MessageMethod::SharedSecret] {
                let wire_type = encode_message_type(class, method);
                assert_eq!(wire_type & 0b1100_0000_0000_0000, 0);
                assert_eq!(decode_message_type(wire_type), Ok((class, method)));
            }
        }
    }

    #[test]
    fn test_padding_for_attribute_length() {
        assert_eq!(0, padding_for_attribute_length(0));
        assert_eq!(3, padding_for_attribute_length(1));
        assert_eq!(2, padding_for_attribute_length(2));
        assert_eq!(1, padding_for_attribute_length(3));
        assert_eq!(0, padding_for_attribute_length(4));
        assert_eq!(3, padding_for_attribute_length(5));
        assert_eq!(2, padding_for_attribute_length(6));
        assert_eq!(1, padding_for_attribute_length(7));
        assert_eq!(0, padding_for_attribute_length(8));
    }
}

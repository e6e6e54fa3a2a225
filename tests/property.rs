//! Property-based tests for the codec invariants.

use proptest::prelude::*;
use std::io::Cursor;

use wsstream::{
    read_message, ControlFrame, Error, FrameHeader, FrameWriter, MaskPolicy, MessageKind,
    MessageWriter, OpCode, PayloadLength, Result as WsResult, Utf8Validator,
};

fn no_control(frame: &ControlFrame, _sink: &mut Vec<u8>) -> WsResult<()> {
    panic!("unexpected control frame: {frame:?}");
}

fn opcode_strategy() -> impl Strategy<Value = OpCode> {
    prop_oneof![
        Just(OpCode::Continuation),
        Just(OpCode::Text),
        Just(OpCode::Binary),
        Just(OpCode::Close),
        Just(OpCode::Ping),
        Just(OpCode::Pong),
    ]
}

fn payload_length_strategy() -> impl Strategy<Value = PayloadLength> {
    prop_oneof![
        (0u8..=125).prop_map(PayloadLength::Short),
        any::<u16>().prop_map(PayloadLength::Medium),
        (0u64..(1 << 63)).prop_map(PayloadLength::Long),
    ]
}

fn mask_key_strategy() -> impl Strategy<Value = Option<[u8; 4]>> {
    prop_oneof![Just(None), any::<[u8; 4]>().prop_map(Some)]
}

fn write_policy_strategy() -> impl Strategy<Value = MaskPolicy> {
    prop_oneof![
        Just(MaskPolicy::Unmasked),
        Just(MaskPolicy::Random),
        any::<u32>().prop_map(MaskPolicy::Fixed),
    ]
}

/// A short byte sequence that cannot be part of any valid UTF-8 stream.
fn invalid_utf8_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        Just(vec![0x80]),             // bare continuation byte
        Just(vec![0xFF]),             // illegal lead byte
        Just(vec![0xC0, 0x80]),       // overlong NUL
        Just(vec![0xED, 0xA0, 0x80]), // surrogate half
        Just(vec![0xF4, 0x90, 0x80, 0x80]), // above U+10FFFF
        Just(vec![0xE2, 0x28, 0xA1]), // bad continuation
    ]
}

proptest! {
    // =========================================================================
    // Header codec: decode(encode(header)) preserves every logical field,
    // including the wire form used.
    // =========================================================================
    #[test]
    fn prop_header_roundtrip(
        fin in any::<bool>(),
        rsv1 in any::<bool>(),
        rsv2 in any::<bool>(),
        rsv3 in any::<bool>(),
        opcode in opcode_strategy(),
        length in payload_length_strategy(),
        mask in mask_key_strategy(),
    ) {
        let header = FrameHeader { fin, rsv1, rsv2, rsv3, opcode, length, mask };
        let (buf, len) = header.encode();
        prop_assert_eq!(len, header.wire_len());

        let decoded = FrameHeader::read_from(&mut Cursor::new(&buf[..len]));
        prop_assert_eq!(decoded, Ok(header));
    }

    // =========================================================================
    // Mask transform: involution at any offset.
    // =========================================================================
    #[test]
    fn prop_mask_involution(
        data in prop::collection::vec(any::<u8>(), 0..512),
        key in any::<[u8; 4]>(),
        offset in 0usize..32,
    ) {
        let mut masked = data.clone();
        wsstream::protocol::apply_mask(&mut masked, key, offset);
        wsstream::protocol::apply_mask(&mut masked, key, offset);
        prop_assert_eq!(masked, data);
    }

    // =========================================================================
    // Mask transform: masking in two chunks with a carried offset equals
    // masking in one pass.
    // =========================================================================
    #[test]
    fn prop_mask_split_alignment(
        data in prop::collection::vec(any::<u8>(), 0..512),
        key in any::<[u8; 4]>(),
        split in any::<prop::sample::Index>(),
    ) {
        let split = if data.is_empty() { 0 } else { split.index(data.len() + 1) };

        let mut whole = data.clone();
        wsstream::protocol::apply_mask(&mut whole, key, 0);

        let mut chunked = data;
        let (head, tail) = chunked.split_at_mut(split);
        wsstream::protocol::apply_mask(head, key, 0);
        wsstream::protocol::apply_mask(tail, key, split);
        prop_assert_eq!(chunked, whole);
    }

    // =========================================================================
    // UTF-8 validator: any byte-level split of a valid string validates
    // with an empty final carry.
    // =========================================================================
    #[test]
    fn prop_utf8_any_split_of_valid_string(
        s in ".*",
        split in any::<prop::sample::Index>(),
    ) {
        let bytes = s.as_bytes();
        let split = if bytes.is_empty() { 0 } else { split.index(bytes.len() + 1) };

        let mut validator = Utf8Validator::new();
        prop_assert!(validator.feed(&bytes[..split]).is_ok());
        prop_assert!(validator.feed(&bytes[split..]).is_ok());
        prop_assert!(validator.finish().is_ok());
        prop_assert!(!validator.has_partial());
    }

    // =========================================================================
    // UTF-8 validator: an invalid stream fails un-split, and fails at some
    // stage for every split.
    // =========================================================================
    #[test]
    fn prop_utf8_invalid_fails_at_every_split(
        prefix in "[a-z€🎉]*",
        garbage in invalid_utf8_strategy(),
    ) {
        let mut stream = prefix.into_bytes();
        stream.extend_from_slice(&garbage);

        // Un-split.
        let mut validator = Utf8Validator::new();
        let whole = validator.feed(&stream).and_then(|()| validator.finish());
        prop_assert_eq!(whole, Err(Error::InvalidUtf8));

        // Every two-chunk split.
        for split in 0..=stream.len() {
            let mut validator = Utf8Validator::new();
            let outcome = validator
                .feed(&stream[..split])
                .and_then(|()| validator.feed(&stream[split..]))
                .and_then(|()| validator.finish());
            prop_assert_eq!(outcome, Err(Error::InvalidUtf8), "split at {}", split);
        }
    }

    // =========================================================================
    // Writer/reader symmetry: a single-frame write under any mask policy is
    // recovered exactly by the reader.
    // =========================================================================
    #[test]
    fn prop_single_frame_roundtrip(
        payload in prop::collection::vec(any::<u8>(), 0..2048),
        policy in write_policy_strategy(),
    ) {
        let mut wire = Vec::new();
        let mut writer = FrameWriter::new(
            &mut wire,
            MessageKind::Binary,
            payload.len() as u64,
            policy,
        ).unwrap();
        writer.write_all(&payload).unwrap();
        prop_assert!(writer.is_complete());

        let mut transport = Cursor::new(wire);
        let mut sink = Vec::new();
        let mut reader = read_message(&mut transport, no_control, &mut sink).unwrap();
        prop_assert_eq!(reader.kind(), MessageKind::Binary);
        prop_assert_eq!(reader.read_to_vec(), Ok(payload));
    }

    // =========================================================================
    // Fragmentation: any split of a payload into fragments is reassembled
    // to the same bytes.
    // =========================================================================
    #[test]
    fn prop_fragmented_roundtrip(
        payload in prop::collection::vec(any::<u8>(), 0..1024),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..4),
        policy in write_policy_strategy(),
    ) {
        let mut bounds: Vec<usize> = cuts
            .iter()
            .map(|ix| if payload.is_empty() { 0 } else { ix.index(payload.len() + 1) })
            .collect();
        bounds.push(0);
        bounds.push(payload.len());
        bounds.sort_unstable();

        let mut wire = Vec::new();
        let mut writer = MessageWriter::new(&mut wire, MessageKind::Binary, policy);
        for pair in bounds.windows(2).take(bounds.len().saturating_sub(2)) {
            writer.write(&payload[pair[0]..pair[1]]).unwrap();
        }
        let last = bounds[bounds.len() - 2];
        writer.close_with(&payload[last..]).unwrap();

        let mut transport = Cursor::new(wire);
        let mut sink = Vec::new();
        let mut reader = read_message(&mut transport, no_control, &mut sink).unwrap();
        prop_assert_eq!(reader.read_to_vec(), Ok(payload));
    }

    // =========================================================================
    // Fragmented text: fragment boundaries may fall inside a code point and
    // the message still validates.
    // =========================================================================
    #[test]
    fn prop_fragmented_text_roundtrip(
        s in "[a-z ü€🎉]{0,200}",
        cut in any::<prop::sample::Index>(),
    ) {
        let bytes = s.as_bytes();
        let cut = if bytes.is_empty() { 0 } else { cut.index(bytes.len() + 1) };

        let mut wire = Vec::new();
        let mut writer = MessageWriter::new(&mut wire, MessageKind::Text, MaskPolicy::Random);
        writer.write(&bytes[..cut]).unwrap();
        writer.close_with(&bytes[cut..]).unwrap();

        let mut transport = Cursor::new(wire);
        let mut sink = Vec::new();
        let mut reader = read_message(&mut transport, no_control, &mut sink).unwrap();
        prop_assert_eq!(reader.kind(), MessageKind::Text);
        prop_assert_eq!(reader.read_to_vec(), Ok(bytes.to_vec()));
    }

    // =========================================================================
    // Declared-length discipline: a single-frame writer accepts exactly the
    // declared byte count, then returns EndOfStream.
    // =========================================================================
    #[test]
    fn prop_overrun_rejected_after_declared_length(
        payload in prop::collection::vec(any::<u8>(), 0..512),
        extra in prop::collection::vec(any::<u8>(), 1..64),
    ) {
        let mut wire = Vec::new();
        let mut writer = FrameWriter::new(
            &mut wire,
            MessageKind::Binary,
            payload.len() as u64,
            MaskPolicy::Unmasked,
        ).unwrap();

        let mut accepted = 0usize;
        let mut data: Vec<u8> = payload.iter().chain(extra.iter()).copied().collect();
        loop {
            match writer.write(&data) {
                Ok(0) => break, // only possible when data is exhausted
                Ok(n) => {
                    accepted += n;
                    data.drain(..n);
                }
                Err(err) => {
                    prop_assert_eq!(err, Error::EndOfStream);
                    break;
                }
            }
        }
        prop_assert_eq!(accepted, payload.len());
        prop_assert!(writer.is_complete());
    }
}

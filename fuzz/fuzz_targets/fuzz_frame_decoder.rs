//! Fuzz target: `FrameDecoder::feed` into `Order::decode`
//!
//! Drives arbitrary byte sequences through the streaming framer and the
//! order decoder, asserting that neither panics and that every yielded
//! frame is delimited and fits the frame buffer.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use quadlink::app::commands::Order;
use quadlink::protocol::codec::{FRAME_CAPACITY, FrameDecoder};
use quadlink::protocol::orders::{TRANS_END, TRANS_START};

fuzz_target!(|data: &[u8]| {
    let mut decoder = FrameDecoder::new();

    let mut rest = data;
    while !rest.is_empty() {
        let (consumed, frame) = decoder.feed(rest);
        assert!(consumed > 0, "feed must make progress");
        rest = &rest[consumed..];

        if let Some(frame) = frame {
            let bytes = frame.as_bytes();
            assert!(bytes.len() <= FRAME_CAPACITY, "frame exceeds FRAME_CAPACITY");
            assert_eq!(bytes.first(), Some(&TRANS_START));
            assert_eq!(bytes.last(), Some(&TRANS_END));
            let _ = Order::decode(&frame);
        }
    }

    // After a reset the decoder must accept bytes cleanly again.
    decoder.reset();
    let _ = decoder.feed(data);
});

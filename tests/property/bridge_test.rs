// tests/property/bridge_test.rs

//! Property tests for the command queue of the stream bridge.

use craftbridge::core::bridge::{LINE_DELIMITER, StreamBridge};
use proptest::prelude::*;

/// Console lines never contain the delimiter themselves.
fn console_line() -> impl Strategy<Value = String> {
    "/[a-z]{1,12}( [a-zA-Z0-9:_~.-]{1,10}){0,4}"
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 100,
        .. ProptestConfig::default()
    })]

    #[test]
    fn drain_is_concatenation_in_enqueue_order(
        lines in prop::collection::vec(console_line(), 1..20)
    ) {
        let (bridge, _rx) = StreamBridge::new(8);
        for line in &lines {
            bridge.enqueue(line.clone());
        }
        prop_assert_eq!(bridge.pending(), lines.len());

        let expected: String = lines
            .iter()
            .map(|line| format!("{line}{LINE_DELIMITER}"))
            .collect();
        let drained = bridge.drain();
        prop_assert_eq!(&drained[..], expected.as_bytes());
        prop_assert!(bridge.drain().is_empty());
    }

    #[test]
    fn interleaved_drains_lose_nothing(
        batches in prop::collection::vec(prop::collection::vec(console_line(), 0..5), 1..10)
    ) {
        let (bridge, _rx) = StreamBridge::new(8);
        let mut received = Vec::new();
        let mut sent = Vec::new();
        for batch in &batches {
            for line in batch {
                bridge.enqueue(line.clone());
                sent.extend_from_slice(line.as_bytes());
                sent.extend_from_slice(LINE_DELIMITER.as_bytes());
            }
            received.extend_from_slice(&bridge.drain());
        }
        prop_assert_eq!(received, sent);
        prop_assert_eq!(bridge.pending(), 0);
    }

    #[test]
    fn capture_accounts_for_every_chunk(
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..64), 0..40),
        capacity in 1usize..16
    ) {
        let (bridge, mut rx) = StreamBridge::new(capacity);
        for chunk in &chunks {
            prop_assert_eq!(bridge.capture(chunk), chunk.len());
        }

        let stats = bridge.stats();
        prop_assert_eq!(stats.captured() + stats.dropped(), chunks.len() as u64);
        prop_assert_eq!(stats.captured(), chunks.len().min(capacity) as u64);

        // What got through is the oldest chunks, unchanged.
        for chunk in chunks.iter().take(capacity) {
            let received = rx.try_recv().unwrap();
            prop_assert_eq!(&received[..], &chunk[..]);
        }
        prop_assert!(rx.try_recv().is_err());
    }
}

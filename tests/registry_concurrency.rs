//! Registry Concurrency Tests
//!
//! Sequence numbers are assigned in arrival order under concurrent writers:
//! - No number is skipped or repeated
//! - Per-source history and latest stay consistent with the global order

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use armorscan::analyzer::{Analyzer, AnalyzerConfig};
use armorscan::codec::CodecKind;
use armorscan::envelope::ArmorHeaders;
use armorscan::registry::{DiscoveryRegistry, ListOrder};

const WRITERS: u64 = 100;

fn jpeg_envelope() -> String {
    let mut payload = vec![0xFFu8; 8];
    payload.extend_from_slice(&[0xFF, 0xD8, 0xFF]);
    payload.extend_from_slice(&[0xFFu8; 9]);
    format!(
        "-----BEGIN RGB CONTRACT-----\n{}\n-----END RGB CONTRACT-----",
        CodecKind::Base85Rfc.encode(&payload)
    )
}

/// 100 concurrent analyses yield sequence numbers exactly 0..100.
#[test]
fn test_concurrent_analyses_get_dense_sequence_numbers() {
    let analyzer = Arc::new(Analyzer::new(AnalyzerConfig::default()));
    let input = Arc::new(jpeg_envelope());

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let analyzer = Arc::clone(&analyzer);
            let input = Arc::clone(&input);
            thread::spawn(move || analyzer.analyze(&format!("doc-{}", i), input.as_bytes()))
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        let verdict = handle.join().unwrap();
        assert!(verdict.valid, "{:?}", verdict.error);
        assert!(seen.insert(verdict.sequence_number.unwrap()));
    }

    let expected: HashSet<u64> = (0..WRITERS).collect();
    assert_eq!(seen, expected);
    assert_eq!(analyzer.registry().len().unwrap(), WRITERS as usize);
    assert_eq!(
        analyzer.metrics().snapshot().discoveries_registered,
        WRITERS
    );
}

/// Arrival listing is strictly increasing after concurrent writes.
#[test]
fn test_listing_order_after_concurrent_records() {
    let registry = Arc::new(DiscoveryRegistry::new());

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let source = format!("src-{}", i % 4);
                registry
                    .record(&source, CodecKind::Z85, Vec::new(), ArmorHeaders::new())
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let arrival: Vec<u64> = registry
        .list(ListOrder::Arrival)
        .unwrap()
        .iter()
        .map(|r| r.sequence_number)
        .collect();
    assert_eq!(arrival, (0..WRITERS).collect::<Vec<_>>());

    let newest: Vec<u64> = registry
        .list(ListOrder::NewestFirst)
        .unwrap()
        .iter()
        .map(|r| r.sequence_number)
        .collect();
    assert_eq!(newest, (0..WRITERS).rev().collect::<Vec<_>>());

    for source in ["src-0", "src-1", "src-2", "src-3"] {
        let history = registry.history(source).unwrap();
        assert_eq!(history.len(), 25);
        assert!(history.windows(2).all(|w| w[0] < w[1]));

        let latest = registry.latest(source).unwrap().unwrap();
        assert_eq!(Some(&latest.sequence_number), history.last());
    }
}

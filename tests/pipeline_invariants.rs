//! Pipeline Invariant Tests
//!
//! End-to-end behavior of locate → decode → scan → register:
//! - No complete marker pair means no codec is ever tried
//! - The accepted codec is chosen by priority, never by content
//! - Identical inputs yield identical verdicts apart from sequence numbers
//! - Oversized inputs are refused before any decode work

use armorscan::analyzer::{Analyzer, AnalyzerConfig, Stage};
use armorscan::codec::{CodecKind, DecodeMode};
use armorscan::signature::SignatureCategory;

// =============================================================================
// Helper Functions
// =============================================================================

const BEGIN: &str = "-----BEGIN RGB CONSIGNMENT-----";
const END: &str = "-----END RGB CONSIGNMENT-----";

/// 0xFF padding around a JPEG start-of-image at offset 100
fn jpeg_fixture() -> Vec<u8> {
    let mut payload = vec![0xFFu8; 100];
    payload.extend_from_slice(&[0xFF, 0xD8, 0xFF]);
    payload.extend_from_slice(&[0u8; 50]);
    payload.extend_from_slice(&[0xFFu8; 100]);
    payload
}

/// Wraps encoded text at 64 columns inside consignment markers, with headers
fn consignment(body: &str) -> String {
    let lines: Vec<String> = body
        .as_bytes()
        .chunks(64)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect();
    format!(
        "<html><body><pre>\n{}\nId: rgb:csg:test-0001\nType: RGB21\n\n{}\n{}\n</pre></body></html>",
        BEGIN,
        lines.join("\n"),
        END
    )
}

fn analyzer() -> Analyzer {
    Analyzer::new(AnalyzerConfig::default())
}

// =============================================================================
// End-to-End Tests
// =============================================================================

/// RFC 1924 body with headers decodes, matches once and is registered.
#[test]
fn test_rfc1924_consignment_end_to_end() {
    let analyzer = analyzer();
    let input = consignment(&CodecKind::Base85Rfc.encode(&jpeg_fixture()));

    let verdict = analyzer.analyze("inscription-1", input.as_bytes());

    assert!(verdict.valid, "{:?}", verdict.error);
    assert_eq!(verdict.stage, Stage::Registered);
    assert_eq!(verdict.sequence_number, Some(0));
    assert_eq!(verdict.codec_used, Some(CodecKind::Base85Rfc));
    assert_eq!(verdict.decoded_len, Some(253));
    assert_eq!(verdict.matches.len(), 1);
    assert_eq!(verdict.matches[0].label, "jpeg");
    assert_eq!(verdict.matches[0].category, SignatureCategory::Image);
    assert_eq!(verdict.matches[0].offset, 100);
    assert_eq!(verdict.matches[0].length, 153);

    let headers = verdict.headers.as_ref().unwrap();
    assert_eq!(headers.consignment_id(), Some("rgb:csg:test-0001"));
    assert_eq!(headers.contract_type(), Some("RGB21"));

    // ascii85 and ascii85-adobe are tried and fail before base85-rfc
    let tried: Vec<_> = verdict.attempts.iter().map(|a| a.codec).collect();
    assert_eq!(
        tried,
        vec![CodecKind::Ascii85, CodecKind::Ascii85Adobe, CodecKind::Base85Rfc]
    );
    assert!(!verdict.attempts[0].ok);
    assert!(!verdict.attempts[1].ok);
    assert!(verdict.attempts[2].ok);
}

/// The serialized verdict carries the documented field names.
#[test]
fn test_verdict_json_shape() {
    let analyzer = analyzer();
    let input = consignment(&CodecKind::Base85Rfc.encode(&jpeg_fixture()));
    let verdict = analyzer.analyze("inscription-1", input.as_bytes());

    let value = serde_json::to_value(&verdict).unwrap();
    assert_eq!(value["valid"], true);
    assert_eq!(value["codec_used"], "base85-rfc");
    assert_eq!(value["matches"][0]["label"], "jpeg");
    assert_eq!(value["matches"][0]["category"], "image");
    assert_eq!(value["matches"][0]["offset"], 100);
    assert_eq!(value["headers"]["Type"], "RGB21");
    assert_eq!(value["envelope"]["spelling"], "consignment");
}

/// Registry export rows follow sequence order and carry header metadata.
#[test]
fn test_export_after_registration() {
    let analyzer = analyzer();
    let input = consignment(&CodecKind::Base85Rfc.encode(&jpeg_fixture()));
    analyzer.analyze("first", input.as_bytes());
    analyzer.analyze("second", input.as_bytes());

    let export = analyzer.registry().export().unwrap();
    assert_eq!(export.len(), 2);
    assert_eq!(export[0].rgb_number, 0);
    assert_eq!(export[0].inscription_id, "first");
    assert_eq!(export[1].rgb_number, 1);
    assert_eq!(export[1].contract_type.as_deref(), Some("RGB21"));
}

// =============================================================================
// Rejection Tests
// =============================================================================

/// Inputs without a complete marker pair never reach a codec.
#[test]
fn test_no_envelope_means_no_codec_attempts() {
    let analyzer = analyzer();
    let inputs = [
        "plain html".to_string(),
        format!("{}\nBOu!rD]j7BEbo7\n", BEGIN),
        format!("{}\nBOu!rD]j7BEbo7\n", END),
        format!("-----BEGIN RGB CONTRACT-----\nBOu!rD]j7BEbo7\n{}", END),
    ];

    for input in &inputs {
        let verdict = analyzer.analyze("doc", input.as_bytes());
        assert!(!verdict.valid);
        assert_eq!(verdict.rejected_at, Some(Stage::Located));
        assert_eq!(verdict.error_code.as_deref(), Some("ARMOR_ENVELOPE_NOT_FOUND"));
        assert!(verdict.attempts.is_empty());
    }

    assert_eq!(analyzer.metrics().snapshot().codec_attempts, 0);
    assert_eq!(analyzer.metrics().snapshot().envelopes_missing, inputs.len() as u64);
}

/// End marker at 5 and start marker at 50 is reported as out of order.
#[test]
fn test_end_before_start_is_malformed_order() {
    let text = format!("xxxxx{}{}{}\nABC\n", END, " ".repeat(16), BEGIN);
    assert_eq!(text.find(END), Some(5));
    assert_eq!(text.find(BEGIN), Some(50));

    let verdict = analyzer().analyze("doc", text.as_bytes());
    assert_eq!(verdict.error_code.as_deref(), Some("ARMOR_MALFORMED_MARKER_ORDER"));
    assert_eq!(verdict.rejected_at, Some(Stage::Located));
    assert!(verdict.attempts.is_empty());

    let markers = verdict.markers.unwrap();
    let observed = markers.out_of_order().unwrap();
    assert_eq!(observed.first_end, Some(5));
    assert_eq!(observed.first_begin, Some(50));
}

/// A body no codec parses is rejected with one reason per codec.
#[test]
fn test_codec_exhaustion_reports_every_codec() {
    let input = format!("{}\n\u{7f}\u{80}\u{7f}\n{}", BEGIN, END);
    let verdict = analyzer().analyze("doc", input.as_bytes());

    assert_eq!(verdict.error_code.as_deref(), Some("ARMOR_CODEC_EXHAUSTED"));
    let tried: Vec<_> = verdict.attempts.iter().map(|a| a.codec).collect();
    assert_eq!(tried, CodecKind::PRIORITY.to_vec());
    assert!(verdict.error.unwrap().contains("no codec matched"));
}

/// Decoded bytes without any signature are a negative verdict.
#[test]
fn test_no_signature_match() {
    let analyzer = analyzer();
    let input = consignment(&CodecKind::Base85Rfc.encode(&[0xFFu8; 64]));
    let verdict = analyzer.analyze("doc", input.as_bytes());

    assert_eq!(verdict.error_code.as_deref(), Some("ARMOR_NO_SIGNATURE_MATCH"));
    assert_eq!(verdict.rejected_at, Some(Stage::Verified));
    assert_eq!(verdict.codec_used, Some(CodecKind::Base85Rfc));
    assert_eq!(verdict.decoded_len, Some(64));
    assert_eq!(verdict.signatures_checked, 2);
    assert!(analyzer.registry().is_empty().unwrap());
}

/// Oversized input is refused with no per-codec diagnostics.
#[test]
fn test_oversized_input_rejected_before_decode() {
    let config = AnalyzerConfig::with_max_input_bytes(1024);
    let analyzer = Analyzer::new(config);
    let mut input = consignment(&CodecKind::Base85Rfc.encode(&jpeg_fixture())).into_bytes();
    input.resize(2048, b' ');

    let verdict = analyzer.analyze("big", &input);
    assert_eq!(verdict.error_code.as_deref(), Some("ARMOR_INPUT_TOO_LARGE"));
    assert_eq!(verdict.rejected_at, Some(Stage::Received));
    assert!(verdict.attempts.is_empty());
    assert!(verdict.envelope.is_none());

    let snapshot = analyzer.metrics().snapshot();
    assert_eq!(snapshot.inputs_rejected_size, 1);
    assert_eq!(snapshot.codec_attempts, 0);
}

// =============================================================================
// Determinism Tests
// =============================================================================

/// Running the pipeline twice yields the same matches and codec.
#[test]
fn test_pipeline_is_idempotent() {
    let analyzer = analyzer();
    let input = consignment(&CodecKind::Base85Rfc.encode(&jpeg_fixture()));

    let first = analyzer.analyze("same", input.as_bytes());
    let second = analyzer.analyze("same", input.as_bytes());

    assert_eq!(first.matches, second.matches);
    assert_eq!(first.codec_used, second.codec_used);
    assert_eq!(first.attempts, second.attempts);
    assert_ne!(first.sequence_number, second.sequence_number);
    assert_eq!(analyzer.registry().history("same").unwrap(), vec![0, 1]);
}

/// Escaped newlines in single-line inscriptions are undone before decoding.
#[test]
fn test_escaped_transport_newlines() {
    let encoded = CodecKind::Base85Rfc.encode(&jpeg_fixture());
    let input = format!(
        "{}\\nId: rgb:csg:x\\n\\n{}\\n{}\\n{}",
        BEGIN,
        &encoded[..100],
        &encoded[100..],
        END
    );

    let verdict = analyzer().analyze("escaped", input.as_bytes());
    assert!(verdict.valid, "{:?}", verdict.error);
    assert_eq!(verdict.matches[0].offset, 100);
}

/// A single-line body keeps literal `\\n` digits; only a leading escaped break marks escaping.
#[test]
fn test_inline_ascii85_with_backslash_n_digits() {
    let data = [0x66, 0x27, 0x25, 0xBB, 0x61, 0xA7, 0xBA, 0x89];
    let encoded = CodecKind::Ascii85.encode(&data);
    assert_eq!(encoded, "Ag\\n:@Ag\\n");

    let input = format!("-----BEGIN RGB CONTRACT-----{}-----END RGB CONTRACT-----", encoded);
    let verdict = analyzer().analyze("inline", input.as_bytes());

    assert_eq!(verdict.codec_used, Some(CodecKind::Ascii85));
    assert_eq!(verdict.decoded_len, Some(data.len()));
    assert_eq!(verdict.error_code.as_deref(), Some("ARMOR_NO_SIGNATURE_MATCH"));
}

/// Exhaustive mode prefers the highest-priority decode that has matches.
#[test]
fn test_exhaustive_mode_candidates() {
    let analyzer = analyzer();
    let input = consignment(&CodecKind::Base85Rfc.encode(&jpeg_fixture()));
    let verdict = analyzer.analyze_with_mode("doc", input.as_bytes(), DecodeMode::Exhaustive);

    assert!(verdict.valid);
    assert_eq!(verdict.attempts.len(), CodecKind::PRIORITY.len());
    assert_eq!(verdict.codec_used, Some(CodecKind::Base85Rfc));
    assert!(verdict
        .candidates
        .iter()
        .any(|c| c.codec == CodecKind::Base85Rfc && c.matches.len() == 1));
}

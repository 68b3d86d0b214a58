#![no_main]

use drydock_harness::AssetManifest;
use libfuzzer_sys::fuzz_target;

const MAX_CHUNK_BYTES: usize = 2048;

fn decode_chunk(bytes: &[u8]) -> String {
    let capped = &bytes[..bytes.len().min(MAX_CHUNK_BYTES)];
    String::from_utf8_lossy(capped).into_owned()
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let split = usize::from(data[0]) % (data.len() + 1);
    let json_chunk = decode_chunk(&data[..split]);
    let html_chunk = decode_chunk(&data[split..]);

    // Arbitrary JSON either parses into a manifest or errors cleanly.
    let manifest = AssetManifest::from_json(&json_chunk).unwrap_or_else(|_| AssetManifest::empty());

    // Rewriting through an empty manifest is the identity.
    assert_eq!(AssetManifest::empty().rewrite_html(&html_chunk), html_chunk);

    // A second pass over already-rewritten markup must stay well-formed.
    let rewritten = manifest.rewrite_html(&html_chunk);
    let _ = manifest.rewrite_html(&rewritten);

    // resolve falls back to the input exactly when lookup misses.
    let resolved = manifest.resolve(&html_chunk);
    match manifest.lookup(&html_chunk) {
        Some(hit) => assert_eq!(resolved, hit),
        None => assert_eq!(resolved, html_chunk),
    }
});

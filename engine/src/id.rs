//! Object names: the kind prefix plus a short random suffix, e.g. `image_ab3`.

use crate::types::ObjectKind;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz1234567890";
const SUFFIX_LEN: usize = 3;
// Largest multiple of the alphabet size below 256, for unbiased sampling.
const ACCEPT_BELOW: u8 = (256 / ALPHABET.len() * ALPHABET.len()) as u8;

fn random_suffix(len: usize) -> String {
    let mut out = String::with_capacity(len);
    while out.len() < len {
        for (i, byte) in uuid::Uuid::new_v4().into_bytes().into_iter().enumerate() {
            // version and variant bits
            if i == 6 || i == 8 || byte >= ACCEPT_BELOW { continue; }
            out.push(ALPHABET[byte as usize % ALPHABET.len()] as char);
            if out.len() == len { break; }
        }
    }
    out
}

pub fn object_id(kind: ObjectKind) -> String {
    format!("{}_{}", kind.prefix(), random_suffix(SUFFIX_LEN))
}

/// Like [`object_id`], retrying while `taken` reports a collision. The suffix
/// grows by one character every 64 failed attempts so a crowded scene still
/// terminates.
pub fn unique_object_id(kind: ObjectKind, taken: impl Fn(&str) -> bool) -> String {
    let mut len = SUFFIX_LEN;
    let mut attempts = 0;
    loop {
        let candidate = format!("{}_{}", kind.prefix(), random_suffix(len));
        if !taken(&candidate) { return candidate; }
        attempts += 1;
        if attempts % 64 == 0 { len += 1; }
    }
}

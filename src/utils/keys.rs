//! Email ⇄ realtime-database key helpers.
//!
//! Realtime database keys cannot contain `.`, `#`, `$`, `[`, `]` or `/`, so a
//! faculty email is stored under its base64url encoding. The forward direction
//! trims and lowercases first, so the round trip only loses casing.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;

// 舊資料可能帶有 '=' 補位，解碼時兩種都接受
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub fn firebase_key_from_email(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    URL_SAFE_NO_PAD.encode(normalized.as_bytes())
}

/// Returns `None` when `key` is not base64url or does not decode to UTF-8.
pub fn firebase_email_from_key(key: &str) -> Option<String> {
    let bytes = URL_SAFE_LENIENT.decode(key.trim()).ok()?;
    String::from_utf8(bytes).ok()
}

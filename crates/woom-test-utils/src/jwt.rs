// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Build a token shaped like a Zoom access token. Only the payload is
/// meaningful; header and signature are placeholders.
pub fn make_jwt(aid: &str, exp: i64) -> String {
    let payload = serde_json::json!({ "aid": aid, "exp": exp }).to_string();
    format!("e30.{}.sig", URL_SAFE_NO_PAD.encode(payload))
}

//! Live reload script injection into served HTML.

use crate::embed::serve::script_tag;
use crate::utils::mime;

/// Inject the live reload script if the body is HTML and a ws port is set.
pub fn maybe_inject_livereload(body: Vec<u8>, content_type: &str, ws_port: Option<u16>) -> Vec<u8> {
    match (mime::is_html(content_type), ws_port) {
        (true, Some(_)) => inject_script(&body, script_tag().as_bytes()),
        _ => body,
    }
}

/// Insert `script` before the last `</body>`, or append it.
fn inject_script(content: &[u8], script: &[u8]) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script);
    result.extend_from_slice(&content[pos..]);
    result
}

//! Applying a plan to source text.

use super::Plan;

/// Apply `plan` to `source` and trim surrounding whitespace.
///
/// Bytes outside the planned spans are copied verbatim; each span is replaced
/// by its marker.
pub fn rewrite(source: &str, plan: &Plan) -> String {
    let bytes = source.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(source.len());
    let mut pos = 0;

    for t in plan {
        if let Some(gap) = bytes.get(pos..t.cut_start) {
            out.extend_from_slice(gap);
        }
        out.extend_from_slice(t.marker.as_bytes());
        pos = pos.max(t.cut_end);
    }
    if let Some(tail) = bytes.get(pos..) {
        out.extend_from_slice(tail);
    }

    let text = match String::from_utf8(out) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    };
    text.trim().to_string()
}

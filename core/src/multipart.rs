//! `multipart/form-data` bodies for `add_attachment*` requests.
//!
//! TestRail accepts a single part named `attachment`. The body is built in
//! memory; attachments are expected to be screenshots and logs, not
//! multi-gigabyte files.

use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::TransportError;

/// Boundary used for every attachment upload. Callers must not upload
/// files containing this string.
pub const BOUNDARY: &str = "TestRailAPIAttachmentBoundary";

/// `Content-Type` header value matching `BOUNDARY`.
pub fn content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

/// Build the request body carrying the file at `path`.
///
/// Only the final path component is sent as the part's filename.
pub fn build_body(path: &Path) -> Result<Vec<u8>, TransportError> {
    let filename = path
        .file_name()
        .ok_or_else(|| TransportError::InvalidPath(path.to_path_buf()))?
        .to_string_lossy();

    let mut file = File::open(path)?;
    let size_hint = file.metadata().map(|m| m.len() as usize).unwrap_or(0);

    let mut body = Vec::with_capacity(size_hint + 256);
    body.extend_from_slice(format!("\n\n--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"attachment\"; filename=\"{filename}\"")
            .as_bytes(),
    );
    body.extend_from_slice(b"\r\n\r\n");
    io::copy(&mut file, &mut body)?;
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Ok(body)
}

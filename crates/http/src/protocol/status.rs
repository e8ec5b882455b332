/// Reason phrase for the status codes the server knows about.
pub fn reason_phrase(code: u16) -> Option<&'static str> {
    let reason = match code {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => return None,
    };
    Some(reason)
}

/// Reason phrase for the status line; unknown codes get a generic phrase.
#[inline]
pub fn status_line_reason(code: u16) -> &'static str {
    reason_phrase(code).unwrap_or("Unknown")
}

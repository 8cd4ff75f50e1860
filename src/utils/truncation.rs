const MAX_ERROR_LENGTH: usize = 2_000;

/// Cap error text stored in execution history. Cuts on a char boundary.
pub fn truncate_error(error: &str) -> String {
    if error.len() <= MAX_ERROR_LENGTH {
        return error.to_string();
    }
    let mut end = MAX_ERROR_LENGTH;
    while !error.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated {} bytes]", &error[..end], error.len() - end)
}

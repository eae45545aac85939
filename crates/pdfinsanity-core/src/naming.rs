//! Document file names

/// Name without its last extension. Leading-dot names keep their dot.
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(dot) => &name[..dot],
    }
}

/// Swap whatever extension `name` carries for `.pdf`, for downloads
pub fn normalize_pdf_filename(name: &str) -> String {
    format!("{}.pdf", file_stem(name))
}

/// Turn a user-entered name into a document name ending in `.pdf`.
///
/// Returns `None` for blank input so the caller can pick a default.
pub fn user_pdf_name(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.to_ascii_lowercase().ends_with(".pdf") {
        Some(trimmed.to_string())
    } else {
        Some(format!("{}.pdf", trimmed))
    }
}

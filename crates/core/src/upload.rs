use std::path::Path;

/// File extensions the client offers for upload.
pub const ACCEPTED_UPLOAD_EXTENSIONS: &[&str] = &["csv", "json", "txt", "xlsx"];

/// Whether `path` has one of [`ACCEPTED_UPLOAD_EXTENSIONS`] (case-insensitive).
///
/// Only the name is checked; content is left to the server.
pub fn is_accepted_upload(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ACCEPTED_UPLOAD_EXTENSIONS
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_extensions_any_case() {
        assert!(is_accepted_upload(Path::new("data/hiring.csv")));
        assert!(is_accepted_upload(Path::new("survey.XLSX")));
        assert!(is_accepted_upload(Path::new("notes.Txt")));
    }

    #[test]
    fn rejects_other_files() {
        assert!(!is_accepted_upload(Path::new("model.pkl")));
        assert!(!is_accepted_upload(Path::new("README")));
        assert!(!is_accepted_upload(Path::new("archive.csv.gz")));
    }
}

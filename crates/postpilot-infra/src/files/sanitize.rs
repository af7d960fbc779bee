/// Reduce an uploaded file name to a safe, flat name.
///
/// Path separators become whitespace, runs of whitespace become a single
/// `_`, and anything outside `[A-Za-z0-9_.-]` is dropped. Leading and
/// trailing `.` and `_` are trimmed, so the result can never be `..` or a
/// hidden file. Returns `None` when nothing usable is left.
pub fn secure_filename(name: &str) -> Option<String> {
    let flattened = name.replace(['/', '\\'], " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_ordinary_names() {
        assert_eq!(secure_filename("photo.png").as_deref(), Some("photo.png"));
        assert_eq!(secure_filename("my-pic_2.JPG").as_deref(), Some("my-pic_2.JPG"));
    }

    #[test]
    fn flattens_paths_and_whitespace() {
        assert_eq!(
            secure_filename("../../etc/passwd").as_deref(),
            Some("etc_passwd")
        );
        assert_eq!(
            secure_filename("summer  holiday.jpg").as_deref(),
            Some("summer_holiday.jpg")
        );
        assert_eq!(
            secure_filename("C:\\Users\\me\\cat.gif").as_deref(),
            Some("C_Users_me_cat.gif")
        );
    }

    #[test]
    fn drops_unsafe_characters() {
        assert_eq!(secure_filename("café<script>.png").as_deref(), Some("cafscript.png"));
        assert_eq!(secure_filename(".hidden").as_deref(), Some("hidden"));
    }

    #[test]
    fn nothing_left_is_none() {
        assert_eq!(secure_filename(""), None);
        assert_eq!(secure_filename(".."), None);
        assert_eq!(secure_filename("///"), None);
        assert_eq!(secure_filename("日本語"), None);
    }
}

//! Upload filename sanitization
//!
//! Produces a name that is safe to join onto the storage directory: no path
//! separators, no parent references, no leading dot, ASCII only, and no
//! longer than a single path component may be on common filesystems.

/// Longest sanitized name, in bytes
pub const MAX_FILENAME_LEN: usize = 255;

/// Extensions up to this length survive truncation of an over-long name
pub(crate) const MAX_EXTENSION_LEN: usize = 16;

/// Sanitize a client-supplied filename.
///
/// Path separators and runs of whitespace become single `_`, characters
/// outside `[A-Za-z0-9_.-]` are dropped, and leading/trailing `.` and `_`
/// are trimmed. Names longer than [`MAX_FILENAME_LEN`] have their stem
/// shortened, keeping a short extension. Returns `None` when nothing usable
/// is left.
///
/// ```
/// use audiocat_api::services::secure_filename;
///
/// assert_eq!(secure_filename("My cool song.wav").as_deref(), Some("My_cool_song.wav"));
/// assert_eq!(secure_filename("../../etc/passwd").as_deref(), Some("etc_passwd"));
/// assert_eq!(secure_filename("../.."), None);
/// ```
pub fn secure_filename(raw: &str) -> Option<String> {
    let separated: String = raw
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = separated.split_whitespace().collect::<Vec<_>>().join("_");

    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let trimmed = filtered.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        None
    } else {
        Some(truncate_name(trimmed))
    }
}

/// Shorten an ASCII name to `MAX_FILENAME_LEN` bytes, keeping its extension
fn truncate_name(name: &str) -> String {
    if name.len() <= MAX_FILENAME_LEN {
        return name.to_string();
    }

    match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= MAX_EXTENSION_LEN + 1 => {
            let extension = &name[dot..];
            format!("{}{}", &name[..MAX_FILENAME_LEN - extension.len()], extension)
        }
        _ => name[..MAX_FILENAME_LEN].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_unchanged() {
        assert_eq!(secure_filename("cantina.wav").as_deref(), Some("cantina.wav"));
        assert_eq!(secure_filename("track-01_final.mp3").as_deref(), Some("track-01_final.mp3"));
    }

    #[test]
    fn test_path_components_flattened() {
        assert_eq!(secure_filename("/home/user/starwars.wav").as_deref(), Some("home_user_starwars.wav"));
        assert_eq!(secure_filename("C:\\audio\\preamble.wav").as_deref(), Some("C_audio_preamble.wav"));
        assert_eq!(secure_filename("../../etc/passwd").as_deref(), Some("etc_passwd"));
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(secure_filename("  my   song .wav ").as_deref(), Some("my_song_.wav"));
    }

    #[test]
    fn test_unsafe_characters_dropped() {
        assert_eq!(secure_filename("a<b>c:d|e?.wav").as_deref(), Some("abcde.wav"));
        assert_eq!(secure_filename("canción.wav").as_deref(), Some("cancin.wav"));
    }

    #[test]
    fn test_hidden_names_lose_leading_dot() {
        assert_eq!(secure_filename(".bashrc").as_deref(), Some("bashrc"));
        assert_eq!(secure_filename(".upload-1234.part").as_deref(), Some("upload-1234.part"));
    }

    #[test]
    fn test_empty_results_rejected() {
        assert_eq!(secure_filename(""), None);
        assert_eq!(secure_filename("   "), None);
        assert_eq!(secure_filename(".."), None);
        assert_eq!(secure_filename("../.."), None);
        assert_eq!(secure_filename("日本語"), None);
    }

    #[test]
    fn test_long_name_keeps_extension() {
        let raw = format!("{}.wav", "a".repeat(300));
        let name = secure_filename(&raw).unwrap();
        assert_eq!(name.len(), MAX_FILENAME_LEN);
        assert!(name.ends_with(".wav"));
        assert!(name.starts_with("aaaa"));
    }

    #[test]
    fn test_long_name_with_long_extension_cut_flat() {
        let raw = format!("song.{}", "x".repeat(300));
        let name = secure_filename(&raw).unwrap();
        assert_eq!(name.len(), MAX_FILENAME_LEN);
        assert!(name.starts_with("song.xxx"));
    }

    #[test]
    fn test_name_at_limit_unchanged() {
        let raw = format!("{}.wav", "b".repeat(MAX_FILENAME_LEN - 4));
        assert_eq!(secure_filename(&raw).as_deref(), Some(raw.as_str()));
    }

    #[test]
    fn test_idempotent() {
        for raw in ["My cool song.wav", "../../x.wav", "a b/c.mp3"] {
            let once = secure_filename(raw).unwrap();
            assert_eq!(secure_filename(&once).as_deref(), Some(once.as_str()));
        }
    }
}

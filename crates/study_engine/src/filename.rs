use study_core::ArtifactId;

use crate::DownloadedFile;

const MAX_STEM_CHARS: usize = 80;

/// Local filename for a downloaded artifact: the server's name when it sent
/// a usable one, else `history-{id}.md`. Safe on Windows.
pub fn download_filename(file: &DownloadedFile, id: ArtifactId) -> String {
    file.filename
        .as_deref()
        .map(sanitize)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("history-{id}.md"))
}

fn sanitize(input: &str) -> String {
    // Drop any directory part the server may have sent.
    let base = input.rsplit(['/', '\\']).next().unwrap_or(input);

    let mut compacted = String::with_capacity(base.len());
    let mut prev_underscore = false;
    for c in base.chars() {
        let c = if is_forbidden(c) { '_' } else { c };
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }
    let trimmed = compacted.trim_matches(&['_', ' ', '.'][..]);
    if trimmed.is_empty() {
        return String::new();
    }

    let (stem, ext) = match trimmed.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (trimmed, None),
    };
    let mut stem: String = stem.chars().take(MAX_STEM_CHARS).collect();
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    match ext {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn file(name: Option<&str>) -> DownloadedFile {
        DownloadedFile {
            filename: name.map(str::to_string),
            content_type: None,
            bytes: Bytes::new(),
        }
    }

    #[test]
    fn keeps_server_name() {
        assert_eq!(
            download_filename(&file(Some("note_20240601.md")), ArtifactId(3)),
            "note_20240601.md"
        );
    }

    #[test]
    fn falls_back_to_id() {
        assert_eq!(download_filename(&file(None), ArtifactId(9)), "history-9.md");
        assert_eq!(download_filename(&file(Some("...")), ArtifactId(9)), "history-9.md");
    }

    #[test]
    fn strips_paths_and_forbidden_chars() {
        assert_eq!(
            download_filename(&file(Some("../../etc/pa:ss??wd.md")), ArtifactId(1)),
            "pa_ss_wd.md"
        );
        assert_eq!(download_filename(&file(Some("con.md")), ArtifactId(1)), "con_.md");
    }
}

//! Frontmatter splitting shared by the translator.
//!
//! A document carries frontmatter when its first line is `---`, a later
//! line is `---` again, and the metadata sits between the two. Anything
//! else is all body. The scan is a plain two-phase line walk, so malformed
//! input degrades to "no frontmatter" instead of misparsing.

/// Splits a markdown document into `(frontmatter, body)`.
///
/// The frontmatter slice excludes both delimiter lines; the body starts on
/// the line after the closing delimiter. Returns `(None, content)` when the
/// delimiter pair is absent.
pub(crate) fn split(content: &str) -> (Option<&str>, &str) {
    let mut lines = content.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return (None, content);
    };
    if first.trim_end() != "---" {
        return (None, content);
    }

    // Scan for the closing delimiter on its own line.
    let mut offset = first.len();
    for line in lines {
        if line.trim_end() == "---" {
            let frontmatter = &content[first.len()..offset];
            let body = &content[offset + line.len()..];
            return (Some(frontmatter), body);
        }
        offset += line.len();
    }

    (None, content)
}

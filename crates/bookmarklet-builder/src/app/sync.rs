//! Keep the embedded constant in the generated JavaScript in step with the manifest.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::domain::errors::BuildError;
use crate::domain::model::{EmbeddedEntry, Manifest};

const ENTRY_INDENT: &[u8] = b"        ";

/// Result of a successful sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub path: PathBuf,
    pub entries: usize,
}

/// Render the manifest as the array literal assigned to the embedded constant.
pub fn render_embedded_array(manifest: &Manifest, default_icon: &str) -> Result<String> {
    let items = manifest
        .bookmarklets
        .iter()
        .map(|bookmarklet| {
            to_indented_json(&EmbeddedEntry::from_bookmarklet(bookmarklet, default_icon))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(format!("[\n{}\n]", items.join(",\n")))
}

fn to_indented_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(ENTRY_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .context("failed to serialize embedded bookmarklet")?;
    String::from_utf8(buffer).context("serialized bookmarklet is not valid UTF-8")
}

/// Byte range of the first `const NAME = [ ... ];` declaration, including the `;`.
pub fn find_region(source: &str, constant: &str) -> Option<Range<usize>> {
    let marker = format!("const {constant} = [");
    let start = source.find(&marker)?;
    let open = start + marker.len() - 1;

    if let Some(close) = matching_bracket(source, open) {
        let after = &source[close + 1..];
        let gap = after.len() - after.trim_start().len();
        if after[gap..].starts_with(';') {
            return Some(start..close + 1 + gap + 1);
        }
    }

    tracing::warn!(
        constant,
        "embedded region is not a balanced array; using the first `];`"
    );
    let body = open + 1;
    source[body..]
        .find("];")
        .map(|offset| start..body + offset + 2)
}

/// Index of the `]` closing the `[` at `open`, skipping JS strings and comments.
fn matching_bracket(source: &str, open: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut depth = 0usize;
    let mut index = open;

    while index < bytes.len() {
        match bytes[index] {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            quote @ (b'"' | b'\'' | b'`') => {
                index += 1;
                while index < bytes.len() && bytes[index] != quote {
                    if bytes[index] == b'\\' {
                        index += 1;
                    }
                    index += 1;
                }
            }
            b'/' if bytes.get(index + 1) == Some(&b'/') => {
                while index < bytes.len() && bytes[index] != b'\n' {
                    index += 1;
                }
            }
            b'/' if bytes.get(index + 1) == Some(&b'*') => {
                let rest = source.get(index + 2..)?;
                index += 2 + rest.find("*/")? + 1;
            }
            _ => {}
        }
        index += 1;
    }

    None
}

/// Replace the first embedded region, or `None` when the declaration is absent.
pub fn replace_region(source: &str, constant: &str, array: &str) -> Option<String> {
    let region = find_region(source, constant)?;
    Some(format!(
        "{}const {constant} = {array};{}",
        &source[..region.start],
        &source[region.end..]
    ))
}

/// Rewrite `generated` so its embedded constant holds `manifest`.
///
/// Nothing is written when the declaration cannot be found.
pub fn sync_generated_source(
    manifest: &Manifest,
    generated: &Path,
    constant: &str,
    default_icon: &str,
) -> Result<SyncReport> {
    let array = render_embedded_array(manifest, default_icon)?;
    let source = fs::read_to_string(generated)
        .with_context(|| format!("failed to read {}", generated.display()))?;

    let updated = replace_region(&source, constant, &array).ok_or_else(|| {
        BuildError::RegionNotFound {
            constant: constant.to_owned(),
            path: generated.to_path_buf(),
        }
    })?;

    fs::write(generated, &updated)
        .with_context(|| format!("failed to write {}", generated.display()))?;
    tracing::debug!(path = %generated.display(), bytes = updated.len(), "generated source written");

    Ok(SyncReport {
        path: generated.to_path_buf(),
        entries: manifest.bookmarklets.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: &str = "EMBEDDED_BOOKMARKLETS";

    fn manifest(json: &str) -> Manifest {
        serde_json::from_str(json).expect("valid manifest")
    }

    #[test]
    fn renders_entries_with_defaults_and_optional_code() -> Result<()> {
        let manifest =
            manifest(r#"[{"name":"A","file":"a.js","code":"x();","tags":[1]},{"name":"B"}]"#);
        let rendered = render_embedded_array(&manifest, "🔖")?;

        assert!(rendered.starts_with("[\n{\n        \"name\": \"A\",\n"));
        assert!(rendered.contains("        \"code\": \"x();\"\n},\n{\n"));
        assert!(rendered.contains("        \"icon\": \"🔖\"\n}\n]"));
        assert!(!rendered.contains("tags"));
        Ok(())
    }

    #[test]
    fn replaces_only_the_declaration() {
        let source = "// header\nconst EMBEDDED_BOOKMARKLETS = [\n  {\"a\": 1}\n];\nfunction f() { return [1]; }\n";
        let updated = replace_region(source, NAME, "[]").expect("region found");
        assert_eq!(
            updated,
            "// header\nconst EMBEDDED_BOOKMARKLETS = [];\nfunction f() { return [1]; }\n"
        );
    }

    #[test]
    fn region_end_skips_brackets_inside_strings() {
        let source = "const EMBEDDED_BOOKMARKLETS = [\n{\"code\": \"var a=[1];\\\"]\"}\n];\nrest();";
        let region = find_region(source, NAME).expect("region found");
        assert_eq!(&source[region.end..], "\nrest();");
    }

    #[test]
    fn region_end_skips_comments() {
        let source = "const EMBEDDED_BOOKMARKLETS = [ // don't edit ]\n /* ]; */ ];\nrest();";
        let region = find_region(source, NAME).expect("region found");
        assert_eq!(&source[region.end..], "\nrest();");
    }

    #[test]
    fn unbalanced_region_falls_back_to_first_terminator() {
        let source = "const EMBEDDED_BOOKMARKLETS = [ [ ]; tail";
        let region = find_region(source, NAME).expect("region found");
        assert_eq!(&source[region.end..], " tail");
    }

    #[test]
    fn only_first_declaration_is_replaced() {
        let source = "const EMBEDDED_BOOKMARKLETS = [];\nconst EMBEDDED_BOOKMARKLETS = [];";
        let updated = replace_region(source, NAME, "[1]").unwrap();
        assert_eq!(
            updated,
            "const EMBEDDED_BOOKMARKLETS = [1];\nconst EMBEDDED_BOOKMARKLETS = [];"
        );
    }

    #[test]
    fn replacement_text_is_inserted_literally() {
        let updated = replace_region("const EMBEDDED_BOOKMARKLETS = [];", NAME, r#"["$1 \\d"]"#)
            .unwrap();
        assert_eq!(updated, r#"const EMBEDDED_BOOKMARKLETS = ["$1 \\d"];"#);
    }

    #[test]
    fn missing_declaration_writes_nothing() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("bookmarklets.js");
        fs::write(&path, "const OTHER = [];\n")?;

        let err = sync_generated_source(&Manifest::default(), &path, NAME, "🔖").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::RegionNotFound { .. })
        ));
        assert_eq!(fs::read_to_string(&path)?, "const OTHER = [];\n");
        Ok(())
    }

    #[test]
    fn unchanged_manifest_rewrites_identical_bytes() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("bookmarklets.js");
        fs::write(&path, "init();\nconst EMBEDDED_BOOKMARKLETS = [];\nrun();\n")?;
        let manifest = manifest(r#"[{"name":"A","file":"a.js","code":"x();"}]"#);

        sync_generated_source(&manifest, &path, NAME, "🔖")?;
        let first = fs::read_to_string(&path)?;
        let report = sync_generated_source(&manifest, &path, NAME, "🔖")?;

        assert_eq!(fs::read_to_string(&path)?, first);
        assert_eq!(report.entries, 1);
        assert!(first.ends_with("\n}\n];\nrun();\n"));
        Ok(())
    }
}

//! Path redaction for messages leaving the backend.
//!
//! Error messages from the loading pipeline embed filesystem paths (the
//! file that failed to parse, the base directory an import escaped). Those
//! are replaced with [`PATH_PLACEHOLDER`] before a message crosses the
//! boundary. HTTP(S) IRIs are ontology content and pass through verbatim.
//!
//! [`sanitize_message`] works on free text and redacts any token holding a
//! path separator. A path with spaces cannot be delimited in free text, so
//! errors whose path fields are known are rebuilt field by field in
//! [`crate::error`] instead of being scraped.

use regex::Regex;
use std::sync::OnceLock;

/// Replacement for every redacted path.
pub const PATH_PLACEHOLDER: &str = "<path>";

/// Compiled patterns for sanitization.
struct Patterns {
    /// `http://` and `https://` IRIs, kept as-is
    web_iri: Regex,
    /// Any token holding `/` or `\\`: `file://` IRIs, absolute, relative,
    /// home, traversal and drive paths
    path: Regex,
}

fn compiled_patterns() -> Option<&'static Patterns> {
    static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            let web_iri = Regex::new(r#"(?i)https?://[^\s<>"'`]+"#).ok()?;
            // The leading group stands in for a look-behind: a path starts
            // at the beginning of a segment or after a delimiter. A trailing
            // `:` or `.` belongs to the sentence, not the path.
            let path = Regex::new(
                r#"(^|[\s"'`(\[{<=,])([^\s"'`<>()\[\]{},;/\\]*[/\\](?:[^\s"'`<>)\]},;]*[^\s"'`<>)\]},;:.])?)"#,
            )
            .ok()?;
            Some(Patterns { web_iri, path })
        })
        .as_ref()
}

/// Redact filesystem paths in `message`, keeping HTTP(S) IRIs.
///
/// If the patterns cannot be compiled the whole message is replaced, so a
/// path never leaks through.
pub fn sanitize_message(message: &str) -> String {
    let Some(patterns) = compiled_patterns() else {
        return PATH_PLACEHOLDER.to_string();
    };

    let mut result = String::with_capacity(message.len());
    let mut last_end = 0;
    for iri in patterns.web_iri.find_iter(message) {
        result.push_str(&redact_paths(&patterns.path, &message[last_end..iri.start()]));
        result.push_str(iri.as_str());
        last_end = iri.end();
    }
    result.push_str(&redact_paths(&patterns.path, &message[last_end..]));
    result
}

/// Redact a document identifier.
///
/// HTTP(S) IRIs are kept. A `file:` IRI is generated from a filesystem
/// path and is replaced whole; anything else goes through
/// [`sanitize_message`].
pub fn sanitize_identifier(identifier: &str) -> String {
    let lower = identifier.trim_start().to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        identifier.to_string()
    } else if lower.starts_with("file:") {
        PATH_PLACEHOLDER.to_string()
    } else {
        sanitize_message(identifier)
    }
}

/// True if `message` contains anything [`sanitize_message`] would redact.
pub fn contains_path(message: &str) -> bool {
    sanitize_message(message) != message
}

fn redact_paths(pattern: &Regex, segment: &str) -> String {
    pattern
        .replace_all(segment, |caps: &regex::Captures<'_>| {
            format!("{}{}", &caps[1], PATH_PLACEHOLDER)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_absolute_path_redacted() {
        assert_eq!(
            sanitize_message("source file not found: /home/alice/onto/core.ttl"),
            "source file not found: <path>"
        );
    }

    #[test]
    fn test_home_and_traversal_redacted() {
        assert_eq!(
            sanitize_message("failed to parse ~/onto/a.ttl: bad token"),
            "failed to parse <path>: bad token"
        );
        assert_eq!(
            sanitize_message("import rejected: ../../etc/passwd escapes base"),
            "import rejected: <path> escapes base"
        );
    }

    #[test]
    fn test_two_paths_in_one_message() {
        assert_eq!(
            sanitize_message(
                "path /srv/sets/x/../../secret.ttl resolves outside allowed base directory /srv/sets/x"
            ),
            "path <path> resolves outside allowed base directory <path>"
        );
    }

    #[test]
    fn test_quoted_and_windows_paths() {
        assert_eq!(
            sanitize_message("failed to read config file '/etc/ontoview.toml': denied"),
            "failed to read config file '<path>': denied"
        );
        assert_eq!(
            sanitize_message(r"not a regular file: C:\ontologies\core"),
            "not a regular file: <path>"
        );
    }

    #[test]
    fn test_file_iri_redacted() {
        assert_eq!(
            sanitize_message("import cycle detected: file:///tmp/a.ttl -> http://example.org/b -> file:///tmp/a.ttl (cycle length 2)"),
            "import cycle detected: <path> -> http://example.org/b -> <path> (cycle length 2)"
        );
    }

    #[test]
    fn test_web_iris_preserved() {
        let message = "import depth limit 3 exceeded by http://purl.org/dc/terms/ at depth 4";
        assert_eq!(sanitize_message(message), message);

        let message = "document https://w3id.org/x/core#/ declares 30 imports, limit is 20";
        assert_eq!(sanitize_message(message), message);
        assert!(!contains_path(message));
    }

    #[test]
    fn test_plain_text_untouched() {
        let message = "unknown version v2 of ontology set elixir";
        assert_eq!(sanitize_message(message), message);
        assert_eq!(sanitize_message(""), "");
    }

    #[test]
    fn test_relative_paths_redacted() {
        assert_eq!(
            sanitize_message("source file not found: conf/sets/../../secret/root.ttl"),
            "source file not found: <path>"
        );
        assert_eq!(
            sanitize_message("path onto/v1/../x.ttl resolves outside allowed base directory onto/v1"),
            "path <path> resolves outside allowed base directory <path>"
        );
        assert_eq!(
            sanitize_message(r"failed to parse sets\core.ttl: unexpected end of file."),
            "failed to parse <path>: unexpected end of file."
        );
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            sanitize_identifier("http://example.org/core"),
            "http://example.org/core"
        );
        assert_eq!(
            sanitize_identifier("file:///srv/my%20ontologies/core.ttl"),
            "<path>"
        );
        assert_eq!(sanitize_identifier("urn:example:core"), "urn:example:core");
    }
}

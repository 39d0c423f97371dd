//! Programming language names and their file extensions

use crate::constants::pipeline::UNKNOWN_LANGUAGE;

/// Canonical extension for a language name, matched case-insensitively.
///
/// Returns `None` for languages we don't recognize; callers fall back to
/// whatever extension the filename already carries.
pub fn extension_for(language: &str) -> Option<&'static str> {
    let ext = match language.trim().to_ascii_lowercase().as_str() {
        "python" | "py" => ".py",
        "javascript" | "js" | "node" | "nodejs" => ".js",
        "typescript" | "ts" => ".ts",
        "rust" | "rs" => ".rs",
        "go" | "golang" => ".go",
        "java" => ".java",
        "c" => ".c",
        "c++" | "cpp" => ".cpp",
        "c#" | "csharp" | "cs" => ".cs",
        "ruby" | "rb" => ".rb",
        "php" => ".php",
        "kotlin" | "kt" => ".kt",
        "swift" => ".swift",
        "bash" | "shell" | "sh" => ".sh",
        "sql" => ".sql",
        "html" => ".html",
        "css" => ".css",
        _ => return None,
    };
    Some(ext)
}

/// Language name for a file, from its extension
pub fn from_filename(filename: &str) -> Option<&'static str> {
    let (_, ext) = filename.rsplit_once('.')?;
    let name = match ext.to_ascii_lowercase().as_str() {
        "py" => "Python",
        "js" | "mjs" | "cjs" => "JavaScript",
        "ts" => "TypeScript",
        "rs" => "Rust",
        "go" => "Go",
        "java" => "Java",
        "c" | "h" => "C",
        "cpp" | "cc" | "hpp" => "C++",
        "cs" => "C#",
        "rb" => "Ruby",
        "php" => "PHP",
        "kt" => "Kotlin",
        "swift" => "Swift",
        "sh" => "Bash",
        "sql" => "SQL",
        "html" => "HTML",
        "css" => "CSS",
        _ => return None,
    };
    Some(name)
}

/// True when the classifier could not name a language
pub fn is_unknown(language: &str) -> bool {
    let trimmed = language.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case(UNKNOWN_LANGUAGE)
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("none")
}

/// The ticket's language, or `default` when the ticket names none
pub fn resolve<'a>(ticket_language: &'a str, default: &'a str) -> &'a str {
    if is_unknown(ticket_language) {
        default
    } else {
        ticket_language.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_languages() {
        assert_eq!(extension_for("Python"), Some(".py"));
        assert_eq!(extension_for("JavaScript"), Some(".js"));
        assert_eq!(extension_for(" C++ "), Some(".cpp"));
        assert_eq!(extension_for("golang"), Some(".go"));
    }

    #[test]
    fn test_unknown_language() {
        assert_eq!(extension_for("Brainfuck"), None);
        assert_eq!(extension_for(""), None);
    }

    #[test]
    fn test_from_filename() {
        assert_eq!(from_filename("search.py"), Some("Python"));
        assert_eq!(from_filename("lib.RS"), Some("Rust"));
        assert_eq!(from_filename("Makefile"), None);
        assert_eq!(from_filename("notes.md"), None);
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        assert_eq!(resolve("Unknown", "Python"), "Python");
        assert_eq!(resolve("  ", "Python"), "Python");
        assert_eq!(resolve("Go", "Python"), "Go");
    }
}

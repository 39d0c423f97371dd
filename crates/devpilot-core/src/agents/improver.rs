//! Code improver

use super::prompts::{render, IMPROVE_PROMPT};

pub fn prompt(code: &str, feedback: &str, language: &str) -> String {
    render(
        IMPROVE_PROMPT,
        &[("code", code), ("feedback", feedback), ("language", language)],
    )
}

/// Drop markdown fence lines (```` ``` ```` and ```` ```lang ````) and trim.
pub fn clean(reply: &str) -> String {
    reply
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_fences() {
        let reply = "```python\ndef add(a, b):\n    return a + b\n```\n\n- Added types\n";
        assert_eq!(clean(reply), "def add(a, b):\n    return a + b\n\n- Added types");
    }

    #[test]
    fn test_clean_keeps_unfenced_reply() {
        assert_eq!(clean("  x = 1\n"), "x = 1");
    }

    #[test]
    fn test_prompt_carries_feedback() {
        let p = prompt("x = 1", "Use a constant", "Python");
        assert!(p.contains("Use a constant"));
        assert!(p.contains("improve the following Python code"));
    }
}

//! Code explainer

use super::prompts::{render, EXPLAIN_PROMPT};

pub fn prompt(code: &str, language: &str) -> String {
    render(EXPLAIN_PROMPT, &[("code", code), ("language", language)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt() {
        let p = prompt("fn main() {}", "Rust");
        assert!(p.contains("```Rust\nfn main() {}\n```"));
    }
}

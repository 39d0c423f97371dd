//! Marker-delimited reply grammar
//!
//! Agents ask the model to answer in sections introduced by literal markers
//! (`---CODE---`, `---EXPLANATION---`, ...). A [`SectionGrammar`] compiles the
//! ordered marker list into one regex with a named group per field:
//!
//! ```text
//! ---FILENAME---(?P<filename>.*?)---CODE---(?P<code>.*?)---EXPLANATION---(?P<explanation>.*)
//! ```
//!
//! Each field is the text between its marker and the next one (the last field
//! runs to the end of the reply), trimmed. Anything before the first marker is
//! ignored. Missing or out-of-order markers mean no match.

use regex::Regex;

/// Compiled grammar for one agent's reply format
#[derive(Debug)]
pub struct SectionGrammar {
    regex: Regex,
    sections: Vec<(&'static str, &'static str)>,
}

/// Fields extracted from one reply, borrowed from it
#[derive(Debug)]
pub struct Sections<'t> {
    values: Vec<(&'static str, &'t str)>,
}

impl SectionGrammar {
    /// Build a grammar from `(field, marker)` pairs in reply order.
    ///
    /// Field names must be valid regex group names.
    pub fn new(sections: &[(&'static str, &'static str)]) -> Result<Self, regex::Error> {
        let mut pattern = String::from("(?s)");
        for (idx, (field, marker)) in sections.iter().enumerate() {
            let body = if idx + 1 == sections.len() { ".*" } else { ".*?" };
            pattern.push_str(&regex::escape(marker));
            pattern.push_str(&format!("(?P<{}>{})", field, body));
        }

        Ok(Self {
            regex: Regex::new(&pattern)?,
            sections: sections.to_vec(),
        })
    }

    pub fn parse<'t>(&self, text: &'t str) -> Option<Sections<'t>> {
        let captures = self.regex.captures(text)?;
        let values = self
            .sections
            .iter()
            .map(|(field, _)| {
                let value = captures.name(field).map(|m| m.as_str().trim()).unwrap_or("");
                (*field, value)
            })
            .collect();
        Some(Sections { values })
    }

    /// Markers in order, for failure messages
    pub fn describe(&self) -> String {
        self.sections
            .iter()
            .map(|(_, marker)| *marker)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<'t> Sections<'t> {
    pub fn get(&self, field: &str) -> &'t str {
        self.values
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| *value)
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar() -> SectionGrammar {
        SectionGrammar::new(&[("first", "---A---"), ("second", "---B---"), ("third", "---C---")])
            .unwrap()
    }

    #[test]
    fn test_extracts_text_between_markers() {
        let sections = grammar()
            .parse("preamble\n---A---\n one \n---B---\ntwo\nlines\n---C---\n three\n")
            .unwrap();
        assert_eq!(sections.get("first"), "one");
        assert_eq!(sections.get("second"), "two\nlines");
        assert_eq!(sections.get("third"), "three");
    }

    #[test]
    fn test_missing_marker_is_no_match() {
        assert!(grammar().parse("---A---\none\n---C---\nthree").is_none());
    }

    #[test]
    fn test_out_of_order_markers_is_no_match() {
        assert!(grammar().parse("---B---\ntwo\n---A---\none\n---C---\nthree").is_none());
    }

    #[test]
    fn test_empty_section_is_present_but_empty() {
        let sections = grammar().parse("---A------B---x---C---").unwrap();
        assert_eq!(sections.get("first"), "");
        assert_eq!(sections.get("second"), "x");
        assert_eq!(sections.get("third"), "");
    }

    #[test]
    fn test_markers_are_literal() {
        let grammar = SectionGrammar::new(&[("a", "(x)"), ("b", "[y]")]).unwrap();
        let sections = grammar.parse("(x) 1 [y] 2").unwrap();
        assert_eq!(sections.get("a"), "1");
        assert_eq!(sections.get("b"), "2");
        assert_eq!(grammar.describe(), "(x), [y]");
    }
}

//! Prompt templates for every agent
//!
//! Templates use `{name}` placeholders filled by [`render`]. Substitution is a
//! single pass, so braces inside user code or tickets are never re-expanded.

pub const TICKET_PROMPT: &str = r#"You are a helpful engineering assistant. Analyze the following software development issue or feature request.

TASKS:
1. Classify the ticket as one of the following categories: [Bug, Feature, Documentation, Enhancement].
2. Rate its urgency as one of: [Low, Medium, High, Critical].
3. Identify the programming language being referred to in the ticket (e.g., Python, JavaScript, Java, etc.). If no specific language is mentioned, return "Unknown".
4. Generate a short summary (1-2 lines) of the ticket.

TICKET:
{ticket_text}

FORMAT:
Category: <one-word>
Urgency: <one-word>
Language: <one-word>
Summary: <summary here>
"#;

pub const DEV_PROMPT: &str = r#"You are an expert software engineer proficient in multiple programming languages.
Given a software development ticket, your job is to write clean, efficient, and minimal code to solve the problem or implement the feature.

---TICKET SUMMARY---
{summary}

---CATEGORY---
{category}

---LANGUAGE---
{language}
{feedback_section}
Instructions:
1. Return only a single code file in the specified language.
2. Focus on core logic only. Do not include setup, scaffolding, or unnecessary boilerplate.
3. Add helpful inline comments to explain the logic.
4. After the code, include a short paragraph explaining what the code does.

Format your output strictly like this:

---FILENAME---
<filename.ext>
---CODE---
<code here>
---EXPLANATION---
<brief explanation of what this code does>

Make sure your response is parsable using the above format.
"#;

pub const DEV_FEEDBACK_SECTION: &str = r#"
---PREVIOUS REVIEW---
A previous attempt at this ticket was reviewed and fell short. Address every point below in the new version:
{feedback}
"#;

pub const REVIEW_PROMPT: &str = r#"You are a senior {language} code reviewer. Review the following code snippet and do the following:
1. Identify any bugs or syntax errors.
2. Suggest improvements or optimizations.
3. Give a score out of 10 for code quality.
4. Mention whether the code is ready for deployment or needs changes.

CODE:
```{language}
{code}
```

FORMAT:
Review:
<your comments>
Score: <score>/10
Ready for deployment: Yes/No
"#;

pub const TEST_PROMPT: &str = r#"You are a senior {language} developer. Given the following code, generate 1-3 unit tests using the most common testing framework for {language}.

CODE:
```{language}
{code}
```

Requirements:
- Name the framework you chose.
- Tests must be realistic and reflect actual function behavior.

Output the result in this format:

---FRAMEWORK---
<framework name>

---TEST CODE---
<actual test code here>

---EXPLANATION---
<short explanation of what the tests cover>
"#;

pub const IMPROVE_PROMPT: &str = r#"You are a senior software engineer. Your task is to improve the following {language} code based on a reviewer's feedback.

--- CODE TO IMPROVE ---
{code}

--- REVIEWER FEEDBACK ---
{feedback}

Instructions:
- Improve the code based on the feedback.
- Return only the improved code followed by bullet points listing what was improved.
- Do not use markdown syntax (no triple backticks, no headings).
- Keep explanations minimal and directly tied to changes.
"#;

pub const EXPLAIN_PROMPT: &str = r#"You are an expert {language} developer. Explain the following {language} code in a clear and beginner-friendly way.

- Go line-by-line if possible.
- Avoid complex jargon.
- Use bullet points or markdown formatting.
- Make the explanation educational and helpful.

Code:
```{language}
{code}
```
"#;

/// Fill `{name}` placeholders from `vars` in one pass.
///
/// Unknown placeholders and stray braces are left as-is.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substituted = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });
        match substituted {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

//! Quiz block parsing for ```` ```faq ```` fences.
//!
//! Authoring format:
//!
//! ```text
//! What does print() return?
//! - None
//! - The printed string
//! > None
//! >> print writes to stdout and returns None.
//! ```

use seeder_shared::{Faq, FaqMode, Result, SeederError};

const OPTION_PREFIX: &str = "- ";
const ANSWER_PREFIX: &str = "> ";
const EXPLANATION_PREFIX: &str = ">> ";

/// Parse the text of a faq fence.
pub fn parse_faq(text: &str, mode: FaqMode) -> Result<Faq> {
    match mode {
        FaqMode::Strict => parse_strict(text),
        FaqMode::Lenient => Ok(parse_lenient(text)),
    }
}

/// Validate the question/options/answer/explanation shape.
fn parse_strict(text: &str) -> Result<Faq> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.len() < 4 {
        return Err(SeederError::parse(format!(
            "faq block needs a question, at least one option, an answer and an explanation \
             (got {} lines)",
            lines.len()
        )));
    }

    let question = lines[0];
    if question.starts_with(OPTION_PREFIX) || question.starts_with('>') {
        return Err(SeederError::parse(format!(
            "faq block must start with the question, found '{question}'"
        )));
    }

    let (answer_line, explanation_line) = (lines[lines.len() - 2], lines[lines.len() - 1]);

    let options = lines[1..lines.len() - 2]
        .iter()
        .map(|line| {
            line.strip_prefix(OPTION_PREFIX)
                .map(str::to_string)
                .ok_or_else(|| SeederError::parse(format!("faq option must start with '- ': '{line}'")))
        })
        .collect::<Result<Vec<_>>>()?;

    if answer_line.starts_with(EXPLANATION_PREFIX) {
        return Err(SeederError::parse(format!(
            "faq answer line must start with '> ', found '{answer_line}'"
        )));
    }
    let answer_key = answer_line.strip_prefix(ANSWER_PREFIX).ok_or_else(|| {
        SeederError::parse(format!("faq answer line must start with '> ', found '{answer_line}'"))
    })?;

    let explanation = explanation_line.strip_prefix(EXPLANATION_PREFIX).ok_or_else(|| {
        SeederError::parse(format!(
            "faq explanation line must start with '>> ', found '{explanation_line}'"
        ))
    })?;

    Ok(Faq {
        question: question.to_string(),
        options,
        answer_key: answer_key.to_string(),
        explanation: explanation.to_string(),
    })
}

/// Positional parsing that accepts anything.
fn parse_lenient(text: &str) -> Faq {
    let lines: Vec<&str> = text.split('\n').map(|line| line.trim_end_matches('\r')).collect();

    let options = lines
        .iter()
        .filter(|line| line.contains(OPTION_PREFIX))
        .map(|line| line.replacen(OPTION_PREFIX, "", 1))
        .collect();

    let answer_key = lines
        .len()
        .checked_sub(2)
        .map(|i| lines[i].replacen(ANSWER_PREFIX, "", 1))
        .unwrap_or_default();

    let explanation = lines
        .last()
        .map(|line| line.replacen(EXPLANATION_PREFIX, "", 1))
        .unwrap_or_default();

    Faq {
        question: lines.first().map(|line| line.to_string()).unwrap_or_default(),
        options,
        answer_key,
        explanation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "Q?\n- A\n- B\n> A\n>> because";

    #[test]
    fn strict_parses_well_formed_block() {
        let faq = parse_faq(WELL_FORMED, FaqMode::Strict).unwrap();
        assert_eq!(faq.question, "Q?");
        assert_eq!(faq.options, vec!["A", "B"]);
        assert_eq!(faq.answer_key, "A");
        assert_eq!(faq.explanation, "because");
    }

    #[test]
    fn lenient_matches_strict_on_well_formed_block() {
        let strict = parse_faq(WELL_FORMED, FaqMode::Strict).unwrap();
        let lenient = parse_faq(WELL_FORMED, FaqMode::Lenient).unwrap();
        assert_eq!(strict, lenient);
    }

    #[test]
    fn strict_rejects_short_block() {
        let err = parse_faq("Q?\n> A\n>> because", FaqMode::Strict).unwrap_err();
        assert!(err.to_string().contains("got 3 lines"));
    }

    #[test]
    fn strict_rejects_missing_explanation_marker() {
        let err = parse_faq("Q?\n- A\n- B\n> A\nbecause", FaqMode::Strict).unwrap_err();
        assert!(err.to_string().contains("explanation"));
    }

    #[test]
    fn strict_rejects_swapped_answer_and_explanation() {
        let err = parse_faq("Q?\n- A\n- B\n>> because\n> A", FaqMode::Strict).unwrap_err();
        assert!(matches!(err, SeederError::Parse { .. }));
    }

    #[test]
    fn strict_rejects_stray_line_between_options() {
        let err = parse_faq("Q?\n- A\nnot an option\n> A\n>> because", FaqMode::Strict)
            .unwrap_err();
        assert!(err.to_string().contains("not an option"));
    }

    #[test]
    fn strict_ignores_blank_lines_and_crlf() {
        let faq = parse_faq("Q?\r\n\r\n- A\r\n> A\r\n>> why\r\n", FaqMode::Strict).unwrap();
        assert_eq!(faq.options, vec!["A"]);
        assert_eq!(faq.explanation, "why");
    }

    #[test]
    fn lenient_misparses_without_failing() {
        let faq = parse_faq("Q?\n- A\n> A", FaqMode::Lenient).unwrap();
        assert_eq!(faq.question, "Q?");
        assert_eq!(faq.options, vec!["A"]);
        // Only two trailing lines, so the option doubles as the answer.
        assert_eq!(faq.answer_key, "- A");
        assert_eq!(faq.explanation, "> A");
    }

    #[test]
    fn lenient_single_line_has_empty_answer() {
        let faq = parse_faq("Q?", FaqMode::Lenient).unwrap();
        assert_eq!(faq.answer_key, "");
        assert_eq!(faq.explanation, "Q?");
    }
}

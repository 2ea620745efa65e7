//! Prompt Builder: renders a question into the instruction sent to providers

use crate::core::question::{Question, QuestionKind};
use serde::Serialize;
use std::sync::Arc;

/// Instruction text rendered once per question
///
/// Every provider in a round receives the same prompt. The text is shared
/// behind an `Arc` so fan-out never copies it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RenderedPrompt(Arc<str>);

impl RenderedPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RenderedPrompt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RenderedPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Templates for the exam prompt
pub struct PromptTemplate;

impl PromptTemplate {
    /// Role and reasoning instruction opening every prompt
    pub fn preamble() -> &'static str {
        r#"You are an expert exam solver. Read the question carefully and reason step by step before you commit to an answer.
Eliminate wrong options explicitly, then state your conclusion."#
    }

    /// The terminal output contract.
    ///
    /// The answer extractor's primary path parses exactly this shape, so the
    /// field names must not change.
    pub fn output_contract() -> &'static str {
        r#"After your reasoning, end your response with a JSON object on its own line, exactly in this form:
{"answer": "<your answer>", "confidence": <integer 0-100>}
"answer" is a string and "confidence" is an integer from 0 to 100."#
    }

    /// Kind-specific answer instruction
    pub fn kind_instruction(kind: QuestionKind) -> &'static str {
        match kind {
            QuestionKind::SingleChoice => {
                "Exactly one option is correct. Answer with the single option letter (e.g. \"B\")."
            }
            QuestionKind::MultiSelect => {
                "One or more options may be correct. Answer with every correct option letter, comma-separated (e.g. \"A, C\")."
            }
            QuestionKind::TrueFalse => {
                "Decide whether the statement is true or false. Answer with \"true\" or \"false\"."
            }
        }
    }

    /// Render a question into the provider prompt.
    ///
    /// Sections, in order: preamble, image notice (if any), question text,
    /// options as `<label>. <text>`, kind instruction, output contract.
    /// Pure: the same question always renders the same prompt.
    ///
    /// # Example
    ///
    /// ```
    /// use ensemble_domain::{PromptTemplate, Question};
    ///
    /// let question = Question::new("2 + 2 = ?").with_option("A", "3").with_option("B", "4");
    /// let prompt = PromptTemplate::render(&question);
    /// assert!(prompt.as_str().contains("A. 3\nB. 4"));
    /// assert!(prompt.as_str().contains(r#"{"answer": "<your answer>", "confidence": <integer 0-100>}"#));
    /// ```
    pub fn render(question: &Question) -> RenderedPrompt {
        let mut prompt = String::from(Self::preamble());
        prompt.push_str("\n\n");

        if question.has_image() {
            prompt.push_str(
                "An image accompanies this question. Use the information it shows to answer.\n\n",
            );
        }

        prompt.push_str("Question:\n");
        prompt.push_str(question.text().trim());
        prompt.push_str("\n\n");

        if !question.options().is_empty() {
            prompt.push_str("Options:\n");
            for option in question.options() {
                prompt.push_str(&format!("{}. {}\n", option.label.trim(), option.text.trim()));
            }
            prompt.push('\n');
        }

        prompt.push_str(Self::kind_instruction(question.kind()));
        prompt.push_str("\n\n");
        prompt.push_str(Self::output_contract());

        RenderedPrompt(prompt.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::question::QuestionImage;

    fn capital_question() -> Question {
        Question::new("What is the capital of France?")
            .with_option("A", "Lyon")
            .with_option("B", "Paris")
            .with_option("C", "Nice")
    }

    #[test]
    fn test_rendered_prompt_serializes_as_string() {
        let prompt = PromptTemplate::render(&capital_question());
        let json = serde_json::to_value(&prompt).unwrap();
        assert_eq!(json, serde_json::Value::String(prompt.as_str().to_string()));
    }

    #[test]
    fn test_sections_in_order() {
        let prompt = PromptTemplate::render(&capital_question());
        let text = prompt.as_str();

        let preamble = text.find("step by step").unwrap();
        let question = text.find("What is the capital of France?").unwrap();
        let option_a = text.find("A. Lyon").unwrap();
        let option_c = text.find("C. Nice").unwrap();
        let contract = text.find(r#"{"answer""#).unwrap();

        assert!(preamble < question);
        assert!(question < option_a);
        assert!(option_a < option_c);
        assert!(option_c < contract);
        assert!(text.ends_with(PromptTemplate::output_contract()));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            PromptTemplate::render(&capital_question()),
            PromptTemplate::render(&capital_question())
        );
    }

    #[test]
    fn test_image_notice() {
        let plain = PromptTemplate::render(&capital_question());
        assert!(!plain.as_str().contains("image accompanies"));

        let with_image = capital_question().with_image(QuestionImage::new(vec![0u8; 8], "image/png"));
        let prompt = PromptTemplate::render(&with_image);
        assert!(prompt.as_str().contains("An image accompanies this question"));
    }

    #[test]
    fn test_kind_instruction() {
        let tf = Question::new("The sun is a star.").with_kind(QuestionKind::TrueFalse);
        let prompt = PromptTemplate::render(&tf);
        assert!(prompt.as_str().contains("\"true\" or \"false\""));
        assert!(!prompt.as_str().contains("Options:"));

        let multi = capital_question().with_kind(QuestionKind::MultiSelect);
        assert!(PromptTemplate::render(&multi).as_str().contains("comma-separated"));
    }
}

//! Prompt construction and strict reply parsing for the two AI operations.

use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;
use tracing::{info, warn};

use super::{AiError, TextGenerator};
use crate::models::ai::{ExplainQuestionRequest, ExplanationResponse, GeneratedQuestion};

/// Number of choices a generated question must carry.
pub const GENERATED_OPTION_COUNT: usize = 4;

/// Opening or closing code-fence marker, with an optional language tag.
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z0-9_-]*").expect("fence pattern is valid"));

const GENERATE_TEMPLATE: &str = r#"TASK: Write one new multiple-choice question that closely matches the example below in topic, format and difficulty.

EXAMPLE QUESTION:
"{original}"

RULES:
1. Reply with a single JSON object and nothing else.
2. Do not add any text outside the JSON object.
3. The JSON object must have exactly this structure:
{
  "question": "Text of the new question",
  "options": [
    {"options": "A", "text": "Text of option A"},
    {"options": "B", "text": "Text of option B"},
    {"options": "C", "text": "Text of option C"},
    {"options": "D", "text": "Text of option D"}
  ],
  "correct_ans": "Letter of the correct option, e.g. B"
}"#;

/// How the user's submitted answer relates to the correct one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStatus {
    Correct,
    Incorrect,
    Unanswered,
}

impl AnswerStatus {
    /// Blank answers count as unanswered. Comparison ignores case (Unicode
    /// lowercase) and surrounding whitespace.
    pub fn classify(user_answer: Option<&str>, correct_answer: &str) -> Self {
        match user_answer.map(str::trim).filter(|a| !a.is_empty()) {
            None => AnswerStatus::Unanswered,
            Some(answer) if answer.to_lowercase() == correct_answer.trim().to_lowercase() => {
                AnswerStatus::Correct
            }
            Some(_) => AnswerStatus::Incorrect,
        }
    }
}

/// Removes code-fence markers and surrounding whitespace.
pub fn strip_formatting(raw: &str) -> String {
    FENCE_RE.replace_all(raw, "").trim().to_string()
}

pub fn similar_question_prompt(original: &str) -> String {
    GENERATE_TEMPLATE.replace("{original}", original.trim())
}

/// Strictly parses a generation reply: four distinctly labeled, non-empty
/// options and a `correct_ans` naming one of them.
pub fn parse_generated_question(raw: &str) -> Result<GeneratedQuestion, AiError> {
    let cleaned = strip_formatting(raw);
    let mut generated: GeneratedQuestion = serde_json::from_str(&cleaned)
        .map_err(|e| AiError::InvalidReply(format!("not a question object: {}", e)))?;

    if generated.question.trim().is_empty() {
        return Err(AiError::InvalidReply("question text is empty".to_string()));
    }

    if generated.options.len() != GENERATED_OPTION_COUNT {
        return Err(AiError::InvalidReply(format!(
            "expected {} options, got {}",
            GENERATED_OPTION_COUNT,
            generated.options.len()
        )));
    }

    let mut seen = HashSet::new();
    for option in &generated.options {
        let label = option.label.trim().to_uppercase();
        if label.is_empty() || option.text.trim().is_empty() {
            return Err(AiError::InvalidReply("option with empty label or text".to_string()));
        }
        if !seen.insert(label) {
            return Err(AiError::InvalidReply(format!("duplicate option label '{}'", option.label)));
        }
    }

    let correct = generated
        .options
        .iter()
        .find(|o| o.label.trim().eq_ignore_ascii_case(generated.correct_ans.trim()))
        .map(|o| o.label.trim().to_string())
        .ok_or_else(|| {
            AiError::InvalidReply(format!(
                "correct_ans '{}' does not name an option",
                generated.correct_ans
            ))
        })?;
    generated.correct_ans = correct;

    Ok(generated)
}

pub fn explanation_prompt(request: &ExplainQuestionRequest) -> String {
    let options_text = request
        .options
        .iter()
        .map(|o| format!("{}) {}", o.label, o.text))
        .collect::<Vec<_>>()
        .join("\n");

    let correct = request.correct_answer.trim();
    let user_answer = request.user_answer.as_deref().map(str::trim).unwrap_or_default();

    let (context, instruction) = match AnswerStatus::classify(request.user_answer.as_deref(), correct) {
        AnswerStatus::Correct => (
            format!("USER ANSWER: {} (CORRECT)", user_answer),
            "The user answered correctly. Start by congratulating them, then explain in simple \
             terms why this option is correct and why the other important options are wrong."
                .to_string(),
        ),
        AnswerStatus::Incorrect => (
            format!("USER ANSWER: {} (INCORRECT)", user_answer),
            format!(
                "The user answered incorrectly. Point this out kindly. First explain why the \
                 correct answer ({}) is correct. Then explain specifically why the option the \
                 user chose ({}) is wrong or is a common mistake.",
                correct, user_answer
            ),
        ),
        AnswerStatus::Unanswered => (
            String::new(),
            format!(
                "The user did not answer. Go straight to the point: explain in detail why the \
                 correct answer ({}) is correct and why the other options are distractors.",
                correct
            ),
        ),
    };

    format!(
        "TASK: You are a helpful teacher. Explain the multiple-choice question below, following the instruction.\n\n\
         --- QUESTION ---\n\
         QUESTION: {}\n\
         OPTIONS:\n{}\n\
         CORRECT ANSWER: {}\n\
         {}\n\
         --- END ---\n\n\
         INSTRUCTION:\n{}\n\n\
         RULES:\n\
         1. Reply with the explanation text only.\n\
         2. Add nothing besides the explanation.",
        request.question.trim(),
        options_text,
        correct,
        context,
        instruction
    )
}

/// Cleans an explanation reply: fences and markdown emphasis removed.
pub fn parse_explanation(raw: &str) -> Result<ExplanationResponse, AiError> {
    let explanation = strip_formatting(raw).replace('*', "").trim().to_string();
    if explanation.is_empty() {
        return Err(AiError::InvalidReply("explanation is empty".to_string()));
    }
    Ok(ExplanationResponse { explanation })
}

/// Asks the model for a new question similar to `original_question`.
pub async fn generate_similar_question(
    generator: &dyn TextGenerator,
    original_question: &str,
) -> Result<GeneratedQuestion, AiError> {
    let raw = generator.generate(&similar_question_prompt(original_question)).await?;
    let parsed = parse_generated_question(&raw).inspect_err(|e| {
        warn!(error = %e, reply_len = raw.len(), "Discarding malformed question reply");
    })?;
    info!(question_len = parsed.question.len(), "Similar question generated");
    Ok(parsed)
}

/// Asks the model to explain the question, tailored to the user's answer.
pub async fn explain_question(
    generator: &dyn TextGenerator,
    request: &ExplainQuestionRequest,
) -> Result<ExplanationResponse, AiError> {
    let raw = generator.generate(&explanation_prompt(request)).await?;
    parse_explanation(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ai::LabeledOption;

    const GOOD: &str = r#"{
        "question": "Which organelle produces ATP?",
        "options": [
            {"options": "A", "text": "Nucleus"},
            {"options": "B", "text": "Mitochondria"},
            {"options": "C", "text": "Ribosome"},
            {"options": "D", "text": "Golgi"}
        ],
        "correct_ans": "b"
    }"#;

    #[test]
    fn parses_fenced_json_and_normalizes_correct_label() {
        let raw = format!("```json\n{}\n```\n", GOOD);
        let q = parse_generated_question(&raw).unwrap();
        assert_eq!(q.options.len(), 4);
        assert_eq!(q.options[1].label, "B");
        assert_eq!(q.correct_ans, "B");
    }

    #[test]
    fn rejects_non_json_and_wrong_shapes() {
        assert!(parse_generated_question("Sure! Here is a question: ...").is_err());
        assert!(parse_generated_question("").is_err());
        assert!(parse_generated_question(r#"{"question": "Q"}"#).is_err());

        let three = GOOD.replace(r#"{"options": "D", "text": "Golgi"}"#, "").replace("\"Ribosome\"},", "\"Ribosome\"}");
        assert!(parse_generated_question(&three).is_err());

        let unknown_answer = GOOD.replace(r#""correct_ans": "b""#, r#""correct_ans": "E""#);
        assert!(parse_generated_question(&unknown_answer).is_err());

        let duplicate = GOOD.replace(r#""options": "D""#, r#""options": "A""#);
        assert!(parse_generated_question(&duplicate).is_err());
    }

    #[test]
    fn classifies_user_answers() {
        assert_eq!(AnswerStatus::classify(None, "B"), AnswerStatus::Unanswered);
        assert_eq!(AnswerStatus::classify(Some("  "), "B"), AnswerStatus::Unanswered);
        assert_eq!(AnswerStatus::classify(Some(" b "), "B"), AnswerStatus::Correct);
        assert_eq!(AnswerStatus::classify(Some("C"), "B"), AnswerStatus::Incorrect);
        assert_eq!(AnswerStatus::classify(Some("ç"), "Ç"), AnswerStatus::Correct);
        assert_eq!(AnswerStatus::classify(Some("Ölçüm"), " ÖLÇÜM "), AnswerStatus::Correct);
        assert_eq!(AnswerStatus::classify(Some("Ö"), "Ü"), AnswerStatus::Incorrect);
    }

    #[test]
    fn explanation_prompt_reflects_answer_status() {
        let mut request = ExplainQuestionRequest {
            question: "Which organelle produces ATP?".into(),
            options: vec![
                LabeledOption { label: "A".into(), text: "Nucleus".into() },
                LabeledOption { label: "B".into(), text: "Mitochondria".into() },
            ],
            correct_answer: "B".into(),
            user_answer: Some("A".into()),
        };
        let prompt = explanation_prompt(&request);
        assert!(prompt.contains("USER ANSWER: A (INCORRECT)"));
        assert!(prompt.contains("B) Mitochondria"));

        request.user_answer = Some("B".into());
        assert!(explanation_prompt(&request).contains("(CORRECT)"));

        request.user_answer = None;
        let prompt = explanation_prompt(&request);
        assert!(!prompt.contains("USER ANSWER"));
        assert!(prompt.contains("did not answer"));
    }

    #[test]
    fn explanation_is_cleaned_and_must_not_be_empty() {
        let parsed = parse_explanation("```\n**Great job!** B is right.\n```").unwrap();
        assert_eq!(parsed.explanation, "Great job! B is right.");
        assert!(parse_explanation("```\n***\n```").is_err());
    }
}

// Prompt constants for the interview generators.
// Templates use `{placeholder}` slots filled in a single pass by `fill_template`.

/// System prompt for question generation.
pub const QUESTION_SYSTEM: &str = "You are an expert technical interviewer. \
    You ask one clear, self-contained interview question at a time. \
    Respond with the question text only: no numbering, no preamble, no answer.";

pub const QUESTION_PROMPT_TEMPLATE: &str = "\
Generate a {difficulty} level interview question for a {role} position focusing on {topic}.

Previous questions asked:
{previous_questions}

Generate a unique question that hasn't been asked before.

Question:";

/// System prompt for answer evaluation. Enforces JSON-only output.
pub const FEEDBACK_SYSTEM: &str = "You are an expert interviewer evaluating a candidate's answer. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

pub const FEEDBACK_PROMPT_TEMPLATE: &str = "\
Question: {question}
Candidate's Answer: {answer}

Provide detailed feedback on:
1. Correctness and completeness
2. Communication clarity
3. Technical depth
4. Areas for improvement

Also provide a score from 0-10.

Return a JSON object of this exact shape:
{\"score\": <number 0-10>, \"feedback\": \"<detailed feedback>\"}";

pub fn build_question_prompt(
    role: &str,
    difficulty: &str,
    topic: &str,
    previous_questions: &[String],
) -> String {
    let previous = if previous_questions.is_empty() {
        "None".to_string()
    } else {
        previous_questions.join("\n")
    };

    fill_template(
        QUESTION_PROMPT_TEMPLATE,
        &[
            ("difficulty", difficulty),
            ("role", role),
            ("topic", topic),
            ("previous_questions", &previous),
        ],
    )
}

pub fn build_feedback_prompt(question: &str, answer: &str) -> String {
    fill_template(
        FEEDBACK_PROMPT_TEMPLATE,
        &[("question", question), ("answer", answer)],
    )
}

/// Replaces each `{name}` slot with its value. Substituted text is never
/// rescanned, and braces that do not name a slot are kept as written.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let slot = after
            .find('}')
            .map(|close| &after[..close])
            .and_then(|name| values.iter().find(|(key, _)| *key == name));

        match slot {
            Some((name, value)) => {
                out.push_str(value);
                rest = &after[name.len() + 1..];
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

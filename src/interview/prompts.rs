//! Instruction templates that turn the model into an interviewer
//!
//! Templates use `{name}` placeholders. Rendering is a single left-to-right
//! pass, so text coming from a field value is never re-expanded, and a
//! placeholder without a value is left in the output as written.

use super::session::{InterviewType, SessionConfig};

/// Instructions for a coding interview
pub const CODING_INTERVIEWER_PROMPT: &str = r#"
Act as an interviewer for a '{position}' role at '{company}', asking {difficulty} difficulty coding questions of the '{type}' type.

Follow these instructions when generating responses:
	1.	Begin by presenting a question relevant to the role and company that asks the candidate to write code.
	2.	If the candidate's answer is correct, acknowledge it and move on to the next question.
	3.	If the candidate's answer is incorrect:
	    •	Give hints that help the candidate improve the answer.
	    •	Do not reveal the correct answer right away; encourage another attempt.
	    •	If the candidate still does not get it right, explain the correct answer and move on.
	4.	Start at the specified difficulty and make the questions gradually harder to probe depth of knowledge and adaptability.

Keep your responses clear, concise and professional, and make them educational. Tailor feedback to the candidate's level of expertise.

Format responses with new lines and white space.
"#;

/// Instructions for a product-sense interview
pub const PRODUCT_INTERVIEWER_PROMPT: &str = r#"
Act as an interviewer assessing a candidate's product sense, metrics and experimentation skills for the role of '{position}' at '{company}'. Keep the questions at {difficulty} difficulty. Recruiter notes for this interview: '{type}'.

Follow these guidelines when generating responses:
	1.	Role and context: play a product manager or data scientist running the interview. Focus on product strategy, key metrics, experiment design and interpreting results.
	2.	Question style:
	    •	Ask scenario-based questions about product goals, success metrics and experiments relevant to the company.
	    •	Include trade-off analysis, risk identification and user-experience improvements.
	    •	Probe statistical understanding (A/B testing, sample size calculations) where relevant.
	3.	Evaluation:
	    •	If the answer is correct or well reasoned, acknowledge it, briefly explain why it is good, then ask the next question.
	    •	If the answer is partially correct or unclear, give a hint or rephrase the question and let the candidate try again.
	    •	If the second attempt is still wrong, explain the correct answer thoroughly and move on.
	4.	Tone: professional and constructive. Feedback should be actionable and adapted to the expertise the candidate shows.
	5.	Progression: start at the specified difficulty with product metrics questions and move toward experiment design and data interpretation.

Keep your responses clear, concise and professional, and make them educational. Tailor feedback to the candidate's level of expertise.

Format responses with new lines and white space.
"#;

/// Fixed instruction sent when the candidate asks for a summary
pub const SUMMARY_PROMPT: &str = "Analyze the conversation and interview performance until now. Then provide concrete areas of improvement and a study plan to the candidate. Be concise and professional in your response.";

/// Returned instead of a summary when the interview is too short
pub const NOT_ENOUGH_CONVERSATION: &str = "Not enough conversations";

const CODE_REVIEW_PROMPT: &str = r#"Question: {question}
My solution: {code}

Analyze this code for:
1. Time/space complexity
2. Edge cases missed
3. Alternative approaches (e.g., iterative vs. recursive)"#;

const TECHNICAL_QUESTION_PROMPT: &str =
    "Generate a {difficulty}-difficulty coding question about {topic}. Include a sample input/output.";

const BEHAVIORAL_QUESTION_PROMPT: &str =
    "Simulate a behavioral interview for a {role} role. Ask a STAR-formatted question.";

const CRITIQUE_ANSWER_PROMPT: &str =
    "Critique this STAR answer: {answer}. Focus on specificity and metrics.";

/// Role used when a behavioural question names none
pub const DEFAULT_BEHAVIORAL_ROLE: &str = "machine learning";

/// Substitute `{name}` placeholders from `values`.
///
/// Placeholders whose value is `None` or that have no entry are kept verbatim.
pub fn render_template(template: &str, values: &[(&str, Option<&str>)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let name = &after[..close];
        let value = values
            .iter()
            .find(|(key, _)| *key == name)
            .and_then(|(_, value)| *value);

        match value {
            Some(v) => out.push_str(v),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

/// Render the interviewer instructions for a session
pub fn system_prompt(config: &SessionConfig) -> String {
    let template = match config.interview_type {
        InterviewType::Coding => CODING_INTERVIEWER_PROMPT,
        InterviewType::ProductSense => PRODUCT_INTERVIEWER_PROMPT,
    };

    render_template(
        template,
        &[
            ("position", Some(config.position.as_str())),
            ("company", Some(config.company.as_str())),
            ("type", config.recruiter_material.as_deref()),
            ("difficulty", config.difficulty.map(|d| d.as_str())),
        ],
    )
}

/// Prompt asking for a complexity/edge-case review of a solution
pub fn code_review_prompt(question: &str, code: &str) -> String {
    render_template(
        CODE_REVIEW_PROMPT,
        &[("question", Some(question)), ("code", Some(code))],
    )
}

/// Prompt asking for a fresh practice question
pub fn technical_question_prompt(topic: &str, difficulty: &str) -> String {
    render_template(
        TECHNICAL_QUESTION_PROMPT,
        &[("topic", Some(topic)), ("difficulty", Some(difficulty))],
    )
}

/// Prompt asking for one STAR-formatted behavioural question
pub fn behavioral_question_prompt(role: &str) -> String {
    render_template(BEHAVIORAL_QUESTION_PROMPT, &[("role", Some(role))])
}

/// Prompt asking for feedback on a STAR answer
pub fn critique_answer_prompt(answer: &str) -> String {
    render_template(CRITIQUE_ANSWER_PROMPT, &[("answer", Some(answer))])
}

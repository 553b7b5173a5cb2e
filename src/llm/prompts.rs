//! Prompt templates for analysis, keyword generation, coaching, and rewriting

pub const KEYWORD_TEMPERATURE: f32 = 0.4;
pub const KEYWORD_MAX_TOKENS: u32 = 2048;
pub const CHAT_TEMPERATURE: f32 = 0.7;
pub const CHAT_RESUME_CONTEXT_CHARS: usize = 3000;
pub const FORGE_TEMPERATURE: f32 = 0.4;
pub const FORGE_MAX_TOKENS: u32 = 100;
pub const HUMANIZE_TEMPERATURE: f32 = 0.8;
pub const HUMANIZE_MAX_TOKENS: u32 = 1024;

/// Parameters for prompt template substitution
#[derive(Debug, Clone)]
pub struct PromptParams {
    pub resume_content: String,
    pub job_role: String,
    pub job_level: String,
    pub job_description: Option<String>,
}

pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are an Applicant Tracking System (ATS) that scores resumes against a target role.
Respond with ONLY a JSON object, no markdown and no commentary, in exactly this shape:
{"score": <number 0-100>, "missingKeywords": [<string>, ...], "summary": "<2-3 sentence assessment>"}
- "score" reflects how well the resume matches the role, level, and job description.
- "missingKeywords" lists important skills or terms absent from the resume, most important first, at most 15.
- "summary" is plain text."#;

const ANALYSIS_USER_TEMPLATE: &str = r#"TARGET ROLE: {role}
EXPERIENCE LEVEL: {level}

JOB DESCRIPTION:
{job_description}

<RESUME>
{resume}
</RESUME>"#;

const KEYWORD_TEMPLATE: &str = "Give keywords for the resume for an {level} in {role} role in three sections: 'Work experience', 'Projects', 'Skills'. The response should be in JSON format.";

const CHAT_SYSTEM_TEMPLATE: &str = r#"You are an expert ATS Resume Consultant.
Context:
- User is applying for: {role}
- Resume Content: "{resume}..." (truncated for brevity)

Goal: Answer the user's specific questions about improving their resume. Be concise, actionable, and encouraging.
Format: Use simple text with bullet points if needed. Do not use complex markdown."#;

pub const FORGE_SYSTEM_PROMPT: &str = r#"You are a Talent Acquisition Specialist.

TASK: Rewrite the candidate's weak resume bullet point to be HIGH IMPACT.

RULES:
1. Use the XYZ formula: "Accomplished [X] as measured by [Y], by doing [Z]".
2. Add plausible placeholders for metrics if missing (e.g., "[X]%").
3. Remove fluff words ("Responsible for", "Helped with"). Start with strong action verbs (Engineered, Spearheaded, Optimized).
4. Keep it under 25 words.
5. OUTPUT: Return ONLY the rewritten bullet point. No quotes, no preamble."#;

const FORGE_USER_TEMPLATE: &str = r#"TARGET ROLE: {role}
WEAK BULLET: "{bullet}"

REWRITE:"#;

const HUMANIZE_SYSTEM_TEMPLATE: &str = r#"You are a Text Humanizer Engine.

CRITICAL CONSTRAINT:
- Input Word Count: {words} words.
- OUTPUT LIMIT: Must be between {min_words} and {max_words} words.
- DO NOT EXCEED {max_words} words.

OBJECTIVE:
Rewrite the text so it reads like a real person wrote it in one pass without over-editing.

RULES:
1. Remove decorative adjectives; prefer strong verbs.
2. Vary rhythm: mix a very short sentence with a longer, looser one.
3. Avoid these words: "delve", "realm", "tapestry", "landscape", "leverage", "utilize", "underscore", "testament", "pivotal", "In conclusion", "Moreover", "Furthermore".
4. No bullet points unless the input had them. No headers. Just the raw text.

TONE ("{tone}"): {tone_guide}"#;

impl PromptParams {
    pub fn job_description_or_default(&self) -> &str {
        match self.job_description.as_deref().map(str::trim) {
            Some(description) if !description.is_empty() => description,
            _ => "Not provided",
        }
    }
}

/// Single pass over the template; substituted values are never rescanned,
/// so placeholders typed by the user stay literal.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let tail = &rest[open..];
        let substitution = tail.find('}').and_then(|close| {
            let name = &tail[1..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match substitution {
            Some((value, close)) => {
                output.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                output.push('{');
                rest = &tail[1..];
            }
        }
    }
    output.push_str(rest);
    output
}

pub fn render_analysis(params: &PromptParams) -> String {
    fill(
        ANALYSIS_USER_TEMPLATE,
        &[
            ("role", params.job_role.as_str()),
            ("level", params.job_level.as_str()),
            ("job_description", params.job_description_or_default()),
            ("resume", params.resume_content.as_str()),
        ],
    )
}

pub fn render_keywords(params: &PromptParams) -> String {
    let mut prompt = fill(
        KEYWORD_TEMPLATE,
        &[("level", params.job_level.as_str()), ("role", params.job_role.as_str())],
    );

    if let Some(description) = params.job_description.as_deref().filter(|d| !d.trim().is_empty()) {
        prompt.push_str("\nFocus on this job description:\n");
        prompt.push_str(description.trim());
    }
    prompt
}

pub fn render_chat_system(job_role: &str, resume_excerpt: &str) -> String {
    fill(CHAT_SYSTEM_TEMPLATE, &[("role", job_role), ("resume", resume_excerpt)])
}

pub fn render_forge(job_role: &str, bullet: &str) -> String {
    fill(FORGE_USER_TEMPLATE, &[("role", job_role), ("bullet", bullet)])
}

pub fn render_humanize_system(words: usize, min_words: usize, max_words: usize, tone: &str, tone_guide: &str) -> String {
    let (words, min_words, max_words) = (words.to_string(), min_words.to_string(), max_words.to_string());
    fill(
        HUMANIZE_SYSTEM_TEMPLATE,
        &[
            ("words", words.as_str()),
            ("min_words", min_words.as_str()),
            ("max_words", max_words.as_str()),
            ("tone", tone),
            ("tone_guide", tone_guide),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(description: Option<&str>) -> PromptParams {
        PromptParams {
            resume_content: "Built Rust services at Tech Corp.".to_string(),
            job_role: "Backend Engineer".to_string(),
            job_level: "Senior Level".to_string(),
            job_description: description.map(str::to_string),
        }
    }

    #[test]
    fn test_analysis_rendering() {
        let prompt = render_analysis(&params(Some("Kafka and Postgres")));
        assert!(prompt.contains("TARGET ROLE: Backend Engineer"));
        assert!(prompt.contains("EXPERIENCE LEVEL: Senior Level"));
        assert!(prompt.contains("Kafka and Postgres"));
        assert!(prompt.contains("<RESUME>\nBuilt Rust services at Tech Corp.\n</RESUME>"));
    }

    #[test]
    fn test_missing_description_placeholder() {
        assert!(render_analysis(&params(None)).contains("Not provided"));
        assert!(render_analysis(&params(Some("   "))).contains("Not provided"));
    }

    #[test]
    fn test_keyword_prompt() {
        let prompt = render_keywords(&params(None));
        assert!(prompt.starts_with("Give keywords for the resume for an Senior Level in Backend Engineer role"));
        assert!(!prompt.contains("Focus on"));
        assert!(render_keywords(&params(Some("gRPC"))).ends_with("gRPC"));
    }

    #[test]
    fn test_system_prompt_demands_schema() {
        for field in ["\"score\"", "\"missingKeywords\"", "\"summary\""] {
            assert!(ANALYSIS_SYSTEM_PROMPT.contains(field));
        }
    }

    #[test]
    fn test_user_text_placeholders_stay_literal() {
        let params = PromptParams {
            resume_content: "Résumé body".to_string(),
            job_role: "Engineer {resume}".to_string(),
            job_level: "Mid Level".to_string(),
            job_description: Some("Needs {job_description} and {role}".to_string()),
        };
        let prompt = render_analysis(&params);
        assert!(prompt.contains("TARGET ROLE: Engineer {resume}\n"));
        assert!(prompt.contains("Needs {job_description} and {role}"));
        assert_eq!(prompt.matches("Résumé body").count(), 1);

        assert_eq!(fill("a {x} {unknown} {", &[("x", "{x}")]), "a {x} {unknown} {");
    }

    #[test]
    fn test_humanize_budget_rendering() {
        let prompt = render_humanize_system(20, 17, 21, "formal", "Clear and direct.");
        assert!(prompt.contains("between 17 and 21 words"));
        assert!(prompt.contains("TONE (\"formal\"): Clear and direct."));
    }
}

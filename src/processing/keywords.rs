//! Keyword lists from model replies and substring matching against resume tokens

use crate::error::{Result, ResumeScannerError};
use aho_corasick::AhoCorasick;
use serde_json::Value;
use std::collections::HashSet;

/// Function words that never count as keywords
const STOP_WORDS: &[&str] = &[
    "about", "above", "across", "after", "against", "along", "amid", "among", "around", "at",
    "before", "behind", "below", "beneath", "beside", "between", "beyond", "by", "down", "during",
    "for", "from", "in", "inside", "into", "near", "of", "off", "on", "out",
    "outside", "over", "past", "through", "to", "toward", "under", "underneath", "until", "up",
    "upon", "with", "within", "the", "an", "a", "and", "but", "or", "nor", "yet", "so",
    "although", "because", "since", "unless", "while",
];

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordScore {
    /// matched / total * 100
    pub score: f64,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

impl KeywordScore {
    pub fn total(&self) -> usize {
        self.matched.len() + self.missing.len()
    }
}

/// Flatten every string in a keyword reply into single lower-case words.
///
/// Words containing digits are skipped, `( ) . ,` are stripped, and the
/// result is deduplicated in first-seen order with stop words removed.
pub fn flatten_keywords(value: &Value) -> Vec<String> {
    let mut phrases = Vec::new();
    collect_strings(value, &mut phrases);

    let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();

    for phrase in phrases {
        for word in phrase.split(' ') {
            if word.is_empty() || word.chars().any(|c| c.is_ascii_digit()) {
                continue;
            }
            let cleaned: String = word
                .to_lowercase()
                .chars()
                .filter(|c| !matches!(c, '(' | ')' | '.' | ','))
                .collect();
            let cleaned = cleaned.trim().to_string();
            if cleaned.is_empty() || stop_words.contains(cleaned.as_str()) {
                continue;
            }
            if seen.insert(cleaned.clone()) {
                keywords.push(cleaned);
            }
        }
    }
    keywords
}

fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(text) => out.push(text),
        Value::Array(items) => items.iter().for_each(|item| collect_strings(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_strings(item, out)),
        _ => {}
    }
}

/// A keyword is present when any resume token contains it
pub fn score_keywords(tokens: &[String], keywords: &[String]) -> Result<KeywordScore> {
    if keywords.is_empty() {
        return Err(ResumeScannerError::AnalysisFailed("no keywords to score against".to_string()));
    }

    let matcher = AhoCorasick::new(keywords)
        .map_err(|e| ResumeScannerError::AnalysisFailed(format!("Failed to build keyword matcher: {}", e)))?;

    // tokens never contain whitespace, so a newline separator prevents cross-token hits
    let haystack = tokens.join("\n");
    let mut found = vec![false; keywords.len()];
    for hit in matcher.find_overlapping_iter(&haystack) {
        found[hit.pattern().as_usize()] = true;
    }

    let (matched, missing): (Vec<_>, Vec<_>) = keywords
        .iter()
        .zip(found)
        .partition(|(_, present)| *present);

    let matched: Vec<String> = matched.into_iter().map(|(keyword, _)| keyword.clone()).collect();
    let missing: Vec<String> = missing.into_iter().map(|(keyword, _)| keyword.clone()).collect();
    let score = matched.len() as f64 / keywords.len() as f64 * 100.0;

    Ok(KeywordScore { score, matched, missing })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::text_processor::tokenize_resume;
    use serde_json::json;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_flatten_sections() {
        let reply = json!({
            "Work experience": ["Led the migration of services", "Python 3 (Django)"],
            "Projects": {"Featured": ["REST APIs, GraphQL."]},
            "Skills": ["Python", "Kubernetes", 5]
        });
        assert_eq!(
            flatten_keywords(&reply),
            words(&["led", "migration", "services", "python", "django", "rest", "apis", "graphql", "kubernetes"])
        );
    }

    #[test]
    fn test_flatten_skips_digits_and_punctuation_only() {
        let reply = json!(["k8s", "(.)", "ES2020", "Go"]);
        assert_eq!(flatten_keywords(&reply), words(&["go"]));
    }

    #[test]
    fn test_substring_scoring() {
        let tokens = tokenize_resume("Built React.js dashboards with TypeScript and git");
        let keywords = words(&["react", "typescript", "docker", "git"]);
        let result = score_keywords(&tokens, &keywords).unwrap();
        assert_eq!(result.score, 75.0);
        assert_eq!(result.matched, words(&["react", "typescript", "git"]));
        assert_eq!(result.missing, words(&["docker"]));
        assert_eq!(result.total(), 4);
    }

    #[test]
    fn test_keywords_do_not_span_tokens() {
        let tokens = words(&["data", "base"]);
        let result = score_keywords(&tokens, &words(&["database"])).unwrap();
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_empty_keyword_list_is_an_error() {
        assert!(score_keywords(&words(&["rust"]), &[]).is_err());
    }
}

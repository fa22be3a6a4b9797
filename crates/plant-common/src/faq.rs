/// Keyword FAQ matcher for the chatbot.
///
/// Entries are scanned in declaration order and the first entry whose normalized
/// question occurs verbatim in the lower-cased input wins. Declaration order is the only
/// tie-break between overlapping questions, so more specific phrasings must be listed
/// before the general ones they contain. There is no scoring and no fuzzy matching.
use tracing::debug;

use crate::error::CommonError;
use crate::model::FaqEntry;

const BUILTIN_FAQ: &str = include_str!("../data/faq.json");

/// Reply for empty input. Checked before any matching.
pub const EMPTY_INPUT_PROMPT: &str = "Please ask a question!";

/// Reply when no question matches.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I don't have information on that. Can you provide more details?";

#[derive(Debug, Clone)]
struct Pattern {
    needle: String,
    entry: FaqEntry,
}

#[derive(Debug, Clone)]
pub struct FaqMatcher {
    patterns: Vec<Pattern>,
}

impl FaqMatcher {
    /// Load the FAQ shipped with the crate.
    pub fn builtin() -> Result<Self, CommonError> {
        Self::from_json(BUILTIN_FAQ)
    }

    /// Parse an FAQ document: a JSON array of `{question, answer}` objects, in priority order.
    pub fn from_json(content: &str) -> Result<Self, CommonError> {
        let entries: Vec<FaqEntry> = serde_json::from_str(content)?;
        Self::new(entries)
    }

    /// Build a matcher from entries in priority order.
    ///
    /// Fails if any question is blank after normalization, since it would match
    /// every input.
    pub fn new(entries: Vec<FaqEntry>) -> Result<Self, CommonError> {
        let patterns = entries
            .into_iter()
            .enumerate()
            .map(|(pos, entry)| {
                let needle = normalize_question(&entry.question);
                if needle.is_empty() {
                    return Err(CommonError::Data(format!(
                        "faq entry {pos} has an empty question"
                    )));
                }
                Ok(Pattern { needle, entry })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(entries = patterns.len(), "faq loaded");
        Ok(Self { patterns })
    }

    /// First entry whose question occurs in `text`, ignoring case.
    pub fn find(&self, text: &str) -> Option<&FaqEntry> {
        let haystack = text.to_lowercase();
        self.patterns
            .iter()
            .find(|p| haystack.contains(&p.needle))
            .map(|p| &p.entry)
    }

    /// Chatbot reply for `text`. Never fails.
    pub fn reply(&self, text: &str) -> &str {
        if text.is_empty() {
            return EMPTY_INPUT_PROMPT;
        }
        match self.find(text) {
            Some(entry) => &entry.answer,
            None => FALLBACK_REPLY,
        }
    }

    /// Entries in match-priority order.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &FaqEntry> {
        self.patterns.iter().map(|p| &p.entry)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Lower-case the question and drop trailing `?` and whitespace, so
/// "How do I upload a picture of my plant?" matches input without the question mark.
fn normalize_question(question: &str) -> String {
    question
        .trim()
        .trim_end_matches(|c: char| c == '?' || c.is_whitespace())
        .to_lowercase()
}

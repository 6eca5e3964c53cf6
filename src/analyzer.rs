//! Prompt analysis
//!
//! Decides, per user turn, whether the outgoing system context should be
//! extended with instructions that let the model emit search/memory/query
//! tags. Pure string rules over the raw user message: no network, no
//! storage, and identical input always yields identical output.

use crate::config::Config;
use crate::extractor;

/// Instructions appended to the system prompt when the analyzer decides
/// the model may need external information for this turn.
pub const TAG_INSTRUCTIONS: &str = "\
If answering requires information you do not have, you may request it by \
embedding exactly one of these markers in your reply:\n\
  <search>terms to look up on the internet</search>\n\
  <memory>terms to look up in saved conversations</memory>\n\
  <query>a database query</query>\n\
Use a marker only when it is genuinely needed; otherwise answer directly.";

/// The analyzer's verdict for one user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptAnalysis {
    pub augment: bool,
    pub instructions: &'static str,
}

impl PromptAnalysis {
    fn augmented() -> Self {
        Self {
            augment: true,
            instructions: TAG_INSTRUCTIONS,
        }
    }

    fn plain() -> Self {
        Self {
            augment: false,
            instructions: "",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PromptAnalyzer {
    triggers: Vec<String>,
}

impl PromptAnalyzer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            triggers: config.search_triggers.iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    /// Decide whether this turn's system context gets the tag instructions
    pub fn analyze(&self, user_message: &str) -> PromptAnalysis {
        // A message that already carries a well-formed tag needs no help
        if extractor::scan(user_message).next().is_some() {
            return PromptAnalysis::plain();
        }

        if user_message.contains('?') || user_message.contains('¿') {
            return PromptAnalysis::augmented();
        }

        let lowered = user_message.to_lowercase();
        if self.triggers.iter().any(|t| lowered.contains(t.as_str())) {
            return PromptAnalysis::augmented();
        }

        PromptAnalysis::plain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> PromptAnalyzer {
        PromptAnalyzer::from_config(&Config::default())
    }

    #[test]
    fn test_plain_statement_is_not_augmented() {
        let analysis = analyzer().analyze("I had a nice walk today.");
        assert!(!analysis.augment);
        assert!(analysis.instructions.is_empty());
    }

    #[test]
    fn test_question_mark_augments() {
        let analysis = analyzer().analyze("What is the capital of France?");
        assert!(analysis.augment);
        assert_eq!(analysis.instructions, TAG_INSTRUCTIONS);
    }

    #[test]
    fn test_inverted_question_mark_augments() {
        assert!(analyzer().analyze("¿Cuál es la capital de Francia").augment);
    }

    #[test]
    fn test_trigger_word_augments() {
        assert!(analyzer().analyze("please look up the weather in Madrid").augment);
        assert!(analyzer().analyze("busca el pronóstico de mañana").augment);
    }

    #[test]
    fn test_trigger_match_is_case_insensitive() {
        assert!(analyzer().analyze("SEARCH for rust books").augment);
    }

    #[test]
    fn test_existing_tag_suppresses_augmentation() {
        let analysis = analyzer().analyze("what now? <search>already tagged</search>");
        assert!(!analysis.augment);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let analyzer = analyzer();
        let first = analyzer.analyze("remember my birthday");
        let second = analyzer.analyze("remember my birthday");
        assert_eq!(first, second);
        assert!(first.augment);
    }

    #[test]
    fn test_empty_message_is_not_augmented() {
        assert!(!analyzer().analyze("").augment);
    }
}

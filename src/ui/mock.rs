//! Scripted prompt for testing

use std::collections::VecDeque;

use super::prompt::{Prompt, PromptError};

/// Prompt that replays predetermined answers and records the questions
///
/// Once the answers run out, further questions are cancelled.
#[derive(Debug, Clone, Default)]
pub struct MockPrompt {
    answers: VecDeque<bool>,
    questions: Vec<String>,
}

impl MockPrompt {
    /// Create a mock that answers in order
    #[must_use]
    pub fn answering(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            questions: Vec::new(),
        }
    }

    /// Questions asked so far
    #[must_use]
    pub fn questions(&self) -> &[String] {
        &self.questions
    }
}

impl Prompt for MockPrompt {
    fn ask_bool(&mut self, question: &str) -> Result<bool, PromptError> {
        self.questions.push(question.to_string());
        self.answers.pop_front().ok_or(PromptError::Cancelled)
    }
}

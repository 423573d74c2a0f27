//! User interaction layer
//!
//! Confirmation prompts go through the [`Prompt`] trait so the dispatcher
//! can be driven by a terminal (dialoguer) or by a scripted mock in tests.

pub mod mock;
pub mod prompt;

pub use mock::MockPrompt;
pub use prompt::{Confirmation, DialoguerPrompt, Prompt, PromptError};

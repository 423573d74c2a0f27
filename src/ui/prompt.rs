//! Yes/no confirmation prompts

use std::io;

/// Something that can ask the user a yes/no question
///
/// # Examples
///
/// ```no_run
/// use rtcontrol::ui::{DialoguerPrompt, Prompt};
///
/// let mut prompt = DialoguerPrompt::new();
/// if prompt.ask_bool("DELETE item ubuntu.iso").unwrap() {
///     println!("Deleting...");
/// }
/// ```
pub trait Prompt {
    /// Ask a question, returning the answer
    ///
    /// # Errors
    ///
    /// Returns a `PromptError` if the terminal cannot be read.
    fn ask_bool(&mut self, question: &str) -> Result<bool, PromptError>;
}

impl<P: Prompt + ?Sized> Prompt for &mut P {
    fn ask_bool(&mut self, question: &str) -> Result<bool, PromptError> {
        (**self).ask_bool(question)
    }
}

/// Errors that can occur while prompting
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// IO error during input
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Input cancelled by user
    #[error("Input cancelled by user")]
    Cancelled,
}

/// Terminal prompt using dialoguer
pub struct DialoguerPrompt {
    theme: dialoguer::theme::ColorfulTheme,
}

impl DialoguerPrompt {
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: dialoguer::theme::ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for DialoguerPrompt {
    fn ask_bool(&mut self, question: &str) -> Result<bool, PromptError> {
        use dialoguer::Confirm;

        Confirm::with_theme(&self.theme)
            .with_prompt(question)
            .default(false)
            .interact_opt()
            .map_err(|e| PromptError::Io(io::Error::other(e)))?
            .ok_or(PromptError::Cancelled)
    }
}

/// Gate that decides whether a question is actually asked
///
/// When not interactive every question is answered with yes. `--yes`
/// answers yes even in interactive mode.
pub struct Confirmation<P> {
    prompt: P,
    interactive: bool,
    assume_yes: bool,
}

impl<P: Prompt> Confirmation<P> {
    #[must_use]
    pub const fn new(prompt: P) -> Self {
        Self {
            prompt,
            interactive: false,
            assume_yes: false,
        }
    }

    /// Set the initial interactive mode
    #[must_use]
    pub const fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Answer every question with yes
    #[must_use]
    pub const fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    /// Turn on interactive mode for the rest of the run
    pub const fn force_interactive(&mut self) {
        self.interactive = true;
    }

    #[must_use]
    pub const fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Ask `question` if interactive, otherwise confirm silently
    ///
    /// # Errors
    ///
    /// Propagates errors from the underlying prompt.
    pub fn ask_bool(&mut self, question: &str) -> Result<bool, PromptError> {
        if !self.interactive || self.assume_yes {
            return Ok(true);
        }
        self.prompt.ask_bool(question)
    }
}

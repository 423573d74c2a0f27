//! Option resolution and action dispatch
//!
//! [`ControlOptionsBuilder`] turns the raw command-line values into an
//! immutable [`ControlOptions`], validating everything that can be checked
//! before items are fetched. [`Controller`] then runs one invocation:
//! fetch, select, sort, and either display the matches or apply the
//! selected action to each of them.

use std::collections::HashMap;
use std::io::Write;

use crate::ControlError;
use crate::actions::{self, ActionMode, IgnoreValue};
use crate::config::ControlConfig;
use crate::fields::FieldRegistry;
use crate::filters::Matcher;
use crate::format::OutputFormat;
use crate::output::{Emitter, Terminator};
use crate::selection::{SortKey, select};
use crate::source::{Item, ItemSource};
use crate::ui::{Confirmation, Prompt};

type Result<T> = std::result::Result<T, ControlError>;

/// Resolved options of one invocation
#[derive(Debug, Clone)]
pub struct ControlOptions {
    filters: Vec<String>,
    dry_run: bool,
    terminator: Terminator,
    output: Option<OutputFormat>,
    sort: SortKey,
    action: Option<ActionMode>,
    interactive: bool,
}

impl ControlOptions {
    #[must_use]
    pub fn builder() -> ControlOptionsBuilder {
        ControlOptionsBuilder::default()
    }

    /// Raw filter tokens, in command-line order
    #[must_use]
    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }

    #[must_use]
    pub const fn terminator(&self) -> Terminator {
        self.terminator
    }

    /// Compiled output format; `None` when display is disabled
    #[must_use]
    pub const fn output(&self) -> Option<&OutputFormat> {
        self.output.as_ref()
    }

    #[must_use]
    pub const fn action(&self) -> Option<&ActionMode> {
        self.action.as_ref()
    }

    /// Whether each item must be confirmed, either on request or because
    /// the selected action demands it
    #[must_use]
    pub const fn interactive(&self) -> bool {
        self.interactive
    }
}

/// Collects raw option values
#[derive(Debug, Clone, Default)]
pub struct ControlOptionsBuilder {
    filters: Vec<String>,
    dry_run: bool,
    nul: bool,
    output_format: Option<String>,
    sort_fields: Option<String>,
    reverse_sort: bool,
    actions: Vec<String>,
    ignore: Option<IgnoreValue>,
    interactive: bool,
}

impl ControlOptionsBuilder {
    #[must_use]
    pub fn filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters = filters.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub const fn nul(mut self, nul: bool) -> Self {
        self.nul = nul;
        self
    }

    #[must_use]
    pub fn output_format(mut self, format: Option<String>) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn sort_fields(mut self, fields: Option<String>) -> Self {
        self.sort_fields = fields;
        self
    }

    #[must_use]
    pub const fn reverse_sort(mut self, reverse: bool) -> Self {
        self.reverse_sort = reverse;
        self
    }

    /// Request a catalog action by name
    #[must_use]
    pub fn action(mut self, name: impl Into<String>) -> Self {
        self.actions.push(name.into());
        self
    }

    #[must_use]
    pub const fn ignore(mut self, ignore: Option<IgnoreValue>) -> Self {
        self.ignore = ignore;
        self
    }

    #[must_use]
    pub const fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Validate and resolve
    ///
    /// Checks run in this order: filter presence, action exclusivity,
    /// output format, sort fields.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Usage` without filters or for an unknown
    /// action, `ControlError::Action` for conflicting actions, and
    /// `ControlError::Format` or `ControlError::Field` for bad formats and
    /// sort fields.
    pub fn build(self, config: &ControlConfig, registry: &FieldRegistry) -> Result<ControlOptions> {
        if self.filters.is_empty() {
            return Err(ControlError::Usage("No filter conditions given!".to_string()));
        }

        let catalog = actions::catalog();
        if let Some(unknown) = self
            .actions
            .iter()
            .find(|name| !catalog.iter().any(|mode| &mode.name == *name))
        {
            return Err(ControlError::Usage(format!("Unknown action '{unknown}'")));
        }
        let action = actions::resolve(&catalog, |name| self.actions.iter().any(|a| a == name), self.ignore)?;
        let interactive = self.interactive || action.as_ref().is_some_and(|mode| mode.interactive);

        let default_format = if action.is_some() {
            &config.action_format
        } else {
            &config.output_format
        };
        let output = OutputFormat::compile(self.output_format.as_deref(), default_format, registry)?;
        let sort = SortKey::compile(
            self.sort_fields.as_deref(),
            &config.sort_fields,
            self.reverse_sort,
            registry,
        )?;

        Ok(ControlOptions {
            filters: self.filters,
            dry_run: self.dry_run,
            terminator: Terminator::from_nul_flag(self.nul),
            output,
            sort,
            action,
            interactive,
        })
    }
}

/// Dispatch state, fixed for the whole invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode<'a> {
    /// List the matches
    Display,
    /// Apply an action to every match
    Act(&'a ActionMode),
}

/// Outcome of one invocation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub matched: usize,
    pub total: usize,
    pub emitted: usize,
    pub acted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub const fn add_success(&mut self) {
        self.acted += 1;
    }
    pub const fn add_skip(&mut self) {
        self.skipped += 1;
    }
    pub const fn add_error(&mut self) {
        self.failed += 1;
    }
}

/// Runs one invocation against an item source
pub struct Controller<'a> {
    options: &'a ControlOptions,
    registry: &'a FieldRegistry,
}

impl<'a> Controller<'a> {
    #[must_use]
    pub const fn new(options: &'a ControlOptions, registry: &'a FieldRegistry) -> Self {
        Self { options, registry }
    }

    #[must_use]
    pub fn mode(&self) -> Mode<'a> {
        self.options.action.as_ref().map_or(Mode::Display, Mode::Act)
    }

    /// Fetch, select, sort, then display or act
    ///
    /// A failing action call is logged and counted, and the remaining items
    /// are still processed. Unless this is a dry run, the source is committed
    /// afterwards even when the run is cut short, so calls already made on
    /// earlier items are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the items cannot be fetched, an item cannot be
    /// rendered, the prompt fails, output cannot be written, or the source
    /// cannot be committed.
    pub fn run<S, P, W>(
        &self,
        source: &S,
        matcher: &dyn Matcher,
        confirm: &mut Confirmation<P>,
        out: W,
    ) -> Result<RunSummary>
    where
        S: ItemSource,
        P: Prompt,
        W: Write,
    {
        let result = self.dispatch(source, matcher, confirm, out);
        if self.options.dry_run {
            return result;
        }
        match (result, source.commit()) {
            (Ok(summary), Ok(())) => Ok(summary),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(commit)) => {
                tracing::error!("Saving changes failed: {commit}");
                Err(e)
            }
        }
    }

    fn dispatch<S, P, W>(
        &self,
        source: &S,
        matcher: &dyn Matcher,
        confirm: &mut Confirmation<P>,
        out: W,
    ) -> Result<RunSummary>
    where
        S: ItemSource,
        P: Prompt,
        W: Write,
    {
        let items = source.items()?;
        let mut selection = select(&items, matcher);
        self.options.sort.sort(&mut selection.matches);

        let mut emitter = self
            .options
            .output
            .as_ref()
            .map(|format| Emitter::new(format, self.registry, self.options.terminator, out));
        let mut summary = RunSummary {
            matched: selection.len(),
            total: selection.total,
            ..RunSummary::default()
        };

        match self.mode() {
            Mode::Display => {
                if let Some(emitter) = emitter.as_mut() {
                    let defaults = HashMap::new();
                    for item in &selection.matches {
                        emitter.emit(*item, &defaults)?;
                    }
                }
                tracing::info!("Filtered {} out of {} torrents.", summary.matched, summary.total);
            }
            Mode::Act(action) => {
                if self.options.interactive {
                    confirm.force_interactive();
                }
                tracing::info!(
                    "{} {} {} out of {} torrents.",
                    if self.options.dry_run { "Would" } else { "About to" },
                    action.label,
                    summary.matched,
                    summary.total
                );

                let defaults = HashMap::from([("action".to_string(), action.label.clone())]);
                for item in &selection.matches {
                    let name = item.display_name();
                    if !confirm.ask_bool(&format!("{} item {name}", action.label))? {
                        tracing::debug!(item = %name, "skipped");
                        summary.add_skip();
                        continue;
                    }
                    if let Some(emitter) = emitter.as_mut() {
                        emitter.emit(*item, &defaults)?;
                    }
                    if self.options.dry_run {
                        continue;
                    }
                    match item.invoke(&action.method, &action.args) {
                        Ok(()) => summary.add_success(),
                        Err(e) => {
                            tracing::error!(item = %name, "{} failed: {e}", action.label);
                            summary.add_error();
                        }
                    }
                }

                if summary.failed > 0 {
                    tracing::warn!("{} of {} {} calls failed", summary.failed, summary.matched, action.label);
                }
            }
        }

        if let Some(emitter) = emitter {
            summary.emitted = emitter.count();
            emitter.finish()?;
        }
        Ok(summary)
    }
}

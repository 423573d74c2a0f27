//! Action registry
//!
//! The state-changing operations that can be applied to selected items.
//! Each catalog entry becomes one command-line flag; at most one action may
//! be requested per run. The `--ignore` option synthesizes an additional
//! action that is not part of the catalog.

use clap::{Arg, ArgAction, ArgMatches, Command, ValueEnum};
use heck::ToKebabCase;
use thiserror::Error;

/// Static declaration of an action, before defaults are applied
#[derive(Debug, Clone, Copy)]
pub struct ActionDecl {
    pub name: &'static str,
    pub flags: &'static [&'static str],
    pub help: &'static str,
    pub label: Option<&'static str>,
    pub method: Option<&'static str>,
    pub interactive: Option<bool>,
    pub args: &'static [&'static str],
}

impl ActionDecl {
    const fn new(name: &'static str, flags: &'static [&'static str], help: &'static str) -> Self {
        Self {
            name,
            flags,
            help,
            label: None,
            method: None,
            interactive: None,
            args: &[],
        }
    }

    const fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    const fn method(mut self, method: &'static str) -> Self {
        self.method = Some(method);
        self
    }

    const fn interactive(mut self) -> Self {
        self.interactive = Some(true);
        self
    }
}

/// Actions selectable by flag, in the order conflicts are checked
pub const CATALOG: [ActionDecl; 4] = [
    ActionDecl::new("start", &["-S", "--start"], "start torrent"),
    ActionDecl::new("close", &["-C", "--close", "--stop"], "stop torrent").method("stop"),
    ActionDecl::new("hash_check", &["-H", "--hash-check"], "hash-check torrent")
        .label("HASH")
        .interactive(),
    ActionDecl::new("delete", &["--delete"], "remove torrent from client").interactive(),
];

/// A normalized action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMode {
    pub name: String,
    pub label: String,
    pub flags: Vec<String>,
    pub help: String,
    pub method: String,
    pub interactive: bool,
    pub args: Vec<String>,
}

impl From<&ActionDecl> for ActionMode {
    fn from(decl: &ActionDecl) -> Self {
        Self {
            name: decl.name.to_string(),
            label: decl
                .label
                .map_or_else(|| decl.name.to_uppercase(), str::to_string),
            flags: decl.flags.iter().map(|f| (*f).to_string()).collect(),
            help: decl.help.to_string(),
            method: decl.method.unwrap_or(decl.name).to_string(),
            interactive: decl.interactive.unwrap_or(false),
            args: decl.args.iter().map(|a| (*a).to_string()).collect(),
        }
    }
}

impl ActionMode {
    /// Synthesize the ignore action for a `--ignore` value
    #[must_use]
    pub fn ignore(value: IgnoreValue) -> Self {
        Self {
            name: "ignore".to_string(),
            label: value.label().to_string(),
            flags: vec!["--ignore".to_string()],
            help: "commands on torrent".to_string(),
            method: "ignore".to_string(),
            interactive: false,
            args: vec![value.as_str().to_string()],
        }
    }

    /// Option name as shown to users, e.g. `hash-check`
    #[must_use]
    pub fn option_name(&self) -> String {
        self.name.to_kebab_case()
    }

    /// Help text for the option, noting when it forces confirmation
    #[must_use]
    pub fn help_text(&self) -> String {
        if self.interactive {
            format!("{} (implies -i)", self.help)
        } else {
            self.help.clone()
        }
    }
}

/// The normalized catalog
#[must_use]
pub fn catalog() -> Vec<ActionMode> {
    CATALOG.iter().map(ActionMode::from).collect()
}

/// Accepted values for `--ignore`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreValue {
    /// Let the client run commands on the torrent again
    #[value(name = "0")]
    Heed,
    /// Make the client ignore commands on the torrent
    #[value(name = "1")]
    Ignore,
}

impl IgnoreValue {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Heed => "0",
            Self::Ignore => "1",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Heed => "HEED",
            Self::Ignore => "IGNORE",
        }
    }
}

/// Errors raised while resolving the requested action
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    /// Two actions were requested in the same run
    #[error("Options --{first} and --{second} are mutually exclusive")]
    Conflict { first: String, second: String },
}

/// Pick the single requested action
///
/// The ignore action is considered first, then the catalog in order; the
/// first two requested actions are named in the conflict error.
///
/// # Errors
///
/// Returns `ActionError::Conflict` if more than one action is requested.
pub fn resolve(
    catalog: &[ActionMode],
    is_selected: impl Fn(&str) -> bool,
    ignore: Option<IgnoreValue>,
) -> Result<Option<ActionMode>, ActionError> {
    let mut action = ignore.map(ActionMode::ignore);

    for mode in catalog.iter().filter(|mode| is_selected(&mode.name)) {
        if let Some(current) = &action {
            return Err(ActionError::Conflict {
                first: current.option_name(),
                second: mode.option_name(),
            });
        }
        action = Some(mode.clone());
    }

    Ok(action)
}

/// Add one boolean flag per catalog action to a command
#[must_use]
pub fn register(command: Command) -> Command {
    CATALOG.iter().fold(command, |command, decl| {
        let mode = ActionMode::from(decl);
        let mut arg = Arg::new(decl.name)
            .action(ArgAction::SetTrue)
            .help(mode.help_text())
            .help_heading("Actions");
        let mut longs = decl.flags.iter().copied().filter_map(|f| f.strip_prefix("--"));
        if let Some(long) = longs.next() {
            arg = arg.long(long);
        }
        for alias in longs {
            arg = arg.visible_alias(alias);
        }
        if let Some(short) = decl
            .flags
            .iter()
            .find(|f| f.len() == 2 && !f.starts_with("--"))
            .and_then(|f| f.chars().nth(1))
        {
            arg = arg.short(short);
        }
        command.arg(arg)
    })
}

/// Names of catalog actions whose flags were given
#[must_use]
pub fn selected(matches: &ArgMatches) -> Vec<String> {
    CATALOG
        .iter()
        .filter(|decl| matches.get_flag(decl.name))
        .map(|decl| decl.name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_defaults() {
        let modes = catalog();
        let start = &modes[0];
        assert_eq!(start.label, "START");
        assert_eq!(start.method, "start");
        assert!(!start.interactive);
        assert!(start.args.is_empty());

        let close = &modes[1];
        assert_eq!(close.label, "CLOSE");
        assert_eq!(close.method, "stop");

        let hash = &modes[2];
        assert_eq!(hash.label, "HASH");
        assert!(hash.interactive);
        assert_eq!(hash.help_text(), "hash-check torrent (implies -i)");
    }

    #[test]
    fn test_no_action() {
        let action = resolve(&catalog(), |_| false, None).unwrap();
        assert!(action.is_none());
    }

    #[test]
    fn test_single_catalog_action() {
        let action = resolve(&catalog(), |name| name == "delete", None).unwrap().unwrap();
        assert_eq!(action.label, "DELETE");
        assert!(action.interactive);
    }

    #[test]
    fn test_ignore_synthesized() {
        let action = resolve(&catalog(), |_| false, Some(IgnoreValue::Ignore))
            .unwrap()
            .unwrap();
        assert_eq!(action.label, "IGNORE");
        assert_eq!(action.method, "ignore");
        assert_eq!(action.args, vec!["1".to_string()]);
        assert!(!action.interactive);

        let heed = ActionMode::ignore(IgnoreValue::Heed);
        assert_eq!(heed.label, "HEED");
        assert_eq!(heed.args, vec!["0".to_string()]);
    }

    #[test]
    fn test_conflicting_catalog_actions() {
        let err = resolve(&catalog(), |name| name == "start" || name == "hash_check", None)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Options --start and --hash-check are mutually exclusive"
        );
    }

    #[test]
    fn test_ignore_conflicts_with_catalog_action() {
        let err = resolve(&catalog(), |name| name == "close", Some(IgnoreValue::Heed)).unwrap_err();
        assert_eq!(
            err,
            ActionError::Conflict {
                first: "ignore".to_string(),
                second: "close".to_string()
            }
        );
    }

    #[test]
    fn test_every_pair_conflicts() {
        let modes = catalog();
        for a in &modes {
            for b in &modes {
                if a.name == b.name {
                    continue;
                }
                let result = resolve(&modes, |name| name == a.name || name == b.name, None);
                let err = result.unwrap_err().to_string();
                assert!(err.contains(&a.option_name()) && err.contains(&b.option_name()));
            }
        }
    }

    #[test]
    fn test_register_flags() {
        let command = register(Command::new("test").no_binary_name(true));
        let matches = command.clone().try_get_matches_from(["--stop"]).unwrap();
        assert_eq!(selected(&matches), vec!["close".to_string()]);

        let matches = command.clone().try_get_matches_from(["-H", "--delete"]).unwrap();
        assert_eq!(selected(&matches), vec!["hash_check".to_string(), "delete".to_string()]);

        let matches = command.try_get_matches_from(Vec::<String>::new()).unwrap();
        assert!(selected(&matches).is_empty());
    }
}

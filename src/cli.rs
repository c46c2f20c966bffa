use clap::parser::ValueSource;
use clap::{ArgAction, ArgMatches, Parser};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::concern::DEFAULT_BASE;
use crate::error::FilterError;
use crate::report::{JsonVersion, NameStyle, Threshold};
use crate::repository::{Pattern, Polarity, ReferenceFilter};

#[derive(Parser, Debug)]
#[command(
    name = "repo-sizer",
    version,
    about = "Compute size metrics of a git repository and flag the ones that may cause problems"
)]
pub struct Cli {
    /// Path to the git repository
    #[arg(default_value = ".")]
    pub repo_path: PathBuf,

    /// Report all statistics, whether concerning or not
    #[arg(short, long, conflicts_with_all = ["threshold", "critical"])]
    pub verbose: bool,

    /// Minimum level of concern (in stars) for a statistic to be reported
    #[arg(long, value_name = "N")]
    pub threshold: Option<Threshold>,

    /// Only report statistics that are extremely concerning
    #[arg(long, conflicts_with = "threshold")]
    pub critical: bool,

    /// How to identify offending objects: none, hash or full
    #[arg(long, value_name = "STYLE", default_value = "full")]
    pub names: NameStyle,

    /// Output results as JSON
    #[arg(short, long)]
    pub json: bool,

    /// JSON schema version (1 or 2)
    #[arg(long, value_name = "N", default_value = "1")]
    pub json_version: JsonVersion,

    /// Show a progress spinner while scanning (default: when stderr is a terminal)
    #[arg(long, overrides_with = "no_progress")]
    pub progress: bool,

    #[arg(long, overrides_with = "progress", hide = true)]
    pub no_progress: bool,

    /// Base of the logarithmic level-of-concern scale
    #[arg(long, value_name = "BASE", default_value_t = DEFAULT_BASE)]
    pub severity_base: f64,

    /// List every reference and whether it was included (on stderr)
    #[arg(long)]
    pub show_refs: bool,

    /// Process all branches
    #[arg(long, action = ArgAction::SetTrue)]
    pub branches: bool,
    /// Exclude all branches
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_branches: bool,

    /// Process all tags
    #[arg(long, action = ArgAction::SetTrue)]
    pub tags: bool,
    /// Exclude all tags
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_tags: bool,

    /// Process all remote-tracking references
    #[arg(long, action = ArgAction::SetTrue)]
    pub remotes: bool,
    /// Exclude all remote-tracking references
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_remotes: bool,

    /// Process all git-notes references
    #[arg(long, action = ArgAction::SetTrue)]
    pub notes: bool,
    /// Exclude all git-notes references
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_notes: bool,

    /// Process refs/stash
    #[arg(long, action = ArgAction::SetTrue)]
    pub stash: bool,
    /// Exclude refs/stash
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_stash: bool,

    /// Include references with this prefix
    #[arg(long, value_name = "PREFIX", action = ArgAction::Append)]
    pub include: Vec<String>,

    /// Include references matching this regular expression
    #[arg(long, value_name = "REGEXP", action = ArgAction::Append)]
    pub include_regexp: Vec<String>,

    /// Exclude references with this prefix
    #[arg(long, value_name = "PREFIX", action = ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Exclude references matching this regular expression
    #[arg(long, value_name = "REGEXP", action = ArgAction::Append)]
    pub exclude_regexp: Vec<String>,
}

impl Cli {
    /// Effective threshold after `--verbose` and `--critical`
    pub fn threshold(&self) -> Threshold {
        if self.verbose {
            Threshold::VERBOSE
        } else if self.critical {
            Threshold::CRITICAL
        } else {
            self.threshold.unwrap_or_default()
        }
    }

    pub fn show_progress(&self) -> bool {
        self.progress_enabled(std::io::stderr().is_terminal())
    }

    /// Explicit `--progress` / `--no-progress` win; otherwise follow the terminal
    fn progress_enabled(&self, stderr_is_terminal: bool) -> bool {
        if self.no_progress {
            false
        } else if self.progress {
            true
        } else {
            stderr_is_terminal
        }
    }
}

/// Boolean group flags and the prefix each one selects
const GROUP_FLAGS: &[(&str, Polarity, &str)] = &[
    ("branches", Polarity::Include, "refs/heads/"),
    ("no_branches", Polarity::Exclude, "refs/heads/"),
    ("tags", Polarity::Include, "refs/tags/"),
    ("no_tags", Polarity::Exclude, "refs/tags/"),
    ("remotes", Polarity::Include, "refs/remotes/"),
    ("no_remotes", Polarity::Exclude, "refs/remotes/"),
    ("notes", Polarity::Include, "refs/notes/"),
    ("no_notes", Polarity::Exclude, "refs/notes/"),
    ("stash", Polarity::Include, "refs/stash"),
    ("no_stash", Polarity::Exclude, "refs/stash"),
];

/// Build the reference filter from the rule flags, in command-line order
///
/// With no rules at all, or when the first rule is an exclusion, the filter
/// starts out including every reference.
pub fn reference_filter(matches: &ArgMatches) -> Result<ReferenceFilter, FilterError> {
    let mut rules: Vec<(usize, Polarity, Pattern)> = Vec::new();

    for &(id, polarity, prefix) in GROUP_FLAGS {
        if matches.value_source(id) != Some(ValueSource::CommandLine) {
            continue;
        }
        if let Some(index) = matches.indices_of(id).and_then(|i| i.last()) {
            rules.push((index, polarity, Pattern::prefix(prefix)));
        }
    }

    let valued: [(&str, Polarity, bool); 4] = [
        ("include", Polarity::Include, false),
        ("include_regexp", Polarity::Include, true),
        ("exclude", Polarity::Exclude, false),
        ("exclude_regexp", Polarity::Exclude, true),
    ];
    for (id, polarity, is_regex) in valued {
        let (Some(values), Some(indices)) = (matches.get_many::<String>(id), matches.indices_of(id))
        else {
            continue;
        };
        for (value, index) in values.zip(indices) {
            let pattern = if is_regex {
                Pattern::regex(value)?
            } else {
                Pattern::prefix(value.as_str())
            };
            rules.push((index, polarity, pattern));
        }
    }

    rules.sort_by_key(|(index, _, _)| *index);

    let mut filter = match rules.first() {
        None | Some((_, Polarity::Exclude, _)) => ReferenceFilter::all(),
        Some(_) => ReferenceFilter::new(),
    };
    for (_, polarity, pattern) in rules {
        filter.push(polarity, pattern);
    }
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches};

    fn parse(args: &[&str]) -> (Cli, ArgMatches) {
        let mut argv = vec!["repo-sizer"];
        argv.extend_from_slice(args);
        let matches = Cli::command().try_get_matches_from(argv).unwrap();
        let cli = Cli::from_arg_matches(&matches).unwrap();
        (cli, matches)
    }

    #[test]
    fn test_defaults() {
        let (cli, matches) = parse(&[]);
        assert_eq!(cli.threshold(), Threshold::DEFAULT);
        assert_eq!(cli.names, NameStyle::Full);
        assert_eq!(cli.json_version, JsonVersion::V1);

        let filter = reference_filter(&matches).unwrap();
        assert!(filter.matches("refs/heads/main"));
        assert!(filter.matches("refs/tags/v1"));
    }

    #[test]
    fn test_threshold_flags() {
        assert_eq!(parse(&["-v"]).0.threshold(), Threshold::VERBOSE);
        assert_eq!(parse(&["--critical"]).0.threshold(), Threshold::CRITICAL);
        assert_eq!(parse(&["--threshold", "3"]).0.threshold(), Threshold::new(3));
    }

    #[test]
    fn test_progress_follows_terminal_unless_forced() {
        let (cli, _) = parse(&[]);
        assert!(cli.progress_enabled(true));
        assert!(!cli.progress_enabled(false));

        let (cli, _) = parse(&["--progress"]);
        assert!(cli.progress_enabled(false));

        let (cli, _) = parse(&["--no-progress"]);
        assert!(!cli.progress_enabled(true));

        let (cli, _) = parse(&["--no-progress", "--progress"]);
        assert!(cli.progress_enabled(false));
        let (cli, _) = parse(&["--progress", "--no-progress"]);
        assert!(!cli.progress_enabled(true));
    }

    #[test]
    fn test_json_version_flag() {
        assert_eq!(parse(&["--json-version", "2"]).0.json_version, JsonVersion::V2);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let cmd = || Cli::command();
        assert!(cmd().try_get_matches_from(["repo-sizer", "--names", "short"]).is_err());
        assert!(cmd().try_get_matches_from(["repo-sizer", "--json-version", "3"]).is_err());
        assert!(cmd().try_get_matches_from(["repo-sizer", "--threshold", "x"]).is_err());
    }

    #[test]
    fn test_leading_include_starts_empty() {
        let (_, matches) = parse(&["--branches"]);
        let filter = reference_filter(&matches).unwrap();
        assert!(filter.matches("refs/heads/main"));
        assert!(!filter.matches("refs/tags/v1"));
    }

    #[test]
    fn test_leading_exclude_starts_full() {
        let (_, matches) = parse(&["--no-tags"]);
        let filter = reference_filter(&matches).unwrap();
        assert!(filter.matches("refs/heads/main"));
        assert!(!filter.matches("refs/tags/v1"));
    }

    #[test]
    fn test_rules_keep_command_line_order() {
        let (_, matches) = parse(&[
            "--include",
            "refs/heads",
            "--exclude-regexp",
            "refs/heads/wip-.*",
            "--include",
            "refs/heads/wip-keep",
        ]);
        let filter = reference_filter(&matches).unwrap();
        assert!(filter.matches("refs/heads/main"));
        assert!(!filter.matches("refs/heads/wip-old"));
        assert!(filter.matches("refs/heads/wip-keep"));
    }

    #[test]
    fn test_bad_regex() {
        let (_, matches) = parse(&["--include-regexp", "refs/("]);
        assert!(matches!(
            reference_filter(&matches),
            Err(FilterError::InvalidRegex { .. })
        ));
    }
}

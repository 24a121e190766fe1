use std::path::PathBuf;

use tracking::{RecountPolicy, SessionConfig, DEFAULT_PARSER_COMMAND, DEFAULT_RESULTS_PATH};

use crate::Args;

/// Top-level tester configuration.
///
/// Layered as defaults, then `TITLE_TESTER_*` environment variables, then
/// command-line flags.
#[derive(Debug, Clone, PartialEq)]
pub struct TesterConfig {
    /// Results ledger file
    pub results_path: PathBuf,
    /// Library version tag the verdicts are filed under
    pub version: String,
    /// Parser command line; the title is appended as the last argument
    pub parser_command: String,
    /// Statistics cadence in recorded verdicts
    pub stats_every: u32,
    /// Continue-prompt cadence in recorded verdicts
    pub confirm_every: u32,
    /// Fixed sampler seed (None = OS entropy)
    pub seed: Option<u64>,
    pub recount: RecountPolicy,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            results_path: PathBuf::from(DEFAULT_RESULTS_PATH),
            version: "dev".to_string(),
            parser_command: DEFAULT_PARSER_COMMAND.to_string(),
            stats_every: 5,
            confirm_every: 10,
            seed: None,
            recount: RecountPolicy::EveryWrite,
        }
    }
}

impl TesterConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("TITLE_TESTER_RESULTS") {
            config.results_path = PathBuf::from(path);
        }
        if let Some(version) = lookup("TITLE_TESTER_VERSION") {
            config.version = version;
        }
        if let Some(command) = lookup("TITLE_TESTER_PARSER_CMD") {
            config.parser_command = command;
        }
        if let Some(n) = lookup("TITLE_TESTER_STATS_EVERY").and_then(|v| v.parse().ok()) {
            config.stats_every = n;
        }
        if let Some(n) = lookup("TITLE_TESTER_CONFIRM_EVERY").and_then(|v| v.parse().ok()) {
            config.confirm_every = n;
        }
        if let Some(seed) = lookup("TITLE_TESTER_SEED").and_then(|v| v.parse().ok()) {
            config.seed = Some(seed);
        }

        config
    }

    /// Apply command-line overrides
    pub fn with_args(mut self, args: &Args) -> Self {
        if let Some(ref path) = args.results {
            self.results_path = path.clone();
        }
        if let Some(ref version) = args.library_version {
            self.version = version.clone();
        }
        if let Some(ref command) = args.parser_cmd {
            self.parser_command = command.clone();
        }
        if args.seed.is_some() {
            self.seed = args.seed;
        }
        if args.distinct_counts {
            self.recount = RecountPolicy::FirstWriteOnly;
        }
        self
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            version: self.version.clone(),
            stats_every: self.stats_every,
            confirm_every: self.confirm_every,
        }
    }
}

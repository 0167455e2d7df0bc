//! Diagnostic detail levels

/// How much diagnostic output a run produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Decisions, results, and warnings
    #[default]
    Default,
    /// Adds every runtime command line
    Verbose,
    /// Adds full build recipes and package listings
    VeryVerbose,
}

impl Verbosity {
    /// Map a repeated `-v` count to a level
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Default,
            1 => Self::Verbose,
            _ => Self::VeryVerbose,
        }
    }

    /// Log filter directive matching this level
    pub fn filter_directive(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::VeryVerbose => "trace",
        }
    }

    /// Whether full blobs should be assembled for logging
    pub fn dumps_blobs(self) -> bool {
        self >= Self::VeryVerbose
    }
}

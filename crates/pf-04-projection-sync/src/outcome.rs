use std::fmt;

/// What a sync step did to its projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Projection changed and was saved.
    Applied,
    /// Projection already reflected the event; nothing saved.
    AlreadyApplied,
    /// Transition not allowed from the current status; nothing saved.
    Ignored,
}

impl SyncOutcome {
    /// True if a save happened.
    pub fn saved(self) -> bool {
        matches!(self, Self::Applied)
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Applied => "applied",
            Self::AlreadyApplied => "already applied",
            Self::Ignored => "ignored",
        };
        f.write_str(name)
    }
}

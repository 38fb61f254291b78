//! Pessimistic lock options.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DialectError;

/// Requested lock mode for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    #[default]
    None,
    Read,
    Optimistic,
    PessimisticRead,
    PessimisticWrite,
    PessimisticForceIncrement,
    UpgradeNoWait,
    UpgradeSkipLocked,
}

impl LockMode {
    /// Every mode, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::None,
        Self::Read,
        Self::Optimistic,
        Self::PessimisticRead,
        Self::PessimisticWrite,
        Self::PessimisticForceIncrement,
        Self::UpgradeNoWait,
        Self::UpgradeSkipLocked,
    ];

    /// Returns the lower-case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Read => "read",
            Self::Optimistic => "optimistic",
            Self::PessimisticRead => "pessimistic_read",
            Self::PessimisticWrite => "pessimistic_write",
            Self::PessimisticForceIncrement => "pessimistic_force_increment",
            Self::UpgradeNoWait => "upgrade_nowait",
            Self::UpgradeSkipLocked => "upgrade_skiplocked",
        }
    }

    /// Returns true if the mode needs a database lock.
    #[must_use]
    pub const fn is_pessimistic(&self) -> bool {
        matches!(
            self,
            Self::PessimisticRead
                | Self::PessimisticWrite
                | Self::PessimisticForceIncrement
                | Self::UpgradeNoWait
                | Self::UpgradeSkipLocked
        )
    }
}

impl fmt::Display for LockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockMode {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| DialectError::Semantic(format!("unknown lock mode '{s}'")))
    }
}

/// How long to wait for a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockTimeout {
    #[default]
    WaitForever,
    NoWait,
    SkipLocked,
    /// Wait at most this many milliseconds.
    Millis(u32),
}

impl LockTimeout {
    /// Timeout rounded up to whole seconds, for `wait N` clauses.
    #[must_use]
    pub const fn seconds(&self) -> Option<u32> {
        match self {
            Self::Millis(ms) => Some(ms.div_ceil(1000)),
            _ => None,
        }
    }
}

/// Lock mode, timeout and the aliases to lock.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LockOptions {
    /// Lock mode.
    pub mode: LockMode,
    /// Lock timeout.
    pub timeout: LockTimeout,
    /// Table aliases to lock; empty locks every table.
    pub aliases: Vec<String>,
}

impl LockOptions {
    /// Creates options for `mode`, waiting forever.
    #[must_use]
    pub const fn new(mode: LockMode) -> Self {
        Self {
            mode,
            timeout: LockTimeout::WaitForever,
            aliases: Vec::new(),
        }
    }

    /// Sets the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: LockTimeout) -> Self {
        self.timeout = timeout;
        self
    }

    /// Restricts locking to the given aliases.
    #[must_use]
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Effective timeout, folding the NOWAIT and SKIP LOCKED modes in.
    #[must_use]
    pub const fn effective_timeout(&self) -> LockTimeout {
        match self.mode {
            LockMode::UpgradeNoWait => LockTimeout::NoWait,
            LockMode::UpgradeSkipLocked => LockTimeout::SkipLocked,
            _ => self.timeout,
        }
    }
}

/// Granularity at which a database applies `for update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowLockStrategy {
    /// `for update of column`.
    #[default]
    Column,
    /// `for update of table_alias`.
    Table,
    /// No `of` list.
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_timeout() {
        let options = LockOptions::new(LockMode::UpgradeSkipLocked);
        assert_eq!(options.effective_timeout(), LockTimeout::SkipLocked);
        let options =
            LockOptions::new(LockMode::PessimisticWrite).with_timeout(LockTimeout::Millis(1500));
        assert_eq!(options.effective_timeout(), LockTimeout::Millis(1500));
        assert_eq!(options.effective_timeout().seconds(), Some(2));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(
            "pessimistic-write".parse::<LockMode>().unwrap(),
            LockMode::PessimisticWrite
        );
        assert!("exclusive".parse::<LockMode>().is_err());
        assert!(LockMode::UpgradeNoWait.is_pessimistic());
        assert!(!LockMode::Optimistic.is_pessimistic());
    }

    #[test]
    fn test_aliases() {
        let options = LockOptions::new(LockMode::PessimisticWrite).with_aliases(["a", "b"]);
        assert_eq!(options.aliases, vec!["a".to_string(), "b".to_string()]);
    }
}

//! Cursor keep-alive durations in the engine's time-unit syntax.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Time-to-live granted to a scroll cursor or point-in-time snapshot.
///
/// Renders as `2m`, `30s`, `1h` or `500ms`, choosing the largest unit that
/// represents the duration exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeepAlive(Duration);

impl KeepAlive {
    /// Two minutes, the keep-alive the benchmarks have always used.
    pub const DEFAULT: Self = Self(Duration::from_secs(120));

    /// Creates a keep-alive from a duration.
    pub const fn new(duration: Duration) -> Self {
        Self(duration)
    }

    /// Creates a keep-alive from whole seconds.
    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    /// Returns the keep-alive as a duration.
    pub const fn as_duration(&self) -> Duration {
        self.0
    }

    /// Returns true if the duration is zero.
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Default for KeepAlive {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for KeepAlive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.0.as_millis();
        if millis == 0 {
            return f.write_str("0s");
        }
        if millis % 1000 != 0 {
            return write!(f, "{millis}ms");
        }

        let secs = self.0.as_secs();
        match secs {
            s if s % 3600 == 0 => write!(f, "{}h", s / 3600),
            s if s % 60 == 0 => write!(f, "{}m", s / 60),
            s => write!(f, "{s}s"),
        }
    }
}

impl FromStr for KeepAlive {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim();
        let split = input
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(input.len());
        let (amount, unit) = input.split_at(split);

        let amount: u64 = amount.parse().map_err(|_| {
            Error::invalid_input().with_message(format!("invalid keep-alive '{s}'"))
        })?;

        let duration = match unit {
            "ms" => Duration::from_millis(amount),
            "s" => Duration::from_secs(amount),
            "m" => Duration::from_secs(amount.saturating_mul(60)),
            "h" => Duration::from_secs(amount.saturating_mul(3600)),
            "d" => Duration::from_secs(amount.saturating_mul(86_400)),
            _ => {
                return Err(Error::invalid_input()
                    .with_message(format!("unsupported keep-alive unit in '{s}'")));
            }
        };

        Ok(Self(duration))
    }
}

impl TryFrom<String> for KeepAlive {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<KeepAlive> for String {
    fn from(value: KeepAlive) -> Self {
        value.to_string()
    }
}

impl From<Duration> for KeepAlive {
    fn from(value: Duration) -> Self {
        Self(value)
    }
}

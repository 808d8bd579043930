use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// What to do with a failure that would otherwise end the instance.
///
/// - `Suppress`: log it and carry on as if the step completed (default).
///   A failing worker must not abort its peers or trigger cluster retries.
/// - `Propagate`: return it to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    Propagate,
    #[default]
    Suppress,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "propagate" => Ok(FailurePolicy::Propagate),
            "suppress" => Ok(FailurePolicy::Suppress),
            other => Err(format!(
                "invalid failure policy: {other} (expected \"propagate\" or \"suppress\")"
            )),
        }
    }
}

/// Which of the child's two output streams a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamTag {
    Stdout,
    Stderr,
}

impl StreamTag {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamTag::Stdout => "stdout",
            StreamTag::Stderr => "stderr",
        }
    }
}

impl fmt::Display for StreamTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

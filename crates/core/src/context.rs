//! Snapshot of the environment signals consulted during registration

use std::collections::BTreeMap;
use std::env;

/// Read-only set of boolean flags captured once at startup.
///
/// The registration phase is the only consumer; tasks never see it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    flags: BTreeMap<String, bool>,
}

impl ExecutionContext {
    /// Read each named signal from the process environment
    pub fn from_env<I, S>(signals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_lookup(signals, |name| env::var(name).ok())
    }

    /// Build a context from explicit flag values
    pub fn from_flags<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        Self {
            flags: flags.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    fn from_lookup<I, S, F>(signals: I, lookup: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let flags = signals
            .into_iter()
            .map(|signal| {
                let name = signal.as_ref();
                let value = lookup(name).as_deref().map(is_truthy).unwrap_or(false);
                (name.to_string(), value)
            })
            .collect();
        Self { flags }
    }

    /// Whether a flag is set; unknown flags are unset
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn flags(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}

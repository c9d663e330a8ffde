//! Environment handed to the server, fixture helpers and test runner

use std::ffi::OsString;
use std::process::Command;

use crate::config::EnvSettings;

/// Variables to set and strip on every child process
#[derive(Debug, Clone, Default)]
pub struct ChildEnvironment {
    set: Vec<(String, OsString)>,
    remove: Vec<String>,
}

impl ChildEnvironment {
    /// Build the test environment from configuration
    pub fn from_settings(settings: &EnvSettings) -> Self {
        let mut env = Self::default();
        env.set(&settings.test_mode_var, "1");
        if !settings.executable_path.as_os_str().is_empty() {
            env.set(&settings.executable_var, settings.executable_path.as_os_str());
        }
        for name in &settings.suppressed {
            env.suppress(name);
        }
        env
    }

    /// Set a variable on every child
    pub fn set(&mut self, name: &str, value: impl Into<OsString>) -> &mut Self {
        self.remove.retain(|n| n != name);
        self.set.retain(|(n, _)| n != name);
        self.set.push((name.to_string(), value.into()));
        self
    }

    /// Strip a variable from every child
    pub fn suppress(&mut self, name: &str) -> &mut Self {
        self.set.retain(|(n, _)| n != name);
        if !self.remove.iter().any(|n| n == name) {
            self.remove.push(name.to_string());
        }
        self
    }

    /// Apply to a command about to be spawned
    pub fn apply(&self, cmd: &mut Command) {
        for name in &self.remove {
            cmd.env_remove(name);
        }
        for (name, value) in &self.set {
            cmd.env(name, value);
        }
    }

    pub fn vars(&self) -> impl Iterator<Item = (&str, &OsString)> {
        self.set.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn suppressed(&self) -> impl Iterator<Item = &str> {
        self.remove.iter().map(String::as_str)
    }
}

/// True when the CI marker variable is set to a non-empty value
pub fn running_under_ci(ci_var: &str) -> bool {
    std::env::var_os(ci_var).is_some_and(|v| !v.is_empty())
}

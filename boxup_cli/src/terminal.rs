//! Terminal detection and capability utilities
//!
//! Progress notices and errors go to stderr, so every check here looks at
//! stderr rather than stdout.

use is_terminal::IsTerminal;
use std::env;
use std::io::stderr;

/// Check if stderr is connected to a terminal
pub fn stderr_is_terminal() -> bool {
    stderr().is_terminal()
}

/// Check if stderr is an interactive terminal outside of CI
pub fn is_interactive() -> bool {
    if !stderr_is_terminal() {
        return false;
    }

    // CI runners sometimes allocate a TTY
    if is_ci_environment() {
        return false;
    }

    env::var("DEBIAN_FRONTEND").unwrap_or_default() != "noninteractive"
}

/// Check if the terminal supports ANSI escape codes for colors
pub fn supports_ansi() -> bool {
    if !is_interactive() {
        return false;
    }

    let term = env::var("TERM").unwrap_or_default();
    if term == "dumb" || term.is_empty() {
        return false;
    }

    true
}

/// Whether colored output should be emitted
///
/// `NO_COLOR` always wins, then the configured preference, then terminal
/// capabilities.
pub fn should_use_color(color_enabled: bool) -> bool {
    if env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        return false;
    }
    color_enabled && supports_ansi()
}

/// Detect if running in a CI environment
fn is_ci_environment() -> bool {
    let ci_vars = [
        "CI",
        "CONTINUOUS_INTEGRATION",
        "JENKINS_URL",
        "GITHUB_ACTIONS",
        "GITLAB_CI",
        "TRAVIS",
        "CIRCLECI",
        "BUILDKITE",
        "DRONE",
        "TEAMCITY_VERSION",
        "TF_BUILD", // Azure DevOps
    ];

    ci_vars.iter().any(|var| env::var(var).is_ok())
}

//! Environment variable and home directory expansion for config values.

use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a string.
///
/// Bare `$VAR` is left alone so literal dollar signs in URLs and tokens
/// survive. An unset variable without a default is an error naming `field`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |name| -> Result<Option<String>, UnsetVar> {
        std::env::var(name)
            .map(Some)
            .map_err(|_| UnsetVar(name.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Expand environment references and a leading `~` in a path value.
pub(crate) fn expand_path(path: &Path, field: &str) -> Result<PathBuf, ConfigError> {
    let Some(raw) = path.to_str() else {
        return Ok(path.to_path_buf());
    };
    let expanded = expand_env(raw, field)?;
    Ok(PathBuf::from(shellexpand::tilde(&expanded).into_owned()))
}

struct UnsetVar(String);

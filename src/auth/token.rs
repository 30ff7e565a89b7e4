//! Token management for Wavefleet API authentication.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::error::WavefleetError;

/// Environment variable (and token file key) holding the API token.
pub const TOKEN_ENV_VAR: &str = "WF_API_TOKEN";

/// Name of the token file looked up in the user's home directory.
pub const TOKEN_FILE_NAME: &str = "sofar_api.env";

/// An API token for the Wavefleet API.
#[derive(Clone)]
pub struct ApiToken {
    token: SecretString,
}

impl ApiToken {
    /// Wrap a token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }

    /// Get the raw token for request headers.
    ///
    /// This method exposes the secret - use carefully.
    pub fn expose_secret(&self) -> &str {
        self.token.expose_secret()
    }

    fn non_empty(token: String) -> Option<Self> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self::new(trimmed))
        }
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiToken")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for ApiToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose_secret() == other.expose_secret()
    }
}

impl Eq for ApiToken {}

/// Trait for providing an API token.
///
/// Implement this trait to customize where the token comes from,
/// for example a secrets manager.
pub trait TokenProvider: Send + Sync {
    /// Get the token, or `None` if this source has none.
    fn token(&self) -> Option<ApiToken>;
}

/// Token provider that holds a token directly.
#[derive(Clone, Debug)]
pub struct StaticToken {
    token: ApiToken,
}

impl StaticToken {
    /// Create a new static token provider.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: ApiToken::new(token),
        }
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<ApiToken> {
        Some(self.token.clone())
    }
}

/// Token provider that reads an environment variable.
///
/// By default, reads `WF_API_TOKEN`.
#[derive(Clone, Debug)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    /// Read the default `WF_API_TOKEN` variable.
    pub fn new() -> Self {
        Self::from_var(TOKEN_ENV_VAR)
    }

    /// Read a custom environment variable.
    pub fn from_var(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvToken {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenProvider for EnvToken {
    fn token(&self) -> Option<ApiToken> {
        std::env::var(&self.var).ok().and_then(ApiToken::non_empty)
    }
}

/// Token provider that reads a dotenv-style file.
///
/// The file holds `KEY=value` lines; the `WF_API_TOKEN` entry is used.
/// The process environment is left untouched.
#[derive(Clone, Debug)]
pub struct FileToken {
    path: Option<PathBuf>,
    key: String,
}

impl FileToken {
    /// Read `$HOME/sofar_api.env`.
    pub fn new() -> Self {
        Self {
            path: dirs::home_dir().map(|home| home.join(TOKEN_FILE_NAME)),
            key: TOKEN_ENV_VAR.to_string(),
        }
    }

    /// Read a token file at a custom path.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            key: TOKEN_ENV_VAR.to_string(),
        }
    }

    /// Path this provider reads, if a home directory could be determined.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Default for FileToken {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenProvider for FileToken {
    fn token(&self) -> Option<ApiToken> {
        let path = self.path.as_ref()?;
        if !path.is_file() {
            return None;
        }

        let entries = match dotenv::from_path_iter(path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Unable to read token file");
                return None;
            }
        };

        for entry in entries {
            match entry {
                Ok((key, value)) if key == self.key => return ApiToken::non_empty(value),
                Ok(_) => {}
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Skipping malformed token file line");
                }
            }
        }
        None
    }
}

/// Resolve the API token.
///
/// Resolution order: `explicit` > `WF_API_TOKEN` environment variable >
/// `$HOME/sofar_api.env`. Fails with [`WavefleetError::Authentication`]
/// if no source has a token.
pub fn resolve_token(explicit: Option<&str>) -> Result<ApiToken, WavefleetError> {
    resolve_token_with(explicit, None)
}

/// Resolve the API token, consulting `custom` after `explicit` and before
/// the environment and the token file.
pub(crate) fn resolve_token_with(
    explicit: Option<&str>,
    custom: Option<&dyn TokenProvider>,
) -> Result<ApiToken, WavefleetError> {
    resolve_chain(explicit, custom, &EnvToken::new(), &FileToken::new())
}

fn resolve_chain<'a>(
    explicit: Option<&str>,
    custom: Option<&'a dyn TokenProvider>,
    env: &'a dyn TokenProvider,
    file: &'a dyn TokenProvider,
) -> Result<ApiToken, WavefleetError> {
    let mut providers: Vec<&'a dyn TokenProvider> = Vec::with_capacity(3);
    providers.extend(custom);
    providers.push(env);
    providers.push(file);
    resolve_with(explicit, &providers)
}

/// Resolve a token from `explicit` and then each provider in order.
fn resolve_with(
    explicit: Option<&str>,
    providers: &[&dyn TokenProvider],
) -> Result<ApiToken, WavefleetError> {
    if let Some(token) = explicit.and_then(|t| ApiToken::non_empty(t.to_string())) {
        debug!("Using explicitly provided API token");
        return Ok(token);
    }

    providers
        .iter()
        .find_map(|provider| provider.token())
        .ok_or_else(|| {
            WavefleetError::Authentication(format!(
                "no API token found; pass one explicitly, set {TOKEN_ENV_VAR} or add it to ~/{TOKEN_FILE_NAME}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    struct NoToken;

    impl TokenProvider for NoToken {
        fn token(&self) -> Option<ApiToken> {
            None
        }
    }

    #[test]
    fn test_token_debug_redacted() {
        let token = ApiToken::new("super_secret");
        let debug_str = format!("{:?}", token);
        assert!(!debug_str.contains("super_secret"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_explicit_token_wins() {
        let fallback = StaticToken::new("from_provider");
        let token = resolve_with(Some("explicit"), &[&fallback]).unwrap();
        assert_eq!(token.expose_secret(), "explicit");
    }

    #[test]
    fn test_blank_explicit_token_falls_through() {
        let fallback = StaticToken::new("from_provider");
        let token = resolve_with(Some("  "), &[&NoToken, &fallback]).unwrap();
        assert_eq!(token.expose_secret(), "from_provider");
    }

    #[test]
    fn test_env_token_beats_file_token() {
        let env = StaticToken::new("env");
        let file = StaticToken::new("file");
        let token = resolve_with(None, &[&env, &file]).unwrap();
        assert_eq!(token.expose_secret(), "env");
    }

    #[test]
    fn test_chain_order() {
        let custom = StaticToken::new("custom");
        let env = StaticToken::new("env");
        let file = StaticToken::new("file");

        let token = resolve_chain(Some("explicit"), Some(&custom), &env, &file).unwrap();
        assert_eq!(token.expose_secret(), "explicit");

        let token = resolve_chain(None, Some(&custom), &env, &file).unwrap();
        assert_eq!(token.expose_secret(), "custom");

        let token = resolve_chain(None, None, &env, &file).unwrap();
        assert_eq!(token.expose_secret(), "env");

        let token = resolve_chain(None, None, &NoToken, &file).unwrap();
        assert_eq!(token.expose_secret(), "file");

        let token = resolve_chain(None, Some(&NoToken), &NoToken, &file).unwrap();
        assert_eq!(token.expose_secret(), "file");
    }

    #[test]
    fn test_file_token_used_when_env_blank() {
        let var = "WAVEFLEET_TEST_TOKEN_ENV_BLANK";
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var(var, "   ") };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "WF_API_TOKEN=file_token").unwrap();

        let env = EnvToken::from_var(var);
        let from_file = FileToken::from_path(file.path());
        let token = resolve_chain(None, None, &env, &from_file).unwrap();
        assert_eq!(token.expose_secret(), "file_token");
        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn test_missing_token_is_authentication_error() {
        let err = resolve_with(None, &[&NoToken]).unwrap_err();
        assert!(matches!(err, WavefleetError::Authentication(_)));
    }

    #[test]
    fn test_env_token_reads_variable() {
        let var = "WAVEFLEET_TEST_TOKEN_ENV_READ";
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var(var, "env_token") };
        let token = EnvToken::from_var(var).token().unwrap();
        assert_eq!(token.expose_secret(), "env_token");
        unsafe { std::env::remove_var(var) };
        assert!(EnvToken::from_var(var).token().is_none());
    }

    #[test]
    fn test_file_token_reads_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# spotter credentials").unwrap();
        writeln!(file, "OTHER=value").unwrap();
        writeln!(file, "WF_API_TOKEN=file_token").unwrap();

        let token = FileToken::from_path(file.path()).token().unwrap();
        assert_eq!(token.expose_secret(), "file_token");
    }

    #[test]
    fn test_file_token_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FileToken::from_path(dir.path().join("absent.env"));
        assert!(provider.token().is_none());
    }

    #[test]
    fn test_file_token_without_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "OTHER=value").unwrap();
        assert!(FileToken::from_path(file.path()).token().is_none());
    }
}

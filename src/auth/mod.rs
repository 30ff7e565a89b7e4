//! Authentication module for the Wavefleet API.
//!
//! This module provides:
//! - Token storage that keeps the credential out of debug output
//! - Token providers for explicit values, the environment and the token file
//! - The resolution chain used when a client is built

mod token;

pub use token::{
    ApiToken, EnvToken, FileToken, StaticToken, TOKEN_ENV_VAR, TOKEN_FILE_NAME, TokenProvider,
    resolve_token,
};
pub(crate) use token::resolve_token_with;

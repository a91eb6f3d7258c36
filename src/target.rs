//! Deployment target - the remote host/user/credential tuple.
//!
//! The credential is wrapped in `AuthSecret`, which never appears in
//! Debug/Display output and is not serializable. Rendered plans and logs
//! only ever see the `user@host` login string.

use std::fmt;

use crate::error::{DeployError, DeployResult};

/// Opaque authentication secret.
///
/// Formats as `[redacted]` everywhere; the raw value is only reachable
/// through `expose()`.
#[derive(Clone)]
pub struct AuthSecret(String);

impl AuthSecret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw secret. Callers must not write it to any output.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

impl fmt::Display for AuthSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

/// Where deployment operates against: host, user, optional secret.
///
/// Immutable after construction. The secret comes from the environment at
/// startup (see `Config::target`), never from the config file.
#[derive(Debug, Clone)]
pub struct DeployTarget {
    host: String,
    user: String,
    secret: Option<AuthSecret>,
}

impl DeployTarget {
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            secret: None,
        }
    }

    /// Parse a `user@host` spec (the `--remote` flag format)
    pub fn parse(spec: &str) -> DeployResult<Self> {
        match spec.split_once('@') {
            Some((user, host)) if !user.is_empty() && !host.is_empty() => {
                Ok(Self::new(host, user))
            }
            _ => Err(DeployError::InvalidRemote {
                spec: spec.to_string(),
            }),
        }
    }

    pub fn with_secret(mut self, secret: AuthSecret) -> Self {
        self.secret = Some(secret);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn secret(&self) -> Option<&AuthSecret> {
        self.secret.as_ref()
    }

    /// The `user@host` login string used in scp/ssh commands
    pub fn login(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

//! HTTP Digest authentication (RFC 2617) helpers
//!
//! Every intermediate hash is the lowercase hex text of an MD5 digest, and
//! that text is what feeds the next step. MD5 is resolved through the
//! caller's [`Registry`].

use crate::error::{CipherError, Result};
use crate::registry::Registry;

/// Digest algorithm named in the challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestAlgorithm {
    /// `MD5`, also used when the challenge names no algorithm
    #[default]
    Md5,
    /// `MD5-sess`: the session key also covers the nonces
    Md5Sess,
}

impl DigestAlgorithm {
    /// Parse a challenge value; `None` and `""` mean MD5
    pub fn parse(value: Option<&str>) -> Result<Self> {
        match value {
            None | Some("") => Ok(Self::Md5),
            Some(v) if v.eq_ignore_ascii_case("MD5") => Ok(Self::Md5),
            Some(v) if v.eq_ignore_ascii_case("MD5-sess") => Ok(Self::Md5Sess),
            Some(v) => Err(CipherError::UnsupportedAlgorithm(v.to_string())),
        }
    }
}

/// Quality of protection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Qop {
    /// No qop directive: RFC 2069 compatible response
    #[default]
    None,
    /// `auth`
    Auth,
    /// `auth-int`: the entity body is covered too
    AuthInt,
}

impl Qop {
    /// Parse a challenge value; `None` and `""` mean no qop
    pub fn parse(value: Option<&str>) -> Result<Self> {
        match value {
            None | Some("") => Ok(Self::None),
            Some(v) if v.eq_ignore_ascii_case("auth") => Ok(Self::Auth),
            Some(v) if v.eq_ignore_ascii_case("auth-int") => Ok(Self::AuthInt),
            Some(v) => Err(CipherError::UnsupportedQop(v.to_string())),
        }
    }
}

/// Inputs to [`session_key`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionKeyParams<'a> {
    /// `MD5`, `MD5-sess` or absent
    pub algorithm: Option<&'a str>,
    /// User name
    pub username: &'a str,
    /// Protection realm
    pub realm: &'a str,
    /// Password
    pub password: &'a str,
    /// Server nonce
    pub nonce: &'a str,
    /// Client nonce, required for `MD5-sess`
    pub client_nonce: Option<&'a str>,
}

/// Inputs to [`response`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParams<'a> {
    /// `MD5`, `MD5-sess` or absent
    pub algorithm: Option<&'a str>,
    /// Request method, e.g. `GET`
    pub method: &'a str,
    /// Request URI as sent in the `uri` directive
    pub digest_uri: &'a str,
    /// `auth`, `auth-int` or absent
    pub qop: Option<&'a str>,
    /// Entity body, required for `auth-int`
    pub entity: Option<&'a str>,
    /// Server nonce
    pub nonce: &'a str,
    /// Hex nonce count, required whenever qop is present
    pub nonce_count: Option<&'a str>,
    /// Client nonce, required whenever qop is present
    pub client_nonce: Option<&'a str>,
    /// Output of [`session_key`]
    pub session_key: &'a str,
}

fn md5_hex(registry: &Registry, parts: &[&str]) -> Result<String> {
    let mut context = registry.context("md5")?;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            context.append(b":")?;
        }
        context.append(part.as_bytes())?;
    }
    context.hex_digest()
}

fn required<'a>(value: Option<&'a str>, name: &'static str, purpose: &str) -> Result<&'a str> {
    value.ok_or_else(|| {
        tracing::error!("Required {name} missing for {purpose} digest calculation");
        CipherError::MissingRequiredParameter(name)
    })
}

/// Compute the session key (`H(A1)`) as 32 lowercase hex characters
///
/// # Errors
///
/// `UnsupportedAlgorithm` for anything but MD5 / MD5-sess,
/// `MissingRequiredParameter("client_nonce")` for MD5-sess without a client
/// nonce, `NotFound` if md5 is not registered.
pub fn session_key(registry: &Registry, params: &SessionKeyParams<'_>) -> Result<String> {
    let algorithm = DigestAlgorithm::parse(params.algorithm)?;
    let client_nonce = match algorithm {
        DigestAlgorithm::Md5 => None,
        DigestAlgorithm::Md5Sess => {
            Some(required(params.client_nonce, "client_nonce", "MD5-sess")?)
        }
    };

    let credentials = md5_hex(registry, &[params.username, params.realm, params.password])?;
    match client_nonce {
        None => Ok(credentials),
        Some(cnonce) => md5_hex(registry, &[&credentials, params.nonce, cnonce]),
    }
}

/// Compute the `response` directive as 32 lowercase hex characters
///
/// # Errors
///
/// `UnsupportedAlgorithm` / `UnsupportedQop` for unknown directives,
/// `MissingRequiredParameter` when `entity` (auth-int) or `nonce_count` /
/// `client_nonce` (any qop) are absent, `NotFound` if md5 is not registered.
pub fn response(registry: &Registry, params: &ResponseParams<'_>) -> Result<String> {
    DigestAlgorithm::parse(params.algorithm)?;
    let qop = Qop::parse(params.qop)?;

    let entity = match qop {
        Qop::AuthInt => Some(required(params.entity, "entity", "auth-int")?),
        Qop::Auth | Qop::None => None,
    };
    let counters = match qop {
        Qop::None => None,
        Qop::Auth | Qop::AuthInt => Some((
            required(params.nonce_count, "nonce_count", "qop")?,
            required(params.client_nonce, "client_nonce", "qop")?,
        )),
    };

    let request = match entity {
        Some(body) => {
            let entity_hash = md5_hex(registry, &[body])?;
            md5_hex(registry, &[params.method, params.digest_uri, &entity_hash])?
        }
        None => md5_hex(registry, &[params.method, params.digest_uri])?,
    };

    match counters {
        Some((nonce_count, client_nonce)) => md5_hex(
            registry,
            &[
                params.session_key,
                params.nonce,
                nonce_count,
                client_nonce,
                params.qop.unwrap_or_default(),
                &request,
            ],
        ),
        None => md5_hex(registry, &[params.session_key, params.nonce, &request]),
    }
}

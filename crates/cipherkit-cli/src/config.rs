//! Command-line configuration.
//!
//! Every option can be given on the command line; the log filter can also
//! come from `CIPHERKIT_LOG`.

use clap::{Args, Parser, Subcommand, ValueEnum};

use cipherkit::BatchMode;

/// Top-level CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cipherkit",
    about = "Digest, HMAC, block and stream cipher operations from the command line",
    version
)]
pub struct CliConfig {
    /// Log filter directive, e.g. `debug` or `cipherkit=trace`
    #[arg(long, global = true, env = "CIPHERKIT_LOG", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List registered ciphers and their operations
    List,

    /// Hash text or hex-encoded bytes
    Digest {
        /// Digest name (md4, md5, sha1, sha256)
        algorithm: String,

        /// Hex-encoded input instead of text
        #[arg(long = "hex", value_name = "HEX", conflicts_with = "text")]
        input_hex: Option<String>,

        /// Text input
        text: Option<String>,
    },

    /// Compute an HMAC over text
    Hmac {
        /// Inner digest name
        hash: String,

        /// Key as text
        #[arg(long)]
        key: String,

        /// Message text
        text: String,
    },

    /// Encrypt hex-encoded input
    Encrypt(CryptArgs),

    /// Decrypt hex-encoded input
    Decrypt(CryptArgs),

    /// Compute an RFC 2617 session key and response
    HttpDigest(HttpDigestArgs),
}

/// Arguments shared by `encrypt` and `decrypt`.
#[derive(Debug, Clone, Args)]
pub struct CryptArgs {
    /// Cipher name (des, des3, rc4)
    pub cipher: String,

    /// Hex-encoded key
    #[arg(long)]
    pub key_hex: String,

    /// Use only the first N key bytes (rc4)
    #[arg(long)]
    pub key_len: Option<usize>,

    /// Hex-encoded IV (des3 CBC)
    #[arg(long)]
    pub iv_hex: Option<String>,

    /// Chaining mode for ciphers that support one
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Hex-encoded input
    #[arg(long)]
    pub input_hex: String,
}

/// Chaining mode flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Electronic codebook
    Ecb,
    /// Cipher block chaining
    Cbc,
}

impl From<Mode> for BatchMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Ecb => Self::Ecb,
            Mode::Cbc => Self::Cbc,
        }
    }
}

/// Arguments for `http-digest`.
#[derive(Debug, Clone, Args)]
pub struct HttpDigestArgs {
    /// MD5 or MD5-sess
    #[arg(long)]
    pub algorithm: Option<String>,

    /// User name
    #[arg(long)]
    pub username: String,

    /// Protection realm
    #[arg(long)]
    pub realm: String,

    /// Password
    #[arg(long)]
    pub password: String,

    /// Server nonce
    #[arg(long)]
    pub nonce: String,

    /// Client nonce
    #[arg(long)]
    pub cnonce: Option<String>,

    /// Request method
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// Request URI
    #[arg(long)]
    pub uri: String,

    /// auth or auth-int
    #[arg(long)]
    pub qop: Option<String>,

    /// Entity body for auth-int
    #[arg(long)]
    pub entity: Option<String>,

    /// Nonce count, e.g. 00000001
    #[arg(long)]
    pub nc: Option<String>,
}

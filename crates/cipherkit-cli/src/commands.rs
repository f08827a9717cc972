//! Subcommand handlers. Each returns the text to print.

use anyhow::{Context, Result, bail};

use cipherkit::http_digest::{self, ResponseParams, SessionKeyParams};
use cipherkit::{CipherContext, Operation, OptionValue, Registry};

use crate::config::{Command, CryptArgs, HttpDigestArgs};

/// Run one subcommand against `registry`
pub fn run(registry: &Registry, command: &Command) -> Result<String> {
    match command {
        Command::List => Ok(list(registry)),
        Command::Digest {
            algorithm,
            input_hex,
            text,
        } => {
            let data = match (input_hex, text) {
                (Some(encoded), _) => hex::decode(encoded).context("invalid --hex input")?,
                (None, Some(text)) => text.as_bytes().to_vec(),
                (None, None) => Vec::new(),
            };
            registry
                .digest_region(algorithm, &data)
                .with_context(|| format!("{algorithm} digest failed"))
        }
        Command::Hmac { hash, key, text } => hmac(registry, hash, key, text),
        Command::Encrypt(args) => crypt(registry, args, Direction::Encrypt),
        Command::Decrypt(args) => crypt(registry, args, Direction::Decrypt),
        Command::HttpDigest(args) => http_digest(registry, args),
    }
}

fn list(registry: &Registry) -> String {
    registry
        .ciphers()
        .map(|cipher| format!("{:<8} {}", cipher.name(), cipher.capabilities()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn hmac(registry: &Registry, hash: &str, key: &str, text: &str) -> Result<String> {
    let mut context = registry.context("hmac")?;
    context.set_option("hash", OptionValue::Text(hash.to_string()))?;
    context.set_key(key.as_bytes())?;
    context.append(text.as_bytes())?;
    Ok(context.hex_digest()?)
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Encrypt,
    Decrypt,
}

fn crypt(registry: &Registry, args: &CryptArgs, direction: Direction) -> Result<String> {
    let key = hex::decode(&args.key_hex).context("invalid --key-hex")?;
    let input = hex::decode(&args.input_hex).context("invalid --input-hex")?;

    let mut context = registry
        .context(&args.cipher)
        .with_context(|| format!("unknown cipher {}", args.cipher))?;
    configure(&mut context, args, &key)?;

    let output = match direction {
        Direction::Encrypt => context.encrypt(&input)?,
        Direction::Decrypt => context.decrypt(&input)?,
    };
    Ok(hex::encode(output))
}

fn configure(context: &mut CipherContext, args: &CryptArgs, key: &[u8]) -> Result<()> {
    match args.key_len {
        Some(len) => context.set_key_with_len(key, len)?,
        None => context.set_key(key)?,
    }

    if let Some(iv_hex) = &args.iv_hex {
        let iv = hex::decode(iv_hex).context("invalid --iv-hex")?;
        context.set_iv(&iv)?;
    }

    if let Some(mode) = args.mode {
        if !context.capabilities().contains(Operation::SetBatchMode) {
            bail!("{} has no chaining modes", context.name());
        }
        context.set_batch_mode(mode.into())?;
    }
    Ok(())
}

fn http_digest(registry: &Registry, args: &HttpDigestArgs) -> Result<String> {
    let session_key = http_digest::session_key(
        registry,
        &SessionKeyParams {
            algorithm: args.algorithm.as_deref(),
            username: &args.username,
            realm: &args.realm,
            password: &args.password,
            nonce: &args.nonce,
            client_nonce: args.cnonce.as_deref(),
        },
    )
    .context("session key calculation failed")?;

    let response = http_digest::response(
        registry,
        &ResponseParams {
            algorithm: args.algorithm.as_deref(),
            method: &args.method,
            digest_uri: &args.uri,
            qop: args.qop.as_deref(),
            entity: args.entity.as_deref(),
            nonce: &args.nonce,
            nonce_count: args.nc.as_deref(),
            client_nonce: args.cnonce.as_deref(),
            session_key: &session_key,
        },
    )
    .context("response calculation failed")?;

    Ok(format!("session_key={session_key}\nresponse={response}"))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::CliConfig;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn run_args(args: &[&str]) -> Result<String> {
        let argv = std::iter::once("cipherkit").chain(args.iter().copied());
        let config = CliConfig::try_parse_from(argv).expect("arguments parse");
        run(&Registry::with_builtins(), &config.command)
    }

    #[test]
    fn test_digest_text_and_hex() {
        assert_eq!(
            run_args(&["digest", "sha256", ""]).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            run_args(&["digest", "sha1", "--hex", "616263"]).unwrap(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_list_shows_builtins() {
        let listing = run_args(&["list"]).unwrap();
        let first: Vec<&str> = listing
            .lines()
            .map(|line| line.split_whitespace().next().unwrap())
            .collect();
        assert_eq!(
            first,
            ["md5", "sha1", "sha256", "md4", "hmac", "des", "des3", "rc4"]
        );
    }

    #[test]
    fn test_hmac() {
        assert_eq!(
            run_args(&[
                "hmac",
                "sha256",
                "--key",
                "Jefe",
                "what do ya want for nothing?"
            ])
            .unwrap(),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_des_encrypt_known_vector() {
        assert_eq!(
            run_args(&[
                "encrypt",
                "des",
                "--key-hex",
                "133457799bbcdff1",
                "--input-hex",
                "0123456789abcdef",
            ])
            .unwrap(),
            "85e813540f0ab405"
        );
    }

    #[test]
    fn test_rc4_with_key_len() {
        assert_eq!(
            run_args(&[
                "encrypt",
                "rc4",
                "--key-hex",
                "4b6579",
                "--key-len",
                "3",
                "--input-hex",
                "506c61696e74657874",
            ])
            .unwrap(),
            "bbf316e8d940af0ad3"
        );
    }

    #[test]
    fn test_mode_rejected_for_des() {
        let err = run_args(&[
            "encrypt",
            "des",
            "--key-hex",
            "133457799bbcdff1",
            "--mode",
            "cbc",
            "--input-hex",
            "00",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("no chaining modes"));
    }

    #[test]
    fn test_http_digest_rfc2617() {
        let output = run_args(&[
            "http-digest",
            "--username",
            "Mufasa",
            "--realm",
            "testrealm@host.com",
            "--password",
            "Circle Of Life",
            "--nonce",
            "dcd98b7102dd2f0e8b11d0f600bfb0c093",
            "--cnonce",
            "0a4f113b",
            "--uri",
            "/dir/index.html",
            "--qop",
            "auth",
            "--nc",
            "00000001",
        ])
        .unwrap();
        assert_eq!(
            output,
            "session_key=939e7578ed9e3c518a452acee763bce9\nresponse=6629fae49393a05397450978507c4ef1"
        );
    }
}

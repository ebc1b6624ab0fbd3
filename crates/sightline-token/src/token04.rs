// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Version-04 join token: a JSON record sealed with AES-256-GCM inside a
//! binary envelope.
//!
//! Envelope layout (all integers big-endian):
//!
//! ```text
//! [expire: i64][nonce_len: u16][nonce][ciphertext_len: u16][ciphertext + tag][mode: u8]
//! ```
//!
//! The token string is `"04"` followed by the standard base64 of the envelope.
//! `expire` sits in clear so a verifier can reject stale tokens before
//! decrypting; `mode` leaves room for other ciphers.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ring::aead::NONCE_LEN;
use serde::{Deserialize, Serialize};
use sightline_core::SightlineError;

use crate::crypto::{self, KEY_LEN};

/// Version marker prefixed to every token.
pub const VERSION_FLAG: &str = "04";

/// Maximum subject length in bytes.
pub const MAX_SUBJECT_LEN: usize = 64;

/// Cipher used for the sealed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EncryptMode {
    Gcm = 1,
}

impl TryFrom<u8> for EncryptMode {
    type Error = SightlineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(EncryptMode::Gcm),
            other => Err(SightlineError::InvalidArgument(format!(
                "unsupported token encryption mode {other}"
            ))),
        }
    }
}

/// The plaintext record sealed inside a token.
///
/// Field names are part of the wire format read by the media provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub app_id: u32,
    pub user_id: String,
    /// Random non-negative 31-bit value.
    pub nonce: u32,
    /// Creation time, unix seconds.
    pub ctime: i64,
    /// Expiry time, unix seconds.
    pub expire: i64,
    #[serde(default)]
    pub payload: String,
}

/// Room-scoped privilege payload understood by the media provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomGrant {
    pub room_id: String,
    /// `"1"`: may log into the room, `"2"`: may publish streams.
    pub privilege: std::collections::BTreeMap<String, u8>,
    pub stream_id_list: Option<Vec<String>>,
}

impl RoomGrant {
    /// Grant to join `room_id` and publish audio/video.
    pub fn join_and_publish(room_id: &str) -> Self {
        Self {
            room_id: room_id.to_string(),
            privilege: [("1".to_string(), 1), ("2".to_string(), 1)]
                .into_iter()
                .collect(),
            stream_id_list: None,
        }
    }

    pub fn to_payload(&self) -> Result<String, SightlineError> {
        serde_json::to_string(self).map_err(|e| SightlineError::Internal(e.to_string()))
    }
}

/// Mint a token for `subject_id`, valid for `ttl_secs` from now.
pub fn mint(
    app_id: u32,
    subject_id: &str,
    secret: &[u8],
    ttl_secs: u32,
    payload: &str,
) -> Result<String, SightlineError> {
    mint_at(
        chrono::Utc::now().timestamp(),
        app_id,
        subject_id,
        secret,
        ttl_secs,
        payload,
    )
}

/// Mint a token with an explicit creation time (unix seconds).
pub fn mint_at(
    now: i64,
    app_id: u32,
    subject_id: &str,
    secret: &[u8],
    ttl_secs: u32,
    payload: &str,
) -> Result<String, SightlineError> {
    if app_id == 0 {
        return Err(SightlineError::InvalidArgument("app_id must not be 0".to_string()));
    }
    if subject_id.is_empty() || subject_id.len() > MAX_SUBJECT_LEN {
        return Err(SightlineError::InvalidArgument(format!(
            "subject id must be 1..={MAX_SUBJECT_LEN} bytes, got {}",
            subject_id.len()
        )));
    }
    let secret = secret_key(secret)?;
    if ttl_secs == 0 {
        return Err(SightlineError::InvalidArgument(
            "ttl_secs must be greater than 0".to_string(),
        ));
    }

    let info = TokenInfo {
        app_id,
        user_id: subject_id.to_string(),
        nonce: crypto::random_u31()?,
        ctime: now,
        expire: now + i64::from(ttl_secs),
        payload: payload.to_string(),
    };
    let plaintext =
        serde_json::to_vec(&info).map_err(|e| SightlineError::Internal(e.to_string()))?;
    let (ciphertext, nonce) = crypto::seal(secret, &plaintext)?;

    let envelope = pack(info.expire, &nonce, &ciphertext, EncryptMode::Gcm)?;
    Ok(format!("{VERSION_FLAG}{}", STANDARD.encode(envelope)))
}

/// Decrypt and verify a token, returning the sealed record.
///
/// Does not check expiry; compare [`TokenInfo::expire`] with the clock.
pub fn open(token: &str, secret: &[u8]) -> Result<TokenInfo, SightlineError> {
    let secret = secret_key(secret)?;
    let envelope = unpack(token)?;
    let nonce: [u8; NONCE_LEN] = envelope.nonce.try_into().map_err(|_| {
        SightlineError::InvalidArgument(format!("token nonce must be {NONCE_LEN} bytes"))
    })?;

    let plaintext = match envelope.mode {
        EncryptMode::Gcm => crypto::open(secret, &nonce, &envelope.ciphertext)?,
    };
    let info: TokenInfo = serde_json::from_slice(&plaintext)
        .map_err(|e| SightlineError::InvalidArgument(format!("malformed token record: {e}")))?;

    if info.expire != envelope.expire {
        return Err(SightlineError::InvalidArgument(
            "token envelope expiry does not match sealed record".to_string(),
        ));
    }
    Ok(info)
}

/// Read the expiry time from a token without decrypting it.
pub fn peek_expire(token: &str) -> Result<i64, SightlineError> {
    unpack(token).map(|envelope| envelope.expire)
}

fn secret_key(secret: &[u8]) -> Result<&[u8; KEY_LEN], SightlineError> {
    secret.try_into().map_err(|_| {
        SightlineError::InvalidArgument(format!(
            "secret must be exactly {KEY_LEN} bytes, got {}",
            secret.len()
        ))
    })
}

fn pack(
    expire: i64,
    nonce: &[u8],
    ciphertext: &[u8],
    mode: EncryptMode,
) -> Result<Vec<u8>, SightlineError> {
    let nonce_len = u16::try_from(nonce.len())
        .map_err(|_| SightlineError::InvalidArgument("nonce too long".to_string()))?;
    let ciphertext_len = u16::try_from(ciphertext.len())
        .map_err(|_| SightlineError::InvalidArgument("token payload too large".to_string()))?;

    let mut buf = Vec::with_capacity(8 + 2 + nonce.len() + 2 + ciphertext.len() + 1);
    buf.extend_from_slice(&expire.to_be_bytes());
    buf.extend_from_slice(&nonce_len.to_be_bytes());
    buf.extend_from_slice(nonce);
    buf.extend_from_slice(&ciphertext_len.to_be_bytes());
    buf.extend_from_slice(ciphertext);
    buf.push(mode as u8);
    Ok(buf)
}

/// Decoded binary envelope.
struct Envelope {
    expire: i64,
    nonce: Vec<u8>,
    ciphertext: Vec<u8>,
    mode: EncryptMode,
}

fn unpack(token: &str) -> Result<Envelope, SightlineError> {
    let body = token.strip_prefix(VERSION_FLAG).ok_or_else(|| {
        SightlineError::InvalidArgument("unsupported token version".to_string())
    })?;
    let bytes = STANDARD
        .decode(body)
        .map_err(|e| SightlineError::InvalidArgument(format!("token is not base64: {e}")))?;

    let mut reader = Reader { buf: &bytes, pos: 0 };
    let expire = i64::from_be_bytes(reader.array()?);
    let nonce_len = u16::from_be_bytes(reader.array()?);
    let nonce = reader.take(usize::from(nonce_len))?.to_vec();
    let ciphertext_len = u16::from_be_bytes(reader.array()?);
    let ciphertext = reader.take(usize::from(ciphertext_len))?.to_vec();
    let [mode] = reader.array()?;
    if reader.pos != bytes.len() {
        return Err(SightlineError::InvalidArgument(
            "trailing bytes after token envelope".to_string(),
        ));
    }

    Ok(Envelope {
        expire,
        nonce,
        ciphertext,
        mode: EncryptMode::try_from(mode)?,
    })
}

/// Bounds-checked cursor over the envelope bytes.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], SightlineError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| {
                SightlineError::InvalidArgument("truncated token envelope".to_string())
            })?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], SightlineError> {
        let slice = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }
}

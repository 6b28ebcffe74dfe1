//! Signed, persisted login session.
//!
//! The session lives in one JSON file: the serialized [`Session`] plus an
//! HMAC-SHA256 tag over it under a key only the client holds. A file whose
//! tag does not verify is ignored, so editing the stored role by hand logs
//! the user out instead of unlocking another portal.

use std::path::{Path, PathBuf};

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, warn};

use placement_types::api::{AuthResponse, Profile};
use placement_types::models::{User, UserRole};

use crate::error::ClientError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub role: UserRole,
    pub user: User,
    pub profile: Option<Profile>,
}

impl From<AuthResponse> for Session {
    fn from(auth: AuthResponse) -> Self {
        Self {
            token: auth.token,
            role: auth.role,
            user: auth.user,
            profile: auth.profile,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SignedBlob {
    payload: String,
    tag: String,
}

pub struct SessionStore {
    path: PathBuf,
    key: Vec<u8>,
    current: Option<Session>,
}

impl SessionStore {
    /// Open the store at `path`, restoring a previously saved session if its
    /// signature checks out.
    pub fn load(path: impl Into<PathBuf>, key: impl Into<Vec<u8>>) -> Result<Self, ClientError> {
        let path = path.into();
        let key = key.into();

        let current = match std::fs::read_to_string(&path) {
            Ok(raw) => verify(&key, &raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        if current.is_some() {
            debug!("Restored session from {}", path.display());
        }

        Ok(Self { path, key, current })
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.token.as_str())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the session after a successful login or registration.
    pub fn set_auth(&mut self, auth: AuthResponse) -> Result<&Session, ClientError> {
        let session = Session::from(auth);
        let blob = sign(&self.key, &session)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, blob)?;

        Ok(self.current.insert(session))
    }

    /// Forget the session and delete its file.
    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.current = None;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn sign(key: &[u8], session: &Session) -> Result<String, ClientError> {
    let payload = serde_json::to_string(session)?;
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| ClientError::InvalidKey)?;
    mac.update(payload.as_bytes());
    let tag = hex::encode(mac.finalize().into_bytes());
    Ok(serde_json::to_string(&SignedBlob { payload, tag })?)
}

fn verify(key: &[u8], raw: &str) -> Option<Session> {
    let blob: SignedBlob = match serde_json::from_str(raw) {
        Ok(blob) => blob,
        Err(e) => {
            warn!("Ignoring unreadable session file: {}", e);
            return None;
        }
    };

    let tag = hex::decode(&blob.tag).ok()?;
    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(blob.payload.as_bytes());
    if mac.verify_slice(&tag).is_err() {
        warn!("Ignoring session file with a bad signature");
        return None;
    }

    serde_json::from_str(&blob.payload).ok()
}

//! In-memory one-time codes with per-key rate limiting.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use rand::Rng;

use crate::error::ApiError;

pub const OTP_TTL: Duration = Duration::from_secs(5 * 60);
const RATE_WINDOW: Duration = Duration::from_secs(15 * 60);
const MAX_SENDS_PER_WINDOW: u32 = 20;
const MAX_VERIFIES_PER_WINDOW: u32 = 40;

/// Fixed-window counter keyed by recipient.
pub struct RateLimiter {
    max: u32,
    window: Duration,
    hits: Mutex<HashMap<String, (Instant, u32)>>,
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Record a hit. Returns `false` once the key is over its budget.
    pub fn check(&self, key: &str, now: Instant) -> bool {
        let mut hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = hits.entry(key.to_string()).or_insert((now, 0));
        if now.duration_since(entry.0) >= self.window {
            *entry = (now, 0);
        }
        entry.1 += 1;
        entry.1 <= self.max
    }

    fn sweep(&self, now: Instant) {
        let mut hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner);
        hits.retain(|_, (started, _)| now.duration_since(*started) < self.window);
    }
}

struct PendingCode {
    code: String,
    expires_at: Instant,
}

pub struct OtpStore {
    codes: Mutex<HashMap<String, PendingCode>>,
    sends: RateLimiter,
    verifies: RateLimiter,
}

impl Default for OtpStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OtpStore {
    pub fn new() -> Self {
        Self {
            codes: Mutex::new(HashMap::new()),
            sends: RateLimiter::new(MAX_SENDS_PER_WINDOW, RATE_WINDOW),
            verifies: RateLimiter::new(MAX_VERIFIES_PER_WINDOW, RATE_WINDOW),
        }
    }

    /// Generate and store a fresh 6-digit code for `key`, replacing any previous one.
    pub fn issue(&self, key: &str) -> Result<String, ApiError> {
        self.issue_at(key, Instant::now())
    }

    fn issue_at(&self, key: &str, now: Instant) -> Result<String, ApiError> {
        if !self.sends.check(key, now) {
            return Err(ApiError::TooManyRequests);
        }

        let code = rand::rng().random_range(100_000..=999_999u32).to_string();
        let mut codes = self.codes.lock().unwrap_or_else(PoisonError::into_inner);
        codes.insert(
            key.to_string(),
            PendingCode {
                code: code.clone(),
                expires_at: now + OTP_TTL,
            },
        );
        Ok(code)
    }

    /// Drop a code that could not be delivered.
    pub fn discard(&self, key: &str, code: &str) {
        let mut codes = self.codes.lock().unwrap_or_else(PoisonError::into_inner);
        if codes.get(key).is_some_and(|p| p.code == code) {
            codes.remove(key);
        }
    }

    /// Check and consume a code.
    pub fn verify(&self, key: &str, code: &str) -> Result<(), ApiError> {
        self.verify_at(key, code, Instant::now())
    }

    fn verify_at(&self, key: &str, code: &str, now: Instant) -> Result<(), ApiError> {
        if !self.verifies.check(key, now) {
            return Err(ApiError::TooManyRequests);
        }

        let mut codes = self.codes.lock().unwrap_or_else(PoisonError::into_inner);
        match codes.get(key) {
            Some(p) if p.expires_at > now && p.code == code.trim() => {
                codes.remove(key);
                Ok(())
            }
            Some(p) if p.expires_at <= now => {
                codes.remove(key);
                Err(ApiError::validation("Invalid or expired OTP"))
            }
            _ => Err(ApiError::validation("Invalid or expired OTP")),
        }
    }

    /// Drop expired codes and stale rate-limit windows. Returns how many codes were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        self.sends.sweep(now);
        self.verifies.sweep(now);

        let mut codes = self.codes.lock().unwrap_or_else(PoisonError::into_inner);
        let before = codes.len();
        codes.retain(|_, p| p.expires_at > now);
        before - codes.len()
    }
}

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const WINDOW: Duration = Duration::from_secs(3600);

/// Why an OTP request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleRejection {
    /// A code was sent too recently; one challenge in flight at a time
    Cooldown { retry_after: Duration },
    /// The hourly cap for this phone number is used up
    WindowExhausted { retry_after: Duration },
}

impl ThrottleRejection {
    pub fn retry_after(&self) -> Duration {
        match self {
            Self::Cooldown { retry_after } | Self::WindowExhausted { retry_after } => *retry_after,
        }
    }
}

/// In-memory per-phone OTP throttle
///
/// Tracks send times per normalized phone number over a rolling hour.
/// Entries are pruned lazily and by `cleanup_expired` (run periodically).
pub struct OtpThrottle {
    cooldown: Duration,
    max_per_window: u32,
    sends: RwLock<HashMap<String, VecDeque<Instant>>>,
}

impl OtpThrottle {
    pub fn new(cooldown: Duration, max_per_window: u32) -> Self {
        Self {
            cooldown,
            max_per_window,
            sends: RwLock::new(HashMap::new()),
        }
    }

    /// Reserve a send slot for `phone_number`.
    ///
    /// Check and record happen under one write lock, so two concurrent
    /// requests for the same number cannot both pass.
    pub async fn reserve(&self, phone_number: &str) -> Result<(), ThrottleRejection> {
        self.reserve_at(phone_number, Instant::now()).await
    }

    pub(crate) async fn reserve_at(
        &self,
        phone_number: &str,
        now: Instant,
    ) -> Result<(), ThrottleRejection> {
        let mut sends = self.sends.write().await;
        let history = sends.entry(phone_number.to_string()).or_default();
        prune(history, now);

        if let Some(last) = history.back() {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < self.cooldown {
                return Err(ThrottleRejection::Cooldown {
                    retry_after: self.cooldown - elapsed,
                });
            }
        }

        if history.len() as u32 >= self.max_per_window {
            let oldest = history.front().copied().unwrap_or(now);
            let retry_after = WINDOW.saturating_sub(now.saturating_duration_since(oldest));
            return Err(ThrottleRejection::WindowExhausted { retry_after });
        }

        history.push_back(now);
        Ok(())
    }

    /// Undo the most recent reservation (the provider never sent the code)
    pub async fn release(&self, phone_number: &str) {
        let mut sends = self.sends.write().await;
        if let Some(history) = sends.get_mut(phone_number) {
            history.pop_back();
            if history.is_empty() {
                sends.remove(phone_number);
            }
        }
    }

    /// Forget a phone number after successful verification
    pub async fn clear(&self, phone_number: &str) {
        self.sends.write().await.remove(phone_number);
    }

    /// Clean up expired entries (run periodically)
    pub async fn cleanup_expired(&self) {
        let now = Instant::now();
        let mut sends = self.sends.write().await;
        sends.retain(|_, history| {
            prune(history, now);
            !history.is_empty()
        });
    }

    pub async fn tracked_numbers(&self) -> usize {
        self.sends.read().await.len()
    }
}

fn prune(history: &mut VecDeque<Instant>, now: Instant) {
    while let Some(oldest) = history.front() {
        if now.saturating_duration_since(*oldest) >= WINDOW {
            history.pop_front();
        } else {
            break;
        }
    }
}

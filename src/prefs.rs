//! # Preference store.
//!
//! Owned by the embedding application; the core reads a [`Preferences`]
//! snapshot and reacts to [`PrefKey`] change notifications.
//!
//! ## Rules
//! - Setters notify only when the stored value actually changes.
//! - Notifications carry the key, never the value; readers take a fresh snapshot.
//! - Changes to `RunCore`, `ApiKey` or `KegbotUrl` trigger a full stop/start
//!   of the core; `IdleTimeout` is applied in place.

use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use url::Url;

/// Default idle period after which an inactive pour ends.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

const CHANGE_CAPACITY: usize = 64;

/// Snapshot of the values the core reads.
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub run_core: bool,
    pub api_key: String,
    pub kegbot_url: Option<Url>,
    pub idle_timeout: Duration,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            run_core: false,
            api_key: String::new(),
            kegbot_url: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl Preferences {
    /// Keys whose values differ between `self` and `other`, in declaration order.
    pub fn diff(&self, other: &Preferences) -> Vec<PrefKey> {
        let mut changed = Vec::new();
        if self.run_core != other.run_core {
            changed.push(PrefKey::RunCore);
        }
        if self.api_key != other.api_key {
            changed.push(PrefKey::ApiKey);
        }
        if self.kegbot_url != other.kegbot_url {
            changed.push(PrefKey::KegbotUrl);
        }
        if self.idle_timeout != other.idle_timeout {
            changed.push(PrefKey::IdleTimeout);
        }
        changed
    }
}

/// Name of a changed preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefKey {
    RunCore,
    ApiKey,
    KegbotUrl,
    IdleTimeout,
}

impl PrefKey {
    /// Returns `true` if a change to this key requires a stop/start cycle.
    pub fn triggers_restart(self) -> bool {
        matches!(self, PrefKey::RunCore | PrefKey::ApiKey | PrefKey::KegbotUrl)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrefKey::RunCore => "run_core",
            PrefKey::ApiKey => "api_key",
            PrefKey::KegbotUrl => "kegbot_url",
            PrefKey::IdleTimeout => "idle_timeout",
        }
    }
}

/// Thread-safe preference store with change notification.
pub struct PreferenceStore {
    values: RwLock<Preferences>,
    changes: broadcast::Sender<PrefKey>,
}

impl PreferenceStore {
    pub fn new(initial: Preferences) -> Self {
        let (changes, _rx) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            values: RwLock::new(initial),
            changes,
        }
    }

    pub fn snapshot(&self) -> Preferences {
        self.values.read().clone()
    }

    /// Receiver of change notifications from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<PrefKey> {
        self.changes.subscribe()
    }

    pub fn set_run_core(&self, run: bool) {
        self.update(PrefKey::RunCore, |p| {
            std::mem::replace(&mut p.run_core, run) != run
        });
    }

    pub fn set_api_key(&self, key: impl Into<String>) {
        let key = key.into();
        self.update(PrefKey::ApiKey, |p| {
            if p.api_key == key {
                return false;
            }
            p.api_key = key;
            true
        });
    }

    pub fn set_kegbot_url(&self, url: Option<Url>) {
        self.update(PrefKey::KegbotUrl, |p| {
            if p.kegbot_url == url {
                return false;
            }
            p.kegbot_url = url;
            true
        });
    }

    pub fn set_idle_timeout(&self, idle: Duration) {
        self.update(PrefKey::IdleTimeout, |p| {
            std::mem::replace(&mut p.idle_timeout, idle) != idle
        });
    }

    fn update(&self, key: PrefKey, apply: impl FnOnce(&mut Preferences) -> bool) {
        let changed = apply(&mut self.values.write());
        if changed {
            let _ = self.changes.send(key);
        }
    }
}

impl Default for PreferenceStore {
    fn default() -> Self {
        Self::new(Preferences::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn test_restart_keys() {
        assert!(PrefKey::RunCore.triggers_restart());
        assert!(PrefKey::ApiKey.triggers_restart());
        assert!(PrefKey::KegbotUrl.triggers_restart());
        assert!(!PrefKey::IdleTimeout.triggers_restart());
    }

    #[test]
    fn test_setters_notify_only_on_change() {
        let store = PreferenceStore::default();
        let mut rx = store.subscribe();

        store.set_run_core(false);
        store.set_api_key("");
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        store.set_run_core(true);
        store.set_api_key("secret");
        store.set_api_key("secret");
        let url = Url::parse("http://kegbot.local/api/").expect("url");
        store.set_kegbot_url(Some(url.clone()));
        store.set_idle_timeout(Duration::from_secs(30));

        assert_eq!(rx.try_recv(), Ok(PrefKey::RunCore));
        assert_eq!(rx.try_recv(), Ok(PrefKey::ApiKey));
        assert_eq!(rx.try_recv(), Ok(PrefKey::KegbotUrl));
        assert_eq!(rx.try_recv(), Ok(PrefKey::IdleTimeout));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        let snap = store.snapshot();
        assert!(snap.run_core);
        assert_eq!(snap.api_key, "secret");
        assert_eq!(snap.kegbot_url, Some(url));
        assert_eq!(snap.idle_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_diff_lists_changed_keys_only() {
        let before = Preferences::default();
        assert!(before.diff(&before.clone()).is_empty());

        let after = Preferences {
            api_key: "secret".into(),
            idle_timeout: Duration::from_secs(30),
            ..before.clone()
        };
        assert_eq!(before.diff(&after), vec![PrefKey::ApiKey, PrefKey::IdleTimeout]);

        let idle_only = Preferences {
            idle_timeout: Duration::from_secs(1),
            ..before.clone()
        };
        assert!(!before.diff(&idle_only).iter().any(|k| k.triggers_restart()));
    }
}

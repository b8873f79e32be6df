//! # Bootstrap: first task on every fresh queue.
//!
//! ```text
//! API Bound ─► Lane::open() ─► submit "configure"
//!                                 ├─ set_api_url / set_api_key (from Preferences)
//!                                 ├─ get_all_taps().await
//!                                 │    ├─ Ok(set) ─► for each: TapManager::add_tap
//!                                 │    │                       ConfigurationStore::set_tap_detail(meter, detail)
//!                                 │    │            ─► Configured{count}
//!                                 │    └─ Err     ─► ConfigureFailed, TaskError::Bootstrap
//! ```
//!
//! There is no retry; a failed bootstrap leaves the core bound but
//! unconfigured until the next bind cycle.

use std::sync::Arc;

use tracing::{debug, info};

use crate::api::ApiProvider;
use crate::error::{ApiError, TaskError};
use crate::events::{Bus, Event, EventKind};
use crate::model::{Tap, TapDetailSet};
use crate::prefs::{PreferenceStore, Preferences};
use crate::taps::{ConfigurationStore, TapManager};
use crate::tasks::{TaskBox, TaskFn};

pub(crate) struct Bootstrap {
    pub(crate) api: Arc<dyn ApiProvider>,
    pub(crate) prefs: Arc<PreferenceStore>,
    pub(crate) tap_manager: Arc<dyn TapManager>,
    pub(crate) config_store: Arc<dyn ConfigurationStore>,
    pub(crate) bus: Bus,
}

impl Bootstrap {
    /// Wraps [`Bootstrap::configure`] as a queued task.
    pub(crate) fn into_task(self) -> TaskBox {
        TaskFn::boxed("configure", move |_ctx| async move {
            self.configure().await.map(|_| ())
        })
    }

    /// Pushes credentials, fetches the tap list and registers every tap.
    ///
    /// Returns the number of registered taps.
    pub(crate) async fn configure(self) -> Result<usize, TaskError> {
        let prefs = self.prefs.snapshot();
        let set = match self.fetch_taps(&prefs).await {
            Ok(set) => set,
            Err(source) => {
                self.bus.publish(
                    Event::new(EventKind::ConfigureFailed).with_reason(source.to_string()),
                );
                return Err(TaskError::Bootstrap { source });
            }
        };

        let count = set.taps.len();
        for detail in set.taps {
            let tap = Tap::from(&detail.tap);
            debug!(tap = tap.name(), meter = tap.meter_name(), "registering tap");
            self.tap_manager.add_tap(tap);
            let meter = detail.tap.meter_name.clone();
            self.config_store.set_tap_detail(&meter, detail);
        }

        info!(taps = count, "core configured");
        self.bus
            .publish(Event::new(EventKind::Configured).with_count(count));
        Ok(count)
    }

    async fn fetch_taps(&self, prefs: &Preferences) -> Result<TapDetailSet, ApiError> {
        let url = prefs
            .kegbot_url
            .as_ref()
            .ok_or_else(|| ApiError::NotConfigured {
                reason: "kegbot url is not set".into(),
            })?;
        self.api.set_api_url(url);
        self.api.set_api_key(&prefs.api_key);
        self.api.get_all_taps().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taps::{TapConfigStore, TapRegistry};
    use crate::testing::{FakeApi, Journal, tap_detail};
    use url::Url;

    struct Rig {
        api: Arc<FakeApi>,
        taps: Arc<TapRegistry>,
        store: Arc<TapConfigStore>,
        journal: Arc<Journal>,
        bus: Bus,
        bootstrap: Bootstrap,
    }

    fn rig(url: Option<&str>) -> Rig {
        let journal = Arc::new(Journal::default());
        let api = Arc::new(FakeApi::new(Arc::clone(&journal)));
        let prefs = Arc::new(PreferenceStore::default());
        prefs.set_api_key("k3y");
        prefs.set_kegbot_url(url.map(|u| Url::parse(u).expect("url")));
        let taps = Arc::new(TapRegistry::new());
        let store = Arc::new(TapConfigStore::new());
        let bus = Bus::new(16);
        let bootstrap = Bootstrap {
            api: api.clone(),
            prefs,
            tap_manager: taps.clone(),
            config_store: store.clone(),
            bus: bus.clone(),
        };
        Rig {
            api,
            taps,
            store,
            journal,
            bus,
            bootstrap,
        }
    }

    #[tokio::test]
    async fn test_configure_registers_every_tap() {
        let rig = rig(Some("http://kegbot.local/api/"));
        rig.api.set_taps(Ok(TapDetailSet {
            taps: vec![
                tap_detail("Left", "flow0"),
                tap_detail("Middle", "flow1"),
                tap_detail("Right", "flow2"),
            ],
        }));
        let mut events = rig.bus.subscribe();

        let count = rig.bootstrap.configure().await.expect("configured");

        assert_eq!(count, 3);
        let names: Vec<String> = rig.taps.taps().iter().map(|t| t.name().to_owned()).collect();
        assert_eq!(names, vec!["Left", "Middle", "Right"]);
        assert_eq!(rig.store.len(), 3);
        assert_eq!(rig.store.tap_detail("flow1"), Some(tap_detail("Middle", "flow1")));
        assert_eq!(
            rig.api.url().map(|u| u.to_string()),
            Some("http://kegbot.local/api/".to_owned())
        );
        assert_eq!(rig.api.key().as_deref(), Some("k3y"));
        assert_eq!(rig.journal.entries(), vec!["get_all_taps"]);

        let ev = events.recv().await.expect("event");
        assert_eq!(ev.kind, EventKind::Configured);
        assert_eq!(ev.count, Some(3));
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_core_unconfigured() {
        let rig = rig(Some("http://kegbot.local/api/"));
        rig.api.set_taps(Err(ApiError::Request {
            reason: "503".into(),
        }));
        let mut events = rig.bus.subscribe();

        let err = rig.bootstrap.configure().await.expect_err("must fail");

        assert_eq!(err.as_label(), "task_bootstrap");
        assert!(rig.taps.taps().is_empty());
        assert!(rig.store.is_empty());
        let ev = events.recv().await.expect("event");
        assert_eq!(ev.kind, EventKind::ConfigureFailed);
    }

    #[tokio::test]
    async fn test_missing_url_skips_fetch() {
        let rig = rig(None);

        let err = rig.bootstrap.configure().await.expect_err("must fail");

        assert!(matches!(
            err,
            TaskError::Bootstrap {
                source: ApiError::NotConfigured { .. }
            }
        ));
        assert!(rig.journal.entries().is_empty());
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Deep-link forwarding.
//
// Every URL the OS hands the app is forwarded to the link collaborator exactly
// once, in delivery order. Nothing is parsed, deduplicated or invented here.
//
// Ordering: the forwarder starts closed. Events delivered before the launch
// parameters are captured queue up; `capture_launch` puts the cold-start URL
// (if any) at the head of the queue, opens the gate and drains. A cold-start
// link is therefore always forwarded first, and never dropped. A later launch
// in the same process (activity recreated) queues its URL behind whatever was
// already delivered.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use nativechannel_core::{DeepLinkEvent, LinkSource};

use crate::traits::LinkHandler;

/// A continued user activity (universal / app link).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserActivity {
    /// Only browsing-web activities carry a URL.
    pub webpage_url: Option<String>,
}

impl UserActivity {
    pub fn browsing(url: impl Into<String>) -> Self {
        Self {
            webpage_url: Some(url.into()),
        }
    }
}

/// Launch parameters seen at cold start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchContext {
    /// Launch-options URL (iOS) or launch intent data (Android).
    pub url: Option<String>,
    /// Launch-options user activity (iOS universal link cold start).
    pub user_activity: Option<UserActivity>,
}

impl LaunchContext {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            user_activity: None,
        }
    }

    fn urls(&self) -> impl Iterator<Item = &str> {
        self.url
            .as_deref()
            .into_iter()
            .chain(self.user_activity.iter().filter_map(|a| a.webpage_url.as_deref()))
    }
}

/// URL contexts and activities attached to a scene connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneConnectionOptions {
    pub url_contexts: Vec<String>,
    pub user_activities: Vec<UserActivity>,
}

#[derive(Debug, Default)]
struct ForwarderState {
    launch_captured: bool,
    draining: bool,
    pending: VecDeque<DeepLinkEvent>,
    forwarded: u64,
}

/// Forwards OS link deliveries to a [`LinkHandler`].
pub struct DeepLinkForwarder {
    handler: Arc<dyn LinkHandler>,
    state: Mutex<ForwarderState>,
}

impl DeepLinkForwarder {
    pub fn new(handler: Arc<dyn LinkHandler>) -> Self {
        Self {
            handler,
            state: Mutex::new(ForwarderState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ForwarderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check launch parameters and forward their URLs. Returns how many
    /// launch URLs were found.
    ///
    /// The first call opens the gate with its URLs ahead of anything queued.
    /// Later calls come from a relaunch and are ordered like any delivery.
    pub fn capture_launch(&self, launch: &LaunchContext) -> usize {
        let found = {
            let mut state = self.state();
            let launch_events: Vec<_> = launch
                .urls()
                .map(|url| DeepLinkEvent::new(url, LinkSource::LaunchOptions))
                .collect();
            let found = launch_events.len();
            if state.launch_captured {
                state.pending.extend(launch_events);
                tracing::debug!(launch_urls = found, "relaunch parameters captured");
            } else {
                for event in launch_events.into_iter().rev() {
                    state.pending.push_front(event);
                }
                state.launch_captured = true;
                tracing::debug!(launch_urls = found, queued = state.pending.len(), "launch parameters captured");
            }
            found
        };
        self.drain();
        found
    }

    /// Forward one event, or queue it until the launch parameters are captured.
    pub fn deliver(&self, event: DeepLinkEvent) {
        self.state().pending.push_back(event);
        self.drain();
    }

    pub fn open_url(&self, url: &str) {
        self.deliver(DeepLinkEvent::new(url, LinkSource::OpenUrl));
    }

    pub fn continue_user_activity(&self, activity: &UserActivity) {
        self.deliver_activity(activity, LinkSource::UserActivity);
    }

    pub fn scene_will_connect(&self, options: &SceneConnectionOptions) {
        for url in &options.url_contexts {
            self.deliver(DeepLinkEvent::new(url.as_str(), LinkSource::SceneConnection));
        }
        for activity in &options.user_activities {
            self.deliver_activity(activity, LinkSource::SceneConnection);
        }
    }

    pub fn scene_open_urls(&self, urls: &[String]) {
        for url in urls {
            self.deliver(DeepLinkEvent::new(url.as_str(), LinkSource::SceneOpenUrl));
        }
    }

    pub fn scene_continue(&self, activity: &UserActivity) {
        self.deliver_activity(activity, LinkSource::SceneUserActivity);
    }

    /// Total forwarded so far.
    pub fn forwarded(&self) -> u64 {
        self.state().forwarded
    }

    /// Events waiting for the launch parameters.
    pub fn pending(&self) -> usize {
        self.state().pending.len()
    }

    fn deliver_activity(&self, activity: &UserActivity, source: LinkSource) {
        match &activity.webpage_url {
            Some(url) => self.deliver(DeepLinkEvent::new(url.as_str(), source)),
            None => tracing::debug!(?source, "user activity without a webpage URL ignored"),
        }
    }

    /// Forward queued events one at a time, outside the lock. A handler that
    /// triggers another delivery appends to the queue and this loop picks it
    /// up, so order holds even under re-entry.
    fn drain(&self) {
        {
            let mut state = self.state();
            if !state.launch_captured || state.draining {
                return;
            }
            state.draining = true;
        }

        loop {
            let next = {
                let mut state = self.state();
                match state.pending.pop_front() {
                    Some(event) => {
                        state.forwarded += 1;
                        event
                    }
                    None => {
                        state.draining = false;
                        return;
                    }
                }
            };
            tracing::debug!(source = ?next.source, url = %next.url, "forwarding deep link");
            self.handler.handle_link(&next.url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl LinkHandler for Recorder {
        fn handle_link(&self, url: &str) {
            self.0.lock().unwrap().push(url.to_owned());
        }
    }

    fn forwarder() -> (Arc<Recorder>, DeepLinkForwarder) {
        let recorder = Arc::new(Recorder::default());
        let forwarder = DeepLinkForwarder::new(recorder.clone());
        (recorder, forwarder)
    }

    #[test]
    fn cold_start_url_is_forwarded_once() {
        let (recorder, links) = forwarder();
        assert_eq!(links.capture_launch(&LaunchContext::with_url("myapp://open/42")), 1);
        assert_eq!(*recorder.0.lock().unwrap(), vec!["myapp://open/42"]);
        assert_eq!(links.forwarded(), 1);
    }

    #[test]
    fn early_events_wait_for_launch_url() {
        let (recorder, links) = forwarder();
        links.open_url("myapp://early");
        assert_eq!(links.pending(), 1);
        assert!(recorder.0.lock().unwrap().is_empty());

        links.capture_launch(&LaunchContext::with_url("myapp://launch"));
        links.open_url("myapp://late");
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec!["myapp://launch", "myapp://early", "myapp://late"]
        );
        assert_eq!(links.pending(), 0);
    }

    #[test]
    fn every_source_is_forwarded_in_order() {
        let (recorder, links) = forwarder();
        links.capture_launch(&LaunchContext {
            url: Some("a://launch".into()),
            user_activity: Some(UserActivity::browsing("https://x.test/launch")),
        });
        links.scene_will_connect(&SceneConnectionOptions {
            url_contexts: vec!["a://scene1".into(), "a://scene2".into()],
            user_activities: vec![UserActivity::default(), UserActivity::browsing("https://x.test/s")],
        });
        links.scene_open_urls(&["a://open".to_owned()]);
        links.scene_continue(&UserActivity::browsing("https://x.test/c"));
        links.continue_user_activity(&UserActivity::browsing("https://x.test/u"));
        links.open_url("a://open");

        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![
                "a://launch",
                "https://x.test/launch",
                "a://scene1",
                "a://scene2",
                "https://x.test/s",
                "a://open",
                "https://x.test/c",
                "https://x.test/u",
                "a://open",
            ]
        );
        assert_eq!(links.forwarded(), 9);
    }

    #[test]
    fn relaunch_url_follows_earlier_deliveries() {
        let (recorder, links) = forwarder();
        links.capture_launch(&LaunchContext::with_url("a://first-launch"));
        links.open_url("a://runtime");
        assert_eq!(links.capture_launch(&LaunchContext::with_url("a://relaunch")), 1);
        assert_eq!(links.capture_launch(&LaunchContext::default()), 0);
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec!["a://first-launch", "a://runtime", "a://relaunch"]
        );
        assert_eq!(links.forwarded(), 3);
    }

    struct Reentrant {
        forwarder: Mutex<Option<Arc<DeepLinkForwarder>>>,
        seen: Mutex<Vec<String>>,
    }

    impl LinkHandler for Reentrant {
        fn handle_link(&self, url: &str) {
            self.seen.lock().unwrap().push(url.to_owned());
            if url == "a://first" {
                let forwarder = self.forwarder.lock().unwrap().clone();
                if let Some(f) = forwarder {
                    f.open_url("a://nested");
                }
            }
        }
    }

    #[test]
    fn reentrant_delivery_keeps_order() {
        let handler = Arc::new(Reentrant {
            forwarder: Mutex::new(None),
            seen: Mutex::new(Vec::new()),
        });
        let links = Arc::new(DeepLinkForwarder::new(handler.clone()));
        *handler.forwarder.lock().unwrap() = Some(links.clone());

        links.open_url("a://first");
        links.open_url("a://second");
        links.capture_launch(&LaunchContext::default());

        assert_eq!(
            *handler.seen.lock().unwrap(),
            vec!["a://first", "a://second", "a://nested"]
        );
        *handler.forwarder.lock().unwrap() = None;
    }
}

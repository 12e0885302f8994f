// SPDX-License-Identifier: GPL-3.0-only

//! Opening decoded URLs in the browser
//!
//! Only text with a literal `http://` or `https://` prefix is dispatched.
//! Launch failures are returned to the caller, which reports them and
//! keeps scanning.

use crate::constants::{WEB_URL_PREFIXES, timing};
use crate::errors::{ScannerError, ScannerResult};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Hands URLs to something that can open them
pub trait UrlOpener {
    fn open(&mut self, url: &str) -> std::io::Result<()>;
}

/// The host's default browser
#[derive(Debug, Default)]
pub struct SystemBrowser;

impl UrlOpener for SystemBrowser {
    fn open(&mut self, url: &str) -> std::io::Result<()> {
        open::that_detached(url)
    }
}

/// Whether `text` starts with one of the web URL prefixes
///
/// Case-sensitive and untrimmed, so `"httpx://evil"` and `" https://a"`
/// are not URLs.
pub fn is_web_url(text: &str) -> bool {
    WEB_URL_PREFIXES.iter().any(|prefix| text.starts_with(prefix))
}

/// What happened to a piece of decoded text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Not a web URL
    NotUrl,
    /// Dispatch is switched off
    Disabled,
    /// Same URL was opened within the cooldown window
    Suppressed,
    /// Handed to the opener
    Opened,
}

/// Opens web URLs, at most once per cooldown window per URL
pub struct UrlDispatcher {
    opener: Option<Box<dyn UrlOpener>>,
    cooldown: Duration,
    last_opened: Option<(String, Instant)>,
}

impl UrlDispatcher {
    pub fn new(opener: Box<dyn UrlOpener>) -> Self {
        Self {
            opener: Some(opener),
            cooldown: timing::DISPATCH_COOLDOWN,
            last_opened: None,
        }
    }

    /// A dispatcher that never opens anything
    pub fn disabled() -> Self {
        Self {
            opener: None,
            cooldown: timing::DISPATCH_COOLDOWN,
            last_opened: None,
        }
    }

    /// Window in which an identical URL is not re-opened
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Open `text` if it is a web URL
    pub fn dispatch(&mut self, text: &str) -> ScannerResult<Dispatch> {
        self.dispatch_at(text, Instant::now())
    }

    fn dispatch_at(&mut self, text: &str, now: Instant) -> ScannerResult<Dispatch> {
        if !is_web_url(text) {
            return Ok(Dispatch::NotUrl);
        }

        let Some(opener) = self.opener.as_mut() else {
            return Ok(Dispatch::Disabled);
        };

        if let Some((last_url, opened_at)) = &self.last_opened
            && last_url == text
            && now.saturating_duration_since(*opened_at) < self.cooldown
        {
            debug!(url = %text, "URL opened recently, not reopening");
            return Ok(Dispatch::Suppressed);
        }

        // Record the attempt even when it fails so a broken handler is not
        // retried on every frame.
        self.last_opened = Some((text.to_string(), now));

        opener
            .open(text)
            .map_err(|e| ScannerError::BrowserLaunchFailure(e.to_string()))?;

        info!(url = %text, "Opened URL");
        Ok(Dispatch::Opened)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct Recorder {
        urls: Rc<RefCell<Vec<String>>>,
        fail: bool,
    }

    impl UrlOpener for Recorder {
        fn open(&mut self, url: &str) -> std::io::Result<()> {
            self.urls.borrow_mut().push(url.to_string());
            if self.fail {
                Err(std::io::Error::other("no browser"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_prefix_match() {
        assert!(is_web_url("http://example.com"));
        assert!(is_web_url("https://example.com/path?q=1"));
        assert!(!is_web_url("httpx://evil"));
        assert!(!is_web_url("HTTPS://EXAMPLE.COM"));
        assert!(!is_web_url(" https://example.com"));
        assert!(!is_web_url("ftp://example.com"));
        assert!(!is_web_url("example.com"));
        assert!(!is_web_url(""));
    }

    #[test]
    fn test_opens_exact_url() {
        let recorder = Recorder::default();
        let mut dispatcher = UrlDispatcher::new(Box::new(recorder.clone()));

        assert_eq!(dispatcher.dispatch("https://example.com").unwrap(), Dispatch::Opened);
        assert_eq!(*recorder.urls.borrow(), vec!["https://example.com".to_string()]);
    }

    #[test]
    fn test_non_url_is_not_opened() {
        let recorder = Recorder::default();
        let mut dispatcher = UrlDispatcher::new(Box::new(recorder.clone()));

        assert_eq!(dispatcher.dispatch("httpx://evil").unwrap(), Dispatch::NotUrl);
        assert_eq!(dispatcher.dispatch("WIFI:S:net;;").unwrap(), Dispatch::NotUrl);
        assert!(recorder.urls.borrow().is_empty());
    }

    #[test]
    fn test_repeat_within_cooldown_is_suppressed() {
        let recorder = Recorder::default();
        let mut dispatcher =
            UrlDispatcher::new(Box::new(recorder.clone())).with_cooldown(Duration::from_secs(5));
        let start = Instant::now();

        assert_eq!(dispatcher.dispatch_at("https://a.test", start).unwrap(), Dispatch::Opened);
        assert_eq!(
            dispatcher
                .dispatch_at("https://a.test", start + Duration::from_secs(1))
                .unwrap(),
            Dispatch::Suppressed
        );
        assert_eq!(
            dispatcher
                .dispatch_at("https://a.test", start + Duration::from_secs(6))
                .unwrap(),
            Dispatch::Opened
        );
        assert_eq!(recorder.urls.borrow().len(), 2);
    }

    #[test]
    fn test_different_url_is_opened_immediately() {
        let recorder = Recorder::default();
        let mut dispatcher = UrlDispatcher::new(Box::new(recorder.clone()));
        let start = Instant::now();

        dispatcher.dispatch_at("https://a.test", start).unwrap();
        assert_eq!(
            dispatcher.dispatch_at("http://b.test", start).unwrap(),
            Dispatch::Opened
        );
        assert_eq!(recorder.urls.borrow().len(), 2);
    }

    #[test]
    fn test_launch_failure_is_reported() {
        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let mut dispatcher = UrlDispatcher::new(Box::new(recorder));

        let err = dispatcher.dispatch("https://example.com").unwrap_err();
        assert_eq!(err, ScannerError::BrowserLaunchFailure("no browser".into()));
    }

    #[test]
    fn test_disabled_never_opens() {
        let mut dispatcher = UrlDispatcher::disabled();
        assert_eq!(dispatcher.dispatch("https://example.com").unwrap(), Dispatch::Disabled);
        assert_eq!(dispatcher.dispatch("plain").unwrap(), Dispatch::NotUrl);
    }
}

/// Clipboard-relay scraping: click each response's native copy control and read
/// the clipboard back.
///
/// Host content is rendered in a way that defeats reading text straight out
/// of the DOM, so the host's own copy action is used as the extraction path.
/// The system clipboard is overwritten as a side effect.
use std::time::Duration;

use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlElement;

use crate::adapter::SiteAdapter;
use crate::config::{as_timer_millis, ExporterConfig};
use crate::error::HoarderError;
use crate::route::conversation_title;

/// The copy → wait → read cycle for one control
#[allow(async_fn_in_trait)]
pub trait ClipboardRelay<C> {
    /// Trigger the control's copy action
    fn activate(&self, control: &C) -> Result<(), HoarderError>;

    /// Give the asynchronous clipboard write time to land
    async fn settle(&self, delay: Duration);

    async fn read_text(&self) -> Result<String, HoarderError>;
}

pub struct Scraper<A, R> {
    adapter: A,
    relay: R,
    settle_delay: Duration,
    title_suffix: String,
}

impl<A, R> Scraper<A, R>
where
    A: SiteAdapter,
    R: ClipboardRelay<A::Control>,
{
    pub fn new(adapter: A, relay: R, config: &ExporterConfig) -> Self {
        Scraper {
            adapter,
            relay,
            settle_delay: config.settle_delay,
            title_suffix: config.title_suffix.clone(),
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Collect `[title, response_1, response_2, ...]`.
    ///
    /// Containers are processed one at a time. A container whose copy control
    /// is missing or whose clipboard read fails is left out; it never aborts
    /// the scrape.
    pub async fn scrape(&self) -> Result<Vec<String>, HoarderError> {
        let document_title = self.adapter.document_title().ok_or(HoarderError::MissingTitle)?;
        let title = conversation_title(&document_title, &self.title_suffix);

        let containers = self.adapter.wait_for_response_containers().await?;
        if containers.is_empty() {
            return Err(HoarderError::NoContainers);
        }

        let mut collected = vec![title];
        for (index, container) in containers.iter().enumerate() {
            let Some(control) = self.adapter.find_copy_control(container) else {
                log::debug!("No copy control in container {}", index + 1);
                continue;
            };

            if let Err(e) = self.relay.activate(&control) {
                log::warn!("Copy action failed in container {}: {}", index + 1, e);
                continue;
            }
            self.relay.settle(self.settle_delay).await;

            match self.relay.read_text().await {
                Ok(text) => collected.push(text),
                Err(e) => log::warn!("Clipboard read error in container {}: {}", index + 1, e),
            }
        }

        Ok(collected)
    }
}

/// Relay over the real page: synthetic click plus `navigator.clipboard`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClipboard;

impl ClipboardRelay<HtmlElement> for BrowserClipboard {
    fn activate(&self, control: &HtmlElement) -> Result<(), HoarderError> {
        control.click();
        Ok(())
    }

    async fn settle(&self, delay: Duration) {
        if let Err(e) = sleep(delay).await {
            log::warn!("Settle delay interrupted: {}", e);
        }
    }

    async fn read_text(&self) -> Result<String, HoarderError> {
        let window = web_sys::window().ok_or_else(|| HoarderError::Browser("no window".to_string()))?;
        let text = JsFuture::from(window.navigator().clipboard().read_text())
            .await
            .map_err(|e| HoarderError::Clipboard(crate::error::js_error_message(&e)))?;

        text.as_string()
            .ok_or_else(|| HoarderError::Clipboard("clipboard did not return text".to_string()))
    }
}

/// Resolve after `duration` using `setTimeout`
pub async fn sleep(duration: Duration) -> Result<(), HoarderError> {
    let window = web_sys::window().ok_or_else(|| HoarderError::Browser("no window".to_string()))?;

    let mut scheduled = Ok(0);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        scheduled = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, as_timer_millis(duration));
    });
    scheduled.map_err(|e| HoarderError::browser(&e))?;

    JsFuture::from(promise)
        .await
        .map(|_| ())
        .map_err(|e| HoarderError::browser(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::RefCell;

    /// A container is its text, `None` when it has no copy control
    struct FakeAdapter {
        title: Option<String>,
        containers: Vec<Option<String>>,
    }

    impl SiteAdapter for FakeAdapter {
        type Anchor = ();
        type Container = Option<String>;
        type Control = String;

        fn document_title(&self) -> Option<String> {
            self.title.clone()
        }

        fn find_export_anchor(&self) -> Option<()> {
            Some(())
        }

        fn find_response_containers(&self) -> Vec<Option<String>> {
            self.containers.clone()
        }

        fn find_copy_control(&self, container: &Option<String>) -> Option<String> {
            container.clone()
        }

        async fn wait_for_export_anchor(&self) -> Result<(), HoarderError> {
            Ok(())
        }

        async fn wait_for_response_containers(&self) -> Result<Vec<Option<String>>, HoarderError> {
            Ok(self.find_response_containers())
        }
    }

    /// Clipboard that fails reads for controls in `failing`
    #[derive(Default)]
    struct FakeClipboard {
        clipboard: RefCell<String>,
        failing: Vec<String>,
        events: RefCell<Vec<String>>,
    }

    impl ClipboardRelay<String> for FakeClipboard {
        fn activate(&self, control: &String) -> Result<(), HoarderError> {
            self.events.borrow_mut().push(format!("click:{}", control));
            *self.clipboard.borrow_mut() = control.clone();
            Ok(())
        }

        async fn settle(&self, delay: Duration) {
            self.events.borrow_mut().push(format!("wait:{}", delay.as_millis()));
        }

        async fn read_text(&self) -> Result<String, HoarderError> {
            let text = self.clipboard.borrow().clone();
            self.events.borrow_mut().push(format!("read:{}", text));
            if self.failing.contains(&text) {
                Err(HoarderError::Clipboard("denied".to_string()))
            } else {
                Ok(text)
            }
        }
    }

    fn create_test_adapter(containers: &[Option<&str>]) -> FakeAdapter {
        FakeAdapter {
            title: Some("Bash scripting - Grok".to_string()),
            containers: containers.iter().map(|c| c.map(str::to_string)).collect(),
        }
    }

    #[test]
    fn test_scrape_collects_title_and_responses() {
        let adapter = create_test_adapter(&[Some("question"), Some("answer")]);
        let scraper = Scraper::new(adapter, FakeClipboard::default(), &ExporterConfig::default());

        let collected = block_on(scraper.scrape()).unwrap();

        assert_eq!(collected, vec!["Bash scripting", "question", "answer"]);
    }

    #[test]
    fn test_scrape_is_strictly_sequential() {
        let adapter = create_test_adapter(&[Some("a"), Some("b")]);
        let scraper = Scraper::new(adapter, FakeClipboard::default(), &ExporterConfig::default());

        block_on(scraper.scrape()).unwrap();

        assert_eq!(
            *scraper.relay.events.borrow(),
            vec!["click:a", "wait:500", "read:a", "click:b", "wait:500", "read:b"]
        );
    }

    #[test]
    fn test_failed_read_is_skipped() {
        let adapter = create_test_adapter(&[Some("one"), Some("two"), Some("three"), Some("four")]);
        let relay = FakeClipboard {
            failing: vec!["two".to_string()],
            ..FakeClipboard::default()
        };
        let scraper = Scraper::new(adapter, relay, &ExporterConfig::default());

        let collected = block_on(scraper.scrape()).unwrap();

        assert_eq!(collected.len(), 1 + 3);
        assert_eq!(collected, vec!["Bash scripting", "one", "three", "four"]);
    }

    #[test]
    fn test_container_without_control_is_skipped() {
        let adapter = create_test_adapter(&[None, Some("only")]);
        let scraper = Scraper::new(adapter, FakeClipboard::default(), &ExporterConfig::default());

        let collected = block_on(scraper.scrape()).unwrap();

        assert_eq!(collected, vec!["Bash scripting", "only"]);
    }

    #[test]
    fn test_all_reads_failing_returns_title_only() {
        let adapter = create_test_adapter(&[Some("x")]);
        let relay = FakeClipboard {
            failing: vec!["x".to_string()],
            ..FakeClipboard::default()
        };
        let scraper = Scraper::new(adapter, relay, &ExporterConfig::default());

        let collected = block_on(scraper.scrape()).unwrap();

        assert_eq!(collected, vec!["Bash scripting"]);
    }

    #[test]
    fn test_missing_title_fails() {
        let mut adapter = create_test_adapter(&[Some("x")]);
        adapter.title = None;
        let scraper = Scraper::new(adapter, FakeClipboard::default(), &ExporterConfig::default());

        assert_eq!(block_on(scraper.scrape()), Err(HoarderError::MissingTitle));
    }

    #[test]
    fn test_empty_title_is_still_exported() {
        let mut adapter = create_test_adapter(&[Some("question"), Some("answer")]);
        adapter.title = Some(String::new());
        let scraper = Scraper::new(adapter, FakeClipboard::default(), &ExporterConfig::default());

        let collected = block_on(scraper.scrape()).unwrap();

        assert_eq!(collected, vec!["", "question", "answer"]);
        assert_eq!(scraper.relay.events.borrow().len(), 6);
    }

    #[test]
    fn test_no_containers_fails() {
        let adapter = create_test_adapter(&[]);
        let scraper = Scraper::new(adapter, FakeClipboard::default(), &ExporterConfig::default());

        assert_eq!(block_on(scraper.scrape()), Err(HoarderError::NoContainers));
    }

    #[test]
    fn test_settle_delay_is_configurable() {
        let adapter = create_test_adapter(&[Some("a")]);
        let config = ExporterConfig {
            settle_delay: Duration::from_millis(1200),
            ..ExporterConfig::default()
        };
        let scraper = Scraper::new(adapter, FakeClipboard::default(), &config);

        block_on(scraper.scrape()).unwrap();

        assert!(scraper.relay.events.borrow().contains(&"wait:1200".to_string()));
    }
}

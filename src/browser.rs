use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use headless_chrome::{Browser, LaunchOptions, Tab};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Remote-control surface the navigation controller needs from a browser.
/// Selectors are CSS selectors.
pub trait ScheduleBrowser {
    fn open(&mut self, url: &str) -> Result<()>;

    /// Blocks until an element matching `selector` is present on the
    /// (possibly re-rendered) page, failing with `Error::NavigationTimeout`.
    fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    /// Tags the current document so [`ScheduleBrowser::wait_for_postback`] can
    /// tell it apart from the page the next action renders.
    fn mark_page(&mut self) -> Result<()>;

    /// Blocks until the page tagged by `mark_page` has been replaced and an
    /// element matching `selector` is present, failing with `Error::NavigationTimeout`.
    fn wait_for_postback(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    fn click(&mut self, selector: &str) -> Result<()>;

    /// Picks the option with the given value in a `<select>` and fires its change event.
    fn select_option(&mut self, selector: &str, value: &str) -> Result<()>;

    /// Clears an input and types `text` into it.
    fn fill(&mut self, selector: &str, text: &str) -> Result<()>;

    /// Rendered text of every matching element, in document order.
    fn texts(&mut self, selector: &str) -> Result<Vec<String>>;

    /// The named attribute of every matching element, in document order.
    fn attribute_values(&mut self, selector: &str, name: &str) -> Result<Vec<Option<String>>>;

    /// Inner markup of every matching element, in document order.
    fn inner_htmls(&mut self, selector: &str) -> Result<Vec<String>>;

    /// Releases the underlying session. Must be safe to call more than once.
    fn release(&mut self);

    /// The named attribute of the first matching element, `None` if there is
    /// no such element or it lacks the attribute.
    fn attribute(&mut self, selector: &str, name: &str) -> Result<Option<String>> {
        Ok(self
            .attribute_values(selector, name)?
            .into_iter()
            .next()
            .flatten())
    }
}

/// Configuration for the Chrome instance
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,

    /// Browser window size
    pub window_size: (u32, u32),
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1920, 1080),
        }
    }
}

/// `ScheduleBrowser` backed by a local Chrome/Chromium through `headless_chrome`.
pub struct ChromeBrowser {
    browser: Option<Browser>,
    tab: Arc<Tab>,
}

impl ChromeBrowser {
    pub fn launch(config: &BrowserConfig) -> Result<Self> {
        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some(config.window_size))
            .build()
            .map_err(|e| Error::Browser(format!("invalid launch options: {e}")))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::Browser(format!("failed to start Chrome: {e}")))?;
        let tab = browser
            .new_tab()
            .map_err(|e| Error::Browser(format!("failed to open a tab: {e}")))?;

        Ok(Self {
            browser: Some(browser),
            tab,
        })
    }

    /// Evaluates `expression` in the page and decodes its JSON-serialized result.
    fn evaluate_json<T: DeserializeOwned>(&self, expression: &str) -> Result<T> {
        let script = format!("JSON.stringify({expression})");
        let result = self
            .tab
            .evaluate(&script, false)
            .map_err(|e| Error::Browser(format!("script failed: {e}")))?;
        let json = result
            .value
            .and_then(|v| v.as_str().map(|s| s.to_string()))
            .ok_or_else(|| Error::Browser("script returned no value".to_string()))?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Attribute set on `<html>` by `mark_page`; a postback renders a fresh document without it.
const STALE_PAGE_MARK: &str = "data-schedule-stale";

/// Renders `s` as a JavaScript string literal.
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

impl ScheduleBrowser for ChromeBrowser {
    fn open(&mut self, url: &str) -> Result<()> {
        debug!("Browser navigating to: {}", url);
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| Error::Browser(format!("failed to load {url}: {e}")))?;
        Ok(())
    }

    fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        // A postback may still be in flight from the previous action.
        self.tab.set_default_timeout(timeout);
        self.tab
            .wait_until_navigated()
            .map_err(|_| Error::NavigationTimeout {
                selector: selector.to_string(),
                timeout,
            })?;
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map(|_| ())
            .map_err(|_| Error::NavigationTimeout {
                selector: selector.to_string(),
                timeout,
            })
    }

    fn mark_page(&mut self) -> Result<()> {
        self.evaluate_json::<bool>(&format!(
            "(document.documentElement.setAttribute({}, '1'), true)",
            js_string(STALE_PAGE_MARK)
        ))?;
        Ok(())
    }

    fn wait_for_postback(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        let script = format!(
            "!document.documentElement.hasAttribute({}) && document.querySelector({}) !== null",
            js_string(STALE_PAGE_MARK),
            js_string(selector)
        );
        let start = Instant::now();

        loop {
            if start.elapsed() > timeout {
                return Err(Error::NavigationTimeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }

            // Evaluation fails while the old document is being torn down.
            if let Ok(true) = self.evaluate_json::<bool>(&script) {
                return Ok(());
            }

            std::thread::sleep(Duration::from_millis(100));
        }
    }

    fn click(&mut self, selector: &str) -> Result<()> {
        self.tab
            .find_element(selector)
            .and_then(|element| element.click().map(|_| ()))
            .map_err(|e| Error::Browser(format!("click on {selector} failed: {e}")))
    }

    fn select_option(&mut self, selector: &str, value: &str) -> Result<()> {
        let expression = format!(
            r#"(() => {{
                const select = document.querySelector({selector});
                if (!select) return false;
                select.value = {value};
                select.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            selector = js_string(selector),
            value = js_string(value),
        );
        if self.evaluate_json::<bool>(&expression)? {
            Ok(())
        } else {
            Err(Error::Browser(format!("no select element matches {selector}")))
        }
    }

    fn fill(&mut self, selector: &str, text: &str) -> Result<()> {
        let element = self
            .tab
            .find_element(selector)
            .map_err(|e| Error::Browser(format!("no input matches {selector}: {e}")))?;
        element
            .call_js_fn("function() { this.value = ''; }", vec![], false)
            .and_then(|_| element.type_into(text).map(|_| ()))
            .map_err(|e| Error::Browser(format!("failed to fill {selector}: {e}")))
    }

    fn texts(&mut self, selector: &str) -> Result<Vec<String>> {
        self.evaluate_json(&format!(
            "Array.from(document.querySelectorAll({})).map(e => e.innerText)",
            js_string(selector)
        ))
    }

    fn attribute_values(&mut self, selector: &str, name: &str) -> Result<Vec<Option<String>>> {
        self.evaluate_json(&format!(
            "Array.from(document.querySelectorAll({})).map(e => e.getAttribute({}))",
            js_string(selector),
            js_string(name)
        ))
    }

    fn inner_htmls(&mut self, selector: &str) -> Result<Vec<String>> {
        self.evaluate_json(&format!(
            "Array.from(document.querySelectorAll({})).map(e => e.innerHTML)",
            js_string(selector)
        ))
    }

    fn release(&mut self) {
        let Some(browser) = self.browser.take() else {
            return;
        };
        if let Err(e) = self.tab.close(true) {
            warn!("Failed to close tab cleanly: {e}");
        }
        // Dropping the browser kills the Chrome process.
        drop(browser);
        info!("Browser released");
    }
}

impl Drop for ChromeBrowser {
    fn drop(&mut self) {
        self.release();
    }
}

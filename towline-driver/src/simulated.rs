//! Simulated driver
//!
//! Models the dispatch application's screens in memory with synthetic
//! latency, seeded jitter, and optional fault injection. Lets the full
//! harness run end-to-end without a browser, and anchors engine tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::Instant;
use tracing::trace;

use crate::dom;
use crate::error::{DriverError, DriverResult};
use crate::page::{Browser, Page};

/// Tuning for the simulated driver
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Base latency for navigations and element waits
    pub base_latency: Duration,
    /// Extra uniform jitter on top of the base latency
    pub latency_jitter: Duration,
    /// Probability in [0, 1] that any action fails with a session error
    pub failure_rate: f64,
    /// Rows rendered in the work-queue table
    pub queue_rows: usize,
    /// Leading rows whose status image is marked completed
    pub completed_rows: usize,
    /// Seed for deterministic jitter and fault injection
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            base_latency: Duration::from_millis(40),
            latency_jitter: Duration::from_millis(60),
            failure_rate: 0.0,
            queue_rows: 8,
            completed_rows: 3,
            seed: 0x70171e,
        }
    }
}

/// Simulated browser: hands out independent simulated pages
pub struct SimulatedBrowser {
    config: SimulationConfig,
    pages_opened: AtomicU64,
}

impl SimulatedBrowser {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            pages_opened: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl Browser for SimulatedBrowser {
    async fn new_page(&self) -> DriverResult<Box<dyn Page>> {
        let index = self.pages_opened.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(SimulatedPage::new(self.config.clone(), index)))
    }
}

/// The screen currently rendered by a simulated page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    SignIn,
    Home,
    Queue,
    Detail,
}

impl View {
    fn heading(self) -> &'static str {
        match self {
            View::SignIn => dom::HEADING_SIGN_IN,
            View::Home => dom::HEADING_HOME,
            View::Queue => dom::HEADING_QUEUE,
            View::Detail => dom::HEADING_DETAIL,
        }
    }
}

#[derive(Debug)]
struct PageState {
    view: View,
    signed_in: bool,
    pending_view: Option<View>,
    /// Selectors scheduled to become visible, with their ready instants
    appearing: HashMap<&'static str, Instant>,
    resource_id: Option<u64>,
    dispatched: bool,
    closed: bool,
}

/// One simulated page session
pub struct SimulatedPage {
    config: SimulationConfig,
    state: Mutex<PageState>,
    rng: Mutex<StdRng>,
}

impl SimulatedPage {
    fn new(config: SimulationConfig, index: u64) -> Self {
        let seed = config.seed.wrapping_add(index);
        Self {
            config,
            state: Mutex::new(PageState {
                view: View::SignIn,
                signed_in: false,
                pending_view: None,
                appearing: HashMap::new(),
                resource_id: None,
                dispatched: false,
                closed: false,
            }),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn latency(&self) -> Duration {
        let jitter_ms = self.config.latency_jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.config.base_latency;
        }
        let mut rng = self.rng.lock().expect("rng lock poisoned");
        self.config.base_latency + Duration::from_millis(rng.random_range(0..jitter_ms))
    }

    fn inject_fault(&self, operation: &str) -> DriverResult<()> {
        let rate = self.config.failure_rate.clamp(0.0, 1.0);
        if rate > 0.0 {
            let mut rng = self.rng.lock().expect("rng lock poisoned");
            if rng.random_bool(rate) {
                return Err(DriverError::Session(format!("injected fault during {}", operation)));
            }
        }
        Ok(())
    }

    fn ensure_open(&self) -> DriverResult<()> {
        let state = self.state.lock().expect("state lock poisoned");
        if state.closed {
            return Err(DriverError::Session("page is closed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Page for SimulatedPage {
    async fn goto(&self, url: &str) -> DriverResult<()> {
        self.ensure_open()?;
        self.inject_fault("goto")?;
        tokio::time::sleep(self.latency()).await;

        let mut state = self.state.lock().expect("state lock poisoned");
        state.view = if url.ends_with(dom::ROUTE_SIGN_IN) {
            View::SignIn
        } else if state.signed_in {
            View::Home
        } else {
            View::SignIn
        };
        state.pending_view = None;
        trace!(url, view = ?state.view, "simulated navigation");
        Ok(())
    }

    async fn click(&self, selector: &str) -> DriverResult<()> {
        self.ensure_open()?;
        self.inject_fault("click")?;
        let ready_at = Instant::now() + self.latency();

        let mut state = self.state.lock().expect("state lock poisoned");
        match selector {
            dom::SEL_SIGN_IN_BUTTON => {
                state.signed_in = true;
                state.pending_view = Some(View::Home);
            }
            dom::SEL_QUEUE_NAV_BUTTON => {
                state.pending_view = Some(View::Queue);
            }
            dom::SEL_TOP_QUEUE_ROW => {
                state.pending_view = Some(View::Detail);
            }
            dom::SEL_NEAREST_LOOKUP_BUTTON => {
                let id = self.rng.lock().expect("rng lock poisoned").random_range(1..=999);
                state.resource_id = Some(id);
                state.appearing.insert(dom::SEL_RESULT_DIALOG, ready_at);
            }
            dom::SEL_DISPATCH_BUTTON => {
                state.appearing.insert(dom::SEL_DISPATCH_SUCCESS, ready_at);
            }
            dom::SEL_SIGN_OUT_BUTTON => {
                state.signed_in = false;
                state.view = View::SignIn;
                state.appearing.insert(dom::SEL_SIGN_IN_BUTTON, ready_at);
            }
            other => return Err(DriverError::ElementNotFound(other.to_string())),
        }
        Ok(())
    }

    async fn type_text(&self, selector: &str, _text: &str) -> DriverResult<()> {
        self.ensure_open()?;
        self.inject_fault("type_text")?;
        match selector {
            dom::SEL_USERNAME_INPUT | dom::SEL_PASSWORD_INPUT => Ok(()),
            other => Err(DriverError::ElementNotFound(other.to_string())),
        }
    }

    async fn text_content(&self, selector: &str) -> DriverResult<String> {
        self.ensure_open()?;
        let state = self.state.lock().expect("state lock poisoned");
        match selector {
            dom::SEL_HEADING => Ok(state.view.heading().to_string()),
            dom::SEL_RESOURCE_ID => state
                .resource_id
                .map(|id| id.to_string())
                .ok_or_else(|| DriverError::ElementNotFound(selector.to_string())),
            dom::SEL_ORDER_STATUS => Ok(if state.dispatched {
                dom::STATUS_DISPATCHED.to_string()
            } else {
                "pending".to_string()
            }),
            other => Err(DriverError::ElementNotFound(other.to_string())),
        }
    }

    async fn inner_html(&self, selector: &str) -> DriverResult<String> {
        self.ensure_open()?;
        if selector != dom::SEL_QUEUE_TABLE {
            return Err(DriverError::ElementNotFound(selector.to_string()));
        }

        let mut html = String::from("<tbody>");
        for row in 0..self.config.queue_rows {
            let status = if row < self.config.completed_rows {
                format!("request {} {}", row, dom::COMPLETED_ALT_MARKER)
            } else {
                format!("request {} (pending)", row)
            };
            html.push_str(&format!(
                "<tr><td><img src=\"/status/{}.png\" alt=\"{}\"></td></tr>",
                row, status
            ));
        }
        html.push_str("</tbody>");
        Ok(html)
    }

    async fn wait_for_navigation(&self) -> DriverResult<()> {
        self.ensure_open()?;
        self.inject_fault("wait_for_navigation")?;
        tokio::time::sleep(self.latency()).await;

        let mut state = self.state.lock().expect("state lock poisoned");
        if let Some(view) = state.pending_view.take() {
            state.view = view;
        }
        Ok(())
    }

    async fn wait_for_visible(&self, selector: &str, timeout: Option<Duration>) -> DriverResult<()> {
        self.ensure_open()?;

        let ready_at = {
            let state = self.state.lock().expect("state lock poisoned");
            state.appearing.get(selector).copied()
        };

        let Some(ready_at) = ready_at else {
            // Nothing will ever make this selector appear
            return match timeout {
                Some(bound) => {
                    tokio::time::sleep(bound).await;
                    Err(DriverError::Timeout {
                        selector: selector.to_string(),
                        waited: bound,
                    })
                }
                None => Err(DriverError::ElementNotFound(selector.to_string())),
            };
        };

        let remaining = ready_at.saturating_duration_since(Instant::now());
        if let Some(bound) = timeout {
            if remaining > bound {
                tokio::time::sleep(bound).await;
                return Err(DriverError::Timeout {
                    selector: selector.to_string(),
                    waited: bound,
                });
            }
        }
        tokio::time::sleep(remaining).await;

        let mut state = self.state.lock().expect("state lock poisoned");
        state.appearing.remove(selector);
        if selector == dom::SEL_DISPATCH_SUCCESS {
            state.dispatched = true;
        }
        Ok(())
    }

    async fn close(&self) -> DriverResult<()> {
        let mut state = self.state.lock().expect("state lock poisoned");
        state.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> SimulationConfig {
        SimulationConfig {
            base_latency: Duration::from_millis(10),
            latency_jitter: Duration::ZERO,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_in_navigates_home() {
        let browser = SimulatedBrowser::new(quiet_config());
        let page = browser.new_page().await.unwrap();

        page.goto("http://localhost:3000/login").await.unwrap();
        assert_eq!(page.text_content(dom::SEL_HEADING).await.unwrap(), dom::HEADING_SIGN_IN);

        page.type_text(dom::SEL_USERNAME_INPUT, "dispatcher2_1").await.unwrap();
        page.type_text(dom::SEL_PASSWORD_INPUT, "password").await.unwrap();
        page.click(dom::SEL_SIGN_IN_BUTTON).await.unwrap();
        page.wait_for_navigation().await.unwrap();

        assert_eq!(page.text_content(dom::SEL_HEADING).await.unwrap(), dom::HEADING_HOME);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_dialog_appears_and_id_is_numeric() {
        let browser = SimulatedBrowser::new(quiet_config());
        let page = browser.new_page().await.unwrap();

        page.click(dom::SEL_NEAREST_LOOKUP_BUTTON).await.unwrap();
        page.wait_for_visible(dom::SEL_RESULT_DIALOG, Some(Duration::from_secs(5)))
            .await
            .unwrap();

        let id = page.text_content(dom::SEL_RESOURCE_ID).await.unwrap();
        assert!(id.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_wait_times_out() {
        let config = SimulationConfig {
            base_latency: Duration::from_secs(10),
            latency_jitter: Duration::ZERO,
            ..Default::default()
        };
        let browser = SimulatedBrowser::new(config);
        let page = browser.new_page().await.unwrap();

        page.click(dom::SEL_NEAREST_LOOKUP_BUTTON).await.unwrap();
        let err = page
            .wait_for_visible(dom::SEL_RESULT_DIALOG, Some(Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_status_transitions() {
        let browser = SimulatedBrowser::new(quiet_config());
        let page = browser.new_page().await.unwrap();

        assert_eq!(page.text_content(dom::SEL_ORDER_STATUS).await.unwrap(), "pending");

        page.click(dom::SEL_DISPATCH_BUTTON).await.unwrap();
        page.wait_for_visible(dom::SEL_DISPATCH_SUCCESS, None).await.unwrap();

        assert_eq!(
            page.text_content(dom::SEL_ORDER_STATUS).await.unwrap(),
            dom::STATUS_DISPATCHED
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_queue_markup_contains_completed_rows() {
        let browser = SimulatedBrowser::new(quiet_config());
        let page = browser.new_page().await.unwrap();

        let html = page.inner_html(dom::SEL_QUEUE_TABLE).await.unwrap();
        let completed = html.matches(dom::COMPLETED_ALT_MARKER).count();
        assert_eq!(completed, quiet_config().completed_rows);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fault_injection() {
        let config = SimulationConfig {
            failure_rate: 1.0,
            ..quiet_config()
        };
        let browser = SimulatedBrowser::new(config);
        let page = browser.new_page().await.unwrap();

        let err = page.goto("http://localhost:3000/login").await.unwrap_err();
        assert!(matches!(err, DriverError::Session(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_page_rejects_operations() {
        let browser = SimulatedBrowser::new(quiet_config());
        let page = browser.new_page().await.unwrap();

        page.close().await.unwrap();
        let err = page.goto("http://localhost:3000/").await.unwrap_err();
        assert!(matches!(err, DriverError::Session(_)));
    }
}

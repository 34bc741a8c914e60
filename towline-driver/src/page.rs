//! Browser and page trait contracts

use async_trait::async_trait;
use std::time::Duration;

use crate::error::DriverResult;

/// Factory for page sessions. One page is acquired per workflow iteration
/// and released exactly once when the iteration ends.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Open a fresh page session
    async fn new_page(&self) -> DriverResult<Box<dyn Page>>;
}

/// One exclusively-owned page session
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate to an absolute URL
    async fn goto(&self, url: &str) -> DriverResult<()>;

    /// Click the first element matching the selector
    async fn click(&self, selector: &str) -> DriverResult<()>;

    /// Type text into the first element matching the selector
    async fn type_text(&self, selector: &str, text: &str) -> DriverResult<()>;

    /// Text content of the first element matching the selector
    async fn text_content(&self, selector: &str) -> DriverResult<String>;

    /// Inner HTML of the first element matching the selector
    async fn inner_html(&self, selector: &str) -> DriverResult<String>;

    /// Wait for an in-flight navigation to complete
    async fn wait_for_navigation(&self) -> DriverResult<()>;

    /// Wait for an element to become visible. With a timeout, fails with
    /// [`crate::DriverError::Timeout`] once the bound elapses; without
    /// one, waits indefinitely (callers bound it by cancellation).
    async fn wait_for_visible(&self, selector: &str, timeout: Option<Duration>) -> DriverResult<()>;

    /// Release the page session
    async fn close(&self) -> DriverResult<()>;
}

//! UI contract of the dispatch application
//!
//! Selectors and expected texts shared by the workflow executor and the
//! simulated driver. The harness targets a single application, so these
//! are constants rather than configuration.

// Routes
pub const ROUTE_SIGN_IN: &str = "/login";
pub const ROUTE_ROOT: &str = "/";

// Selectors
pub const SEL_HEADING: &str = "h2";
pub const SEL_USERNAME_INPUT: &str = "#input-username";
pub const SEL_PASSWORD_INPUT: &str = "#input-password";
pub const SEL_SIGN_IN_BUTTON: &str = "#button-login";
pub const SEL_QUEUE_NAV_BUTTON: &str = "#button-requests-page";
pub const SEL_QUEUE_TABLE: &str = "#order-table";
pub const SEL_TOP_QUEUE_ROW: &str = "tbody tr:nth-child(1)";
pub const SEL_NEAREST_LOOKUP_BUTTON: &str = "#button-get-nearest";
pub const SEL_RESULT_DIALOG: &str = "div[role='dialog']";
pub const SEL_RESOURCE_ID: &str = "#tow-truck-id";
pub const SEL_DISPATCH_BUTTON: &str = "#button-order-dispatch";
pub const SEL_DISPATCH_SUCCESS: &str = "#dispatch-success-message";
pub const SEL_ORDER_STATUS: &str = "#order-status";
pub const SEL_SIGN_OUT_BUTTON: &str = "#button-logout";

// Expected texts
pub const HEADING_SIGN_IN: &str = "Sign In";
pub const HEADING_HOME: &str = "Tow Truck Dispatch";
pub const HEADING_QUEUE: &str = "Pending Requests";
pub const HEADING_DETAIL: &str = "Request Details";
pub const STATUS_DISPATCHED: &str = "dispatched";

/// Marker in a queue row's status-image alt text for completed requests
pub const COMPLETED_ALT_MARKER: &str = "(completed)";

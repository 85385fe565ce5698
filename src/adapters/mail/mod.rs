//! Mail adapter module. Implements MailGateway.
//!
//! Provides an HTTP mail API adapter and a mock adapter for runs without one.

pub mod http_adapter;
pub mod mock_adapter;

pub use http_adapter::HttpMailAdapter;
pub use mock_adapter::MockMailAdapter;

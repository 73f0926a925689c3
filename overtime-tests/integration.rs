//! Integration tests for Overtime
//!
//! These tests exercise the resolver, the playback session controller,
//! and the session host together, with mock capabilities standing in
//! for the media element, the adaptive engine, and the player UI.

#[path = "integration/mocks.rs"]
mod mocks;

#[path = "integration/session_lifecycle.rs"]
mod session_lifecycle;

#[path = "integration/resolver_properties.rs"]
mod resolver_properties;

#[path = "integration/host_flow.rs"]
mod host_flow;

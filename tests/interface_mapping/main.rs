//! Interface Mapping Test Suite
//!
//! End-to-end tests for mapping records onto object graphs whose members
//! are interface-typed, so every nested object has to come from a contract
//! resolver.
//!
//! ## Test Structure
//!
//! - **Reading**: the A -> B -> C -> D graph through nested references,
//!   through multi-level member paths and through auto-mapping
//! - **Resolver**: refused construction, injected versus process-wide
//!   resolvers, concurrent installs
//! - **Layout**: prefixes and max-index on the same graph
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test interface_mapping
//! ```

// Test utilities
mod test_utils;

mod layout_tests;
mod read_tests;
mod resolver_tests;

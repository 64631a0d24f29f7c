//! Commerce platform adapters.
//!
//! - `GraphqlCommerceClient` - production client over the GraphQL API
//! - `InMemoryCommerceClient` - recording client for tests

mod graphql_client;
mod in_memory;

pub use graphql_client::GraphqlCommerceClient;
pub use in_memory::{CommerceCall, InMemoryCommerceClient};

//! GraphQL commerce client.
//!
//! Implements `CommerceClient` against the commerce platform's GraphQL API.
//! Every request carries the access token header and is bounded by the
//! configured timeout.
//!
//! # Error Mapping
//!
//! | Condition                       | Error                         |
//! |---------------------------------|-------------------------------|
//! | request exceeded timeout        | `OutboundError::Timeout`      |
//! | connection / decode failure     | `OutboundError::Transport`    |
//! | non-2xx status                  | `OutboundError::Rejected`     |
//! | top-level `errors` or `userErrors` | `OutboundError::UserErrors` |
//!
//! List queries follow `pageInfo.endCursor` until `hasNextPage` is false.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::CommerceConfig;
use crate::domain::subscription::{
    Customer, MinorUnits, OrderSummary, SubscriptionStatus, UpcomingRenewal,
};
use crate::domain::webhook::{OutboundError, UserError};
use crate::ports::{CommerceClient, SubscriptionSnapshot};

const SERVICE: &str = "commerce";
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

const SCHEDULE_RETRY_MUTATION: &str = r#"
mutation schedulePaymentRetry($subscriptionId: ID!, $date: DateTime!) {
  subscriptionPaymentRetry(subscriptionId: $subscriptionId, retryDate: $date) {
    subscription { id status nextBillingDate }
    userErrors { field message }
  }
}"#;

const PAUSE_MUTATION: &str = r#"
mutation pauseSubscription($subscriptionId: ID!) {
  subscriptionPause(subscriptionId: $subscriptionId) {
    subscription { id status nextBillingDate }
    userErrors { field message }
  }
}"#;

const CANCEL_MUTATION: &str = r#"
mutation cancelSubscription($subscriptionId: ID!) {
  subscriptionCancel(subscriptionId: $subscriptionId) {
    subscription { id status nextBillingDate }
    userErrors { field message }
  }
}"#;

const ORDERS_QUERY: &str = r#"
query subscriptionOrders($subscriptionId: ID!, $after: String) {
  subscriptionContract(id: $subscriptionId) {
    orders(first: 250, after: $after) {
      edges { node { id createdAt totalPriceSet { shopMoney { amount } } } }
      pageInfo { hasNextPage endCursor }
    }
  }
}"#;

const UPCOMING_RENEWALS_QUERY: &str = r#"
query upcomingRenewals($query: String!, $after: String) {
  subscriptions(first: 100, after: $after, query: $query) {
    pageInfo { hasNextPage endCursor }
    edges {
      node {
        id
        nextBillingDate
        customer { id email firstName }
        lineItems(first: 1) { edges { node { title currentPrice { amount } } } }
      }
    }
  }
}"#;

/// Commerce platform client over GraphQL.
pub struct GraphqlCommerceClient {
    endpoint: String,
    access_token: SecretString,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl GraphqlCommerceClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `OutboundError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &CommerceConfig) -> Result<Self, OutboundError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let http_client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| OutboundError::transport(SERVICE, e.to_string()))?;

        Ok(Self {
            endpoint: config.graphql_endpoint(),
            access_token: config.access_token.clone(),
            http_client,
            timeout,
        })
    }

    /// Point the client at a different endpoint (for testing).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &str,
        variables: Value,
    ) -> Result<T, OutboundError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .header(ACCESS_TOKEN_HEADER, self.access_token.expose_secret())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(operation, status = status.as_u16(), "Commerce API rejected request");
            return Err(OutboundError::rejected(SERVICE, status.as_u16(), body));
        }

        let envelope: GraphqlResponse<T> =
            response.json().await.map_err(|e| self.request_error(e))?;

        if !envelope.errors.is_empty() {
            return Err(OutboundError::UserErrors {
                operation,
                errors: envelope
                    .errors
                    .into_iter()
                    .map(|e| UserError {
                        field: None,
                        message: e.message,
                    })
                    .collect(),
            });
        }

        envelope.data.ok_or_else(|| {
            OutboundError::transport(SERVICE, format!("{operation} returned no data"))
        })
    }

    async fn mutate(
        &self,
        operation: &'static str,
        query: &str,
        variables: Value,
    ) -> Result<SubscriptionSnapshot, OutboundError> {
        let mut data: HashMap<String, MutationPayload> =
            self.execute(operation, query, variables).await?;
        let payload = data.remove(operation).ok_or_else(|| {
            OutboundError::transport(SERVICE, format!("{operation} missing from response"))
        })?;
        payload.into_snapshot(operation)
    }

    fn request_error(&self, err: reqwest::Error) -> OutboundError {
        if err.is_timeout() {
            OutboundError::Timeout {
                service: SERVICE,
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            OutboundError::transport(SERVICE, err.to_string())
        }
    }
}

#[async_trait]
impl CommerceClient for GraphqlCommerceClient {
    async fn schedule_payment_retry(
        &self,
        subscription_id: &str,
        retry_date: DateTime<Utc>,
    ) -> Result<SubscriptionSnapshot, OutboundError> {
        self.mutate(
            "subscriptionPaymentRetry",
            SCHEDULE_RETRY_MUTATION,
            json!({ "subscriptionId": subscription_id, "date": retry_date.to_rfc3339() }),
        )
        .await
    }

    async fn pause_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<SubscriptionSnapshot, OutboundError> {
        self.mutate(
            "subscriptionPause",
            PAUSE_MUTATION,
            json!({ "subscriptionId": subscription_id }),
        )
        .await
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<SubscriptionSnapshot, OutboundError> {
        self.mutate(
            "subscriptionCancel",
            CANCEL_MUTATION,
            json!({ "subscriptionId": subscription_id }),
        )
        .await
    }

    async fn subscription_orders(
        &self,
        subscription_id: &str,
    ) -> Result<Vec<OrderSummary>, OutboundError> {
        let mut orders = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let data: OrdersData = self
                .execute(
                    "subscriptionOrders",
                    ORDERS_QUERY,
                    json!({ "subscriptionId": subscription_id, "after": after }),
                )
                .await?;
            let Some(contract) = data.subscription_contract else {
                break;
            };

            orders.extend(contract.orders.edges.into_iter().map(|edge| OrderSummary {
                id: edge.node.id,
                total_price: edge.node.total_price_set.shop_money.amount,
                created_at: edge.node.created_at,
            }));
            match contract.orders.page_info.next_cursor(after.as_deref()) {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }
        Ok(orders)
    }

    async fn upcoming_renewals(
        &self,
        within_days: u32,
    ) -> Result<Vec<UpcomingRenewal>, OutboundError> {
        let query = format!("next_billing_date:<={within_days}d");
        let mut renewals = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let data: RenewalsData = self
                .execute(
                    "upcomingRenewals",
                    UPCOMING_RENEWALS_QUERY,
                    json!({ "query": query, "after": after }),
                )
                .await?;

            renewals.extend(
                data.subscriptions
                    .edges
                    .into_iter()
                    .filter_map(|edge| edge.node.into_renewal()),
            );
            match data.subscriptions.page_info.next_cursor(after.as_deref()) {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }
        Ok(renewals)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Wire Types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Connection<T> {
    edges: Vec<Edge<T>>,
    #[serde(default)]
    page_info: PageInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    has_next_page: bool,
    #[serde(default)]
    end_cursor: Option<String>,
}

impl PageInfo {
    /// Cursor for the following page. `None` on the last page, or when the
    /// server hands back the cursor that was just requested.
    fn next_cursor(self, requested: Option<&str>) -> Option<String> {
        if !self.has_next_page {
            return None;
        }
        self.end_cursor
            .filter(|cursor| requested != Some(cursor.as_str()))
    }
}

#[derive(Debug, Deserialize)]
struct Edge<T> {
    node: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MutationPayload {
    subscription: Option<SubscriptionNode>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

impl MutationPayload {
    fn into_snapshot(self, operation: &'static str) -> Result<SubscriptionSnapshot, OutboundError> {
        if !self.user_errors.is_empty() {
            return Err(OutboundError::UserErrors {
                operation,
                errors: self.user_errors,
            });
        }
        let node = self.subscription.ok_or_else(|| {
            OutboundError::transport(SERVICE, format!("{operation} returned no subscription"))
        })?;
        Ok(SubscriptionSnapshot {
            id: node.id,
            status: node.status,
            next_billing_date: node.next_billing_date,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionNode {
    id: String,
    #[serde(default)]
    status: Option<SubscriptionStatus>,
    #[serde(default)]
    next_billing_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrdersData {
    subscription_contract: Option<ContractOrders>,
}

#[derive(Debug, Deserialize)]
struct ContractOrders {
    orders: Connection<OrderNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderNode {
    id: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    total_price_set: MoneyBag,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoneyBag {
    shop_money: Money,
}

#[derive(Debug, Deserialize)]
struct Money {
    amount: MinorUnits,
}

#[derive(Debug, Deserialize)]
struct RenewalsData {
    subscriptions: Connection<RenewalNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenewalNode {
    id: String,
    next_billing_date: Option<DateTime<Utc>>,
    customer: Option<RenewalCustomer>,
    line_items: Connection<RenewalLineItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenewalCustomer {
    id: String,
    email: Option<String>,
    first_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenewalLineItem {
    title: Option<String>,
    current_price: Option<Money>,
}

impl RenewalNode {
    /// Renewals without a billing date or a reachable customer are skipped.
    fn into_renewal(self) -> Option<UpcomingRenewal> {
        let next_billing_date = self.next_billing_date?;
        let customer = self.customer?;
        let Some(email) = customer.email else {
            tracing::debug!(subscription_id = %self.id, "Skipping renewal without customer email");
            return None;
        };
        let line_item = self.line_items.edges.into_iter().next().map(|e| e.node);

        Some(UpcomingRenewal {
            subscription_id: self.id,
            customer: Customer {
                id: customer.id,
                email,
                first_name: customer.first_name,
            },
            next_billing_date,
            product_title: line_item.as_ref().and_then(|item| item.title.clone()),
            price: line_item.and_then(|item| item.current_price).map(|m| m.amount),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, ServerGuard};

    #[test]
    fn mutation_payload_with_user_errors_fails() {
        let payload: MutationPayload = serde_json::from_value(json!({
            "subscription": null,
            "userErrors": [{ "field": ["subscriptionId"], "message": "Subscription not found" }]
        }))
        .unwrap();

        let err = payload.into_snapshot("subscriptionPause").unwrap_err();
        match err {
            OutboundError::UserErrors { operation, errors } => {
                assert_eq!(operation, "subscriptionPause");
                assert_eq!(errors[0].message, "Subscription not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn mutation_payload_without_errors_yields_snapshot() {
        let payload: MutationPayload = serde_json::from_value(json!({
            "subscription": { "id": "gid://shopify/SubscriptionContract/1", "status": "PAUSED" },
            "userErrors": []
        }))
        .unwrap();

        let snapshot = payload.into_snapshot("subscriptionPause").unwrap();
        assert_eq!(snapshot.status, Some(SubscriptionStatus::Paused));
    }

    #[test]
    fn mutation_payload_missing_subscription_is_transport_error() {
        let payload: MutationPayload =
            serde_json::from_value(json!({ "subscription": null, "userErrors": [] })).unwrap();
        assert!(matches!(
            payload.into_snapshot("subscriptionCancel"),
            Err(OutboundError::Transport { .. })
        ));
    }

    #[test]
    fn graphql_top_level_errors_deserialize() {
        let response: GraphqlResponse<Value> = serde_json::from_value(json!({
            "errors": [{ "message": "Throttled" }]
        }))
        .unwrap();
        assert!(response.data.is_none());
        assert_eq!(response.errors[0].message, "Throttled");
    }

    #[test]
    fn orders_response_maps_to_summaries() {
        let data: OrdersData = serde_json::from_value(json!({
            "subscriptionContract": {
                "orders": { "edges": [
                    { "node": { "id": "o1", "createdAt": "2024-01-01T00:00:00Z",
                                "totalPriceSet": { "shopMoney": { "amount": "24.00" } } } },
                    { "node": { "id": "o2",
                                "totalPriceSet": { "shopMoney": { "amount": "26.50" } } } }
                ] }
            }
        }))
        .unwrap();

        let orders = data.subscription_contract.unwrap().orders.edges;
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[1].node.total_price_set.shop_money.amount, MinorUnits::new(2650));
    }

    #[test]
    fn renewal_without_email_is_skipped() {
        let node: RenewalNode = serde_json::from_value(json!({
            "id": "s1",
            "nextBillingDate": "2024-06-01T00:00:00Z",
            "customer": { "id": "c1", "email": null },
            "lineItems": { "edges": [] }
        }))
        .unwrap();
        assert!(node.into_renewal().is_none());
    }

    #[test]
    fn renewal_node_maps_first_line_item() {
        let node: RenewalNode = serde_json::from_value(json!({
            "id": "s1",
            "nextBillingDate": "2024-06-01T00:00:00Z",
            "customer": { "id": "c1", "email": "c1@example.com", "firstName": "Ada" },
            "lineItems": { "edges": [
                { "node": { "title": "House Blend", "currentPrice": { "amount": "18.00" } } }
            ] }
        }))
        .unwrap();

        let renewal = node.into_renewal().unwrap();
        assert_eq!(renewal.customer.first_name.as_deref(), Some("Ada"));
        assert_eq!(renewal.product_title.as_deref(), Some("House Blend"));
        assert_eq!(renewal.price, Some(MinorUnits::new(1800)));
    }

    #[test]
    fn page_info_stops_on_last_or_repeated_cursor() {
        let last = PageInfo {
            has_next_page: false,
            end_cursor: Some("c1".into()),
        };
        assert_eq!(last.next_cursor(None), None);

        let stuck = PageInfo {
            has_next_page: true,
            end_cursor: Some("c1".into()),
        };
        assert_eq!(stuck.next_cursor(Some("c1")), None);

        let more = PageInfo {
            has_next_page: true,
            end_cursor: Some("c2".into()),
        };
        assert_eq!(more.next_cursor(Some("c1")).as_deref(), Some("c2"));
    }

    // ══════════════════════════════════════════════════════════════
    // Pagination against a stub endpoint
    // ══════════════════════════════════════════════════════════════

    fn client_for(server: &ServerGuard) -> GraphqlCommerceClient {
        let config = CommerceConfig {
            store_domain: "coffee-club.myshopify.com".to_string(),
            access_token: SecretString::new("shpat_test".to_string()),
            api_version: "2024-01".to_string(),
            timeout_ms: 2_000,
            renewal_window_days: 3,
        };
        GraphqlCommerceClient::new(&config)
            .unwrap()
            .with_endpoint(format!("{}/graphql.json", server.url()))
    }

    fn order_page(ids: &[&str], next: Option<&str>) -> String {
        let edges: Vec<Value> = ids
            .iter()
            .map(|id| json!({ "node": { "id": id, "totalPriceSet": { "shopMoney": { "amount": "24.00" } } } }))
            .collect();
        json!({ "data": { "subscriptionContract": { "orders": {
            "edges": edges,
            "pageInfo": { "hasNextPage": next.is_some(), "endCursor": next }
        } } } })
        .to_string()
    }

    fn renewal_page(ids: &[&str], next: Option<&str>) -> String {
        let edges: Vec<Value> = ids
            .iter()
            .map(|id| {
                json!({ "node": {
                    "id": id,
                    "nextBillingDate": "2024-06-01T00:00:00Z",
                    "customer": { "id": format!("cust_{id}"), "email": format!("{id}@example.com") },
                    "lineItems": { "edges": [] }
                } })
            })
            .collect();
        json!({ "data": { "subscriptions": {
            "edges": edges,
            "pageInfo": { "hasNextPage": next.is_some(), "endCursor": next }
        } } })
        .to_string()
    }

    async fn mock_page(server: &mut ServerGuard, after: Value, body: String) -> mockito::Mock {
        server
            .mock("POST", "/graphql.json")
            .match_header("x-shopify-access-token", "shpat_test")
            .match_body(Matcher::PartialJson(json!({ "variables": { "after": after } })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn order_history_follows_every_page() {
        let mut server = mockito::Server::new_async().await;
        let first = mock_page(&mut server, Value::Null, order_page(&["o1", "o2"], Some("cursor_1"))).await;
        let second = mock_page(&mut server, json!("cursor_1"), order_page(&["o3"], None)).await;

        let orders = client_for(&server).subscription_orders("sub_1").await.unwrap();

        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["o1", "o2", "o3"]);
        let total: MinorUnits = orders.iter().map(|o| o.total_price).sum();
        assert_eq!(total, MinorUnits::new(7200));
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn upcoming_renewals_follow_every_page() {
        let mut server = mockito::Server::new_async().await;
        let first = mock_page(&mut server, Value::Null, renewal_page(&["s1"], Some("cursor_a"))).await;
        let second = mock_page(&mut server, json!("cursor_a"), renewal_page(&["s2", "s3"], None)).await;

        let renewals = client_for(&server).upcoming_renewals(3).await.unwrap();

        let ids: Vec<&str> = renewals.iter().map(|r| r.subscription_id.as_str()).collect();
        assert_eq!(ids, ["s1", "s2", "s3"]);
        first.assert_async().await;
        second.assert_async().await;
    }
}

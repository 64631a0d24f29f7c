//! Transient views of commerce-platform records carried in webhook payloads.
//!
//! None of these are authoritative. The commerce platform owns subscriptions
//! and orders; this crate only reads what a webhook hands it and forwards
//! mutations back through the commerce client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::money::MinorUnits;

/// Lifecycle status of a subscription contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[serde(alias = "ACTIVE")]
    Active,
    #[serde(alias = "PAUSED")]
    Paused,
    #[serde(alias = "CANCELLED", alias = "canceled", alias = "CANCELED")]
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Minimal customer reference nested inside subscriptions and orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
}

/// The customer a webhook is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub email: String,
    #[serde(default, alias = "firstName")]
    pub first_name: Option<String>,
}

/// How often a selling plan delivers and bills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPolicy {
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default, alias = "intervalCount")]
    pub interval_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellingPlan {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "deliveryPolicy")]
    pub delivery_policy: Option<DeliveryPolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// A subscription contract as delivered in a webhook payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub customer: Option<CustomerRef>,
    #[serde(default)]
    pub status: Option<SubscriptionStatus>,
    #[serde(default)]
    pub selling_plan: Option<SellingPlan>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub price: Option<MinorUnits>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "nextBillingDate")]
    pub next_billing_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "lastOrderDate")]
    pub last_order_date: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn plan_name(&self) -> Option<&str> {
        self.selling_plan.as_ref()?.name.as_deref()
    }

    pub fn product_title(&self) -> Option<&str> {
        self.line_items.first()?.title.as_deref()
    }

    pub fn billing_interval(&self) -> Option<&str> {
        self.selling_plan
            .as_ref()?
            .delivery_policy
            .as_ref()?
            .interval
            .as_deref()
    }

    pub fn billing_interval_count(&self) -> Option<u32> {
        self.selling_plan
            .as_ref()?
            .delivery_policy
            .as_ref()?
            .interval_count
    }

    /// Customer id from the nested reference, falling back to the envelope's customer.
    pub fn customer_id<'a>(&'a self, fallback: &'a Customer) -> &'a str {
        self.customer
            .as_ref()
            .map(|c| c.id.as_str())
            .unwrap_or(fallback.id.as_str())
    }

    /// Whole days since the contract was created, if known.
    pub fn age_days(&self, now: DateTime<Utc>) -> Option<i64> {
        self.created_at.map(|created| (now - created).num_days().max(0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingLine {
    #[serde(default)]
    pub title: Option<String>,
}

/// An order generated by a subscription billing cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub order_number: Option<String>,
    #[serde(default)]
    pub total_price: MinorUnits,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub financial_status: Option<String>,
    #[serde(default)]
    pub fulfillment_status: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub shipping_lines: Vec<ShippingLine>,
    #[serde(default)]
    pub customer: Option<CustomerRef>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_delivery_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tracking_info: Option<serde_json::Value>,
    #[serde(default)]
    pub status_url: Option<String>,
}

impl Order {
    pub fn shipping_method(&self) -> Option<&str> {
        self.shipping_lines.first()?.title.as_deref()
    }
}

/// Summary of a historical order, as returned by the commerce client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: String,
    pub total_price: MinorUnits,
    pub created_at: Option<DateTime<Utc>>,
}

/// Sum of every historical order total for a subscription.
pub fn lifetime_value(orders: &[OrderSummary]) -> MinorUnits {
    orders.iter().map(|o| o.total_price).sum()
}

/// A subscription due to renew soon, with the contact details needed to remind the customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingRenewal {
    pub subscription_id: String,
    pub customer: Customer,
    pub next_billing_date: DateTime<Utc>,
    pub product_title: Option<String>,
    pub price: Option<MinorUnits>,
}

impl UpcomingRenewal {
    /// Days until renewal, rounded up so a renewal later today counts as one day out.
    pub fn days_until_renewal(&self, now: DateTime<Utc>) -> i64 {
        let seconds = (self.next_billing_date - now).num_seconds();
        if seconds <= 0 {
            0
        } else {
            (seconds + 86_399) / 86_400
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Id deserialisation
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

/// Commerce ids arrive as numbers or GID strings; both become strings.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    #[test]
    fn subscription_reads_nested_plan_fields() {
        let subscription: Subscription = serde_json::from_value(json!({
            "id": "gid://shopify/SubscriptionContract/42",
            "customer": { "id": 7 },
            "status": "ACTIVE",
            "selling_plan": {
                "name": "Monthly Coffee",
                "deliveryPolicy": { "interval": "MONTH", "intervalCount": 1 }
            },
            "line_items": [{ "title": "House Blend" }],
            "price": "24.00",
            "currency": "USD"
        }))
        .unwrap();

        assert_eq!(subscription.status, Some(SubscriptionStatus::Active));
        assert_eq!(subscription.plan_name(), Some("Monthly Coffee"));
        assert_eq!(subscription.product_title(), Some("House Blend"));
        assert_eq!(subscription.billing_interval(), Some("MONTH"));
        assert_eq!(subscription.billing_interval_count(), Some(1));
        assert_eq!(subscription.price, Some(MinorUnits::new(2400)));
        assert_eq!(subscription.customer.unwrap().id, "7");
    }

    #[test]
    fn subscription_tolerates_sparse_payload() {
        let subscription: Subscription = serde_json::from_value(json!({ "id": 99 })).unwrap();
        assert_eq!(subscription.id, "99");
        assert!(subscription.plan_name().is_none());
        assert!(subscription.product_title().is_none());
    }

    #[test]
    fn customer_id_falls_back_to_envelope_customer() {
        let subscription: Subscription = serde_json::from_value(json!({ "id": "s1" })).unwrap();
        let customer = Customer {
            id: "c9".into(),
            email: "c9@example.com".into(),
            first_name: None,
        };
        assert_eq!(subscription.customer_id(&customer), "c9");
    }

    #[test]
    fn lifetime_value_sums_order_totals() {
        let orders = vec![
            OrderSummary { id: "1".into(), total_price: MinorUnits::new(2400), created_at: None },
            OrderSummary { id: "2".into(), total_price: MinorUnits::new(2400), created_at: None },
            OrderSummary { id: "3".into(), total_price: MinorUnits::new(1999), created_at: None },
        ];
        assert_eq!(lifetime_value(&orders), MinorUnits::new(6799));
        assert_eq!(lifetime_value(&[]), MinorUnits::ZERO);
    }

    #[test]
    fn days_until_renewal_rounds_up() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let renewal = UpcomingRenewal {
            subscription_id: "s1".into(),
            customer: Customer {
                id: "c1".into(),
                email: "c1@example.com".into(),
                first_name: Some("Ada".into()),
            },
            next_billing_date: now + Duration::hours(30),
            product_title: None,
            price: None,
        };
        assert_eq!(renewal.days_until_renewal(now), 2);
        assert_eq!(renewal.days_until_renewal(now + Duration::days(3)), 0);
    }

    #[test]
    fn order_reads_optional_subscription_reference() {
        let order: Order = serde_json::from_value(json!({
            "id": 1001,
            "order_number": 1001,
            "total_price": "24.00",
            "subscription_id": null,
            "shipping_lines": [{ "title": "Standard" }]
        }))
        .unwrap();
        assert!(order.subscription_id.is_none());
        assert_eq!(order.order_number.as_deref(), Some("1001"));
        assert_eq!(order.shipping_method(), Some("Standard"));
    }
}

//! Marketing tools backed by generated demo data.

use super::{bind, text};
use crate::tools::{ToolDef, ToolProvider};
use crate::types::Result;
use chrono::{Days, Local, NaiveDate};
use rand::Rng;
use serde_json::{json, Value};
use uuid::Uuid;

const COUPON_KINDS: [&str; 4] = [
    "Spend-and-save",
    "Percentage off",
    "Free shipping",
    "Double points",
];
const ACTIVITY_NAMES: [&str; 10] = [
    "Spring Sale",
    "Summer Cool Festival",
    "Autumn Harvest",
    "Year-End Sale",
    "Member Day Special",
    "New Product Launch",
    "Brand Day Promotion",
    "Holiday Special",
    "Flash Sale",
    "Spend-and-Save Offer",
];
const ACTIVITY_KINDS: [&str; 5] = [
    "Spend-and-save",
    "Discount",
    "Gift with purchase",
    "Double points",
    "Lucky draw",
];
const JOINED_ACTIVITIES: [&str; 5] = [
    "Spring Festival Sale",
    "Member Day",
    "New Product Trial",
    "Summer Clearance",
    "Brand Day",
];
const PARTICIPATION: [&str; 4] = ["COMPLETED", "IN_PROGRESS", "REGISTERED", "ABANDONED"];
const CHANNELS: [(&str, &str); 6] = [
    ("SMS", "SMS marketing"),
    ("EMAIL", "Email marketing"),
    ("PUSH", "Push notification"),
    ("APP", "In-app message"),
    ("WECHAT", "WeChat message"),
    ("WEBSITE", "Website banner"),
];

/// Stateless provider; every call draws fresh numbers.
#[derive(Debug, Clone, Default)]
pub struct MarketingProvider;

impl MarketingProvider {
    pub const COMPONENT_ID: &'static str = "marketing_provider";

    pub fn new() -> Self {
        Self
    }

    /// VIP customers (case-insensitive) get the high-value set.
    pub fn recommend_coupons(
        &self,
        customer_id: &str,
        customer_name: &str,
        customer_type: &str,
    ) -> Value {
        let stamp = Local::now().timestamp_millis();
        let coupons = if customer_type.eq_ignore_ascii_case("VIP") {
            vec![
                coupon(format!("V{}", stamp), "VIP exclusive coupon", "100.00", "Spend 500.00", 30)
                    .category("Storewide"),
                coupon(format!("V{}", stamp + 1), "VIP member offer", "50.00", "Spend 200.00", 15)
                    .category("Selected items"),
            ]
        } else {
            vec![
                coupon(format!("C{}", stamp), "New customer coupon", "20.00", "Spend 100.00", 7)
                    .category("Storewide"),
                coupon(format!("C{}", stamp + 1), "Everyday coupon", "10.00", "Spend 50.00", 5)
                    .category("Selected categories"),
            ]
        };

        tracing::info!(customer = customer_name, coupons = coupons.len(), "Recommended coupons");
        json!({
            "success": true,
            "customerId": customer_id,
            "customerName": customer_name,
            "recommendationCount": coupons.len(),
            "recommendedCoupons": coupons,
        })
    }

    pub fn query_customer_coupons(&self, customer_id: &str, customer_name: &str) -> Value {
        let mut rng = rand::thread_rng();
        let stamp = Local::now().timestamp_millis();
        let coupons: Vec<Value> = (0..5)
            .map(|i| {
                json!({
                    "couponId": format!("COUP{}", stamp + i),
                    "couponName": format!("Coupon {}", i + 1),
                    "type": COUPON_KINDS[i as usize % COUPON_KINDS.len()],
                    "discountAmount": money(rng.gen_range(0.0..100.0)),
                    "condition": format!("Spend {:.0}", rng.gen_range(50.0..250.0)),
                    "validUntil": date_string(days_from_today(rng.gen_range(1..=30))),
                    "status": "UNUSED",
                })
            })
            .collect();

        tracing::info!(
            customer = customer_name,
            coupons = coupons.len(),
            "Customer coupon query succeeded"
        );
        json!({
            "success": true,
            "customerId": customer_id,
            "customerName": customer_name,
            "totalCoupons": coupons.len(),
            "coupons": coupons,
        })
    }

    /// Empty status means no filter; activities then report `ACTIVE`.
    pub fn query_marketing_activities(&self, status: &str) -> Value {
        let mut rng = rand::thread_rng();
        let stamp = Local::now().timestamp_millis();
        let status = (!status.is_empty()).then_some(status);
        let today = Local::now().date_naive();

        let activities: Vec<Value> = (0..5)
            .map(|i| {
                let start = today
                    .checked_sub_days(Days::new(rng.gen_range(0..10)))
                    .unwrap_or(today);
                json!({
                    "activityId": format!("ACT{}", stamp + i),
                    "activityName": ACTIVITY_NAMES[i as usize % ACTIVITY_NAMES.len()],
                    "type": ACTIVITY_KINDS[i as usize % ACTIVITY_KINDS.len()],
                    "startDate": date_string(start),
                    "endDate": date_string(days_from_today(30 - rng.gen_range(0..20))),
                    "status": status.unwrap_or("ACTIVE"),
                    "targetAudience": "All customers",
                    "budget": money(rng.gen_range(5_000.0..15_000.0)),
                })
            })
            .collect();

        tracing::info!(activities = activities.len(), "Marketing activity query succeeded");
        json!({
            "success": true,
            "activityCount": activities.len(),
            "statusFilter": status.unwrap_or("ALL"),
            "activities": activities,
        })
    }

    pub fn query_customer_points(&self, customer_id: &str, customer_name: &str) -> Value {
        let mut rng = rand::thread_rng();
        let current: u32 = rng.gen_range(1_000..6_000);
        // 100 points are worth 1.00.
        let estimated = format!("{}.{:02}", current / 100, current % 100);

        tracing::info!(
            customer = customer_name,
            points = current,
            "Customer points query succeeded"
        );
        json!({
            "success": true,
            "pointsInfo": {
                "customerId": customer_id,
                "customerName": customer_name,
                "currentPoints": current,
                "usedPoints": rng.gen_range(0..2_000),
                "expiredPoints": rng.gen_range(0..500),
                "totalEarned": rng.gen_range(2_000..10_000),
                "level": format!("VIP{}", rng.gen_range(1..=3)),
                "estimatedValue": estimated,
            },
        })
    }

    pub fn query_customer_activities(&self, customer_id: &str, customer_name: &str) -> Value {
        let mut rng = rand::thread_rng();
        let stamp = Local::now().timestamp_millis();
        let today = Local::now().date_naive();

        let activities: Vec<Value> = (0..4)
            .map(|i| {
                let joined = today
                    .checked_sub_days(Days::new(rng.gen_range(0..60)))
                    .unwrap_or(today);
                json!({
                    "activityId": format!("PART{}", stamp + i),
                    "activityName": JOINED_ACTIVITIES[i as usize % JOINED_ACTIVITIES.len()],
                    "joinDate": date_string(joined),
                    "status": PARTICIPATION[i as usize % PARTICIPATION.len()],
                    "rewardAmount": money(rng.gen_range(0.0..100.0)),
                    "rewardType": if i % 2 == 0 { "POINTS" } else { "COUPON" },
                })
            })
            .collect();

        tracing::info!(
            customer = customer_name,
            activities = activities.len(),
            "Customer activity query succeeded"
        );
        json!({
            "success": true,
            "customerId": customer_id,
            "customerName": customer_name,
            "activityCount": activities.len(),
            "participatedActivities": activities,
        })
    }

    pub fn issue_coupon_to_customer(
        &self,
        customer_id: &str,
        coupon_template_id: &str,
        reason: &str,
    ) -> Value {
        let instance_id = format!("INST-{}", Uuid::new_v4().simple());
        let discount = money(rand::thread_rng().gen_range(10.0..210.0));

        tracing::info!(customer = customer_id, coupon = %instance_id, "Issued coupon");
        json!({
            "success": true,
            "customerId": customer_id,
            "reason": reason,
            "message": "coupon issued",
            "issuedCoupon": {
                "couponInstanceId": instance_id,
                "couponTemplateId": coupon_template_id,
                "couponName": "System-issued coupon",
                "discountAmount": discount,
                "validUntil": date_string(days_from_today(30)),
                "status": "ISSUED",
            },
        })
    }

    pub fn query_activity_statistics(&self, activity_id: &str, activity_name: &str) -> Value {
        let mut rng = rand::thread_rng();

        tracing::info!(activity = activity_name, "Activity statistics query succeeded");
        json!({
            "success": true,
            "status": "COMPLETED",
            "statistics": {
                "activityId": activity_id,
                "activityName": activity_name,
                "participants": rng.gen_range(1_000..11_000),
                "conversionRate": percent(rng.gen_range(5.0..35.0)),
                "revenueGenerated": money(rng.gen_range(10_000.0..110_000.0)),
                "cost": money(rng.gen_range(5_000.0..25_000.0)),
                "roi": money(rng.gen_range(1.0..6.0)),
                "engagementRate": percent(rng.gen_range(10.0..60.0)),
            },
        })
    }

    /// Always reports every channel; the argument is echoed as the filter.
    pub fn query_channel_effectiveness(&self, channel_type: &str) -> Value {
        let mut rng = rand::thread_rng();
        let stats: Vec<Value> = CHANNELS
            .iter()
            .map(|(kind, name)| {
                json!({
                    "channelType": kind,
                    "channelName": name,
                    "sentCount": rng.gen_range(5_000..55_000),
                    "openRate": percent(rng.gen_range(5.0..85.0)),
                    "clickRate": percent(rng.gen_range(1.0..21.0)),
                    "conversionRate": percent(rng.gen_range(0.1..10.1)),
                    "cost": money(rng.gen_range(100.0..5_100.0)),
                    "revenue": money(rng.gen_range(500.0..15_500.0)),
                })
            })
            .collect();

        tracing::info!(channels = stats.len(), "Channel effectiveness query succeeded");
        json!({
            "success": true,
            "channelCount": stats.len(),
            "filterChannel": if channel_type.is_empty() { "ALL" } else { channel_type },
            "channelStats": stats,
        })
    }
}

impl ToolProvider for MarketingProvider {
    fn component_id(&self) -> &str {
        Self::COMPONENT_ID
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn tools(&self) -> Result<Vec<ToolDef>> {
        let customer_id = || text("customer_id", "Customer ID");
        let customer_name = || text("customer_name", "Customer name");

        Ok(vec![
            ToolDef::new(
                "recommend_coupons",
                "Recommend coupons suited to a customer",
                bind(self, |p: Self, args| async move {
                    Ok(p.recommend_coupons(args.text(0)?, args.text(1)?, args.text(2)?))
                }),
            )
            .param(customer_id())
            .param(customer_name())
            .param(text("customer_type", "Customer type (VIP, regular, corporate)")),
            ToolDef::new(
                "query_customer_coupons",
                "Query the coupons a customer holds",
                bind(self, |p: Self, args| async move {
                    Ok(p.query_customer_coupons(args.text(0)?, args.text(1)?))
                }),
            )
            .param(customer_id())
            .param(customer_name()),
            ToolDef::new(
                "query_marketing_activities",
                "List marketing activities",
                bind(self, |p: Self, args| async move {
                    Ok(p.query_marketing_activities(args.text(0)?))
                }),
            )
            .param(text("status", "Activity status (ACTIVE, ENDED, UPCOMING)")),
            ToolDef::new(
                "query_customer_points",
                "Query a customer's loyalty points",
                bind(self, |p: Self, args| async move {
                    Ok(p.query_customer_points(args.text(0)?, args.text(1)?))
                }),
            )
            .param(customer_id())
            .param(customer_name()),
            ToolDef::new(
                "query_customer_activities",
                "Query the marketing activities a customer joined",
                bind(self, |p: Self, args| async move {
                    Ok(p.query_customer_activities(args.text(0)?, args.text(1)?))
                }),
            )
            .param(customer_id())
            .param(customer_name()),
            ToolDef::new(
                "issue_coupon_to_customer",
                "Issue a coupon to a customer",
                bind(self, |p: Self, args| async move {
                    Ok(p.issue_coupon_to_customer(args.text(0)?, args.text(1)?, args.text(2)?))
                }),
            )
            .param(customer_id())
            .param(text("coupon_template_id", "Coupon template ID"))
            .param(text("reason", "Reason for issuing")),
            ToolDef::new(
                "query_activity_statistics",
                "Query effectiveness statistics for a marketing activity",
                bind(self, |p: Self, args| async move {
                    Ok(p.query_activity_statistics(args.text(0)?, args.text(1)?))
                }),
            )
            .param(text("activity_id", "Activity ID"))
            .param(text("activity_name", "Activity name")),
            ToolDef::new(
                "query_channel_effectiveness",
                "Query marketing channel effectiveness",
                bind(self, |p: Self, args| async move {
                    Ok(p.query_channel_effectiveness(args.text(0)?))
                }),
            )
            .param(text("channel_type", "Channel type (SMS, EMAIL, PUSH, APP)")),
        ])
    }
}

struct Coupon(Value);

impl Coupon {
    fn category(mut self, category: &str) -> Value {
        self.0["category"] = Value::from(category);
        self.0
    }
}

fn coupon(id: String, name: &str, discount: &str, condition: &str, valid_days: u64) -> Coupon {
    Coupon(json!({
        "couponId": id,
        "couponName": name,
        "discountAmount": discount,
        "condition": condition,
        "validUntil": date_string(days_from_today(valid_days)),
    }))
}

fn days_from_today(days: u64) -> NaiveDate {
    let today = Local::now().date_naive();
    today.checked_add_days(Days::new(days)).unwrap_or(today)
}

fn date_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn money(value: f64) -> String {
    format!("{:.2}", value)
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_date(s: &str) -> bool {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
    }

    #[test]
    fn test_vip_coupons() {
        let result = MarketingProvider::new().recommend_coupons("C001", "Zhang San", "vip");
        assert_eq!(result["success"], true);
        assert_eq!(result["recommendationCount"], 2);
        assert_eq!(result["recommendedCoupons"][0]["discountAmount"], "100.00");
        assert!(result["recommendedCoupons"][0]["couponId"]
            .as_str()
            .unwrap()
            .starts_with('V'));
        assert!(is_date(result["recommendedCoupons"][1]["validUntil"].as_str().unwrap()));
    }

    #[test]
    fn test_regular_coupons() {
        let result = MarketingProvider::new().recommend_coupons("C002", "Li Si", "regular");
        assert_eq!(result["recommendedCoupons"][0]["discountAmount"], "20.00");
        assert_eq!(result["recommendedCoupons"][1]["discountAmount"], "10.00");
    }

    #[test]
    fn test_customer_coupons_shape() {
        let result = MarketingProvider::new().query_customer_coupons("C001", "Zhang San");
        assert_eq!(result["totalCoupons"], 5);
        let coupons = result["coupons"].as_array().unwrap();
        assert_eq!(coupons[4]["type"], COUPON_KINDS[0]);
        for c in coupons {
            let amount: f64 = c["discountAmount"].as_str().unwrap().parse().unwrap();
            assert!((0.0..=100.0).contains(&amount));
        }
    }

    #[test]
    fn test_activity_status_filter() {
        let p = MarketingProvider::new();
        let all = p.query_marketing_activities("");
        assert_eq!(all["statusFilter"], "ALL");
        assert_eq!(all["activities"][0]["status"], "ACTIVE");

        let ended = p.query_marketing_activities("ENDED");
        assert_eq!(ended["statusFilter"], "ENDED");
        assert_eq!(ended["activities"][3]["status"], "ENDED");
    }

    #[test]
    fn test_points_value() {
        let result = MarketingProvider::new().query_customer_points("C001", "Zhang San");
        let info = &result["pointsInfo"];
        let points = info["currentPoints"].as_u64().unwrap();
        assert!((1_000..6_000).contains(&points));
        assert_eq!(
            info["estimatedValue"],
            format!("{}.{:02}", points / 100, points % 100)
        );
    }

    #[test]
    fn test_issue_coupon() {
        let result =
            MarketingProvider::new().issue_coupon_to_customer("C001", "TPL-9", "birthday");
        assert_eq!(result["issuedCoupon"]["couponTemplateId"], "TPL-9");
        assert_eq!(result["reason"], "birthday");
        assert!(is_date(result["issuedCoupon"]["validUntil"].as_str().unwrap()));

        let again = MarketingProvider::new().issue_coupon_to_customer("C001", "TPL-9", "birthday");
        assert_ne!(
            result["issuedCoupon"]["couponInstanceId"],
            again["issuedCoupon"]["couponInstanceId"]
        );
    }

    #[test]
    fn test_channels_and_statistics() {
        let p = MarketingProvider::new();
        let channels = p.query_channel_effectiveness("SMS");
        assert_eq!(channels["channelCount"], 6);
        assert_eq!(channels["filterChannel"], "SMS");
        assert!(channels["channelStats"][0]["openRate"].as_str().unwrap().ends_with('%'));

        let stats = p.query_activity_statistics("ACT1", "Spring Sale");
        assert_eq!(stats["statistics"]["activityName"], "Spring Sale");
    }

    #[test]
    fn test_tool_table() {
        let tools = MarketingProvider::new().tools().unwrap();
        assert_eq!(tools.len(), 8);
        assert_eq!(tools[0].name, "recommend_coupons");
        assert_eq!(tools[2].arity(), 1);
    }
}

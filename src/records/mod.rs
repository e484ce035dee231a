//! Retail-credit records behind the loan credit tools.
//!
//! `LoanRecords` is the query boundary; `InMemoryRecords` is the seeded
//! implementation the server runs with. Amounts are integer cents.

mod memory;

pub use memory::{InMemoryRecords, BUSINESS_LOAN, CONSUMER_LOAN, HOUSING_FUND_LOAN};

use crate::types::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub id_type: String,
    pub id_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanProduct {
    pub id: i64,
    pub product_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerCredit {
    pub customer_id: i64,
    pub product_id: i64,
    pub credit_limit: i64,
    pub available_limit: i64,
    pub status: String,
}

/// Contract lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    Active,
    Settled,
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractStatus::Active => f.write_str("ACTIVE"),
            ContractStatus::Settled => f.write_str("SETTLED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanContract {
    pub id: i64,
    pub customer_id: i64,
    pub product_id: i64,
    pub loan_balance: i64,
    pub status: ContractStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentPlan {
    pub contract_id: i64,
    pub repayment_date: NaiveDate,
    pub repayment_amount: i64,
    pub interest_amount: i64,
    pub principal_amount: i64,
    pub remaining_balance: i64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueRecord {
    pub contract_id: i64,
    pub overdue_date: NaiveDate,
    pub due_amount: i64,
    pub paid_amount: i64,
    pub overdue_amount: i64,
    pub penalty_amount: i64,
}

/// Contract filter used by the credit tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContractFilter {
    pub product_id: Option<i64>,
    pub status: Option<ContractStatus>,
}

impl ContractFilter {
    pub fn active() -> Self {
        Self {
            product_id: None,
            status: Some(ContractStatus::Active),
        }
    }

    pub fn product(mut self, product_id: i64) -> Self {
        self.product_id = Some(product_id);
        self
    }

    pub fn matches(&self, contract: &LoanContract) -> bool {
        self.product_id.map_or(true, |p| contract.product_id == p)
            && self.status.map_or(true, |s| contract.status == s)
    }
}

/// Read-only query interface over customer, product, credit and contract data.
#[async_trait]
pub trait LoanRecords: Send + Sync {
    /// Exact match on name, document type and document number.
    async fn find_customer(
        &self,
        name: &str,
        id_type: &str,
        id_number: &str,
    ) -> Result<Option<Customer>>;

    async fn find_product_by_name(&self, product_name: &str) -> Result<Option<LoanProduct>>;

    async fn find_product(&self, product_id: i64) -> Result<Option<LoanProduct>>;

    async fn find_credit(&self, customer_id: i64, product_id: i64)
        -> Result<Option<CustomerCredit>>;

    async fn contracts_for_customer(
        &self,
        customer_id: i64,
        filter: ContractFilter,
    ) -> Result<Vec<LoanContract>>;

    /// Plans of one contract falling in `year`.
    async fn repayment_plans(&self, contract_id: i64, year: i32) -> Result<Vec<RepaymentPlan>>;

    async fn overdue_records(&self, contract_id: i64) -> Result<Vec<OverdueRecord>>;
}

/// Format cents as a decimal amount with exactly two fraction digits.
pub fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0.00");
        assert_eq!(format_amount(5), "0.05");
        assert_eq!(format_amount(123_456), "1234.56");
        assert_eq!(format_amount(50_000_000), "500000.00");
        assert_eq!(format_amount(-250), "-2.50");
    }

    #[test]
    fn test_contract_filter() {
        let contract = LoanContract {
            id: 1,
            customer_id: 1,
            product_id: 2,
            loan_balance: 100,
            status: ContractStatus::Settled,
        };
        assert!(ContractFilter::default().matches(&contract));
        assert!(ContractFilter::default().product(2).matches(&contract));
        assert!(!ContractFilter::active().matches(&contract));
        assert!(!ContractFilter::default().product(3).matches(&contract));
    }

    #[test]
    fn test_contract_status_serde() {
        assert_eq!(
            serde_json::to_string(&ContractStatus::Active).unwrap(),
            "\"ACTIVE\""
        );
        assert_eq!(ContractStatus::Settled.to_string(), "SETTLED");
    }
}

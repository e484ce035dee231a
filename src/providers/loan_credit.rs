//! Retail-credit query tools: credit limits, balances, repayment plans and
//! overdue history.
//!
//! Lookup misses are answered with a `{success: false, message}` payload. A
//! failing record store is logged and reported the same way.

use super::{bind, failure, text};
use crate::records::{format_amount, ContractFilter, LoanRecords};
use crate::tools::{ToolDef, ToolProvider};
use crate::types::Result;
use chrono::{Datelike, Local};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

const CUSTOMER_NOT_FOUND: &str = "customer not found";
const PRODUCT_NOT_FOUND: &str = "loan product not found";
const NO_CREDIT: &str = "customer has no credit for this product";
const NO_CONTRACT: &str = "customer has no contract for this product";
const NO_CONTRACTS: &str = "customer has no loan contracts";
const NO_PLANS: &str = "no repayment plans this year";

#[derive(Clone)]
pub struct LoanCreditProvider {
    records: Arc<dyn LoanRecords>,
}

impl fmt::Debug for LoanCreditProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoanCreditProvider").finish_non_exhaustive()
    }
}

impl LoanCreditProvider {
    pub const COMPONENT_ID: &'static str = "loan_credit_provider";

    pub fn new(records: Arc<dyn LoanRecords>) -> Self {
        Self { records }
    }

    pub async fn query_credit_limit(
        &self,
        name: &str,
        id_type: &str,
        id_number: &str,
        product_name: &str,
    ) -> Value {
        respond(
            "query_credit_limit",
            self.credit_limit(name, id_type, id_number, product_name),
        )
        .await
    }

    /// Sum of active contract balances for one product.
    pub async fn query_loan_balance_by_product(
        &self,
        name: &str,
        id_type: &str,
        id_number: &str,
        product_name: &str,
    ) -> Value {
        respond(
            "query_loan_balance_by_product",
            self.loan_balance_by_product(name, id_type, id_number, product_name),
        )
        .await
    }

    /// Active balances grouped by product name.
    pub async fn query_loan_balances_by_customer(
        &self,
        name: &str,
        id_type: &str,
        id_number: &str,
    ) -> Value {
        respond(
            "query_loan_balances_by_customer",
            self.loan_balances_by_customer(name, id_type, id_number),
        )
        .await
    }

    /// This year's plans across the product's active contracts, by date.
    pub async fn query_repayment_plans(
        &self,
        name: &str,
        id_type: &str,
        id_number: &str,
        product_name: &str,
    ) -> Value {
        respond(
            "query_repayment_plans",
            self.repayment_plans(name, id_type, id_number, product_name),
        )
        .await
    }

    /// Rows with a positive overdue amount across every contract of the product.
    pub async fn query_overdue_records(
        &self,
        name: &str,
        id_type: &str,
        id_number: &str,
        product_name: &str,
    ) -> Value {
        respond(
            "query_overdue_records",
            self.overdue_records(name, id_type, id_number, product_name),
        )
        .await
    }

    async fn credit_limit(
        &self,
        name: &str,
        id_type: &str,
        id_number: &str,
        product_name: &str,
    ) -> Result<Value> {
        let Some(customer) = self.records.find_customer(name, id_type, id_number).await? else {
            return Ok(failure(CUSTOMER_NOT_FOUND));
        };
        let Some(product) = self.records.find_product_by_name(product_name).await? else {
            return Ok(failure(PRODUCT_NOT_FOUND));
        };
        let Some(credit) = self.records.find_credit(customer.id, product.id).await? else {
            return Ok(failure(NO_CREDIT));
        };

        tracing::info!(customer = name, product = product_name, "Credit limit query succeeded");
        Ok(json!({
            "success": true,
            "customerName": name,
            "productName": product_name,
            "creditLimit": format_amount(credit.credit_limit),
            "availableLimit": format_amount(credit.available_limit),
        }))
    }

    async fn loan_balance_by_product(
        &self,
        name: &str,
        id_type: &str,
        id_number: &str,
        product_name: &str,
    ) -> Result<Value> {
        let Some(customer) = self.records.find_customer(name, id_type, id_number).await? else {
            return Ok(failure(CUSTOMER_NOT_FOUND));
        };
        let Some(product) = self.records.find_product_by_name(product_name).await? else {
            return Ok(failure(PRODUCT_NOT_FOUND));
        };
        let contracts = self
            .records
            .contracts_for_customer(customer.id, ContractFilter::active().product(product.id))
            .await?;
        if contracts.is_empty() {
            return Ok(failure(NO_CONTRACT));
        }

        let total: i64 = contracts.iter().map(|c| c.loan_balance).sum();
        tracing::info!(customer = name, product = product_name, "Loan balance query succeeded");
        Ok(json!({
            "success": true,
            "customerName": name,
            "productName": product_name,
            "loanBalance": format_amount(total),
            "contractCount": contracts.len(),
        }))
    }

    async fn loan_balances_by_customer(
        &self,
        name: &str,
        id_type: &str,
        id_number: &str,
    ) -> Result<Value> {
        let Some(customer) = self.records.find_customer(name, id_type, id_number).await? else {
            return Ok(failure(CUSTOMER_NOT_FOUND));
        };
        let contracts = self
            .records
            .contracts_for_customer(customer.id, ContractFilter::active())
            .await?;
        if contracts.is_empty() {
            return Ok(failure(NO_CONTRACTS));
        }

        let mut by_product: BTreeMap<String, i64> = BTreeMap::new();
        for contract in &contracts {
            // Contracts pointing at a vanished product are left out.
            if let Some(product) = self.records.find_product(contract.product_id).await? {
                *by_product.entry(product.product_name).or_default() += contract.loan_balance;
            }
        }

        let total: i64 = by_product.values().sum();
        let balances: Vec<Value> = by_product
            .iter()
            .map(|(product_name, balance)| {
                json!({
                    "productName": product_name,
                    "loanBalance": format_amount(*balance),
                })
            })
            .collect();

        tracing::info!(customer = name, products = balances.len(), "Loan balances query succeeded");
        Ok(json!({
            "success": true,
            "customerName": name,
            "totalLoanBalance": format_amount(total),
            "productBalances": balances,
        }))
    }

    async fn repayment_plans(
        &self,
        name: &str,
        id_type: &str,
        id_number: &str,
        product_name: &str,
    ) -> Result<Value> {
        let Some(customer) = self.records.find_customer(name, id_type, id_number).await? else {
            return Ok(failure(CUSTOMER_NOT_FOUND));
        };
        let Some(product) = self.records.find_product_by_name(product_name).await? else {
            return Ok(failure(PRODUCT_NOT_FOUND));
        };
        let contracts = self
            .records
            .contracts_for_customer(customer.id, ContractFilter::active().product(product.id))
            .await?;
        if contracts.is_empty() {
            return Ok(failure(NO_CONTRACT));
        }

        let year = Local::now().year();
        let mut plans = Vec::new();
        for contract in &contracts {
            plans.extend(self.records.repayment_plans(contract.id, year).await?);
        }
        if plans.is_empty() {
            return Ok(failure(NO_PLANS));
        }
        plans.sort_by_key(|p| p.repayment_date);

        let rows: Vec<Value> = plans
            .iter()
            .map(|p| {
                json!({
                    "repaymentDate": p.repayment_date.to_string(),
                    "repaymentAmount": format_amount(p.repayment_amount),
                    "interestAmount": format_amount(p.interest_amount),
                    "principalAmount": format_amount(p.principal_amount),
                    "remainingBalance": format_amount(p.remaining_balance),
                    "status": p.status,
                })
            })
            .collect();

        tracing::info!(
            customer = name,
            product = product_name,
            plans = rows.len(),
            "Repayment plan query succeeded"
        );
        Ok(json!({
            "success": true,
            "customerName": name,
            "productName": product_name,
            "year": year.to_string(),
            "repaymentPlans": rows,
        }))
    }

    async fn overdue_records(
        &self,
        name: &str,
        id_type: &str,
        id_number: &str,
        product_name: &str,
    ) -> Result<Value> {
        let Some(customer) = self.records.find_customer(name, id_type, id_number).await? else {
            return Ok(failure(CUSTOMER_NOT_FOUND));
        };
        let Some(product) = self.records.find_product_by_name(product_name).await? else {
            return Ok(failure(PRODUCT_NOT_FOUND));
        };
        let contracts = self
            .records
            .contracts_for_customer(customer.id, ContractFilter::default().product(product.id))
            .await?;
        if contracts.is_empty() {
            return Ok(failure(NO_CONTRACT));
        }

        let mut records = Vec::new();
        for contract in &contracts {
            records.extend(
                self.records
                    .overdue_records(contract.id)
                    .await?
                    .into_iter()
                    .filter(|r| r.overdue_amount > 0),
            );
        }
        records.sort_by_key(|r| r.overdue_date);

        let rows: Vec<Value> = records
            .iter()
            .map(|r| {
                json!({
                    "overdueDate": r.overdue_date.to_string(),
                    "dueAmount": format_amount(r.due_amount),
                    "paidAmount": format_amount(r.paid_amount),
                    "overdueAmount": format_amount(r.overdue_amount),
                    "penaltyAmount": format_amount(r.penalty_amount),
                })
            })
            .collect();

        tracing::info!(
            customer = name,
            product = product_name,
            records = rows.len(),
            "Overdue record query succeeded"
        );
        Ok(json!({
            "success": true,
            "customerName": name,
            "productName": product_name,
            "overdueCount": rows.len(),
            "overdueRecords": rows,
        }))
    }
}

/// Fold a store error into a failure payload.
async fn respond<F>(operation: &str, query: F) -> Value
where
    F: Future<Output = Result<Value>>,
{
    match query.await {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(operation, error = %e, "Credit query failed");
            failure(format!("query failed: {}", e))
        }
    }
}

impl ToolProvider for LoanCreditProvider {
    fn component_id(&self) -> &str {
        Self::COMPONENT_ID
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn tools(&self) -> Result<Vec<ToolDef>> {
        let customer = || {
            [
                text("name", "Customer name"),
                text("id_type", "Identity document type"),
                text("id_number", "Identity document number"),
            ]
        };
        let product = || text("product_name", "Loan product name");
        let with_customer = |def: ToolDef| customer().into_iter().fold(def, ToolDef::param);

        Ok(vec![
            with_customer(ToolDef::new(
                "query_credit_limit",
                "Query a customer's credit limit for a loan product",
                bind(self, |p: Self, args| async move {
                    let (name, id_type, id_number) = (args.text(0)?, args.text(1)?, args.text(2)?);
                    Ok(p.query_credit_limit(name, id_type, id_number, args.text(3)?).await)
                }),
            ))
            .param(product()),
            with_customer(ToolDef::new(
                "query_loan_balance_by_product",
                "Query a customer's loan balance for one product",
                bind(self, |p: Self, args| async move {
                    Ok(p.query_loan_balance_by_product(
                        args.text(0)?,
                        args.text(1)?,
                        args.text(2)?,
                        args.text(3)?,
                    )
                    .await)
                }),
            ))
            .param(product()),
            with_customer(ToolDef::new(
                "query_loan_balances_by_customer",
                "Query a customer's loan balances across all products",
                bind(self, |p: Self, args| async move {
                    let (name, id_type, id_number) = (args.text(0)?, args.text(1)?, args.text(2)?);
                    Ok(p.query_loan_balances_by_customer(name, id_type, id_number).await)
                }),
            )),
            with_customer(ToolDef::new(
                "query_repayment_plans",
                "Query a customer's repayment plans for this year",
                bind(self, |p: Self, args| async move {
                    let (name, id_type, id_number) = (args.text(0)?, args.text(1)?, args.text(2)?);
                    Ok(p.query_repayment_plans(name, id_type, id_number, args.text(3)?).await)
                }),
            ))
            .param(product()),
            with_customer(ToolDef::new(
                "query_overdue_records",
                "Query a customer's overdue records for a loan product",
                bind(self, |p: Self, args| async move {
                    let (name, id_type, id_number) = (args.text(0)?, args.text(1)?, args.text(2)?);
                    Ok(p.query_overdue_records(name, id_type, id_number, args.text(3)?).await)
                }),
            ))
            .param(product()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{InMemoryRecords, BUSINESS_LOAN, CONSUMER_LOAN, HOUSING_FUND_LOAN};
    use crate::records::{
        Customer, CustomerCredit, LoanContract, LoanProduct, OverdueRecord, RepaymentPlan,
    };
    use crate::types::Error;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    const ZHANG: (&str, &str, &str) = ("Zhang San", "ID_CARD", "110101199001011234");
    const LI: (&str, &str, &str) = ("Li Si", "ID_CARD", "110101199102022345");

    fn provider() -> LoanCreditProvider {
        LoanCreditProvider::new(Arc::new(InMemoryRecords::seeded()))
    }

    #[tokio::test]
    async fn test_credit_limit() {
        let (name, id_type, id_number) = ZHANG;
        let result = provider()
            .query_credit_limit(name, id_type, id_number, HOUSING_FUND_LOAN)
            .await;
        assert_eq!(
            result,
            json!({
                "success": true,
                "customerName": "Zhang San",
                "productName": HOUSING_FUND_LOAN,
                "creditLimit": "800000.00",
                "availableLimit": "500000.00",
            })
        );
    }

    #[tokio::test]
    async fn test_lookup_misses() {
        let p = provider();
        let (name, id_type, id_number) = ZHANG;

        let unknown = p.query_credit_limit("Nobody", id_type, id_number, HOUSING_FUND_LOAN).await;
        assert_eq!(unknown, failure(CUSTOMER_NOT_FOUND));

        let no_product = p.query_credit_limit(name, id_type, id_number, "Car Loan").await;
        assert_eq!(no_product, failure(PRODUCT_NOT_FOUND));

        let no_credit = p.query_credit_limit(name, id_type, id_number, BUSINESS_LOAN).await;
        assert_eq!(no_credit, failure(NO_CREDIT));

        let (li, li_type, li_number) = LI;
        let no_contract = p
            .query_loan_balance_by_product(li, li_type, li_number, BUSINESS_LOAN)
            .await;
        assert_eq!(no_contract, failure(NO_CONTRACT));
    }

    #[tokio::test]
    async fn test_balance_ignores_settled_contracts() {
        let (name, id_type, id_number) = LI;
        let result = provider()
            .query_loan_balance_by_product(name, id_type, id_number, CONSUMER_LOAN)
            .await;
        assert_eq!(result["loanBalance"], "60000.00");
        assert_eq!(result["contractCount"], 1);
    }

    #[tokio::test]
    async fn test_balances_by_customer() {
        let (name, id_type, id_number) = ZHANG;
        let result = provider()
            .query_loan_balances_by_customer(name, id_type, id_number)
            .await;
        assert_eq!(result["totalLoanBalance"], "500000.00");
        assert_eq!(
            result["productBalances"],
            json!([
                {"productName": HOUSING_FUND_LOAN, "loanBalance": "450000.00"},
                {"productName": CONSUMER_LOAN, "loanBalance": "50000.00"},
            ])
        );
    }

    #[tokio::test]
    async fn test_repayment_plans_sorted_within_year() {
        let (name, id_type, id_number) = ZHANG;
        let result = provider()
            .query_repayment_plans(name, id_type, id_number, HOUSING_FUND_LOAN)
            .await;
        let year = Local::now().year().to_string();
        assert_eq!(result["year"], year.as_str());

        let plans = result["repaymentPlans"].as_array().unwrap();
        assert_eq!(plans.len(), 12);
        let dates: Vec<&str> = plans.iter().map(|p| p["repaymentDate"].as_str().unwrap()).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        assert!(dates.iter().all(|d| d.starts_with(&year)));
        assert_eq!(plans[0]["repaymentAmount"], "3490.00");
    }

    #[tokio::test]
    async fn test_overdue_records_include_settled_contracts() {
        let (name, id_type, id_number) = LI;
        let result = provider()
            .query_overdue_records(name, id_type, id_number, CONSUMER_LOAN)
            .await;
        assert_eq!(result["overdueCount"], 3);

        let rows = result["overdueRecords"].as_array().unwrap();
        assert_eq!(rows[0]["overdueAmount"], "500.00");
        assert_eq!(rows[1]["overdueAmount"], "5300.00");
        assert_eq!(rows[2]["penaltyAmount"], "49.50");
    }

    struct FailingRecords;

    #[async_trait]
    impl LoanRecords for FailingRecords {
        async fn find_customer(&self, _: &str, _: &str, _: &str) -> Result<Option<Customer>> {
            Err(Error::internal("connection refused"))
        }
        async fn find_product_by_name(&self, _: &str) -> Result<Option<LoanProduct>> {
            Ok(None)
        }
        async fn find_product(&self, _: i64) -> Result<Option<LoanProduct>> {
            Ok(None)
        }
        async fn find_credit(&self, _: i64, _: i64) -> Result<Option<CustomerCredit>> {
            Ok(None)
        }
        async fn contracts_for_customer(
            &self,
            _: i64,
            _: ContractFilter,
        ) -> Result<Vec<LoanContract>> {
            Ok(Vec::new())
        }
        async fn repayment_plans(&self, _: i64, _: i32) -> Result<Vec<RepaymentPlan>> {
            Ok(Vec::new())
        }
        async fn overdue_records(&self, _: i64) -> Result<Vec<OverdueRecord>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_store_error_becomes_failure_payload() {
        let p = LoanCreditProvider::new(Arc::new(FailingRecords));
        let result = p.query_credit_limit("a", "b", "c", "d").await;
        assert_eq!(result["success"], false);
        assert!(result["message"]
            .as_str()
            .unwrap()
            .starts_with("query failed: internal error"));
    }

    #[test]
    fn test_tool_table() {
        let tools = provider().tools().unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "query_credit_limit",
                "query_loan_balance_by_product",
                "query_loan_balances_by_customer",
                "query_repayment_plans",
                "query_overdue_records",
            ]
        );
        assert_eq!(tools[0].arity(), 4);
        assert_eq!(tools[2].arity(), 3);
        assert_eq!(tools[0].params[3].name.as_deref(), Some("product_name"));
    }
}

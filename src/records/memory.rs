use super::{
    ContractFilter, ContractStatus, Customer, CustomerCredit, LoanContract, LoanProduct,
    LoanRecords, OverdueRecord, RepaymentPlan,
};
use crate::types::Result;
use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate};

pub const HOUSING_FUND_LOAN: &str = "Housing Provident Fund Loan";
pub const CONSUMER_LOAN: &str = "Personal Consumer Loan";
pub const BUSINESS_LOAN: &str = "Small Business Loan";

/// Immutable record set held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecords {
    customers: Vec<Customer>,
    products: Vec<LoanProduct>,
    credits: Vec<CustomerCredit>,
    contracts: Vec<LoanContract>,
    plans: Vec<RepaymentPlan>,
    overdue: Vec<OverdueRecord>,
}

impl InMemoryRecords {
    /// Demo data with repayment plans in the current calendar year.
    pub fn seeded() -> Self {
        Self::seeded_for_year(Local::now().year())
    }

    /// Demo data anchored on `year`.
    ///
    /// Zhang San holds a housing fund loan and a consumer loan; Li Si holds an
    /// active and a settled consumer loan with overdue history, plus unused
    /// business-loan credit.
    pub fn seeded_for_year(year: i32) -> Self {
        let customers = vec![
            customer(1, "Zhang San", "ID_CARD", "110101199001011234"),
            customer(2, "Li Si", "ID_CARD", "110101199102022345"),
        ];
        let products = vec![
            product(1, HOUSING_FUND_LOAN),
            product(2, CONSUMER_LOAN),
            product(3, BUSINESS_LOAN),
        ];
        let credits = vec![
            credit(1, 1, 80_000_000, 50_000_000),
            credit(1, 2, 20_000_000, 15_000_000),
            credit(2, 2, 10_000_000, 4_000_000),
            credit(2, 3, 30_000_000, 30_000_000),
        ];
        let contracts = vec![
            contract(1, 1, 1, 45_000_000, ContractStatus::Active),
            contract(2, 1, 2, 5_000_000, ContractStatus::Active),
            contract(3, 2, 2, 6_000_000, ContractStatus::Active),
            contract(4, 2, 2, 0, ContractStatus::Settled),
        ];

        let mut plans = Vec::new();
        for month in 1..=12u32 {
            let status = if month <= 6 { "PAID" } else { "PENDING" };
            plans.push(plan(
                1,
                day(year, month, 20),
                200_000,
                150_000 - i64::from(month) * 1_000,
                47_400_000 - i64::from(month) * 200_000,
                status,
            ));
            plans.push(plan(
                3,
                day(year, month, 15),
                500_000,
                30_000,
                12_000_000 - i64::from(month) * 500_000,
                status,
            ));
        }
        for month in [3u32, 6, 9, 12] {
            plans.push(plan(
                2,
                day(year, month, 10),
                1_250_000,
                75_000,
                6_250_000 - i64::from(month / 3) * 1_250_000,
                "PENDING",
            ));
        }
        plans.push(plan(1, day(year - 1, 12, 20), 200_000, 151_000, 47_600_000, "PAID"));
        plans.push(plan(4, day(year - 1, 11, 15), 100_000, 5_000, 0, "PAID"));

        let overdue = vec![
            overdue(3, day(year, 3, 15), 530_000, 200_000, 330_000, 4_950),
            overdue(3, day(year, 2, 15), 530_000, 0, 530_000, 12_000),
            overdue(3, day(year, 6, 15), 530_000, 530_000, 0, 0),
            overdue(4, day(year - 1, 11, 15), 100_000, 50_000, 50_000, 1_000),
        ];

        Self {
            customers,
            products,
            credits,
            contracts,
            plans,
            overdue,
        }
    }
}

#[async_trait]
impl LoanRecords for InMemoryRecords {
    async fn find_customer(
        &self,
        name: &str,
        id_type: &str,
        id_number: &str,
    ) -> Result<Option<Customer>> {
        Ok(self
            .customers
            .iter()
            .find(|c| c.name == name && c.id_type == id_type && c.id_number == id_number)
            .cloned())
    }

    async fn find_product_by_name(&self, product_name: &str) -> Result<Option<LoanProduct>> {
        Ok(self
            .products
            .iter()
            .find(|p| p.product_name == product_name)
            .cloned())
    }

    async fn find_product(&self, product_id: i64) -> Result<Option<LoanProduct>> {
        Ok(self.products.iter().find(|p| p.id == product_id).cloned())
    }

    async fn find_credit(
        &self,
        customer_id: i64,
        product_id: i64,
    ) -> Result<Option<CustomerCredit>> {
        Ok(self
            .credits
            .iter()
            .find(|c| c.customer_id == customer_id && c.product_id == product_id)
            .cloned())
    }

    async fn contracts_for_customer(
        &self,
        customer_id: i64,
        filter: ContractFilter,
    ) -> Result<Vec<LoanContract>> {
        Ok(self
            .contracts
            .iter()
            .filter(|c| c.customer_id == customer_id && filter.matches(c))
            .cloned()
            .collect())
    }

    async fn repayment_plans(&self, contract_id: i64, year: i32) -> Result<Vec<RepaymentPlan>> {
        Ok(self
            .plans
            .iter()
            .filter(|p| p.contract_id == contract_id && p.repayment_date.year() == year)
            .cloned()
            .collect())
    }

    async fn overdue_records(&self, contract_id: i64) -> Result<Vec<OverdueRecord>> {
        Ok(self
            .overdue
            .iter()
            .filter(|r| r.contract_id == contract_id)
            .cloned()
            .collect())
    }
}

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn customer(id: i64, name: &str, id_type: &str, id_number: &str) -> Customer {
    Customer {
        id,
        name: name.to_string(),
        id_type: id_type.to_string(),
        id_number: id_number.to_string(),
    }
}

fn product(id: i64, product_name: &str) -> LoanProduct {
    LoanProduct {
        id,
        product_name: product_name.to_string(),
    }
}

fn credit(
    customer_id: i64,
    product_id: i64,
    credit_limit: i64,
    available_limit: i64,
) -> CustomerCredit {
    CustomerCredit {
        customer_id,
        product_id,
        credit_limit,
        available_limit,
        status: "ACTIVE".to_string(),
    }
}

fn contract(
    id: i64,
    customer_id: i64,
    product_id: i64,
    loan_balance: i64,
    status: ContractStatus,
) -> LoanContract {
    LoanContract {
        id,
        customer_id,
        product_id,
        loan_balance,
        status,
    }
}

fn plan(
    contract_id: i64,
    repayment_date: NaiveDate,
    principal_amount: i64,
    interest_amount: i64,
    remaining_balance: i64,
    status: &str,
) -> RepaymentPlan {
    RepaymentPlan {
        contract_id,
        repayment_date,
        repayment_amount: principal_amount + interest_amount,
        interest_amount,
        principal_amount,
        remaining_balance,
        status: status.to_string(),
    }
}

fn overdue(
    contract_id: i64,
    overdue_date: NaiveDate,
    due_amount: i64,
    paid_amount: i64,
    overdue_amount: i64,
    penalty_amount: i64,
) -> OverdueRecord {
    OverdueRecord {
        contract_id,
        overdue_date,
        due_amount,
        paid_amount,
        overdue_amount,
        penalty_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_customer_lookup_requires_all_fields() {
        let records = InMemoryRecords::seeded_for_year(2025);
        let found = records
            .find_customer("Zhang San", "ID_CARD", "110101199001011234")
            .await
            .unwrap();
        assert_eq!(found.map(|c| c.id), Some(1));

        let wrong_type = records
            .find_customer("Zhang San", "PASSPORT", "110101199001011234")
            .await
            .unwrap();
        assert!(wrong_type.is_none());
    }

    #[tokio::test]
    async fn test_contract_filters() {
        let records = InMemoryRecords::seeded_for_year(2025);
        let all = records
            .contracts_for_customer(2, ContractFilter::default().product(2))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let active = records
            .contracts_for_customer(2, ContractFilter::active().product(2))
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, 3);
    }

    #[tokio::test]
    async fn test_plans_are_filtered_by_year() {
        let records = InMemoryRecords::seeded_for_year(2025);
        let plans = records.repayment_plans(1, 2025).await.unwrap();
        assert_eq!(plans.len(), 12);
        assert!(plans.iter().all(|p| p.repayment_date.year() == 2025));
        assert_eq!(records.repayment_plans(1, 2024).await.unwrap().len(), 1);
        assert!(records.repayment_plans(4, 2025).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seeded_uses_current_year() {
        let records = InMemoryRecords::seeded();
        let year = Local::now().year();
        assert!(!records.repayment_plans(1, year).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_product_lookup() {
        let records = InMemoryRecords::seeded_for_year(2025);
        let product = records.find_product_by_name(CONSUMER_LOAN).await.unwrap();
        assert_eq!(product.map(|p| p.id), Some(2));
        assert!(records.find_product(99).await.unwrap().is_none());
        assert!(records.find_credit(1, 3).await.unwrap().is_none());
    }
}

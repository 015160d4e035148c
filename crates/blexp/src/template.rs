use chrono::{DateTime, Utc};
use expensify_api_client::Expense;
use serde::{Deserialize, Serialize};

/// A named, reusable expense lacking only its creation time and tracking comment
///
/// Field names are accepted both in lower case and capitalized (`Merchant`, `Amount`...)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExpenseTemplate {
    #[serde(alias = "Merchant")]
    pub merchant: String,
    /// In the minor unit of `currency`
    #[serde(alias = "Amount")]
    pub amount: i64,
    #[serde(alias = "Currency")]
    pub currency: String,
    #[serde(alias = "Category")]
    pub category: String,
    #[serde(alias = "Tag", default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(alias = "Billable", default, skip_serializing_if = "Option::is_none")]
    pub billable: Option<bool>,
    #[serde(
        alias = "Reimbursable",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reimbursable: Option<bool>,
}

impl ExpenseTemplate {
    pub(crate) fn instantiate(&self, created: DateTime<Utc>, comment: String) -> Expense {
        Expense {
            merchant: self.merchant.clone(),
            created: Some(created),
            amount: self.amount,
            currency: self.currency.clone(),
            category: self.category.clone(),
            tag: self.tag.clone(),
            billable: self.billable,
            reimbursable: self.reimbursable,
            comment,
            external_id: None,
        }
    }
}

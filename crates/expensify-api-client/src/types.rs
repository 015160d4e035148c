use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Partner credentials of the Expensify Integration Server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Credentials {
    #[serde(rename = "partnerUserID")]
    pub partner_user_id: String,
    #[serde(rename = "partnerUserSecret")]
    pub partner_user_secret: String,
}

impl Credentials {
    pub fn new(partner_user_id: impl Into<String>, partner_user_secret: impl Into<String>) -> Self {
        Self {
            partner_user_id: partner_user_id.into(),
            partner_user_secret: partner_user_secret.into(),
        }
    }
}

/// An expense as sent to the `create` job.
///
/// `amount` is expressed in the minor unit of `currency` (cents for USD).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Expense {
    #[serde(default, deserialize_with = "null_as_default")]
    pub merchant: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "created_date"
    )]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reimbursable: Option<bool>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub comment: String,
    #[serde(
        rename = "externalID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub external_id: Option<String>,
}

/// The confirmation returned by Expensify for every created expense
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubmittedExpense {
    #[serde(flatten)]
    pub expense: Expense,
    #[serde(rename = "transactionID")]
    pub transaction_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobDescription<'a> {
    #[serde(rename = "type")]
    pub job_type: &'static str,
    pub credentials: &'a Credentials,
    pub input_settings: InputSettings<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InputSettings<'a> {
    #[serde(rename = "type")]
    pub input_type: &'static str,
    pub employee_email: &'a str,
    pub transaction_list: &'a [Expense],
}

impl<'a> JobDescription<'a> {
    pub fn create_expenses(
        credentials: &'a Credentials,
        employee_email: &'a str,
        expenses: &'a [Expense],
    ) -> Self {
        Self {
            job_type: "create",
            credentials,
            input_settings: InputSettings {
                input_type: "expenses",
                employee_email,
                transaction_list: expenses,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobResponse {
    pub response_code: i64,
    #[serde(default)]
    pub response_message: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transaction_list: Vec<SubmittedExpense>,
}

/// Expensify echoes fields it did not receive as `null`: read them as the default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Expensify only knows about calendar days: `created` travels as `YYYY-MM-DD`,
/// using the local date of the machine that prepared the expense.
mod created_date {
    use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(
        created: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match created {
            Some(dt) => serializer
                .serialize_str(&dt.with_timezone(&Local).format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let s: Option<String> = Option::deserialize(deserializer)?;
        s.map(|s| parse(&s).ok_or_else(|| D::Error::custom(format!("invalid date: {s}"))))
            .transpose()
    }

    fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(date) = NaiveDate::parse_from_str(s, FORMAT) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|ndt| Utc.from_utc_datetime(&ndt));
        }
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

mod audit;
mod blexp;
pub mod config;
pub mod errors;
mod template;

pub use crate::blexp::{Blexp, BlexpBuilder, COMMENT_PREFIX};
pub use audit::{AuditLog, LogAudit};
pub use config::Config;
pub use errors::{Error, Result};
pub use template::ExpenseTemplate;

pub use expensify_api_client;
pub use expensify_api_client::{
    Expense, HttpRequest, HttpResponse, SubmittedExpense, Transport, TransportError,
};

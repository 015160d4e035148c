use expensify_api_client::Expense;

/// Receives a trace of every operation attempted against Expensify.
///
/// Entries are recorded before the network call, so a failed submission still
/// leaves a trail.
pub trait AuditLog: Send + Sync {
    fn record(&self, op: &str, expense: &Expense);
}

/// [AuditLog] writing to the [log] facade at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAudit;

impl AuditLog for LogAudit {
    fn record(&self, op: &str, expense: &Expense) {
        log::info!("op={op} exp={}", serde_json::json!(expense));
    }
}

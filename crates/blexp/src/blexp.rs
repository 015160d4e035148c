use core::fmt;
use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;
use expensify_api_client::{
    Credentials, Expense, ExpensifyClient, HttpRequest, HttpResponse, SubmittedExpense, Transport,
    TransportError,
};

use crate::{
    audit::{AuditLog, LogAudit},
    config::Config,
    errors::{Error, Result},
    template::ExpenseTemplate,
};

/// Every prepared expense carries a comment starting with this prefix
pub const COMMENT_PREFIX: &str = "blexp: ";

/// Turns named templates into expenses and submits them to Expensify
pub struct Blexp {
    user_email: String,
    primary: Option<String>,
    templates: BTreeMap<String, ExpenseTemplate>,
    client: ExpensifyClient,
    audit: Arc<dyn AuditLog>,
}

impl fmt::Debug for Blexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blexp")
            .field("user_email", &self.user_email)
            .field("primary", &self.primary)
            .field("templates", &self.templates)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

/// Collects the construction options of a [Blexp].
///
/// Nothing is validated until [BlexpBuilder::build], which checks the options in
/// order and stops at the first failure.
pub struct BlexpBuilder {
    credentials: Credentials,
    user_email: String,
    templates: BTreeMap<String, ExpenseTemplate>,
    primary: Option<String>,
    api_url: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    audit: Arc<dyn AuditLog>,
}

impl BlexpBuilder {
    pub fn new(user_id: impl Into<String>, user_secret: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(user_id, user_secret),
            user_email: String::new(),
            templates: BTreeMap::new(),
            primary: None,
            api_url: None,
            transport: None,
            audit: Arc::new(LogAudit),
        }
    }

    pub fn from_config(config: Config) -> Self {
        let Config {
            user_id,
            user_secret,
            user_email,
            primary,
            templates,
        } = config;
        Self::new(user_id, user_secret)
            .with_user_email(user_email)
            .with_templates(templates, primary)
    }

    pub fn with_user_email(mut self, user_email: impl Into<String>) -> Self {
        self.user_email = user_email.into();
        self
    }

    /// Use `templates`, `primary` being the one submitted when no name is given
    pub fn with_templates<I>(mut self, templates: I, primary: Option<String>) -> Self
    where
        I: IntoIterator<Item = (String, ExpenseTemplate)>,
    {
        self.templates = templates.into_iter().collect();
        self.primary = primary;
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn with_transport_fn<F>(self, f: F) -> Self
    where
        F: Fn(HttpRequest) -> core::result::Result<HttpResponse, TransportError>
            + Send
            + Sync
            + 'static,
    {
        self.with_transport(f)
    }

    pub fn with_audit(mut self, audit: impl AuditLog + 'static) -> Self {
        self.audit = Arc::new(audit);
        self
    }

    pub fn build(self) -> Result<Blexp> {
        let mut client = ExpensifyClient::new(self.credentials)?;
        if let Some(api_url) = self.api_url {
            client = client.with_api_url(api_url);
        }
        if let Some(transport) = self.transport {
            client = client.with_shared_transport(transport);
        }

        if self.templates.is_empty() {
            return Err(Error::NoTemplates);
        }
        if let Some(primary) = &self.primary {
            if !self.templates.contains_key(primary) {
                return Err(Error::PrimaryTemplateNotFound(primary.clone()));
            }
        }

        Ok(Blexp {
            user_email: self.user_email,
            primary: self.primary,
            templates: self.templates,
            client,
            audit: self.audit,
        })
    }
}

impl Blexp {
    pub fn builder(user_id: impl Into<String>, user_secret: impl Into<String>) -> BlexpBuilder {
        BlexpBuilder::new(user_id, user_secret)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        BlexpBuilder::from_config(config).build()
    }

    pub fn user_email(&self) -> &str {
        &self.user_email
    }

    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    pub fn templates(&self) -> &BTreeMap<String, ExpenseTemplate> {
        &self.templates
    }

    pub fn template(&self, name: &str) -> Option<&ExpenseTemplate> {
        self.templates.get(name)
    }

    /// Create an expense from the template `name`, ready for submission.
    ///
    /// The expense is dated now and carries a fresh `blexp: xxxxxxxx` comment.
    pub fn prepare(&self, name: &str) -> Result<Expense> {
        let template = self
            .template(name)
            .ok_or_else(|| Error::TemplateNotFound(name.to_owned()))?;
        let id = uuid::Uuid::new_v4().to_string();
        // First group of the hyphenated form: 8 hex characters
        let token = id.split('-').next().unwrap_or(&id);
        Ok(template.instantiate(Utc::now(), format!("{COMMENT_PREFIX}{token}")))
    }

    /// Submit a prepared expense, expecting exactly one confirmation back
    pub fn submit(&self, expense: &Expense) -> Result<SubmittedExpense> {
        self.audit.record("submit", expense);
        let mut submitted = self
            .client
            .create_expenses(&self.user_email, core::slice::from_ref(expense))?;
        if submitted.len() > 1 {
            return Err(Error::AmbiguousConfirmation(submitted.len()));
        }
        submitted.pop().ok_or(Error::NoConfirmationReturned)
    }

    pub fn submit_named(&self, name: &str) -> Result<SubmittedExpense> {
        self.submit(&self.prepare(name)?)
    }

    pub fn submit_primary(&self) -> Result<SubmittedExpense> {
        let primary = self.primary().ok_or(Error::NoPrimaryTemplate)?;
        self.submit_named(primary)
    }
}

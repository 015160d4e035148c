use core::fmt;
use std::{collections::HashMap, sync::Arc};

use crate::{
    errors::{Error, Result},
    transport::{
        HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError, DEFAULT_API_URL,
    },
    types::{Credentials, Expense, JobDescription, JobResponse, SubmittedExpense},
};

const JOB_DESCRIPTION_FIELD: &str = "requestJobDescription";

#[derive(Clone)]
pub struct ExpensifyClient {
    credentials: Credentials,
    api_url: Arc<str>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for ExpensifyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpensifyClient")
            .field("partner_user_id", &self.credentials.partner_user_id)
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

fn response_to_job(response: HttpResponse) -> Result<JobResponse> {
    log::debug!("status={} body_str={}", response.status, response.body);
    if response.is_error() {
        let mut error_body: HashMap<String, serde_json::Value> =
            serde_json::from_str(&response.body).unwrap_or_default();
        let message = match error_body.remove("responseMessage") {
            Some(serde_json::Value::String(message)) => message,
            _ => response.body,
        };
        return Err(Error::ApiErrorResponse {
            code: response.status.into(),
            message,
        });
    }
    let job: JobResponse = serde_json::from_str(&response.body)?;
    if job.response_code != 200 {
        log::debug!("Job failed with responseCode={}", job.response_code);
        return Err(Error::ApiErrorResponse {
            code: job.response_code,
            message: job.response_message.unwrap_or_default(),
        });
    }
    Ok(job)
}

impl ExpensifyClient {
    pub fn new(credentials: Credentials) -> Result<Self> {
        if credentials.partner_user_id.is_empty() || credentials.partner_user_secret.is_empty() {
            return Err(Error::MissingCredentials);
        }
        Ok(Self {
            credentials,
            api_url: DEFAULT_API_URL.into(),
            transport: Arc::new(ReqwestTransport::new()),
        })
    }

    /// Replace the outbound [Transport] used for every API call
    pub fn with_transport(self, transport: impl Transport + 'static) -> Self {
        self.with_shared_transport(Arc::new(transport))
    }

    pub fn with_shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replace the outbound transport with a plain function, handy for
    /// in-process fakes
    pub fn with_transport_fn<F>(self, f: F) -> Self
    where
        F: Fn(HttpRequest) -> core::result::Result<HttpResponse, TransportError>
            + Send
            + Sync
            + 'static,
    {
        self.with_transport(f)
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().into();
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn api_call(&self, job: &JobDescription) -> Result<JobResponse> {
        // The job embeds the credentials, never log it
        let job_str = serde_json::to_string(job).map_err(Error::generic)?;
        log::debug!("Initiating {} job on {}", job.job_type, self.api_url);
        let request = HttpRequest {
            url: self.api_url.to_string(),
            form: vec![(JOB_DESCRIPTION_FIELD.to_owned(), job_str)],
        };
        response_to_job(self.transport.round_trip(request)?)
    }

    /// Create `expenses` in the account of `employee_email`.
    ///
    /// Returns the confirmations exactly as Expensify listed them, in order.
    pub fn create_expenses(
        &self,
        employee_email: &str,
        expenses: &[Expense],
    ) -> Result<Vec<SubmittedExpense>> {
        let job = JobDescription::create_expenses(&self.credentials, employee_email, expenses);
        Ok(self.api_call(&job)?.transaction_list)
    }
}

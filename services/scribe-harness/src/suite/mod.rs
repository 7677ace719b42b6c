//! The API suite: cucumber world and step definitions

mod articles;
mod categories;
mod users;

use cucumber::{then, World};
use once_cell::sync::OnceCell;
use request_capture::validate::{expect_any_error_message, expect_field, expect_status};
use request_capture::{ApiRequest, ApiResponse, EvidenceCollector, HttpSender, ReqwestSender};
use scribe_core::{Result, ScenarioContext, ScribeError};
use scribe_harness::{HarnessConfig, ScenarioWorld};
use std::fmt;

static SUITE_CONFIG: OnceCell<HarnessConfig> = OnceCell::new();

/// Configuration every world of this run reads. Only the first call counts.
pub fn configure(config: HarnessConfig) {
    let _ = SUITE_CONFIG.set(config);
}

fn suite_config() -> &'static HarnessConfig {
    SUITE_CONFIG.get_or_init(HarnessConfig::default)
}

#[derive(World)]
#[world(init = Self::new)]
pub struct ApiWorld {
    context: ScenarioContext,
    api: EvidenceCollector<ReqwestSender>,
    last: Option<ApiResponse>,
}

impl fmt::Debug for ApiWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiWorld")
            .field("context", &self.context)
            .field("base_url", &self.api.base_url())
            .field("last", &self.last)
            .finish()
    }
}

impl ApiWorld {
    fn new() -> Self {
        let base_url = suite_config().api_base_url.clone();
        let context = ScenarioContext::new();
        let api = EvidenceCollector::new(ReqwestSender::new(base_url), context.evidence_log());
        Self {
            context,
            api,
            last: None,
        }
    }

    async fn send(&mut self, request: ApiRequest) -> Result<&ApiResponse> {
        let response = self.api.send(&request).await?;
        Ok(&*self.last.insert(response))
    }

    fn last(&self) -> Result<&ApiResponse> {
        self.last.as_ref().ok_or_else(|| ScribeError::ValidationFailed {
            reason: "no request was sent in this scenario".to_string(),
        })
    }

    /// Clone of the last response with mutable access to the context, for
    /// the validation helpers.
    fn checked(&mut self) -> Result<(ApiResponse, &mut ScenarioContext)> {
        let response = self.last()?.clone();
        Ok((response, &mut self.context))
    }

    fn token(&self) -> Result<String> {
        self.context
            .identities()
            .token
            .token
            .clone()
            .ok_or_else(|| ScribeError::ValidationFailed {
                reason: "no token stored; log in first".to_string(),
            })
    }
}

impl ScenarioWorld for ApiWorld {
    fn context_mut(&mut self) -> &mut ScenarioContext {
        &mut self.context
    }
}

#[then(expr = "the API should answer with status {int}")]
async fn then_status(world: &mut ApiWorld, status: u16) -> Result<()> {
    let (response, ctx) = world.checked()?;
    expect_status(ctx, &response, status)
}

#[then(expr = "any of these error messages should be returned: {string}")]
async fn then_error_message(world: &mut ApiWorld, expected: String) -> Result<()> {
    let (response, ctx) = world.checked()?;
    expect_any_error_message(ctx, &response, &expected).map(|_| ())
}

#[then(expr = "the response field {string} should be {string}")]
async fn then_field(world: &mut ApiWorld, path: String, expected: String) -> Result<()> {
    let (response, ctx) = world.checked()?;
    expect_field(ctx, &response, &path, &expected)
}

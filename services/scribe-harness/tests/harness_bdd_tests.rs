//! BDD Tests for Scribe Harness
//!
//! Runs `tests/features` through the harness runner against a mock API, then
//! checks the run summary, the run report, the evidence and the log files.

use cucumber::{then, when, World};
use evidence_renderer::docx::{read_package, DOCUMENT_PART};
use evidence_renderer::{write_default_template, EvidenceFormat};
use once_cell::sync::OnceCell;
use request_capture::validate::expect_status;
use request_capture::{ApiRequest, ApiResponse, EvidenceCollector, HttpSender, ReqwestSender};
use rust_xlsxwriter::Workbook;
use scribe_core::{Result, ScenarioContext};
use scribe_harness::logs::init_logging;
use scribe_harness::{run_features, HarnessConfig, RunReport, ScenarioWorld, SuiteHooks};
use serde_json::json;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static BASE_URL: OnceCell<String> = OnceCell::new();

const LOGIN_TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJ1LTEifQ.signature";

#[derive(World)]
#[world(init = Self::new)]
struct HarnessWorld {
    context: ScenarioContext,
    api: EvidenceCollector<ReqwestSender>,
    last: Option<ApiResponse>,
}

impl fmt::Debug for HarnessWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarnessWorld")
            .field("context", &self.context)
            .field("last", &self.last)
            .finish()
    }
}

impl HarnessWorld {
    fn new() -> Self {
        let context = ScenarioContext::new();
        let base_url = BASE_URL.get().cloned().expect("mock server started");
        let api = EvidenceCollector::new(ReqwestSender::new(base_url), context.evidence_log());
        Self {
            context,
            api,
            last: None,
        }
    }
}

impl ScenarioWorld for HarnessWorld {
    fn context_mut(&mut self) -> &mut ScenarioContext {
        &mut self.context
    }
}

#[when("I log in with the fixture credentials")]
async fn when_login(world: &mut HarnessWorld) -> Result<()> {
    let fixture = world.context.fixture().cloned().expect("fixture loaded");
    let request = ApiRequest::post("/auth/login")
        .json(&json!({ "email": fixture.email(), "senha": fixture.password() }));
    world.last = Some(world.api.send(&request).await?);
    Ok(())
}

#[when("I check the API health")]
async fn when_health(world: &mut HarnessWorld) -> Result<()> {
    world.last = Some(world.api.send(&ApiRequest::get("/health")).await?);
    Ok(())
}

#[then(expr = "the API should answer with status {int}")]
async fn then_status(world: &mut HarnessWorld, status: u16) -> Result<()> {
    let response = world.last.clone().expect("request sent");
    expect_status(&mut world.context, &response, status)
}

#[then(expr = "the fixture email is {string}")]
async fn then_fixture_email(world: &mut HarnessWorld, email: String) {
    assert_eq!(world.context.fixture().unwrap().email(), email);
}

#[then(expr = "the fixture user id is {string}")]
async fn then_fixture_user_id(world: &mut HarnessWorld, id: String) {
    assert_eq!(world.context.fixture().unwrap().user_id(), id);
}

fn write_workbook(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("TBL_CENARIOS").unwrap();
    for (col, header) in ["ID_CENARIO", "EMAIL", "SENHA", "ID", "ID_MASSA"]
        .iter()
        .enumerate()
    {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    for (col, cell) in ["CT-1001", "a@x.com", "Secret1", "u-1", ""].iter().enumerate() {
        sheet.write_string(1, col as u16, *cell).unwrap();
    }
    workbook.save(path).unwrap();
}

async fn start_api() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "email": "a@x.com", "senha": "Secret1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": LOGIN_TOKEN,
            "user": { "id": "u-1" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    server
}

fn document_xml(docx: &Path) -> String {
    let parts = read_package(docx).unwrap();
    let (_, bytes) = parts
        .into_iter()
        .find(|(name, _)| name == DOCUMENT_PART)
        .unwrap();
    String::from_utf8(bytes).unwrap()
}

#[tokio::main]
async fn main() {
    let root = TempDir::new().unwrap();
    let workbook = root.path().join("resources/MassaDadosCMS.xlsx");
    let template = root.path().join("resources/evidence-template.docx");
    fs::create_dir_all(workbook.parent().unwrap()).unwrap();
    write_workbook(&workbook);
    write_default_template(&template).unwrap();

    let server = start_api().await;
    BASE_URL.set(server.uri()).unwrap();

    let config = HarnessConfig::default()
        .with_api_base_url(server.uri())
        .with_output_root(root.path())
        .with_fixture_workbook(&workbook)
        .with_evidence_template(&template)
        .with_evidence_formats(vec![EvidenceFormat::Docx, EvidenceFormat::Pdf])
        .with_max_concurrent_scenarios(2)
        .with_project_name("Scribe harness tests");
    init_logging(&config.log_dir());

    let hooks = Arc::new(SuiteHooks::new(config));
    let result = run_features::<HarnessWorld>(Arc::clone(&hooks), "tests/features")
        .await
        .unwrap();

    assert_eq!(result.summary.passed, 2, "passed scenarios");
    assert_eq!(result.summary.failed, 2, "failed scenarios");
    assert_eq!(result.summary.features, 1);

    let report_path = result.report_path.clone().expect("report renamed");
    assert!(!root.path().join("target/reports/reports.json").exists());
    let report = RunReport::read(&report_path).unwrap();
    assert_eq!(report.scenarios.len(), 4);

    let failed = report
        .scenarios
        .iter()
        .find(|s| s.scenario == "Login answers with an unexpected status")
        .unwrap();
    assert_eq!(failed.tag, "CT-1001");
    assert_eq!(failed.status, "FAILED");
    assert_eq!(failed.attachments.len(), 2);
    let docx = failed
        .attachments
        .iter()
        .find(|a| a.path.extension().is_some_and(|e| e == "docx"))
        .unwrap();
    assert_eq!(docx.decode().unwrap(), fs::read(&docx.path).unwrap());
    let xml = document_xml(&docx.path);
    assert!(xml.contains("FF0000"));
    assert!(xml.contains("Validation failed. Actual status: 200"));
    assert!(xml.contains("Status code mismatch: expected 201, actual 200"));
    assert!(xml.contains("eyJhbGciOiJIUzI..."));
    assert!(!xml.contains(LOGIN_TOKEN), "full token embedded in DOCX");
    assert!(!failed.failure.as_deref().unwrap().contains(LOGIN_TOKEN));

    let fatal = report.scenarios.iter().find(|s| s.tag == "CT-9999").unwrap();
    assert_eq!(fatal.status, "FAILED");
    assert!(fatal.failure.as_deref().unwrap().contains("CT-9999"));

    let untagged = report
        .scenarios
        .iter()
        .find(|s| s.tag == "CT-UNDEFINED")
        .unwrap();
    assert!(untagged.passed());
    assert_eq!(untagged.classification.as_deref(), Some("Health"));

    let ids: Vec<&str> = report.scenarios.iter().map(|s| s.feature_id.as_str()).collect();
    assert!(ids.iter().all(|id| *id == ids[0]));
    assert!(report
        .scenarios
        .iter()
        .all(|s| s.feature == "Scenario lifecycle"));

    let automation_log = result
        .merged_logs
        .iter()
        .find(|p| {
            p.file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with("automation-"))
        })
        .expect("automation log consolidated");
    let narrative = fs::read_to_string(automation_log).unwrap();
    assert!(narrative.contains("Feature: Scenario lifecycle"));
    assert!(narrative.contains("PASSED"));
    assert!(narrative.contains("FAILED"));
    assert!(!narrative.contains("Secret1"));
    assert!(!narrative.contains(LOGIN_TOKEN));
    assert!(!narrative.contains("a@x.com"));

    assert!(hooks.run().failed() == 2);
}

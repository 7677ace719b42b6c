//! Cucumber adapter
//!
//! Wires [`SuiteHooks`] into cucumber's `before` and `after` scenario hooks.
//! Cucumber runs the `after` hook for every scenario, including those whose
//! `before` hook or steps failed, so the context is always cleared.

use crate::hooks::{ScenarioInfo, SuiteHooks, SuiteReport};
use cucumber::codegen::WorldInventory;
use cucumber::event::ScenarioFinished;
use cucumber::{gherkin, World};
use scribe_core::{Result, ScenarioContext};
use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// A cucumber world that carries one scenario's context.
pub trait ScenarioWorld: World + Debug + WorldInventory {
    fn context_mut(&mut self) -> &mut ScenarioContext;
}

/// Tags visible to a scenario: its feature's, its rule's and its own.
pub fn scenario_info(
    feature: &gherkin::Feature,
    rule: Option<&gherkin::Rule>,
    scenario: &gherkin::Scenario,
) -> ScenarioInfo {
    let tags = feature
        .tags
        .iter()
        .chain(rule.into_iter().flat_map(|r| r.tags.iter()))
        .chain(scenario.tags.iter())
        .cloned()
        .collect();

    ScenarioInfo {
        feature_name: feature.name.clone(),
        feature_path: feature.path.clone(),
        scenario_name: scenario.name.clone(),
        tags,
    }
}

/// Whether cucumber reported the scenario as failed.
pub fn scenario_failed(event: &ScenarioFinished) -> bool {
    matches!(
        event,
        ScenarioFinished::BeforeHookFailed(..) | ScenarioFinished::StepFailed(..)
    )
}

/// Runs every feature under `features` with the suite hooks installed.
///
/// The suite is started before the first scenario and ended after the last;
/// the returned report carries the pass/fail summary.
pub async fn run_features<W: ScenarioWorld>(
    hooks: Arc<SuiteHooks>,
    features: impl AsRef<Path>,
) -> Result<SuiteReport> {
    hooks.on_suite_start()?;

    let before_hooks = Arc::clone(&hooks);
    let after_hooks = Arc::clone(&hooks);
    let max_concurrent = hooks.config().max_concurrent_scenarios;

    info!(
        features = %features.as_ref().display(),
        max_concurrent,
        "Running features"
    );

    W::cucumber()
        .max_concurrent_scenarios(max_concurrent)
        .before(move |feature, rule, scenario, world| {
            let hooks = Arc::clone(&before_hooks);
            Box::pin(async move {
                let info = scenario_info(feature, rule, scenario);
                if let Err(err) = hooks.on_scenario_start(world.context_mut(), &info) {
                    error!(scenario = %info.scenario_name, error = %err, "Scenario setup failed");
                    panic!("Scenario setup failed: {err}");
                }
            })
        })
        .after(move |feature, rule, scenario, event, world| {
            let hooks = Arc::clone(&after_hooks);
            Box::pin(async move {
                let info = scenario_info(feature, rule, scenario);
                let failed = scenario_failed(event);
                match world {
                    Some(world) => {
                        hooks.on_scenario_end(world.context_mut(), &info, failed);
                    }
                    None => {
                        hooks.on_scenario_end(&mut ScenarioContext::new(), &info, failed);
                    }
                }
            })
        })
        .run(features)
        .await;

    hooks.on_suite_end()
}

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use crawldash_core::{AppState, AppViewModel, Msg};
use crawldash_gateway::{CrawlerGateway, Dashboard, GatewaySettings, ReqwestGateway};
use crawldash_logging::{dash_info, dash_warn};

use crate::cli::{Command, Output, Plan};
use crate::config::AppConfig;
use crate::persistence::{load_view, save_view};
use crate::render::{render_detail, render_health, render_list};

/// Run one command against the configured service and print the result.
///
/// `state_dir` holds the saved view preferences.
pub(crate) async fn run(config: &AppConfig, state_dir: &Path, command: Command) -> Result<ExitCode> {
    let gateway = ReqwestGateway::new(GatewaySettings {
        base_url: config.api_url.clone(),
        ..GatewaySettings::default()
    })
    .context("failed to build HTTP client")?;
    dash_info!("Using crawler service at {}", gateway.base_url());

    let (text, failed) = run_with(Arc::new(gateway), config.page_size, state_dir, &command).await;
    print!("{text}");
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Returns the rendered output and whether an error was surfaced.
pub(crate) async fn run_with(
    gateway: Arc<dyn CrawlerGateway>,
    page_size: usize,
    state_dir: &Path,
    command: &Command,
) -> (String, bool) {
    let view = load_view(state_dir, page_size);
    let plan = command.plan(&view);

    let mut dashboard = Dashboard::new(gateway, AppState::with_view(view));
    execute(&mut dashboard, &plan).await;

    let model = dashboard.view();
    if let Some(error) = &model.error {
        dash_warn!("Command {:?} finished with error: {}", command, error);
    }
    save_view(state_dir, dashboard.state().view_state());

    // A detail request for an id the service does not know opens nothing.
    if let (Command::Show { id }, None, None) = (command, &model.detail, &model.error) {
        dash_warn!("Record {} not found", id);
        return (format!("Record {id} not found.\n"), true);
    }
    (render(plan.output, &model), model.error.is_some())
}

async fn execute(dashboard: &mut Dashboard, plan: &Plan) {
    for msg in &plan.view {
        dashboard.dispatch(msg.clone());
    }
    if plan.load {
        dashboard.run(Msg::RefreshRequested).await;
    }
    for msg in &plan.actions {
        dashboard.run(msg.clone()).await;
    }
}

fn render(output: Output, model: &AppViewModel) -> String {
    match (output, &model.detail) {
        (Output::Detail, Some(detail)) => render_detail(detail),
        (Output::Health, _) => render_health(model),
        _ => render_list(model),
    }
}

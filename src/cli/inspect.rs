// src/cli/inspect.rs
// Offline helpers: parameter reconciliation, highlighting, route resolution

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

use telescope_client::config::ClientConfig;
use telescope_client::highlight::Highlighter;
use telescope_client::models::{SavedView, Source};
use telescope_client::notify::TracingNotifier;
use telescope_client::query::RouteParams;
use telescope_client::router::{Navigation, Router};
use telescope_client::stores::SourceControls;

use super::{print_json, Cli};

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

pub fn run_params(query_string: &str, source: Option<&Path>, view: Option<&Path>) -> Result<()> {
    let config = ClientConfig::load();
    let source: Source = match source {
        Some(path) => read_json(path)?,
        None => Source::new("default"),
    };
    let view: Option<SavedView> = view.map(read_json::<SavedView>).transpose()?;

    let mut controls = SourceControls::new(config.time_zones(), Arc::new(TracingNotifier));
    controls.set_route(RouteParams::from_query_string(query_string));
    controls.init(Some(source), view)?;

    print_json(&json!({
        "columns": controls.parsed_columns()?,
        "route_query": controls.route_query(),
        "url": controls.route_query().to_query_string(),
        "data_request": controls.data_request_params(),
        "graph_request": controls.graph_request_params(),
        "view_params": controls.view_params(),
    }))
}

pub fn run_highlight(query: &str, raw_query: &str, value: Option<&str>) -> Result<()> {
    let highlighter = Highlighter::from_queries(query, raw_query);
    println!("keywords: {}", highlighter.keywords().join(", "));

    if let Some(raw) = value {
        let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        println!("{}", highlighter.highlight(&value));
    }
    Ok(())
}

pub async fn run_route(cli: &Cli, path: &str, offline: bool) -> Result<()> {
    let router = Router::new();
    let Some(matched) = router.resolve(path) else {
        bail!("no route matches '{}'", path);
    };
    println!("route: {}", matched.name);
    for (name, value) in &matched.params {
        println!("  {} = {}", name, value);
    }

    if offline {
        return Ok(());
    }

    let session = super::Session::open(cli).await?;
    let mut auth = session.auth_store();
    match router.guard(&mut auth, &matched).await {
        Navigation::Proceed => println!("navigation: proceed"),
        Navigation::Redirect(to) => println!("navigation: redirect to {} ({})", to, to.pattern()),
        Navigation::NotFound => println!("navigation: not found"),
    }
    Ok(())
}

// src/stores/source_controls.rs
// Query, time range and display state of the explore page

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::models::{SavedView, Source, ViewData};
use crate::notify::{Notification, Notifier};
use crate::query::flyql::{append_and, expression};
use crate::query::time::{DEFAULT_FROM, DEFAULT_TO};
use crate::query::{
    bool_from_str, column_names, parse_count, try_to_millis, QueryValue, RouteParams, TimeBound,
    CONTEXT_PREFIX,
};
use crate::timezones::TimeZones;

pub const DEFAULT_LIMIT: u32 = 50;
pub const DEFAULT_MAX_LINES: u32 = 0;
pub const DEFAULT_SHOW_GRAPH: bool = true;

/// Snapshot of everything the explore page sends to the backend
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    /// Slug of the source the state was built for
    pub source: Option<String>,
    /// Raw column list expression, e.g. `ts, level, message|upper as msg`
    pub columns: String,
    /// FlyQL filter
    pub query: String,
    /// Raw SQL-ish filter
    pub raw_query: String,
    pub from: TimeBound,
    pub to: TimeBound,
    pub time_zone: String,
    pub graph_group_by: String,
    pub show_graph: bool,
    pub limit: u32,
    pub max_lines: u32,
    pub context_columns: IndexMap<String, String>,
    pub view: Option<SavedView>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            source: None,
            columns: String::new(),
            query: String::new(),
            raw_query: String::new(),
            from: try_to_millis(DEFAULT_FROM),
            to: try_to_millis(DEFAULT_TO),
            time_zone: TimeZones::default().local().to_string(),
            graph_group_by: String::new(),
            show_graph: DEFAULT_SHOW_GRAPH,
            limit: DEFAULT_LIMIT,
            max_lines: DEFAULT_MAX_LINES,
            context_columns: IndexMap::new(),
            view: None,
        }
    }
}

/// Build a state from route parameters, a saved view and the source.
///
/// Each field takes the route value if present, then the view's stored
/// value, then a default. Context columns merge per key with the route
/// winning.
pub fn reconcile(route: &RouteParams, view: Option<&SavedView>, source: &Source, zones: &TimeZones) -> QueryState {
    let data = view.map(|v| &v.data);
    let stored = |f: fn(&ViewData) -> Option<String>| data.and_then(f);

    let columns = route
        .get("columns")
        .map(str::to_string)
        .or_else(|| stored(|d| d.columns.clone()))
        .unwrap_or_else(|| source.default_columns_expr());
    let query = route
        .get("query")
        .map(str::to_string)
        .or_else(|| stored(|d| d.query.clone()))
        .unwrap_or_default();
    let raw_query = route
        .get("raw_query")
        .map(str::to_string)
        .or_else(|| stored(|d| d.raw_query.clone()))
        .unwrap_or_default();

    let from = time_bound(route.get("from"), data.and_then(|d| d.from.clone()), DEFAULT_FROM);
    let to = time_bound(route.get("to"), data.and_then(|d| d.to.clone()), DEFAULT_TO);

    let time_zone = route
        .get("timeZone")
        .map(str::to_string)
        .or_else(|| stored(|d| d.time_zone.clone()))
        .map(|zone| zones.resolve(&zone))
        .unwrap_or_else(|| zones.local().to_string());

    let graph_group_by = route
        .get("graph_group_by")
        .map(str::to_string)
        .or_else(|| stored(|d| d.graph_group_by.clone()))
        .or_else(|| source.severity_column.clone())
        .unwrap_or_default();

    let show_graph = match route.get("show_graph") {
        Some(flag) => bool_from_str(flag, DEFAULT_SHOW_GRAPH),
        None => data.and_then(|d| d.show_graph).unwrap_or(DEFAULT_SHOW_GRAPH),
    };

    // a route count that does not parse keeps the default, it does not
    // fall through to the view
    let limit = match route.get("limit").filter(|v| !v.is_empty()) {
        Some(text) => parse_count(text).unwrap_or(DEFAULT_LIMIT),
        None => data.and_then(|d| d.limit).filter(|&n| n > 0).unwrap_or(DEFAULT_LIMIT),
    };
    let max_lines = match route.get("max_lines").filter(|v| !v.is_empty()) {
        Some(text) => parse_count(text).unwrap_or(DEFAULT_MAX_LINES),
        None => data.and_then(|d| d.max_lines).unwrap_or(DEFAULT_MAX_LINES),
    };

    let mut context_columns: IndexMap<String, String> = route
        .context_columns()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    if let Some(ctx) = data.and_then(|d| d.context_columns.as_ref()) {
        for (key, value) in ctx {
            context_columns
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    QueryState {
        source: Some(source.slug.clone()),
        columns,
        query,
        raw_query,
        from,
        to,
        time_zone,
        graph_group_by,
        show_graph,
        limit,
        max_lines,
        context_columns,
        view: view.cloned(),
    }
}

fn time_bound(route: Option<&str>, stored: Option<TimeBound>, default: &str) -> TimeBound {
    match (route, stored) {
        (Some(text), _) => try_to_millis(text),
        (None, Some(bound)) => bound.normalize(),
        (None, None) => try_to_millis(default),
    }
}

/// URL query projection of the state, in a stable key order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RouteQuery(IndexMap<String, Value>);

impl RouteQuery {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as `a=1&b=two` (form encoded, no leading `?`)
    pub fn to_query_string(&self) -> String {
        let mut out = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.0 {
            out.append_pair(key, &query_text(value));
        }
        out.finish()
    }

    /// Back to route parameters, e.g. to re-run [`reconcile`] after a navigation
    pub fn to_route_params(&self) -> RouteParams {
        self.0.iter().map(|(k, v)| (k.clone(), query_text(v))).collect()
    }
}

fn query_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Body of a log rows request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataRequestParams {
    pub columns: String,
    pub limit: u32,
    pub from: TimeBound,
    pub to: TimeBound,
    pub context_columns: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_query: Option<String>,
}

/// Body of a histogram request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphRequestParams {
    pub from: TimeBound,
    pub to: TimeBound,
    pub group_by: String,
    pub context_columns: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_query: Option<String>,
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// The explore page's query controls.
///
/// Holds the reconciled [`QueryState`] plus what is needed to rebuild it:
/// the current route parameters and the last source passed to
/// [`SourceControls::init`]. Projections are computed from the current state
/// on every call.
pub struct SourceControls {
    state: QueryState,
    source: Option<Source>,
    route: RouteParams,
    zones: TimeZones,
    notifier: Arc<dyn Notifier>,
}

impl SourceControls {
    pub fn new(zones: TimeZones, notifier: Arc<dyn Notifier>) -> Self {
        let state = QueryState {
            time_zone: zones.local().to_string(),
            ..Default::default()
        };
        Self {
            state,
            source: None,
            route: RouteParams::new(),
            zones,
            notifier,
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    pub fn route(&self) -> &RouteParams {
        &self.route
    }

    pub fn time_zones(&self) -> &TimeZones {
        &self.zones
    }

    /// Replace the route parameters used by the next [`SourceControls::init`]
    pub fn set_route(&mut self, route: RouteParams) {
        self.route = route;
    }

    /// Rebuild the state from the route, `view` and `source`. Without a
    /// source the previously stored one is reused.
    pub fn init(&mut self, source: Option<Source>, view: Option<SavedView>) -> Result<()> {
        if let Some(source) = source {
            self.source = Some(source);
        }
        let source = self.source.as_ref().ok_or(ClientError::SourceNotSet)?;

        self.state = reconcile(&self.route, view.as_ref(), source, &self.zones);
        debug!(
            source = %source.slug,
            view = ?self.state.view.as_ref().map(|v| &v.slug),
            limit = self.state.limit,
            "Query controls initialized"
        );
        Ok(())
    }

    /// Names of the selected columns, in order
    pub fn parsed_columns(&self) -> Result<Vec<String>> {
        column_names(&self.state.columns)
    }

    // ========================================================================
    // Projections
    // ========================================================================

    /// Parameters to mirror into the URL. Anything equal to the bound view's
    /// stored value is left out; context columns are compared per key.
    pub fn route_query(&self) -> RouteQuery {
        let s = &self.state;
        let mut params: IndexMap<String, Value> = IndexMap::new();
        params.insert("columns".into(), json!(s.columns));
        params.insert("limit".into(), json!(s.limit));
        params.insert("max_lines".into(), json!(s.max_lines));
        params.insert("from".into(), json!(s.from));
        params.insert("to".into(), json!(s.to));
        params.insert("timeZone".into(), json!(s.time_zone));
        params.insert("graph_group_by".into(), json!(s.graph_group_by));
        params.insert("show_graph".into(), json!(s.show_graph));
        if !s.query.is_empty() {
            params.insert("query".into(), json!(s.query));
        }
        if !s.raw_query.is_empty() {
            params.insert("raw_query".into(), json!(s.raw_query));
        }

        if let Some(view) = &s.view {
            params.insert("view".into(), json!(view.slug));
            let stored = serde_json::to_value(&view.data).unwrap_or(Value::Null);
            params.retain(|key, value| stored.get(key.as_str()) != Some(&*value));
        }

        for (key, value) in &s.context_columns {
            let same_as_view = s
                .view
                .as_ref()
                .is_some_and(|v| v.data.context_value(key) == Some(value.as_str()));
            if !same_as_view {
                params.insert(format!("{}{}", CONTEXT_PREFIX, key), json!(value));
            }
        }

        RouteQuery(params)
    }

    pub fn data_request_params(&self) -> DataRequestParams {
        let s = &self.state;
        DataRequestParams {
            columns: s.columns.clone(),
            limit: s.limit,
            from: s.from.clone(),
            to: s.to.clone(),
            context_columns: s.context_columns.clone(),
            query: non_empty(&s.query),
            raw_query: non_empty(&s.raw_query),
        }
    }

    pub fn graph_request_params(&self) -> GraphRequestParams {
        let s = &self.state;
        GraphRequestParams {
            from: s.from.clone(),
            to: s.to.clone(),
            group_by: s.graph_group_by.clone(),
            context_columns: s.context_columns.clone(),
            query: non_empty(&s.query),
            raw_query: non_empty(&s.raw_query),
        }
    }

    /// Full snapshot for saving the current state as a view
    pub fn view_params(&self) -> ViewData {
        let s = &self.state;
        ViewData {
            columns: Some(s.columns.clone()),
            query: Some(s.query.clone()),
            raw_query: Some(s.raw_query.clone()),
            from: Some(s.from.clone()),
            to: Some(s.to.clone()),
            time_zone: Some(s.time_zone.clone()),
            limit: Some(s.limit),
            max_lines: Some(s.max_lines),
            graph_group_by: Some(s.graph_group_by.clone()),
            show_graph: Some(s.show_graph),
            context_columns: Some(s.context_columns.clone()),
        }
    }

    // ========================================================================
    // Setters
    // ========================================================================

    /// Adopt a saved view, or reset everything when `None`.
    ///
    /// Fields the view does not store fall back to their defaults, except the
    /// time zone which older views lack: it is left as is.
    pub fn set_view(&mut self, view: Option<SavedView>) -> Result<()> {
        let Some(view) = view else {
            return self.reset_view();
        };

        let data = view.data.clone();
        let (default_columns, default_group_by) = match &self.source {
            Some(source) => (
                source.default_columns_expr(),
                source.severity_column.clone().unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        };

        self.set_columns(data.columns.unwrap_or(default_columns));
        self.set_query(data.query.unwrap_or_default());
        self.set_raw_query(data.raw_query.unwrap_or_default());
        self.set_from(data.from.unwrap_or_else(|| DEFAULT_FROM.into()));
        self.set_to(data.to.unwrap_or_else(|| DEFAULT_TO.into()));
        self.set_limit_value(data.limit.unwrap_or(DEFAULT_LIMIT));
        self.set_max_lines_value(data.max_lines.unwrap_or(DEFAULT_MAX_LINES));
        self.set_graph_group_by(data.graph_group_by.unwrap_or(default_group_by));
        self.set_show_graph(data.show_graph.unwrap_or(DEFAULT_SHOW_GRAPH));
        self.set_context_columns(data.context_columns.unwrap_or_default());
        if let Some(zone) = data.time_zone.as_deref() {
            self.set_time_zone(zone);
        }

        debug!(view = %view.slug, "Adopted saved view");
        self.state.view = Some(view);
        Ok(())
    }

    /// Drop the view and rebuild from the route and the stored source
    pub fn reset_view(&mut self) -> Result<()> {
        self.state = QueryState::default();
        self.init(None, None)
    }

    pub fn set_columns(&mut self, columns: impl Into<String>) {
        self.state.columns = columns.into();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.query = query.into();
    }

    pub fn set_raw_query(&mut self, raw_query: impl Into<String>) {
        self.state.raw_query = raw_query.into();
    }

    /// Set the row limit from user text. `None` restores the default;
    /// text that is not a count is ignored.
    pub fn set_limit(&mut self, value: Option<&str>) {
        match value {
            None => self.state.limit = DEFAULT_LIMIT,
            Some(text) => {
                if let Some(limit) = parse_count(text) {
                    self.state.limit = limit;
                }
            }
        }
    }

    pub fn set_limit_value(&mut self, limit: u32) {
        self.state.limit = limit;
    }

    /// Set the line clamp from user text. `None` means no clamp (0);
    /// text that is not a count is ignored.
    pub fn set_max_lines(&mut self, value: Option<&str>) {
        match value {
            None => self.state.max_lines = DEFAULT_MAX_LINES,
            Some(text) => {
                if let Some(max_lines) = parse_count(text) {
                    self.state.max_lines = max_lines;
                }
            }
        }
    }

    pub fn set_max_lines_value(&mut self, max_lines: u32) {
        self.state.max_lines = max_lines;
    }

    pub fn set_from(&mut self, from: impl Into<TimeBound>) {
        self.state.from = from.into().normalize();
    }

    pub fn set_to(&mut self, to: impl Into<TimeBound>) {
        self.state.to = to.into().normalize();
    }

    /// Unknown zones fall back to the local zone
    pub fn set_time_zone(&mut self, zone: &str) {
        self.state.time_zone = self.zones.resolve(zone);
    }

    pub fn set_graph_group_by(&mut self, column: impl Into<String>) {
        self.state.graph_group_by = column.into();
    }

    pub fn set_show_graph(&mut self, show: bool) {
        self.state.show_graph = show;
    }

    pub fn set_context_column(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.state.context_columns.insert(column.into(), value.into());
    }

    pub fn set_context_columns(&mut self, columns: IndexMap<String, String>) {
        self.state.context_columns = columns;
    }

    /// Append `column<operator>value` to the FlyQL query and tell the user
    pub fn add_query_expression(&mut self, column: &str, operator: &str, value: impl Into<QueryValue>) {
        let expr = expression(column, operator, &value.into());
        self.state.query = append_and(&self.state.query, &expr);
        debug!(query = %self.state.query, "Query expression added");
        self.notifier.notify(Notification::success("Query was updated"));
    }
}

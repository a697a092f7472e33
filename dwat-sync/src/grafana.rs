//! Grafana side: search listing and per-dashboard model fetch.
//!
//! Both read paths fail soft. A listing failure looks like an empty Grafana
//! and a fetch failure drops that one dashboard from the run; either way the
//! error is logged and nothing is written.

use serde::Deserialize;
use serde_json::Value;

use dwat_core::{DashboardSummary, RemoteDashboards, SyncConfig};

use crate::http;
use crate::SyncError;

/// Read access to a Grafana instance.
pub trait DashboardSource {
    /// Every hit of the folder/dashboard search, unfiltered. Single page.
    fn search(&self) -> Result<Vec<DashboardSummary>, SyncError>;

    /// The `dashboard` model for `uid`, without its `meta` envelope.
    fn dashboard(&self, uid: &str) -> Result<Value, SyncError>;
}

/// Blocking Grafana HTTP API client.
pub struct GrafanaClient {
    agent: ureq::Agent,
    base_url: String,
    authorization: String,
}

#[derive(Deserialize)]
struct DashboardResponse {
    #[serde(default = "empty_object")]
    dashboard: Value,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

impl GrafanaClient {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            agent: http::agent(config.timeout),
            base_url: http::trim_base(&config.grafana_url).to_string(),
            authorization: format!("Bearer {}", config.grafana_token),
        }
    }

    fn get(&self, url: &str) -> Result<ureq::Response, ureq::Error> {
        self.agent
            .get(url)
            .set("Authorization", &self.authorization)
            .set("Content-Type", "application/json")
            .call()
    }
}

impl DashboardSource for GrafanaClient {
    fn search(&self) -> Result<Vec<DashboardSummary>, SyncError> {
        let url = format!("{}/search", self.base_url);
        let hits: Vec<Value> = http::json(&url, self.get(&url))?;
        Ok(hits.into_iter().filter_map(parse_hit).collect())
    }

    fn dashboard(&self, uid: &str) -> Result<Value, SyncError> {
        let url = format!("{}/dashboards/uid/{uid}", self.base_url);
        let response: DashboardResponse = http::json(&url, self.get(&url))?;
        Ok(response.dashboard)
    }
}

/// One malformed hit is dropped on its own instead of failing the listing.
fn parse_hit(hit: Value) -> Option<DashboardSummary> {
    match serde_json::from_value(hit) {
        Ok(summary) => Some(summary),
        Err(err) => {
            tracing::warn!(error = %err, "skipping unreadable search hit");
            None
        }
    }
}

/// Tagged, non-folder dashboards keyed by uid, in search order.
///
/// Returns an empty listing if the search fails.
pub fn list_dashboards(source: &dyn DashboardSource) -> RemoteDashboards {
    let hits = match source.search() {
        Ok(hits) => hits,
        Err(err) => {
            tracing::error!(error = %err, "error fetching dashboards from Grafana");
            return RemoteDashboards::new();
        }
    };
    let total = hits.len();
    let dashboards: RemoteDashboards = hits.into_iter().filter(|h| h.is_syncable()).collect();
    tracing::debug!(total, syncable = dashboards.len(), "listed Grafana dashboards");
    dashboards
}

/// The full model for `uid`, or `None` (logged) if Grafana could not serve it.
pub fn fetch_definition(source: &dyn DashboardSource, uid: &str) -> Option<Value> {
    match source.dashboard(uid) {
        Ok(model) => Some(model),
        Err(err) => {
            tracing::error!(uid, error = %err, "error fetching model for dashboard");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::test_server::{closed_port_url, TestServer};
    use dwat_core::DashboardKind;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, ResponseTemplate};

    fn config(url: &str) -> SyncConfig {
        SyncConfig::new(url, "grafana-token", "gh-token", "acme/charts")
    }

    fn serve(server: &TestServer, route: &str, status: u16, body: Value) {
        server.mount(
            Mock::given(method("GET"))
                .and(path(route))
                .and(header("Authorization", "Bearer grafana-token"))
                .respond_with(ResponseTemplate::new(status).set_body_json(body)),
        );
    }

    #[test]
    fn search_keeps_only_tagged_dashboards() {
        let server = TestServer::start();
        serve(
            &server,
            "/api/search",
            200,
            json!([
                {"uid": "folder1", "title": "sync-folder", "type": "dash-folder", "tags": ["x"]},
                {"uid": "", "title": "no uid", "type": "dash-db", "tags": ["v1"]},
                {"uid": "untagged", "title": "untagged", "type": "dash-db", "tags": []},
                {"uid": "a", "title": "A", "type": "dash-db", "tags": ["v1"], "folderUid": "f1", "folderTitle": "Team"},
                {"uid": "b", "title": "B", "type": "dash-db", "tags": ["v2"]}
            ]),
        );

        let client = GrafanaClient::new(&config(&format!("{}/api/", server.uri())));
        let dashboards = list_dashboards(&client);

        assert_eq!(dashboards.uids(), vec!["a", "b"]);
        let a = dashboards.get("a").expect("a");
        assert_eq!(a.kind, DashboardKind::Dashboard);
        assert_eq!(a.folder_title.as_deref(), Some("Team"));

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.path(), "/api/search");
    }

    #[test]
    fn null_fields_drop_only_their_own_hit() {
        let server = TestServer::start();
        serve(
            &server,
            "/search",
            200,
            json!([
                {"uid": "odd", "title": "odd", "type": "dash-db", "tags": null},
                {"uid": "untitled", "title": null, "type": "dash-db", "tags": ["v1"]},
                {"uid": "broken", "title": "broken", "type": "dash-db", "tags": "v1"},
                {"uid": "a", "title": "A", "type": "dash-db", "tags": ["v1"]}
            ]),
        );

        let client = GrafanaClient::new(&config(&server.uri()));
        let dashboards = list_dashboards(&client);

        assert_eq!(dashboards.uids(), vec!["untitled", "a"]);
        assert_eq!(dashboards.get("untitled").expect("untitled").title, "");
    }

    #[test]
    fn search_failure_is_empty_listing() {
        let server = TestServer::start();
        serve(&server, "/search", 500, json!({"message": "boom"}));
        let client = GrafanaClient::new(&config(&server.uri()));

        let err = client.search().unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(list_dashboards(&client).is_empty());
    }

    #[test]
    fn unreachable_grafana_is_empty_listing() {
        let client = GrafanaClient::new(&config(&closed_port_url()));
        let err = client.search().unwrap_err();
        assert!(matches!(err, SyncError::Transport { .. }), "got: {err}");
        assert!(list_dashboards(&client).is_empty());
    }

    #[test]
    fn dashboard_returns_model_without_meta() {
        let server = TestServer::start();
        serve(
            &server,
            "/dashboards/uid/a",
            200,
            json!({
                "meta": {"version": 3, "canEdit": true},
                "dashboard": {"uid": "a", "title": "A", "panels": []}
            }),
        );
        let client = GrafanaClient::new(&config(&server.uri()));

        let model = fetch_definition(&client, "a").expect("model");
        assert_eq!(model, json!({"uid": "a", "title": "A", "panels": []}));
    }

    #[test]
    fn dashboard_without_model_field_is_empty_object() {
        let server = TestServer::start();
        serve(&server, "/dashboards/uid/a", 200, json!({"meta": {}}));
        let client = GrafanaClient::new(&config(&server.uri()));
        assert_eq!(client.dashboard("a").expect("model"), json!({}));
    }

    #[test]
    fn dashboard_not_found_is_none() {
        let server = TestServer::start();
        serve(
            &server,
            "/dashboards/uid/gone",
            404,
            json!({"message": "Dashboard not found"}),
        );
        let client = GrafanaClient::new(&config(&server.uri()));
        assert!(fetch_definition(&client, "gone").is_none());
    }
}

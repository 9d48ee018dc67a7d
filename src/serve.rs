//! HTTP server for the dashboard
//!
//! `overdash serve` → loads the datasets, serves the page and its callbacks.
//! Requests are handled one at a time; the dashboard is read-only.

use crate::binding::{Bindings, Update};
use crate::chart::ChartKind;
use crate::dashboard::Dashboard;
use crate::filter::Filter;
use crate::page::{self, PageMode};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Request, Response, Server};

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Query string for `/api/select`
#[derive(Debug, Deserialize)]
struct SelectQuery {
    value: String,
}

/// Query string for the chart endpoints
#[derive(Debug, Default, Deserialize)]
struct FilterQuery {
    drug: Option<String>,
    race: Option<String>,
    place: Option<String>,
}

impl FilterQuery {
    fn into_filter(self) -> Filter {
        let mut filter = Filter::drug(self.drug.as_deref().unwrap_or_default());
        if let Some(race) = self.race.as_deref() {
            filter = filter.with_race(race);
        }
        if let Some(place) = self.place.as_deref() {
            filter = filter.with_place(place);
        }
        filter
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct Summary {
    total_deaths: usize,
    drugs: Vec<DrugCount>,
}

#[derive(Debug, Serialize, PartialEq)]
struct DrugCount {
    drug: String,
    deaths: usize,
}

/// A response ready to send: status, content type, body
#[derive(Debug, PartialEq)]
struct Reply {
    status: u16,
    content_type: &'static str,
    body: String,
}

impl Reply {
    fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body,
        }
    }

    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self {
                status,
                content_type: "application/json",
                body,
            },
            Err(e) => Self::error(500, format!("Failed to serialize response: {}", e)),
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::warn!(status, error = %message, "request failed");
        Self {
            status,
            content_type: "application/json",
            body: serde_json::to_string(&ApiResponse::failure(message))
                .unwrap_or_else(|_| r#"{"ok":false,"data":null,"error":"internal error"}"#.to_string()),
        }
    }

    fn not_found() -> Self {
        Self {
            status: 404,
            content_type: "text/plain",
            body: "Not found".to_string(),
        }
    }
}

/// Start the dashboard server
pub fn start_dashboard_server(dashboard: Dashboard, host: &str, port: u16) -> std::io::Result<()> {
    let addr = format!("{}:{}", host, port);
    let server = Server::http(&addr)
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let bindings = Bindings::default();

    eprintln!("\n{}", "Overdash".green().bold());
    eprintln!("   Dashboard: http://{}", addr);
    eprintln!("   Deaths loaded: {}", dashboard.total_deaths());
    eprintln!("   Press Ctrl+C to stop\n");
    tracing::info!(%addr, "dashboard server listening");

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &dashboard, &bindings) {
            tracing::error!(error = %e, "failed to send response");
        }
    }

    Ok(())
}

fn handle_request(request: Request, dashboard: &Dashboard, bindings: &Bindings) -> std::io::Result<()> {
    let reply = if request.method() == &Method::Get {
        route(request.url(), dashboard, bindings)
    } else {
        Reply::not_found()
    };
    tracing::debug!(method = %request.method(), url = request.url(), status = reply.status, "request");

    let content_type = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes())
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidData, "invalid header"))?;
    let response = Response::from_string(reply.body)
        .with_status_code(reply.status)
        .with_header(content_type);
    request.respond(response)
}

/// Resolve a GET url to a reply
fn route(url: &str, dashboard: &Dashboard, bindings: &Bindings) -> Reply {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));

    match path {
        // Dashboard page
        "/" => match page::render(dashboard, PageMode::Live) {
            Ok(html) => Reply::html(html),
            Err(e) => Reply::error(500, e.to_string()),
        },

        // Pre-rendered combination chart, verbatim
        "/combination" => match dashboard.combination_chart() {
            Some(document) => Reply::html(document.to_string()),
            None => Reply::not_found(),
        },

        // API: selector changed, recompute every bound output
        "/api/select" => match serde_urlencoded::from_str::<SelectQuery>(query) {
            Ok(q) => {
                let updates: Vec<Update> = bindings.dispatch(dashboard, &q.value);
                Reply::json(200, &ApiResponse::success(updates))
            }
            Err(e) => Reply::error(400, format!("Invalid query: {}", e)),
        },

        // API: dropdown options
        "/api/drugs" => {
            let drugs: Vec<&str> = dashboard.descriptions().keys().collect();
            Reply::json(200, &ApiResponse::success(drugs))
        }

        // API: total and per-drug death counts
        "/api/summary" => Reply::json(200, &ApiResponse::success(summary(dashboard))),

        // API: chart specifications
        "/api/charts/demographics" => chart_reply(ChartKind::Demographics, query, dashboard),
        "/api/charts/race" => chart_reply(ChartKind::Race, query, dashboard),

        _ => Reply::not_found(),
    }
}

fn chart_reply(kind: ChartKind, query: &str, dashboard: &Dashboard) -> Reply {
    let filter: Filter = match serde_urlencoded::from_str::<FilterQuery>(query) {
        Ok(q) => q.into_filter(),
        Err(e) => return Reply::error(400, format!("Invalid query: {}", e)),
    };

    match kind.build(dashboard.overdoses(), &filter, dashboard.theme()) {
        Ok(spec) => Reply::json(200, &spec),
        Err(e) => Reply::error(400, e.to_string()),
    }
}

fn summary(dashboard: &Dashboard) -> Summary {
    Summary {
        total_deaths: dashboard.total_deaths(),
        drugs: dashboard
            .overdoses()
            .involvement_counts()
            .into_iter()
            .map(|(drug, deaths)| DrugCount { drug, deaths })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::tests::sample;

    fn get(url: &str) -> Reply {
        route(url, &sample(), &Bindings::default())
    }

    fn body(reply: &Reply) -> serde_json::Value {
        serde_json::from_str(&reply.body).unwrap()
    }

    // === ApiResponse Tests ===

    #[test]
    fn test_api_response_success() {
        let response: ApiResponse<String> = ApiResponse::success("hello".to_string());
        assert!(response.ok);
        assert_eq!(response.data, Some("hello".to_string()));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_api_response_serializes_to_json() {
        let json = serde_json::to_string(&ApiResponse::failure("boom")).unwrap();
        assert!(json.contains("\"ok\":false"));
        assert!(json.contains("\"data\":null"));
        assert!(json.contains("\"error\":\"boom\""));
    }

    // === Routing Tests ===

    #[test]
    fn test_index_serves_page() {
        let reply = get("/");
        assert_eq!(reply.status, 200);
        assert!(reply.content_type.starts_with("text/html"));
        assert!(reply.body.contains("<h1>Overdash</h1>"));
    }

    #[test]
    fn test_select_returns_five_updates() {
        let reply = get("/api/select?value=Cocaine");
        assert_eq!(reply.status, 200);
        let json = body(&reply);
        assert_eq!(json["ok"], true);
        let updates = json["data"].as_array().unwrap();
        assert_eq!(updates.len(), 5);
        assert_eq!(updates[0]["id"], "drug_img");
        assert_eq!(updates[0]["value"], "https://img.example/cocaine.png");
        assert_eq!(updates[2]["property"], "href");
    }

    #[test]
    fn test_select_decodes_value() {
        let json = body(&get("/api/select?value=Every%20thing"));
        let updates = json["data"].as_array().unwrap();
        assert!(updates.iter().all(|u| u["error"].is_string()));
    }

    #[test]
    fn test_select_trims_value() {
        let json = body(&get("/api/select?value=%20Heroin"));
        let updates = json["data"].as_array().unwrap();
        assert!(updates.iter().all(|u| u["error"].is_null()));
        assert_eq!(updates[0]["value"], "https://img.example/heroin.png");
    }

    #[test]
    fn test_select_requires_value() {
        let reply = get("/api/select");
        assert_eq!(reply.status, 400);
        assert_eq!(body(&reply)["ok"], false);
    }

    #[test]
    fn test_drugs_lists_description_keys() {
        let json = body(&get("/api/drugs"));
        assert_eq!(json["data"], serde_json::json!(["Heroin", "Cocaine", "Everything"]));
    }

    #[test]
    fn test_summary() {
        let json = body(&get("/api/summary"));
        assert_eq!(json["data"]["total_deaths"], 3);
        assert_eq!(json["data"]["drugs"][0]["drug"], "Heroin");
        assert_eq!(json["data"]["drugs"][0]["deaths"], 2);
    }

    #[test]
    fn test_chart_endpoints() {
        let reply = get("/api/charts/race?drug=Heroin&place=Hospital");
        assert_eq!(reply.status, 200);
        let json = body(&reply);
        assert_eq!(json["title"], "Race distribution for Heroin (Hospital)");

        let json = body(&get("/api/charts/demographics"));
        assert_eq!(json["hconcat"][0]["title"], "Age distribution for Everything");
    }

    #[test]
    fn test_chart_unknown_drug_is_bad_request() {
        let reply = get("/api/charts/race?drug=Kratom");
        assert_eq!(reply.status, 400);
        assert!(body(&reply)["error"].as_str().unwrap().contains("Kratom"));
    }

    #[test]
    fn test_combination_chart_route() {
        assert_eq!(get("/combination").status, 404);

        let dashboard = sample().with_combination_chart(Some("<html>combo</html>".into()));
        let reply = route("/combination", &dashboard, &Bindings::default());
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, "<html>combo</html>");
    }

    #[test]
    fn test_unknown_route() {
        assert_eq!(get("/nope").status, 404);
    }
}

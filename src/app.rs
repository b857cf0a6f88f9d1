use std::net::SocketAddr;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::state::AppState;
use crate::{meals, profile, session, tasks};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1",
              Router::new()
                  .merge(meals::router())
                  .merge(tasks::router())
                  .merge(session::router())
                  .merge(profile::router())
                  .route("/health", get(|| async { "ok" }))
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
        .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::span;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Collects every value recorded into a span's `status` field.
    #[derive(Clone, Default)]
    struct StatusRecords(Arc<Mutex<Vec<String>>>);

    impl<S: tracing::Subscriber> Layer<S> for StatusRecords {
        fn on_record(&self, _id: &span::Id, values: &span::Record<'_>, _ctx: Context<'_, S>) {
            values.record(&mut StatusVisitor(&self.0));
        }
    }

    struct StatusVisitor<'a>(&'a Mutex<Vec<String>>);

    impl Visit for StatusVisitor<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "status" {
                self.0.lock().unwrap().push(format!("{value:?}"));
            }
        }
    }

    async fn spawn_app() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_app(AppState::fake());
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let base = spawn_app().await;
        let res = reqwest::get(format!("{base}/api/v1/health")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.text().await.unwrap(), "ok");
    }

    // current-thread runtime: server tasks run under the scoped subscriber
    #[tokio::test]
    async fn request_span_records_response_status() {
        let records = StatusRecords::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(records.clone()));

        let base = spawn_app().await;
        let res = reqwest::get(format!("{base}/api/v1/meals/not-a-uuid")).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        reqwest::get(format!("{base}/api/v1/health")).await.unwrap();

        let seen = records.0.lock().unwrap().clone();
        assert_eq!(seen, ["400 Bad Request", "200 OK"]);
    }

    #[tokio::test]
    async fn routes_are_nested_under_api_v1() {
        let base = spawn_app().await;
        let res = reqwest::get(format!("{base}/api/v1/view")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json: serde_json::Value = res.json().await.unwrap();
        assert_eq!(json["tab"], "dashboard");

        let res = reqwest::get(format!("{base}/view")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn capture_flow_over_http() {
        let base = spawn_app().await;
        let http = reqwest::Client::new();

        let res = http.post(format!("{base}/api/v1/capture/commit")).json(&serde_json::json!({})).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);

        http.post(format!("{base}/api/v1/capture")).send().await.unwrap();
        let res = http
            .post(format!("{base}/api/v1/capture/photo"))
            .header("content-type", "image/png")
            .body(vec![0x89, b'P', b'N', b'G'])
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = http
            .post(format!("{base}/api/v1/capture/commit"))
            .json(&serde_json::json!({ "meal_type": "dinner" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let location = res.headers()["location"].to_str().unwrap().to_string();

        let meal: serde_json::Value = http.get(format!("{base}{location}")).send().await.unwrap().json().await.unwrap();
        assert_eq!(meal["food_name"], "fake food");
        assert_eq!(meal["type"], "dinner");
        assert!(meal["image"].as_str().unwrap().starts_with("data:image/png;base64,"));
    }
}

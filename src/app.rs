use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, expenses, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(expenses::router())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
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
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    async fn create_user(app: &Router, username: &str, salary: f64) -> String {
        let req = post_json("/users/", json!({ "username": username, "salary": salary }));
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["user_id"].as_str().unwrap().to_owned()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = build_app(AppState::fake());
        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("ok".into()));
    }

    #[tokio::test]
    async fn totals_scenario() {
        let app = build_app(AppState::fake());
        let alice = create_user(&app, "alice", 1000.0).await;

        for (amount, category) in [(50.0, "Food"), (30.0, "Food"), (20.0, "Transport")] {
            let (status, body) = send(
                &app,
                post_json(
                    "/expenses/",
                    json!({ "user_id": alice, "name": "item", "amount": amount, "category": category }),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::OK, "{body}");
            assert_eq!(body["amount"], amount);
            assert_eq!(body["category"], category);
            assert!(body["expense_id"].is_string());
            assert!(body["created_at"].is_string());
        }

        let (status, body) = send(&app, get(&format!("/totals/{alice}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "total_expense": 100.0,
                "total_salary": 1000.0,
                "remaining_amount": 900.0,
                "category_breakdown": { "Food": 80.0, "Transport": 20.0 }
            })
        );
    }

    #[tokio::test]
    async fn expense_for_unknown_user_is_404() {
        let app = build_app(AppState::fake());
        let (status, body) = send(
            &app,
            post_json(
                "/expenses/",
                json!({
                    "user_id": uuid::Uuid::new_v4(),
                    "name": "coffee",
                    "amount": 3.5,
                    "category": "Food"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "User not found");
    }

    #[tokio::test]
    async fn invalid_expense_input_is_400() {
        let app = build_app(AppState::fake());
        let alice = create_user(&app, "alice", 0.0).await;

        for body in [
            json!({ "user_id": alice, "name": "x", "amount": 0, "category": "Food" }),
            json!({ "user_id": alice, "name": "x", "amount": -5, "category": "Food" }),
            json!({ "user_id": alice, "name": "x", "amount": 5, "category": "Groceries" }),
            json!({ "user_id": alice, "name": "", "amount": 5, "category": "Food" }),
            json!({ "user_id": alice, "amount": 5, "category": "Food" }),
        ] {
            let (status, resp) = send(&app, post_json("/expenses/", body.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body} -> {resp}");
            assert!(resp["detail"].is_string());
        }
    }

    #[tokio::test]
    async fn listing_filters_and_errors() {
        let app = build_app(AppState::fake());
        let alice = create_user(&app, "alice", 0.0).await;
        for (amount, category) in [(5.0, "Food"), (7.0, "Transport")] {
            let (status, _) = send(
                &app,
                post_json(
                    "/expenses",
                    json!({ "user_id": alice, "name": "item", "amount": amount, "category": category }),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(&app, get(&format!("/expenses/{alice}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (_, body) = send(&app, get(&format!("/expenses/{alice}?category=Transport"))).await;
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["amount"], 7.0);

        // A lone week is ignored.
        let (_, body) = send(&app, get(&format!("/expenses/{alice}?week=1"))).await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (_, body) = send(&app, get(&format!("/expenses/{alice}?day=1999-01-01"))).await;
        assert!(body.as_array().unwrap().is_empty());

        let (status, body) = send(&app, get(&format!("/expenses/{alice}?day=01-01-1999"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("YYYY-MM-DD"));

        let (status, _) = send(&app, get(&format!("/expenses/{alice}?category=Rent"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, get(&format!("/expenses/{}", uuid::Uuid::new_v4()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, get("/expenses/not-a-uuid")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        for q in ["week=-1&year=2024", "month=-1&year=2024", "month=13&year=2024"] {
            let (status, body) = send(&app, get(&format!("/expenses/{alice}?{q}"))).await;
            assert_eq!(status, StatusCode::OK, "{q}");
            assert!(body.as_array().unwrap().is_empty(), "{q}");
        }
    }

    #[tokio::test]
    async fn user_routes_accept_trailing_slash() {
        let app = build_app(AppState::fake());
        let alice = create_user(&app, "alice", 10.0).await;
        let (status, _) = send(
            &app,
            post_json(
                "/expenses/",
                json!({ "user_id": alice, "name": "tea", "amount": 2.0, "category": "Food" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        for uri in [format!("/expenses/{alice}"), format!("/expenses/{alice}/")] {
            let (status, body) = send(&app, get(&uri)).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body.as_array().unwrap().len(), 1, "{uri}");
        }
        for uri in [format!("/totals/{alice}"), format!("/totals/{alice}/")] {
            let (status, body) = send(&app, get(&uri)).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body["total_expense"], 2.0, "{uri}");
        }
    }

    #[tokio::test]
    async fn totals_without_expenses_are_positive_zero() {
        let app = build_app(AppState::fake());
        let bob = create_user(&app, "bob", 300.0).await;

        let res = app.clone().oneshot(get(&format!("/totals/{bob}"))).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let raw = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!raw.contains("-0"), "{raw}");

        let body: Value = serde_json::from_str(&raw).unwrap();
        assert!(!body["total_expense"].as_f64().unwrap().is_sign_negative());
        assert_eq!(body["remaining_amount"], 300.0);
        assert_eq!(body["category_breakdown"], json!({}));
    }

    #[tokio::test]
    async fn register_login_and_me() {
        let app = build_app(AppState::fake());

        let (status, body) = send(
            &app,
            post_json(
                "/auth/register",
                json!({ "username": "alice", "salary": 1200.0, "password": "wonderland" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["token_type"], "bearer");
        assert!(body["access_token"].is_string());

        let (status, body) = send(
            &app,
            post_json(
                "/auth/register",
                json!({ "username": "alice", "password": "other" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Username already exists");

        let (status, body) =
            send(&app, post_form("/auth/token", "username=alice&password=wonderland")).await;
        assert_eq!(status, StatusCode::OK);
        let token = body["access_token"].as_str().unwrap().to_owned();

        let req = Request::get("/users/me")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alice");
        assert_eq!(body["salary"], 1200.0);
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn bad_credentials_are_401() {
        let app = build_app(AppState::fake());
        send(
            &app,
            post_json("/auth/register", json!({ "username": "alice", "password": "wonderland" })),
        )
        .await;

        let (wrong_pw, wrong_body) =
            send(&app, post_form("/auth/token", "username=alice&password=nope")).await;
        let (unknown, unknown_body) =
            send(&app, post_form("/auth/token", "username=mallory&password=nope")).await;
        assert_eq!(wrong_pw, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_body, unknown_body);

        let (status, _) = send(&app, get("/users/me")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn duplicate_legacy_user_is_400() {
        let app = build_app(AppState::fake());
        create_user(&app, "bob", 10.0).await;
        let (status, body) = send(&app, post_json("/users", json!({ "username": "bob" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Username already exists");
    }
}

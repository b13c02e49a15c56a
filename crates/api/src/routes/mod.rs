//! Route handlers for the chatbot API.

pub mod health;
pub mod knowledge;
pub mod query;
pub mod session;
pub mod stats;
pub mod tickets;
pub mod whatsapp;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Sign-in
        .route("/auth/login", post(session::login))
        .route("/auth/logout", post(session::logout))
        .route("/auth/session", get(session::current))
        // Chat widget
        .route("/chatbot-api/query", post(query::query))
        // Knowledge base
        .route(
            "/chatbot-api/knowledge",
            get(knowledge::list).post(knowledge::create),
        )
        .route(
            "/chatbot-api/knowledge/:id",
            get(knowledge::get)
                .put(knowledge::update)
                .delete(knowledge::delete),
        )
        // Tickets
        .route(
            "/chatbot-api/tickets",
            get(tickets::list).post(tickets::create),
        )
        .route(
            "/chatbot-api/tickets/:id",
            get(tickets::get).put(tickets::update).delete(tickets::delete),
        )
        .route(
            "/chatbot-api/tickets/:id/messages",
            get(tickets::list_messages).post(tickets::add_message),
        )
        // Settings and dashboard
        .route(
            "/chatbot-api/whatsapp",
            get(whatsapp::get).post(whatsapp::replace),
        )
        .route("/chatbot-api/stats", get(stats::stats))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
    use axum::http::{Request, StatusCode};
    use chatbot::{Authenticator, FALLBACK_ANSWER};
    use database::{AccountRole, Database};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;

    async fn test_app() -> (Router, AppState) {
        // One connection so every request sees the same in-memory database.
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();

        let state = AppState::new(db.clone(), Authenticator::with_cost(db, 4));
        (router().with_state(state.clone()), state)
    }

    async fn token_for(state: &AppState, email: &str, role: AccountRole) -> String {
        state
            .auth
            .register(email, "Teste", role, "segredo123")
            .await
            .unwrap();
        state.auth.login(email, "segredo123").await.unwrap().0
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn send_raw(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(content_type.unwrap(), "application/json");
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn create_entry(app: &Router, token: &str) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/chatbot-api/knowledge",
            Some(token),
            Some(json!({
                "question": "Como funciona a matrícula?",
                "answer": "A matrícula é feita online pelo portal da Secretaria.",
                "category": "Matrícula",
                "keywords": ["matrícula", "inscrição"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn open_ticket(app: &Router, token: Option<&str>) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/chatbot-api/tickets",
            token,
            Some(json!({"title": "Problema", "description": "Detalhe", "priority": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["ticket"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = test_app().await;

        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_query_matches_and_counts_usage() {
        let (app, state) = test_app().await;
        let staff = token_for(&state, "equipe@educacao.gov.br", AccountRole::Staff).await;
        let id = create_entry(&app, &staff).await;

        let (status, body) = send(
            &app,
            "POST",
            "/chatbot-api/query",
            None,
            Some(json!({"query": "  MATRÍCULA "})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["found"], true);
        assert_eq!(
            body["answer"],
            "A matrícula é feita online pelo portal da Secretaria."
        );

        let (_, entry) = send(&app, "GET", &format!("/chatbot-api/knowledge/{id}"), None, None).await;
        assert_eq!(entry["usage_count"], 1);
    }

    #[tokio::test]
    async fn test_query_miss_returns_fallback() {
        let (app, _) = test_app().await;

        for query in [json!({"query": "xyzxyz"}), json!({"query": "   "}), json!({})] {
            let (status, body) = send(&app, "POST", "/chatbot-api/query", None, Some(query)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["found"], false);
            assert_eq!(body["answer"], FALLBACK_ANSWER);
        }
    }

    #[tokio::test]
    async fn test_knowledge_writes_need_staff() {
        let (app, state) = test_app().await;
        let member = token_for(&state, "mae@exemplo.com", AccountRole::Member).await;
        let entry = json!({"question": "Pergunta?", "answer": "Resposta."});

        let (status, body) =
            send(&app, "POST", "/chatbot-api/knowledge", None, Some(entry.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());

        let (status, _) =
            send(&app, "POST", "/chatbot-api/knowledge", Some(&member), Some(entry)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_knowledge_validation() {
        let (app, state) = test_app().await;
        let staff = token_for(&state, "equipe@educacao.gov.br", AccountRole::Staff).await;

        let (status, body) = send(
            &app,
            "POST",
            "/chatbot-api/knowledge",
            Some(&staff),
            Some(json!({"question": "  ", "answer": "Resposta."})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "question cannot be empty");
    }

    #[tokio::test]
    async fn test_deactivated_entry_stops_matching() {
        let (app, state) = test_app().await;
        let staff = token_for(&state, "equipe@educacao.gov.br", AccountRole::Staff).await;
        let id = create_entry(&app, &staff).await;
        let uri = format!("/chatbot-api/knowledge/{id}");

        let (status, _) = send(&app, "DELETE", &uri, Some(&staff), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(
            &app,
            "POST",
            "/chatbot-api/query",
            None,
            Some(json!({"query": "matrícula"})),
        )
        .await;
        assert_eq!(body["found"], false);

        let (status, _) = send(&app, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, body) = send(&app, "GET", &uri, Some(&staff), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["active"], false);

        let (_, list) = send(&app, "GET", "/chatbot-api/knowledge", None, None).await;
        assert_eq!(list.as_array().unwrap().len(), 0);
        let (status, _) = send(
            &app,
            "GET",
            "/chatbot-api/knowledge?include_inactive=true",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (_, list) = send(
            &app,
            "GET",
            "/chatbot-api/knowledge?include_inactive=true",
            Some(&staff),
            None,
        )
        .await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_entry() {
        let (app, state) = test_app().await;
        let staff = token_for(&state, "equipe@educacao.gov.br", AccountRole::Staff).await;
        let id = create_entry(&app, &staff).await;

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/chatbot-api/knowledge/{id}"),
            Some(&staff),
            Some(json!({"answer": "Pelo portal, entre janeiro e fevereiro.", "category": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "Pelo portal, entre janeiro e fevereiro.");
        assert!(body["category"].is_null());
        assert_eq!(body["question"], "Como funciona a matrícula?");

        let (status, _) = send(
            &app,
            "PUT",
            "/chatbot-api/knowledge/missing",
            Some(&staff),
            Some(json!({"answer": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_anonymous_ticket() {
        let (app, _) = test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/chatbot-api/tickets",
            None,
            Some(json!({"title": "Problema", "description": "Detalhe"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["ticket"]["status"], "open");
        assert_eq!(body["ticket"]["priority"], 2);
        assert!(body["ticket"]["user_id"].is_null());
        let protocol = body["protocol"].as_str().unwrap();
        assert!(body["message"].as_str().unwrap().contains(protocol));
    }

    #[tokio::test]
    async fn test_invalid_ticket_rejected() {
        let (app, state) = test_app().await;
        let staff = token_for(&state, "equipe@educacao.gov.br", AccountRole::Staff).await;

        let (status, body) = send(
            &app,
            "POST",
            "/chatbot-api/tickets",
            None,
            Some(json!({"title": "", "description": "x", "priority": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "title cannot be empty");

        let (status, _) = send(
            &app,
            "POST",
            "/chatbot-api/tickets",
            None,
            Some(json!({"title": "Problema", "description": "Detalhe", "priority": 9})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, list) = send(&app, "GET", "/chatbot-api/tickets", Some(&staff), None).await;
        assert_eq!(list.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_members_see_only_their_tickets() {
        let (app, state) = test_app().await;
        let staff = token_for(&state, "equipe@educacao.gov.br", AccountRole::Staff).await;
        let ana = token_for(&state, "ana@exemplo.com", AccountRole::Member).await;
        let bia = token_for(&state, "bia@exemplo.com", AccountRole::Member).await;

        let own = open_ticket(&app, Some(&ana)).await;
        open_ticket(&app, Some(&bia)).await;
        open_ticket(&app, None).await;

        let (status, _) = send(&app, "GET", "/chatbot-api/tickets", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (_, list) = send(&app, "GET", "/chatbot-api/tickets", Some(&ana), None).await;
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["id"], own.as_str());

        let (_, list) = send(&app, "GET", "/chatbot-api/tickets", Some(&staff), None).await;
        assert_eq!(list.as_array().unwrap().len(), 3);

        let (status, _) = send(
            &app,
            "GET",
            &format!("/chatbot-api/tickets/{own}"),
            Some(&bia),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_ticket_lifecycle() {
        let (app, state) = test_app().await;
        let staff = token_for(&state, "equipe@educacao.gov.br", AccountRole::Staff).await;
        let member = token_for(&state, "mae@exemplo.com", AccountRole::Member).await;
        let id = open_ticket(&app, Some(&member)).await;
        let uri = format!("/chatbot-api/tickets/{id}");

        let (status, _) = send(
            &app,
            "PUT",
            &uri,
            Some(&member),
            Some(json!({"status": "resolved"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            "PUT",
            &uri,
            Some(&staff),
            Some(json!({"status": "resolved", "resolution": "Matrícula confirmada.", "priority": 3})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "resolved");
        assert_eq!(body["priority"], 3);
        assert_eq!(body["resolution"], "Matrícula confirmada.");
        assert!(body["resolved_at"].is_string());

        let (status, body) =
            send(&app, "PUT", &uri, Some(&staff), Some(json!({"status": "open"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("cannot move"));

        // A rejected transition keeps the other changes out too.
        let (status, _) = send(
            &app,
            "PUT",
            &uri,
            Some(&staff),
            Some(json!({"status": "in_progress", "priority": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        let (_, body) = send(&app, "GET", &uri, Some(&staff), None).await;
        assert_eq!(body["priority"], 3);
        assert_eq!(body["status"], "resolved");

        let (status, _) = send(&app, "PUT", &uri, Some(&staff), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_assignment_requires_staff_account() {
        let (app, state) = test_app().await;
        let staff = token_for(&state, "equipe@educacao.gov.br", AccountRole::Staff).await;
        let staff_id = state
            .auth
            .resolve(&staff)
            .await
            .unwrap()
            .unwrap()
            .user_id()
            .unwrap()
            .to_string();
        let member = state
            .auth
            .register("mae@exemplo.com", "Mãe", AccountRole::Member, "segredo123")
            .await
            .unwrap();
        let id = open_ticket(&app, None).await;
        let uri = format!("/chatbot-api/tickets/{id}");

        let (status, _) = send(
            &app,
            "PUT",
            &uri,
            Some(&staff),
            Some(json!({"assigned_to": member.id})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            "PUT",
            &uri,
            Some(&staff),
            Some(json!({"assigned_to": staff_id, "status": "in_progress"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["assigned_to"], staff_id.as_str());
        assert_eq!(body["status"], "in_progress");

        let (_, body) = send(&app, "PUT", &uri, Some(&staff), Some(json!({"assigned_to": ""}))).await;
        assert!(body["assigned_to"].is_null());
    }

    #[tokio::test]
    async fn test_internal_messages_hidden_from_requester() {
        let (app, state) = test_app().await;
        let staff = token_for(&state, "equipe@educacao.gov.br", AccountRole::Staff).await;
        let member = token_for(&state, "mae@exemplo.com", AccountRole::Member).await;
        let id = open_ticket(&app, Some(&member)).await;
        let uri = format!("/chatbot-api/tickets/{id}/messages");

        let (status, _) = send(
            &app,
            "POST",
            &uri,
            Some(&member),
            Some(json!({"message": "Alguma novidade?", "is_internal": true})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        for (token, message, internal) in [
            (&member, "Alguma novidade?", false),
            (&staff, "Verificar com a escola.", true),
            (&staff, "Estamos analisando.", false),
        ] {
            let (status, _) = send(
                &app,
                "POST",
                &uri,
                Some(token.as_str()),
                Some(json!({"message": message, "is_internal": internal})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, thread) = send(&app, "GET", &uri, Some(&member), None).await;
        let texts: Vec<&str> = thread
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["message"].as_str().unwrap())
            .collect();
        assert_eq!(texts, vec!["Alguma novidade?", "Estamos analisando."]);

        let (_, thread) = send(&app, "GET", &uri, Some(&staff), None).await;
        assert_eq!(thread.as_array().unwrap().len(), 3);

        let (_, detail) = send(
            &app,
            "GET",
            &format!("/chatbot-api/tickets/{id}"),
            Some(&member),
            None,
        )
        .await;
        assert_eq!(detail["title"], "Problema");
        assert_eq!(detail["messages"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_closed_ticket_rejects_messages() {
        let (app, state) = test_app().await;
        let staff = token_for(&state, "equipe@educacao.gov.br", AccountRole::Staff).await;
        let id = open_ticket(&app, None).await;

        send(
            &app,
            "PUT",
            &format!("/chatbot-api/tickets/{id}"),
            Some(&staff),
            Some(json!({"status": "closed"})),
        )
        .await;

        let (status, _) = send(
            &app,
            "POST",
            &format!("/chatbot-api/tickets/{id}/messages"),
            Some(&staff),
            Some(json!({"message": "Reabrindo?"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_delete_ticket_is_admin_only() {
        let (app, state) = test_app().await;
        let staff = token_for(&state, "equipe@educacao.gov.br", AccountRole::Staff).await;
        let admin = token_for(&state, "admin@educacao.gov.br", AccountRole::Admin).await;
        let id = open_ticket(&app, None).await;
        let uri = format!("/chatbot-api/tickets/{id}");

        let (status, _) = send(&app, "DELETE", &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = send(&app, "DELETE", &uri, Some(&staff), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&app, "DELETE", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "GET", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_whatsapp_settings() {
        let (app, state) = test_app().await;
        let staff = token_for(&state, "equipe@educacao.gov.br", AccountRole::Staff).await;
        let admin = token_for(&state, "admin@educacao.gov.br", AccountRole::Admin).await;

        let (status, body) = send(&app, "GET", "/chatbot-api/whatsapp", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["whatsapp_enabled"], false);
        assert_eq!(body["business_days"], json!([1, 2, 3, 4, 5]));

        let update = json!({
            "whatsapp_enabled": true,
            "whatsapp_number": "+5561999990000",
            "webhook_url": "https://hooks.educacao.gov.br/chatbot",
            "welcome_message": "Bem-vindo ao atendimento!",
            "business_hours_start": "07:30",
            "business_hours_end": "17:00",
            "business_days": [5, 1, 3, 1]
        });

        let (status, _) = send(&app, "POST", "/chatbot-api/whatsapp", None, Some(update.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) =
            send(&app, "POST", "/chatbot-api/whatsapp", Some(&staff), Some(update.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) =
            send(&app, "POST", "/chatbot-api/whatsapp", Some(&admin), Some(update)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["whatsapp_number"], "+5561999990000");
        assert_eq!(body["business_days"], json!([1, 3, 5]));
        assert_eq!(body["webhook_url"], "https://hooks.educacao.gov.br/chatbot");

        let (_, public) = send(&app, "GET", "/chatbot-api/whatsapp", None, None).await;
        assert_eq!(public["whatsapp_number"], "+5561999990000");
        assert!(public.get("webhook_url").is_none());
        assert!(public.get("updated_by").is_none());

        let (_, full) = send(&app, "GET", "/chatbot-api/whatsapp", Some(&staff), None).await;
        assert_eq!(full["webhook_url"], "https://hooks.educacao.gov.br/chatbot");
        assert!(full["updated_by"].is_string());

        let (status, _) = send(
            &app,
            "POST",
            "/chatbot-api/whatsapp",
            Some(&admin),
            Some(json!({
                "welcome_message": "Oi",
                "business_hours_start": "25:00",
                "business_hours_end": "17:00",
                "business_days": []
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_session_logout() {
        let (app, state) = test_app().await;
        state
            .auth
            .register("admin@educacao.gov.br", "Admin", AccountRole::Admin, "segredo123")
            .await
            .unwrap();

        let (status, _) = send(
            &app,
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "admin@educacao.gov.br", "password": "errada"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "admin@educacao.gov.br", "password": "segredo123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["identity"]["role"], "admin");
        let token = body["token"].as_str().unwrap().to_string();

        let (status, body) = send(&app, "GET", "/auth/session", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "admin@educacao.gov.br");

        let (status, _) = send(&app, "POST", "/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "GET", "/auth/session", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = send(&app, "GET", "/auth/session", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_stale_token_is_anonymous_on_public_route() {
        let (app, _) = test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/chatbot-api/tickets",
            Some("not-a-session"),
            Some(json!({"title": "Problema", "description": "Detalhe"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["ticket"]["user_id"].is_null());

        let (status, body) = send(&app, "GET", "/auth/session", Some("not-a-session"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());

        let (status, _) = send(&app, "POST", "/auth/logout", Some("not-a-session"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_body_returns_json_error() {
        let (app, state) = test_app().await;
        let staff = token_for(&state, "equipe@educacao.gov.br", AccountRole::Staff).await;

        // Missing required field.
        let (status, body) = send(
            &app,
            "POST",
            "/chatbot-api/tickets",
            None,
            Some(json!({"description": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = send_raw(&app, "POST", "/chatbot-api/query", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = send(
            &app,
            "GET",
            "/chatbot-api/tickets?status=reopened",
            Some(&staff),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = send(
            &app,
            "GET",
            "/chatbot-api/knowledge?include_inactive=maybe",
            Some(&staff),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_stats() {
        let (app, state) = test_app().await;
        let staff = token_for(&state, "equipe@educacao.gov.br", AccountRole::Staff).await;
        create_entry(&app, &staff).await;
        let id = open_ticket(&app, None).await;
        open_ticket(&app, None).await;
        send(
            &app,
            "PUT",
            &format!("/chatbot-api/tickets/{id}"),
            Some(&staff),
            Some(json!({"status": "in_progress"})),
        )
        .await;
        send(
            &app,
            "POST",
            "/chatbot-api/query",
            None,
            Some(json!({"query": "inscrição"})),
        )
        .await;

        let (status, _) = send(&app, "GET", "/chatbot-api/stats", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, "GET", "/chatbot-api/stats", Some(&staff), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ticket_count"], 2);
        assert_eq!(body["active_entry_count"], 1);
        assert_eq!(body["top_entries"][0]["usage_count"], 1);

        let by_status = body["tickets_by_status"].as_array().unwrap();
        assert_eq!(by_status.len(), 4);
        let count = |status: &str| {
            by_status
                .iter()
                .find(|s| s["status"] == status)
                .map(|s| s["ticket_count"].as_i64().unwrap())
                .unwrap()
        };
        assert_eq!(count("open"), 1);
        assert_eq!(count("in_progress"), 1);
        assert_eq!(count("closed"), 0);
    }
}

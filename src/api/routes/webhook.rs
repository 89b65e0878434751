use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::bot::{command_in, Update};

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub ok: bool,
    /// Command being answered, if the update carried one
    pub command: Option<&'static str>,
}

/// Accept one Telegram update.
///
/// Replies are produced on a spawned task so the response goes back right
/// away; a slow pipeline would otherwise make Telegram resend the update.
pub async fn receive_update(
    State(state): State<AppState>,
    Path(token): Path<String>,
    payload: Result<Json<Update>, JsonRejection>,
) -> Result<Json<WebhookResponse>, ApiError> {
    if token.as_str() != &*state.webhook_token {
        return Err(ApiError::NotFound("unknown webhook".to_string()));
    }

    let Json(update) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    debug!("Webhook update {}", update.update_id);

    let Some((chat_id, command)) = command_in(&update) else {
        return Ok(Json(WebhookResponse {
            ok: true,
            command: None,
        }));
    };

    let bot = state.bot.clone();
    let sink = state.sink.clone();
    tokio::spawn(async move {
        bot.answer(chat_id, command, sink.as_ref()).await;
    });

    Ok(Json(WebhookResponse {
        ok: true,
        command: Some(command.name()),
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::state::AppState;
    use crate::bot::testing::{RecordingSink, Sent};
    use crate::bot::Bot;
    use crate::coc::testing::FakeSource;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::util::ServiceExt;

    const CLAN: &str = r##"{"memberList": [{"tag": "#P1", "name": "Alice", "townHallLevel": 15}]}"##;
    const WAR: &str = r##"{"state": "warEnded",
        "clan": {"name": "Us", "stars": 2, "destructionPercentage": 80.5,
                 "members": [{"tag": "#P1", "attacks": [{"stars": 2}]}]},
        "opponent": {"name": "Them", "stars": 2, "destructionPercentage": 75.0}}"##;

    fn setup() -> (axum::Router, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let state = AppState {
            bot: Bot::new(Arc::new(FakeSource::from_json(CLAN, WAR))),
            sink: sink.clone(),
            webhook_token: Arc::from("123:abc"),
        };
        (build_router(state), sink)
    }

    async fn post_json(app: axum::Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    /// Wait for the spawned reply task to deliver `count` replies.
    async fn wait_for_replies(sink: &RecordingSink, count: usize) -> Vec<Sent> {
        for _ in 0..200 {
            let sent = sink.sent.lock().unwrap().clone();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("replies were not delivered");
    }

    fn update(text: &str) -> String {
        serde_json::json!({
            "update_id": 1,
            "message": {"message_id": 2, "chat": {"id": 99}, "text": text}
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_webhook_clanstats() {
        let (app, sink) = setup();

        let (status, json) = post_json(app, "/webhook/123:abc", &update("/clanstats")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
        assert_eq!(json["command"], "clanstats");

        let sent = wait_for_replies(&sink, 1).await;
        assert_eq!(sent.len(), 1);
        let Sent::Text(chat_id, text) = &sent[0] else {
            panic!("expected text reply");
        };
        assert_eq!(*chat_id, 99);
        assert!(text.contains("Victory by destruction! 2:2"));
    }

    #[tokio::test]
    async fn test_webhook_top_replies_from_background_task() {
        let (app, sink) = setup();

        let (status, json) = post_json(app, "/webhook/123:abc", &update("/top")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["command"], "top");
        let sent = wait_for_replies(&sink, 1).await;
        assert!(matches!(&sent[0], Sent::Text(99, text) if text.contains("Alice")));
    }

    #[tokio::test]
    async fn test_webhook_ignores_plain_text() {
        let (app, sink) = setup();

        let (status, json) = post_json(app, "/webhook/123:abc", &update("hi all")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["command"], Value::Null);
        assert!(sink.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_webhook_wrong_token() {
        let (app, sink) = setup();

        let (status, json) = post_json(app, "/webhook/nope", &update("/stats")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert!(sink.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_webhook_malformed_body() {
        let (app, _sink) = setup();

        let (status, json) = post_json(app, "/webhook/123:abc", "{not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _sink) = setup();

        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }
}

use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::predict::{matchup_ids, predict_matchup, PredictionState, ResultHolder};
use crate::rating::RatingResolver;

#[derive(Clone)]
pub struct AppState {
    pub resolver: RatingResolver,
    pub results: ResultHolder,
}

/// Build the Axum router for the prediction form.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(|| async { "ok" }))
        .route("/api/predict", post(predict_handler))
        .route(
            "/api/prediction",
            get(prediction_handler).delete(clear_handler),
        )
        .with_state(Arc::new(state))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PredictRequest {
    a: String,
    b: String,
}

/// Serve the form page, injecting whether live ratings are enabled.
async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let html = FORM_HTML.replace(
        r#"<body>"#,
        &format!(r#"<body data-remote="{}">"#, state.resolver.has_remote()),
    );
    Html(html)
}

/// POST /api/predict `{"a": "BLADE", "b": "LAW"}`
///
/// Responds with this request's own prediction, whatever the shared holder
/// ends up showing. Blank or missing inputs compute nothing, leave the holder
/// untouched and answer `idle`.
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PredictRequest>,
) -> Json<PredictionState> {
    let Some((team_a, team_b)) = matchup_ids(&req.a, &req.b) else {
        return Json(PredictionState::Idle);
    };

    let ticket = state.results.begin().await;
    let prediction = Arc::new(predict_matchup(&state.resolver, team_a, team_b).await);
    state.results.complete(ticket, Arc::clone(&prediction)).await;
    Json(PredictionState::Ready { prediction })
}

/// GET /api/prediction
async fn prediction_handler(State(state): State<Arc<AppState>>) -> Json<PredictionState> {
    Json(state.results.current().await)
}

/// DELETE /api/prediction
async fn clear_handler(State(state): State<Arc<AppState>>) -> Json<PredictionState> {
    state.results.clear().await;
    Json(state.results.current().await)
}

/// Embedded single-file form (HTML + CSS + JS)
const FORM_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Elo Match Predictor</title>
<style>
  :root {
    --bg: #0f1117;
    --card: #1a1d27;
    --border: #2a2d3a;
    --accent: #6c63ff;
    --green: #00c896;
    --text: #e0e0e0;
    --muted: #8888aa;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { display: flex; align-items: center; gap: 1rem; padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
  header h1 { font-size: 1.4rem; font-weight: 700; }
  .badge { padding: .2rem .6rem; border-radius: 4px; font-size: .75rem; font-weight: 700; text-transform: uppercase; }
  .badge.live { background: var(--green); color: #000; }
  .badge.offline { background: #ff9800; color: #000; }
  main { padding: 1.5rem 2rem; display: grid; gap: 1.5rem; max-width: 720px; }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1.2rem; }
  form { display: flex; gap: .8rem; align-items: center; }
  input { flex: 1; background: var(--bg); border: 1px solid var(--border); color: var(--text); padding: .55rem .8rem; border-radius: 6px; text-transform: uppercase; }
  button { background: var(--accent); border: none; color: #fff; padding: .55rem 1.2rem; border-radius: 6px; cursor: pointer; font-weight: 600; }
  .vs { color: var(--muted); font-weight: 700; }
  table { width: 100%; border-collapse: collapse; }
  th { padding: .7rem 1rem; text-align: left; font-size: .75rem; text-transform: uppercase; color: var(--muted); border-bottom: 1px solid var(--border); }
  td { padding: .65rem 1rem; font-size: .95rem; border-bottom: 1px solid #1e2130; }
  tr.winner td { color: var(--green); font-weight: 700; }
  .empty { color: var(--muted); text-align: center; padding: 1rem; font-size: .9rem; }
</style>
</head>
<body>
<header>
  <h1>Elo Match Predictor</h1>
  <span class="badge" id="mode-badge"></span>
</header>

<main>
  <div class="panel">
    <form id="predict-form">
      <input id="team-a" placeholder="Team A" autocomplete="off">
      <span class="vs">vs</span>
      <input id="team-b" placeholder="Team B" autocomplete="off">
      <button type="submit">Predict</button>
    </form>
  </div>

  <div class="panel" id="result">
    <div class="empty">Enter two teams to predict the winner</div>
  </div>
</main>

<script>
const remote = document.body.dataset.remote === 'true';
const badge = document.getElementById('mode-badge');
badge.textContent = remote ? 'live ratings' : 'offline ratings';
badge.className = 'badge ' + (remote ? 'live' : 'offline');

let seq = 0;

function render(s) {
  const el = document.getElementById('result');
  if (s.state === 'idle') {
    el.innerHTML = '<div class="empty">Enter two teams to predict the winner</div>';
    return;
  }
  if (s.state === 'resolving') {
    el.innerHTML = '<div class="empty">Resolving ratings…</div>';
    return;
  }
  const p = s.prediction;
  const cell = (tag, text) => {
    const c = document.createElement(tag);
    c.textContent = text;
    return c;
  };
  const row = (team, rating, pct, won) => {
    const tr = document.createElement('tr');
    if (won) tr.className = 'winner';
    tr.append(cell('td', team), cell('td', Math.round(rating)), cell('td', pct.toFixed(1) + '%'));
    return tr;
  };
  const table = document.createElement('table');
  const head = document.createElement('tr');
  head.append(cell('th', 'Team'), cell('th', 'Rating'), cell('th', 'Win Probability'));
  table.createTHead().append(head);
  table.createTBody().append(
    row(p.team_a, p.rating_a, p.pct_a, p.winner_side === 'first'),
    row(p.team_b, p.rating_b, p.pct_b, p.winner_side === 'second'),
  );
  const verdict = document.createElement('p');
  verdict.style.marginTop = '1rem';
  verdict.append('Predicted winner: ', cell('strong', p.winner));
  el.replaceChildren(table, verdict);
}

async function predict(ev) {
  ev.preventDefault();
  const a = document.getElementById('team-a').value.trim();
  const b = document.getElementById('team-b').value.trim();
  if (!a || !b) return;
  const mine = ++seq;
  render({ state: 'resolving' });
  const r = await fetch('/api/predict', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ a, b }),
  });
  if (!r.ok || mine !== seq) return;
  render(await r.json());
}

async function onInput() {
  const a = document.getElementById('team-a').value.trim();
  const b = document.getElementById('team-b').value.trim();
  if (a && b) return;
  ++seq;
  const r = await fetch('/api/prediction', { method: 'DELETE' });
  if (r.ok) render(await r.json());
}

document.getElementById('predict-form').addEventListener('submit', predict);
document.getElementById('team-a').addEventListener('input', onInput);
document.getElementById('team-b').addEventListener('input', onInput);
</script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::source::LookupError;
    use crate::rating::{EntityId, Rating, RatingSource, RatingTable};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    struct Offline;

    #[async_trait]
    impl RatingSource for Offline {
        fn name(&self) -> &str {
            "offline"
        }

        async fn fetch_rating(&self, _id: &EntityId) -> Result<Rating, LookupError> {
            Err(LookupError::Status(502))
        }
    }

    /// Knows only SLOW, and takes its time answering.
    struct SlowForOne;

    #[async_trait]
    impl RatingSource for SlowForOne {
        fn name(&self) -> &str {
            "slow"
        }

        async fn fetch_rating(&self, id: &EntityId) -> Result<Rating, LookupError> {
            if id.as_str() == "SLOW" {
                tokio::time::sleep(Duration::from_millis(300)).await;
                Ok(1600.0)
            } else {
                Err(LookupError::NotFound(id.to_string()))
            }
        }
    }

    fn app_state_with(remote: Arc<dyn RatingSource>) -> AppState {
        AppState {
            resolver: RatingResolver::new(Some(remote), Arc::new(RatingTable::builtin())),
            results: ResultHolder::new(),
        }
    }

    fn app_state() -> AppState {
        app_state_with(Arc::new(Offline))
    }

    async fn call(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let req = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(b) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string())),
            None => req.body(Body::empty()),
        };
        let resp = app.oneshot(req.unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn predict(app: Router, a: &str, b: &str) -> Value {
        let (status, body) = call(app, Method::POST, "/api/predict", Some(json!({ "a": a, "b": b }))).await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn test_predict_endpoint() {
        let app = router(app_state());
        let body = predict(app, "blade", "law").await;
        assert_eq!(body["state"], "ready");
        assert_eq!(body["prediction"]["team_a"], "BLADE");
        assert_eq!(body["prediction"]["rating_a"], 1531.0);
        assert_eq!(body["prediction"]["rating_b"], 1454.0);
        assert_eq!(body["prediction"]["pct_a"], 60.9);
        assert_eq!(body["prediction"]["winner"], "BLADE");
    }

    #[tokio::test]
    async fn test_overlapping_requests_each_get_their_own_matchup() {
        let state = app_state_with(Arc::new(SlowForOne));
        let app = router(state.clone());

        let slow = predict(app.clone(), "slow", "law");
        let fast = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            predict(app.clone(), "blade", "law").await
        };
        let (slow_body, fast_body) = tokio::join!(slow, fast);

        assert_eq!(slow_body["prediction"]["team_a"], "SLOW");
        assert_eq!(slow_body["prediction"]["rating_a"], 1600.0);
        assert_eq!(fast_body["prediction"]["team_a"], "BLADE");
        assert_eq!(fast_body["prediction"]["rating_a"], 1531.0);

        // The later request still owns the shared holder.
        let (_, shown) = call(app, Method::GET, "/api/prediction", None).await;
        assert_eq!(shown["prediction"]["team_a"], "BLADE");
    }

    #[tokio::test]
    async fn test_predict_with_blank_input_is_inert() {
        let state = app_state();
        let app = router(state.clone());

        let body = predict(app.clone(), "BLADE", "").await;
        assert_eq!(body["state"], "idle");

        let (status, body) =
            call(app, Method::POST, "/api/predict", Some(json!({ "b": "LAW" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "idle");
        assert_eq!(state.results.current().await, PredictionState::Idle);
    }

    #[tokio::test]
    async fn test_blank_input_keeps_previous_result() {
        let app = router(app_state());
        predict(app.clone(), "unknown1", "unknown2").await;

        let body = predict(app.clone(), "", "").await;
        assert_eq!(body["state"], "idle");

        let (_, shown) = call(app, Method::GET, "/api/prediction", None).await;
        assert_eq!(shown["state"], "ready");
        assert_eq!(shown["prediction"]["prob_a"], 0.5);
        assert_eq!(shown["prediction"]["winner"], "UNKNOWN1");
    }

    #[tokio::test]
    async fn test_predict_rejects_get() {
        let app = router(app_state());
        let (status, _) = call(app, Method::GET, "/api/predict?a=BLADE&b=LAW", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_no_cross_origin_headers() {
        let app = router(app_state());
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/prediction")
                    .header(header::ORIGIN, "https://elsewhere.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_prediction_get_and_clear() {
        let app = router(app_state());
        predict(app.clone(), "BLADE", "LAW").await;

        let (_, body) = call(app.clone(), Method::GET, "/api/prediction", None).await;
        assert_eq!(body["state"], "ready");

        let (_, body) = call(app.clone(), Method::DELETE, "/api/prediction", None).await;
        assert_eq!(body["state"], "idle");

        let (_, body) = call(app, Method::GET, "/api/prediction", None).await;
        assert_eq!(body["state"], "idle");
    }

    #[tokio::test]
    async fn test_index_serves_form() {
        let app = router(app_state());
        let resp = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains(r#"<body data-remote="true">"#));
        assert!(html.contains("predict-form"));
        // Team names reach the page only as text nodes.
        assert!(html.contains("c.textContent = text"));
        assert!(!html.contains("${p.team_a}"));
        assert!(!html.contains("${p.winner}"));
    }
}

use askama::Template;
use axum::extract::{Extension, Form, Json};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use clap::Parser;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod models;
mod recorder;
mod sabbath;
mod serve;
mod view;

use error::Error;
use models::{parse_wall_clock, Interval};
use recorder::Recorder;
use sabbath::SabbathWindow;
use view::IndexTemplate;

#[derive(Parser, Debug)]
#[command(version, about = "Record time intervals from the browser")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "NIVO_ADDRESS", default_value = "0.0.0.0")]
    address: IpAddr,

    /// Port to listen on
    #[arg(long, env = "NIVO_PORT", default_value_t = 3000)]
    port: u16,

    /// Shift the Sabbath window one hour later for daylight saving time
    #[arg(long, env = "NIVO_DST")]
    dst: bool,
}

#[derive(Default)]
struct State {
    recorder: Mutex<Recorder>,
}

impl State {
    fn new(window: SabbathWindow) -> Self {
        Self {
            recorder: Mutex::new(Recorder::new(window)),
        }
    }

    fn recorder(&self) -> MutexGuard<'_, Recorder> {
        self.recorder.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn index(Extension(state): Extension<Arc<State>>) -> Result<Html<String>, Error> {
    let recorder = state.recorder();
    Ok(Html(IndexTemplate::new(&recorder, None).render()?))
}

#[derive(Deserialize, Debug)]
struct SubmitForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    start: String,
    #[serde(default)]
    end: String,
}

async fn submit(
    Extension(state): Extension<Arc<State>>,
    Form(form): Form<SubmitForm>,
) -> Result<Response, Error> {
    let start = parse_wall_clock(&form.start);
    let end = parse_wall_clock(&form.end);

    let mut recorder = state.recorder();
    recorder.set_name(form.name);
    recorder.set_start(start.as_ref().ok().and_then(|start| *start));
    recorder.set_end(end.as_ref().ok().and_then(|end| *end));

    let result = start.and(end).and_then(|_| recorder.submit().map(|_| ()));

    match result {
        Ok(()) => Ok(Redirect::to("/").into_response()),
        Err(err) if err.is_validation() => {
            let page = IndexTemplate::new(&recorder, Some(&err)).render()?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response())
        }
        Err(err) => Err(err),
    }
}

async fn list_intervals(Extension(state): Extension<Arc<State>>) -> Json<Vec<Interval>> {
    Json(state.recorder().intervals().to_vec())
}

#[derive(Deserialize, Debug)]
struct NewInterval {
    #[serde(default)]
    name: String,
    start: Option<String>,
    end: Option<String>,
}

async fn create_interval(
    Extension(state): Extension<Arc<State>>,
    Json(payload): Json<NewInterval>,
) -> Result<(StatusCode, Json<Interval>), Error> {
    let start = parse_wall_clock(payload.start.as_deref().unwrap_or_default())?;
    let end = parse_wall_clock(payload.end.as_deref().unwrap_or_default())?;

    let interval = state
        .recorder()
        .commit_interval(payload.name, start, end)?
        .clone();

    Ok((StatusCode::CREATED, Json(interval)))
}

fn router(state: Arc<State>) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .route("/api/intervals", get(list_intervals).post(create_interval))
        .route("/static/*path", get(serve::static_data))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let state = Arc::new(State::new(SabbathWindow::new(args.dst)));
    let app = router(state);

    let addr = SocketAddr::from((args.address, args.port));
    info!(%addr, "listening");

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::{CONTENT_TYPE, LOCATION};
    use axum::http::Request;
    use time::macros::datetime;
    use tower::ServiceExt;

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Response) {
        let response = app.clone().oneshot(request).await.unwrap();
        (response.status(), response)
    }

    async fn body_text(response: Response) -> String {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn form(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    fn json(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/intervals")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn form_submit_redirects_and_lists_interval() {
        let app = router(Arc::new(State::default()));

        let (status, response) = send(
            &app,
            form("name=Lunch&start=2024-01-01T12%3A00&end=2024-01-01T12%3A30"),
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/");

        let (status, response) = send(&app, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        let page = body_text(response).await;
        assert!(page.contains("Lunch"));
        assert!(page.contains("12:00"));
        assert!(page.contains("12:30"));
        assert!(page.contains("30 min"));
    }

    #[tokio::test]
    async fn invalid_form_shows_message_and_keeps_input() {
        let state = Arc::new(State::default());
        let app = router(Arc::clone(&state));

        let (status, response) = send(
            &app,
            form("name=Backwards&start=2024-01-01T12%3A30&end=2024-01-01T12%3A00"),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let page = body_text(response).await;
        assert!(page.contains("End time lies before start time"));
        assert!(page.contains("value=\"Backwards\""));
        assert!(state.recorder().intervals().is_empty());
    }

    #[tokio::test]
    async fn unparsable_form_replaces_previous_selection() {
        let state = Arc::new(State::default());
        let app = router(Arc::clone(&state));

        let (status, _) = send(
            &app,
            form("name=A&start=2024-01-01T12%3A30&end=2024-01-01T12%3A00"),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, response) =
            send(&app, form("name=B&start=garbage&end=2024-03-03T10%3A00")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let page = body_text(response).await;
        assert!(page.contains("Invalid date and time"));
        assert!(page.contains("value=\"2024-03-03T10:00\""));
        assert!(!page.contains("2024-01-01T12:30"));
        assert!(!page.contains("2024-01-01T12:00"));

        let recorder = state.recorder();
        assert_eq!(recorder.selection().name, "B");
        assert_eq!(recorder.selection().start, None);
        assert_eq!(recorder.selection().end, Some(datetime!(2024-03-03 10:00)));
        assert!(recorder.intervals().is_empty());
    }

    #[tokio::test]
    async fn api_reports_sabbath_minutes() {
        let app = router(Arc::new(State::new(SabbathWindow::new(true))));

        let (status, response) = send(
            &app,
            json(r#"{"name": "LY001", "start": "2024-07-05T17:00", "end": "2024-07-06T23:00"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let created: serde_json::Value =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(created["duration_minutes"], 30 * 60);
        assert_eq!(created["sabbath_minutes"], 27 * 60);
    }

    #[tokio::test]
    async fn missing_start_is_reported() {
        let app = router(Arc::new(State::default()));

        let (status, response) = send(&app, form("name=Nothing&start=&end=")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("Start time is not set"));
    }

    #[tokio::test]
    async fn api_creates_and_lists_in_order() {
        let app = router(Arc::new(State::default()));

        let (status, response) = send(
            &app,
            json(r#"{"name": "first", "start": "2024-01-01T09:00", "end": "2024-01-01T09:45"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let created: serde_json::Value =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(created["duration_minutes"], 45);

        let (status, _) = send(
            &app,
            json(
                r#"{
                    "name": "second",
                    "start": "2024-01-01T10:00:00",
                    "end": "2024-01-01T10:00:00"
                }"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, response) = send(&app, get("/api/intervals")).await;
        assert_eq!(status, StatusCode::OK);
        let listed: serde_json::Value =
            serde_json::from_str(&body_text(response).await).unwrap();

        assert_eq!(listed[0]["id"], created["id"]);
        assert_eq!(listed[0]["name"], "first");
        assert_eq!(listed[1]["name"], "second");
        assert_eq!(listed[1]["duration_minutes"], 0);
        assert_ne!(listed[0]["id"], listed[1]["id"]);
    }

    #[tokio::test]
    async fn api_rejects_bad_input() {
        let app = router(Arc::new(State::default()));

        let (status, response) = send(
            &app,
            json(r#"{"name": "open", "start": "2024-01-01T09:00"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Error: End time is not set");

        let (status, _) = send(
            &app,
            json(r#"{"start": "noon", "end": "2024-01-01T09:00"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, response) = send(&app, get("/api/intervals")).await;
        assert_eq!(body_text(response).await, "[]");
    }

    #[tokio::test]
    async fn serves_stylesheet() {
        let app = router(Arc::new(State::default()));

        let (status, response) = send(&app, get("/static/style.css")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/css");

        let (status, _) = send(&app, get("/static/missing.js")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

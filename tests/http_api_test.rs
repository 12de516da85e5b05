//! Exercises `HttpTaskService` against an in-process fake of the remote
//! task service, speaking the real wire contract over a loopback socket.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};

use dailylog::api::memory::InMemoryTaskService;
use dailylog::api::{ApiConfig, HttpTaskService, TaskService};
use dailylog::error::AppError;
use dailylog::models::{DailyStars, RollingAverage, Task, TaskId, WeeklyBreakdown};

type Svc = Arc<InMemoryTaskService>;
type Failure = (StatusCode, Json<Value>);

fn failure(err: AppError) -> Failure {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": err.to_string() })))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[derive(Deserialize)]
struct DateQuery {
    date: Option<String>,
}

#[derive(Deserialize)]
struct DailyQuery {
    days: Option<u32>,
}

#[derive(Deserialize)]
struct AverageQuery {
    days: Option<u32>,
    date: Option<String>,
}

#[derive(Deserialize)]
struct NameBody {
    name: String,
}

#[derive(Deserialize)]
struct CompleteBody {
    date: String,
}

#[derive(Deserialize)]
struct FootnoteBody {
    date: String,
    footnote: String,
}

#[derive(Deserialize)]
struct ReorderBody {
    #[serde(rename = "taskIds")]
    task_ids: Vec<TaskId>,
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

async fn list_tasks(
    State(svc): State<Svc>,
    Query(q): Query<DateQuery>,
) -> Result<Json<Vec<Task>>, Failure> {
    let tasks = svc
        .list_tasks(parse_date(q.date.as_deref()))
        .await
        .map_err(failure)?;
    Ok(Json(tasks))
}

async fn create_task(
    State(svc): State<Svc>,
    Json(body): Json<NameBody>,
) -> Result<(StatusCode, Json<Task>), Failure> {
    let task = svc.create_task(&body.name).await.map_err(failure)?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn rename_task(
    State(svc): State<Svc>,
    Path(id): Path<TaskId>,
    Json(body): Json<NameBody>,
) -> Result<Json<Task>, Failure> {
    let task = svc.rename_task(id, &body.name).await.map_err(failure)?;
    Ok(Json(task))
}

async fn delete_task(State(svc): State<Svc>, Path(id): Path<TaskId>) -> Result<Json<Value>, Failure> {
    svc.delete_task(id).await.map_err(failure)?;
    Ok(Json(json!({ "message": "Task deleted successfully" })))
}

async fn complete_task(
    State(svc): State<Svc>,
    Path(id): Path<TaskId>,
    Json(body): Json<CompleteBody>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    let date = parse_date(Some(&body.date))
        .ok_or_else(|| failure(AppError::service("Invalid date format. Use YYYY-MM-DD")))?;
    svc.complete_task(id, date).await.map_err(failure)?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Star earned!" }))))
}

async fn uncomplete_task(
    State(svc): State<Svc>,
    Path(id): Path<TaskId>,
    Query(q): Query<DateQuery>,
) -> Result<Json<Value>, Failure> {
    let date = parse_date(q.date.as_deref())
        .ok_or_else(|| failure(AppError::service("Invalid date format. Use YYYY-MM-DD")))?;
    svc.uncomplete_task(id, date).await.map_err(failure)?;
    Ok(Json(json!({ "message": "Completion removed" })))
}

async fn save_footnote(
    State(svc): State<Svc>,
    Path(id): Path<TaskId>,
    Json(body): Json<FootnoteBody>,
) -> Result<Json<Value>, Failure> {
    let date = parse_date(Some(&body.date))
        .ok_or_else(|| failure(AppError::service("Invalid date format. Use YYYY-MM-DD")))?;
    svc.set_footnote(id, date, &body.footnote)
        .await
        .map_err(failure)?;
    Ok(Json(json!({ "message": "Footnote saved successfully" })))
}

async fn reorder_tasks(
    State(svc): State<Svc>,
    Json(body): Json<ReorderBody>,
) -> Result<Json<Value>, Failure> {
    svc.reorder_tasks(&body.task_ids).await.map_err(failure)?;
    Ok(Json(json!({ "message": "Tasks reordered successfully" })))
}

async fn daily_stats(
    State(svc): State<Svc>,
    Query(q): Query<DailyQuery>,
) -> Result<Json<Vec<DailyStars>>, Failure> {
    let stats = svc
        .daily_star_counts(q.days.unwrap_or(30))
        .await
        .map_err(failure)?;
    Ok(Json(stats))
}

async fn weekly_stats(
    State(svc): State<Svc>,
    Query(q): Query<DateQuery>,
) -> Result<Json<WeeklyBreakdown>, Failure> {
    let stats = svc
        .weekly_breakdown(parse_date(q.date.as_deref()))
        .await
        .map_err(failure)?;
    Ok(Json(stats))
}

async fn average_stats(
    State(svc): State<Svc>,
    Query(q): Query<AverageQuery>,
) -> Result<Json<RollingAverage>, Failure> {
    let stats = svc
        .rolling_average(parse_date(q.date.as_deref()), q.days.unwrap_or(7))
        .await
        .map_err(failure)?;
    Ok(Json(stats))
}

fn router(service: Svc) -> Router {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/reorder", post(reorder_tasks))
        .route(
            "/api/tasks/{id}",
            axum::routing::put(rename_task).delete(delete_task),
        )
        .route(
            "/api/tasks/{id}/complete",
            post(complete_task).delete(uncomplete_task),
        )
        .route("/api/tasks/{id}/footnote", post(save_footnote))
        .route("/api/stats/daily", get(daily_stats))
        .route("/api/stats/weekly", get(weekly_stats))
        .route("/api/stats/average", get(average_stats))
        .with_state(service)
}

async fn spawn_server() -> (HttpTaskService, Svc) {
    let service = Arc::new(InMemoryTaskService::with_today(date(2024, 1, 10)));
    let app = router(service.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    let client = HttpTaskService::new(ApiConfig::new(format!("http://{}", addr))).unwrap();
    (client, service)
}

#[tokio::test]
async fn task_lifecycle_over_the_wire() {
    let (client, _) = spawn_server().await;
    let day = date(2024, 1, 10);

    let task = client.create_task("Morning run").await.unwrap();
    assert_eq!(task.name, "Morning run");
    assert!(!task.completed_today);

    client.complete_task(task.id, day).await.unwrap();
    let listed = client.list_tasks(Some(day)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].completed_today);

    client.rename_task(task.id, "Evening run").await.unwrap();
    let listed = client.list_tasks(Some(day)).await.unwrap();
    assert_eq!(listed[0].name, "Evening run");

    client.uncomplete_task(task.id, day).await.unwrap();
    let listed = client.list_tasks(Some(day)).await.unwrap();
    assert!(!listed[0].completed_today);

    client.delete_task(task.id).await.unwrap();
    assert!(client.list_tasks(Some(day)).await.unwrap().is_empty());
}

#[tokio::test]
async fn completing_twice_is_idempotent() {
    let (client, _) = spawn_server().await;
    let day = date(2024, 1, 10);
    let task = client.create_task("Read").await.unwrap();

    client.complete_task(task.id, day).await.unwrap();
    client.complete_task(task.id, day).await.unwrap();

    let daily = client.daily_star_counts(7).await.unwrap();
    let point = daily.iter().find(|d| d.date == "2024-01-10").unwrap();
    assert_eq!(point.star_count, 1);
}

#[tokio::test]
async fn footnote_creates_the_completion_over_the_wire() {
    let (client, _) = spawn_server().await;
    let day = date(2024, 1, 10);
    let task = client.create_task("Journal").await.unwrap();

    client.set_footnote(task.id, day, "three pages").await.unwrap();

    let listed = client.list_tasks(Some(day)).await.unwrap();
    assert!(listed[0].completed_today);
    assert_eq!(listed[0].footnote.as_deref(), Some("three pages"));
}

#[tokio::test]
async fn reorder_round_trips_the_task_ids_field() {
    let (client, _) = spawn_server().await;
    let a = client.create_task("A").await.unwrap().id;
    let b = client.create_task("B").await.unwrap().id;
    let c = client.create_task("C").await.unwrap().id;

    client.reorder_tasks(&[c, a, b]).await.unwrap();

    let ids: Vec<_> = client
        .list_tasks(None)
        .await
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, [c, a, b]);
}

#[tokio::test]
async fn server_error_text_is_surfaced_verbatim() {
    let (client, _) = spawn_server().await;

    let err = client.create_task("").await.unwrap_err();
    match err {
        AppError::Service { message } => assert_eq!(message, "Task name cannot be empty"),
        other => panic!("expected service error, got {:?}", other),
    }

    let err = client.rename_task(42, "x").await.unwrap_err();
    match err {
        AppError::Service { message } => assert_eq!(message, "Task not found"),
        other => panic!("expected service error, got {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_host_maps_to_network_error() {
    // Bind and drop a listener so the port is unoccupied.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpTaskService::new(ApiConfig::new(format!("http://{}", addr))).unwrap();
    assert!(matches!(
        client.list_tasks(None).await,
        Err(AppError::Network(_))
    ));
}

#[tokio::test]
async fn stats_pass_through_unchanged() {
    let (client, service) = spawn_server().await;
    let task = client.create_task("Read").await.unwrap();
    let other = client.create_task("Run").await.unwrap();

    // Seven straight days inside the trailing window of Jan 10.
    for offset in 3..=9 {
        service
            .complete_task(task.id, date(2024, 1, offset))
            .await
            .unwrap();
    }
    service.complete_task(other.id, date(2024, 1, 9)).await.unwrap();

    let weekly = client.weekly_breakdown(Some(date(2024, 1, 10))).await.unwrap();
    assert_eq!(weekly.week_start, "2024-01-03");
    assert_eq!(weekly.week_end, "2024-01-09");
    assert_eq!(weekly.tasks[0].star_count, 7);
    assert_eq!(weekly.tasks[0].percentage, 100.0);
    assert_eq!(weekly.tasks[1].star_count, 1);

    let average = client
        .rolling_average(Some(date(2024, 1, 10)), 7)
        .await
        .unwrap();
    assert_eq!(average.average, 1.1);

    let daily = client.daily_star_counts(7).await.unwrap();
    assert_eq!(daily.len(), 7);
    assert_eq!(daily.last().unwrap().date, "2024-01-10");
}

/// HTTP surface. This is the "UI consumer" port: it observes the favorite
/// set and page window as live values and drives toggle/reset/advance in
/// response to client requests.
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::{AccountStore, Session};
use crate::cloud::CloudFavorites;
use crate::error::AppError;
use crate::favorites::FavoritesStore;
use crate::model::Recipe;
use crate::paging::{PageWindow, PAGE_SIZE};
use crate::query;
use crate::reconcile::FavoritesReconciler;
use crate::settings::{Settings, SettingsStore};

pub struct AppState {
    recipes: Arc<Vec<Recipe>>,
    local: Arc<FavoritesStore>,
    settings: Arc<SettingsStore>,
    cloud: CloudFavorites,
    accounts: AccountStore,
    window: RwLock<PageWindow>,
    /// Swapped on login/logout; the previous instance is stopped before the
    /// replacement's merge starts.
    reconciler: RwLock<FavoritesReconciler>,
}

impl AppState {
    pub async fn new(
        recipes: Vec<Recipe>,
        local: Arc<FavoritesStore>,
        settings: Arc<SettingsStore>,
        cloud: CloudFavorites,
        accounts: AccountStore,
    ) -> Self {
        let window = PageWindow::new(PAGE_SIZE, recipes.len());
        let reconciler =
            FavoritesReconciler::start(Arc::clone(&local), cloud.clone(), None).await;
        Self {
            recipes: Arc::new(recipes),
            local,
            settings,
            cloud,
            accounts,
            window: RwLock::new(window),
            reconciler: RwLock::new(reconciler),
        }
    }

    async fn swap_session(&self, uid: Option<String>) {
        let mut slot = self.reconciler.write().await;
        // stop the outgoing session's subscriptions before the incoming
        // merge runs: a stale remote emission for the old account must not
        // overwrite the freshly merged set
        slot.stop();
        *slot = FavoritesReconciler::start(Arc::clone(&self.local), self.cloud.clone(), uid).await;
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/recipes", get(visible_recipes))
        .route("/recipes/reset", post(reset_paging))
        .route("/recipes/more", post(load_more))
        .route("/recipes/seen", post(seen))
        .route("/recipes/by-time", get(by_time))
        .route("/recipes/by-letter", get(by_letter))
        .route("/recipes/{id}", get(recipe_by_id))
        .route("/favorites", get(favorites))
        .route("/favorites/{id}/toggle", post(toggle_favorite))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .route("/settings", get(get_settings).put(put_settings))
        .with_state(state)
}

// --- Recipes and paging ---

async fn visible_recipes(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let window = state.window.read().await;
    Json(json!({
        "recipes": window.visible(&state.recipes),
        "hasMore": window.has_more(),
        "total": state.recipes.len(),
    }))
}

async fn reset_paging(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let mut window = state.window.write().await;
    window.reset();
    Json(json!({ "visible": window.len(), "hasMore": window.has_more() }))
}

async fn load_more(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let mut window = state.window.write().await;
    window.advance();
    Json(json!({ "visible": window.len(), "hasMore": window.has_more() }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeenRequest {
    last_visible_index: usize,
}

async fn seen(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SeenRequest>,
) -> Json<serde_json::Value> {
    let mut window = state.window.write().await;
    let advanced = window.notify_near_end(body.last_visible_index);
    Json(json!({
        "advanced": advanced,
        "visible": window.len(),
        "hasMore": window.has_more(),
    }))
}

async fn recipe_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, AppError> {
    query::get_by_id(&state.recipes, &id)
        .cloned()
        .map(Json)
        .ok_or(AppError::NotFound(id))
}

#[derive(Debug, Deserialize)]
struct TimeQuery {
    max: u32,
}

async fn by_time(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TimeQuery>,
) -> Json<Vec<Recipe>> {
    let matches = query::by_max_minutes(&state.recipes, params.max);
    Json(matches.into_iter().cloned().collect())
}

#[derive(Debug, Deserialize)]
struct LetterQuery {
    letter: String,
}

async fn by_letter(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LetterQuery>,
) -> Result<Json<Vec<Recipe>>, AppError> {
    let letter = params
        .letter
        .trim()
        .chars()
        .next()
        .ok_or_else(|| AppError::InvalidInput("letter must be a single character".to_string()))?;
    let matches = query::by_first_letter(&state.recipes, letter);
    Ok(Json(matches.into_iter().cloned().collect()))
}

// --- Favorites ---

async fn favorites(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let reconciler = state.reconciler.read().await;
    let mut ids: Vec<String> = reconciler.favorites().borrow().iter().cloned().collect();
    ids.sort();
    Json(json!({ "favorites": ids }))
}

async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if query::get_by_id(&state.recipes, &id).is_none() {
        return Err(AppError::NotFound(id));
    }
    let reconciler = state.reconciler.read().await;
    let favorite = reconciler.toggle(&id).await?;
    Ok(Json(json!({ "id": id, "favorite": favorite })))
}

// --- Auth ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    email: String,
    password: String,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<Session>, AppError> {
    let session = state
        .accounts
        .register(&body.email, &body.password, body.display_name.as_deref())
        .await?;
    info!(email = %session.email, "account registered");
    state.swap_session(Some(session.uid.clone())).await;
    Ok(Json(session))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Session>, AppError> {
    let session = state.accounts.login(&body.email, &body.password).await?;
    info!(email = %session.email, "signed in");
    state.swap_session(Some(session.uid.clone())).await;
    Ok(Json(session))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthenticated)?;
    state.accounts.logout(token).await;
    state.swap_session(None).await;
    Ok(Json(json!({ "ok": true })))
}

async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Session>, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthenticated)?;
    let session = state
        .accounts
        .resolve(token)
        .await
        .ok_or(AppError::Unauthenticated)?;
    Ok(Json(session))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

// --- Settings ---

async fn get_settings(State(state): State<Arc<AppState>>) -> Json<Settings> {
    Json(state.settings.current())
}

async fn put_settings(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Settings>,
) -> Result<Json<Settings>, AppError> {
    state.settings.set_dark_mode(body.dark_mode).await?;
    Ok(Json(state.settings.current()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::temp_dir;
    use cookify_common::redis::RedisStore;

    async fn test_state(recipe_count: usize) -> Arc<AppState> {
        let recipes: Vec<Recipe> = (0..recipe_count)
            .map(|i| Recipe {
                id: format!("r-{i}"),
                title: format!("Receta {i}"),
                total_minutes: (i % 2 == 0).then_some(i as u32 * 10),
                ..Recipe::default()
            })
            .collect();
        let dir = temp_dir("server");
        let local = Arc::new(FavoritesStore::open(&dir).unwrap());
        let settings = Arc::new(SettingsStore::open(&dir).unwrap());
        let cloud = CloudFavorites::new(RedisStore::new(None));
        let accounts = AccountStore::new(RedisStore::new(None), 60);
        Arc::new(AppState::new(recipes, local, settings, cloud, accounts).await)
    }

    #[tokio::test]
    async fn paging_flow_over_http_state() {
        let state = test_state(25).await;

        let Json(body) = visible_recipes(State(Arc::clone(&state))).await;
        assert_eq!(body["recipes"].as_array().unwrap().len(), 10);
        assert_eq!(body["hasMore"], true);
        assert_eq!(body["total"], 25);

        // index 6 is short of the prefetch threshold, 7 triggers it
        let Json(body) = seen(
            State(Arc::clone(&state)),
            Json(SeenRequest {
                last_visible_index: 6,
            }),
        )
        .await;
        assert_eq!(body["advanced"], false);
        assert_eq!(body["visible"], 10);

        let Json(body) = seen(
            State(Arc::clone(&state)),
            Json(SeenRequest {
                last_visible_index: 7,
            }),
        )
        .await;
        assert_eq!(body["advanced"], true);
        assert_eq!(body["visible"], 20);

        let Json(body) = load_more(State(Arc::clone(&state))).await;
        assert_eq!(body["visible"], 25);
        assert_eq!(body["hasMore"], false);

        let Json(body) = reset_paging(State(state)).await;
        assert_eq!(body["visible"], 10);
        assert_eq!(body["hasMore"], true);
    }

    #[tokio::test]
    async fn toggle_rejects_unknown_recipes() {
        let state = test_state(3).await;
        let err = toggle_favorite(State(Arc::clone(&state)), Path("nope".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let Json(body) = toggle_favorite(State(Arc::clone(&state)), Path("r-1".to_string()))
            .await
            .unwrap();
        assert_eq!(body["favorite"], true);

        let Json(body) = favorites(State(state)).await;
        assert_eq!(body["favorites"], json!(["r-1"]));
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let state = test_state(1).await;
        let Json(before) = get_settings(State(Arc::clone(&state))).await;
        assert!(!before.dark_mode);

        let Json(after) = put_settings(State(state), Json(Settings { dark_mode: true }))
            .await
            .unwrap();
        assert!(after.dark_mode);
    }
}

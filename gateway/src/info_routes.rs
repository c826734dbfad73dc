//! Assistant, safety news and language helpers. All local, no upstream calls.

use axum::{
    extract::Path,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use safety_core::{
    assistant::{self, AssistantContext, AssistantReply, LocationContext, WeatherContext},
    language::{self, LanguageInfo, Phrasebook},
    news::{self, NewsItem},
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

pub fn info_router() -> Router<AppState> {
    Router::new()
        .route("/api/ai-assistant", post(ai_assistant))
        .route("/api/safety-news", get(safety_news))
        .route("/api/language/:location", get(location_language))
        .route("/api/language/phrases/:code", get(language_phrases))
}

#[derive(Debug, Default, Deserialize)]
pub struct AssistantRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub location: Option<LocationContext>,
    #[serde(default)]
    pub weather: Option<WeatherContext>,
}

pub async fn ai_assistant(ApiJson(req): ApiJson<AssistantRequest>) -> Json<AssistantReply> {
    let context = AssistantContext {
        location: req.location,
        weather: req.weather,
    };
    Json(assistant::respond(&req.message, context))
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct NewsResponse {
    pub news: Vec<NewsItem>,
}

pub async fn safety_news(ApiQuery(query): ApiQuery<NewsQuery>) -> ApiResult<Json<NewsResponse>> {
    let location = query.location.trim();
    if location.is_empty() {
        return Err(ApiError::BadRequest("Location parameter required".to_string()));
    }
    Ok(Json(NewsResponse {
        news: news::safety_news(location, Utc::now()),
    }))
}

#[derive(Debug, Serialize)]
pub struct LocationLanguage {
    pub location: String,
    pub language: LanguageInfo,
    pub phrases: Phrasebook,
}

pub async fn location_language(Path(location): Path<String>) -> Json<LocationLanguage> {
    let language = language::location_language(&location);
    let phrases = language::tourist_phrases(language.code);
    Json(LocationLanguage {
        location,
        language,
        phrases,
    })
}

#[derive(Debug, Serialize)]
pub struct PhrasesResponse {
    pub phrases: Phrasebook,
}

pub async fn language_phrases(Path(code): Path<String>) -> Json<PhrasesResponse> {
    Json(PhrasesResponse {
        phrases: language::tourist_phrases(&code),
    })
}

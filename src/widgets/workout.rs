// Training status and daily workout recommendation
use super::{f64_field, fetch_json, str_field};
use crate::application::widget_registry::{FetchContext, WidgetModule, WidgetSource};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

pub fn module() -> WidgetModule {
    WidgetModule::new(
        "workout-status",
        "Training Status",
        "Displays your current Form, Fitness, Fatigue, VO2 Max, and an AI-generated daily workout recommendation.",
        Arc::new(WorkoutSource),
    )
}

pub struct WorkoutSource;

/// Training stress balance bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormBand {
    Fresh,
    Productive,
    Tired,
    Overreaching,
}

impl FormBand {
    pub fn for_tsb(tsb: f64) -> Self {
        if tsb > 5.0 {
            FormBand::Fresh
        } else if tsb >= -10.0 {
            FormBand::Productive
        } else if tsb >= -20.0 {
            FormBand::Tired
        } else {
            FormBand::Overreaching
        }
    }
}

/// Acute:chronic workload ratio bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AcwrBand {
    InjuryRisk,
    Optimal,
    Detraining,
    NoData,
}

impl AcwrBand {
    pub fn for_ratio(acwr: f64) -> Self {
        if acwr > 1.3 {
            AcwrBand::InjuryRisk
        } else if acwr >= 0.8 {
            AcwrBand::Optimal
        } else if acwr > 0.0 {
            AcwrBand::Detraining
        } else {
            AcwrBand::NoData
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Vo2Band {
    Poor,
    Fair,
    Good,
    Excellent,
    Superior,
}

impl Vo2Band {
    pub fn for_vo2(vo2: f64) -> Self {
        match vo2 {
            v if v < 40.0 => Vo2Band::Poor,
            v if v < 45.0 => Vo2Band::Fair,
            v if v < 50.0 => Vo2Band::Good,
            v if v < 55.0 => Vo2Band::Excellent,
            _ => Vo2Band::Superior,
        }
    }
}

#[derive(Debug, Serialize)]
struct WorkoutBody {
    workout: String,
    category: String,
    fitness: f64,
    fatigue: f64,
    form: f64,
    acwr: f64,
    vo2_max: Option<f64>,
    details: String,
    history: Vec<Value>,
    form_band: FormBand,
    acwr_band: AcwrBand,
    vo2_band: Option<Vo2Band>,
}

#[async_trait]
impl WidgetSource for WorkoutSource {
    async fn load(&self, ctx: &FetchContext) -> anyhow::Result<Value> {
        let base = &ctx.endpoints.workout_url;
        let user = &ctx.endpoints.workout_user_id;
        let recommend_url = format!("{}/recommend/{}", base, urlencoding::encode(user));
        let status_url = format!("{}/status/{}", base, urlencoding::encode(user));

        let (recommend, status) = tokio::try_join!(
            fetch_json::<Value>(&ctx.client, &recommend_url, HeaderMap::new()),
            fetch_json::<Value>(&ctx.client, &status_url, HeaderMap::new()),
        )?;

        Ok(serde_json::to_value(summarize(&recommend, &status))?)
    }
}

fn summarize(recommend: &Value, status: &Value) -> WorkoutBody {
    let workout = recommend.get("workout").filter(|w| !w.is_null());
    let form = f64_field(status, "form_tsb").unwrap_or(0.0);
    let acwr = f64_field(status, "acwr").unwrap_or(0.0);
    let vo2_max = f64_field(recommend, "latest_vo2_max")
        .or_else(|| f64_field(status, "vo2_max"))
        .or_else(|| f64_field(status, "vo2max"))
        .or_else(|| f64_field(status, "VO2_max"));

    WorkoutBody {
        workout: workout
            .and_then(|w| str_field(w, "name"))
            .unwrap_or_else(|| "Rest Day".to_string()),
        category: str_field(recommend, "recommended_category")
            .unwrap_or_else(|| "General".to_string()),
        fitness: f64_field(status, "fitness_ctl").unwrap_or(0.0),
        fatigue: f64_field(status, "fatigue_atl").unwrap_or(0.0),
        form,
        acwr,
        vo2_max,
        details: str_field(recommend, "ai_reasoning")
            .or_else(|| str_field(status, "ai_insight"))
            .or_else(|| workout.and_then(|w| str_field(w, "description")))
            .unwrap_or_else(|| "No details provided.".to_string()),
        history: status
            .get("history")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        form_band: FormBand::for_tsb(form),
        acwr_band: AcwrBand::for_ratio(acwr),
        vo2_band: vo2_max.map(Vo2Band::for_vo2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::widget_registry::tests::test_context;
    use crate::widgets::tests::spawn_backend;
    use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    #[test]
    fn test_bands() {
        assert_eq!(FormBand::for_tsb(12.0), FormBand::Fresh);
        assert_eq!(FormBand::for_tsb(-10.0), FormBand::Productive);
        assert_eq!(FormBand::for_tsb(-15.0), FormBand::Tired);
        assert_eq!(FormBand::for_tsb(-25.0), FormBand::Overreaching);

        assert_eq!(AcwrBand::for_ratio(1.5), AcwrBand::InjuryRisk);
        assert_eq!(AcwrBand::for_ratio(1.3), AcwrBand::Optimal);
        assert_eq!(AcwrBand::for_ratio(0.5), AcwrBand::Detraining);
        assert_eq!(AcwrBand::for_ratio(0.0), AcwrBand::NoData);

        assert_eq!(Vo2Band::for_vo2(38.0), Vo2Band::Poor);
        assert_eq!(Vo2Band::for_vo2(52.3), Vo2Band::Excellent);
        assert_eq!(Vo2Band::for_vo2(60.0), Vo2Band::Superior);
    }

    #[test]
    fn test_summarize_empty_documents() {
        let body = summarize(&json!({}), &json!({}));

        assert_eq!(body.workout, "Rest Day");
        assert_eq!(body.category, "General");
        assert_eq!(body.fitness, 0.0);
        assert_eq!(body.vo2_max, None);
        assert_eq!(body.vo2_band, None);
        assert_eq!(body.details, "No details provided.");
        assert!(body.history.is_empty());
    }

    #[test]
    fn test_vo2_fallback_chain() {
        let body = summarize(&json!({ "workout": null }), &json!({ "vo2max": 47.5 }));

        assert_eq!(body.vo2_max, Some(47.5));
        assert_eq!(body.vo2_band, Some(Vo2Band::Good));
    }

    #[tokio::test]
    async fn test_load_combines_both_documents() {
        let base = spawn_backend(
            Router::new()
                .route(
                    "/recommend/:user",
                    get(|Path(user): Path<String>| async move {
                        assert_eq!(user, "42");
                        Json(json!({
                            "workout": { "name": "Tempo Run", "description": "20 min at threshold" },
                            "recommended_category": "Run",
                            "latest_vo2_max": 51.2
                        }))
                    }),
                )
                .route(
                    "/status/:user",
                    get(|| async {
                        Json(json!({
                            "fitness_ctl": 80,
                            "fatigue_atl": 95,
                            "form_tsb": -15,
                            "acwr": 1.1,
                            "history": [{ "date": "2026-03-01", "ctl": 79 }]
                        }))
                    }),
                ),
        )
        .await;
        let mut ctx = test_context();
        ctx.endpoints.workout_url = base;
        ctx.endpoints.workout_user_id = "42".into();

        let body = WorkoutSource.load(&ctx).await.unwrap();

        assert_eq!(body["workout"], "Tempo Run");
        assert_eq!(body["details"], "20 min at threshold");
        assert_eq!(body["form_band"], "tired");
        assert_eq!(body["acwr_band"], "optimal");
        assert_eq!(body["vo2_band"], "excellent");
        assert_eq!(body["history"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_one_failed_request_fails_the_tile() {
        let base = spawn_backend(
            Router::new()
                .route("/recommend/:user", get(|| async { Json(json!({})) }))
                .route(
                    "/status/:user",
                    get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
                ),
        )
        .await;
        let mut ctx = test_context();
        ctx.endpoints.workout_url = base;

        assert!(WorkoutSource.load(&ctx).await.is_err());
    }
}

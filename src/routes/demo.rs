use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;

use crate::auth::AuthenticatedUser;

const SUMMARIES: [&str; 10] = [
    "Freezing",
    "Bracing",
    "Chilly",
    "Cool",
    "Mild",
    "Warm",
    "Balmy",
    "Hot",
    "Sweltering",
    "Scorching",
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherForecast {
    pub date: NaiveDate,
    pub temperature_c: i32,
    pub temperature_f: i32,
    pub summary: String,
}

impl WeatherForecast {
    pub fn new(date: NaiveDate, temperature_c: i32, summary: &str) -> Self {
        Self {
            date,
            temperature_c,
            temperature_f: 32 + (f64::from(temperature_c) / 0.5556) as i32,
            summary: summary.to_string(),
        }
    }
}

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(">>> get")
}

#[get("/{id:-?\\d+}")]
pub async fn echo_id(id: web::Path<i32>) -> impl Responder {
    HttpResponse::Ok().json(format!(">>> id: {}", id.into_inner()))
}

#[post("/")]
pub async fn index_post() -> impl Responder {
    HttpResponse::Ok().json(">>> post")
}

/// Five days of made-up forecasts. Mounted behind `AuthMiddleware`.
pub async fn weather_forecast(user: AuthenticatedUser) -> impl Responder {
    log::info!(">>> GET /weatherforecast for {}", user.0.name);

    let today = Utc::now().date_naive();
    let mut rng = rand::thread_rng();
    let forecast: Vec<WeatherForecast> = (1..=5)
        .map(|day| {
            WeatherForecast::new(
                today + Duration::days(day),
                rng.gen_range(-20..55),
                SUMMARIES[rng.gen_range(0..SUMMARIES.len())],
            )
        })
        .collect();

    HttpResponse::Ok().json(forecast)
}

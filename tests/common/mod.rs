use std::path::Path;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use axum_session_middleware::AxumSessionConfig;
use ridership_portal::{
    app,
    app_state::AppState,
    handlers::register::RegistrationRules,
    session_store,
    store::{RegistryVariant, StoreConfig, TabularStore},
};
use rust_xlsxwriter::Workbook;
use serde_json::Value;
use tower::ServiceExt;

pub const COLUMNS: [&str; 12] = [
    "payUserID",
    "typeCard",
    "userName",
    "userSex",
    "userBirthYear",
    "transID",
    "routeID",
    "routeName",
    "corridorName",
    "transDate",
    "duration",
    "direction",
];

pub const TRIPS: &[[&str; 12]] = &[
    ["123456789012", "dki", "Ani", "F", "1990", "T1", "1", "Rute 1", "Corridor 1", "2023-04-03 05:21:44", "30", "0"],
    ["999988887777", "emoney", "Budi", "M", "1985", "T2", "2", "Rute 2", "Corridor 2", "2023-04-03 06:10:00", "15", "1"],
    ["123456789012", "dki", "Ani", "F", "1990", "T3", "2", "Rute 2", "Corridor 2", "2023-04-04 07:00:00", "12", "1"],
];

/// Trip sheet with numeric ids, as the real export has them, plus a notes sheet.
pub fn write_workbook(path: &Path) {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("TransJakarta").unwrap();
    for (col, name) in COLUMNS.iter().enumerate() {
        sheet.write_string(0, col as u16, *name).unwrap();
    }
    for (i, row) in TRIPS.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            let r = i as u32 + 1;
            match value.parse::<f64>() {
                Ok(n) => sheet.write_number(r, col as u16, n).unwrap(),
                Err(_) => sheet.write_string(r, col as u16, *value).unwrap(),
            };
        }
    }

    let notes = workbook.add_worksheet();
    notes.set_name("Notes").unwrap();
    notes.write_string(0, 0, "sample data").unwrap();

    workbook.save(path).unwrap();
}

pub fn test_app(path: &Path, variant: RegistryVariant, strict_id_format: bool) -> Router {
    let store = TabularStore::new(StoreConfig {
        workbook: path.to_path_buf(),
        trip_sheet: "TransJakarta".into(),
        users_sheet: "Users".into(),
        variant,
    });
    let state = AppState::load(store, RegistrationRules { strict_id_format }).expect("dataset");
    let sessions = session_store(&state, AxumSessionConfig::default());
    app(state, sessions)
}

/// A browser: remembers the session cookie between requests.
pub struct Browser {
    app: Router,
    cookie: Option<String>,
}

impl Browser {
    pub fn new(app: Router) -> Self {
        Browser { app, cookie: None }
    }

    pub async fn get(&mut self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri), Body::empty()).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> (StatusCode, Value) {
        let builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        self.send(builder, Body::from(body.to_string())).await
    }

    pub async fn click(&mut self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::post(uri), Body::empty()).await
    }

    async fn send(&mut self, mut builder: axum::http::request::Builder, body: Body) -> (StatusCode, Value) {
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie.as_str());
        }
        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("response");

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().expect("cookie").split(';').next().unwrap_or_default();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }
}

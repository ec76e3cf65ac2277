use std::collections::BTreeSet;

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{
    app_state::AppState,
    controller::Action,
    error::PortalError,
    models::TripRecord,
    views::CorridorView,
};

use super::{perform, PageResult, PortalSession};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorridorSearchRequest {
    #[serde(default)]
    pub route_name: String,
}

/// Distinct route names of the dataset, sorted; trips without a route are left out.
pub fn route_names(trips: &[TripRecord]) -> Vec<String> {
    trips
        .iter()
        .filter_map(|t| t.route_name.as_deref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn corridor_view(trips: &[TripRecord]) -> CorridorView {
    CorridorView {
        route_names: route_names(trips),
    }
}

/// Corridor of the first trip on `route_name`. Later trips on the same route
/// are not consulted, even when the first one has no corridor.
pub fn find_corridor<'a>(trips: &'a [TripRecord], route_name: &str) -> Result<&'a str, PortalError> {
    if route_name.is_empty() {
        return Err(PortalError::Validation("Choose a route first.".to_string()));
    }

    trips
        .iter()
        .find(|t| t.route_name.as_deref() == Some(route_name))
        .and_then(|t| t.corridor_name.as_deref())
        .ok_or_else(|| PortalError::NotFound("Corridor not found.".to_string()))
}

pub async fn search(
    State(app): State<AppState>,
    session: PortalSession,
    Json(req): Json<CorridorSearchRequest>,
) -> PageResult {
    perform(
        &app,
        &session,
        Action::SearchCorridor {
            route_name: req.route_name,
        },
    )
}

#[cfg(test)]
mod test {
    use super::*;

    fn trip(route: Option<&str>, corridor: Option<&str>) -> TripRecord {
        TripRecord {
            trans_id: "T".into(),
            pay_user_id: "123456789012".into(),
            route_id: "1".into(),
            route_name: route.map(Into::into),
            corridor_name: corridor.map(Into::into),
            trans_date: String::new(),
            duration: String::new(),
            direction: String::new(),
        }
    }

    #[test]
    fn route_names_are_distinct_and_sorted() {
        let trips = [
            trip(Some("Rute 2"), Some("Corridor 2")),
            trip(None, None),
            trip(Some("Rute 1"), Some("Corridor 1")),
            trip(Some("Rute 2"), Some("Corridor 2")),
        ];

        assert_eq!(route_names(&trips), ["Rute 1", "Rute 2"]);
    }

    #[test]
    fn first_matching_trip_wins() {
        let trips = [
            trip(Some("Rute 1"), Some("Corridor 1")),
            trip(Some("Rute 1"), Some("Corridor 9")),
        ];

        assert_eq!(find_corridor(&trips, "Rute 1").unwrap(), "Corridor 1");
    }

    #[test]
    fn first_trip_without_corridor_is_not_found() {
        let trips = [
            trip(Some("Rute 1"), None),
            trip(Some("Rute 1"), Some("Corridor 1")),
        ];

        let err = find_corridor(&trips, "Rute 1").unwrap_err();
        assert_eq!(err.to_string(), "Corridor not found.");
    }

    #[test]
    fn absent_route_is_not_found_rather_than_a_panic() {
        let trips = [trip(Some("Rute 1"), Some("Corridor 1"))];

        let err = find_corridor(&trips, "Rute 404").unwrap_err();
        assert!(matches!(err, PortalError::NotFound(_)));

        let err = find_corridor(&trips, "").unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));
    }
}

use crate::{
    error::PortalError,
    models::TripRecord,
    session_state::SessionState,
    views::{HistoryRow, HistoryView, TripHistory},
};

/// Trips of `pay_user_id`, in dataset order.
pub fn trip_history(trips: &[TripRecord], pay_user_id: &str) -> Vec<HistoryRow> {
    trips
        .iter()
        .filter(|t| t.pay_user_id == pay_user_id)
        .map(|t| HistoryRow {
            trans_id: t.trans_id.clone(),
            route_id: t.route_id.clone(),
            trans_date: t.trans_date.clone(),
            duration: t.duration.clone(),
            direction: t.direction.clone(),
        })
        .collect()
}

pub fn history_view(state: &SessionState) -> Result<HistoryView, PortalError> {
    let profile = state.current_user().ok_or_else(|| {
        PortalError::MissingProfile(state.user_id().unwrap_or_default().to_string())
    })?;

    let rows = trip_history(&state.trips, &profile.pay_user_id);
    let history = if rows.is_empty() {
        TripHistory::NoHistory
    } else {
        TripHistory::Trips(rows)
    };

    Ok(HistoryView {
        profile: profile.clone(),
        history,
    })
}

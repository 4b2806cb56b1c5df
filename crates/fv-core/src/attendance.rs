//! Staff attendance: geolocate once, then post the coordinates.
//!
//! The server decides whether the position is close enough to a branch and
//! whether the action is allowed today. The client only refuses locally when
//! the last status it fetched already shows the action done.

use async_trait::async_trait;
use fv_api_types::{AttendanceResponse, AttendanceToday, CoordinatesRequest};

use crate::api::{ApiError, AttendanceApi};
use crate::config::AttendanceConfig;

/// Single-shot position request options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoOptions {
    pub high_accuracy: bool,
    pub timeout_ms: u32,
    /// 0 means never reuse a cached fix.
    pub maximum_age_ms: u32,
}

impl Default for GeoOptions {
    fn default() -> Self {
        Self::from(&AttendanceConfig::default())
    }
}

impl From<&AttendanceConfig> for GeoOptions {
    fn from(cfg: &AttendanceConfig) -> Self {
        Self {
            high_accuracy: cfg.high_accuracy,
            timeout_ms: cfg.geolocation_timeout_ms,
            maximum_age_ms: cfg.maximum_age_ms,
        }
    }
}

/// Position failures, one per browser error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeoError {
    #[error("Location permission denied. Please enable location access and try again.")]
    PermissionDenied,
    #[error("Location information is unavailable. Please check your device settings.")]
    PositionUnavailable,
    #[error("Location request timed out. Please try again.")]
    Timeout,
    #[error("An unknown error occurred while retrieving your location.")]
    Unknown,
}

impl GeoError {
    /// Map a `GeolocationPositionError.code`.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => GeoError::PermissionDenied,
            2 => GeoError::PositionUnavailable,
            3 => GeoError::Timeout,
            _ => GeoError::Unknown,
        }
    }
}

#[async_trait(?Send)]
pub trait Geolocator {
    async fn current_position(&self, options: &GeoOptions) -> Result<CoordinatesRequest, GeoError>;
}

/// A position known up front, e.g. from `--lat/--lon`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPosition(pub CoordinatesRequest);

impl FixedPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self(CoordinatesRequest { latitude, longitude })
    }
}

#[async_trait(?Send)]
impl Geolocator for FixedPosition {
    async fn current_position(&self, _options: &GeoOptions) -> Result<CoordinatesRequest, GeoError> {
        Ok(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceAction {
    CheckIn,
    CheckOut,
}

impl AttendanceAction {
    pub fn label(&self) -> &'static str {
        match self {
            AttendanceAction::CheckIn => "check-in",
            AttendanceAction::CheckOut => "check-out",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttendanceError {
    #[error("You have already checked in today.")]
    AlreadyCheckedIn,
    #[error("You have already checked out today.")]
    AlreadyCheckedOut,
    #[error("You need to check in before checking out.")]
    NotCheckedIn,
    #[error(transparent)]
    Geo(#[from] GeoError),
    /// Server rejections keep the server's message as their display text.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Whether `action` is still open according to the last fetched status.
/// Without a status the server gets to decide.
pub fn precheck(action: AttendanceAction, today: Option<&AttendanceToday>) -> Result<(), AttendanceError> {
    let Some(today) = today else {
        return Ok(());
    };
    match action {
        AttendanceAction::CheckIn if today.check_in_time.is_some() => {
            Err(AttendanceError::AlreadyCheckedIn)
        }
        AttendanceAction::CheckOut if today.check_out_time.is_some() => {
            Err(AttendanceError::AlreadyCheckedOut)
        }
        AttendanceAction::CheckOut if today.check_in_time.is_none() => {
            Err(AttendanceError::NotCheckedIn)
        }
        _ => Ok(()),
    }
}

/// Result of a successful check-in/out: the server's reply and the status
/// re-fetched afterwards (`None` if that fetch failed).
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceOutcome {
    pub response: AttendanceResponse,
    pub today: Option<AttendanceToday>,
}

impl AttendanceOutcome {
    /// Server message, with the matched branch when the server reports one.
    pub fn summary(&self) -> String {
        match &self.response.location_info {
            Some(info) => format!(
                "{} ({}, {:.0} m away)",
                self.response.message, info.branch, info.distance
            ),
            None => self.response.message.clone(),
        }
    }
}

/// Geolocate once, post to the check-in or check-out endpoint, then refresh
/// today's status. A position failure means no request is sent.
pub async fn mark_attendance(
    api: &dyn AttendanceApi,
    geo: &dyn Geolocator,
    options: &GeoOptions,
    action: AttendanceAction,
    last: Option<&AttendanceToday>,
) -> Result<AttendanceOutcome, AttendanceError> {
    precheck(action, last)?;

    let position = geo.current_position(options).await.map_err(|e| {
        tracing::warn!(action = action.label(), error = %e, "geolocation failed");
        e
    })?;
    tracing::debug!(
        action = action.label(),
        lat = position.latitude,
        lon = position.longitude,
        "position acquired"
    );

    let response = match action {
        AttendanceAction::CheckIn => api.check_in(position).await,
        AttendanceAction::CheckOut => api.check_out(position).await,
    }
    .map_err(|e| {
        tracing::warn!(action = action.label(), error = %e, "attendance rejected");
        e
    })?;
    tracing::info!(action = action.label(), "attendance recorded");

    let today = match api.today().await {
        Ok(t) => Some(t),
        Err(e) => {
            tracing::warn!(error = %e, "could not refresh attendance status");
            None
        }
    };
    Ok(AttendanceOutcome { response, today })
}

pub async fn check_in(
    api: &dyn AttendanceApi,
    geo: &dyn Geolocator,
    options: &GeoOptions,
    last: Option<&AttendanceToday>,
) -> Result<AttendanceOutcome, AttendanceError> {
    mark_attendance(api, geo, options, AttendanceAction::CheckIn, last).await
}

pub async fn check_out(
    api: &dyn AttendanceApi,
    geo: &dyn Geolocator,
    options: &GeoOptions,
    last: Option<&AttendanceToday>,
) -> Result<AttendanceOutcome, AttendanceError> {
    mark_attendance(api, geo, options, AttendanceAction::CheckOut, last).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fv_api_types::LocationInfo;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeAttendance {
        posts: RefCell<Vec<(AttendanceAction, CoordinatesRequest)>>,
        reject: Option<ApiError>,
    }

    #[async_trait(?Send)]
    impl AttendanceApi for FakeAttendance {
        async fn today(&self) -> Result<AttendanceToday, ApiError> {
            let checked_in = !self.posts.borrow().is_empty();
            Ok(AttendanceToday {
                check_in_time: checked_in.then(Utc::now),
                ..Default::default()
            })
        }

        async fn check_in(&self, at: CoordinatesRequest) -> Result<AttendanceResponse, ApiError> {
            self.posts.borrow_mut().push((AttendanceAction::CheckIn, at));
            match &self.reject {
                Some(e) => Err(e.clone()),
                None => Ok(AttendanceResponse {
                    message: "Checked in successfully".into(),
                    location_info: Some(LocationInfo { branch: "Pune".into(), distance: 42.4 }),
                }),
            }
        }

        async fn check_out(&self, at: CoordinatesRequest) -> Result<AttendanceResponse, ApiError> {
            self.posts.borrow_mut().push((AttendanceAction::CheckOut, at));
            Ok(AttendanceResponse { message: "Checked out".into(), location_info: None })
        }
    }

    struct Failing(u16);

    #[async_trait(?Send)]
    impl Geolocator for Failing {
        async fn current_position(&self, _: &GeoOptions) -> Result<CoordinatesRequest, GeoError> {
            Err(GeoError::from_code(self.0))
        }
    }

    #[test]
    fn default_options_are_single_shot_high_accuracy() {
        let opts = GeoOptions::default();
        assert!(opts.high_accuracy);
        assert_eq!(opts.timeout_ms, 10_000);
        assert_eq!(opts.maximum_age_ms, 0);
    }

    #[test]
    fn error_codes_have_distinct_messages() {
        let msgs: Vec<String> = [1, 2, 3, 0, 9].iter().map(|c| GeoError::from_code(*c).to_string()).collect();
        assert!(msgs[0].starts_with("Location permission denied"));
        assert!(msgs[1].starts_with("Location information is unavailable"));
        assert!(msgs[2].starts_with("Location request timed out"));
        assert_eq!(msgs[3], msgs[4]);
        assert_ne!(msgs[0], msgs[1]);
    }

    #[tokio::test]
    async fn denied_permission_sends_nothing() {
        let api = FakeAttendance::default();
        let err = check_in(&api, &Failing(1), &GeoOptions::default(), None).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Location permission denied. Please enable location access and try again."
        );
        assert!(api.posts.borrow().is_empty());
    }

    #[tokio::test]
    async fn check_in_posts_coordinates_and_refreshes() {
        let api = FakeAttendance::default();
        let here = FixedPosition::new(18.52, 73.85);
        let out = check_in(&api, &here, &GeoOptions::default(), None).await.unwrap();
        assert_eq!(api.posts.borrow()[0], (AttendanceAction::CheckIn, here.0));
        assert_eq!(out.summary(), "Checked in successfully (Pune, 42 m away)");
        assert!(out.today.unwrap().check_in_time.is_some());
    }

    #[tokio::test]
    async fn server_message_is_verbatim() {
        let api = FakeAttendance {
            reject: Some(ApiError::Rejected {
                status: 403,
                message: "You are 2.3 km away from the nearest branch".into(),
            }),
            ..Default::default()
        };
        let err = check_in(&api, &FixedPosition::new(0.0, 0.0), &GeoOptions::default(), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "You are 2.3 km away from the nearest branch");
    }

    #[tokio::test]
    async fn already_done_is_refused_locally() {
        let api = FakeAttendance::default();
        let done = AttendanceToday {
            check_in_time: Some(Utc::now()),
            check_out_time: Some(Utc::now()),
            status: Some("present".into()),
        };
        let here = FixedPosition::new(1.0, 1.0);
        let err = check_in(&api, &here, &GeoOptions::default(), Some(&done)).await.unwrap_err();
        assert_eq!(err, AttendanceError::AlreadyCheckedIn);
        let err = check_out(&api, &here, &GeoOptions::default(), Some(&done)).await.unwrap_err();
        assert_eq!(err, AttendanceError::AlreadyCheckedOut);
        assert!(api.posts.borrow().is_empty());

        let fresh = AttendanceToday::default();
        let err = check_out(&api, &here, &GeoOptions::default(), Some(&fresh)).await.unwrap_err();
        assert_eq!(err, AttendanceError::NotCheckedIn);
    }
}

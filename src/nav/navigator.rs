//! Asynchronous orchestration
//!
//! `Navigator` owns the navigation state behind an async mutex and runs the
//! external calls. The lock is never held across an external call: each
//! operation takes a ticket, releases the lock, awaits the service, then
//! locks again to commit. A completion whose ticket was superseded in the
//! meantime is dropped.

use crate::config::Config;
use crate::device::DeviceTracker;
use crate::error::Result;
use crate::geo::Position;
use crate::geocode::{normalize_query, Geocoder};
use crate::nav::services::NavServices;
use crate::nav::{Mode, NavigationState, SelectOutcome, Selection, Toggle};
use crate::route::RoutePlanner;
use crate::sensor::{AccuracyProfile, LocationSensor};
use crate::view::{Commit, ViewState};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Navigation state plus the services that feed it
pub struct Navigator<S: NavServices> {
    state: Mutex<NavigationState>,
    services: S,
    accuracy: AccuracyProfile,
}

impl<S: NavServices> Navigator<S> {
    pub fn new(state: NavigationState, services: S, accuracy: AccuracyProfile) -> Self {
        Self {
            state: Mutex::new(state),
            services,
            accuracy,
        }
    }

    /// Build the initial state and sensor profile from configuration
    pub fn from_config(config: &Config, services: S) -> Result<Self> {
        Ok(Self::new(
            NavigationState::from_config(config)?,
            services,
            config.accuracy()?,
        ))
    }

    pub fn services(&self) -> &S {
        &self.services
    }

    /// Current view snapshot
    pub async fn view(&self) -> ViewState {
        self.state.lock().await.view_state()
    }

    pub async fn mode(&self) -> Mode {
        self.state.lock().await.mode()
    }

    /// Ask the sensor for a fix and move the origin there
    ///
    /// A sensor failure leaves the state untouched.
    pub async fn locate_user(&self) -> Result<ViewState> {
        let position = self
            .services
            .sensor()
            .current_position(self.accuracy)
            .await
            .inspect_err(|e| warn!(error = %e, "Location sensor failed"))?;
        self.move_origin(position, true).await
    }

    /// Move the origin to a position reported by the host
    pub async fn set_user_position(&self, position: Position) -> Result<ViewState> {
        position.validate()?;
        self.move_origin(position, false).await
    }

    async fn move_origin(&self, position: Position, from_sensor: bool) -> Result<ViewState> {
        let ticket = {
            let mut state = self.state.lock().await;
            if from_sensor {
                state.reset_to_user_position(position)
            } else {
                state.set_user_position(position)
            }
        };
        info!(%position, "User position updated");

        let place = self.services.geocoder().reverse_geocode(position).await;

        let mut state = self.state.lock().await;
        settle("origin place", state.apply_origin_place(ticket, place))?;
        Ok(state.view_state())
    }

    /// Replace the marker set with the places matching `query`
    ///
    /// A blank query fails before any request is made.
    pub async fn search(&self, query: &str) -> Result<ViewState> {
        let query = normalize_query(query)?;
        let ticket = self.state.lock().await.begin_search();

        let result = self.services.geocoder().search_places(query).await;

        let mut state = self.state.lock().await;
        settle("place search", state.apply_search(ticket, result))?;
        Ok(state.view_state())
    }

    /// Handle a tap on a marker or on empty map space
    pub async fn select(&self, selection: Selection) -> Result<ViewState> {
        let outcome = self.state.lock().await.select(selection)?;

        match outcome {
            SelectOutcome::Done => Ok(self.view().await),
            SelectOutcome::NeedsPlace(ticket, marker) => {
                let place = self
                    .services
                    .geocoder()
                    .reverse_geocode(marker.position)
                    .await;

                let mut state = self.state.lock().await;
                settle("destination place", state.apply_tap_place(ticket, marker, place))?;
                Ok(state.view_state())
            }
        }
    }

    /// Toggle navigation: stop when navigating, otherwise plan and start
    pub async fn start_navigation(&self) -> Result<ViewState> {
        let toggle = self.state.lock().await.start_navigation()?;

        let request = match toggle {
            Toggle::Stopped => return Ok(self.view().await),
            Toggle::Plan(request) => request,
        };
        debug!(
            origin = %request.origin,
            destination = %request.destination,
            "Planning route"
        );

        let route = self
            .services
            .planner()
            .plan_driving_route(request.origin, request.destination)
            .await;

        let mut state = self.state.lock().await;
        settle("route", state.commit_route(request.ticket, route))?;
        Ok(state.view_state())
    }

    /// Leave navigation
    pub async fn stop_navigation(&self) -> ViewState {
        let mut state = self.state.lock().await;
        state.stop_navigation();
        state.view_state()
    }

    /// Show the guide stick's last reported position
    pub async fn locate_device(&self) -> Result<ViewState> {
        let ticket = self.state.lock().await.begin_device_request();

        let result = self.services.tracker().locate_device().await;

        let mut state = self.state.lock().await;
        settle("device position", state.apply_device_position(ticket, result))?;
        Ok(state.view_state())
    }

    /// Distance between the user and the guide stick, when both are known
    pub async fn device_distance_meters(&self) -> Option<f64> {
        self.state.lock().await.view().device_distance_meters()
    }
}

/// Log the fate of a completion and surface its error
fn settle(request: &str, result: Result<Commit>) -> Result<()> {
    match result {
        Ok(Commit::Applied) => Ok(()),
        Ok(Commit::Stale) => {
            debug!(request, "Dropped stale completion");
            Ok(())
        }
        Err(e) => {
            warn!(request, error = %e, "Request failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, RouteFailure};
    use crate::geo::IconKind;
    use crate::testing::{place_name, Gate, MockServices, CAMPUS, HOME, STICK};
    use crate::view::ViewModel;
    use std::sync::Arc;

    fn navigator(services: MockServices) -> Navigator<MockServices> {
        Navigator::new(NavigationState::default(), services, AccuracyProfile::Fine)
    }

    async fn with_destination(services: MockServices) -> Navigator<MockServices> {
        let nav = navigator(services);
        nav.locate_user().await.unwrap();
        nav.search("campus").await.unwrap();
        nav.select(Selection::Marker { marker_id: 0 }).await.unwrap();
        nav
    }

    #[tokio::test]
    async fn test_locate_user_sets_origin_and_text() {
        let nav = navigator(MockServices::new());
        let view = nav.locate_user().await.unwrap();

        assert_eq!(view.user_position, Some(HOME));
        assert_eq!(view.center, Some(HOME));
        assert_eq!(view.status_text.title, place_name(HOME));
        assert_eq!(view.viewport_points, vec![HOME]);
    }

    #[tokio::test]
    async fn test_sensor_failure_leaves_state() {
        let nav = navigator(MockServices::new().without_sensor());
        let result = nav.locate_user().await;

        assert!(matches!(result, Err(Error::Sensor(_))));
        assert!(nav.view().await.user_position.is_none());
        assert_eq!(nav.services().sensor.calls(), 1);
        assert_eq!(nav.services().geocoder.reverse_calls(), 0);
    }

    #[tokio::test]
    async fn test_origin_commits_when_lookup_fails() {
        let nav = navigator(MockServices::new());
        nav.services().geocoder.set_fail_reverse(true);

        let result = nav.set_user_position(CAMPUS).await;

        assert!(matches!(result, Err(Error::Geocode(_))));
        let view = nav.view().await;
        assert_eq!(view.user_position, Some(CAMPUS));
        assert_eq!(view.status_text.title, "My location");
    }

    #[tokio::test]
    async fn test_stale_origin_text_not_applied() {
        let gate = Gate::new();
        let a = Position::new(28.70, 115.80);
        let b = Position::new(28.71, 115.81);
        let nav = navigator(MockServices::new().hold_reverse(a, gate.clone()));

        let first = nav.set_user_position(a);
        let second = async {
            gate.entered().await;
            let view = nav.set_user_position(b).await;
            gate.release();
            view
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(second.unwrap().status_text.title, place_name(b));
        let view = first.unwrap();
        assert_eq!(view.user_position, Some(b));
        assert_eq!(view.status_text.title, place_name(b));
    }

    #[tokio::test]
    async fn test_search_populates_candidates() {
        let nav = navigator(MockServices::new());
        let view = nav.search("  honggutan ").await.unwrap();

        let ids: Vec<u32> = view.markers.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert!(view.markers.iter().all(|m| m.icon_kind == IconKind::Candidate));
        assert_eq!(view.viewport_points.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_search_makes_no_request() {
        let nav = navigator(MockServices::new());
        assert!(matches!(nav.search("   ").await, Err(Error::Geocode(_))));
        assert_eq!(nav.services().geocoder.search_calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_search_keeps_markers() {
        let nav = navigator(MockServices::new());
        nav.search("campus").await.unwrap();

        assert!(matches!(nav.search("airport").await, Err(Error::Geocode(_))));
        assert_eq!(nav.view().await.markers.len(), 1);
    }

    #[tokio::test]
    async fn test_newer_search_wins() {
        let gate = Gate::new();
        let nav = navigator(MockServices::new().hold_search("library", gate.clone()));

        let first = nav.search("library");
        let second = async {
            gate.entered().await;
            let view = nav.search("campus").await;
            gate.release();
            view
        };
        let (first, second) = tokio::join!(first, second);
        second.unwrap();

        let view = first.unwrap();
        assert_eq!(view.markers.len(), 1);
        assert_eq!(view.markers[0].name, "Honggutan Campus");
    }

    #[tokio::test]
    async fn test_missing_endpoint_makes_no_route_call() {
        let nav = navigator(MockServices::new());
        nav.locate_user().await.unwrap();

        assert!(matches!(
            nav.start_navigation().await,
            Err(Error::MissingEndpoint)
        ));
        assert_eq!(nav.mode().await, Mode::Browsing);
        assert_eq!(nav.services().planner.calls(), 0);
    }

    #[tokio::test]
    async fn test_unresolvable_destination_makes_no_route_call() {
        let mut view = ViewModel::default();
        view.set_destination(Position::new(f64::NAN, 115.80), "Unplaced pin");
        let nav = Navigator::new(
            NavigationState::new(view),
            MockServices::new(),
            AccuracyProfile::Fine,
        );
        nav.locate_user().await.unwrap();

        assert!(matches!(
            nav.start_navigation().await,
            Err(Error::MissingEndpoint)
        ));
        let view = nav.view().await;
        assert_eq!(view.mode, Mode::Browsing);
        assert!(view.polyline_overlay.is_none());
        assert_eq!(nav.services().planner.calls(), 0);
    }

    #[tokio::test]
    async fn test_navigation_round_trip() {
        let nav = with_destination(MockServices::new()).await;

        let view = nav.start_navigation().await.unwrap();
        assert_eq!(view.mode, Mode::Navigating);
        assert_eq!(view.markers.len(), 1);
        assert_eq!(view.markers[0].position, CAMPUS);
        assert_eq!(view.polyline_overlay.as_ref().unwrap().points.len(), 4);
        assert_eq!(
            view.status_text.title,
            "Distance to destination 1.50km, estimated time 3 minute(s)"
        );
        assert_eq!(view.status_text.subtitle, "3 traffic light(s) along the route");

        let view = nav.start_navigation().await.unwrap();
        assert_eq!(view.mode, Mode::Browsing);
        assert!(view.polyline_overlay.is_none());
        assert_eq!(view.status_text.title, "My location");
        assert_eq!(nav.services().planner.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_route_stays_browsing() {
        let nav = with_destination(MockServices::new().without_route()).await;

        assert!(matches!(
            nav.start_navigation().await,
            Err(Error::Route(RouteFailure::NoRoute))
        ));
        let view = nav.view().await;
        assert_eq!(view.mode, Mode::Browsing);
        assert!(view.polyline_overlay.is_none());
        assert_eq!(view.destination.unwrap().position, CAMPUS);
    }

    #[tokio::test]
    async fn test_stop_during_planning_drops_route() {
        let gate = Gate::new();
        let nav = with_destination(MockServices::new().hold_first_route(gate.clone())).await;

        let planning = nav.start_navigation();
        let stopping = async {
            gate.entered().await;
            let view = nav.stop_navigation().await;
            gate.release();
            view
        };
        let (planned, stopped) = tokio::join!(planning, stopping);

        assert_eq!(stopped.mode, Mode::Browsing);
        assert_eq!(planned.unwrap().mode, Mode::Browsing);
        assert!(nav.view().await.polyline_overlay.is_none());
    }

    #[tokio::test]
    async fn test_tap_while_browsing_names_destination() {
        let nav = navigator(MockServices::new());
        nav.locate_user().await.unwrap();
        let tapped = Position::new(28.69, 115.85);

        let view = nav.select(Selection::point(tapped)).await.unwrap();

        let destination = view.destination.unwrap();
        assert_eq!(destination.name, place_name(tapped));
        assert_eq!(view.markers.len(), 1);
        assert_eq!(view.viewport_points, vec![tapped, HOME]);
    }

    #[tokio::test]
    async fn test_tap_lookup_failure_still_sets_destination() {
        let nav = navigator(MockServices::new());
        nav.locate_user().await.unwrap();
        nav.services().geocoder.set_fail_reverse(true);
        let tapped = Position::new(28.69, 115.85);

        assert!(nav.select(Selection::point(tapped)).await.is_err());

        let view = nav.view().await;
        let destination = view.destination.unwrap();
        assert_eq!(destination.position, tapped);
        assert!(destination.description.is_empty());

        // The degraded destination is still routable
        nav.start_navigation().await.unwrap();
        assert_eq!(nav.mode().await, Mode::Navigating);
    }

    #[tokio::test]
    async fn test_tap_while_navigating_keeps_destination() {
        let nav = with_destination(MockServices::new()).await;
        nav.start_navigation().await.unwrap();
        let calls = nav.services().geocoder.reverse_calls();

        let view = nav
            .select(Selection::point(Position::new(28.72, 115.85)))
            .await
            .unwrap();

        assert_eq!(view.destination.unwrap().position, CAMPUS);
        assert_eq!(view.markers[1].icon_kind, IconKind::Selected);
        assert_eq!(nav.services().geocoder.reverse_calls(), calls);
    }

    #[tokio::test]
    async fn test_unknown_marker() {
        let nav = navigator(MockServices::new());
        assert!(matches!(
            nav.select(Selection::Marker { marker_id: 7 }).await,
            Err(Error::UnknownMarker(7))
        ));
    }

    #[tokio::test]
    async fn test_locate_device() {
        let nav = navigator(MockServices::new());
        nav.locate_user().await.unwrap();

        let view = nav.locate_device().await.unwrap();
        assert_eq!(nav.services().tracker.calls(), 1);
        assert_eq!(view.device_position, Some(STICK));
        assert_eq!(view.markers[0].icon_kind, IconKind::Device);
        assert_eq!(view.center, Some(STICK));

        let distance = nav.device_distance_meters().await.unwrap();
        assert!(distance > 0.0 && distance < 100.0);
    }

    #[tokio::test]
    async fn test_device_failure_keeps_markers() {
        let nav = navigator(MockServices::new().without_device());
        nav.search("honggutan").await.unwrap();

        assert!(matches!(nav.locate_device().await, Err(Error::Device(_))));
        assert_eq!(nav.services().tracker.calls(), 1);
        assert_eq!(nav.view().await.markers.len(), 2);
        assert!(nav.device_distance_meters().await.is_none());
    }

    #[tokio::test]
    async fn test_device_fix_survives_concurrent_user_fix() {
        let gate = Gate::new();
        let nav = navigator(MockServices::new().hold_device(gate.clone()));

        let device = nav.locate_device();
        let user = async {
            gate.entered().await;
            let view = nav.locate_user().await;
            gate.release();
            view
        };
        let (device, user) = tokio::join!(device, user);
        user.unwrap();
        device.unwrap();

        let view = nav.view().await;
        assert_eq!(view.user_position, Some(HOME));
        assert_eq!(view.device_position, Some(STICK));
        assert_eq!(nav.services().sensor.calls(), 1);
        assert!(nav.device_distance_meters().await.is_some());
    }

    #[tokio::test]
    async fn test_shared_across_tasks() {
        let nav = Arc::new(navigator(MockServices::new()));
        let handle = tokio::spawn({
            let nav = nav.clone();
            async move { nav.locate_user().await.map(|v| v.user_position) }
        });

        assert_eq!(handle.await.unwrap().unwrap(), Some(HOME));
    }
}

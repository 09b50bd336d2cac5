//! Navigation state machine
//!
//! `NavigationState` is the single owned state object: the mode, the view
//! model and the committed route. Every operation is synchronous; requests to
//! external services are split into a `begin` step that hands out a ticket and
//! a commit step that validates the ticket before applying the result.
//! `Navigator` drives the asynchronous side.

pub mod navigator;
pub mod services;

pub use navigator::Navigator;
pub use services::{AmapServices, NavServices};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geo::{Marker, Position};
use crate::geocode::{PlaceCandidate, PlaceDescription};
use crate::route::Route;
use crate::view::{
    Commit, DeviceTicket, MarkerTicket, OriginTicket, RouteStyle, ViewModel, ViewState,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Navigation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Browsing,
    Navigating,
}

/// Ticket for a route planning request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteTicket(u64);

/// A route planning request whose endpoints were checked at issue time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub ticket: RouteTicket,
    pub origin: Position,
    pub destination: Position,
}

/// Result of toggling navigation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Toggle {
    /// Navigation was active and has been stopped
    Stopped,
    /// A route must be planned, then committed with `commit_route`
    Plan(RouteRequest),
}

/// A tap on the map surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    Marker { marker_id: u32 },
    Point { latitude: f64, longitude: f64 },
}

impl Selection {
    pub fn point(position: Position) -> Self {
        Self::Point {
            latitude: position.latitude,
            longitude: position.longitude,
        }
    }
}

/// Result of a tap
#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    /// Fully applied
    Done,
    /// A new destination needs its place description before it commits
    NeedsPlace(MarkerTicket, Marker),
}

/// The route request in flight and the destination it was planned for
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingRoute {
    epoch: u64,
    destination_id: u32,
    destination: Position,
}

/// Mode, view and route
#[derive(Debug, Clone)]
pub struct NavigationState {
    mode: Mode,
    view: ViewModel,
    route: Option<Route>,
    route_epoch: u64,
    pending_route: Option<PendingRoute>,
}

impl NavigationState {
    pub fn new(view: ViewModel) -> Self {
        Self {
            mode: Mode::Browsing,
            view,
            route: None,
            route_epoch: 0,
            pending_route: None,
        }
    }

    /// Build the initial state, seeding the configured default destination
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut view = ViewModel::new(config.map.scale, RouteStyle::from(&config.map));
        if let Some(position) = config.default_destination()? {
            let name = config
                .navigation
                .default_destination_name
                .clone()
                .unwrap_or_else(|| position.to_lon_lat());
            view.set_destination(position, name);
        }
        Ok(Self::new(view))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Whether a route request is in flight
    pub fn is_planning(&self) -> bool {
        self.pending_route.is_some()
    }

    pub fn view_state(&self) -> ViewState {
        self.view.view_state(self.mode)
    }

    /// Move the origin; the reverse lookup commits through the ticket
    pub fn set_user_position(&mut self, position: Position) -> OriginTicket {
        self.view.set_user_position(position)
    }

    /// Move the origin after a sensor fix
    ///
    /// While browsing this also clears the marker set.
    pub fn reset_to_user_position(&mut self, position: Position) -> OriginTicket {
        if self.mode == Mode::Browsing {
            self.view.clear_markers();
        }
        self.view.set_user_position(position)
    }

    /// Commit the origin's place description
    ///
    /// While navigating the route summary keeps the status line.
    pub fn apply_origin_place(
        &mut self,
        ticket: OriginTicket,
        result: Result<PlaceDescription>,
    ) -> Result<Commit> {
        let update_text = self.mode == Mode::Browsing;
        self.view.apply_origin_place(ticket, result, update_text)
    }

    pub fn begin_search(&mut self) -> MarkerTicket {
        self.view.begin_marker_request()
    }

    pub fn apply_search(
        &mut self,
        ticket: MarkerTicket,
        result: Result<Vec<PlaceCandidate>>,
    ) -> Result<Commit> {
        self.view.apply_search(ticket, result)
    }

    /// Handle a tap on a marker or on empty map space
    pub fn select(&mut self, selection: Selection) -> Result<SelectOutcome> {
        match selection {
            Selection::Marker { marker_id } => {
                self.view.select_marker(marker_id, self.mode)?;
                Ok(SelectOutcome::Done)
            }
            Selection::Point {
                latitude,
                longitude,
            } => {
                let position = Position::new(latitude, longitude);
                position.validate()?;
                match self.mode {
                    Mode::Browsing => {
                        let (ticket, marker) = self.view.begin_tap_selection(position);
                        Ok(SelectOutcome::NeedsPlace(ticket, marker))
                    }
                    Mode::Navigating => {
                        self.view.place_waypoint(position);
                        Ok(SelectOutcome::Done)
                    }
                }
            }
        }
    }

    /// Commit a tapped destination, see `ViewModel::apply_tap_place`
    pub fn apply_tap_place(
        &mut self,
        ticket: MarkerTicket,
        marker: Marker,
        result: Result<PlaceDescription>,
    ) -> Result<Commit> {
        self.view.apply_tap_place(ticket, marker, result)
    }

    pub fn begin_device_request(&mut self) -> DeviceTicket {
        self.view.begin_device_request()
    }

    pub fn apply_device_position(
        &mut self,
        ticket: DeviceTicket,
        result: Result<Position>,
    ) -> Result<Commit> {
        self.view.apply_device_position(ticket, result)
    }

    /// Toggle navigation
    ///
    /// Stops when navigating. Otherwise checks both endpoints and issues a
    /// route request that supersedes any request still pending; a missing
    /// endpoint fails with no side effects.
    pub fn start_navigation(&mut self) -> Result<Toggle> {
        if self.mode == Mode::Navigating {
            self.stop_navigation();
            return Ok(Toggle::Stopped);
        }

        let origin = self
            .view
            .user_position()
            .filter(Position::is_resolvable)
            .ok_or(Error::MissingEndpoint)?;
        let (destination_id, destination) = self
            .view
            .destination()
            .map(|d| (d.id, d.position))
            .filter(|(_, position)| position.is_resolvable())
            .ok_or(Error::MissingEndpoint)?;

        self.route_epoch += 1;
        self.pending_route = Some(PendingRoute {
            epoch: self.route_epoch,
            destination_id,
            destination,
        });
        Ok(Toggle::Plan(RouteRequest {
            ticket: RouteTicket(self.route_epoch),
            origin,
            destination,
        }))
    }

    /// Commit a planned route
    ///
    /// Success enters `Navigating`; failure leaves the mode at `Browsing`.
    /// A route planned for a destination that has since been replaced is
    /// dropped.
    pub fn commit_route(&mut self, ticket: RouteTicket, result: Result<Route>) -> Result<Commit> {
        let Some(pending) = self.pending_route.filter(|p| p.epoch == ticket.0) else {
            return Ok(Commit::Stale);
        };
        self.pending_route = None;

        let same_destination = self
            .view
            .destination()
            .is_some_and(|d| d.id == pending.destination_id && d.position == pending.destination);
        if !same_destination {
            return Ok(Commit::Stale);
        }

        let route = result?;
        self.view.show_route(&route);
        info!(
            distance_meters = route.total_distance_meters(),
            steps = route.steps.len(),
            "Navigation started"
        );
        self.route = Some(route);
        self.mode = Mode::Navigating;
        Ok(Commit::Applied)
    }

    /// Leave navigation; always succeeds
    pub fn stop_navigation(&mut self) {
        if self.mode == Mode::Navigating {
            info!("Navigation stopped");
        }
        self.mode = Mode::Browsing;
        self.route = None;
        self.pending_route = None;
        self.view.clear_route();
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new(ViewModel::default())
    }
}

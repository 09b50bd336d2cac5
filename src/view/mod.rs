//! Marker and view model
//!
//! Single owner of what is drawn: the marker set, destination, user and
//! device positions, route overlay, status text and the points the map
//! must keep in view. Results of asynchronous lookups are committed through
//! tickets so that a superseded request can never overwrite newer state.

use crate::config::MapConfig;
use crate::constants::marker::{DEVICE_NAME, ORIGIN_LABEL};
use crate::error::{Error, Result};
use crate::format::{format_route, StatusText};
use crate::geo::{haversine_distance, IconKind, Marker, Position};
use crate::geocode::{PlaceCandidate, PlaceDescription};
use crate::nav::Mode;
use crate::route::Route;
use serde::{Deserialize, Serialize};

/// Stroke used for the route overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStyle {
    pub color: String,
    pub width: u32,
    pub opacity: f64,
}

impl From<&MapConfig> for RouteStyle {
    fn from(map: &MapConfig) -> Self {
        Self {
            color: map.route_color.clone(),
            width: map.route_width,
            opacity: map.route_opacity,
        }
    }
}

impl Default for RouteStyle {
    fn default() -> Self {
        Self::from(&MapConfig::default())
    }
}

/// The route line handed to the map surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolylineOverlay {
    pub points: Vec<Position>,
    pub color: String,
    pub width: u32,
    pub opacity: f64,
}

impl PolylineOverlay {
    pub fn new(points: Vec<Position>, style: &RouteStyle) -> Self {
        Self {
            points,
            color: style.color.clone(),
            width: style.width,
            opacity: style.opacity,
        }
    }
}

/// Everything the map surface needs to render one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub mode: Mode,
    pub markers: Vec<Marker>,
    pub destination: Option<Marker>,
    pub user_position: Option<Position>,
    pub device_position: Option<Position>,
    pub polyline_overlay: Option<PolylineOverlay>,
    pub viewport_points: Vec<Position>,
    pub status_text: StatusText,
    pub center: Option<Position>,
    pub scale: u8,
}

/// Ticket for a reverse lookup of the user's position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginTicket(u64);

/// Ticket for a request that will replace the marker set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerTicket(u64);

/// Ticket for a device lookup
///
/// The device position and the marker set it replaces go stale separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceTicket {
    device: u64,
    markers: MarkerTicket,
}

/// What happened to a completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Applied,
    /// A newer request of the same kind was issued; nothing changed
    Stale,
}

/// Marker and view model
#[derive(Debug, Clone)]
pub struct ViewModel {
    markers: Vec<Marker>,
    next_marker_id: u32,
    destination: Option<Marker>,
    user_position: Option<Position>,
    device_position: Option<Position>,
    status_text: StatusText,
    polyline_overlay: Option<PolylineOverlay>,
    viewport_points: Vec<Position>,
    center: Option<Position>,
    scale: u8,
    route_style: RouteStyle,
    origin_epoch: u64,
    marker_epoch: u64,
    device_epoch: u64,
}

impl ViewModel {
    /// Create an empty view
    pub fn new(scale: u8, route_style: RouteStyle) -> Self {
        Self {
            markers: Vec::new(),
            next_marker_id: 0,
            destination: None,
            user_position: None,
            device_position: None,
            status_text: origin_status(),
            polyline_overlay: None,
            viewport_points: Vec::new(),
            center: None,
            scale,
            route_style,
            origin_epoch: 0,
            marker_epoch: 0,
            device_epoch: 0,
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn destination(&self) -> Option<&Marker> {
        self.destination.as_ref()
    }

    pub fn user_position(&self) -> Option<Position> {
        self.user_position
    }

    pub fn device_position(&self) -> Option<Position> {
        self.device_position
    }

    pub fn status_text(&self) -> &StatusText {
        &self.status_text
    }

    pub fn polyline_overlay(&self) -> Option<&PolylineOverlay> {
        self.polyline_overlay.as_ref()
    }

    pub fn viewport_points(&self) -> &[Position] {
        &self.viewport_points
    }

    /// Preselect a destination without touching the marker set
    pub fn set_destination(&mut self, position: Position, name: impl Into<String>) {
        let id = self.allocate_id();
        self.destination = Some(Marker::new(id, position, name, IconKind::Destination));
    }

    /// Commit a new user position
    ///
    /// The position commits immediately; the returned ticket is needed to
    /// commit its reverse lookup.
    pub fn set_user_position(&mut self, position: Position) -> OriginTicket {
        self.user_position = Some(position);
        self.center = Some(position);
        self.origin_epoch += 1;
        self.refresh_viewport();
        OriginTicket(self.origin_epoch)
    }

    /// Commit the reverse lookup of the user's position
    ///
    /// `update_text` is false while the status line belongs to something else.
    pub fn apply_origin_place(
        &mut self,
        ticket: OriginTicket,
        result: Result<PlaceDescription>,
        update_text: bool,
    ) -> Result<Commit> {
        if ticket.0 != self.origin_epoch {
            return Ok(Commit::Stale);
        }
        let place = result?;
        if update_text {
            self.status_text = StatusText::new(place.name, place.description);
        }
        Ok(Commit::Applied)
    }

    /// Start a request that will replace the marker set
    ///
    /// Supersedes every marker-set request still in flight.
    pub fn begin_marker_request(&mut self) -> MarkerTicket {
        self.marker_epoch += 1;
        MarkerTicket(self.marker_epoch)
    }

    /// Empty the marker set
    pub fn clear_markers(&mut self) {
        self.begin_marker_request();
        self.markers.clear();
        self.next_marker_id = 0;
        self.refresh_viewport();
    }

    /// Replace the marker set with one candidate per search result
    pub fn set_markers_from_search(&mut self, results: Vec<PlaceCandidate>) {
        self.markers = results
            .into_iter()
            .zip(0u32..)
            .map(|(candidate, id)| {
                Marker::new(id, candidate.position, candidate.name, IconKind::Candidate)
            })
            .collect();
        self.next_marker_id = self.markers.len() as u32;
        self.refresh_viewport();
    }

    /// Commit a place search
    pub fn apply_search(
        &mut self,
        ticket: MarkerTicket,
        result: Result<Vec<PlaceCandidate>>,
    ) -> Result<Commit> {
        if ticket.0 != self.marker_epoch {
            return Ok(Commit::Stale);
        }
        self.set_markers_from_search(result?);
        Ok(Commit::Applied)
    }

    /// Select a marker already in the set
    ///
    /// Browsing: it becomes the destination. Navigating: it becomes the
    /// selected waypoint, and the destination itself cannot be retagged.
    pub fn select_marker(&mut self, id: u32, mode: Mode) -> Result<()> {
        let index = self
            .markers
            .iter()
            .position(|m| m.id == id)
            .ok_or(Error::UnknownMarker(id))?;
        self.begin_marker_request();

        match mode {
            Mode::Browsing => {
                for marker in self.markers.iter_mut() {
                    if marker.id != id && marker.icon_kind.is_distinguished() {
                        marker.retag(IconKind::Candidate);
                    }
                }
                self.markers[index].retag(IconKind::Destination);

                let marker = self.markers[index].clone();
                self.status_text = StatusText::new(&marker.name, &marker.description);
                self.center = Some(marker.position);
                self.destination = Some(marker);
            }
            Mode::Navigating => {
                let target = &self.markers[index];
                let is_destination = self
                    .destination
                    .as_ref()
                    .is_some_and(|d| d.id == target.id && d.position == target.position);
                if is_destination {
                    return Ok(());
                }
                for marker in self.markers.iter_mut() {
                    if marker.id != id && marker.icon_kind == IconKind::Selected {
                        marker.retag(IconKind::Candidate);
                    }
                }
                self.markers[index].retag(IconKind::Selected);
            }
        }

        self.refresh_viewport();
        Ok(())
    }

    /// Start an ad-hoc destination at a tapped point
    ///
    /// Returns the unnamed marker; it is committed by `apply_tap_place`.
    pub fn begin_tap_selection(&mut self, position: Position) -> (MarkerTicket, Marker) {
        let ticket = self.begin_marker_request();
        let id = self.allocate_id();
        (ticket, Marker::new(id, position, "", IconKind::Destination))
    }

    /// Commit a tapped destination with its reverse lookup
    ///
    /// A failed lookup still commits the destination, labelled with its
    /// coordinates and no description, and the failure is returned.
    pub fn apply_tap_place(
        &mut self,
        ticket: MarkerTicket,
        mut marker: Marker,
        result: Result<PlaceDescription>,
    ) -> Result<Commit> {
        if ticket.0 != self.marker_epoch {
            return Ok(Commit::Stale);
        }

        let outcome = match result {
            Ok(place) => {
                marker.name = place.name;
                marker.description = place.description;
                Ok(Commit::Applied)
            }
            Err(e) => {
                marker.name = marker.position.to_lon_lat();
                marker.description.clear();
                Err(e)
            }
        };

        self.status_text = StatusText::new(&marker.name, &marker.description);
        self.center = Some(marker.position);
        self.markers = vec![marker.clone()];
        self.destination = Some(marker);
        self.refresh_viewport();
        outcome
    }

    /// Drop a waypoint next to the frozen destination
    pub fn place_waypoint(&mut self, position: Position) {
        self.begin_marker_request();
        let id = self.allocate_id();
        let waypoint = Marker::new(id, position, position.to_lon_lat(), IconKind::Selected);

        self.markers = self
            .destination
            .iter()
            .cloned()
            .chain(std::iter::once(waypoint))
            .collect();
        self.refresh_viewport();
    }

    /// Start a device lookup
    ///
    /// Supersedes earlier device lookups and in-flight marker-set requests.
    pub fn begin_device_request(&mut self) -> DeviceTicket {
        self.device_epoch += 1;
        DeviceTicket {
            device: self.device_epoch,
            markers: self.begin_marker_request(),
        }
    }

    /// Commit a device position lookup
    ///
    /// The position commits whenever the lookup is the latest one. The device
    /// marker only replaces the marker set if nothing else replaced it since.
    pub fn apply_device_position(
        &mut self,
        ticket: DeviceTicket,
        result: Result<Position>,
    ) -> Result<Commit> {
        if ticket.device != self.device_epoch {
            return Ok(Commit::Stale);
        }
        let position = result?;
        self.device_position = Some(position);

        if ticket.markers.0 == self.marker_epoch {
            self.markers = vec![Marker::new(0, position, DEVICE_NAME, IconKind::Device)];
            self.next_marker_id = 1;
            self.center = Some(position);
            self.refresh_viewport();
        }
        Ok(Commit::Applied)
    }

    /// Draw a planned route: overlay, destination-only markers, summary text
    pub fn show_route(&mut self, route: &Route) {
        self.polyline_overlay = Some(PolylineOverlay::new(
            route.flattened_polyline(),
            &self.route_style,
        ));
        self.markers = self.destination.iter().cloned().collect();
        self.status_text = format_route(route);
        self.refresh_viewport();
    }

    /// Remove the route overlay and go back to the plain origin label
    pub fn clear_route(&mut self) {
        self.polyline_overlay = None;
        self.status_text = origin_status();
    }

    /// All marker positions followed by the user position
    pub fn compute_viewport_points(&self) -> Vec<Position> {
        self.markers
            .iter()
            .map(|m| m.position)
            .chain(self.user_position)
            .collect()
    }

    /// Distance between the user and the guide stick, when both are known
    pub fn device_distance_meters(&self) -> Option<f64> {
        Some(haversine_distance(self.user_position?, self.device_position?))
    }

    /// Snapshot for the map surface
    pub fn view_state(&self, mode: Mode) -> ViewState {
        ViewState {
            mode,
            markers: self.markers.clone(),
            destination: self.destination.clone(),
            user_position: self.user_position,
            device_position: self.device_position,
            polyline_overlay: self.polyline_overlay.clone(),
            viewport_points: self.viewport_points.clone(),
            status_text: self.status_text.clone(),
            center: self.center,
            scale: self.scale,
        }
    }

    fn refresh_viewport(&mut self) {
        self.viewport_points = self.compute_viewport_points();
    }

    /// Next id not used by a shown marker or the destination
    fn allocate_id(&mut self) -> u32 {
        loop {
            let id = self.next_marker_id;
            self.next_marker_id = self.next_marker_id.wrapping_add(1);
            let taken = self.markers.iter().any(|m| m.id == id)
                || self.destination.as_ref().is_some_and(|d| d.id == id);
            if !taken {
                return id;
            }
        }
    }
}

impl Default for ViewModel {
    fn default() -> Self {
        Self::new(crate::config::defaults::DEFAULT_SCALE, RouteStyle::default())
    }
}

fn origin_status() -> StatusText {
    StatusText::new(ORIGIN_LABEL, "")
}

//! Scripted services for tests
//!
//! Every mock counts its calls. A `Gate` parks one request until the test
//! releases it, which is how out-of-order completions are produced.

use crate::device::DeviceTracker;
use crate::error::{Error, Result, RouteFailure};
use crate::geo::Position;
use crate::geocode::{Geocoder, PlaceCandidate, PlaceDescription};
use crate::nav::NavServices;
use crate::route::{Route, RoutePlanner, RouteStep};
use crate::sensor::{AccuracyProfile, LocationSensor};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

pub const HOME: Position = Position {
    latitude: 28.7429,
    longitude: 115.8685,
};

pub const CAMPUS: Position = Position {
    latitude: 28.6600,
    longitude: 115.8000,
};

pub const STICK: Position = Position {
    latitude: 28.7431,
    longitude: 115.8689,
};

pub fn sample_route() -> Route {
    Route {
        steps: vec![
            RouteStep {
                distance_meters: 800.0,
                duration_seconds: 120.0,
                polyline: vec![HOME, Position::new(28.70, 115.83)],
            },
            RouteStep {
                distance_meters: 700.0,
                duration_seconds: 60.0,
                polyline: vec![Position::new(28.70, 115.83), CAMPUS],
            },
        ],
        traffic_light_count: 3,
    }
}

pub fn sample_candidates() -> Vec<PlaceCandidate> {
    vec![
        PlaceCandidate {
            name: "Honggutan Campus".to_string(),
            position: CAMPUS,
        },
        PlaceCandidate {
            name: "Honggutan Library".to_string(),
            position: Position::new(28.68, 115.86),
        },
    ]
}

/// Name the mock geocoder gives a position
pub fn place_name(position: Position) -> String {
    format!("Place {}", position.to_lon_lat())
}

/// Parks a request until released
#[derive(Debug, Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }

    /// Wait until a request is parked at the gate
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[derive(Debug, Default)]
pub struct MockGeocoder {
    candidates: Vec<PlaceCandidate>,
    fail_reverse: AtomicBool,
    reverse_gate: Option<(Position, Arc<Gate>)>,
    search_gate: Option<(String, Arc<Gate>)>,
    reverse_calls: AtomicUsize,
    search_calls: AtomicUsize,
}

impl MockGeocoder {
    pub fn set_fail_reverse(&self, fail: bool) {
        self.fail_reverse.store(fail, Ordering::SeqCst);
    }

    pub fn reverse_calls(&self) -> usize {
        self.reverse_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for MockGeocoder {
    async fn reverse_geocode(&self, position: Position) -> Result<PlaceDescription> {
        self.reverse_calls.fetch_add(1, Ordering::SeqCst);
        if let Some((held, gate)) = &self.reverse_gate {
            if *held == position {
                gate.pass().await;
            }
        }
        if self.fail_reverse.load(Ordering::SeqCst) {
            return Err(Error::Geocode("scripted failure".to_string()));
        }
        Ok(PlaceDescription {
            name: place_name(position),
            description: "Nanchang".to_string(),
        })
    }

    async fn search_places(&self, query: &str) -> Result<Vec<PlaceCandidate>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if let Some((held, gate)) = &self.search_gate {
            if held == query {
                gate.pass().await;
            }
        }
        let hits: Vec<PlaceCandidate> = self
            .candidates
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&query.to_lowercase()))
            .cloned()
            .collect();
        if hits.is_empty() {
            return Err(Error::Geocode(format!("No places match {:?}", query)));
        }
        Ok(hits)
    }
}

#[derive(Debug, Default)]
pub struct MockPlanner {
    route: Option<Route>,
    first_call_gate: Option<Arc<Gate>>,
    calls: AtomicUsize,
}

impl MockPlanner {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RoutePlanner for MockPlanner {
    async fn plan_driving_route(&self, _origin: Position, _destination: Position) -> Result<Route> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let (0, Some(gate)) = (call, &self.first_call_gate) {
            gate.pass().await;
        }
        self.route
            .clone()
            .ok_or(Error::Route(RouteFailure::NoRoute))
    }
}

#[derive(Debug, Default)]
pub struct MockSensor {
    position: Option<Position>,
    calls: AtomicUsize,
}

impl MockSensor {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LocationSensor for MockSensor {
    async fn current_position(&self, _profile: AccuracyProfile) -> Result<Position> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.position
            .ok_or_else(|| Error::Sensor("Location permission denied".to_string()))
    }
}

#[derive(Debug, Default)]
pub struct MockTracker {
    position: Option<Position>,
    gate: Option<Arc<Gate>>,
    calls: AtomicUsize,
}

impl MockTracker {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DeviceTracker for MockTracker {
    async fn locate_device(&self) -> Result<Position> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        self.position
            .ok_or_else(|| Error::Device("Device feed unreachable".to_string()))
    }
}

/// All four mocks, healthy by default
#[derive(Debug)]
pub struct MockServices {
    pub geocoder: MockGeocoder,
    pub planner: MockPlanner,
    pub sensor: MockSensor,
    pub tracker: MockTracker,
}

impl MockServices {
    pub fn new() -> Self {
        Self {
            geocoder: MockGeocoder {
                candidates: sample_candidates(),
                ..Default::default()
            },
            planner: MockPlanner {
                route: Some(sample_route()),
                ..Default::default()
            },
            sensor: MockSensor {
                position: Some(HOME),
                ..Default::default()
            },
            tracker: MockTracker {
                position: Some(STICK),
                ..Default::default()
            },
        }
    }

    pub fn without_route(mut self) -> Self {
        self.planner.route = None;
        self
    }

    pub fn without_sensor(mut self) -> Self {
        self.sensor.position = None;
        self
    }

    pub fn without_device(mut self) -> Self {
        self.tracker.position = None;
        self
    }

    pub fn hold_reverse(mut self, position: Position, gate: Arc<Gate>) -> Self {
        self.geocoder.reverse_gate = Some((position, gate));
        self
    }

    pub fn hold_search(mut self, query: &str, gate: Arc<Gate>) -> Self {
        self.geocoder.search_gate = Some((query.to_string(), gate));
        self
    }

    pub fn hold_device(mut self, gate: Arc<Gate>) -> Self {
        self.tracker.gate = Some(gate);
        self
    }

    pub fn hold_first_route(mut self, gate: Arc<Gate>) -> Self {
        self.planner.first_call_gate = Some(gate);
        self
    }
}

impl NavServices for MockServices {
    type Geocoder = MockGeocoder;
    type Planner = MockPlanner;
    type Sensor = MockSensor;
    type Tracker = MockTracker;

    fn geocoder(&self) -> &MockGeocoder {
        &self.geocoder
    }

    fn planner(&self) -> &MockPlanner {
        &self.planner
    }

    fn sensor(&self) -> &MockSensor {
        &self.sensor
    }

    fn tracker(&self) -> &MockTracker {
        &self.tracker
    }
}

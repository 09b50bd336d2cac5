//! Map markers

use crate::constants::marker::{DEFAULT_SIZE, DESTINATION_SIZE};
use crate::geo::Position;
use serde::{Deserialize, Serialize};

/// What a marker stands for, which decides its icon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconKind {
    /// The user's own position
    #[serde(rename = "self")]
    User,
    /// The navigation destination
    Destination,
    /// A place search result
    Candidate,
    /// A waypoint picked while navigating
    Selected,
    /// The guide stick
    Device,
}

impl IconKind {
    /// Display size for this kind of marker
    pub fn display_size(self) -> DisplaySize {
        match self {
            Self::Destination => DisplaySize::square(DESTINATION_SIZE),
            _ => DisplaySize::square(DEFAULT_SIZE),
        }
    }

    /// Destination and selected markers stand out from the rest
    pub fn is_distinguished(self) -> bool {
        matches!(self, Self::Destination | Self::Selected)
    }
}

/// Marker width and height in map display units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

impl DisplaySize {
    pub fn square(side: u32) -> Self {
        Self {
            width: side,
            height: side,
        }
    }
}

/// A marker drawn on the map
///
/// `id` is unique within the current marker set only; it is reassigned
/// whenever the set is replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: u32,
    pub position: Position,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub icon_kind: IconKind,
    pub display_size: DisplaySize,
}

impl Marker {
    /// Create a marker sized for its kind
    pub fn new(id: u32, position: Position, name: impl Into<String>, icon_kind: IconKind) -> Self {
        Self {
            id,
            position,
            name: name.into(),
            description: String::new(),
            icon_kind,
            display_size: icon_kind.display_size(),
        }
    }

    /// Change the icon kind, resizing to match
    pub fn retag(&mut self, icon_kind: IconKind) {
        self.icon_kind = icon_kind;
        self.display_size = icon_kind.display_size();
    }
}

use domain::coords::Anchor;
use tile_overlay_application::ports::outgoing::hovered_coordinate::HoveredCoordinatePort;

/// A "hovered" coordinate given up front, e.g. from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedCoordinate(Option<Anchor>);

impl FixedCoordinate {
    pub fn new(anchor: Anchor) -> Self {
        Self(Some(anchor))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl HoveredCoordinatePort for FixedCoordinate {
    fn try_get_hovered_coordinate(&self) -> Option<Anchor> {
        self.0
    }
}

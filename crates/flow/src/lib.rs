//! Client-side flow control for cosmicface readings.

pub mod app;
pub mod carousel;
pub mod navigation;
pub mod orbit;

pub use app::{AppShell, Route};
pub use carousel::{CarouselState, DEFAULT_SNAP_DURATION, GestureCarousel, ease_out_cubic};
pub use navigation::{
    AnalysisTicket, BackOutcome, Feature, NavEvent, NavigationController, NavigationError,
    PhotoSlot, Screen, WizardState,
};
pub use orbit::{OrbitNode, OrbitalSelector};

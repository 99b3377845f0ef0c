//! Top-level routing between the app home, history, and feature flows.

use tracing::debug;

use cosmicface_core::PhotoAsset;

use crate::navigation::{
    BackOutcome, Feature, NavEvent, NavigationController, NavigationError, PhotoSlot, Screen,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    History,
    Flow(Feature),
}

/// Owns the active flow and the app-level "last uploaded photo" slot.
///
/// The last uploaded photo outlives the flow that selected it so another
/// feature can reuse it with [`AppShell::reuse_last_asset`]. Results are never
/// carried between flows.
pub struct AppShell {
    route: Route,
    flow: Option<NavigationController>,
    last_asset: Option<PhotoAsset>,
    strict: bool,
}

impl Default for AppShell {
    fn default() -> Self {
        Self::new()
    }
}

impl AppShell {
    pub fn new() -> Self {
        Self {
            route: Route::Home,
            flow: None,
            last_asset: None,
            strict: cfg!(debug_assertions),
        }
    }

    /// Strictness passed on to every flow this shell opens.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn flow(&self) -> Option<&NavigationController> {
        self.flow.as_ref()
    }

    pub fn last_uploaded_asset(&self) -> Option<&PhotoAsset> {
        self.last_asset.as_ref()
    }

    /// Open `feature` on its start screen, replacing any open flow.
    pub fn open(&mut self, feature: Feature) -> &NavigationController {
        debug!(%feature, "opening flow");
        self.route = Route::Flow(feature);
        self.flow
            .insert(NavigationController::new(feature).with_strict(self.strict))
    }

    pub fn open_history(&mut self) {
        self.flow = None;
        self.route = Route::History;
    }

    /// Forward `event` to the open flow, remembering any selected photo.
    pub fn advance(&mut self, event: NavEvent) -> Result<Screen, NavigationError> {
        let flow = self.flow.as_mut().ok_or(NavigationError::NoActiveFlow)?;
        let selected = match &event {
            NavEvent::SelectPhoto { asset, .. } => Some(asset.clone()),
            _ => None,
        };
        let screen = flow.advance(event)?;
        if let Some(asset) = selected {
            self.last_asset = Some(asset);
        }
        Ok(screen)
    }

    /// Put the last uploaded photo into `slot` of the open flow.
    pub fn reuse_last_asset(&mut self, slot: PhotoSlot) -> Result<Screen, NavigationError> {
        let Some(asset) = self.last_asset.clone() else {
            let screen = self.flow.as_ref().map_or(Screen::Home, |flow| flow.screen());
            return Err(NavigationError::MissingPayload {
                screen,
                event: "reuse-last-asset",
                missing: "last uploaded photo",
            });
        };
        self.advance(NavEvent::SelectPhoto { slot, asset })
    }

    /// Back one step. Leaving a flow's root or the history screen returns to
    /// the app home.
    pub fn go_back(&mut self) -> Route {
        let exited = match (self.route, self.flow.as_mut()) {
            (Route::Flow(_), Some(flow)) => flow.go_back() == BackOutcome::Exit,
            _ => true,
        };
        if exited {
            self.flow = None;
            self.route = Route::Home;
        }
        self.route
    }
}

//! Per-feature wizard state machines.
//!
//! A [`NavigationController`] owns one [`WizardState`] and is the only thing
//! that mutates it. Every change goes through [`NavigationController::advance`]
//! or [`NavigationController::go_back`], so each screen sees a payload that is
//! consistent with how it was reached.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use cosmicface_core::{AnalysisKind, AnalysisResult, PhotoAsset, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    DailyInsight,
    LifeMap,
    Compatibility,
}

impl Feature {
    pub const ALL: [Feature; 3] = [Self::DailyInsight, Self::LifeMap, Self::Compatibility];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DailyInsight => "daily-insight",
            Self::LifeMap => "life-map",
            Self::Compatibility => "compatibility",
        }
    }

    pub fn analysis_kind(&self) -> AnalysisKind {
        match self {
            Self::DailyInsight => AnalysisKind::DailyInsight,
            Self::LifeMap => AnalysisKind::LifeMap,
            Self::Compatibility => AnalysisKind::Compatibility,
        }
    }

    /// Screen whose re-entry resets the flow.
    pub fn root(&self) -> Screen {
        match self {
            Self::LifeMap => Screen::Entry,
            Self::DailyInsight | Self::Compatibility => Screen::Home,
        }
    }

    /// Screen shown when the flow is opened from the app home.
    pub fn start_screen(&self) -> Screen {
        match self {
            Self::DailyInsight => Screen::Upload,
            Self::LifeMap => Screen::Entry,
            Self::Compatibility => Screen::Home,
        }
    }

    /// Screen that waits for the analysis result.
    pub fn analysis_screen(&self) -> Screen {
        match self {
            Self::DailyInsight => Screen::Loading,
            Self::LifeMap | Self::Compatibility => Screen::Analysis,
        }
    }

    pub fn slots(&self) -> &'static [PhotoSlot] {
        match self {
            Self::Compatibility => &[PhotoSlot::First, PhotoSlot::Second],
            Self::DailyInsight | Self::LifeMap => &[PhotoSlot::First],
        }
    }

    /// Forward edge taken by `event` from `screen`, if any.
    ///
    /// `SelectPhoto` and `AnalysisCompleted` are handled by the controller
    /// because they carry payload rather than just moving.
    fn forward(&self, screen: Screen, event: &NavEvent) -> Option<Screen> {
        use NavEvent::*;
        use Screen::*;

        match (self, screen, event) {
            (Feature::DailyInsight, Home, Begin) => Some(Upload),
            (Feature::DailyInsight, Upload, Submit) => Some(Loading),
            (Feature::DailyInsight, Results, Finish) => Some(Home),

            (Feature::LifeMap, Entry, Begin) => Some(Upload),
            (Feature::LifeMap, Upload, Submit) => Some(Analysis),
            (Feature::LifeMap, Results, ViewFacialDetails) => Some(FacialDetails),
            (Feature::LifeMap, Results, ViewTimeline) => Some(Timeline),
            (Feature::LifeMap, FacialDetails, ViewTimeline) => Some(Timeline),
            (Feature::LifeMap, FacialDetails | Timeline, GenerateAnimation) => Some(Animation),

            (Feature::Compatibility, Home, Begin) => Some(Upload),
            (Feature::Compatibility, Upload, Submit) => Some(Analysis),
            (Feature::Compatibility, Results, GenerateAnimation) => Some(Animation),

            _ => None,
        }
    }

    /// Declared predecessor of `screen`; `None` at the root.
    fn predecessor(&self, screen: Screen) -> Option<Screen> {
        use Screen::*;

        match (self, screen) {
            (Feature::DailyInsight, Upload | Results) => Some(Home),
            (Feature::DailyInsight, Loading) => Some(Upload),

            (Feature::LifeMap, Upload | Results) => Some(Entry),
            (Feature::LifeMap, Analysis) => Some(Upload),
            (Feature::LifeMap, FacialDetails | Timeline) => Some(Results),
            (Feature::LifeMap, Animation) => Some(Timeline),

            (Feature::Compatibility, Upload | Results) => Some(Home),
            (Feature::Compatibility, Analysis) => Some(Upload),
            (Feature::Compatibility, Animation) => Some(Results),

            _ => None,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisKind::from_str(s).map(|kind| match kind {
            AnalysisKind::DailyInsight => Self::DailyInsight,
            AnalysisKind::LifeMap => Self::LifeMap,
            AnalysisKind::Compatibility => Self::Compatibility,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Home,
    Entry,
    Upload,
    Loading,
    Analysis,
    Results,
    FacialDetails,
    Timeline,
    Animation,
}

impl Screen {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Entry => "entry",
            Self::Upload => "upload",
            Self::Loading => "loading",
            Self::Analysis => "analysis",
            Self::Results => "results",
            Self::FacialDetails => "facial-details",
            Self::Timeline => "timeline",
            Self::Animation => "animation",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Photo slot within a wizard. Compatibility uses both; other flows only `First`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoSlot {
    First,
    Second,
}

impl PhotoSlot {
    fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

/// Identifies the analysis a flow is currently waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnalysisTicket(u64);

impl fmt::Display for AnalysisTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum NavEvent {
    Begin,
    SelectPhoto { slot: PhotoSlot, asset: PhotoAsset },
    Submit,
    AnalysisCompleted {
        ticket: AnalysisTicket,
        result: Box<AnalysisResult>,
    },
    ViewFacialDetails,
    ViewTimeline,
    GenerateAnimation,
    Finish,
}

impl NavEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Begin => "begin",
            Self::SelectPhoto { .. } => "select-photo",
            Self::Submit => "submit",
            Self::AnalysisCompleted { .. } => "analysis-completed",
            Self::ViewFacialDetails => "view-facial-details",
            Self::ViewTimeline => "view-timeline",
            Self::GenerateAnimation => "generate-animation",
            Self::Finish => "finish",
        }
    }

    pub fn completed(ticket: AnalysisTicket, result: AnalysisResult) -> Self {
        Self::AnalysisCompleted {
            ticket,
            result: Box::new(result),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum NavigationError {
    #[error("{event} is not allowed on the {feature} {screen} screen")]
    IllegalTransition {
        feature: Feature,
        screen: Screen,
        event: &'static str,
    },
    #[error("{event} on the {screen} screen is missing its {missing}")]
    MissingPayload {
        screen: Screen,
        event: &'static str,
        missing: &'static str,
    },
    #[error("{feature} expected a {expected} result, got {actual}")]
    WrongResultKind {
        feature: Feature,
        expected: AnalysisKind,
        actual: AnalysisKind,
    },
    #[error("result for ticket {ticket} is stale and was dropped")]
    StaleResult { ticket: AnalysisTicket },
    #[error("no feature flow is open")]
    NoActiveFlow,
}

/// Result of [`NavigationController::go_back`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    Moved(Screen),
    /// Back from the root: the flow is finished and should be closed.
    Exit,
}

/// Everything one wizard run carries between screens.
#[derive(Debug, Clone)]
pub struct WizardState {
    feature: Feature,
    screen: Screen,
    session_id: SessionId,
    photos: [Option<PhotoAsset>; 2],
    result: Option<AnalysisResult>,
    pending: Option<AnalysisTicket>,
}

impl WizardState {
    fn new(feature: Feature) -> Self {
        Self {
            feature,
            screen: feature.start_screen(),
            session_id: SessionId::new(),
            photos: [None, None],
            result: None,
            pending: None,
        }
    }

    pub fn feature(&self) -> Feature {
        self.feature
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn photo(&self, slot: PhotoSlot) -> Option<&PhotoAsset> {
        self.photos[slot.index()].as_ref()
    }

    /// Photos in slot order, as sent for analysis.
    pub fn photos(&self) -> Vec<PhotoAsset> {
        self.photos.iter().flatten().cloned().collect()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn pending_ticket(&self) -> Option<AnalysisTicket> {
        self.pending
    }

    fn has_all_photos(&self) -> bool {
        self.feature.slots().iter().all(|slot| self.photo(*slot).is_some())
    }
}

pub struct NavigationController {
    state: WizardState,
    next_ticket: u64,
    strict: bool,
}

impl NavigationController {
    /// Open `feature` on its start screen with a fresh session.
    ///
    /// Strict mode (panic on contract violations) is on in debug builds.
    pub fn new(feature: Feature) -> Self {
        Self {
            state: WizardState::new(feature),
            next_ticket: 0,
            strict: cfg!(debug_assertions),
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Restart on `feature`'s start screen, dropping any photos and result.
    /// Outstanding tickets become stale.
    pub fn start(&mut self, feature: Feature) {
        debug!(%feature, "starting flow");
        self.state = WizardState::new(feature);
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn feature(&self) -> Feature {
        self.state.feature
    }

    pub fn screen(&self) -> Screen {
        self.state.screen
    }

    pub fn session_id(&self) -> SessionId {
        self.state.session_id
    }

    pub fn pending_ticket(&self) -> Option<AnalysisTicket> {
        self.state.pending
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.state.result.as_ref()
    }

    /// Apply `event`. On error the state is unchanged.
    pub fn advance(&mut self, event: NavEvent) -> Result<Screen, NavigationError> {
        let feature = self.state.feature;
        let screen = self.state.screen;

        match event {
            NavEvent::SelectPhoto { slot, asset } => {
                if screen != Screen::Upload || !feature.slots().contains(&slot) {
                    return Err(self.illegal("select-photo"));
                }
                debug!(%feature, ?slot, asset = %asset.id(), "photo selected");
                // Replacing a slot drops the previous asset and revokes its URI.
                self.state.photos[slot.index()] = Some(asset);
                Ok(screen)
            }

            NavEvent::AnalysisCompleted { ticket, result } => {
                if screen != feature.analysis_screen() || self.state.pending != Some(ticket) {
                    debug!(%feature, %screen, %ticket, "dropping stale analysis result");
                    return Err(NavigationError::StaleResult { ticket });
                }
                if result.kind() != feature.analysis_kind() {
                    return Err(self.contract_violation(NavigationError::WrongResultKind {
                        feature,
                        expected: feature.analysis_kind(),
                        actual: result.kind(),
                    }));
                }
                self.state.result = Some(*result);
                self.state.pending = None;
                Ok(self.move_to(Screen::Results))
            }

            event => {
                let Some(target) = feature.forward(screen, &event) else {
                    return Err(self.illegal(event.name()));
                };

                if target == feature.analysis_screen() {
                    if !self.state.has_all_photos() {
                        return Err(self.contract_violation(NavigationError::MissingPayload {
                            screen,
                            event: event.name(),
                            missing: "photo",
                        }));
                    }
                    self.next_ticket += 1;
                    self.state.pending = Some(AnalysisTicket(self.next_ticket));
                }

                Ok(self.move_to(target))
            }
        }
    }

    /// Move to the declared predecessor of the current screen.
    ///
    /// Reaching the root resets the run; intermediate screens keep photos and
    /// result. Leaving the analysis screen abandons its ticket.
    pub fn go_back(&mut self) -> BackOutcome {
        let feature = self.state.feature;
        match feature.predecessor(self.state.screen) {
            Some(target) => {
                self.state.pending = None;
                BackOutcome::Moved(self.move_to(target))
            }
            None => {
                debug!(%feature, "leaving flow");
                BackOutcome::Exit
            }
        }
    }

    fn move_to(&mut self, target: Screen) -> Screen {
        let feature = self.state.feature;
        debug!(%feature, from = %self.state.screen, to = %target, "transition");
        if target == feature.root() {
            self.state = WizardState {
                screen: target,
                ..WizardState::new(feature)
            };
        } else {
            self.state.screen = target;
        }
        target
    }

    fn illegal(&self, event: &'static str) -> NavigationError {
        let err = NavigationError::IllegalTransition {
            feature: self.state.feature,
            screen: self.state.screen,
            event,
        };
        self.contract_violation(err)
    }

    /// A caller broke the navigation contract; loud in strict mode.
    fn contract_violation(&self, err: NavigationError) -> NavigationError {
        error!(feature = %self.state.feature, screen = %self.state.screen, "{err}");
        if self.strict {
            panic!("navigation contract violated: {err}");
        }
        err
    }
}

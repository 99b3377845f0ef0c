use std::sync::atomic::{AtomicUsize, Ordering};

use cosmicface_analysis::{
    AnalysisBackend, AnalysisOrchestrator, BackendReply, EncodedImage, MemoryHistory, ResultSource,
};
use cosmicface_api_client::BackendError;
use cosmicface_core::mock::COMPATIBILITY_OVERALL_RANGE;
use cosmicface_core::{AnalysisKind, AnalysisRequest, AssetRegistry, testing};
use cosmicface_flow::{AppShell, Feature, NavEvent, OrbitalSelector, PhotoSlot, Route, Screen};

/// Answers every call with the same reply, or fails when `reply` is `None`.
struct Fixed {
    reply: Option<BackendReply>,
    calls: AtomicUsize,
}

impl Fixed {
    fn replying(reply: BackendReply) -> Self {
        Self {
            reply: Some(reply),
            calls: AtomicUsize::new(0),
        }
    }

    fn down() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }
}

impl AnalysisBackend for Fixed {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn analyze(
        &self,
        _request: &AnalysisRequest,
        _images: &[EncodedImage],
    ) -> Result<BackendReply, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().ok_or(BackendError::Rejected {
            endpoint: "fixed".into(),
            message: "down".into(),
        })
    }
}

/// Submit the open flow and feed the orchestrator's answer back.
async fn run_analysis<P, S>(
    app: &mut AppShell,
    orch: &AnalysisOrchestrator<P, S, MemoryHistory>,
) -> (Screen, ResultSource)
where
    P: AnalysisBackend,
    S: AnalysisBackend,
{
    app.advance(NavEvent::Submit).unwrap();
    let flow = app.flow().unwrap();
    let ticket = flow.pending_ticket().unwrap();
    let analysis = orch
        .analyze(
            flow.feature().analysis_kind(),
            &flow.state().photos(),
            flow.session_id(),
        )
        .await
        .unwrap();
    let screen = app
        .advance(NavEvent::completed(ticket, analysis.result))
        .unwrap();
    (screen, analysis.source)
}

#[tokio::test]
async fn malformed_primary_text_reaches_results_screen() {
    let registry = AssetRegistry::new();
    let text = testing::in_markdown_fence(testing::LIFE_MAP_JSON);
    let orch = AnalysisOrchestrator::new(
        Fixed::replying(BackendReply::Structured(serde_json::Value::String(text))),
        Fixed::down(),
        MemoryHistory::new(),
    );

    let mut app = AppShell::new();
    app.open(Feature::LifeMap);
    app.advance(NavEvent::Begin).unwrap();
    app.advance(NavEvent::SelectPhoto {
        slot: PhotoSlot::First,
        asset: testing::photo(&registry, "me.png"),
    })
    .unwrap();

    let (screen, source) = run_analysis(&mut app, &orch).await;

    assert_eq!(screen, Screen::Results);
    assert_eq!(source, ResultSource::Primary);
    let result = app.flow().unwrap().result().unwrap();
    assert_eq!(result.as_life_map().unwrap().personality_scores.openness, 88);

    // Explore the reading, then walk back out.
    assert_eq!(app.advance(NavEvent::ViewFacialDetails), Ok(Screen::FacialDetails));
    let mut orbit = OrbitalSelector::new(5, 120.0, (160.0, 160.0));
    orbit.select(3);
    assert_eq!(orbit.active_index(), 3);
    assert_eq!(app.advance(NavEvent::ViewTimeline), Ok(Screen::Timeline));
    assert_eq!(app.advance(NavEvent::GenerateAnimation), Ok(Screen::Animation));

    for expected in [Screen::Timeline, Screen::Results, Screen::Entry] {
        app.go_back();
        assert_eq!(app.flow().unwrap().screen(), expected);
    }
    assert!(app.flow().unwrap().result().is_none());
    assert_eq!(app.go_back(), Route::Home);
}

#[tokio::test]
async fn compatibility_falls_back_to_mock_when_everything_is_down() {
    let registry = AssetRegistry::new();
    let primary = Fixed::down();
    let secondary = Fixed::down();
    let orch = AnalysisOrchestrator::new(primary, secondary, MemoryHistory::new());

    let mut app = AppShell::new();
    app.open(Feature::Compatibility);
    app.advance(NavEvent::Begin).unwrap();
    for (slot, name) in [(PhotoSlot::First, "a.png"), (PhotoSlot::Second, "b.png")] {
        app.advance(NavEvent::SelectPhoto {
            slot,
            asset: testing::photo(&registry, name),
        })
        .unwrap();
    }

    let (screen, source) = run_analysis(&mut app, &orch).await;

    assert_eq!(screen, Screen::Results);
    assert_eq!(source, ResultSource::Mock);
    let score = app.flow().unwrap().result().unwrap().as_compatibility().unwrap().clone();
    assert!(COMPATIBILITY_OVERALL_RANGE.contains(&score.overall));
    assert_eq!(app.advance(NavEvent::GenerateAnimation), Ok(Screen::Animation));
}

#[tokio::test]
async fn result_arriving_after_user_left_is_dropped() {
    let registry = AssetRegistry::new();
    let orch = AnalysisOrchestrator::new(
        Fixed::replying(BackendReply::Text(testing::DAILY_INSIGHT_JSON.to_string())),
        Fixed::down(),
        MemoryHistory::new(),
    );

    let mut app = AppShell::new();
    app.open(Feature::DailyInsight);
    app.advance(NavEvent::SelectPhoto {
        slot: PhotoSlot::First,
        asset: testing::photo(&registry, "me.png"),
    })
    .unwrap();
    app.advance(NavEvent::Submit).unwrap();

    let flow = app.flow().unwrap();
    let ticket = flow.pending_ticket().unwrap();
    let analysis = orch
        .analyze(AnalysisKind::DailyInsight, &flow.state().photos(), flow.session_id())
        .await
        .unwrap();

    // The user backed out of the loading screen before the answer came in.
    app.go_back();
    assert!(app.advance(NavEvent::completed(ticket, analysis.result)).is_err());
    assert_eq!(app.flow().unwrap().screen(), Screen::Upload);
    assert!(app.flow().unwrap().result().is_none());
}

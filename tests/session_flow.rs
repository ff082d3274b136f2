//! Cross-service session flows with a scripted camera device and a mocked
//! analysis backend.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::RgbImage;
use mockall::mock;
use tokio::sync::Notify;

use chartsight::camera::{CameraDevice, CameraStream, StreamConstraints, VideoTrack};
use chartsight::errors::{InputError, PermissionError, ServiceError, SessionError};
use chartsight::models::{Direction, ImagePayload, ImageSource, SessionState, VisualIndicator};
use chartsight::platform::{Browser, CapabilityProbe, Platform, StaticProbe};
use chartsight::services::{AnalysisBackend, AnalysisOrchestrator, ChartSession};

const VERDICT: &str = r#"Assessment follows.
{
  "direcao": "COMPRA",
  "probabilidade": "74%",
  "indicador_visual": "SETA_VERDE_CIMA",
  "analise_resumida": "Impulse continuation above key support.",
  "fibonacci": {
    "nivel_atual": "61.8%",
    "suporte_chave": "1.0825",
    "resistencia_chave": "1.0930",
    "projecao": "161.8% extension"
  },
  "elliott": {
    "padrao_atual": "Impulse",
    "onda_atual": "3",
    "fase": "Wave 3 forming",
    "proximo_movimento": "Continuation up"
  }
}
Probabilistic chart analysis. Not financial advice."#;

#[derive(Default)]
struct StreamCounters {
    acquired: AtomicUsize,
    stopped: AtomicUsize,
}

struct CountingTrack {
    counters: Arc<StreamCounters>,
}

impl VideoTrack for CountingTrack {
    fn dimensions(&self) -> (u32, u32) {
        (640, 480)
    }

    fn grab_frame(&mut self) -> Result<RgbImage, InputError> {
        Ok(RgbImage::new(640, 480))
    }

    fn stop(&mut self) {
        self.counters.stopped.fetch_add(1, Ordering::SeqCst);
    }
}

/// Device answering from a prepared script; `None` grants a counted stream.
struct ScriptedDevice {
    counters: Arc<StreamCounters>,
    script: Mutex<Vec<Option<PermissionError>>>,
    requests: Mutex<Vec<StreamConstraints>>,
}

impl ScriptedDevice {
    fn new(script: Vec<Option<PermissionError>>) -> Arc<Self> {
        Arc::new(Self {
            counters: Arc::new(StreamCounters::default()),
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn request_log(&self) -> Vec<StreamConstraints> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CameraDevice for ScriptedDevice {
    async fn open(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<CameraStream, PermissionError> {
        self.requests.lock().unwrap().push(constraints.clone());
        match self.script.lock().unwrap().remove(0) {
            None => {
                self.counters.acquired.fetch_add(1, Ordering::SeqCst);
                Ok(CameraStream::new(Box::new(CountingTrack {
                    counters: self.counters.clone(),
                })))
            }
            Some(err) => Err(err),
        }
    }
}

mock! {
    Backend {}

    #[async_trait]
    impl AnalysisBackend for Backend {
        async fn analyze(&self, image: &ImagePayload) -> Result<String, ServiceError>;
    }
}

/// Backend that parks until released, for in-flight interleavings.
struct BlockingBackend {
    release: Arc<Notify>,
}

#[async_trait]
impl AnalysisBackend for BlockingBackend {
    async fn analyze(&self, _image: &ImagePayload) -> Result<String, ServiceError> {
        self.release.notified().await;
        Ok(VERDICT.to_string())
    }
}

fn desktop_probe() -> Arc<dyn CapabilityProbe> {
    Arc::new(StaticProbe {
        platform: Platform::Desktop,
        browser: Browser::Chrome,
    })
}

fn verdict_backend() -> Arc<MockBackend> {
    let mut backend = MockBackend::new();
    backend
        .expect_analyze()
        .returning(|_| Ok(VERDICT.to_string()));
    Arc::new(backend)
}

fn temp_chart(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("chartsight-session-test");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]).unwrap();
    path
}

#[tokio::test]
async fn camera_capture_flow_reaches_result() {
    let device = ScriptedDevice::new(vec![None]);
    let mut session = ChartSession::new(device.clone(), verdict_backend(), desktop_probe());

    assert_eq!(session.start().await.unwrap(), SessionState::CameraActive);
    assert_eq!(session.preview_dimensions(), Some((640, 480)));

    let state = session.capture_and_analyze().await.unwrap();
    assert_eq!(state, SessionState::Result);

    let result = session.result().unwrap();
    assert_eq!(result.direction, Direction::Buy);
    assert_eq!(result.visual_indicator, VisualIndicator::UpArrow);
    assert!(result.fibonacci.is_some());
    assert!(result.elliott.is_some());

    let image = session.image().unwrap();
    assert_eq!(image.source, ImageSource::Camera);
    assert!(image.data_uri.starts_with("data:image/jpeg;base64,"));

    assert_eq!(device.counters.acquired.load(Ordering::SeqCst), 1);
    assert_eq!(device.counters.stopped.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stops_match_acquires_across_cancel_and_capture() {
    let device = ScriptedDevice::new(vec![None, None]);
    let mut session = ChartSession::new(device.clone(), verdict_backend(), desktop_probe());

    session.start().await.unwrap();
    assert_eq!(session.cancel().unwrap(), SessionState::Idle);

    session.start().await.unwrap();
    session.capture_and_analyze().await.unwrap();
    session.reset();

    assert_eq!(device.counters.acquired.load(Ordering::SeqCst), 2);
    assert_eq!(device.counters.stopped.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn constraint_retry_succeeds_with_minimal_set() {
    let device = ScriptedDevice::new(vec![
        Some(PermissionError::ConstraintsUnsatisfiable),
        None,
    ]);
    let mut session = ChartSession::new(device.clone(), verdict_backend(), desktop_probe());

    assert_eq!(session.start().await.unwrap(), SessionState::CameraActive);

    let requests = device.request_log();
    assert_eq!(requests.len(), 2, "exactly one relaxed retry");
    assert_eq!(requests[0], StreamConstraints::preferred());
    assert!(requests[1].is_minimal());
}

#[tokio::test]
async fn constraint_retry_failure_offers_fallback() {
    let device = ScriptedDevice::new(vec![
        Some(PermissionError::ConstraintsUnsatisfiable),
        Some(PermissionError::Denied),
    ]);
    let mut session = ChartSession::new(device.clone(), verdict_backend(), desktop_probe());

    let err = session.start().await.unwrap_err();
    assert!(matches!(err, SessionError::Permission(_)));
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.fallback_offered());
    assert!(session.denial_message().is_some());
    assert_eq!(device.request_log().len(), 2, "no second retry");

    // The fallback exposes a retry that can still succeed.
    device.script.lock().unwrap().push(None);
    assert_eq!(
        session.retry_permission().await.unwrap(),
        SessionState::CameraActive
    );
}

#[tokio::test]
async fn ios_parks_for_consent_before_prompting() {
    let device = ScriptedDevice::new(vec![None]);
    let probe = Arc::new(StaticProbe {
        platform: Platform::Ios,
        browser: Browser::Safari,
    });
    let mut session = ChartSession::new(device.clone(), verdict_backend(), probe);

    assert_eq!(
        session.start().await.unwrap(),
        SessionState::PermissionPending
    );
    assert!(
        device.request_log().is_empty(),
        "no device call before consent"
    );

    assert_eq!(
        session.confirm_consent().await.unwrap(),
        SessionState::CameraActive
    );
    assert_eq!(device.request_log().len(), 1);
}

#[tokio::test]
async fn non_image_upload_never_reaches_network() {
    let device = ScriptedDevice::new(vec![]);
    let mut backend = MockBackend::new();
    backend.expect_analyze().never();
    let mut session = ChartSession::new(device, Arc::new(backend), desktop_probe());

    let err = session
        .upload_and_analyze(Path::new("notes.txt"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Input(InputError::UnsupportedType(_))
    ));
    assert_eq!(session.state(), SessionState::Idle);
}

#[tokio::test]
async fn unreadable_upload_is_local_error() {
    let device = ScriptedDevice::new(vec![]);
    let mut backend = MockBackend::new();
    backend.expect_analyze().never();
    let mut session = ChartSession::new(device, Arc::new(backend), desktop_probe());

    let err = session
        .upload_and_analyze(Path::new("/nonexistent/chart.png"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Input(InputError::Unreadable(_))
    ));
    assert_eq!(session.state(), SessionState::Idle);
}

#[tokio::test]
async fn upload_flow_reaches_result() {
    let device = ScriptedDevice::new(vec![]);
    let mut session = ChartSession::new(device, verdict_backend(), desktop_probe());

    let path = temp_chart("upload-flow.png");
    let state = session.upload_and_analyze(&path).await.unwrap();
    assert_eq!(state, SessionState::Result);

    let image = session.image().unwrap();
    assert_eq!(image.source, ImageSource::Upload);
    assert!(image.data_uri.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn analysis_failure_lands_in_error_until_reset() {
    let device = ScriptedDevice::new(vec![None]);
    let mut backend = MockBackend::new();
    backend
        .expect_analyze()
        .returning(|_| Ok("nothing structured in here".to_string()));
    let mut session = ChartSession::new(device.clone(), Arc::new(backend), desktop_probe());

    session.start().await.unwrap();
    let err = session.capture_and_analyze().await.unwrap_err();
    assert!(matches!(err, SessionError::Response(_)));
    assert_eq!(session.state(), SessionState::Error);
    assert!(session.error_message().is_some());
    assert!(session.result().is_none());

    // Only an explicit reset leaves Error.
    assert!(matches!(
        session.start().await.unwrap_err(),
        SessionError::InvalidState(SessionState::Error)
    ));
    assert_eq!(session.reset(), SessionState::Idle);
    assert!(session.error_message().is_none());
    assert!(session.image().is_none());

    // Camera handle from the failed round is not leaked.
    assert_eq!(device.counters.acquired.load(Ordering::SeqCst), 1);
    assert_eq!(device.counters.stopped.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn remote_failure_surfaces_service_error() {
    let device = ScriptedDevice::new(vec![None]);
    let mut backend = MockBackend::new();
    backend.expect_analyze().returning(|_| {
        Err(ServiceError::Remote {
            status: 500,
            message: "empty completion from provider".to_string(),
        })
    });
    let mut session = ChartSession::new(device, Arc::new(backend), desktop_probe());

    session.start().await.unwrap();
    let err = session.capture_and_analyze().await.unwrap_err();
    assert!(matches!(err, SessionError::Service(_)));
    assert_eq!(session.state(), SessionState::Error);
}

#[tokio::test]
async fn indicator_divergence_survives_to_renderer() {
    let device = ScriptedDevice::new(vec![]);
    let mut backend = MockBackend::new();
    backend.expect_analyze().returning(|_| {
        Ok(r#"{
            "direcao": "COMPRA",
            "probabilidade": "61%",
            "indicador_visual": "NEUTRO",
            "analise_resumida": "Bias up but no confirmation."
        }"#
        .to_string())
    });
    let mut session = ChartSession::new(device, Arc::new(backend), desktop_probe());

    let path = temp_chart("divergent.png");
    session.upload_and_analyze(&path).await.unwrap();

    let result = session.result().unwrap();
    assert_eq!(result.direction, Direction::Buy);
    // Rendering follows the indicator field, not the direction.
    assert_eq!(result.visual_indicator, VisualIndicator::Neutral);
    assert_eq!(result.visual_indicator.glyph(), "●");
    assert_eq!(result.visual_indicator.caption(), "UNDEFINED");
}

#[tokio::test]
async fn single_flight_rejects_second_submission() {
    let release = Arc::new(Notify::new());
    let orchestrator = Arc::new(AnalysisOrchestrator::new(Arc::new(BlockingBackend {
        release: release.clone(),
    })));
    let image = ImagePayload::new(
        "data:image/png;base64,AAAA".to_string(),
        ImageSource::Upload,
    );

    let first = tokio::spawn({
        let orchestrator = orchestrator.clone();
        let image = image.clone();
        async move { orchestrator.submit(&image).await }
    });

    for _ in 0..100 {
        if orchestrator.is_analyzing() {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(orchestrator.is_analyzing());

    let second = orchestrator.submit(&image).await;
    assert!(matches!(
        second,
        Err(SessionError::InvalidState(SessionState::Analyzing))
    ));

    release.notify_one();
    let result = first.await.unwrap().unwrap();
    assert_eq!(result.direction, Direction::Buy);
    assert!(!orchestrator.is_analyzing());

    // The flag cleared; a fresh submission is accepted again.
    release.notify_one();
    assert!(orchestrator.submit(&image).await.is_ok());
}

#[tokio::test]
async fn capture_refused_outside_camera_active() {
    let device = ScriptedDevice::new(vec![]);
    let mut session = ChartSession::new(device, verdict_backend(), desktop_probe());

    assert!(matches!(
        session.capture_and_analyze().await.unwrap_err(),
        SessionError::InvalidState(SessionState::Idle)
    ));
    assert!(matches!(
        session.cancel().unwrap_err(),
        SessionError::InvalidState(SessionState::Idle)
    ));
}

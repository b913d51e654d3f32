//! Application entry point.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (written with defaults on first run).
//! 3. Create the tokio runtime.
//! 4. Load the template catalog and build the memegen renderer.
//! 5. Spawn the session task.
//! 6. Load Whisper, open the microphone and start the speech listener
//!    (skipped, with a warning, when either is unavailable).
//! 7. Spawn the hotkey listener thread.
//! 8. Run [`eframe::run_native`] until the window is closed.

use std::sync::{atomic::AtomicBool, Arc};

use eframe::egui;
use tokio::sync::mpsc;

use memegen_live::{
    app::{MemeApp, SpeechStatus},
    audio::{AudioCapture, AudioChunk, StreamHandle},
    catalog::{Catalog, TemplateCatalog},
    config::{AppConfig, AppPaths},
    hotkey::{parse_key, HotkeyEvent, HotkeyListener},
    render::{MemegenRenderer, RenderService},
    session::{new_shared_status, ChannelSink, DisplaySink, Session, SessionEvent},
    speech::SpeechListener,
    stt::{ModelPaths, SttEngine, TranscribeParams, WhisperEngine},
};

const APP_NAME: &str = "memegen-live";

// ---------------------------------------------------------------------------
// Speech input
// ---------------------------------------------------------------------------

/// Keeps the microphone stream and recognition thread alive.
struct SpeechHandles {
    _stream: StreamHandle,
    _listener: SpeechListener,
}

/// Load the model, open the microphone and start recognition.
fn start_speech(
    config: &AppConfig,
    paths: &AppPaths,
    events: mpsc::Sender<SessionEvent>,
    listening: Arc<AtomicBool>,
) -> anyhow::Result<SpeechHandles> {
    let model_path = ModelPaths::from_app_paths(paths).resolve(&config.speech.model);
    let stt: Arc<dyn SttEngine> = Arc::new(WhisperEngine::load(
        &model_path,
        TranscribeParams::from_config(&config.speech),
    )?);

    let capture = AudioCapture::new()?;
    let (chunk_tx, chunk_rx) = std::sync::mpsc::channel::<AudioChunk>();
    let listener = SpeechListener::start(&config.speech, stt, chunk_rx, events, listening)?;
    let stream = capture.start(chunk_tx)?;

    log::info!(
        "speech: microphone open ({} Hz, {} ch)",
        capture.sample_rate(),
        capture.channels()
    );
    Ok(SpeechHandles {
        _stream: stream,
        _listener: listener,
    })
}

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let min = [config.ui.min_width, config.ui.min_height];
    let mut vp = egui::ViewportBuilder::default()
        .with_title(window_title())
        .with_inner_size(min)
        .with_min_inner_size(min);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

fn window_title() -> String {
    format!("{APP_NAME} (v{})", env!("CARGO_PKG_VERSION"))
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("{} starting up", window_title());

    // 2. Configuration
    let paths = AppPaths::new();
    let config = AppConfig::load_or_init(&paths.settings_file).unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (session + HTTP only; Whisper has its own thread)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Catalog and renderer
    let catalog: Arc<dyn TemplateCatalog> = Arc::new(Catalog::load(&config.catalog, &paths));
    let renderer: Arc<dyn RenderService> = Arc::new(MemegenRenderer::from_config(&config.render));

    // 5. Session task
    let (event_tx, event_rx) = mpsc::channel::<SessionEvent>(64);
    let (sink, display_rx) = ChannelSink::new();
    let sink: Arc<dyn DisplaySink> = Arc::new(sink);
    let status = new_shared_status();

    let session = Session::new(&config.schedule, catalog, renderer, sink, Arc::clone(&status));
    rt.spawn(session.run(event_rx));

    // 6. Speech input
    let listening = Arc::new(AtomicBool::new(true));
    let mut speech_status = SpeechStatus::Unavailable;
    let _speech = if config.speech.enabled {
        match start_speech(&config, &paths, event_tx.clone(), Arc::clone(&listening)) {
            Ok(handles) => {
                speech_status = SpeechStatus::Available {
                    listening: Arc::clone(&listening),
                    toggle_key: config.hotkey.toggle_listening_key.clone(),
                };
                Some(handles)
            }
            Err(e) => {
                log::warn!("speech: unavailable ({e}); typing only");
                None
            }
        }
    } else {
        log::info!("speech: disabled in settings");
        None
    };

    // 7. Hotkey listener thread
    let (hotkey_tx, hotkey_rx) = mpsc::channel::<HotkeyEvent>(16);
    let hotkey_key = parse_key(&config.hotkey.toggle_listening_key).unwrap_or_else(|| {
        log::warn!(
            "hotkey: unknown key {:?}, using F9",
            config.hotkey.toggle_listening_key
        );
        rdev::Key::F9
    });
    let _hotkey_listener = HotkeyListener::start(hotkey_key, hotkey_tx)
        .map_err(|e| log::warn!("hotkey: listener unavailable: {e}"))
        .ok();

    // 8. Window (blocks until closed)
    let app = MemeApp::new(event_tx, display_rx, hotkey_rx, status, speech_status);
    let options = native_options(&config);

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
}

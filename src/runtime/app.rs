use std::sync::Arc;
use std::time::Instant;

use image::{RgbImage, RgbaImage};
use log::{debug, error, info};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use super::frame_clock::FrameClock;
use super::recorder::{EntryOutcome, Recorder, TriggerOutcome};
use crate::capture::{CameraSource, FrameSource, PollResult, poll_all};
use crate::compose::{MOSAIC_COLUMNS, compose_mosaic, overlay_prompt};
use crate::config::RecorderConfig;
use crate::entry::EntryKey;
use crate::logging;
use crate::present::Presenter;
use crate::session::{DatasetStore, SessionCounter};

pub const WINDOW_TITLE: &str = "Multi Camera";

struct RecorderApp {
    config: RecorderConfig,
    recorder: Recorder,
    sources: Vec<Box<dyn FrameSource>>,
    clock: FrameClock,
    window: Option<Arc<Window>>,
    window_id: Option<WindowId>,
    presenter: Option<Presenter>,
    last_poll: Option<PollResult>,
    frozen_mosaic: Option<RgbaImage>,
    display: Option<RgbaImage>,
    render_requested: bool,
    fatal: Option<String>,
}

impl RecorderApp {
    fn new(
        config: RecorderConfig,
        recorder: Recorder,
        sources: Vec<Box<dyn FrameSource>>,
    ) -> Self {
        let clock = FrameClock::new(config.poll_fps);

        Self {
            config,
            recorder,
            sources,
            clock,
            window: None,
            window_id: None,
            presenter: None,
            last_poll: None,
            frozen_mosaic: None,
            display: None,
            render_requested: false,
            fatal: None,
        }
    }

    // Unrecoverable error: log it, remember it for the process exit
    // status, and stop the loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, message: String) {
        error!("{}", message);
        self.fatal = Some(message);
        event_loop.exit();
    }

    // Creates the window sized to the mosaic grid, plus its surface.
    fn init_window(
        &mut self,
        event_loop: &ActiveEventLoop,
    ) -> Result<(), String> {
        let rows = (self.sources.len() as u32)
            .div_ceil(MOSAIC_COLUMNS)
            .max(1);
        let width = self.config.tile_width * MOSAIC_COLUMNS;
        let height = self.config.tile_height * rows;

        let attrs = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(width, height));

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|err| err.to_string())?,
        );

        let presenter = Presenter::new(window.clone())?;

        self.window_id = Some(window.id());
        self.window = Some(window);
        self.presenter = Some(presenter);

        Ok(())
    }

    fn request_redraw(&mut self) {
        self.render_requested = true;
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    // One paced tick: sweep the cameras while live and refresh the
    // mosaic only when every source delivered. Entry mode polls nothing;
    // the display stays frozen on the captured frame set.
    fn run_tick(&mut self) {
        if !self.recorder.is_live() {
            return;
        }

        let poll = poll_all(&mut self.sources);

        if let Some(frames) = poll.complete_frames() {
            let mosaic = compose_mosaic(
                &frames,
                self.config.tile_width,
                self.config.tile_height,
            );
            self.display = Some(mosaic);
            self.request_redraw();
        } else {
            debug!(
                "display unchanged; sources without frames: {:?}",
                poll.failed_indices()
            );
        }

        self.last_poll = Some(poll);
    }

    fn handle_key(
        &mut self,
        event_loop: &ActiveEventLoop,
        key_event: &KeyEvent,
    ) {
        if key_event.state != ElementState::Pressed || key_event.repeat {
            return;
        }

        let PhysicalKey::Code(code) = key_event.physical_key else {
            return;
        };

        if self.recorder.is_live() {
            match code {
                KeyCode::Space => self.trigger_capture(event_loop),
                KeyCode::KeyQ => {
                    info!("quit requested");
                    event_loop.exit();
                }
                _ => {}
            }
        } else if let Some(key) = entry_key_from_code(code) {
            self.feed_entry_key(event_loop, key);
        }
    }

    // Space in live mode: persist a session from the most recent sweep
    // and switch to metadata entry.
    fn trigger_capture(&mut self, event_loop: &ActiveEventLoop) {
        let Some(poll) = self.last_poll.as_ref() else {
            debug!("capture trigger ignored; no sweep yet");
            return;
        };

        match self.recorder.trigger_capture(poll) {
            Ok(TriggerOutcome::Ignored) => {
                debug!("capture trigger ignored; last sweep incomplete");
            }
            Ok(TriggerOutcome::Started(id)) => {
                info!("session {} images saved", id);
                self.freeze_mosaic();
                self.refresh_prompt();
            }
            Err(err) => {
                self.fail(
                    event_loop,
                    format!("failed to save session images: {}", err),
                );
            }
        }
    }

    // Composes the entry-mode backdrop once from the captured frames.
    fn freeze_mosaic(&mut self) {
        let Some(frames) = self.recorder.held_frames() else {
            return;
        };

        let frames: Vec<&RgbImage> = frames.iter().collect();
        let mosaic = compose_mosaic(
            &frames,
            self.config.tile_width,
            self.config.tile_height,
        );
        self.frozen_mosaic = Some(mosaic);
    }

    fn refresh_prompt(&mut self) {
        let (Some(base), Some(prompt)) =
            (self.frozen_mosaic.as_ref(), self.recorder.prompt())
        else {
            return;
        };

        let overlaid = overlay_prompt(base, &prompt);
        self.display = Some(overlaid);
        self.request_redraw();
    }

    fn feed_entry_key(
        &mut self,
        event_loop: &ActiveEventLoop,
        key: EntryKey,
    ) {
        match self.recorder.entry_key(key) {
            Ok(EntryOutcome::Pending) => self.refresh_prompt(),
            Ok(EntryOutcome::Saved(id)) => {
                info!("session {} metadata saved", id);
                self.frozen_mosaic = None;
            }
            Ok(EntryOutcome::Discarded { id, reason }) => {
                error!("session {} left without metadata: {}", id, reason);
                self.frozen_mosaic = None;
            }
            Err(err) => {
                self.fail(
                    event_loop,
                    format!("failed to save session metadata: {}", err),
                );
            }
        }
    }

    fn render(&mut self, event_loop: &ActiveEventLoop) {
        if !self.render_requested {
            return;
        }
        self.render_requested = false;

        let (Some(presenter), Some(image)) =
            (self.presenter.as_mut(), self.display.as_ref())
        else {
            return;
        };

        if let Err(err) = presenter.present(image) {
            self.fail(event_loop, format!("presentation failed: {}", err));
        }
    }
}

impl ApplicationHandler for RecorderApp {
    // Winit lifecycle hook: create window and surface once.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init_window(event_loop) {
            self.fail(
                event_loop,
                format!("failed to initialize display: {}", err),
            );
        }
    }

    // Main window event router for input, resize, redraw, and close.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window_id != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Destroyed => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_key(event_loop, &event);
            }
            WindowEvent::Resized(new_size) => {
                if let Some(presenter) = self.presenter.as_mut() {
                    presenter.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render(event_loop);
            }
            _ => {}
        }
    }

    // Tick hook: advance the poll clock and sleep until the next
    // deadline.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let tick = self.clock.tick(Instant::now());

        if tick.should_poll {
            self.run_tick();
        }

        event_loop.set_control_flow(ControlFlow::WaitUntil(
            self.clock.next_deadline(),
        ));
    }

    // Final lifecycle hook: streams stop before the process unwinds.
    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.sources.is_empty() {
            info!("releasing {} capture sources", self.sources.len());
            self.sources.clear();
        }
    }
}

/// Opens the cameras, seeds the session counter from the dataset, and
/// drives the capture loop until the operator quits.
pub fn run(config: RecorderConfig) -> Result<(), String> {
    logging::init_logger();

    let store = DatasetStore::new(&config.dataset_root);

    let counter = SessionCounter::scan(store.image_root())
        .map_err(|err| format!("failed to scan session index: {}", err))?;

    store
        .init_roots()
        .map_err(|err| format!("failed to create dataset roots: {}", err))?;

    let mut sources: Vec<Box<dyn FrameSource>> =
        Vec::with_capacity(config.devices.len());
    for path in &config.devices {
        let source = CameraSource::open(path).map_err(|err| {
            format!("failed to open camera '{}': {}", path.display(), err)
        })?;
        sources.push(Box::new(source));
    }

    info!(
        "recording to '{}'; next session {}; space captures, q quits",
        config.dataset_root.display(),
        counter.peek()
    );

    let recorder = Recorder::new(counter, store);

    let event_loop = EventLoop::new().map_err(|err| err.to_string())?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = RecorderApp::new(config, recorder, sources);

    event_loop
        .run_app(&mut app)
        .map_err(|err| err.to_string())?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn digit_from_key_code(code: KeyCode) -> Option<char> {
    match code {
        KeyCode::Digit0 => Some('0'),
        KeyCode::Digit1 => Some('1'),
        KeyCode::Digit2 => Some('2'),
        KeyCode::Digit3 => Some('3'),
        KeyCode::Digit4 => Some('4'),
        KeyCode::Digit5 => Some('5'),
        KeyCode::Digit6 => Some('6'),
        KeyCode::Digit7 => Some('7'),
        KeyCode::Digit8 => Some('8'),
        KeyCode::Digit9 => Some('9'),
        _ => None,
    }
}

fn entry_key_from_code(code: KeyCode) -> Option<EntryKey> {
    if let Some(digit) = digit_from_key_code(code) {
        return Some(EntryKey::Digit(digit));
    }

    match code {
        KeyCode::Enter | KeyCode::NumpadEnter => Some(EntryKey::Confirm),
        KeyCode::Backspace => Some(EntryKey::Delete),
        KeyCode::Period | KeyCode::NumpadDecimal => Some(EntryKey::Point),
        _ => None,
    }
}

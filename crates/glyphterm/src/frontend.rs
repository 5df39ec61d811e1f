//! winit window with a softbuffer surface.
//!
//! The window thread only produces events and shows finished frames. The
//! terminal loop runs on its own thread and reaches the window through an
//! [`EventLoopProxy`].

use std::num::NonZeroU32;
use std::rc::Rc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Ime, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoopProxy};
use winit::keyboard::{Key, NamedKey, PhysicalKey};
use winit::window::{UserAttentionType, Window, WindowId};

use glyphterm_core::{Error, Event, KeyCode, Result};
use glyphterm_render::{FrameBuffer, Presenter, BACKGROUND};
use glyphterm_session::{EventReceiver, EventSender};

use crate::terminal::{ExitReason, Terminal};

/// Messages from the terminal thread to the window thread.
#[derive(Debug)]
pub enum FrontendEvent {
    /// A finished frame to show
    Frame(FrameBuffer),
    /// New window title
    Title(String),
    /// Ring the bell
    Bell,
    /// The terminal loop has stopped
    Exit,
}

/// [`Presenter`] forwarding everything to the window thread.
#[derive(Debug, Clone)]
pub struct ProxyPresenter {
    proxy: EventLoopProxy<FrontendEvent>,
}

impl ProxyPresenter {
    /// Create a presenter sending through `proxy`.
    pub fn new(proxy: EventLoopProxy<FrontendEvent>) -> Self {
        Self { proxy }
    }

    fn send(&self, event: FrontendEvent) -> Result<()> {
        self.proxy
            .send_event(event)
            .map_err(|_| Error::Frontend("window event loop has exited".to_string()))
    }
}

impl Presenter for ProxyPresenter {
    fn present(&mut self, frame: &FrameBuffer) -> Result<()> {
        self.send(FrontendEvent::Frame(frame.clone()))
    }

    fn set_title(&mut self, title: &str) {
        if let Err(e) = self.send(FrontendEvent::Title(title.to_string())) {
            debug!("Dropping title update: {}", e);
        }
    }

    fn bell(&mut self) {
        if let Err(e) = self.send(FrontendEvent::Bell) {
            debug!("Dropping bell: {}", e);
        }
    }
}

/// Run the terminal loop on a thread named `terminal`.
///
/// The window is told to close once the loop returns, whatever the outcome.
pub fn spawn_terminal(
    mut terminal: Terminal<ProxyPresenter>,
    mut events: EventReceiver,
    proxy: EventLoopProxy<FrontendEvent>,
) -> std::io::Result<JoinHandle<Result<ExitReason>>> {
    thread::Builder::new()
        .name("terminal".to_string())
        .spawn(move || {
            let result = terminal.run(&mut events);
            if let Err(e) = &result {
                error!("Terminal loop failed: {}", e);
            }
            if proxy.send_event(FrontendEvent::Exit).is_err() {
                debug!("Window already closed");
            }
            result
        })
}

/// Translate a key press into a bridge event.
///
/// Keys with a fixed terminal encoding become [`Event::KeyDown`]; other keys
/// that produce printable text become [`Event::TextInput`]; remaining named
/// keys become `KeyDown(KeyCode::Other)`.
pub fn translate_key(event: &KeyEvent) -> Option<Event> {
    if event.state != ElementState::Pressed {
        return None;
    }
    if let Some(code) = key_code(&event.logical_key, event.physical_key) {
        return Some(Event::KeyDown(code));
    }
    if let Some(text) = event.text.as_deref().and_then(printable) {
        return Some(Event::TextInput(text.to_string()));
    }
    match event.logical_key {
        Key::Named(_) => Some(Event::KeyDown(KeyCode::Other(scan_code(event.physical_key)))),
        _ => None,
    }
}

/// Key code for keys with a fixed encoding.
pub fn key_code(logical: &Key, physical: PhysicalKey) -> Option<KeyCode> {
    if physical == PhysicalKey::Code(winit::keyboard::KeyCode::NumpadEnter) {
        return Some(KeyCode::KeypadEnter);
    }
    match logical {
        Key::Named(NamedKey::Escape) => Some(KeyCode::Escape),
        Key::Named(NamedKey::Backspace) => Some(KeyCode::Backspace),
        Key::Named(NamedKey::ArrowUp) => Some(KeyCode::Up),
        Key::Named(NamedKey::ArrowDown) => Some(KeyCode::Down),
        Key::Named(NamedKey::ArrowLeft) => Some(KeyCode::Left),
        Key::Named(NamedKey::ArrowRight) => Some(KeyCode::Right),
        Key::Named(NamedKey::Enter) => Some(KeyCode::Enter),
        _ => None,
    }
}

/// Text with no control characters, if non-empty.
fn printable(text: &str) -> Option<&str> {
    if text.is_empty() || text.chars().any(char::is_control) {
        None
    } else {
        Some(text)
    }
}

#[cfg(any(
    windows,
    target_os = "macos",
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
))]
fn scan_code(physical: PhysicalKey) -> u32 {
    use winit::platform::scancode::PhysicalKeyExtScancode;
    physical.to_scancode().unwrap_or(0)
}

#[cfg(not(any(
    windows,
    target_os = "macos",
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
fn scan_code(_physical: PhysicalKey) -> u32 {
    0
}

/// Copy `frame` into a `width` x `height` surface buffer, clipping or
/// padding with the background color as needed.
pub fn copy_frame(frame: &FrameBuffer, buffer: &mut [u32], width: u32, height: u32) {
    let copy_w = frame.width().min(width) as usize;
    let copy_h = frame.height().min(height) as usize;
    let (width, frame_w) = (width as usize, frame.width() as usize);

    if copy_w < width || copy_h < height as usize {
        buffer.fill(BACKGROUND);
    }
    for row in 0..copy_h {
        let src = &frame.pixels()[row * frame_w..row * frame_w + copy_w];
        buffer[row * width..row * width + copy_w].copy_from_slice(src);
    }
}

type Surface = softbuffer::Surface<Rc<Window>, Rc<Window>>;

/// Window-thread application state.
pub struct WindowApp {
    title: String,
    size: (u32, u32),
    events: EventSender,
    window: Option<Rc<Window>>,
    surface: Option<Surface>,
    frame: Option<FrameBuffer>,
    closing: bool,
    error: Option<Error>,
}

impl WindowApp {
    /// Create the app for a window of `size` pixels.
    pub fn new(title: impl Into<String>, size: (u32, u32), events: EventSender) -> Self {
        Self {
            title: title.into(),
            size,
            events,
            window: None,
            surface: None,
            frame: None,
            closing: false,
            error: None,
        }
    }

    /// Error that stopped the window, if any.
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Error) {
        error!("{}", err);
        self.error = Some(err);
        self.request_quit(event_loop);
        event_loop.exit();
    }

    /// Ask the terminal loop to stop; it answers with `FrontendEvent::Exit`.
    fn request_quit(&mut self, event_loop: &ActiveEventLoop) {
        if self.closing {
            return;
        }
        self.closing = true;
        if self.events.push(Event::Quit).is_err() {
            event_loop.exit();
        }
    }

    fn push(&mut self, event_loop: &ActiveEventLoop, event: Event) {
        if self.events.push(event).is_err() {
            warn!("Terminal loop is gone, closing window");
            event_loop.exit();
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let (width, height) = self.size;
        let attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(false);
        let window = Rc::new(
            event_loop
                .create_window(attributes)
                .map_err(|e| Error::Frontend(format!("Failed to create window: {e}")))?,
        );

        let context = softbuffer::Context::new(Rc::clone(&window))
            .map_err(|e| Error::Frontend(format!("Failed to create graphics context: {e}")))?;
        let surface = softbuffer::Surface::new(&context, Rc::clone(&window))
            .map_err(|e| Error::Frontend(format!("Failed to create surface: {e}")))?;

        info!("Window created: {}x{} pixels", width, height);
        window.request_redraw();
        self.window = Some(window);
        self.surface = Some(surface);
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let (Some(window), Some(surface)) = (&self.window, &mut self.surface) else {
            return Ok(());
        };
        let size = window.inner_size();
        let (Some(width), Some(height)) =
            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Ok(());
        };

        surface
            .resize(width, height)
            .map_err(|e| Error::Frontend(format!("Failed to resize surface: {e}")))?;
        let mut buffer = surface
            .buffer_mut()
            .map_err(|e| Error::Frontend(format!("Failed to map surface: {e}")))?;
        match &self.frame {
            Some(frame) => copy_frame(frame, &mut buffer, width.get(), height.get()),
            None => buffer.fill(BACKGROUND),
        }
        buffer
            .present()
            .map_err(|e| Error::Frontend(format!("Failed to present frame: {e}")))
    }
}

impl std::fmt::Debug for WindowApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowApp")
            .field("title", &self.title)
            .field("size", &self.size)
            .field("closing", &self.closing)
            .finish_non_exhaustive()
    }
}

impl ApplicationHandler<FrontendEvent> for WindowApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FrontendEvent) {
        match event {
            FrontendEvent::Frame(frame) => {
                self.frame = Some(frame);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            FrontendEvent::Title(title) => {
                if let Some(window) = &self.window {
                    window.set_title(&title);
                }
            }
            FrontendEvent::Bell => {
                if let Some(window) = &self.window {
                    window.request_user_attention(Some(UserAttentionType::Informational));
                }
            }
            FrontendEvent::Exit => {
                info!("Terminal loop stopped, closing window");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Window close requested");
                self.request_quit(event_loop);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(event) = translate_key(&event) {
                    self.push(event_loop, event);
                }
            }

            WindowEvent::Ime(Ime::Commit(text)) => {
                if !text.is_empty() {
                    self.push(event_loop, Event::TextInput(text));
                }
            }

            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            }

            WindowEvent::Resized(size) => {
                debug!("Window resized to {}x{}, grid size unchanged", size.width, size.height);
            }

            _ => {}
        }
    }
}

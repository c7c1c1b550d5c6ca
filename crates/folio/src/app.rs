use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use folio_config::Config;
use folio_effects::{FrameScheduler, SchedulerConfig, TickOutcome};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout, Size},
    style::Stylize,
    text::Line,
};

use crate::canvas::TerminalCanvas;

/// Mouse reporting is on while this is alive.
struct MouseCapture;

impl MouseCapture {
    fn enable() -> io::Result<Self> {
        execute!(io::stdout(), EnableMouseCapture)?;
        Ok(Self)
    }
}

impl Drop for MouseCapture {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), DisableMouseCapture);
    }
}

/// The backdrop application: a scheduler and the two layers it draws on.
#[derive(Debug)]
pub struct App {
    scheduler: FrameScheduler,
    /// Code rain, faded between frames.
    backdrop: TerminalCanvas,
    /// Cursor trail, grid, nodes and shapes, redrawn from scratch each frame.
    overlay: TerminalCanvas,
    frame_interval: Duration,
}

impl App {
    /// Build the app for a terminal of `size` cells.
    pub fn new(config: &Config, size: Size) -> Self {
        let cell_width = config.surface.cell_width;
        let cell_height = config.surface.cell_height;

        let mut backdrop = TerminalCanvas::new(cell_width, cell_height);
        let mut overlay = TerminalCanvas::new(cell_width, cell_height);
        backdrop.resize(size.width, size.height);
        overlay.resize(size.width, size.height);

        let scheduler = FrameScheduler::new(
            SchedulerConfig {
                toggles: config.effects,
                particles: config.particles.clone(),
                rain: config.rain.clone(),
                network: config.network.clone(),
                ambient: config.ambient.clone(),
                seed: config.seed,
            },
            backdrop.viewport(),
        );

        Self {
            scheduler,
            backdrop,
            overlay,
            frame_interval: config.surface.frame_interval(),
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        let _mouse = MouseCapture::enable()?;
        let started = Instant::now();
        tracing::info!(viewport = ?self.scheduler.viewport(), "backdrop started");

        loop {
            let frame_start = Instant::now();
            let outcome =
                self.scheduler
                    .tick(started.elapsed(), &mut self.backdrop, &mut self.overlay);
            if outcome == TickOutcome::Stopped {
                break;
            }
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events(frame_start + self.frame_interval)?;
        }

        tracing::info!(frames = self.scheduler.frame_count(), "backdrop stopped");
        Ok(())
    }

    /// Renders the user interface.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(&self.backdrop, area);
        frame.render_widget(&self.overlay, area);

        let [_, help_area] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
        let help = Line::from(vec![
            "q".bold().light_magenta(),
            " quit  ".dark_gray(),
            "mouse".bold().light_magenta(),
            " trail".dark_gray(),
        ])
        .centered();
        frame.render_widget(help, help_area);
    }

    /// Handle events until `deadline`, the start of the next frame.
    fn handle_crossterm_events(&mut self, deadline: Instant) -> color_eyre::Result<()> {
        loop {
            let timeout = deadline.saturating_duration_since(Instant::now());
            if !event::poll(timeout)? {
                return Ok(());
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(mouse) => self.on_mouse_event(mouse),
                Event::Resize(cols, rows) => self.on_resize(cols, rows),
                _ => {}
            }
            if !self.scheduler.is_running() {
                return Ok(());
            }
        }
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            _ => {}
        }
    }

    fn on_mouse_event(&mut self, mouse: MouseEvent) {
        if let MouseEventKind::Moved | MouseEventKind::Drag(_) = mouse.kind {
            let at = self.backdrop.cell_center(mouse.column, mouse.row);
            self.scheduler.pointer_moved(at);
        }
    }

    fn on_resize(&mut self, cols: u16, rows: u16) {
        self.backdrop.resize(cols, rows);
        self.overlay.resize(cols, rows);
        self.scheduler.resize(self.backdrop.viewport());
    }

    /// Stop the scheduler; the main loop exits before the next frame.
    fn quit(&mut self) {
        self.scheduler.stop();
    }
}

//! Player: the interactive terminal loop.
//!
//! Drives a [`Scene`] at the configured frame rate, maps key presses onto
//! bunny and camera commands, and streams finished frames to the terminal.
//! The player makes no drawing decisions of its own; it hands each frame
//! from the renderer to the terminal untouched.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::{cursor, execute, queue, style, terminal};
use log::{debug, info};

use crate::config::ValidatedConfig;
use crate::engine::bunny::BunnyState;
use crate::engine::Scene;
use crate::menubar::print_menu_item;
use crate::renderer::{DisplaySurface, SceneRenderer};
use crate::sprites::{ProgressiveLoader, SpriteSource};

/// Rows reserved above the canvas for the key hints.
const CANVAS_OFFSET: u16 = 1;

/// Sprite sizes loaded per frame while the scene is running.
const LOAD_BUDGET: usize = 1;

const KEY_HINTS: &[&str] = &[
    "[←][→] walk",
    "[↑][↓] depth",
    "[Space] jump",
    "[i] idle",
    "[q][Esc] quit",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Walk { right: bool },
    Idle,
    Jump,
    Depth(f64),
    Quit,
}

/// Map a key press onto a scene command.
pub fn action_for(key: &KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Left | KeyCode::Char('a') => Some(Action::Walk { right: false }),
        KeyCode::Right | KeyCode::Char('d') => Some(Action::Walk { right: true }),
        KeyCode::Up | KeyCode::Char('w') => Some(Action::Depth(1.0)),
        KeyCode::Down | KeyCode::Char('s') => Some(Action::Depth(-1.0)),
        KeyCode::Char(' ') => Some(Action::Jump),
        KeyCode::Char('i') => Some(Action::Idle),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

/// Apply `action` to the scene. Returns `false` when the player should stop.
pub fn apply(scene: &mut Scene, action: Action) -> bool {
    match action {
        Action::Walk { right } => scene.walk(right),
        Action::Idle => scene.idle(),
        Action::Jump => {
            scene.jump();
        }
        Action::Depth(steps) => scene.move_depth(steps),
        Action::Quit => return false,
    }
    true
}

// ---------------------------------------------------------------------------
// Terminal surface
// ---------------------------------------------------------------------------

/// Writes frames to a terminal, rewriting only the rows that changed since
/// the previous frame. All rows go out in a single flush.
pub struct TerminalSurface<W: Write> {
    out: W,
    top: u16,
    previous: Vec<String>,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, top: u16) -> Self {
        TerminalSurface {
            out,
            top,
            previous: Vec::new(),
        }
    }

    /// Forget the previous frame so the next one is written in full.
    pub fn invalidate(&mut self) {
        self.previous.clear();
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }
}

impl<W: Write> DisplaySurface for TerminalSurface<W> {
    fn present(&mut self, frame: &str) -> io::Result<()> {
        let rows: Vec<&str> = frame.split('\n').collect();
        for (y, row) in rows.iter().enumerate() {
            if self.previous.get(y).map(String::as_str) == Some(*row) {
                continue;
            }
            queue!(self.out, cursor::MoveTo(0, self.top + y as u16), style::Print(row))?;
        }
        self.out.flush()?;
        self.previous = rows.into_iter().map(str::to_string).collect();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

pub struct Player {
    scene: Scene,
    source: Box<dyn SpriteSource>,
    loader: ProgressiveLoader,
    renderer: SceneRenderer,
    frame_time: Duration,
}

impl Player {
    /// Build the scene for the current terminal size. Sprites keep loading
    /// while the scene plays.
    pub fn new(config: &ValidatedConfig, source: Box<dyn SpriteSource>) -> Result<Self> {
        let (term_w, term_h) = terminal::size()?;
        let viewport = canvas_size(term_w, term_h)?;
        let mut loader = ProgressiveLoader::new();
        let scene = Scene::build(config, source.as_ref(), viewport, &mut loader);
        let fps = config.settings.fps.max(1);
        Ok(Player {
            scene,
            source,
            loader,
            renderer: SceneRenderer::new(),
            frame_time: Duration::from_millis(1000 / fps as u64),
        })
    }

    /// Play the scene in the terminal.
    ///
    /// Sets up the terminal, enters the event loop, and restores the terminal
    /// on exit (even on error).
    pub fn play(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;

        let result = self.run_loop(&mut stdout);

        // Always restore terminal state.
        let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();

        result
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    fn run_loop(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        let mut surface = TerminalSurface::new(io::stdout(), CANVAS_OFFSET);
        render_menubar(stdout)?;
        let start = Instant::now();
        info!("playing at {:?} per frame", self.frame_time);

        'frames: loop {
            let frame_start = Instant::now();

            if !self.loader.is_done() {
                self.loader.poll(self.source.as_ref(), LOAD_BUDGET);
            }
            let now_ms = start.elapsed().as_secs_f64() * 1000.0;
            self.renderer.render_frame(&mut self.scene, now_ms, &mut surface)?;
            self.render_status(stdout)?;

            let deadline = frame_start + self.frame_time;
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() || !event::poll(remaining)? {
                    break;
                }
                match event::read()? {
                    Event::Key(key) => {
                        if let Some(action) = action_for(&key) {
                            debug!("key {:?} -> {action:?}", key.code);
                            if !apply(&mut self.scene, action) {
                                break 'frames;
                            }
                        }
                    }
                    Event::Resize(w, h) => {
                        let (w, h) = canvas_size(w, h)?;
                        self.scene.resize(w, h);
                        execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
                        surface.invalidate();
                        render_menubar(stdout)?;
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Terminal output
    // -----------------------------------------------------------------------

    fn render_status(&self, stdout: &mut io::Stdout) -> Result<()> {
        let (_, h) = self.scene.viewport();
        let status_y = h + CANVAS_OFFSET;
        let (_, term_h) = terminal::size()?;
        if status_y >= term_h {
            return Ok(()); // No room for status bar.
        }

        let camera = self.scene.camera();
        let state = match self.scene.bunny().state() {
            BunnyState::Idle => "idle",
            BunnyState::Walk => "walk",
            BunnyState::Jump { .. } => "jump",
            BunnyState::Transition { .. } => "turning",
        };
        let loading = if self.loader.is_done() {
            String::new()
        } else {
            format!(" | loading {}", self.loader.pending())
        };
        let status = format!(" {state} | x {:.1} z {:.1}{loading} ", camera.x, camera.z);

        let mut cs = style::ContentStyle::default();
        cs.attributes.set(style::Attribute::Dim);

        queue!(
            stdout,
            cursor::MoveTo(0, status_y),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::PrintStyledContent(style::StyledContent::new(cs, status)),
        )?;
        stdout.flush()?;
        Ok(())
    }
}

fn render_menubar(stdout: &mut io::Stdout) -> Result<()> {
    queue!(
        stdout,
        cursor::MoveTo(0, 0),
        terminal::Clear(terminal::ClearType::CurrentLine),
        style::Print(" "),
    )?;
    for (i, item) in KEY_HINTS.iter().enumerate() {
        if i > 0 {
            queue!(stdout, style::Print("  "))?;
        }
        print_menu_item(stdout, item)?;
    }
    stdout.flush()?;
    Ok(())
}

/// Canvas size for a terminal: one row for key hints, one for status.
fn canvas_size(term_w: u16, term_h: u16) -> Result<(u16, u16)> {
    const MIN_W: u16 = 20;
    const MIN_H: u16 = 6;
    if term_w < MIN_W || term_h < MIN_H + 2 {
        bail!(
            "Terminal too small: need {}x{}, have {}x{}",
            MIN_W,
            MIN_H + 2,
            term_w,
            term_h,
        );
    }
    Ok((term_w, term_h - 2))
}

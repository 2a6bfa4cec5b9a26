//! Terminal viewer for the creature, running against the simulated IMU.
//!
//! Usage:
//!   cargo run --bin tui                           # default tunables
//!   cargo run --bin tui -- --config picobot.toml  # override tunables
//!
//! Keys
//! ----
//!   Space    shake the board
//!   p        pause / resume the frame loop
//!   q / Esc  quit
//!
//! The panel is painted from the recorded draw list of the last presented
//! frame, so what you see is exactly what the engine asked the display for.

use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine, Points, Rectangle},
        Block, Borders, Paragraph,
    },
    Frame, Terminal,
};

use picobot_rs::cli::ConfigArgs;
use picobot_rs::prelude::*;
use picobot_rs::types::AXIS_NAMES;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Frames each Space-bar shake lasts.
const JOLT_FRAMES: u32 = 5;

/// Outline sample count for ellipses. Enough for the 120 px heart ring to
/// look continuous on a braille canvas.
const ELLIPSE_STEPS: usize = 256;

type Viewer = FrameDriver<SimulatedSensor, DrawList, SimulatedBattery, LogBacklight>;

#[derive(Parser, Debug)]
#[command(name = "tui", version, about = "Terminal viewer for the creature")]
struct Cli {
    #[command(flatten)]
    engine: ConfigArgs,
}

// ── UI state ──────────────────────────────────────────────────────────────────

struct Ui {
    paused: bool,
    /// Set once the frame loop hits a fatal error; the last frame stays up.
    halted: Option<String>,
    shakes: u32,
}

// ── Colour and geometry helpers ───────────────────────────────────────────────

#[inline]
fn tui_color(c: picobot_rs::types::Color) -> Color {
    let (r, g, b) = c.rgb();
    Color::Rgb(r, g, b)
}

/// `true` if the offset (`dx`, `dy`), in panel coordinates (y down), lies in
/// one of the quadrants selected by `mask`.
fn in_quadrant(mask: Option<u8>, dx: f64, dy: f64) -> bool {
    let Some(mask) = mask else {
        return true;
    };
    let bit = match (dx >= 0.0, dy <= 0.0) {
        (true, true) => 0,
        (false, true) => 1,
        (false, false) => 2,
        (true, false) => 3,
    };
    mask & (1 << bit) != 0
}

/// Points of an ellipse in panel coordinates.
fn ellipse_points(
    x: i32,
    y: i32,
    rx: i32,
    ry: i32,
    filled: bool,
    mask: Option<u8>,
) -> Vec<(f64, f64)> {
    let (cx, cy, rx, ry) = (x as f64, y as f64, rx as f64, ry as f64);
    if filled {
        let mut pts = vec![];
        let (w, h) = (rx.max(0.5), ry.max(0.5));
        let mut dy = -ry;
        while dy <= ry {
            let mut dx = -rx;
            while dx <= rx {
                if (dx / w).powi(2) + (dy / h).powi(2) <= 1.0 && in_quadrant(mask, dx, dy) {
                    pts.push((cx + dx, cy + dy));
                }
                dx += 0.5;
            }
            dy += 0.5;
        }
        pts
    } else {
        (0..ELLIPSE_STEPS)
            .map(|i| {
                let a = i as f64 / ELLIPSE_STEPS as f64 * std::f64::consts::TAU;
                (rx * a.cos(), ry * a.sin())
            })
            .filter(|&(dx, dy)| in_quadrant(mask, dx, dy))
            .map(|(dx, dy)| (cx + dx, cy + dy))
            .collect()
    }
}

/// Replay one draw command onto the canvas, flipping y so the panel's
/// top-left origin lands in the canvas's top-left corner.
fn paint(ctx: &mut Context<'_>, cmd: &DrawCommand, height: f64) {
    let flip = |y: f64| height - y;
    match cmd {
        DrawCommand::Rect { x, y, w, h, color } => ctx.draw(&Rectangle {
            x: *x as f64,
            y: flip((*y + *h) as f64),
            width: *w as f64,
            height: *h as f64,
            color: tui_color(*color),
        }),
        DrawCommand::Line { x0, y0, x1, y1, color } => ctx.draw(&CanvasLine {
            x1: *x0 as f64,
            y1: flip(*y0 as f64),
            x2: *x1 as f64,
            y2: flip(*y1 as f64),
            color: tui_color(*color),
        }),
        DrawCommand::Ellipse {
            x,
            y,
            rx,
            ry,
            color,
            filled,
            quadrant_mask,
        } => {
            let coords: Vec<(f64, f64)> =
                ellipse_points(*x, *y, *rx, *ry, *filled, *quadrant_mask)
                    .into_iter()
                    .map(|(px, py)| (px, flip(py)))
                    .collect();
            ctx.draw(&Points {
                coords: &coords,
                color: tui_color(*color),
            });
        }
        DrawCommand::Text { text, x, y, color } => ctx.print(
            *x as f64,
            flip(*y as f64),
            Span::styled(text.clone(), Style::default().fg(tui_color(*color))),
        ),
    }
}

// ── Layout ────────────────────────────────────────────────────────────────────

/// Top-level render callback handed to [`Terminal::draw`].
fn draw(frame: &mut Frame, viewer: &Viewer, ui: &Ui) {
    let root = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .split(frame.area());

    draw_header(frame, root[0], viewer, ui);

    let body = Layout::horizontal([Constraint::Min(0), Constraint::Length(34)]).split(root[1]);
    draw_panel(frame, body[0], viewer);
    draw_stats(frame, body[1], viewer);

    draw_footer(frame, root[2], ui);
}

// ── Header ────────────────────────────────────────────────────────────────────

fn draw_header(frame: &mut Frame, area: Rect, viewer: &Viewer, ui: &Ui) {
    let s = viewer.engine().snapshot();
    let (label, color) = match (&ui.halted, s.state) {
        (Some(_), _) => ("■ Halted".to_owned(), Color::Red),
        (None, AlertnessState::Awake) => ("● Awake".to_owned(), Color::Green),
        (None, AlertnessState::Sleeping) => ("☾ Sleeping".to_owned(), Color::Blue),
    };
    let heart_style = if s.on_beat {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let battery = viewer
        .display()
        .texts()
        .find(|t| t.ends_with('v'))
        .map(|t| format!("Bat {t}"))
        .unwrap_or_else(|| "Bat N/A".into());
    let mode = match s.mode {
        RenderMode::Bars => "Bars",
        RenderMode::Graph => "Graph",
    };

    let line = Line::from(vec![
        Span::styled(
            " PICO BOT ",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        sep(),
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        sep(),
        Span::styled(format!("♥ {:.0} bpm", s.heart_rate), heart_style),
        sep(),
        Span::styled(battery, Style::default().fg(Color::White)),
        sep(),
        Span::styled(mode, Style::default().fg(Color::LightBlue)),
        sep(),
        Span::styled(format!("frame {}", s.frame), Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
    ]);

    frame.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

/// Dimmed vertical separator used between header fields.
#[inline]
fn sep<'a>() -> Span<'a> {
    Span::styled(" │ ", Style::default().fg(Color::DarkGray))
}

// ── Panel ─────────────────────────────────────────────────────────────────────

fn draw_panel(frame: &mut Frame, area: Rect, viewer: &Viewer) {
    let (w, h) = viewer.display().size();
    let (w, h) = (w as f64, h as f64);
    let commands = viewer.display().frame();
    let canvas = Canvas::default()
        .block(Block::default().title(" Panel ").borders(Borders::ALL))
        .marker(symbols::Marker::Braille)
        .background_color(Color::Black)
        .x_bounds([0.0, w])
        .y_bounds([0.0, h])
        .paint(move |ctx| {
            for cmd in commands {
                paint(ctx, cmd, h);
            }
        });
    frame.render_widget(canvas, area);
}

// ── Engine stats ──────────────────────────────────────────────────────────────

fn draw_stats(frame: &mut Frame, area: Rect, viewer: &Viewer) {
    let engine = viewer.engine();
    let s = engine.snapshot();
    let config = engine.config();
    let dim = Style::default().fg(Color::DarkGray);
    let val = Style::default().fg(Color::Cyan);

    let target = |t: Option<i32>| t.map(|t| format!(" → {t}")).unwrap_or_default();
    let mut lines = vec![
        Line::from(vec![
            Span::styled(" Boredom  ", dim),
            Span::styled(format!("{} / {}", s.boredom, config.alertness.boredom_max), val),
        ]),
        Line::from(vec![
            Span::styled(" Heart    ", dim),
            Span::styled(
                format!("{:.1} bpm  q{}", s.heart_rate, engine.heart().quadrant()),
                val,
            ),
        ]),
        Line::from(vec![
            Span::styled(" Eyes     ", dim),
            Span::styled(
                format!(
                    "L {}{}  R {}{}",
                    s.left_eye,
                    target(engine.eyes().left().target),
                    s.right_eye,
                    target(engine.eyes().right().target)
                ),
                val,
            ),
        ]),
        Line::from(vec![
            Span::styled(" Awake t  ", dim),
            Span::styled(format!("{} / {}", s.time_awake, config.eyes.blink_period), val),
        ]),
        Line::from(vec![
            Span::styled(" Graph    ", dim),
            Span::styled(
                format!(
                    "{} / {}",
                    engine.visualizer().graph().len(),
                    engine.visualizer().graph().capacity()
                ),
                val,
            ),
        ]),
        Line::raw(""),
        Line::styled(" Extents since wake", dim),
    ];
    for (axis, name) in AXIS_NAMES.iter().enumerate() {
        let text = match engine.raw_extents().get(axis) {
            Some((min, max)) => format!("{min:+9.2} … {max:+9.2}"),
            None => "·".to_owned(),
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {name:<4} "), dim),
            Span::styled(text, Style::default().fg(Color::Magenta)),
        ]));
    }

    frame.render_widget(
        Paragraph::new(lines).block(Block::default().title(" Engine ").borders(Borders::ALL)),
        area,
    );
}

// ── Footer ────────────────────────────────────────────────────────────────────

fn draw_footer(frame: &mut Frame, area: Rect, ui: &Ui) {
    let status = match (&ui.halted, ui.paused) {
        (Some(reason), _) => Span::styled(
            format!("  ■ {reason}"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        (None, true) => Span::styled(
            "  ⏸ PAUSED",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        (None, false) => Span::raw(""),
    };

    let keys = Line::from(vec![
        Span::raw(" "),
        key("[Space]"),
        Span::raw(format!("Shake ({})  ", ui.shakes)),
        key("[p]"),
        Span::raw(if ui.paused { "Resume  " } else { "Pause  " }),
        key("[q]"),
        Span::raw("Quit"),
        status,
    ]);

    frame.render_widget(
        Paragraph::new(keys).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

/// Styled keybinding label (bold yellow) used in the footer hint line.
#[inline]
fn key(s: &str) -> Span<'_> {
    Span::styled(
        s,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    use std::io::IsTerminal as _;
    let args = Cli::parse();
    if !io::stdout().is_terminal() {
        eprintln!("Error: picobot tui requires a real terminal (TTY).");
        eprintln!("Run it directly in a terminal emulator, not piped or redirected.");
        std::process::exit(1);
    }

    // ── Logging ─────────────────────────────────────────────────────────────
    // Write logs to a file so they never interfere with the TUI display.
    //   RUST_LOG=debug cargo run --bin tui
    // Logs are written to picobot-tui.log in the current directory.
    {
        use std::fs::File;
        if let Ok(file) = File::create("picobot-tui.log") {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
    }

    // ── Engine ────────────────────────────────────────────────────────────────
    let config = args.engine.load().context("loading configuration")?;
    let display = config.display.clone();
    let mut viewer: Viewer = FrameDriver::new(
        Engine::new(config)?,
        SimulatedSensor::new(display.fps),
        DrawList::new(display.width, display.height),
        SimulatedBattery::full(),
        LogBacklight::new(),
    );
    let period: Duration = viewer.frame_period();
    let mut ui = Ui {
        paused: false,
        halted: None,
        shakes: 0,
    };
    info!("tui started at {} fps", display.fps);

    // ── Terminal setup ────────────────────────────────────────────────────────
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    // ── Main loop ─────────────────────────────────────────────────────────────
    'main: loop {
        let started = Instant::now();

        // ── 1. Advance one frame ──────────────────────────────────────────────
        if !ui.paused && ui.halted.is_none() {
            if let Err(e) = viewer.tick() {
                error!("frame loop halted: {e}");
                ui.halted = Some(e.to_string());
            }
        }

        // ── 2. Render ─────────────────────────────────────────────────────────
        terminal.draw(|f| draw(f, &viewer, &ui))?;

        // ── 3. Handle keyboard until the frame period is used up ──────────────
        while let Some(wait) = (started + period).checked_duration_since(Instant::now()) {
            if !event::poll(wait)? {
                break;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            // In raw mode Ctrl+C arrives as a key event, not SIGINT.
            let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL)
                && key.code == KeyCode::Char('c');
            if ctrl_c {
                break 'main;
            }

            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break 'main,
                KeyCode::Char(' ') => {
                    ui.shakes += 1;
                    viewer.sensor_mut().jolt(JOLT_FRAMES);
                }
                KeyCode::Char('p') => {
                    ui.paused = !ui.paused;
                    info!("{}", if ui.paused { "paused" } else { "resumed" });
                }
                _ => {}
            }
        }
    }

    // ── Teardown ──────────────────────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

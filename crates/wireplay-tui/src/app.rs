//! The interactive flow: input handling, bridge draining, rendering.
//!
//! This loop is the sole writer of the rendering models. Run events cross
//! from the execution flow only through the dispatch bridge, drained once
//! per iteration; the execution future itself is spawned onto the runtime
//! and never awaited here.

use std::{io, time::Duration};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
    style::{Color as TuiColor, Style, Stylize},
    text::Line,
    widgets::{
        Block, Paragraph,
        canvas::{Canvas, Circle, Context},
    },
};
use tokio::runtime::Handle;
use wireplay_core::{
    Color, EndpointMarker, EventReceiver, EventRouter, LogSink, RenderSurface, RunController,
    StartError, StatusReporter,
};

use crate::{
    surface::{CanvasModel, LogModel, StatusModel},
    system_env::SystemEnv,
};

/// How long one iteration blocks waiting for input before redrawing.
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Radius of the moving token, in world units.
const TOKEN_RADIUS: f64 = 8.0;

fn to_tui(color: Color) -> TuiColor {
    TuiColor::Rgb(color.r, color.g, color.b)
}

/// The terminal application.
pub struct App {
    controller: RunController<SystemEnv>,
    events: EventReceiver,
    router: EventRouter,
    canvas: CanvasModel,
    log: LogModel,
    status: StatusModel,
    runtime: Handle,
    title: String,
    should_quit: bool,
}

impl App {
    /// Assemble the application around a controller and the receiving half
    /// of the dispatch bridge. The initial markers let the scene show the
    /// participants before the first run starts.
    pub fn new(
        controller: RunController<SystemEnv>,
        events: EventReceiver,
        initial_markers: Vec<EndpointMarker>,
        title: impl Into<String>,
        runtime: Handle,
    ) -> Self {
        let mut canvas = CanvasModel::new();
        for marker in &initial_markers {
            canvas.place_endpoint_marker(&marker.name, marker.position, marker.style);
        }

        Self {
            controller,
            events,
            router: EventRouter::new(),
            canvas,
            log: LogModel::new(),
            status: StatusModel::new(),
            runtime,
            title: title.into(),
            should_quit: false,
        }
    }

    /// Run the interactive loop until the user quits.
    pub fn run(mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        loop {
            for event in self.events.drain() {
                self.router.apply(&event, &mut self.canvas, &mut self.log, &mut self.status);
            }

            terminal.draw(|frame| self.render(frame))?;

            if event::poll(INPUT_POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    self.on_key(key);
                }
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('s') | KeyCode::Enter => self.start_run(),
            _ => {},
        }
    }

    /// The UI trigger: ask the controller for a run and spawn its execution
    /// flow. Rejections are shown on the status line, never retried here.
    fn start_run(&mut self) {
        match self.controller.start_run() {
            Ok(run) => {
                tracing::info!("run accepted");
                self.runtime.spawn(async move {
                    if let Err(err) = run.await {
                        tracing::error!(error = %err, "run abandoned");
                    }
                });
            },
            Err(StartError::AlreadyRunning) => {
                tracing::debug!("start ignored: run in progress");
                self.status.set_status("Run already in progress - start ignored.");
            },
            Err(err @ StartError::Validation(_)) => {
                tracing::error!(error = %err, "start rejected");
                self.log.append_line(&err.to_string(), Color::RED);
                self.status.set_status("Cannot start: script failed validation.");
            },
        }
    }

    fn render(&self, frame: &mut Frame<'_>) {
        let [main_area, status_area, help_area] = Layout::vertical([
            Constraint::Min(10),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let [canvas_area, log_area] =
            Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)])
                .areas(main_area);

        frame.render_widget(self.scene(), canvas_area);
        frame.render_widget(self.log_panel(log_area.height), log_area);
        frame.render_widget(
            Paragraph::new(format!("Status: {}", self.status.text())),
            status_area,
        );
        frame.render_widget(
            Paragraph::new("s: start replay   q: quit").dim(),
            help_area,
        );
    }

    fn scene(&self) -> impl ratatui::widgets::Widget + '_ {
        let (x0, x1, y0, y1) = self.canvas.bounds();

        Canvas::default()
            .block(Block::bordered().title(self.title.clone()))
            .x_bounds([x0, x1])
            .y_bounds([y0, y1])
            .paint(move |ctx: &mut Context<'_>| {
                // World coordinates grow downward; the canvas y-axis grows
                // upward, so flip within the current bounds.
                let flip = |y: f64| y0 + y1 - y;

                for marker in self.canvas.markers() {
                    let y = flip(marker.position.y);
                    ctx.draw(&Circle {
                        x: marker.position.x,
                        y,
                        radius: marker.style.radius,
                        color: to_tui(marker.style.color),
                    });
                    ctx.print(
                        marker.position.x,
                        y - marker.style.radius - 14.0,
                        Line::styled(marker.name.clone(), Style::new().white().bold()),
                    );
                }

                for token in self.canvas.tokens() {
                    ctx.draw(&Circle {
                        x: token.position.x,
                        y: flip(token.position.y),
                        radius: TOKEN_RADIUS,
                        color: to_tui(token.color),
                    });
                }
            })
    }

    fn log_panel(&self, height: u16) -> Paragraph<'_> {
        let capacity = usize::from(height.saturating_sub(2));
        let lines: Vec<Line<'_>> = self
            .log
            .lines()
            .iter()
            .rev()
            .take(capacity)
            .rev()
            .map(|(text, color)| {
                Line::styled(format!(">> {text}"), Style::new().fg(to_tui(*color)))
            })
            .collect();

        Paragraph::new(lines).block(Block::bordered().title("Log"))
    }
}

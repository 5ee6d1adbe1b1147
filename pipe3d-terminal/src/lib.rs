/// Terminal front-end for the pipe3d transformation pipeline
use anyhow::Context;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use log::{debug, info};
use pipe3d_core::{
    CameraCommand, CameraConfig, CameraType, DisplayType, LogSink, Mesh, Pipeline, Transform,
};
use std::io::{stdout, Write};
use std::time::{Duration, Instant};

pub mod config;
pub mod renderer;

pub use config::SceneConfig;
pub use renderer::AsciiRenderer;

const CONTROLS: &str =
    "WASD/RF=Move Arrows=Turn I/K=Pitch C=Camera P=Projection X=Wire Q=Quit";

/// What a key press asks the app to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Camera(CameraCommand),
    ToggleCamera,
    ToggleDisplay,
    ToggleWireframe,
    Quit,
}

/// Key bindings
pub fn action_for_key(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('w') | KeyCode::Up => Action::Camera(CameraCommand::MoveForward),
        KeyCode::Char('s') | KeyCode::Down => Action::Camera(CameraCommand::MoveBack),
        KeyCode::Char('a') => Action::Camera(CameraCommand::Left),
        KeyCode::Char('d') => Action::Camera(CameraCommand::Right),
        KeyCode::Char('r') => Action::Camera(CameraCommand::Up),
        KeyCode::Char('f') => Action::Camera(CameraCommand::Down),
        KeyCode::Left => Action::Camera(CameraCommand::RotateLeft),
        KeyCode::Right => Action::Camera(CameraCommand::RotateRight),
        KeyCode::Char('i') => Action::Camera(CameraCommand::PitchUp),
        KeyCode::Char('k') => Action::Camera(CameraCommand::PitchDown),
        KeyCode::Char('c') => Action::ToggleCamera,
        KeyCode::Char('p') => Action::ToggleDisplay,
        KeyCode::Char('x') => Action::ToggleWireframe,
        _ => return None,
    };
    Some(action)
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    mesh: Mesh,
    transform: Transform,
    camera: CameraConfig,
    spin_degrees: f64,
    renderer: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(mesh: Mesh, scene: SceneConfig) -> anyhow::Result<Self> {
        let (width, height) = terminal::size().context("Failed to query terminal size")?;
        Ok(Self::with_size(mesh, scene, width as usize, height as usize))
    }

    /// Build an app for a fixed canvas size without touching the terminal
    pub fn with_size(mesh: Mesh, scene: SceneConfig, width: usize, height: usize) -> Self {
        let camera = CameraConfig {
            viewport_width: width as f64,
            viewport_height: height as f64,
            ..scene.camera
        };
        Self {
            mesh,
            transform: scene.transform,
            camera,
            spin_degrees: scene.spin_degrees,
            renderer: AsciiRenderer::new(width, height),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> anyhow::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            if event::poll(Duration::from_millis(0))? {
                if let Event::Key(KeyEvent { code, .. }) = event::read()? {
                    if let Some(action) = action_for_key(code) {
                        self.apply(action);
                    }
                }
            }

            self.update();
            self.render_frame()?;
            self.present()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn apply(&mut self, action: Action) {
        debug!("Key action {:?}", action);
        match action {
            Action::Quit => self.running = false,
            Action::Camera(command) => self.transform.apply_command(command),
            Action::ToggleCamera => {
                self.transform.camera_type = match self.transform.camera_type {
                    CameraType::Orbit => CameraType::PointAt,
                    CameraType::PointAt => CameraType::Orbit,
                };
                info!("Camera switched to {:?}", self.transform.camera_type);
            }
            Action::ToggleDisplay => {
                self.transform.display_type = match self.transform.display_type {
                    DisplayType::Perspective => DisplayType::Orthographic,
                    DisplayType::Orthographic => DisplayType::Perspective,
                };
                info!("Display switched to {:?}", self.transform.display_type);
            }
            Action::ToggleWireframe => self.renderer.wireframe = !self.renderer.wireframe,
        }
    }

    fn update(&mut self) {
        // Continuous slow rotation for demo effect
        self.transform.rotation.y = (self.transform.rotation.y + self.spin_degrees) % 360.0;
    }

    /// Run the pipeline and rasterize the result into the canvas
    pub fn render_frame(&mut self) -> anyhow::Result<usize> {
        let pipeline = Pipeline::new(&self.transform, &self.camera);
        let result = if log::log_enabled!(log::Level::Trace) {
            pipeline.run_with_sink(&self.mesh.triangles, &mut LogSink)
        } else {
            pipeline.run(&self.mesh.triangles)
        };
        let screen = result.context("Pipeline failed")?;

        self.renderer.clear();
        self.renderer.render_triangles(&screen);
        Ok(screen.len())
    }

    fn present(&self) -> anyhow::Result<()> {
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "pipe3d | FPS: {:.1} | {:?}/{:?} | {}",
                self.fps, self.transform.camera_type, self.transform.display_type, CONTROLS
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

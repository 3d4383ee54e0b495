/// Terminal-based free-camera mesh viewer
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags, MouseEvent,
        MouseEventKind, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use fly3d_core::{
    CameraSettings, FrameUniforms, FreeCamera, Mesh, MouseButton, Movement, Projection,
    ProjectionSettings, Transform, VertexBuffer,
};
use log::{debug, info};
use nalgebra::{Matrix4, Point3, Vector3};
use std::io::{stdout, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Command-line options for the viewer
#[derive(Debug, Parser)]
#[command(name = "fly3d", version, about = "Fly through an OFF mesh in the terminal")]
pub struct Cli {
    /// OFF file to load; a cube is shown when omitted
    pub path: Option<PathBuf>,

    /// Initial vertical field of view in degrees
    #[arg(long, default_value_t = ProjectionSettings::default().fovy)]
    pub fov: f32,

    /// Distance moved per frame while a movement key is held
    #[arg(long, default_value_t = CameraSettings::default().speed)]
    pub speed: f32,

    /// Degrees turned per terminal cell of mouse drag
    #[arg(long, default_value_t = 1.5)]
    pub sensitivity: f32,

    /// Target frames per second
    #[arg(long, default_value_t = 30)]
    pub fps: u32,
}

impl Cli {
    pub fn camera_settings(&self) -> CameraSettings {
        CameraSettings::default()
            .with_speed(self.speed)
            .with_sensitivity(self.sensitivity)
    }

    pub fn projection_settings(&self) -> ProjectionSettings {
        ProjectionSettings::default().with_fovy(self.fov)
    }

    /// The mesh to show: the file given on the command line, or a cube.
    pub fn load_mesh(&self) -> Result<Mesh> {
        match &self.path {
            Some(path) => fly3d_core::load_off(path)
                .with_context(|| format!("failed to load mesh from {}", path.display())),
            None => Ok(Mesh::cube(2.0)),
        }
    }
}

/// Map a key to the movement it drives.
pub fn movement_for(code: KeyCode) -> Option<Movement> {
    match code {
        KeyCode::Char('w') | KeyCode::Up => Some(Movement::Forward),
        KeyCode::Char('s') | KeyCode::Down => Some(Movement::Backward),
        KeyCode::Char('a') | KeyCode::Left => Some(Movement::Left),
        KeyCode::Char('d') | KeyCode::Right => Some(Movement::Right),
        KeyCode::Char(' ') => Some(Movement::Up),
        _ => None,
    }
}

fn mouse_button(button: event::MouseButton) -> MouseButton {
    match button {
        event::MouseButton::Left => MouseButton::Left,
        event::MouseButton::Right => MouseButton::Right,
        event::MouseButton::Middle => MouseButton::Middle,
    }
}

// Terminal cells are about twice as tall as they are wide
fn viewport(width: u16, height: u16) -> (u32, u32) {
    (width as u32, height as u32 * 2)
}

/// Main application struct for the terminal viewer
pub struct TerminalApp {
    mesh: Mesh,
    buffer: VertexBuffer,
    model: Matrix4<f32>,
    camera: FreeCamera,
    projection: Projection,
    uniforms: FrameUniforms,
    renderer: AsciiRenderer,
    running: bool,
    /// Terminal reports key releases; otherwise a press lasts one frame
    release_events: bool,
    frame_time: Duration,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// Build the vertex buffer and view state for `mesh`. Fails if the mesh
    /// cannot be turned into a buffer.
    pub fn new(mesh: Mesh, cli: &Cli) -> Result<Self> {
        let (width, height) = terminal::size()?;
        Self::with_size(mesh, cli, width, height)
    }

    pub fn with_size(mesh: Mesh, cli: &Cli, width: u16, height: u16) -> Result<Self> {
        let buffer = mesh
            .vertex_buffer()
            .context("failed to build vertex buffer")?;
        info!(
            "vertex buffer: {} vertices, stride {} bytes, {} attributes",
            buffer.vertex_count(),
            buffer.stride_bytes(),
            buffer.attribute_count()
        );

        let (view_w, view_h) = viewport(width, height);
        let camera = FreeCamera::new(
            Point3::new(0.0, 0.0, 3.0),
            -Vector3::z(),
            Vector3::y(),
            cli.camera_settings(),
        );

        Ok(Self {
            model: Transform::fit_to_unit_cube(&mesh.positions),
            mesh,
            buffer,
            camera,
            projection: Projection::from_settings(&cli.projection_settings(), view_w, view_h),
            uniforms: FrameUniforms::default(),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            release_events: false,
            frame_time: Duration::from_millis(1000 / u64::from(cli.fps.max(1))),
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn camera(&self) -> &FreeCamera {
        &self.camera
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn uniforms(&self) -> &FrameUniforms {
        &self.uniforms
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.release_events = terminal::supports_keyboard_enhancement().unwrap_or(false);
        let mut out = stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture,
            EnableFocusChange
        )?;
        if self.release_events {
            execute!(
                out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        debug!("key release events: {}", self.release_events);

        let result = self.main_loop();

        // Cleanup
        if self.release_events {
            execute!(out, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            out,
            DisableFocusChange,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> Result<()> {
        while self.running {
            let frame_start = Instant::now();

            // Input callbacks run before the frame's update
            while event::poll(Duration::ZERO)? {
                self.handle_event(event::read()?);
            }

            self.update();
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                std::thread::sleep(self.frame_time - elapsed);
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

    /// Apply one input event to the camera or projection.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => {
                let (view_w, view_h) = viewport(width, height);
                self.projection.resize(view_w, view_h);
                self.renderer.resize(width as usize, height as usize);
            }
            Event::FocusLost => self.camera.release_all(),
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, kind, .. }: KeyEvent) {
        if matches!(code, KeyCode::Char('q') | KeyCode::Esc) && kind == KeyEventKind::Press {
            self.running = false;
            return;
        }

        if let Some(movement) = movement_for(code) {
            match kind {
                KeyEventKind::Press | KeyEventKind::Repeat => self.camera.key_pressed(movement),
                KeyEventKind::Release => self.camera.key_released(movement),
            }
        }
    }

    fn handle_mouse(&mut self, MouseEvent { kind, column, row, .. }: MouseEvent) {
        let (x, y) = (f64::from(column), f64::from(row));
        match kind {
            MouseEventKind::Down(button) => {
                self.camera.cursor_moved(x, y);
                self.camera.mouse_pressed(mouse_button(button));
            }
            MouseEventKind::Up(button) => self.camera.mouse_released(mouse_button(button)),
            MouseEventKind::Drag(_) | MouseEventKind::Moved => self.camera.cursor_moved(x, y),
            MouseEventKind::ScrollUp => self.projection.scroll(1.0),
            MouseEventKind::ScrollDown => self.projection.scroll(-1.0),
            _ => {}
        }
    }

    /// Per-frame update: held-key movement, then publish both matrices.
    pub fn update(&mut self) {
        self.camera.update();
        if !self.release_events {
            self.camera.release_all();
        }
        self.camera.reset(&mut self.uniforms);
        self.projection.reset(&mut self.uniforms);
    }

    fn render(&mut self) -> Result<()> {
        let mvp = Transform::mvp_matrix(&self.model, &self.uniforms.view, &self.uniforms.projection);

        self.renderer.clear();
        self.renderer
            .render_mesh(&self.buffer, &self.mesh.faces, &mvp, &-self.camera.front());

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let position = self.camera.position();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Fly3D | FPS: {:.1} | fov {:.0} | pos ({:.2}, {:.2}, {:.2}) | Drag=Look WASD=Move Space=Up Wheel=Zoom Q=Quit",
                self.fps,
                self.projection.fovy(),
                position.x,
                position.y,
                position.z
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseButton as TermButton};

    fn app() -> TerminalApp {
        let cli = Cli::parse_from(["fly3d"]);
        TerminalApp::with_size(Mesh::cube(2.0), &cli, 80, 24).unwrap()
    }

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["fly3d", "--fov", "60"]);
        assert_eq!(cli.projection_settings().fovy, 60.0);
        assert_eq!(cli.camera_settings().speed, 0.05);
        assert!(cli.path.is_none());
    }

    #[test]
    fn test_press_moves_for_one_frame_without_release_events() {
        let mut app = app();
        let start = app.camera().position();
        app.handle_event(key(KeyCode::Char('w'), KeyEventKind::Press));
        app.update();
        let moved = app.camera().position();
        assert!(moved.z < start.z);

        app.update();
        assert_eq!(app.camera().position(), moved);
    }

    #[test]
    fn test_held_key_with_release_events() {
        let mut app = app();
        app.release_events = true;
        app.handle_event(key(KeyCode::Char('d'), KeyEventKind::Press));
        app.update();
        app.update();
        assert!((app.camera().position().x - 0.1).abs() < 1e-5);

        app.handle_event(key(KeyCode::Char('d'), KeyEventKind::Release));
        app.update();
        assert!((app.camera().position().x - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_drag_and_scroll() {
        let mut app = app();
        app.handle_event(mouse(MouseEventKind::Down(TermButton::Left), 10, 10));
        app.handle_event(mouse(MouseEventKind::Drag(TermButton::Left), 20, 10));
        assert!((app.camera().yaw() - (-90.0 + 15.0)).abs() < 1e-4);

        app.handle_event(mouse(MouseEventKind::Up(TermButton::Left), 20, 10));
        app.handle_event(mouse(MouseEventKind::Moved, 40, 10));
        assert!((app.camera().yaw() + 75.0).abs() < 1e-4);

        app.handle_event(mouse(MouseEventKind::ScrollUp, 0, 0));
        assert_eq!(app.projection().fovy(), 44.0);
    }

    #[test]
    fn test_update_publishes_uniforms() {
        let mut app = app();
        app.update();
        assert_eq!(app.uniforms().view, *app.camera().view_matrix());
        assert_eq!(app.uniforms().projection, *app.projection().matrix());
    }

    #[test]
    fn test_quit_key() {
        let mut app = app();
        app.handle_event(key(KeyCode::Char('q'), KeyEventKind::Press));
        assert!(!app.is_running());
    }

    #[test]
    fn test_movement_keys() {
        assert_eq!(movement_for(KeyCode::Char(' ')), Some(Movement::Up));
        assert_eq!(movement_for(KeyCode::Left), Some(Movement::Left));
        assert_eq!(movement_for(KeyCode::Char('x')), None);
    }
}

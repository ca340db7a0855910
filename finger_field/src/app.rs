//! Top-level application state machine.
//!
//! `Session` owns the `FrameDriver`, the camera once attached, and the
//! startup progress.  Startup runs in two background stages, camera then
//! detector, both polled once per frame:
//!
//! ```text
//! AwaitingCamera ──ok──► AwaitingDetector ──ok──► Running
//!       │                      │ err / timeout
//!       └─err──► AppError::Camera    └──────────► Degraded
//! ```
//!
//! Rendering never waits for either stage.  A camera failure ends the
//! session; a detector failure keeps the window up with a warning.

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use particle_field::{ControlPointTracker, FieldParams, ParticleField, TrackerParams, Vec3};

use crate::camera::CameraSource;
use crate::detector::HandDetector;
use crate::driver::{DriverState, FrameDriver};
use crate::error::{AppError, DetectorError};
use crate::startup::{spawn_loader, LoadState, Loader};
use crate::visualizer::{Overlay, Visualizer};

#[cfg(not(feature = "leap"))]
use crate::camera::{PointerCamera, PointerFrame};
#[cfg(not(feature = "leap"))]
use crate::detector::SimulatedDetector;
#[cfg(feature = "leap")]
use crate::camera::{LeapCamera, LeapFrame};
#[cfg(feature = "leap")]
use crate::detector::LeapDetector;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub particle_count: usize,
    /// Particles start uniformly inside `[-half_extent, half_extent)³`.
    pub half_extent:    f32,
    /// Field seed; drawn at random (and logged) when `None`.
    pub seed:           Option<u64>,
    pub field:          FieldParams,
    pub tracker:        TrackerParams,
    /// Simulated camera frame rate.
    pub capture_fps:    f64,
    /// Simulated detector load time.
    pub model_delay_ms: u64,
    /// Uniform landmark noise of the simulated detector (normalized units).
    pub sim_jitter:     f32,
    /// Give up on the detector after this long and show a warning.
    pub detector_timeout: Duration,
    pub window_width:   usize,
    pub window_height:  usize,
    pub target_fps:     usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            particle_count:   5000,
            half_extent:      10.0,
            seed:             None,
            field:            FieldParams::default(),
            tracker:          TrackerParams::default(),
            capture_fps:      30.0,
            model_delay_ms:   600,
            sim_jitter:       0.002,
            detector_timeout: Duration::from_secs(30),
            window_width:     1024,
            window_height:    640,
            target_fps:       60,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Startup
// ════════════════════════════════════════════════════════════════════════════

type DetectorFactory<F> =
    Box<dyn FnOnce() -> Result<Box<dyn HandDetector<F>>, DetectorError> + Send>;

enum Startup<C, F> {
    AwaitingCamera(Loader<C>),
    AwaitingDetector(Loader<Box<dyn HandDetector<F>>>),
    Running,
    /// Detector failed or timed out; rendering continues without simulation.
    Degraded(String),
}

// ════════════════════════════════════════════════════════════════════════════
// Session
// ════════════════════════════════════════════════════════════════════════════

pub struct Session<C: CameraSource> {
    driver:           FrameDriver<C::Frame>,
    camera:           Option<C>,
    startup:          Startup<C, C::Frame>,
    detector_factory: Option<DetectorFactory<C::Frame>>,
    detector_timeout: Duration,
}

impl<C> Session<C>
where
    C: CameraSource + Send + 'static,
    C::Frame: 'static,
{
    pub fn new(
        driver:           FrameDriver<C::Frame>,
        camera:           Loader<C>,
        detector_factory: DetectorFactory<C::Frame>,
        detector_timeout: Duration,
    ) -> Self {
        Session {
            driver,
            camera:           None,
            startup:          Startup::AwaitingCamera(camera),
            detector_factory: Some(detector_factory),
            detector_timeout,
        }
    }

    /// Advance startup.  Only a camera failure is an error.
    pub fn poll_startup(&mut self) -> Result<(), AppError> {
        match &mut self.startup {
            Startup::AwaitingCamera(loader) => match loader.poll() {
                LoadState::Pending => {}
                LoadState::Ready(camera) => {
                    self.camera = Some(camera);
                    // The detector is only loaded once the camera works.
                    let factory = self.detector_factory.take();
                    self.startup = Startup::AwaitingDetector(spawn_loader("detector", move || {
                        match factory {
                            Some(f) => f(),
                            None    => Err(DetectorError::Init("detector already loaded".into())),
                        }
                    }));
                }
                LoadState::Failed(e) => {
                    log::error!("camera: {}", e);
                    return Err(AppError::Camera(e));
                }
            },
            Startup::AwaitingDetector(loader) => {
                let elapsed = loader.elapsed();
                match loader.poll() {
                    LoadState::Ready(detector) => {
                        self.driver.attach_detector(detector);
                        self.startup = Startup::Running;
                    }
                    LoadState::Failed(e) => self.degrade(e),
                    LoadState::Pending if elapsed > self.detector_timeout => {
                        self.degrade(format!(
                            "not ready after {} s", self.detector_timeout.as_secs()
                        ));
                    }
                    LoadState::Pending => {}
                }
            }
            Startup::Running | Startup::Degraded(_) => {}
        }
        Ok(())
    }

    fn degrade(&mut self, reason: String) {
        log::error!("hand detector unavailable: {} (field will stay frozen)", reason);
        self.startup = Startup::Degraded(reason);
    }

    /// Run one frame of the driver.
    pub fn tick(&mut self) -> DriverState {
        self.driver.tick(self.camera.as_ref())
    }

    pub fn driver(&self)           -> &FrameDriver<C::Frame> { &self.driver }
    pub fn camera_mut(&mut self)   -> Option<&mut C>         { self.camera.as_mut() }
    pub fn is_degraded(&self)      -> bool { matches!(self.startup, Startup::Degraded(_)) }
    pub fn is_running(&self)       -> bool { matches!(self.startup, Startup::Running) }

    /// One-line status for the bottom bar.
    pub fn status_line(&self, fps: f32) -> String {
        match &self.startup {
            Startup::AwaitingCamera(_) => "waiting for camera...".to_string(),
            Startup::AwaitingDetector(l) => {
                format!("loading hand detector... {:.1} s", l.elapsed().as_secs_f32())
            }
            Startup::Degraded(reason) => format!("hand detector unavailable: {}", reason),
            Startup::Running => match self.driver.state() {
                DriverState::Idle => "waiting for camera frames...".to_string(),
                DriverState::Active => {
                    let s = self.driver.stats();
                    let c = self.driver.control_point();
                    format!(
                        "fps {:.0} | det {} hit {} dup {} | ctrl ({:.1}, {:.1})",
                        fps, s.detections, s.hands_found, s.duplicate_frames, c.x, c.y
                    )
                }
            },
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Frame-rate meter
// ════════════════════════════════════════════════════════════════════════════

/// Frames per second, refreshed once a second.
struct FpsMeter {
    window_start: Instant,
    frames:       u32,
    fps:          f32,
}

impl FpsMeter {
    fn new() -> Self { FpsMeter { window_start: Instant::now(), frames: 0, fps: 0.0 } }

    fn frame(&mut self) -> f32 {
        self.frames += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed >= Duration::from_secs(1) {
            self.fps = self.frames as f32 / elapsed.as_secs_f32();
            self.frames = 0;
            self.window_start = Instant::now();
        }
        self.fps
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Camera / detector wiring per feature
// ════════════════════════════════════════════════════════════════════════════

#[cfg(not(feature = "leap"))]
type Camera = PointerCamera;
#[cfg(not(feature = "leap"))]
type Frame = PointerFrame;

#[cfg(feature = "leap")]
type Camera = LeapCamera;
#[cfg(feature = "leap")]
type Frame = LeapFrame;

#[cfg(not(feature = "leap"))]
fn start_camera(cfg: &AppConfig) -> Loader<Camera> {
    let fps = cfg.capture_fps;
    spawn_loader("camera", move || Ok::<_, String>(PointerCamera::new(fps)))
}

#[cfg(feature = "leap")]
fn start_camera(_cfg: &AppConfig) -> Loader<Camera> {
    spawn_loader("camera", LeapCamera::open)
}

#[cfg(not(feature = "leap"))]
fn detector_factory(cfg: &AppConfig, seed: u64) -> DetectorFactory<Frame> {
    let delay  = Duration::from_millis(cfg.model_delay_ms);
    let jitter = cfg.sim_jitter;
    Box::new(move || {
        let d = SimulatedDetector::load(delay, jitter, seed)?;
        Ok(Box::new(d) as Box<dyn HandDetector<Frame>>)
    })
}

#[cfg(feature = "leap")]
fn detector_factory(_cfg: &AppConfig, _seed: u64) -> DetectorFactory<Frame> {
    Box::new(|| Ok(Box::new(LeapDetector::default()) as Box<dyn HandDetector<Frame>>))
}

/// Feed the camera whatever it needs this frame.
#[cfg(not(feature = "leap"))]
fn refresh_camera(camera: &mut Camera, vis: &Visualizer, epoch: Instant) {
    camera.capture(vis.pointer(), epoch.elapsed().as_secs_f64() * 1000.0);
}

#[cfg(feature = "leap")]
fn refresh_camera(camera: &mut Camera, _vis: &Visualizer, _epoch: Instant) {
    camera.pump();
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Opens the window, starts the camera and detector loaders, and drives
/// the poll/tick/render loop at the display rate until the window closes.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    let seed = cfg.seed.unwrap_or_else(rand::random);
    log::info!("field seed {} ({} particles)", seed, cfg.particle_count);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let field   = ParticleField::new(cfg.particle_count, cfg.half_extent, cfg.field, &mut rng);
    let tracker = ControlPointTracker::new(Vec3::ZERO, cfg.tracker);

    let mut vis = Visualizer::new(cfg.window_width, cfg.window_height, cfg.target_fps)?;

    let mut session: Session<Camera> = Session::new(
        FrameDriver::new(field, tracker),
        start_camera(&cfg),
        detector_factory(&cfg, seed),
        cfg.detector_timeout,
    );

    let epoch   = Instant::now();
    let mut fps = FpsMeter::new();

    while vis.is_open() {
        // 1. Window input
        if !vis.poll_input() { break; }

        // 2. Background startup
        session.poll_startup()?;

        // 3. Camera frame
        if let Some(camera) = session.camera_mut() {
            refresh_camera(camera, &vis, epoch);
        }

        // 4. Simulation
        let state = session.tick();

        // 5. Render
        let status = session.status_line(fps.frame());
        let overlay = Overlay {
            control: session.driver().control_point(),
            hand:    session.driver().last_hand(),
            status:  &status,
            warning: session.is_degraded(),
            active:  state == DriverState::Active,
        };
        vis.render(session.driver().field(), &overlay)?;
    }

    log::info!("window closed after {} frames", session.driver().stats().ticks);
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

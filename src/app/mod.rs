// SPDX-License-Identifier: GPL-3.0-only

//! Top-level application controller
//!
//! One consolidated screen controller owning the capture session, both
//! parameter controllers, the camera/gallery mode and the per-button
//! affordance state. UI events arrive as [`Message`] values over a single
//! channel and are dispatched synchronously; the bus watch, the hardware
//! button thread and the SIGINT handler only ever post into that channel.

use crate::config::{Config, ExitAction};
use crate::controls::{ExposureController, ResolutionController};
use crate::errors::{AppError, AppResult};
use crate::hardware::MemoryBudget;
use crate::pipeline::metadata::WhiteBalanceMode;
use crate::pipeline::session::CaptureSession;
use crate::storage;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use tracing::{error, info, warn};

/// What the main screen is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    /// Live preview with capture controls
    #[default]
    PhotoCamera,
    /// Browsing captured photos
    PhotoGallery,
}

/// Optional features enabled for this session
#[derive(Debug, Clone, Copy)]
pub struct FeatureSet {
    /// Monitor the hardware shutter button
    pub hardware_button: bool,
    /// Extend the overlay with frame size and pipeline state
    pub debug_overlay: bool,
    /// Enable the gallery mode and delete control
    pub gallery: bool,
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self {
            hardware_button: true,
            debug_overlay: false,
            gallery: true,
        }
    }
}

/// Enabled state of every control on the screen
///
/// Saturation and lifecycle rules surface here as disabled buttons, never
/// as errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlState {
    /// Shutter button
    pub shutter: bool,
    /// Longer exposure
    pub exposure_up: bool,
    /// Shorter exposure / automatic
    pub exposure_down: bool,
    /// Higher gain
    pub iso_up: bool,
    /// Lower gain / automatic
    pub iso_down: bool,
    /// Larger frame
    pub resolution_up: bool,
    /// Smaller frame
    pub resolution_down: bool,
    /// Enter the gallery
    pub gallery: bool,
    /// Delete the shown photo
    pub delete: bool,
}

/// A UI or bus event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Shutter button pressed (touch or hardware)
    ShutterPressed,
    /// Longer exposure requested
    ExposureUp,
    /// Shorter exposure requested
    ExposureDown,
    /// Higher gain requested
    IsoUp,
    /// Lower gain requested
    IsoDown,
    /// Larger frame requested
    ResolutionUp,
    /// Smaller frame requested
    ResolutionDown,
    /// Set the white balance mode
    SetWhiteBalance(WhiteBalanceMode),
    /// Set the contrast
    SetContrast(i32),
    /// Set the saturation
    SetSaturation(i32),
    /// Set the sharpness
    SetSharpness(i32),
    /// Switch between camera and gallery
    ToggleMode,
    /// Show the next gallery photo
    GalleryNext,
    /// Show the previous gallery photo
    GalleryPrevious,
    /// Delete the shown gallery photo
    DeletePhoto,
    /// The pipeline finished writing the temporary capture file
    FileWritten(PathBuf),
    /// Leave the event loop
    Quit,
}

/// The application controller
pub struct App {
    config: Config,
    session: CaptureSession,
    exposure: ExposureController,
    resolution: ResolutionController,
    mode: CameraMode,
    features: FeatureSet,
    controls: ControlState,
    gallery: Vec<PathBuf>,
    gallery_index: usize,
    running: bool,
}

impl App {
    /// Assemble the controller around a configured session
    pub fn new(
        config: Config,
        session: CaptureSession,
        budget: MemoryBudget,
        features: FeatureSet,
    ) -> Self {
        let exposure = ExposureController::new(&session);
        let resolution = ResolutionController::new(budget);
        let gallery = storage::scan_gallery(session.media_dir());

        let mut app = Self {
            config,
            session,
            exposure,
            resolution,
            mode: CameraMode::PhotoCamera,
            features,
            controls: ControlState::default(),
            gallery,
            gallery_index: 0,
            running: true,
        };
        app.refresh_controls();
        app
    }

    /// Current screen mode
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Current per-button enabled state
    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    /// The capture session
    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    /// The exposure controller
    pub fn exposure(&self) -> &ExposureController {
        &self.exposure
    }

    /// Number of photos in the gallery
    pub fn gallery_len(&self) -> usize {
        self.gallery.len()
    }

    /// Path of the photo the gallery is showing
    pub fn current_photo(&self) -> Option<&PathBuf> {
        self.gallery.get(self.gallery_index)
    }

    /// Start the live preview and draw the initial overlay
    pub fn start(&mut self) -> AppResult<()> {
        self.session.start()?;
        self.push_overlay();
        self.refresh_controls();
        Ok(())
    }

    /// Dispatch one event
    pub fn update(&mut self, message: Message) -> AppResult<()> {
        match message {
            Message::ShutterPressed => self.handle_shutter()?,
            Message::ExposureUp => {
                if self.exposure.increase_shutter_speed(&mut self.session)?.is_some() {
                    self.push_overlay();
                }
            }
            Message::ExposureDown => {
                if self.exposure.decrease_shutter_speed(&mut self.session)?.is_some() {
                    self.push_overlay();
                }
            }
            Message::IsoUp => {
                if self.exposure.increase_iso(&mut self.session).is_some() {
                    self.push_overlay();
                }
            }
            Message::IsoDown => {
                if self.exposure.decrease_iso(&mut self.session).is_some() {
                    self.push_overlay();
                }
            }
            Message::ResolutionUp => {
                let overlay = self.overlay_text();
                let _ = self.resolution.increase(&mut self.session, &overlay)?;
            }
            Message::ResolutionDown => {
                let overlay = self.overlay_text();
                let _ = self.resolution.decrease(&mut self.session, &overlay)?;
            }
            Message::SetWhiteBalance(mode) => self.session.set_awb_mode(mode),
            Message::SetContrast(value) => self.session.set_contrast(value),
            Message::SetSaturation(value) => self.session.set_saturation(value),
            Message::SetSharpness(value) => self.session.set_sharpness(value),
            Message::ToggleMode => self.toggle_mode(),
            Message::GalleryNext => self.gallery_step(1),
            Message::GalleryPrevious => self.gallery_step(-1),
            Message::DeletePhoto => self.delete_current_photo(),
            Message::FileWritten(path) => self.handle_file_written(&path),
            Message::Quit => self.running = false,
        }

        self.refresh_controls();
        Ok(())
    }

    /// Run the event loop until a quit message or channel close
    pub fn run(&mut self, rx: Receiver<Message>) -> AppResult<()> {
        self.start()?;

        while self.running {
            match rx.recv() {
                Ok(message) => {
                    if let Err(e) = self.update(message) {
                        error!(error = %e, "Event handling failed");
                    }
                }
                Err(_) => break,
            }
        }

        self.shutdown()
    }

    /// The shutter button has one handler dispatching on the mode
    fn handle_shutter(&mut self) -> AppResult<()> {
        match self.mode {
            CameraMode::PhotoCamera => match self.session.trigger_capture() {
                Ok(()) => Ok(()),
                // Guarded by the affordance; a hardware button press can
                // still race the file copy
                Err(AppError::Capture(e)) => {
                    warn!(error = %e, "Shutter press ignored");
                    Ok(())
                }
                Err(e) => Err(e),
            },
            CameraMode::PhotoGallery => {
                self.gallery_step(1);
                Ok(())
            }
        }
    }

    fn handle_file_written(&mut self, path: &PathBuf) {
        match self.session.finish_capture(path) {
            Ok(dest) => {
                self.gallery.push(dest);
                // The shutter re-enables via refresh_controls; redraw the
                // info overlay alongside
                self.push_overlay();
            }
            Err(e) => warn!(error = %e, "Capture completion failed"),
        }
    }

    fn toggle_mode(&mut self) {
        match self.mode {
            CameraMode::PhotoCamera => {
                if self.features.gallery && !self.gallery.is_empty() {
                    self.gallery_index = self.gallery.len() - 1;
                    self.mode = CameraMode::PhotoGallery;
                    info!("Entered gallery");
                }
            }
            CameraMode::PhotoGallery => {
                self.mode = CameraMode::PhotoCamera;
                info!("Back to camera");
            }
        }
    }

    fn gallery_step(&mut self, delta: isize) {
        if self.mode != CameraMode::PhotoGallery || self.gallery.is_empty() {
            return;
        }
        let len = self.gallery.len() as isize;
        let index = (self.gallery_index as isize + delta).rem_euclid(len);
        self.gallery_index = index as usize;
    }

    fn delete_current_photo(&mut self) {
        if self.mode != CameraMode::PhotoGallery || !self.features.gallery {
            return;
        }
        let Some(path) = self.gallery.get(self.gallery_index).cloned() else {
            return;
        };

        match storage::delete_photo(&path) {
            Ok(()) => {
                self.gallery.remove(self.gallery_index);
                if self.gallery_index >= self.gallery.len() && self.gallery_index > 0 {
                    self.gallery_index -= 1;
                }
                info!(path = %path.display(), "Photo deleted");
                if self.gallery.is_empty() {
                    self.mode = CameraMode::PhotoCamera;
                }
            }
            Err(e) => warn!(error = %e, "Delete failed"),
        }
    }

    /// The info overlay shows the exposure state; debug builds add the
    /// frame size
    fn overlay_text(&self) -> String {
        let mut text = format!(
            "{} {}",
            self.exposure.shutter_label(),
            self.exposure.iso_label()
        );
        if self.features.debug_overlay {
            let (width, height) = self.session.caps();
            text.push_str(&format!(" {}x{} {:?}", width, height, self.session.state()));
        }
        text
    }

    fn push_overlay(&mut self) {
        let text = self.overlay_text();
        self.session.set_annotation_text(&text);
    }

    fn refresh_controls(&mut self) {
        let in_gallery = self.mode == CameraMode::PhotoGallery;
        self.controls = ControlState {
            shutter: match self.mode {
                CameraMode::PhotoCamera => {
                    self.session.is_playing() && !self.session.capture_in_flight()
                }
                CameraMode::PhotoGallery => !self.gallery.is_empty(),
            },
            exposure_up: !in_gallery && self.exposure.can_increase_shutter(&self.session),
            exposure_down: !in_gallery && self.exposure.can_decrease_shutter(&self.session),
            iso_up: !in_gallery && self.exposure.can_increase_iso(&self.session),
            iso_down: !in_gallery && self.exposure.can_decrease_iso(&self.session),
            resolution_up: !in_gallery && self.resolution.can_increase(&self.session),
            resolution_down: !in_gallery && self.resolution.can_decrease(&self.session),
            gallery: self.features.gallery && !self.gallery.is_empty(),
            delete: self.features.gallery && in_gallery && !self.gallery.is_empty(),
        };
    }

    /// Persist the session state, halt the pipeline and apply the exit
    /// action
    fn shutdown(&mut self) -> AppResult<()> {
        info!("Shutting down");

        let (width, height) = self.session.caps();
        self.config.width = width;
        self.config.height = height;
        self.config.shutter_speed = self.session.shutter_speed();
        self.config.iso = self.session.analog_gain();
        self.config.contrast = self.session.contrast();
        self.config.white_balance = self.session.awb_mode();
        self.config.saturation = self.session.saturation();
        self.config.sharpness = self.session.sharpness();
        self.config.annotation_mode = self.session.annotation_mode();
        self.config.annotation_text_size =
            height / crate::constants::annotation::TEXT_SIZE_DIVISOR;

        if let Err(e) = self.config.save() {
            warn!(error = %e, "Could not save config");
        }
        if let Err(e) = self.session.stop() {
            warn!(error = %e, "Pipeline did not stop cleanly");
        }

        match self.config.exit_action {
            ExitAction::Exit => {}
            ExitAction::Shutdown => run_systemctl("poweroff"),
            ExitAction::Reboot => run_systemctl("reboot"),
        }

        Ok(())
    }
}

fn run_systemctl(verb: &str) {
    info!(verb, "Applying exit action");
    if let Err(e) = std::process::Command::new("systemctl").arg(verb).status() {
        warn!(error = %e, verb, "Exit action failed");
    }
}

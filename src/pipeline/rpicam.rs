// SPDX-License-Identifier: GPL-3.0-only

//! GStreamer pipeline driving the Pi camera module
//!
//! Preview and capture share one source through a tee: the preview branch
//! scales into the touchscreen sink, the capture branch sits behind a
//! closed valve and ends in a JPEG encoder, a tag stage and a file sink
//! that always overwrites the same temporary file and posts a bus message
//! per written file.

use super::metadata::WhiteBalanceMode;
use super::{EventCallback, PipelineBackend, PipelineEvent};
use crate::config::Config;
use crate::constants::display;
use crate::errors::{AppResult, PipelineError};
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_video as gst_video;
use gstreamer_video::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Returns the native surface handle the preview should render into
pub type WindowHandleProvider = Box<dyn Fn() -> Option<usize> + Send + Sync>;

/// The live camera pipeline
pub struct RpicamPipeline {
    pipeline: gst::Pipeline,
    source: gst::Element,
    capsfilter: gst::Element,
    valve: gst::Element,
    taginject: gst::Element,
    width: u32,
    height: u32,
    awb_mode: WhiteBalanceMode,
    annotation_mode: u32,
}

fn make_element(factory: &str, name: &str) -> AppResult<gst::Element> {
    gst::ElementFactory::make(factory)
        .name(name)
        .build()
        .map_err(|_| PipelineError::MissingElement(factory.to_string()).into())
}

fn link(src: &gst::Element, dest: &gst::Element) -> AppResult<()> {
    src.link(dest).map_err(|_| {
        PipelineError::LinkFailed(format!("{} -> {}", src.name(), dest.name())).into()
    })
}

fn frame_caps(width: u32, height: u32) -> gst::Caps {
    gst::Caps::builder("video/x-raw")
        .field("width", width as i32)
        .field("height", height as i32)
        .field("framerate", gst::Fraction::new(0, 1))
        .build()
}

impl RpicamPipeline {
    /// Build the pipeline with the configured sensor state
    ///
    /// # Arguments
    /// * `config` - Initial property values for the source
    /// * `temp_path` - The always-overwritten temporary capture file
    /// * `events` - Callback invoked for every file-written notification
    /// * `window_handle` - Optional provider of the preview surface handle
    pub fn new(
        config: &Config,
        temp_path: &Path,
        events: EventCallback,
        window_handle: Option<WindowHandleProvider>,
    ) -> AppResult<Self> {
        gst::init().map_err(|e| PipelineError::InitializationFailed(e.to_string()))?;

        info!(
            width = config.width,
            height = config.height,
            shutter = config.shutter_speed,
            gain = config.iso,
            "Building camera pipeline"
        );

        let pipeline = gst::Pipeline::new();

        let source = gst::ElementFactory::make("rpicamsrc")
            .name("source")
            .property("shutter-speed", config.shutter_speed as i32)
            .property("analog-gain", config.iso as i32)
            .property("contrast", config.contrast)
            .property("saturation", config.saturation)
            .property("sharpness", config.sharpness)
            .build()
            .map_err(|_| PipelineError::MissingElement("rpicamsrc".to_string()))?;
        source.set_property_from_str("awb-mode", config.white_balance.property_nick());
        source.set_property_from_str("annotation-mode", &config.annotation_mode.to_string());
        source.set_property("annotation-text-size", config.annotation_text_size as i32);

        let capsfilter = make_element("capsfilter", "filter")?;
        capsfilter.set_property("caps", frame_caps(config.width, config.height));

        let tee = make_element("tee", "split")?;

        // Preview branch: scale into the touchscreen sink
        let preview_queue = make_element("queue", "preview-queue")?;
        let preview_convert = make_element("videoconvert", "preview-convert")?;
        let preview_scale = make_element("videoscale", "preview-scale")?;
        let display_filter = make_element("capsfilter", "display-filter")?;
        display_filter.set_property(
            "caps",
            gst::Caps::builder("video/x-raw")
                .field("width", display::PREVIEW_WIDTH as i32)
                .field("height", display::PREVIEW_HEIGHT as i32)
                .build(),
        );
        let sink = make_element("autovideosink", "preview-sink")?;
        sink.set_property("sync", false);

        // Capture branch: valve-gated JPEG encode into the temp file
        let capture_queue = make_element("queue", "capture-queue")?;
        let valve = make_element("valve", "capture-valve")?;
        valve.set_property("drop", true);
        let capture_convert = make_element("videoconvert", "capture-convert")?;
        let encoder = make_element("jpegenc", "encoder")?;
        let taginject = make_element("taginject", "tags")?;
        let filesink = make_element("multifilesink", "filesink")?;
        filesink.set_property("location", temp_path.to_string_lossy().as_ref());
        filesink.set_property("post-messages", true);

        let elements: Vec<&gst::Element> = vec![
            &source,
            &capsfilter,
            &tee,
            &preview_queue,
            &preview_convert,
            &preview_scale,
            &display_filter,
            &sink,
            &capture_queue,
            &valve,
            &capture_convert,
            &encoder,
            &taginject,
            &filesink,
        ];
        pipeline
            .add_many(&elements)
            .map_err(|e| PipelineError::InitializationFailed(e.to_string()))?;

        link(&source, &capsfilter)?;
        link(&capsfilter, &tee)?;

        link(&tee, &preview_queue)?;
        link(&preview_queue, &preview_convert)?;
        link(&preview_convert, &preview_scale)?;
        link(&preview_scale, &display_filter)?;
        link(&display_filter, &sink)?;

        link(&tee, &capture_queue)?;
        link(&capture_queue, &valve)?;
        link(&valve, &capture_convert)?;
        link(&capture_convert, &encoder)?;
        link(&encoder, &taginject)?;
        link(&taginject, &filesink)?;

        Self::install_bus_handler(&pipeline, events, window_handle)?;

        Ok(Self {
            pipeline,
            source,
            capsfilter,
            valve,
            taginject,
            width: config.width,
            height: config.height,
            awb_mode: config.white_balance,
            annotation_mode: config.annotation_mode,
        })
    }

    /// Install the bus sync handler
    ///
    /// Answers the window-handle preparation request in place and forwards
    /// file-written notifications through the event callback; everything
    /// else passes through untouched.
    fn install_bus_handler(
        pipeline: &gst::Pipeline,
        events: EventCallback,
        window_handle: Option<WindowHandleProvider>,
    ) -> AppResult<()> {
        let bus = pipeline
            .bus()
            .ok_or_else(|| PipelineError::InitializationFailed("no bus".to_string()))?;

        bus.set_sync_handler(move |_, msg| {
            if gst_video::is_video_overlay_prepare_window_handle_message(msg) {
                if let Some(handle) = window_handle.as_ref().and_then(|provider| provider()) {
                    if let Some(overlay) = msg
                        .src()
                        .and_then(|s| s.dynamic_cast_ref::<gst_video::VideoOverlay>())
                    {
                        debug!(handle, "Handing preview surface to the sink");
                        // SAFETY: the handle comes from the embedding shell
                        // and outlives the pipeline
                        unsafe { overlay.set_window_handle(handle) };
                        return gst::BusSyncReply::Drop;
                    }
                }
            } else if let gst::MessageView::Element(element) = msg.view() {
                if let Some(s) = element.structure() {
                    if s.name() == "GstMultiFileSink" {
                        if let Ok(filename) = s.get::<&str>("filename") {
                            events(PipelineEvent::FileWritten(PathBuf::from(filename)));
                        }
                    }
                }
            }
            gst::BusSyncReply::Pass
        });

        Ok(())
    }
}

impl PipelineBackend for RpicamPipeline {
    fn start(&mut self) -> AppResult<()> {
        self.pipeline
            .set_state(gst::State::Playing)
            .map_err(|e| PipelineError::StateChange(e.to_string()))?;

        // Surface immediate startup errors instead of a black preview
        if let Some(bus) = self.pipeline.bus() {
            if let Some(msg) =
                bus.timed_pop_filtered(gst::ClockTime::from_mseconds(500), &[gst::MessageType::Error])
            {
                if let gst::MessageView::Error(err) = msg.view() {
                    error!(
                        error = %err.error(),
                        debug = ?err.debug(),
                        "Pipeline error during start"
                    );
                    return Err(PipelineError::StateChange(err.error().to_string()).into());
                }
            }
        }

        Ok(())
    }

    fn stop(&mut self) -> AppResult<()> {
        self.pipeline
            .set_state(gst::State::Null)
            .map_err(|e| PipelineError::StateChange(e.to_string()))?;
        Ok(())
    }

    fn shutter_speed(&self) -> u32 {
        self.source.property::<i32>("shutter-speed") as u32
    }

    fn set_shutter_speed(&mut self, micros: u32) {
        self.source.set_property("shutter-speed", micros as i32);
    }

    fn analog_gain(&self) -> u32 {
        self.source.property::<i32>("analog-gain") as u32
    }

    fn set_analog_gain(&mut self, gain: u32) {
        self.source.set_property("analog-gain", gain as i32);
    }

    fn contrast(&self) -> i32 {
        self.source.property("contrast")
    }

    fn set_contrast(&mut self, value: i32) {
        self.source.set_property("contrast", value);
    }

    fn saturation(&self) -> i32 {
        self.source.property("saturation")
    }

    fn set_saturation(&mut self, value: i32) {
        self.source.set_property("saturation", value);
    }

    fn sharpness(&self) -> i32 {
        self.source.property("sharpness")
    }

    fn set_sharpness(&mut self, value: i32) {
        self.source.set_property("sharpness", value);
    }

    fn awb_mode(&self) -> WhiteBalanceMode {
        self.awb_mode
    }

    fn set_awb_mode(&mut self, mode: WhiteBalanceMode) {
        self.source
            .set_property_from_str("awb-mode", mode.property_nick());
        self.awb_mode = mode;
    }

    fn annotation_mode(&self) -> u32 {
        self.annotation_mode
    }

    fn set_annotation_mode(&mut self, flags: u32) {
        self.source
            .set_property_from_str("annotation-mode", &flags.to_string());
        self.annotation_mode = flags;
    }

    fn set_annotation_text_size(&mut self, size: u32) {
        self.source.set_property("annotation-text-size", size as i32);
    }

    fn set_annotation_text(&mut self, text: &str) {
        self.source.set_property("annotation-text", text);
    }

    fn caps(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_caps(&mut self, width: u32, height: u32) -> AppResult<()> {
        self.capsfilter.set_property("caps", frame_caps(width, height));
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn set_capture_tags(&mut self, tags: &str) {
        self.taginject.set_property("tags", tags);
    }

    fn open_capture_valve(&mut self) -> AppResult<()> {
        self.valve.set_property("drop", false);
        Ok(())
    }

    fn close_capture_valve(&mut self) {
        self.valve.set_property("drop", true);
    }
}

impl Drop for RpicamPipeline {
    fn drop(&mut self) {
        // Ensure the pipeline reaches NULL so the sensor is released
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}

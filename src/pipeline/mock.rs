// SPDX-License-Identifier: GPL-3.0-only

//! Mock pipeline implementation for testing without hardware
//!
//! Records every property write and state transition so tests can assert
//! the exact operation sequence a controller produced. The state lives
//! behind a shared handle: clone the mock before boxing it into the
//! session and keep the clone as a probe.

use super::metadata::WhiteBalanceMode;
use super::PipelineBackend;
use crate::errors::AppResult;
use std::cell::RefCell;
use std::rc::Rc;

/// One recorded backend operation
#[derive(Debug, Clone, PartialEq)]
pub enum MockOp {
    /// Pipeline started
    Start,
    /// Pipeline stopped
    Stop,
    /// Shutter speed written
    SetShutterSpeed(u32),
    /// Analog gain written
    SetAnalogGain(u32),
    /// Contrast written
    SetContrast(i32),
    /// Saturation written
    SetSaturation(i32),
    /// Sharpness written
    SetSharpness(i32),
    /// White balance mode written
    SetAwbMode(WhiteBalanceMode),
    /// Annotation mode flags written
    SetAnnotationMode(u32),
    /// Annotation text size written
    SetAnnotationTextSize(u32),
    /// Annotation text written
    SetAnnotationText(String),
    /// Caps renegotiated
    SetCaps(u32, u32),
    /// Capture tag set replaced
    SetCaptureTags(String),
    /// Capture valve opened
    OpenValve,
    /// Capture valve closed
    CloseValve,
}

#[derive(Debug)]
struct MockState {
    shutter_speed: u32,
    analog_gain: u32,
    contrast: i32,
    saturation: i32,
    sharpness: i32,
    awb_mode: WhiteBalanceMode,
    annotation_mode: u32,
    annotation_text_size: u32,
    annotation_text: String,
    width: u32,
    height: u32,
    capture_tags: String,
    ops: Vec<MockOp>,
}

/// Mock pipeline for testing without hardware
#[derive(Clone)]
pub struct MockPipeline {
    state: Rc<RefCell<MockState>>,
}

impl Default for MockPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPipeline {
    /// Create a mock pipeline with the sensor's default state
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState {
                shutter_speed: 0,
                analog_gain: 0,
                contrast: 0,
                saturation: 0,
                sharpness: 0,
                awb_mode: WhiteBalanceMode::Auto,
                annotation_mode: crate::constants::annotation::DEFAULT_MODE,
                annotation_text_size: 38,
                annotation_text: String::new(),
                width: 800,
                height: 608,
                capture_tags: String::new(),
                ops: Vec::new(),
            })),
        }
    }

    /// Set the initial shutter speed
    pub fn with_shutter_speed(self, micros: u32) -> Self {
        self.state.borrow_mut().shutter_speed = micros;
        self
    }

    /// Set the initial analog gain
    pub fn with_analog_gain(self, gain: u32) -> Self {
        self.state.borrow_mut().analog_gain = gain;
        self
    }

    /// Set the initial frame size
    pub fn with_caps(self, width: u32, height: u32) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.width = width;
            state.height = height;
        }
        self
    }

    /// Operations recorded so far
    pub fn ops(&self) -> Vec<MockOp> {
        self.state.borrow().ops.clone()
    }

    /// Drain the recorded operations
    pub fn take_ops(&self) -> Vec<MockOp> {
        std::mem::take(&mut self.state.borrow_mut().ops)
    }

    /// Last pushed capture tag string
    pub fn capture_tags(&self) -> String {
        self.state.borrow().capture_tags.clone()
    }

    /// Last pushed annotation text
    pub fn annotation_text(&self) -> String {
        self.state.borrow().annotation_text.clone()
    }

    /// Last pushed annotation text size
    pub fn annotation_text_size(&self) -> u32 {
        self.state.borrow().annotation_text_size
    }

    fn record(&self, op: MockOp) {
        self.state.borrow_mut().ops.push(op);
    }
}

impl PipelineBackend for MockPipeline {
    fn start(&mut self) -> AppResult<()> {
        self.record(MockOp::Start);
        Ok(())
    }

    fn stop(&mut self) -> AppResult<()> {
        self.record(MockOp::Stop);
        Ok(())
    }

    fn shutter_speed(&self) -> u32 {
        self.state.borrow().shutter_speed
    }

    fn set_shutter_speed(&mut self, micros: u32) {
        self.state.borrow_mut().shutter_speed = micros;
        self.record(MockOp::SetShutterSpeed(micros));
    }

    fn analog_gain(&self) -> u32 {
        self.state.borrow().analog_gain
    }

    fn set_analog_gain(&mut self, gain: u32) {
        self.state.borrow_mut().analog_gain = gain;
        self.record(MockOp::SetAnalogGain(gain));
    }

    fn contrast(&self) -> i32 {
        self.state.borrow().contrast
    }

    fn set_contrast(&mut self, value: i32) {
        self.state.borrow_mut().contrast = value;
        self.record(MockOp::SetContrast(value));
    }

    fn saturation(&self) -> i32 {
        self.state.borrow().saturation
    }

    fn set_saturation(&mut self, value: i32) {
        self.state.borrow_mut().saturation = value;
        self.record(MockOp::SetSaturation(value));
    }

    fn sharpness(&self) -> i32 {
        self.state.borrow().sharpness
    }

    fn set_sharpness(&mut self, value: i32) {
        self.state.borrow_mut().sharpness = value;
        self.record(MockOp::SetSharpness(value));
    }

    fn awb_mode(&self) -> WhiteBalanceMode {
        self.state.borrow().awb_mode
    }

    fn set_awb_mode(&mut self, mode: WhiteBalanceMode) {
        self.state.borrow_mut().awb_mode = mode;
        self.record(MockOp::SetAwbMode(mode));
    }

    fn annotation_mode(&self) -> u32 {
        self.state.borrow().annotation_mode
    }

    fn set_annotation_mode(&mut self, flags: u32) {
        self.state.borrow_mut().annotation_mode = flags;
        self.record(MockOp::SetAnnotationMode(flags));
    }

    fn set_annotation_text_size(&mut self, size: u32) {
        self.state.borrow_mut().annotation_text_size = size;
        self.record(MockOp::SetAnnotationTextSize(size));
    }

    fn set_annotation_text(&mut self, text: &str) {
        self.state.borrow_mut().annotation_text = text.to_string();
        self.record(MockOp::SetAnnotationText(text.to_string()));
    }

    fn caps(&self) -> (u32, u32) {
        let state = self.state.borrow();
        (state.width, state.height)
    }

    fn set_caps(&mut self, width: u32, height: u32) -> AppResult<()> {
        {
            let mut state = self.state.borrow_mut();
            state.width = width;
            state.height = height;
        }
        self.record(MockOp::SetCaps(width, height));
        Ok(())
    }

    fn set_capture_tags(&mut self, tags: &str) {
        self.state.borrow_mut().capture_tags = tags.to_string();
        self.record(MockOp::SetCaptureTags(tags.to_string()));
    }

    fn open_capture_valve(&mut self) -> AppResult<()> {
        self.record(MockOp::OpenValve);
        Ok(())
    }

    fn close_capture_valve(&mut self) {
        self.record(MockOp::CloseValve);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_sees_boxed_writes() {
        let mock = MockPipeline::new().with_shutter_speed(1000);
        let probe = mock.clone();

        let mut boxed: Box<dyn PipelineBackend> = Box::new(mock);
        boxed.set_shutter_speed(1111);
        boxed.start().expect("mock start never fails");

        assert_eq!(probe.ops(), vec![MockOp::SetShutterSpeed(1111), MockOp::Start]);
        assert_eq!(boxed.shutter_speed(), 1111);
    }
}

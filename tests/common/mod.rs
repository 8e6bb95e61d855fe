//! Shared helpers for integration tests

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use realwaste::inference::{InferenceGateway, NativeEngine, WideCString, STATUS_OK};

/// Observations recorded by [`MockEngine`]
#[derive(Default)]
pub struct CallLog {
    pub init_calls: AtomicUsize,
    pub predict_calls: AtomicUsize,
    pub cleanup_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub overlaps: AtomicUsize,
    pub last_input: Mutex<Option<Vec<f32>>>,
}

impl CallLog {
    pub fn predict_calls(&self) -> usize {
        self.predict_calls.load(Ordering::SeqCst)
    }

    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    pub fn cleanup_calls(&self) -> usize {
        self.cleanup_calls.load(Ordering::SeqCst)
    }
}

/// Stand-in for the native engine with scripted behavior
pub struct MockEngine {
    pub init_status: i32,
    pub predict_status: i32,
    pub class_index: i32,
    pub delay: Duration,
    pub calls: Arc<CallLog>,
}

impl MockEngine {
    pub fn returning(class_index: i32) -> Self {
        Self {
            init_status: STATUS_OK,
            predict_status: STATUS_OK,
            class_index,
            delay: Duration::ZERO,
            calls: Arc::new(CallLog::default()),
        }
    }

    pub fn failing(status: i32) -> Self {
        Self {
            predict_status: status,
            ..Self::returning(0)
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl NativeEngine for MockEngine {
    fn init(&mut self, _model_path: &WideCString) -> i32 {
        self.calls.init_calls.fetch_add(1, Ordering::SeqCst);
        self.init_status
    }

    fn predict(&mut self, input: &[f32], class_index_out: &mut i32) -> i32 {
        if self.calls.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            self.calls.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.calls.predict_calls.fetch_add(1, Ordering::SeqCst);
        *self.calls.last_input.lock().unwrap() = Some(input.to_vec());

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        if self.predict_status == STATUS_OK {
            *class_index_out = self.class_index;
        }
        self.calls.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.predict_status
    }

    fn cleanup(&mut self) {
        self.calls.cleanup_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Initialize a gateway around `engine`, returning its call log
pub fn ready_gateway(engine: MockEngine) -> (InferenceGateway, Arc<CallLog>) {
    let calls = engine.calls.clone();
    let gateway = InferenceGateway::open(Box::new(engine), Path::new("model.onnx"))
        .expect("mock init succeeds");
    (gateway, calls)
}

/// Encode a solid-color RGB image as PNG bytes
pub fn solid_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png");
    bytes
}

pub const BOUNDARY: &str = "realwaste-test-boundary";

/// Build a multipart/form-data body with a single file field
pub fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Build a multipart/form-data body with a single plain text field
pub fn multipart_text_body(field: &str, value: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(value);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

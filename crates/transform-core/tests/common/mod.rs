//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::Mutex;
use rand::Rng;

use rtpfx_transform_core::frame::{FrameDependencyStructure, VideoLayersAllocation};
use rtpfx_transform_core::prelude::*;

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("rtpfx_transform_core=debug")
        .with_test_writer()
        .try_init();
}

/// Poll `condition` until it holds or `timeout` expires
pub fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

#[derive(Debug, Clone)]
pub struct SentFrame {
    pub payload_type: u8,
    pub rtp_timestamp: u32,
    pub capture_time_ms: i64,
    pub payload: Bytes,
    pub header: VideoHeader,
    pub thread_name: Option<String>,
}

/// Sender that records every frame and flags calls made after the test
/// declared it detached.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<SentFrame>>,
    detached: AtomicBool,
    late_calls: Mutex<usize>,
}

impl RecordingSender {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<SentFrame> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn timestamps(&self) -> Vec<u32> {
        self.sent.lock().iter().map(|f| f.rtp_timestamp).collect()
    }

    pub fn mark_detached(&self) {
        self.detached.store(true, Ordering::SeqCst);
    }

    pub fn late_calls(&self) -> usize {
        *self.late_calls.lock()
    }
}

impl VideoFrameSender for RecordingSender {
    fn send_video(
        &self,
        payload_type: u8,
        _codec_type: Option<VideoCodecType>,
        rtp_timestamp: u32,
        capture_time_ms: i64,
        payload: Bytes,
        header: &VideoHeader,
        _expected_retransmission_time_ms: Option<i64>,
    ) {
        if self.detached.load(Ordering::SeqCst) {
            *self.late_calls.lock() += 1;
        }
        self.sent.lock().push(SentFrame {
            payload_type,
            rtp_timestamp,
            capture_time_ms,
            payload,
            header: header.clone(),
            thread_name: thread::current().name().map(str::to_string),
        });
    }

    fn set_video_structure_after_transformation(&self, _video_structure: Option<&FrameDependencyStructure>) {}

    fn set_video_layers_allocation_after_transformation(&self, _allocation: VideoLayersAllocation) {}
}

/// Sink registry shared by the test transformers
#[derive(Default)]
pub struct SinkRegistry {
    sinks: Mutex<HashMap<u32, Arc<dyn TransformedFrameSink>>>,
}

impl SinkRegistry {
    pub fn register(&self, sink: Arc<dyn TransformedFrameSink>, ssrc: u32) {
        self.sinks.lock().insert(ssrc, sink);
    }

    pub fn unregister(&self, ssrc: u32) {
        self.sinks.lock().remove(&ssrc);
    }

    pub fn get(&self, ssrc: u32) -> Option<Arc<dyn TransformedFrameSink>> {
        self.sinks.lock().get(&ssrc).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.lock().is_empty()
    }
}

/// Completes every frame from a fresh thread after a random delay,
/// `repeat` times per frame.
pub struct ThreadedTransformer {
    sinks: Arc<SinkRegistry>,
    max_delay_ms: u64,
    repeat: usize,
    workers: Mutex<Vec<thread::JoinHandle<()>>>,
}

impl ThreadedTransformer {
    pub fn new(max_delay_ms: u64, repeat: usize) -> Arc<Self> {
        Arc::new(Self {
            sinks: Arc::new(SinkRegistry::default()),
            max_delay_ms,
            repeat,
            workers: Mutex::new(Vec::new()),
        })
    }

    pub fn join_workers(&self) {
        let workers = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            let _ = worker.join();
        }
    }

    pub fn has_sinks(&self) -> bool {
        !self.sinks.is_empty()
    }
}

impl FrameTransformer for ThreadedTransformer {
    fn transform(&self, frame: FrameEnvelope) {
        let sinks = self.sinks.clone();
        let max_delay_ms = self.max_delay_ms;
        let repeat = self.repeat;
        let worker = thread::spawn(move || {
            for _ in 0..repeat {
                let delay = rand::thread_rng().gen_range(0..=max_delay_ms);
                thread::sleep(Duration::from_millis(delay));
                if let Some(sink) = sinks.get(frame.ssrc()) {
                    sink.on_transformed_frame(frame.clone());
                }
            }
        });
        self.workers.lock().push(worker);
    }

    fn register_transformed_frame_sink_callback(&self, sink: Arc<dyn TransformedFrameSink>, ssrc: u32) {
        self.sinks.register(sink, ssrc);
    }

    fn unregister_transformed_frame_sink_callback(&self, ssrc: u32) {
        self.sinks.unregister(ssrc);
    }
}

/// Holds frames until the test completes them explicitly.
///
/// Keeps its own reference to the registered sink across unregistration, so
/// tests can model a transformer that races with reset.
#[derive(Default)]
pub struct HoldingTransformer {
    sinks: SinkRegistry,
    held: Mutex<Vec<FrameEnvelope>>,
    last_sink: Mutex<Option<Arc<dyn TransformedFrameSink>>>,
}

impl HoldingTransformer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn take_held(&self) -> Vec<FrameEnvelope> {
        std::mem::take(&mut *self.held.lock())
    }

    /// Deliver through the sink even if it was unregistered
    pub fn complete(&self, frame: FrameEnvelope) {
        let sink = self.last_sink.lock().clone();
        if let Some(sink) = sink {
            sink.on_transformed_frame(frame);
        }
    }
}

impl FrameTransformer for HoldingTransformer {
    fn transform(&self, frame: FrameEnvelope) {
        self.held.lock().push(frame);
    }

    fn register_transformed_frame_sink_callback(&self, sink: Arc<dyn TransformedFrameSink>, ssrc: u32) {
        *self.last_sink.lock() = Some(sink.clone());
        self.sinks.register(sink, ssrc);
    }

    fn unregister_transformed_frame_sink_callback(&self, ssrc: u32) {
        self.sinks.unregister(ssrc);
    }
}

pub fn key_frame(payload: &[u8]) -> (EncodedImage, VideoHeader) {
    let image = EncodedImage::new(payload.to_vec(), VideoFrameType::Key, 77);
    let header = VideoHeader::new(VideoCodecType::Vp8, VideoFrameType::Key).with_resolution(1280, 720);
    (image, header)
}

pub fn submit(delegate: &SenderFrameTransformerDelegate, rtp_timestamp: u32) -> bool {
    let (image, header) = key_frame(&rtp_timestamp.to_be_bytes());
    delegate.transform_frame(
        PayloadType::new(96).unwrap(),
        Some(VideoCodecType::Vp8),
        rtp_timestamp,
        &image,
        header,
        None,
    )
}

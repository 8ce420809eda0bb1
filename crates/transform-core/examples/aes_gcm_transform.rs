//! Frame encryption through the transform delegate.
//!
//! An AES-256-GCM transformer encrypts every outgoing frame on its own worker
//! thread, authenticating the generic frame descriptor as associated data.
//! The sender decrypts what it receives to show the round trip.
//!
//! Settings come from `RTPFX__*` environment variables, e.g.
//! `RTPFX__LOGGING__LEVEL=debug cargo run --example aes_gcm_transform`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use bytes::Bytes;
use parking_lot::Mutex;
use rand::RngCore;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use rtpfx_infra_common::config::ConfigLoader;
use rtpfx_infra_common::logging::{log_welcome, setup_logging};
use rtpfx_transform_core::frame::{GenericDescriptorInfo, VideoFrameMetadata};
use rtpfx_transform_core::prelude::*;

const NONCE_LEN: usize = 12;
const SSRC: u32 = 0x00C0_FFEE;
const FRAME_COUNT: u32 = 10;

type SinkMap = Arc<Mutex<HashMap<u32, Arc<dyn TransformedFrameSink>>>>;

/// Encrypts frames on a worker thread. Output layout: ciphertext || tag || nonce.
struct AesGcmTransformer {
    tx: mpsc::UnboundedSender<FrameEnvelope>,
    sinks: SinkMap,
}

impl AesGcmTransformer {
    fn new(key: [u8; 32]) -> std::io::Result<Arc<Self>> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
        let sinks: SinkMap = Arc::new(Mutex::new(HashMap::new()));
        let (tx, mut rx) = mpsc::unbounded_channel::<FrameEnvelope>();

        let worker_sinks = sinks.clone();
        thread::Builder::new().name("aes-gcm".to_string()).spawn(move || {
            let mut counter: u32 = 0;
            while let Some(mut frame) = rx.blocking_recv() {
                let mut nonce = [0u8; NONCE_LEN];
                nonce[..4].copy_from_slice(&frame.ssrc().to_be_bytes());
                nonce[4..8].copy_from_slice(&frame.timestamp().to_be_bytes());
                nonce[8..].copy_from_slice(&counter.to_be_bytes());
                counter = counter.wrapping_add(1);

                let aad = frame.additional_data();
                let sealed = match cipher.encrypt(
                    Nonce::from_slice(&nonce),
                    Payload {
                        msg: frame.data(),
                        aad: &aad,
                    },
                ) {
                    Ok(sealed) => sealed,
                    Err(e) => {
                        error!("Failed to encrypt frame ts={}: {}", frame.timestamp(), e);
                        continue;
                    }
                };

                let mut payload = sealed;
                payload.extend_from_slice(&nonce);
                frame.set_data(&payload);

                let sink = worker_sinks.lock().get(&frame.ssrc()).cloned();
                match sink {
                    Some(sink) => sink.on_transformed_frame(frame),
                    None => warn!("No sink for ssrc={}, dropping encrypted frame", frame.ssrc()),
                }
            }
        })?;

        Ok(Arc::new(Self { tx, sinks }))
    }
}

impl FrameTransformer for AesGcmTransformer {
    fn transform(&self, frame: FrameEnvelope) {
        if self.tx.send(frame).is_err() {
            warn!("Encryption worker stopped");
        }
    }

    fn register_transformed_frame_sink_callback(&self, sink: Arc<dyn TransformedFrameSink>, ssrc: u32) {
        self.sinks.lock().insert(ssrc, sink);
    }

    fn unregister_transformed_frame_sink_callback(&self, ssrc: u32) {
        self.sinks.lock().remove(&ssrc);
    }
}

/// Stands in for the packetizer: opens each frame again and logs it.
struct DecryptingSender {
    cipher: Aes256Gcm,
    received: AtomicU32,
}

impl DecryptingSender {
    fn open(&self, payload: &[u8], metadata: &VideoFrameMetadata) -> Option<Vec<u8>> {
        if payload.len() < NONCE_LEN {
            return None;
        }
        let (sealed, nonce) = payload.split_at(payload.len() - NONCE_LEN);
        let aad = descriptor_authentication(metadata);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), Payload { msg: sealed, aad: &aad })
            .ok()
    }
}

impl VideoFrameSender for DecryptingSender {
    fn send_video(
        &self,
        payload_type: u8,
        _codec_type: Option<VideoCodecType>,
        rtp_timestamp: u32,
        _capture_time_ms: i64,
        payload: Bytes,
        header: &VideoHeader,
        _expected_retransmission_time_ms: Option<i64>,
    ) {
        self.received.fetch_add(1, Ordering::Relaxed);
        match self.open(&payload, &header.as_metadata()) {
            Some(plain) => info!(
                "pt={} ts={} encrypted={}B decrypted={}B",
                payload_type,
                rtp_timestamp,
                payload.len(),
                plain.len()
            ),
            None => error!("Frame ts={} failed authentication", rtp_timestamp),
        }
    }

    fn set_video_structure_after_transformation(&self, _video_structure: Option<&FrameDependencyStructure>) {}

    fn set_video_layers_allocation_after_transformation(&self, _allocation: VideoLayersAllocation) {}
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let config = RtpfxConfig::load(&ConfigLoader::new())?;
    setup_logging(&config.logging)?;
    log_welcome(&config.logging.app_name, rtpfx_transform_core::VERSION);

    let mut key = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut key);

    let sender = Arc::new(DecryptingSender {
        cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key)),
        received: AtomicU32::new(0),
    });
    let transformer = AesGcmTransformer::new(key)?;

    let factory = config.delegate.create_task_queue_factory()?;
    let delegate = SenderFrameTransformerDelegate::with_config(
        sender.clone(),
        transformer,
        SSRC,
        factory.as_ref(),
        &config.delegate,
    )?;
    delegate.init()?;

    let payload_type = PayloadType::new(96)?;
    for i in 0..FRAME_COUNT {
        let frame_type = if i == 0 { VideoFrameType::Key } else { VideoFrameType::Delta };
        let header = VideoHeader::new(VideoCodecType::Vp8, frame_type)
            .with_resolution(640, 360)
            .with_generic(GenericDescriptorInfo {
                frame_id: i64::from(i),
                dependencies: if i == 0 { Vec::new() } else { vec![i64::from(i) - 1] },
                ..Default::default()
            });
        let image = EncodedImage::new(vec![i as u8; 800], frame_type, i64::from(i) * 33);
        delegate.transform_frame(payload_type, Some(VideoCodecType::Vp8), i * 3000, &image, header, None);
    }

    for _ in 0..100 {
        if sender.received.load(Ordering::Relaxed) == FRAME_COUNT {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }
    info!("Delivered {} of {} frames", sender.received.load(Ordering::Relaxed), FRAME_COUNT);

    delegate.reset();
    Ok(())
}

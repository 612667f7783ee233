//! Background image decoding.
//!
//! Decoding runs on a small pool of threads; the render thread drains
//! finished images once per frame and uploads them. Nothing here touches GPU
//! state, so it is testable without a device.

use driftgrid_common::PlaneId;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;

/// Largest width or height uploaded; bigger images are scaled down.
pub const MAX_TEXTURE_SIZE: u32 = 4096;

/// Number of decoder threads.
const DECODER_THREADS: usize = 2;

/// RGBA8 pixels ready for upload.
#[derive(Debug)]
pub struct DecodedImage {
    pub id: PlaneId,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

struct DecodeRequest {
    id: PlaneId,
    path: PathBuf,
}

type DecodeResult = Result<DecodedImage, (PlaneId, PathBuf, String)>;

/// Fire-and-forget image loader.
pub struct TextureLoader {
    request_tx: mpsc::Sender<DecodeRequest>,
    decoded_rx: mpsc::Receiver<DecodeResult>,
    in_flight: usize,
    failed: usize,
}

impl TextureLoader {
    pub fn new() -> Self {
        let (request_tx, request_rx) = mpsc::channel::<DecodeRequest>();
        let (decoded_tx, decoded_rx) = mpsc::channel::<DecodeResult>();
        let request_rx = Arc::new(Mutex::new(request_rx));

        for i in 0..DECODER_THREADS {
            let rx = Arc::clone(&request_rx);
            let tx = decoded_tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("image-decoder-{i}"))
                .spawn(move || Self::decoder_thread(rx, tx));
            if let Err(e) = spawned {
                tracing::error!("failed to spawn image decoder {i}: {e}");
            }
        }

        Self {
            request_tx,
            decoded_rx,
            in_flight: 0,
            failed: 0,
        }
    }

    /// Queue an image for decoding. The result arrives through [`Self::drain`].
    pub fn request(&mut self, id: PlaneId, path: impl Into<PathBuf>) {
        let path = path.into();
        tracing::debug!("queue image {id}: {}", path.display());
        if self.request_tx.send(DecodeRequest { id, path }).is_ok() {
            self.in_flight += 1;
        } else {
            tracing::warn!("image decoder pool is gone; plane {id} stays blank");
            self.failed += 1;
        }
    }

    /// Collect every image decoded since the last call. Never blocks.
    pub fn drain(&mut self) -> Vec<DecodedImage> {
        let mut ready = Vec::new();
        while let Ok(result) = self.decoded_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            match result {
                Ok(image) => ready.push(image),
                Err((id, path, reason)) => {
                    self.failed += 1;
                    tracing::warn!(
                        "failed to load {} for plane {id}: {reason}",
                        path.display()
                    );
                }
            }
        }
        ready
    }

    /// Requests not yet drained.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Requests that ended in an error.
    pub fn failed(&self) -> usize {
        self.failed
    }

    fn decoder_thread(
        rx: Arc<Mutex<mpsc::Receiver<DecodeRequest>>>,
        tx: mpsc::Sender<DecodeResult>,
    ) {
        loop {
            let request = {
                let Ok(guard) = rx.lock() else {
                    break;
                };
                match guard.recv() {
                    Ok(r) => r,
                    Err(_) => break,
                }
            };
            let result = decode_file(&request.path, MAX_TEXTURE_SIZE)
                .map(|(width, height, data)| DecodedImage {
                    id: request.id,
                    width,
                    height,
                    data,
                })
                .map_err(|reason| (request.id, request.path, reason));
            if tx.send(result).is_err() {
                break;
            }
        }
    }
}

impl Default for TextureLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an image file to RGBA8, scaling it down to fit `max_size`.
pub fn decode_file(path: &Path, max_size: u32) -> Result<(u32, u32, Vec<u8>), String> {
    let img = image::open(path).map_err(|e| e.to_string())?;
    let (width, height) = fit_within(img.width(), img.height(), max_size);
    let img = if width != img.width() || height != img.height() {
        img.resize_exact(width, height, image::imageops::FilterType::Triangle)
    } else {
        img
    };
    let rgba = img.to_rgba8();
    Ok((width, height, rgba.into_raw()))
}

/// Scale `(width, height)` down, keeping aspect, so neither side exceeds `max`.
fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }
    let scale = max as f64 / width.max(height) as f64;
    let w = (width as f64 * scale).round() as u32;
    let h = (height as f64 * scale).round() as u32;
    (w.clamp(1, max), h.clamp(1, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn drain_until(loader: &mut TextureLoader, expected: usize) -> Vec<DecodedImage> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut out = Vec::new();
        while loader.in_flight() > 0 && Instant::now() < deadline {
            out.extend(loader.drain());
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(loader.in_flight(), 0, "decoder did not finish");
        assert_eq!(out.len(), expected);
        out
    }

    #[test]
    fn fit_within_keeps_small_images() {
        assert_eq!(fit_within(640, 480, 4096), (640, 480));
    }

    #[test]
    fn fit_within_scales_long_side() {
        assert_eq!(fit_within(8192, 2048, 4096), (4096, 1024));
        assert_eq!(fit_within(100, 10_000, 1000), (10, 1000));
    }

    #[test]
    fn decode_png_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tile.png");
        image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let (w, h, data) = decode_file(&path, MAX_TEXTURE_SIZE).unwrap();
        assert_eq!((w, h), (4, 2));
        assert_eq!(data.len(), 4 * 2 * 4);
        assert_eq!(&data[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn loader_delivers_decoded_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        image::RgbaImage::new(3, 3).save(&path).unwrap();

        let mut loader = TextureLoader::new();
        loader.request(PlaneId(7), &path);
        let images = drain_until(&mut loader, 1);
        assert_eq!(images[0].id, PlaneId(7));
        assert_eq!((images[0].width, images[0].height), (3, 3));
        assert_eq!(loader.failed(), 0);
    }

    #[test]
    fn missing_file_counts_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = TextureLoader::new();
        loader.request(PlaneId(0), dir.path().join("missing.png"));
        drain_until(&mut loader, 0);
        assert_eq!(loader.failed(), 1);
    }
}

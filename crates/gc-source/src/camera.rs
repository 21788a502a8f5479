// Capture caméra via ffmpeg en subprocess (ffmpeg doit être dans le PATH).
//
// Un thread lecteur remplit un canal borné ; côté rendu, `next_frame` vide
// le canal et ne garde que la frame la plus récente.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use flume::Receiver;
use gc_core::frame::Frame;
use gc_core::traits::Source;

/// Capacité du canal frames. Au-delà, le lecteur bloque et ffmpeg
/// s'auto-régule sur son pipe.
const CHANNEL_CAPACITY: usize = 2;

/// Paramètres de capture.
///
/// # Example
/// ```
/// use gc_source::camera::CameraConfig;
/// let cfg = CameraConfig::default();
/// assert_eq!((cfg.width, cfg.height), (640, 480));
/// ```
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// Périphérique passé à `-i` (`/dev/video0`, `0`, `video=...`).
    pub device: String,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: default_device().to_string(),
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

#[cfg(target_os = "linux")]
const INPUT_FORMAT: &str = "v4l2";
#[cfg(target_os = "macos")]
const INPUT_FORMAT: &str = "avfoundation";
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
const INPUT_FORMAT: &str = "dshow";

fn default_device() -> &'static str {
    match INPUT_FORMAT {
        "v4l2" => "/dev/video0",
        "avfoundation" => "0",
        _ => "video=Integrated Camera",
    }
}

/// Source caméra live. Les frames non consommées sont remplacées, jamais
/// mises en file.
pub struct CameraSource {
    rx: Receiver<Arc<Frame>>,
    child: Child,
    reader: Option<JoinHandle<()>>,
    latest: Option<Arc<Frame>>,
    width: u32,
    height: u32,
}

impl CameraSource {
    /// Ouvre la caméra et démarre le thread lecteur.
    ///
    /// # Errors
    /// Retourne une erreur si ffmpeg ne peut être lancé.
    pub fn open(cfg: &CameraConfig) -> Result<Self> {
        let mut child = spawn_ffmpeg_capture(cfg)?;
        let Some(stdout) = child.stdout.take() else {
            reap(&mut child);
            anyhow::bail!("ffmpeg: stdout non capturé");
        };

        let (tx, rx) = flume::bounded(CHANNEL_CAPACITY);
        let (w, h) = (cfg.width, cfg.height);
        let spawned = thread::Builder::new()
            .name("gc-camera".into())
            .spawn(move || {
                let mut stdout = stdout;
                let frame_bytes = w as usize * h as usize * 3;
                loop {
                    let mut buf = vec![0u8; frame_bytes];
                    match read_exact_or_eof(&mut stdout, &mut buf) {
                        Ok(true) => {
                            let frame = Frame {
                                data: buf,
                                width: w,
                                height: h,
                            };
                            if tx.send(Arc::new(frame)).is_err() {
                                break;
                            }
                        }
                        Ok(false) => {
                            log::info!("Caméra: fin de flux ffmpeg");
                            break;
                        }
                        Err(e) => {
                            log::warn!("Caméra: erreur de lecture pipe: {e}");
                            break;
                        }
                    }
                }
            });
        let reader = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                reap(&mut child);
                return Err(e).context("Impossible de démarrer le thread caméra");
            }
        };

        log::info!(
            "Caméra ouverte: {} ({w}x{h} @ {}fps)",
            cfg.device,
            cfg.fps
        );

        Ok(Self {
            rx,
            child,
            reader: Some(reader),
            latest: None,
            width: w,
            height: h,
        })
    }
}

impl Source for CameraSource {
    fn next_frame(&mut self) -> Option<Arc<Frame>> {
        match self.rx.try_iter().last() {
            Some(frame) => {
                self.latest = Some(Arc::clone(&frame));
                Some(frame)
            }
            // Pas de nouvelle frame : la dernière reste valide tant que le flux vit.
            None if !self.rx.is_disconnected() => self.latest.as_ref().map(Arc::clone),
            None => None,
        }
    }

    fn native_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn is_live(&self) -> bool {
        true
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        reap(&mut self.child);
        // Vide le canal pour débloquer un `send` en attente ; se termine quand
        // le lecteur lâche son sender.
        while self.rx.recv().is_ok() {}
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
    }
}

/// Tue et attend le process ffmpeg ; il ne reste pas de zombie.
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::debug!("Caméra: kill ffmpeg: {e}");
    }
    if let Err(e) = child.wait() {
        log::warn!("Caméra: wait ffmpeg: {e}");
    }
}

/// Lance ffmpeg qui écrit des frames RGB24 brutes (`w × h × 3`) sur stdout.
fn spawn_ffmpeg_capture(cfg: &CameraConfig) -> Result<Child> {
    let size = format!("{}x{}", cfg.width, cfg.height);
    let fps = cfg.fps.to_string();
    let scale = format!("scale={}:{}", cfg.width, cfg.height);

    Command::new("ffmpeg")
        .args([
            "-f",
            INPUT_FORMAT,
            "-framerate",
            &fps,
            "-video_size",
            &size,
            "-i",
            &cfg.device,
            "-vf",
            &scale,
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-an",
            "-hide_banner",
            "-loglevel",
            "error",
            "pipe:1",
        ])
        .stdout(Stdio::piped())
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("Impossible de lancer ffmpeg. Vérifiez qu'il est installé et dans le PATH.")
}

/// Lit exactement `buf.len()` octets. Retourne `false` sur EOF.
///
/// # Errors
/// Propage les erreurs I/O autres que `Interrupted`.
pub fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut total = 0usize;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => return Ok(false),
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

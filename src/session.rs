// THEORY:
// A `SlicerSession` is the interactive side of the slicer: the user loads a
// sheet, clicks an empty spot to pick the background, drags a tolerance slider,
// types a sprite name, and expects the boxes and the exported text to follow.
//
// Key architectural principles:
// 1.  **Actor Ownership**: A single tokio task owns the current inputs (sheet,
//     background, configuration, names). Callers never touch that state; they
//     send `SessionEvent`s over an unbounded channel.
// 2.  **Serial Runs**: Events are handled one at a time. A new sheet, background
//     or tolerance triggers a full detection run before the next event is read,
//     so runs never overlap and there is nothing to cancel. A new sprite name
//     only re-renders the text of the boxes already found.
// 3.  **Wholesale Publication**: Each finished run is published as one immutable
//     `SessionSnapshot` through a `watch` channel. Readers always see either the
//     previous snapshot or the new one, never a partial result.
// 4.  **No Background, No Run**: Until a background has been picked, input
//     changes are recorded but detection does not run.

use crate::core_modules::bounding_box::BoundingBox;
use crate::core_modules::pixel::pixel::BackgroundColor;
use crate::error::{Result, SlicerError};
use crate::patch_text::{self, ExportConfig};
use crate::pipeline::{SlicerConfig, detect_sprites};
use image::RgbaImage;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

/// Inputs accepted by a running session.
pub enum SessionEvent {
    /// A new sheet. `name` is its file name; the extension is stripped for export.
    ImageLoaded { name: String, image: RgbaImage },
    BackgroundPicked(BackgroundColor),
    /// Pick the background from the pixel under `(x, y)` of the current sheet.
    BackgroundSampled { x: u32, y: u32 },
    ToleranceChanged(u32),
    SpriteNameChanged(String),
    /// Render the current boxes as patch text.
    Export(oneshot::Sender<String>),
    Shutdown,
}

/// The published result of one detection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Increments with every detection run. Renames keep it.
    pub generation: u64,
    pub boxes: Vec<BoundingBox>,
    pub patch_text: String,
}

/// What an applied event asks the session to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Follow {
    Nothing,
    Detect,
    Rerender,
}

struct SessionState {
    config: SlicerConfig,
    export: ExportConfig,
    image: Option<RgbaImage>,
    background: Option<BackgroundColor>,
    boxes: Vec<BoundingBox>,
    generation: u64,
}

impl SessionState {
    /// Applies one event.
    fn apply(&mut self, event: SessionEvent) -> Follow {
        match event {
            SessionEvent::ImageLoaded { name, image } => {
                self.export.patch_name =
                    patch_text::patch_name_from_path(std::path::Path::new(&name));
                info!(%name, width = image.width(), height = image.height(), "sheet loaded");
                self.image = Some(image);
                Follow::Detect
            }
            SessionEvent::BackgroundPicked(color) => {
                info!(%color, "background picked");
                self.background = Some(color);
                Follow::Detect
            }
            SessionEvent::BackgroundSampled { x, y } => {
                let Some(image) = &self.image else {
                    warn!(x, y, "background sampled before a sheet was loaded");
                    return Follow::Nothing;
                };
                match BackgroundColor::sample(image, x, y) {
                    Ok(color) => {
                        info!(%color, x, y, "background sampled");
                        self.background = Some(color);
                        Follow::Detect
                    }
                    Err(e) => {
                        warn!("{e}");
                        Follow::Nothing
                    }
                }
            }
            SessionEvent::ToleranceChanged(tolerance) => {
                debug!(tolerance, "tolerance changed");
                self.config.tolerance = tolerance;
                Follow::Detect
            }
            SessionEvent::SpriteNameChanged(name) => {
                debug!(%name, "sprite name changed");
                self.export.sprite_name = name;
                // Republish only if there is already something to rename.
                if self.boxes_detected() {
                    Follow::Rerender
                } else {
                    Follow::Nothing
                }
            }
            SessionEvent::Export(reply) => {
                let _ = reply.send(patch_text::render_patches(&self.boxes, &self.export));
                Follow::Nothing
            }
            SessionEvent::Shutdown => Follow::Nothing,
        }
    }

    fn boxes_detected(&self) -> bool {
        self.generation > 0
    }

    /// Re-runs detection if a sheet and a background are both present.
    fn run(&mut self) -> Option<SessionSnapshot> {
        let image = self.image.as_ref()?;
        let Some(background) = self.background else {
            debug!("no background selected, skipping detection");
            return None;
        };

        self.boxes = detect_sprites(image, background, &self.config);
        self.generation += 1;
        Some(self.snapshot())
    }

    /// The current boxes and their text, without running detection.
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            generation: self.generation,
            boxes: self.boxes.clone(),
            patch_text: patch_text::render_patches(&self.boxes, &self.export),
        }
    }
}

/// Handle to a running slicer actor.
pub struct SlicerSession {
    event_sender: mpsc::UnboundedSender<SessionEvent>,
    snapshots: watch::Receiver<Option<Arc<SessionSnapshot>>>,
    worker: tokio::task::JoinHandle<()>,
}

impl SlicerSession {
    /// Spawns the session task on the current tokio runtime.
    pub fn spawn(config: SlicerConfig) -> Self {
        let (event_sender, mut event_receiver) = mpsc::unbounded_channel::<SessionEvent>();
        let (snapshot_sender, snapshots) = watch::channel(None);

        let worker = tokio::spawn(async move {
            let mut state = SessionState {
                config,
                export: ExportConfig::default(),
                image: None,
                background: None,
                boxes: Vec::new(),
                generation: 0,
            };

            while let Some(event) = event_receiver.recv().await {
                if matches!(event, SessionEvent::Shutdown) {
                    break;
                }
                let snapshot = match state.apply(event) {
                    Follow::Nothing => None,
                    Follow::Detect => state.run(),
                    Follow::Rerender => Some(state.snapshot()),
                };
                if let Some(snapshot) = snapshot {
                    let _ = snapshot_sender.send(Some(Arc::new(snapshot)));
                }
            }
            debug!("slicer session stopped");
        });

        Self {
            event_sender,
            snapshots,
            worker,
        }
    }

    pub fn send(&self, event: SessionEvent) -> Result<()> {
        self.event_sender
            .send(event)
            .map_err(|_| SlicerError::SessionClosed)
    }

    pub fn load_image(&self, name: impl Into<String>, image: RgbaImage) -> Result<()> {
        self.send(SessionEvent::ImageLoaded {
            name: name.into(),
            image,
        })
    }

    pub fn pick_background(&self, color: BackgroundColor) -> Result<()> {
        self.send(SessionEvent::BackgroundPicked(color))
    }

    pub fn sample_background(&self, x: u32, y: u32) -> Result<()> {
        self.send(SessionEvent::BackgroundSampled { x, y })
    }

    pub fn set_tolerance(&self, tolerance: u32) -> Result<()> {
        self.send(SessionEvent::ToleranceChanged(tolerance))
    }

    pub fn set_sprite_name(&self, name: impl Into<String>) -> Result<()> {
        self.send(SessionEvent::SpriteNameChanged(name.into()))
    }

    /// The latest published snapshot, if any run has completed.
    pub fn latest(&self) -> Option<Arc<SessionSnapshot>> {
        self.snapshots.borrow().clone()
    }

    /// Waits for a snapshot newer than the last one observed through this handle.
    pub async fn next_snapshot(&mut self) -> Result<Arc<SessionSnapshot>> {
        loop {
            self.snapshots
                .changed()
                .await
                .map_err(|_| SlicerError::SessionClosed)?;
            if let Some(snapshot) = self.snapshots.borrow_and_update().clone() {
                return Ok(snapshot);
            }
        }
    }

    /// Renders the current boxes with the current names.
    pub async fn export(&self) -> Result<String> {
        let (reply, response) = oneshot::channel();
        self.send(SessionEvent::Export(reply))?;
        response.await.map_err(|_| SlicerError::SessionClosed)
    }

    /// Stops the task and waits for it to finish.
    pub async fn shutdown(self) {
        let _ = self.event_sender.send(SessionEvent::Shutdown);
        let _ = self.worker.await;
    }
}

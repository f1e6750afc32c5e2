use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::common::{MediaCommand, MediaEvent};

use super::attachments::{AttachmentStore, StoredAttachment};
use super::remote::{fetch_remote_image, http_client};
use super::{MediaResult, is_remote};

/// Upper bound for a whole remote image fetch.
const REMOTE_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Background side of the UI: receives [`MediaCommand`]s, does the slow image
/// work and posts a [`MediaEvent`] back for every command.
pub struct MediaWorker {
    event_sender: mpsc::Sender<MediaEvent>,
    command_receiver: mpsc::Receiver<MediaCommand>,
    attachments: Arc<AttachmentStore>,
    http: reqwest::Client,
}

impl MediaWorker {
    pub fn new(
        event_sender: mpsc::Sender<MediaEvent>,
        command_receiver: mpsc::Receiver<MediaCommand>,
        attachments: AttachmentStore,
    ) -> Self {
        Self {
            event_sender,
            command_receiver,
            attachments: Arc::new(attachments),
            http: http_client(REMOTE_FETCH_TIMEOUT),
        }
    }

    /// Runs until the UI drops its command sender.
    pub async fn run(mut self) {
        log::info!(
            "Media worker started (attachments in {})",
            self.attachments.root().display()
        );

        while let Some(command) = self.command_receiver.recv().await {
            self.handle_command(command);
        }

        log::info!("Media worker stopped");
    }

    fn handle_command(&self, command: MediaCommand) {
        let events = self.event_sender.clone();
        let attachments = Arc::clone(&self.attachments);

        match command {
            MediaCommand::LoadImage { handle } if is_remote(&handle) => {
                let http = self.http.clone();
                tokio::spawn(async move {
                    let event = match fetch_remote_image(&http, &handle).await {
                        Ok(image) => MediaEvent::ImageLoaded { handle, image },
                        Err(err) => {
                            log::warn!("Failed to load remote image: {err}");
                            MediaEvent::ImageUnavailable { handle }
                        }
                    };
                    post(&events, event).await;
                });
            }
            MediaCommand::LoadImage { handle } => {
                tokio::spawn(async move {
                    let lookup = handle.clone();
                    let result =
                        tokio::task::spawn_blocking(move || attachments.load_local(&lookup)).await;
                    let event = match result {
                        Ok(Ok(image)) => MediaEvent::ImageLoaded { handle, image },
                        Ok(Err(err)) => {
                            log::warn!("{err}");
                            MediaEvent::ImageUnavailable { handle }
                        }
                        Err(err) => {
                            log::error!("Image decode task panicked: {err}");
                            MediaEvent::ImageUnavailable { handle }
                        }
                    };
                    post(&events, event).await;
                });
            }
            MediaCommand::SaveImage { bytes, file_name } => {
                tokio::spawn(async move {
                    let result = tokio::task::spawn_blocking(move || {
                        attachments.save_image(&bytes, file_name.as_deref())
                    })
                    .await;
                    post(&events, saved_event(result)).await;
                });
            }
            MediaCommand::ImportImage { path } => {
                tokio::spawn(async move {
                    let result =
                        tokio::task::spawn_blocking(move || attachments.import_file(&path)).await;
                    post(&events, saved_event(result)).await;
                });
            }
        }
    }
}

fn saved_event(
    result: Result<MediaResult<StoredAttachment>, tokio::task::JoinError>,
) -> MediaEvent {
    match result {
        Ok(Ok(stored)) => MediaEvent::ImageSaved(stored),
        Ok(Err(err)) => {
            log::warn!("Failed to save image attachment: {err}");
            MediaEvent::SaveFailed {
                reason: err.to_string(),
            }
        }
        Err(err) => {
            log::error!("Image encode task panicked: {err}");
            MediaEvent::SaveFailed {
                reason: err.to_string(),
            }
        }
    }
}

async fn post(events: &mpsc::Sender<MediaEvent>, event: MediaEvent) {
    if let Err(err) = events.send(event).await {
        log::warn!("UI stopped listening for media events: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::attachments::tests::test_png_bytes;
    use tempfile::TempDir;

    fn spawn_worker(
        root: &std::path::Path,
    ) -> (mpsc::Sender<MediaCommand>, mpsc::Receiver<MediaEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (event_tx, event_rx) = mpsc::channel(8);
        let worker = MediaWorker::new(event_tx, cmd_rx, AttachmentStore::new(root));
        tokio::spawn(worker.run());
        (cmd_tx, event_rx)
    }

    #[tokio::test]
    async fn saves_then_loads_back() {
        let tmp = TempDir::new().unwrap();
        let (commands, mut events) = spawn_worker(tmp.path());

        commands
            .send(MediaCommand::SaveImage {
                bytes: test_png_bytes(10, 4),
                file_name: None,
            })
            .await
            .unwrap();
        let stored = match events.recv().await.unwrap() {
            MediaEvent::ImageSaved(stored) => stored,
            other => panic!("unexpected event {other:?}"),
        };

        commands
            .send(MediaCommand::LoadImage {
                handle: stored.path.clone(),
            })
            .await
            .unwrap();
        match events.recv().await.unwrap() {
            MediaEvent::ImageLoaded { handle, image } => {
                assert_eq!(handle, stored.path);
                assert_eq!((image.width, image.height), (10, 4));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn reports_missing_image_as_unavailable() {
        let tmp = TempDir::new().unwrap();
        let (commands, mut events) = spawn_worker(tmp.path());

        commands
            .send(MediaCommand::LoadImage {
                handle: "/missing/picture.jpg".to_string(),
            })
            .await
            .unwrap();

        match events.recv().await.unwrap() {
            MediaEvent::ImageUnavailable { handle } => assert_eq!(handle, "/missing/picture.jpg"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn imports_file_from_path() {
        let tmp = TempDir::new().unwrap();
        let picked = tmp.path().join("dropped.png");
        std::fs::write(&picked, test_png_bytes(3, 3)).unwrap();
        let (commands, mut events) = spawn_worker(&tmp.path().join("attachments"));

        commands
            .send(MediaCommand::ImportImage { path: picked })
            .await
            .unwrap();

        match events.recv().await.unwrap() {
            MediaEvent::ImageSaved(stored) => assert!(stored.size_bytes > 0),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn reports_corrupt_upload() {
        let tmp = TempDir::new().unwrap();
        let (commands, mut events) = spawn_worker(tmp.path());

        commands
            .send(MediaCommand::SaveImage {
                bytes: vec![0, 1, 2, 3],
                file_name: Some("bad.jpg".to_string()),
            })
            .await
            .unwrap();

        assert!(matches!(
            events.recv().await.unwrap(),
            MediaEvent::SaveFailed { .. }
        ));
    }
}

//! Async driver for the [`QueueController`].
//!
//! [`image_queue`] returns a cloneable handle and a driver future. The driver
//! owns the controller, the fetcher and every in-flight request; dropping it
//! (or every handle) tears all of that down, timers included.

use crate::controller::QueueController;
use crate::fetch::{FetchResult, ImageFetcher};
use crate::models::{Admission, ImageQueueConfig, ImageRequest, ImageUrlConfig, LoadStatus, QueueSnapshot};
use crate::url::build_image_url;
use futures::future::{AbortHandle, Abortable, Aborted, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

enum Command {
    Load(Vec<ImageRequest>),
    Retry(usize),
    Clear,
}

/// Control surface for a running image queue
#[derive(Clone)]
pub struct ImageQueueHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<QueueSnapshot>,
}

impl PartialEq for ImageQueueHandle {
    fn eq(&self, other: &Self) -> bool {
        self.commands.same_channel(&other.commands)
    }
}

impl ImageQueueHandle {
    /// Replaces the current story's images; anything in flight is dropped
    pub fn load_story(&self, requests: Vec<ImageRequest>) {
        self.send(Command::Load(requests));
    }

    /// Puts one chapter back in line
    pub fn retry(&self, chapter_index: usize) {
        self.send(Command::Retry(chapter_index));
    }

    /// Forgets the current story
    pub fn clear(&self) {
        self.send(Command::Clear);
    }

    pub fn subscribe(&self) -> watch::Receiver<QueueSnapshot> {
        self.snapshot.clone()
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        self.snapshot.borrow().clone()
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            log::warn!("Image queue driver is gone; command dropped");
        }
    }
}

/// Creates a queue; `driver.run()` must be spawned for anything to happen
pub fn image_queue<F: ImageFetcher>(
    config: ImageQueueConfig,
    urls: ImageUrlConfig,
    fetcher: F,
) -> (ImageQueueHandle, ImageQueueDriver<F>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(QueueSnapshot::default());

    let handle = ImageQueueHandle {
        commands: command_tx,
        snapshot: snapshot_rx,
    };
    let driver = ImageQueueDriver {
        controller: QueueController::new(config),
        urls,
        fetcher,
        commands: command_rx,
        snapshot: snapshot_tx,
    };
    (handle, driver)
}

type InFlight<'a> = LocalBoxFuture<'a, (Admission, Result<FetchResult<String>, Aborted>)>;

pub struct ImageQueueDriver<F> {
    controller: QueueController,
    urls: ImageUrlConfig,
    fetcher: F,
    commands: mpsc::UnboundedReceiver<Command>,
    snapshot: watch::Sender<QueueSnapshot>,
}

impl<F: ImageFetcher> ImageQueueDriver<F> {
    /// Runs until every handle has been dropped
    pub async fn run(self) {
        let ImageQueueDriver {
            mut controller,
            urls,
            fetcher,
            mut commands,
            snapshot,
        } = self;

        let mut requests: Vec<ImageRequest> = Vec::new();
        let mut in_flight: FuturesUnordered<InFlight<'_>> = FuturesUnordered::new();
        let mut aborts: HashMap<usize, AbortHandle> = HashMap::new();

        loop {
            let now = Instant::now();
            let polled = controller.poll(now);

            for index in polled.timed_out {
                if let Some(handle) = aborts.remove(&index) {
                    handle.abort();
                }
            }

            for admission in polled.admissions {
                let request = requests
                    .get(admission.chapter_index)
                    .cloned()
                    .unwrap_or_default();
                let url = build_image_url(
                    &urls,
                    request.prompt.as_deref(),
                    request.seed,
                    admission.retry_count,
                );

                let (abort, registration) = AbortHandle::new_pair();
                aborts.insert(admission.chapter_index, abort);

                let fetcher = &fetcher;
                in_flight.push(
                    async move {
                        let result = Abortable::new(fetcher.fetch(&url), registration).await;
                        (admission, result)
                    }
                    .boxed_local(),
                );
            }

            publish(&snapshot, &controller);

            let wake = controller
                .next_alarm()
                .unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        log::debug!("Image queue handles dropped; stopping driver");
                        break;
                    };
                    match command {
                        Command::Load(new_requests) => {
                            in_flight = FuturesUnordered::new();
                            aborts.clear();
                            let preloaded = new_requests.iter().map(|r| r.preloaded.clone()).collect();
                            requests = new_requests;
                            controller.load(preloaded);
                        }
                        Command::Retry(index) => {
                            if controller.status(index) == Some(LoadStatus::Loading) {
                                if let Some(handle) = aborts.remove(&index) {
                                    handle.abort();
                                }
                            }
                            controller.retry(index, Instant::now());
                        }
                        Command::Clear => {
                            in_flight = FuturesUnordered::new();
                            aborts.clear();
                            requests.clear();
                            controller.clear();
                        }
                    }
                }
                Some((admission, result)) = in_flight.next(), if !in_flight.is_empty() => {
                    match result {
                        Err(Aborted) => {}
                        Ok(outcome) => {
                            aborts.remove(&admission.chapter_index);
                            let outcome = outcome.map_err(|e| e.to_string());
                            controller.complete(admission, outcome, Instant::now());
                        }
                    }
                }
                _ = tokio::time::sleep_until(wake) => {}
            }
        }

        controller.clear();
        publish(&snapshot, &controller);
    }
}

fn publish(snapshot: &watch::Sender<QueueSnapshot>, controller: &QueueController) {
    let next = controller.snapshot();
    snapshot.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::message::{ImagePart, Message};
use crate::core::vendor::{VendorClient, VendorError};

/// Events reported by background vendor calls, tagged with their request id.
#[derive(Debug)]
pub enum RequestEvent {
    Fragment(String),
    Text(String),
    Images(Option<Vec<ImagePart>>),
    Enhanced(String),
    EnhanceFailed(VendorError),
    Failed(VendorError),
}

#[derive(Debug, Clone)]
pub enum RequestJob {
    Chat { history: Vec<Message>, model: String },
    Image { prompt: String },
    Enhance { prompt: String },
}

impl RequestJob {
    fn label(&self) -> &'static str {
        match self {
            RequestJob::Chat { .. } => "chat",
            RequestJob::Image { .. } => "image",
            RequestJob::Enhance { .. } => "enhance",
        }
    }
}

pub struct RequestParams {
    pub client: VendorClient,
    pub job: RequestJob,
    pub cancel_token: CancellationToken,
    pub request_id: u64,
}

/// Runs vendor calls off the UI task and funnels their results into one
/// channel. A cancelled request reports nothing.
#[derive(Clone)]
pub struct RequestService {
    tx: mpsc::UnboundedSender<(RequestEvent, u64)>,
}

impl RequestService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(RequestEvent, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn(&self, params: RequestParams) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let RequestParams {
                client,
                job,
                cancel_token,
                request_id,
            } = params;
            let label = job.label();
            debug!(request_id, job = label, "request started");

            tokio::select! {
                biased;
                _ = cancel_token.cancelled() => {
                    debug!(request_id, job = label, "request cancelled");
                }
                event = run_job(&client, job, &tx, request_id) => {
                    if let RequestEvent::Failed(err) | RequestEvent::EnhanceFailed(err) = &event {
                        warn!(request_id, job = label, "request failed: {err}");
                    }
                    let _ = tx.send((event, request_id));
                }
            }
        });
    }

    #[cfg(test)]
    pub fn send_for_test(&self, event: RequestEvent, request_id: u64) {
        let _ = self.tx.send((event, request_id));
    }
}

async fn run_job(
    client: &VendorClient,
    job: RequestJob,
    tx: &mpsc::UnboundedSender<(RequestEvent, u64)>,
    request_id: u64,
) -> RequestEvent {
    match job {
        RequestJob::Chat { history, model } => client
            .stream_chat(&history, &model, |fragment| {
                let _ = tx.send((RequestEvent::Fragment(fragment.to_string()), request_id));
            })
            .await
            .map_or_else(RequestEvent::Failed, RequestEvent::Text),
        RequestJob::Image { prompt } => client
            .generate_image(&prompt)
            .await
            .map_or_else(RequestEvent::Failed, RequestEvent::Images),
        RequestJob::Enhance { prompt } => client
            .enhance_prompt(&prompt)
            .await
            .map_or_else(RequestEvent::EnhanceFailed, RequestEvent::Enhanced),
    }
}

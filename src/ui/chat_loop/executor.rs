//! Runs the side effects the reducer asks for.

use std::path::PathBuf;

use tracing::warn;

use crate::core::app::{App, AppAction, AppActionContext, AppActionDispatcher, AppCommand};
use crate::core::chat_stream::{RequestParams, RequestService};
use crate::core::load_indicator::spawn_load_ticker;
use crate::core::vendor::VendorClient;
use crate::utils::images::write_images;

pub struct CommandExecutor {
    client: VendorClient,
    service: RequestService,
    dispatcher: AppActionDispatcher,
    image_dir: PathBuf,
}

impl CommandExecutor {
    pub fn new(
        client: VendorClient,
        service: RequestService,
        dispatcher: AppActionDispatcher,
        image_dir: PathBuf,
    ) -> Self {
        Self {
            client,
            service,
            dispatcher,
            image_dir,
        }
    }

    pub fn execute(&self, app: &mut App, command: AppCommand, ctx: AppActionContext) {
        match command {
            AppCommand::SpawnRequest {
                job,
                cancel_token,
                request_id,
                ramp,
            } => {
                self.service.spawn(RequestParams {
                    client: self.client.clone(),
                    job,
                    cancel_token,
                    request_id,
                });
                if ramp {
                    let dispatcher = self.dispatcher.clone();
                    let guard = spawn_load_ticker(move || {
                        dispatcher.dispatch(AppAction::LoadTick { request_id }, ctx)
                    });
                    app.attach_ticker(request_id, guard);
                }
            }
            AppCommand::SaveImages { session_id, images } => {
                let dispatcher = self.dispatcher.clone();
                let dir = self.image_dir.clone();
                tokio::spawn(async move {
                    let result = write_images(&dir, &session_id, &images)
                        .await
                        .map_err(|err| {
                            warn!(dir = %dir.display(), "saving images failed: {err}");
                            err.to_string()
                        });
                    dispatcher.dispatch(AppAction::ImagesSaved { result }, ctx);
                });
            }
        }
    }
}

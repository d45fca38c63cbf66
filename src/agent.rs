use tracing::{debug, warn};

use crate::config::Config;
use crate::conversation::{Conversation, system_instruction};
use crate::inputs::InputFile;
use crate::model::{GenerateError, GenerateRequest, GenerateResult, RESPONSE_MIME_TYPE};
use crate::model_gateway::ModelGateway;

pub struct Agent<'a, G> {
    gateway: G,
    cfg: &'a Config,
}

impl<'a, G> Agent<'a, G>
where
    G: ModelGateway,
{
    pub fn new(gateway: G, cfg: &'a Config) -> Self {
        Self { gateway, cfg }
    }

    /// Uploads every file in order, then sends a single generation request.
    /// The first failed upload aborts the call; files already uploaded are left
    /// on the remote side.
    pub async fn respond(
        &self,
        messages: &[String],
        uploads: &[InputFile],
    ) -> GenerateResult<Vec<String>> {
        let conversation = Conversation::build(messages, self.cfg.role_marker.as_deref())
            .ok_or_else(|| GenerateError::Other("at least one message is required".to_string()))?;

        let mut files = Vec::with_capacity(uploads.len());
        for file in uploads {
            let uploaded = self.gateway.upload(file).await.map_err(|err| {
                warn!(path = %file.path.display(), error = %err, "file upload failed");
                GenerateError::upload_failed(&file.path, &err)
            })?;
            files.push(uploaded);
        }

        let request = GenerateRequest {
            model: self.cfg.model.clone(),
            system_instruction: system_instruction(&self.cfg.instructions),
            turns: conversation.into_turns(),
            files,
            response_mime_type: RESPONSE_MIME_TYPE,
        };
        debug!(
            model = %request.model,
            turn_count = request.turns.len(),
            file_count = request.files.len(),
            "dispatching generate request"
        );

        let text = self.gateway.generate(&request).await?;
        Ok(vec![text])
    }
}

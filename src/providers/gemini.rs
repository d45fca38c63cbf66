use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::inputs::InputFile;
use crate::model::{GenerateError, GenerateRequest, GenerateResult, Role, Turn, UploadedFile};
use crate::providers::http_errors::{api_request_error, api_status_error, missing_api_key};

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";
const DEFAULT_UPLOAD_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    File {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct UploadStartRequest {
    file: UploadStartFile,
}

#[derive(Debug, Serialize)]
struct UploadStartFile {
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: RemoteFile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteFile {
    name: String,
    uri: String,
    #[serde(default)]
    mime_type: Option<String>,
}

fn generate_url(base_url: &str, model: &str) -> String {
    let model = model.strip_prefix("models/").unwrap_or(model);
    format!(
        "{}/v1beta/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

fn upload_start_url(base_url: &str) -> String {
    format!("{}/upload/v1beta/files", base_url.trim_end_matches('/'))
}

fn text_content(turn: &Turn) -> Content {
    Content {
        role: Some(turn.role.as_str()),
        parts: vec![Part::Text {
            text: turn.text.clone(),
        }],
    }
}

fn file_content(file: &UploadedFile) -> Content {
    Content {
        role: Some(Role::User.as_str()),
        parts: vec![Part::File {
            file_data: FileData {
                mime_type: file.mime_type.clone(),
                file_uri: file.uri.clone(),
            },
        }],
    }
}

fn to_gemini_request(request: &GenerateRequest) -> GenerateContentRequest {
    let contents = request
        .turns
        .iter()
        .map(text_content)
        .chain(request.files.iter().map(file_content))
        .collect();

    GenerateContentRequest {
        contents,
        system_instruction: Content {
            role: None,
            parts: vec![Part::Text {
                text: request.system_instruction.clone(),
            }],
        },
        generation_config: GenerationConfig {
            response_mime_type: request.response_mime_type,
        },
    }
}

fn response_text(parsed: GenerateContentResponse) -> GenerateResult<String> {
    let Some(candidate) = parsed.candidates.into_iter().next() else {
        let reason = parsed
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(GenerateError::Other(format!(
            "Gemini API returned no response: {reason}"
        )));
    };

    Ok(candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default())
}

fn api_key(cfg: &Config) -> GenerateResult<&str> {
    cfg.api_key.as_deref().ok_or_else(missing_api_key)
}

async fn error_for_status(response: reqwest::Response, api_url: &str) -> GenerateError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read response body>".to_string());
    warn!(
        api_url = %api_url,
        status = %status,
        response_body_len = body.len(),
        "gemini returned non-success status"
    );
    api_status_error(status, api_url, &body)
}

pub async fn generate(
    client: &Client,
    cfg: &Config,
    request: &GenerateRequest,
) -> GenerateResult<String> {
    let key = api_key(cfg)?;
    let api_url = generate_url(&cfg.base_url, &request.model);
    let body = to_gemini_request(request);
    debug!(
        api_url = %api_url,
        model = %request.model,
        turn_count = request.turns.len(),
        file_count = request.files.len(),
        "sending gemini generate request"
    );

    let response = client
        .post(&api_url)
        .header(API_KEY_HEADER, key)
        .json(&body)
        .send()
        .await
        .map_err(|err| {
            warn!(api_url = %api_url, error = %err, "gemini request failed");
            api_request_error(err, &api_url)
        })?;

    if !response.status().is_success() {
        return Err(error_for_status(response, &api_url).await);
    }

    let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
        GenerateError::Other(format!("Failed to parse Gemini response: {err}"))
    })?;
    let text = response_text(parsed)?;
    debug!(
        model = %request.model,
        response_len = text.len(),
        "received gemini response"
    );
    Ok(text)
}

/// Resumable upload: a start request returns the session URL, then the bytes
/// are sent with `upload, finalize`.
pub async fn upload(
    client: &Client,
    cfg: &Config,
    file: &InputFile,
) -> GenerateResult<UploadedFile> {
    let key = api_key(cfg)?;
    let bytes = tokio::fs::read(&file.path).await.map_err(|err| {
        GenerateError::Other(format!("could not read {}: {err}", file.path.display()))
    })?;
    let mime_type = file.mime_type().unwrap_or(DEFAULT_UPLOAD_MIME_TYPE);
    let display_name = file
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.path.display().to_string());

    let start_url = upload_start_url(&cfg.base_url);
    debug!(
        api_url = %start_url,
        path = %file.path.display(),
        mime_type = %mime_type,
        size = bytes.len(),
        "starting gemini file upload"
    );

    let start = client
        .post(&start_url)
        .header(API_KEY_HEADER, key)
        .header("X-Goog-Upload-Protocol", "resumable")
        .header("X-Goog-Upload-Command", "start")
        .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
        .header("X-Goog-Upload-Header-Content-Type", mime_type)
        .json(&UploadStartRequest {
            file: UploadStartFile { display_name },
        })
        .send()
        .await
        .map_err(|err| api_request_error(err, &start_url))?;

    if !start.status().is_success() {
        return Err(error_for_status(start, &start_url).await);
    }

    let session_url = start
        .headers()
        .get(UPLOAD_URL_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| {
            GenerateError::Other(format!(
                "Gemini upload start at '{start_url}' returned no {UPLOAD_URL_HEADER} header"
            ))
        })?;

    let finished = client
        .post(&session_url)
        .header("X-Goog-Upload-Offset", "0")
        .header("X-Goog-Upload-Command", "upload, finalize")
        .body(bytes)
        .send()
        .await
        .map_err(|err| api_request_error(err, &session_url))?;

    if !finished.status().is_success() {
        return Err(error_for_status(finished, &session_url).await);
    }

    let parsed: UploadResponse = finished.json().await.map_err(|err| {
        GenerateError::Other(format!("Failed to parse Gemini upload response: {err}"))
    })?;
    debug!(name = %parsed.file.name, uri = %parsed.file.uri, "uploaded file");

    Ok(UploadedFile {
        name: parsed.file.name,
        uri: parsed.file.uri,
        mime_type: parsed.file.mime_type.unwrap_or_else(|| mime_type.to_string()),
    })
}

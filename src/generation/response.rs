//! Service response handling.
//!
//! The service is asked for bare JSON. A single enclosing fence is tolerated;
//! anything else (prose around the object, nested or unbalanced fences) is a
//! malformed response.

use crate::artifact::Artifact;
use crate::error::ForgeError;

const FENCE: &str = "```";

/// Extract the JSON document from raw service output.
pub fn extract_notebook_json(raw: &str) -> Result<&str, ForgeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ForgeError::EmptyResponse);
    }
    if trimmed.starts_with('{') {
        return Ok(trimmed);
    }
    if !trimmed.starts_with(FENCE) {
        return Err(ForgeError::MalformedResponse(
            "response does not start with a JSON object".to_string(),
        ));
    }
    strip_fence(trimmed)
}

fn strip_fence(fenced: &str) -> Result<&str, ForgeError> {
    let (opening, rest) = fenced.split_once('\n').ok_or_else(|| {
        ForgeError::MalformedResponse("fenced response has no content".to_string())
    })?;
    let language = opening.trim()[FENCE.len()..].trim();
    if !(language.is_empty() || language.eq_ignore_ascii_case("json")) {
        return Err(ForgeError::MalformedResponse(format!(
            "unexpected fence language '{}'",
            language
        )));
    }

    let (body, closing) = rest.rsplit_once('\n').unwrap_or(("", rest));
    if closing.trim() != FENCE {
        return Err(ForgeError::MalformedResponse(
            "fenced response is not closed".to_string(),
        ));
    }
    if body.lines().any(|line| line.trim_start().starts_with(FENCE)) {
        return Err(ForgeError::MalformedResponse(
            "response contains more than one fenced block".to_string(),
        ));
    }

    let body = body.trim();
    if body.is_empty() {
        return Err(ForgeError::EmptyResponse);
    }
    Ok(body)
}

/// Parse raw service output into an artifact.
///
/// `truncated` marks output cut off at the token ceiling; it only changes the
/// error message.
pub fn parse_artifact(raw: &str, truncated: bool) -> Result<Artifact, ForgeError> {
    let json = extract_notebook_json(raw)?;
    Artifact::from_json_str(json).map_err(|e| {
        if truncated {
            ForgeError::MalformedResponse(format!(
                "output was truncated at the token ceiling and does not parse: {}",
                e
            ))
        } else {
            ForgeError::MalformedResponse(format!("output is not a valid notebook: {}", e))
        }
    })
}

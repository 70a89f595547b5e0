use serde_json::{json, Value};

use crate::site::ChangeRequest;

/// Framing sent ahead of the site files on every request.
pub const SYSTEM_FRAMING: &str = "\
You are an expert web developer. The user wants to modify their website.
Based on the user's request, update the provided website files or create new ones.
If you create a new HTML file, you MUST also update an existing file (like index.html) to link to it.
You MUST return ONLY the updated and newly created files in a JSON object with a 'files' property. \
Each file object must have 'name' and 'content' properties. Do not return files that are not changed.";

/// Build the full prompt for a change request.
///
/// Every current file is included verbatim, labeled with its name, followed
/// by the user's instruction.
pub fn build_prompt(request: &ChangeRequest) -> String {
    let files = request
        .files
        .iter()
        .map(|file| format!("--- File: {} ---\n{}", file.name, file.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{}\n\nCurrent files:\n{}\n\nUser Request: \"{}\"",
        SYSTEM_FRAMING, files, request.instruction
    )
}

/// Response schema in the format accepted by Gemini's `responseSchema`.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "files": {
                "type": "ARRAY",
                "description": "An array of files to update or create. For updates, include the full new content. \
                    For creations, provide the new filename and content. Only include files that have changed or are new.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": {
                            "type": "STRING",
                            "description": "The filename, e.g., index.html or about.html"
                        },
                        "content": {
                            "type": "STRING",
                            "description": "The complete new code content for the file."
                        }
                    },
                    "required": ["name", "content"]
                }
            }
        },
        "required": ["files"]
    })
}

/// Instructions appended to the framing for models that cannot enforce a
/// schema themselves.
pub fn json_only_preamble() -> String {
    format!(
        "{}\n\nRespond with a single JSON object and nothing else, shaped exactly like:\n\
         {{\"files\": [{{\"name\": \"index.html\", \"content\": \"<full file content>\"}}]}}\n\
         Return {{\"files\": []}} when no change is needed.",
        SYSTEM_FRAMING
    )
}

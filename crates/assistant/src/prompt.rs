//! Prompt templates sent by the assistant.

use smithers_core::ContextEntry;

/// Fold retrieved entries into the user's question.
///
/// Each snippet is cut to `snippet_chars` characters without a marker.
pub fn rag_prompt(query: &str, matches: &[(usize, &ContextEntry)], snippet_chars: usize) -> String {
    let context = matches
        .iter()
        .map(|(_, entry)| {
            let snippet: String = entry.content.chars().take(snippet_chars).collect();
            format!("[{}]: {}", entry.role, snippet)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("Relevant context:\n{context}\n\nUser question: {query}")
}

/// Instruction asking the model to summarize `preview`.
pub fn compaction_prompt(preview: &str) -> String {
    format!(
        "You are helping to compact and summarize context. Here's the current context:\n\n\
         {preview}\n\n\
         Please provide a concise summary that captures the key information. Keep it brief and actionable."
    )
}

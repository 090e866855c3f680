//! The question-answering prompt.

use crate::models::RetrievedChunk;

const TEMPLATE: &str = "You are a helpful AI assistant analyzing code and documents.
Use the following pieces of context to answer the question at the end.
If you don't know the answer based on the context, just say so - don't make up an answer.

Context:
{context}

Question: {question}

Provide a clear and detailed answer based on the context above:";

/// Join retrieved chunk contents with a blank line between them.
pub fn format_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Fill the template with `context` and `question`.
pub fn build_prompt(context: &str, question: &str) -> String {
    // Substitute the question first so a `{context}` inside it stays literal.
    TEMPLATE
        .replacen("{question}", question, 1)
        .replacen("{context}", context, 1)
}

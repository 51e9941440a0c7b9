
use crate::store::qdrant::ScoredPoint;

/// Instructions sent ahead of every synthesis request.
pub const SYSTEM_PROMPT: &str = "You are a document analysis assistant helping users understand \
and search a document repository.

Guidelines:
- Answer using only the provided passages; do not invent facts that are not in them.
- Always name the source document(s) you drew from, e.g. (source: guide.md).
- Combine information from several passages when it produces a more complete answer.
- If the passages do not contain the answer, say so plainly instead of guessing.
- Quote short relevant excerpts where it helps, and keep the answer concise.";

/// Returned verbatim when retrieval comes up empty after all attempts.
pub const NO_RESULTS_ANSWER: &str =
    "I could not find any relevant information in the document collection for this question.";

/// Format retrieved passages into a context block, each labeled with the
/// document it came from.
pub fn build_context(hits: &[ScoredPoint]) -> String {
    let mut sections = Vec::with_capacity(hits.len());

    for hit in hits {
        sections.push(format!(
            "[source: {}]\n{}",
            hit.payload.document_name,
            hit.payload.text.trim()
        ));
    }

    sections.join("\n\n---\n\n")
}

/// Build the complete prompt sent to the chat model.
pub fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "{SYSTEM_PROMPT}\n\n=== Retrieved passages ===\n\n{context}\n\n=== Question ===\n\n{query}"
    )
}

/// Prompt asking the chat model to broaden a query that retrieved nothing
/// useful. The model must reply with the rewritten query only.
pub fn build_reformulation_prompt(original: &str, previous: &str) -> String {
    format!(
        "A search over a document collection using the query below returned no useful results. \
Rewrite it as a broader search query: use more general terms, synonyms, or split compound \
concepts. Respond with the rewritten query only, on a single line, with no explanation.\n\n\
Original question: {original}\nPrevious query: {previous}"
    )
}

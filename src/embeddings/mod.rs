// Embedding and language-model access
// All model calls go through a local Ollama server

pub mod ollama;

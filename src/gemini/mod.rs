mod client;

pub use client::{
    ClientFactory, CompletionClient, CompletionRequest, CompletionResponse, GeminiClient,
    GeminiClientFactory, generate_content,
};

//! LLM refiner implementations.

pub mod gemini;

pub use gemini::GeminiRefiner;

pub mod error;
pub mod ollama_client;
pub mod parser;
pub mod preprocess;
pub mod recognizer;
pub mod scanner;

pub use error::{Result, ScannerError};
pub use parser::ScoreLine;
pub use recognizer::{OllamaRecognizer, TextRecognizer};
pub use scanner::ScreenshotScanner;

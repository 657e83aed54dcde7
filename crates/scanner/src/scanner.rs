use std::sync::Arc;

use crate::error::Result;
use crate::parser::{ScoreLine, parse_text};
use crate::preprocess::{CropRegion, ThresholdParams, prepare_scoreboard};
use crate::recognizer::TextRecognizer;

/// Screenshot to scoreboard rows: preprocess, recognize, parse
#[derive(Clone)]
pub struct ScreenshotScanner {
    recognizer: Arc<dyn TextRecognizer>,
    region: CropRegion,
    threshold: ThresholdParams,
}

impl ScreenshotScanner {
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            recognizer,
            region: CropRegion::SCOREBOARD,
            threshold: ThresholdParams::default(),
        }
    }

    pub fn with_region(mut self, region: CropRegion) -> Self {
        self.region = region;
        self
    }

    /// Decode and binarize off the async runtime; returns the PNG sent for recognition
    pub async fn prepare(&self, image: Vec<u8>) -> Result<Vec<u8>> {
        let (region, threshold) = (self.region, self.threshold);
        tokio::task::spawn_blocking(move || prepare_scoreboard(&image, region, threshold)).await?
    }

    pub async fn scan(&self, image: Vec<u8>) -> Result<Vec<ScoreLine>> {
        let png = self.prepare(image).await?;
        let text = self.recognizer.recognize(&png).await?;

        let lines = parse_text(&text);
        tracing::info!(
            "Recognized {} scoreboard rows from {} lines of text",
            lines.len(),
            text.lines().count()
        );

        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScannerError;
    use async_trait::async_trait;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    struct CannedRecognizer(&'static str);

    #[async_trait]
    impl TextRecognizer for CannedRecognizer {
        async fn recognize(&self, png: &[u8]) -> Result<String> {
            image::load_from_memory(png)?;
            Ok(self.0.to_string())
        }
    }

    fn screenshot() -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(320, 180, Rgb([200, 200, 200])))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[tokio::test]
    async fn scan_returns_parsed_rows() {
        let scanner = ScreenshotScanner::new(Arc::new(CannedRecognizer(
            "PLAYER KILLS\nGhost 12 3 1450\nbravo six 4 1 600\n",
        )));

        let lines = scanner.scan(screenshot()).await.unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].gamertag, "Ghost");
        assert_eq!(lines[1].gamertag, "bravo six");
        assert_eq!((lines[1].kills, lines[1].revives), (4, 1));
    }

    #[tokio::test]
    async fn scan_rejects_non_images() {
        let scanner = ScreenshotScanner::new(Arc::new(CannedRecognizer("Ghost 1 1 1")));

        let err = scanner.scan(b"GIF89a but not really".to_vec()).await.unwrap_err();
        assert!(matches!(err, ScannerError::Decode(_)));
    }
}

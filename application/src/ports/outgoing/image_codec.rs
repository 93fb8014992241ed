use crate::error::AppResult;
use domain::bitmap::RgbaBitmap;
use std::sync::Arc;

pub trait ImageCodecPort: Send + Sync {
    fn decode(&self, encoded: &[u8]) -> AppResult<RgbaBitmap>;
    fn encode_png(&self, bitmap: &RgbaBitmap) -> AppResult<Vec<u8>>;
}

pub type DynImageCodecPort = Arc<dyn ImageCodecPort>;

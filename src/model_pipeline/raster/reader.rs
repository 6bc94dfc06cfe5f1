use crate::model_pipeline::common::error::Result;
use crate::model_pipeline::raster::types::RasterImage;

pub trait RasterReader {
    fn read_raster(&self, data: &[u8]) -> Result<RasterImage>;
}

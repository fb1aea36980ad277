//! JSON 响应模型
//!
//! 接口错误统一为 `{ code, stage, message }`，与页面横幅使用同一套错误码。

use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::Reply;

use crate::image_handler::ImageError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageCommandError {
    pub code: &'static str,
    pub stage: &'static str,
    pub message: String,
}

impl ImageCommandError {
    pub fn missing_file() -> Self {
        Self {
            code: "missing_file",
            stage: "upload",
            message: "no file was uploaded in the `file` field".to_string(),
        }
    }

    pub fn into_response(self, status: StatusCode) -> Response {
        warp::reply::with_status(warp::reply::json(&self), status).into_response()
    }
}

impl From<ImageError> for ImageCommandError {
    fn from(error: ImageError) -> Self {
        Self {
            code: error.code(),
            stage: error.stage(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_error_maps_to_command_error() {
        let err = ImageCommandError::from(ImageError::Encode("gif palette".to_string()));

        assert_eq!(err.code, "encode_failed");
        assert_eq!(err.stage, "encode");
        assert_eq!(err.message, "Could not re-encode image: gif palette");
    }

    #[test]
    fn encoder_failure_reports_encode_stage() {
        use crate::image_handler::{DecodedImage, ImageConfig, ImageHandler, ImageKind};
        use image::{DynamicImage, ImageBuffer, Rgba};

        let width = u32::from(u16::MAX) + 1;
        let decoded = DecodedImage {
            width,
            height: 1,
            format: Some(ImageKind::Gif),
            raster: DynamicImage::ImageRgba8(ImageBuffer::from_pixel(width, 1, Rgba([0u8, 0, 0, 255]))),
        };
        let handler = ImageHandler::new(ImageConfig::default()).expect("handler init failed");
        let error = handler.reencode(&decoded).expect_err("gif width overflow should fail");

        let json = serde_json::to_value(ImageCommandError::from(error)).expect("serialize");

        assert_eq!(json["code"], "encode_failed");
        assert_eq!(json["stage"], "encode");
    }

    #[test]
    fn serializes_to_flat_json() {
        let json = serde_json::to_value(ImageCommandError::missing_file()).expect("serialize");

        assert_eq!(json["code"], "missing_file");
        assert_eq!(json["stage"], "upload");
    }
}

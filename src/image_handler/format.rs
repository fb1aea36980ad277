//! # 格式模型
//!
//! 受支持的图片格式以枚举表达，扩展名、MIME 与编解码格式之间的映射集中在这里，
//! 入口处据此做防御性校验，而不是信任文件选择器。

use std::fmt;

use image::ImageFormat;
use serde::Serialize;

/// 受支持的图片格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Bmp,
    WebP,
}

impl ImageKind {
    /// 全部受支持格式，顺序即页面展示顺序。
    pub const ALL: [ImageKind; 5] = [Self::Png, Self::Jpeg, Self::Gif, Self::Bmp, Self::WebP];

    /// 文件选择器允许的扩展名。
    pub const EXTENSIONS: [&'static str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// 按扩展名解析（大小写不敏感，不含点）。
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// 按文件名最后一个 `.` 之后的部分解析。
    pub fn from_filename(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// 按 MIME 解析，忽略 `;` 之后的参数，兼容常见别名。
    pub fn from_mime(mime: &str) -> Option<Self> {
        let base = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match base.as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/gif" => Some(Self::Gif),
            "image/bmp" | "image/x-bmp" | "image/x-ms-bmp" => Some(Self::Bmp),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// 编解码库报告的格式；不在受支持集合内的格式返回 `None`。
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Gif => Some(Self::Gif),
            ImageFormat::Bmp => Some(Self::Bmp),
            ImageFormat::WebP => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::WebP => "image/webp",
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Gif => ImageFormat::Gif,
            Self::Bmp => ImageFormat::Bmp,
            Self::WebP => ImageFormat::WebP,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Gif => "GIF",
            Self::Bmp => "BMP",
            Self::WebP => "WEBP",
        }
    }

    /// 文件选择器 `accept` 属性值，例如 `.png,.jpg,...`。
    pub fn accept_attribute() -> String {
        Self::EXTENSIONS
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_case_insensitive() {
        assert_eq!(ImageKind::from_filename("photo.JPG"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_filename("a.b.WebP"), Some(ImageKind::WebP));
        assert_eq!(ImageKind::from_filename("notes.txt"), None);
        assert_eq!(ImageKind::from_filename("no_extension"), None);
    }

    #[test]
    fn every_allowed_extension_maps_to_a_kind() {
        for ext in ImageKind::EXTENSIONS {
            assert!(ImageKind::from_extension(ext).is_some(), "{ext} should be allowed");
        }
    }

    #[test]
    fn mime_parser_accepts_aliases_and_params() {
        assert_eq!(ImageKind::from_mime("image/png; charset=binary"), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_mime("IMAGE/JPG"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_mime("image/x-ms-bmp"), Some(ImageKind::Bmp));
        assert_eq!(ImageKind::from_mime("text/plain"), None);
    }

    #[test]
    fn mime_and_codec_mappings_agree() {
        for kind in ImageKind::ALL {
            assert_eq!(ImageKind::from_mime(kind.mime()), Some(kind));
            assert_eq!(ImageKind::from_image_format(kind.image_format()), Some(kind));
        }
        assert_eq!(ImageKind::from_image_format(ImageFormat::Tiff), None);
    }

    #[test]
    fn accept_attribute_lists_all_extensions() {
        assert_eq!(
            ImageKind::accept_attribute(),
            ".png,.jpg,.jpeg,.gif,.bmp,.webp"
        );
    }
}

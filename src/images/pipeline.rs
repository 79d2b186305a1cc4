use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, ImageFormat};
use thiserror::Error;
use tracing::debug;

/// The only payload encoding accepted for uploads.
pub const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";
/// Thumbnails fit inside a square of this many pixels.
pub const THUMBNAIL_BOX: u32 = 500;
const JPEG_QUALITY: u8 = 90;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("photo must be a data URI starting with \"data:image/jpeg;base64,\"")]
    MissingPrefix,
    #[error("photo payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("photo is not a decodable JPEG: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode JPEG: {0}")]
    Encode(#[source] image::ImageError),
    #[error("image worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Re-encoded original plus its thumbnail derivative.
#[derive(Debug, Clone)]
pub struct DerivedAsset {
    pub original: Bytes,
    pub thumbnail: Bytes,
}

pub fn decode_payload(payload: &str) -> Result<Vec<u8>, AssetError> {
    let encoded = payload
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or(AssetError::MissingPrefix)?;
    Ok(STANDARD.decode(encoded.trim())?)
}

/// Decodes a data-URI JPEG and produces the original and thumbnail JPEGs.
///
/// Pure and deterministic: the same payload always yields the same bytes.
pub fn derive(payload: &str) -> Result<DerivedAsset, AssetError> {
    let raw = decode_payload(payload)?;
    let source = image::load_from_memory_with_format(&raw, ImageFormat::Jpeg)
        .map_err(AssetError::Decode)?;
    let source = DynamicImage::ImageRgb8(source.to_rgb8());
    let thumbnail = fit_within(&source, THUMBNAIL_BOX);
    debug!(
        width = source.width(),
        height = source.height(),
        thumb_width = thumbnail.width(),
        thumb_height = thumbnail.height(),
        "photo derived"
    );
    Ok(DerivedAsset {
        original: encode_jpeg(&source)?,
        thumbnail: encode_jpeg(&thumbnail)?,
    })
}

/// Runs [`derive`] on the blocking pool so decode/resize never stalls the reactor.
pub async fn derive_blocking(payload: String) -> Result<DerivedAsset, AssetError> {
    tokio::task::spawn_blocking(move || derive(&payload)).await?
}

/// Scales down to fit `bound`×`bound`, keeping aspect ratio. Never upscales or crops.
fn fit_within(img: &DynamicImage, bound: u32) -> DynamicImage {
    if img.width() <= bound && img.height() <= bound {
        return img.clone();
    }
    img.resize(bound, bound, FilterType::Lanczos3)
}

fn encode_jpeg(img: &DynamicImage) -> Result<Bytes, AssetError> {
    let mut buf = Vec::new();
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY))
        .map_err(AssetError::Encode)?;
    Ok(Bytes::from(buf))
}

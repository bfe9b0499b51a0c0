//! # Payment Proof Payloads
//!
//! A payment proof arrives either as an existing reference (a path or URL
//! stored earlier) or as an embedded image:
//!
//! ```text
//! "uploads/payment_proofs/proof_ab12.png"         → Reference (pass-through)
//! "data:image/png;base64,iVBORw0KGgo..."          → Image { Png, bytes }
//! "data:image/webp;base64,UklGR..."               → Image { Jpg, bytes }  (unrecognized subtype)
//! "data:image/png,not-base64"                     → ProofError
//! ```
//!
//! Writing the bytes somewhere is the caller's job (`atlas_db::artifacts`).

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;

use crate::error::ProofError;

/// Standard alphabet, padding optional.
const PROOF_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// File extension a decoded proof is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageExtension {
    Png,
    Gif,
    Jpg,
}

impl ImageExtension {
    /// Maps a declared `image/<subtype>`; anything unrecognized is `jpg`.
    pub fn from_subtype(subtype: Option<&str>) -> Self {
        match subtype.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("png") => ImageExtension::Png,
            Some("gif") => ImageExtension::Gif,
            _ => ImageExtension::Jpg,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageExtension::Png => "png",
            ImageExtension::Gif => "gif",
            ImageExtension::Jpg => "jpg",
        }
    }
}

/// A decoded embedded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofImage {
    pub extension: ImageExtension,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofPayload {
    /// Already a stable reference; stored as-is.
    Reference(String),
    /// Needs to be written to the artifact store.
    Image(ProofImage),
}

impl ProofPayload {
    /// Classifies and decodes a raw proof value.
    ///
    /// Blank input means "no proof" and yields `Ok(None)`.
    pub fn parse(raw: &str) -> Result<Option<Self>, ProofError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        let Some(rest) = raw.strip_prefix("data:") else {
            return Ok(Some(ProofPayload::Reference(raw.to_string())));
        };

        let (header, body) = rest.split_once(',').ok_or(ProofError::NotBase64DataUri)?;
        let mut params = header.split(';');
        let media_type = params.next().unwrap_or_default().trim();
        if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
            return Err(ProofError::NotBase64DataUri);
        }

        let subtype = if media_type.is_empty() {
            None
        } else {
            let (kind, subtype) = media_type
                .split_once('/')
                .ok_or_else(|| ProofError::UnsupportedMediaType(media_type.to_string()))?;
            if !kind.eq_ignore_ascii_case("image") {
                return Err(ProofError::UnsupportedMediaType(media_type.to_string()));
            }
            Some(subtype)
        };

        let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = PROOF_BASE64.decode(compact.as_bytes())?;
        if bytes.is_empty() {
            return Err(ProofError::Empty);
        }

        Ok(Some(ProofPayload::Image(ProofImage {
            extension: ImageExtension::from_subtype(subtype),
            bytes,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent GIF
    const GIF_B64: &str = "R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7";

    #[test]
    fn test_blank_means_no_proof() {
        assert_eq!(ProofPayload::parse("").unwrap(), None);
        assert_eq!(ProofPayload::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_reference_passes_through() {
        let parsed = ProofPayload::parse("uploads/payment_proofs/proof_1.png").unwrap();
        assert_eq!(
            parsed,
            Some(ProofPayload::Reference("uploads/payment_proofs/proof_1.png".to_string()))
        );
    }

    #[test]
    fn test_declared_subtypes() {
        let raw = format!("data:image/gif;base64,{GIF_B64}");
        let Some(ProofPayload::Image(image)) = ProofPayload::parse(&raw).unwrap() else {
            panic!("expected image");
        };
        assert_eq!(image.extension, ImageExtension::Gif);
        assert_eq!(&image.bytes[..6], b"GIF89a");

        let raw = format!("data:image/PNG;base64,{GIF_B64}");
        let Some(ProofPayload::Image(image)) = ProofPayload::parse(&raw).unwrap() else {
            panic!("expected image");
        };
        assert_eq!(image.extension, ImageExtension::Png);
    }

    #[test]
    fn test_unrecognized_or_missing_subtype_defaults_to_jpg() {
        for header in ["data:image/jpeg;base64,", "data:image/webp;base64,", "data:;base64,"] {
            let raw = format!("{header}{GIF_B64}");
            let Some(ProofPayload::Image(image)) = ProofPayload::parse(&raw).unwrap() else {
                panic!("expected image for {header}");
            };
            assert_eq!(image.extension, ImageExtension::Jpg);
        }
    }

    #[test]
    fn test_unpadded_and_wrapped_base64_decodes() {
        let wrapped = format!("data:image/gif;base64,{}\n{}", &GIF_B64[..20], &GIF_B64[20..]);
        assert!(matches!(ProofPayload::parse(&wrapped), Ok(Some(ProofPayload::Image(_)))));

        // "YWJj" = "abc", "YWI" = "ab" without padding
        let Some(ProofPayload::Image(image)) = ProofPayload::parse("data:image/png;base64,YWI").unwrap() else {
            panic!("expected image");
        };
        assert_eq!(image.bytes, b"ab");
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(
            ProofPayload::parse("data:image/png,plain"),
            Err(ProofError::NotBase64DataUri)
        ));
        assert!(matches!(
            ProofPayload::parse("data:image/png;base64"),
            Err(ProofError::NotBase64DataUri)
        ));
        assert!(matches!(
            ProofPayload::parse("data:application/pdf;base64,YWJj"),
            Err(ProofError::UnsupportedMediaType(_))
        ));
        assert!(matches!(
            ProofPayload::parse("data:image/png;base64,@@@@"),
            Err(ProofError::Decode(_))
        ));
        assert!(matches!(
            ProofPayload::parse("data:image/png;base64,"),
            Err(ProofError::Empty)
        ));
    }
}

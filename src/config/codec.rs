//! Audio codec identifiers and the A2DP capability table

use std::fmt;

use bytes::Bytes;

/// Audio codec carried by a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// No audio codec (RFCOMM control channel)
    None,
    /// A2DP mandatory SBC
    Sbc,
    /// MPEG-2/4 AAC
    Aac,
    /// Qualcomm aptX (vendor codec)
    AptX,
    /// Sony LDAC (vendor codec)
    Ldac,
    /// HFP narrow-band CVSD
    Cvsd,
    /// HFP wide-band mSBC
    Msbc,
}

/// A2DP media codec type: SBC
pub const A2DP_CODEC_SBC: u8 = 0x00;
/// A2DP media codec type: MPEG-2/4 AAC
pub const A2DP_CODEC_MPEG24: u8 = 0x02;
/// A2DP media codec type: vendor specific
pub const A2DP_CODEC_VENDOR: u8 = 0xFF;

/// HFP codec id: CVSD
pub const HFP_CODEC_CVSD: u8 = 0x01;
/// HFP codec id: mSBC
pub const HFP_CODEC_MSBC: u8 = 0x02;

impl Codec {
    /// Codec id as negotiated on the wire (A2DP media codec type or HFP codec id)
    pub fn id(&self) -> Option<u8> {
        match self {
            Codec::None => None,
            Codec::Sbc => Some(A2DP_CODEC_SBC),
            Codec::Aac => Some(A2DP_CODEC_MPEG24),
            Codec::AptX | Codec::Ldac => Some(A2DP_CODEC_VENDOR),
            Codec::Cvsd => Some(HFP_CODEC_CVSD),
            Codec::Msbc => Some(HFP_CODEC_MSBC),
        }
    }

    /// Whether the codec is used by A2DP transports
    pub fn is_a2dp(&self) -> bool {
        matches!(self, Codec::Sbc | Codec::Aac | Codec::AptX | Codec::Ldac)
    }

    /// Whether the codec is used by SCO (HFP/HSP) transports
    pub fn is_sco(&self) -> bool {
        matches!(self, Codec::Cvsd | Codec::Msbc)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Codec::None => "none",
            Codec::Sbc => "SBC",
            Codec::Aac => "AAC",
            Codec::AptX => "aptX",
            Codec::Ldac => "LDAC",
            Codec::Cvsd => "CVSD",
            Codec::Msbc => "mSBC",
        };
        f.write_str(name)
    }
}

/// Direction of an A2DP stream end point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecDirection {
    /// We encode and send audio
    Source,
    /// We receive and decode audio
    Sink,
}

/// One advertised A2DP stream end point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecCapabilities {
    pub codec: Codec,
    pub direction: CodecDirection,
    /// Codec specific information element as advertised over AVDTP
    pub capabilities: Bytes,
}

impl CodecCapabilities {
    pub fn new(codec: Codec, direction: CodecDirection, capabilities: Bytes) -> Self {
        Self {
            codec,
            direction,
            capabilities,
        }
    }
}

// SBC: all frequencies and channel modes, all block lengths, both subband
// counts, both allocation methods, bitpool 2..53.
const SBC_CAPS: &[u8] = &[0xFF, 0xFF, 2, 53];

// AAC: MPEG-2/4 LC, 8..48 kHz, mono and stereo, VBR up to 320 kbit/s.
#[cfg(feature = "aac")]
const AAC_CAPS: &[u8] = &[0xC0, 0xFF, 0xFC, 0x84, 0xE2, 0x00];

// aptX: vendor 0x0000004F, codec 0x0001, 16..48 kHz stereo.
#[cfg(feature = "aptx")]
const APTX_CAPS: &[u8] = &[0x4F, 0x00, 0x00, 0x00, 0x01, 0x00, 0xF2];

// LDAC: vendor 0x0000012D, codec 0x00AA, 44.1..96 kHz, all channel modes.
#[cfg(feature = "ldac")]
const LDAC_CAPS: &[u8] = &[0x2D, 0x01, 0x00, 0x00, 0xAA, 0x00, 0x3C, 0x07];

/// Codec table for the codecs compiled into this build
///
/// Vendor codecs are listed before SBC so that they win selection.
pub fn default_codecs() -> Vec<CodecCapabilities> {
    let mut codecs = Vec::new();

    for direction in [CodecDirection::Source, CodecDirection::Sink] {
        #[cfg(feature = "ldac")]
        if direction == CodecDirection::Source {
            // LDAC decoding is not available
            codecs.push(CodecCapabilities::new(
                Codec::Ldac,
                direction,
                Bytes::from_static(LDAC_CAPS),
            ));
        }
        #[cfg(feature = "aptx")]
        codecs.push(CodecCapabilities::new(
            Codec::AptX,
            direction,
            Bytes::from_static(APTX_CAPS),
        ));
        #[cfg(feature = "aac")]
        codecs.push(CodecCapabilities::new(
            Codec::Aac,
            direction,
            Bytes::from_static(AAC_CAPS),
        ));
        codecs.push(CodecCapabilities::new(
            Codec::Sbc,
            direction,
            Bytes::from_static(SBC_CAPS),
        ));
    }

    codecs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sbc_always_present_in_both_directions() {
        let codecs = default_codecs();

        for direction in [CodecDirection::Source, CodecDirection::Sink] {
            let sbc = codecs
                .iter()
                .find(|c| c.codec == Codec::Sbc && c.direction == direction)
                .unwrap();
            assert_eq!(sbc.capabilities.len(), 4);
            // max bitpool
            assert_eq!(sbc.capabilities[3], 53);
        }
    }

    #[test]
    fn test_codec_ids() {
        assert_eq!(Codec::Sbc.id(), Some(A2DP_CODEC_SBC));
        assert_eq!(Codec::Ldac.id(), Some(A2DP_CODEC_VENDOR));
        assert_eq!(Codec::Msbc.id(), Some(HFP_CODEC_MSBC));
        assert_eq!(Codec::None.id(), None);
    }

    #[test]
    fn test_codec_classes() {
        assert!(Codec::Aac.is_a2dp());
        assert!(!Codec::Aac.is_sco());
        assert!(Codec::Cvsd.is_sco());
        assert!(!Codec::None.is_a2dp() && !Codec::None.is_sco());
    }
}

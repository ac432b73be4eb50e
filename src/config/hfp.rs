//! HFP feature bitmasks
//!
//! Bits advertised in the SDP record (`SDP_*`) are a subset of the ones
//! exchanged over RFCOMM with `AT+BRSF`/`+BRSF`, and the two sets use
//! different bit positions.

/// SDP "SupportedFeatures" bits for the hands-free role
pub mod sdp_hf {
    pub const ECNR: u32 = 1 << 0;
    pub const THREE_WAY: u32 = 1 << 1;
    pub const CLI: u32 = 1 << 2;
    pub const VOICE_RECOG: u32 = 1 << 3;
    pub const VOLUME: u32 = 1 << 4;
    pub const WBAND: u32 = 1 << 5;
}

/// SDP "SupportedFeatures" bits for the audio gateway role
pub mod sdp_ag {
    pub const THREE_WAY: u32 = 1 << 0;
    pub const ECNR: u32 = 1 << 1;
    pub const VOICE_RECOG: u32 = 1 << 2;
    pub const RING: u32 = 1 << 3;
    pub const VTAG: u32 = 1 << 4;
    pub const WBAND: u32 = 1 << 5;
}

/// `AT+BRSF` bits sent by the hands-free unit
pub mod rfcomm_hf {
    pub const ECNR: u32 = 1 << 0;
    pub const THREE_WAY: u32 = 1 << 1;
    pub const CLI: u32 = 1 << 2;
    pub const VOICE_RECOG: u32 = 1 << 3;
    pub const VOLUME: u32 = 1 << 4;
    pub const ECS: u32 = 1 << 5;
    pub const ECC: u32 = 1 << 6;
    pub const CODEC: u32 = 1 << 7;
    pub const HF_IND: u32 = 1 << 8;
    pub const ESOC: u32 = 1 << 9;
}

/// `+BRSF` bits sent by the audio gateway
pub mod rfcomm_ag {
    pub const THREE_WAY: u32 = 1 << 0;
    pub const ECNR: u32 = 1 << 1;
    pub const VOICE_RECOG: u32 = 1 << 2;
    pub const RING: u32 = 1 << 3;
    pub const VTAG: u32 = 1 << 4;
    pub const REJECT: u32 = 1 << 5;
    pub const ECS: u32 = 1 << 6;
    pub const ECC: u32 = 1 << 7;
    pub const EERC: u32 = 1 << 8;
    pub const CODEC: u32 = 1 << 9;
    pub const HF_IND: u32 = 1 << 10;
    pub const ESOC: u32 = 1 << 11;
}

/// The four independent HFP feature bitmasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HfpFeatures {
    /// Advertised in our HF SDP record
    pub sdp_hf: u32,
    /// Advertised in our AG SDP record
    pub sdp_ag: u32,
    /// Sent in `AT+BRSF` when we act as HF
    pub rfcomm_hf: u32,
    /// Sent in `+BRSF` when we act as AG
    pub rfcomm_ag: u32,
}

impl Default for HfpFeatures {
    fn default() -> Self {
        let mut features = Self {
            sdp_hf: sdp_hf::CLI | sdp_hf::VOLUME,
            sdp_ag: 0,
            rfcomm_hf: rfcomm_hf::CLI | rfcomm_hf::VOLUME | rfcomm_hf::ECS | rfcomm_hf::ECC,
            rfcomm_ag: rfcomm_ag::REJECT | rfcomm_ag::ECS | rfcomm_ag::ECC | rfcomm_ag::EERC,
        };

        if cfg!(feature = "msbc") {
            features.sdp_hf |= sdp_hf::WBAND;
            features.sdp_ag |= sdp_ag::WBAND;
            features.rfcomm_hf |= rfcomm_hf::CODEC | rfcomm_hf::ESOC;
            features.rfcomm_ag |= rfcomm_ag::CODEC | rfcomm_ag::ESOC;
        }

        features
    }
}

impl HfpFeatures {
    /// Whether codec negotiation (and so mSBC) is offered on the HF side
    pub fn hf_codec_negotiation(&self) -> bool {
        self.rfcomm_hf & rfcomm_hf::CODEC != 0
    }

    /// Whether codec negotiation (and so mSBC) is offered on the AG side
    pub fn ag_codec_negotiation(&self) -> bool {
        self.rfcomm_ag & rfcomm_ag::CODEC != 0
    }
}

//! Transport profile types

use std::fmt;

/// Profile negotiated for a transport
///
/// Each device holds at most one transport per profile, and the profile tag
/// is the last element of the transport's object path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransportProfile {
    /// A2DP, local side is the audio source
    A2dpSource,
    /// A2DP, local side is the audio sink
    A2dpSink,
    /// HFP, local side is the audio gateway
    HfpAg,
    /// HFP, local side is the hands-free unit
    HfpHf,
    /// HSP, local side is the audio gateway
    HspAg,
    /// HSP, local side is the headset
    HspHf,
    /// RFCOMM call-control channel (no audio)
    Rfcomm,
}

impl TransportProfile {
    /// Every profile, in path-tag order
    pub const ALL: [TransportProfile; 7] = [
        TransportProfile::A2dpSource,
        TransportProfile::A2dpSink,
        TransportProfile::HfpAg,
        TransportProfile::HfpHf,
        TransportProfile::HspAg,
        TransportProfile::HspHf,
        TransportProfile::Rfcomm,
    ];

    /// Object path tag
    pub fn tag(&self) -> &'static str {
        match self {
            TransportProfile::A2dpSource => "a2dpsrc",
            TransportProfile::A2dpSink => "a2dpsnk",
            TransportProfile::HfpAg => "hfpag",
            TransportProfile::HfpHf => "hfphf",
            TransportProfile::HspAg => "hspag",
            TransportProfile::HspHf => "hsphf",
            TransportProfile::Rfcomm => "rfcomm",
        }
    }

    /// Parse a path tag back into a profile
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.tag() == tag)
    }

    /// Control channel only, never an audio endpoint
    pub fn is_rfcomm(&self) -> bool {
        matches!(self, TransportProfile::Rfcomm)
    }

    pub fn is_a2dp(&self) -> bool {
        matches!(
            self,
            TransportProfile::A2dpSource | TransportProfile::A2dpSink
        )
    }

    /// Audio carried over a SCO link (HFP/HSP)
    pub fn is_sco(&self) -> bool {
        matches!(
            self,
            TransportProfile::HfpAg
                | TransportProfile::HfpHf
                | TransportProfile::HspAg
                | TransportProfile::HspHf
        )
    }
}

impl fmt::Display for TransportProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportProfile::A2dpSource => "A2DP Source",
            TransportProfile::A2dpSink => "A2DP Sink",
            TransportProfile::HfpAg => "HFP AG",
            TransportProfile::HfpHf => "HFP HF",
            TransportProfile::HspAg => "HSP AG",
            TransportProfile::HspHf => "HSP HS",
            TransportProfile::Rfcomm => "RFCOMM",
        };
        f.write_str(name)
    }
}

//! Process-wide daemon configuration
//!
//! The configuration is assembled with builder-style setters, then finalised
//! exactly once with [`Config::init`]. `init` resolves the things that need
//! the operating system (audio group id, discard output handle) and hands back
//! an `Arc<Config>` which is shared read-only by everything created afterwards.
//!
//! ```
//! use bluealsa::config::Config;
//! use bluealsa::registry::TransportProfile;
//!
//! let config = Config::default()
//!     .enable_profile(TransportProfile::A2dpSink)
//!     .a2dp_volume(true)
//!     .init()
//!     .unwrap();
//!
//! assert!(config.is_profile_enabled(TransportProfile::A2dpSink));
//! ```

pub mod codec;
pub mod hfp;

use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use nix::unistd::Group;
use thiserror::Error;

use crate::registry::{BdAddr, TransportProfile};

pub use codec::{Codec, CodecCapabilities, CodecDirection};
pub use hfp::HfpFeatures;

/// Fatal startup failure
#[derive(Debug, Error)]
pub enum ConfigInitError {
    /// The discard output handle could not be opened
    #[error("Couldn't open null device {path}: {source}")]
    NullOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Set of enabled transport profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnabledProfiles(u8);

impl EnabledProfiles {
    fn bit(profile: TransportProfile) -> u8 {
        1 << profile as u8
    }

    /// Empty set
    pub fn none() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, profile: TransportProfile) {
        self.0 |= Self::bit(profile);
    }

    pub fn remove(&mut self, profile: TransportProfile) {
        self.0 &= !Self::bit(profile);
    }

    /// Check whether a profile is enabled
    ///
    /// The RFCOMM control channel has no switch of its own: it is enabled
    /// whenever any HFP or HSP role is.
    pub fn contains(&self, profile: TransportProfile) -> bool {
        if profile.is_rfcomm() {
            return TransportProfile::ALL
                .iter()
                .filter(|p| p.is_sco())
                .any(|p| self.0 & Self::bit(*p) != 0);
        }
        self.0 & Self::bit(profile) != 0
    }
}

/// A2DP tuning flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A2dpConfig {
    /// Pass volume changes to the remote device instead of scaling PCM
    pub volume: bool,
    /// Only advertise mono channel mode
    pub force_mono: bool,
    /// Only advertise 44.1 kHz sampling
    pub force_44100: bool,
    /// Keep the transport open after the PCM client goes away
    pub keep_alive: Duration,
}

impl Default for A2dpConfig {
    fn default() -> Self {
        Self {
            volume: false,
            force_mono: false,
            force_44100: false,
            keep_alive: Duration::ZERO,
        }
    }
}

/// AAC encoder tuning
#[cfg(feature = "aac")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AacConfig {
    /// Afterburner costs a lot of power and produces larger payloads
    pub afterburner: bool,
    /// 0 disables VBR, 1..=5 select quality
    pub vbr_mode: u8,
}

#[cfg(feature = "aac")]
impl Default for AacConfig {
    fn default() -> Self {
        Self {
            afterburner: false,
            vbr_mode: 4,
        }
    }
}

/// LDAC encoder quality mode
#[cfg(feature = "ldac")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LdacQuality {
    /// 990/909 kbit/s
    High,
    /// 660/606 kbit/s
    Standard,
    /// 330/303 kbit/s
    Mobile,
}

/// LDAC encoder tuning
#[cfg(feature = "ldac")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdacConfig {
    /// Adaptive bit rate
    pub abr: bool,
    pub eqmid: LdacQuality,
}

#[cfg(feature = "ldac")]
impl Default for LdacConfig {
    fn default() -> Self {
        Self {
            abr: false,
            eqmid: LdacQuality::Standard,
        }
    }
}

/// Daemon configuration
#[derive(Debug)]
pub struct Config {
    /// Profiles the daemon will accept connections for
    pub enabled: EnabledProfiles,

    /// Adapters to use, by name (`hciN`) or controller address; empty means all
    pub hci_filter: Vec<String>,

    /// Group whose members own the audio devices
    pub audio_group: String,

    /// Resolved id of `audio_group`, `None` if the group does not exist
    pub gid_audio: Option<u32>,

    /// Path of the discard output device
    pub null_device: PathBuf,

    /// HFP feature bitmasks
    pub hfp: HfpFeatures,

    /// A2DP tuning
    pub a2dp: A2dpConfig,

    /// Codecs compiled into this build
    pub codecs: Vec<CodecCapabilities>,

    #[cfg(feature = "aac")]
    pub aac: AacConfig,

    #[cfg(feature = "ldac")]
    pub ldac: LdacConfig,

    null_output: Option<File>,
}

impl Default for Config {
    fn default() -> Self {
        let mut enabled = EnabledProfiles::none();
        // Output profiles are enabled by default
        enabled.insert(TransportProfile::A2dpSource);
        enabled.insert(TransportProfile::HfpAg);
        enabled.insert(TransportProfile::HspAg);

        Self {
            enabled,
            hci_filter: Vec::new(),
            audio_group: "audio".to_string(),
            gid_audio: None,
            null_device: PathBuf::from("/dev/null"),
            hfp: HfpFeatures::default(),
            a2dp: A2dpConfig::default(),
            codecs: codec::default_codecs(),
            #[cfg(feature = "aac")]
            aac: AacConfig::default(),
            #[cfg(feature = "ldac")]
            ldac: LdacConfig::default(),
            null_output: None,
        }
    }
}

impl Config {
    /// Enable a profile
    pub fn enable_profile(mut self, profile: TransportProfile) -> Self {
        self.enabled.insert(profile);
        self
    }

    /// Disable a profile
    pub fn disable_profile(mut self, profile: TransportProfile) -> Self {
        self.enabled.remove(profile);
        self
    }

    /// Restrict the daemon to the given adapter name or address
    pub fn hci_filter(mut self, adapter: impl Into<String>) -> Self {
        self.hci_filter.push(adapter.into());
        self
    }

    /// Set the group used for audio device ownership
    pub fn audio_group(mut self, name: impl Into<String>) -> Self {
        self.audio_group = name.into();
        self
    }

    /// Set the discard output device
    pub fn null_device(mut self, path: impl Into<PathBuf>) -> Self {
        self.null_device = path.into();
        self
    }

    /// Set HFP feature bitmasks
    pub fn hfp_features(mut self, features: HfpFeatures) -> Self {
        self.hfp = features;
        self
    }

    /// Enable A2DP volume passthrough
    pub fn a2dp_volume(mut self, enabled: bool) -> Self {
        self.a2dp.volume = enabled;
        self
    }

    /// Force mono A2DP
    pub fn a2dp_force_mono(mut self, enabled: bool) -> Self {
        self.a2dp.force_mono = enabled;
        self
    }

    /// Force 44.1 kHz A2DP
    pub fn a2dp_force_44100(mut self, enabled: bool) -> Self {
        self.a2dp.force_44100 = enabled;
        self
    }

    /// Set A2DP keep-alive duration
    pub fn a2dp_keep_alive(mut self, duration: Duration) -> Self {
        self.a2dp.keep_alive = duration;
        self
    }

    #[cfg(feature = "aac")]
    pub fn aac_afterburner(mut self, enabled: bool) -> Self {
        self.aac.afterburner = enabled;
        self
    }

    /// Set AAC VBR mode (capped at 5)
    #[cfg(feature = "aac")]
    pub fn aac_vbr_mode(mut self, mode: u8) -> Self {
        self.aac.vbr_mode = mode.min(5);
        self
    }

    #[cfg(feature = "ldac")]
    pub fn ldac_abr(mut self, enabled: bool) -> Self {
        self.ldac.abr = enabled;
        self
    }

    #[cfg(feature = "ldac")]
    pub fn ldac_quality(mut self, quality: LdacQuality) -> Self {
        self.ldac.eqmid = quality;
        self
    }

    /// Finalise the configuration
    ///
    /// Must run once, before any adapter is created. A missing audio group
    /// is not an error: device ownership is simply left alone. Failing to
    /// open the discard output is fatal.
    pub fn init(mut self) -> Result<Arc<Config>, ConfigInitError> {
        let null_output = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&self.null_device)
            .map_err(|source| ConfigInitError::NullOutput {
                path: self.null_device.clone(),
                source,
            })?;
        self.null_output = Some(null_output);

        self.gid_audio = lookup_group(&self.audio_group);
        match self.gid_audio {
            Some(gid) => tracing::debug!(group = %self.audio_group, gid = gid, "Audio group resolved"),
            None => tracing::warn!(group = %self.audio_group, "Audio group not found, skipping chown"),
        }

        tracing::debug!(
            profiles = ?self.enabled,
            codecs = self.codecs.len(),
            "Configuration initialized"
        );

        Ok(Arc::new(self))
    }

    /// Check whether a profile is enabled
    pub fn is_profile_enabled(&self, profile: TransportProfile) -> bool {
        self.enabled.contains(profile)
    }

    /// Check an adapter against the HCI filter
    ///
    /// Entries match the adapter name, or its controller address when one is
    /// known. Addresses compare case-insensitively.
    pub fn is_adapter_allowed(&self, index: u16, address: Option<&BdAddr>) -> bool {
        if self.hci_filter.is_empty() {
            return true;
        }
        let name = format!("hci{}", index);
        self.hci_filter.iter().any(|entry| {
            *entry == name
                || address.is_some_and(|addr| entry.parse::<BdAddr>().ok().as_ref() == Some(addr))
        })
    }

    /// Look up the advertised capabilities of a codec
    pub fn codec(&self, codec: Codec, direction: CodecDirection) -> Option<&CodecCapabilities> {
        self.codecs
            .iter()
            .find(|c| c.codec == codec && c.direction == direction)
    }

    /// Discard output handle, available after [`Config::init`]
    pub fn null_output(&self) -> Option<&File> {
        self.null_output.as_ref()
    }
}

/// Resolve a group name to its id
fn lookup_group(name: &str) -> Option<u32> {
    match Group::from_name(name) {
        Ok(group) => group.map(|group| group.gid.as_raw()),
        Err(e) => {
            tracing::warn!(group = name, error = %e, "Group lookup failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.is_profile_enabled(TransportProfile::A2dpSource));
        assert!(config.is_profile_enabled(TransportProfile::HfpAg));
        assert!(config.is_profile_enabled(TransportProfile::HspAg));
        assert!(!config.is_profile_enabled(TransportProfile::A2dpSink));
        assert!(!config.is_profile_enabled(TransportProfile::HfpHf));
        assert!(config.is_profile_enabled(TransportProfile::Rfcomm));

        assert_eq!(config.a2dp, A2dpConfig::default());
        assert_eq!(config.a2dp.keep_alive, Duration::ZERO);
        assert!(config.gid_audio.is_none());
        assert!(config.null_output().is_none());
    }

    #[test]
    fn test_rfcomm_follows_sco_profiles() {
        let config = Config::default()
            .disable_profile(TransportProfile::HfpAg)
            .disable_profile(TransportProfile::HspAg);

        assert!(!config.is_profile_enabled(TransportProfile::Rfcomm));

        let config = config.enable_profile(TransportProfile::HspHf);
        assert!(config.is_profile_enabled(TransportProfile::Rfcomm));
    }

    #[test]
    fn test_builder_chaining() {
        let config = Config::default()
            .enable_profile(TransportProfile::A2dpSink)
            .hci_filter("hci1")
            .a2dp_volume(true)
            .a2dp_force_mono(true)
            .a2dp_force_44100(true)
            .a2dp_keep_alive(Duration::from_secs(5));

        assert!(config.is_profile_enabled(TransportProfile::A2dpSink));
        assert!(config.a2dp.volume);
        assert!(config.a2dp.force_mono);
        assert!(config.a2dp.force_44100);
        assert_eq!(config.a2dp.keep_alive, Duration::from_secs(5));

        assert!(config.is_adapter_allowed(1, None));
        assert!(!config.is_adapter_allowed(0, None));
    }

    #[test]
    fn test_empty_filter_allows_all() {
        let config = Config::default();
        assert!(config.is_adapter_allowed(0, None));
        assert!(config.is_adapter_allowed(15, None));
    }

    #[test]
    fn test_filter_by_address() {
        let config = Config::default().hci_filter("00:1a:7d:da:71:13");
        let addr: BdAddr = "00:1A:7D:DA:71:13".parse().unwrap();
        let other: BdAddr = "00:1A:7D:DA:71:14".parse().unwrap();

        assert!(config.is_adapter_allowed(3, Some(&addr)));
        assert!(!config.is_adapter_allowed(3, Some(&other)));
        // Address entries never match by name
        assert!(!config.is_adapter_allowed(3, None));

        let config = config.hci_filter("hci0");
        assert!(config.is_adapter_allowed(0, Some(&other)));
    }

    #[test]
    fn test_init_opens_null_output() {
        let config = Config::default().init().unwrap();
        assert!(config.null_output().is_some());
    }

    #[test]
    fn test_init_missing_group_is_not_fatal() {
        let config = Config::default()
            .audio_group("bluealsa-test-no-such-group")
            .init()
            .unwrap();

        assert_eq!(config.gid_audio, None);
    }

    #[test]
    fn test_init_existing_group_resolves() {
        // "root" is present on every Linux system and has gid 0
        let config = Config::default().audio_group("root").init().unwrap();
        assert_eq!(config.gid_audio, Some(0));
    }

    #[test]
    fn test_init_null_output_failure_is_fatal() {
        let result = Config::default()
            .null_device("/nonexistent-bluealsa-dir/null")
            .init();

        assert!(matches!(result, Err(ConfigInitError::NullOutput { .. })));
    }

    #[test]
    fn test_codec_lookup() {
        let config = Config::default();

        let sbc = config.codec(Codec::Sbc, CodecDirection::Source).unwrap();
        assert_eq!(sbc.codec, Codec::Sbc);
        assert!(config.codec(Codec::Cvsd, CodecDirection::Source).is_none());
    }

    #[cfg(feature = "aac")]
    #[test]
    fn test_aac_defaults() {
        let config = Config::default().aac_vbr_mode(9);
        assert!(!config.aac.afterburner);
        assert_eq!(config.aac.vbr_mode, 5);
    }

    #[cfg(feature = "ldac")]
    #[test]
    fn test_ldac_defaults() {
        let config = Config::default();
        assert!(!config.ldac.abr);
        assert_eq!(config.ldac.eqmid, LdacQuality::Standard);
    }
}

//! # Candidate session configurations
//!
//! A [`CandidateSessionConfig`] is an offer: for each channel role, the
//! ordered list of channel configs a peer is willing to use, most preferred
//! first. Roles are independent of each other; adding a transport or codec
//! to one role never touches the others.
//!
//! Besides building offers, this module holds the negotiation helpers that
//! turn two offers into a single [`SessionConfig`].

use std::ops::{Deref, DerefMut};

use tracing::debug;

use crate::channel::{ChannelConfig, ChannelRole, Codec, DEFAULT_STREAM_VERSION};
use crate::session::SessionConfig;

/// Per-role lists of acceptable channel configs.
///
/// Equality compares the four lists element by element, so two offers that
/// contain the same configs in a different order are not equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSessionConfig {
    control_configs: Vec<ChannelConfig>,
    event_configs: Vec<ChannelConfig>,
    video_configs: Vec<ChannelConfig>,
    audio_configs: Vec<ChannelConfig>,
}

impl CandidateSessionConfig {
    /// An offer with no configs for any role.
    ///
    /// Used as the starting point for parsing and when rejecting a proposal.
    pub fn create_empty() -> Self {
        Self::default()
    }

    /// The standard offer: every transport, version and codec this
    /// implementation supports, in preference order.
    pub fn create_default() -> Self {
        let mut result = Self::create_empty();

        result
            .control_configs
            .push(ChannelConfig::stream(DEFAULT_STREAM_VERSION, Codec::Undefined));
        result
            .event_configs
            .push(ChannelConfig::stream(DEFAULT_STREAM_VERSION, Codec::Undefined));

        result
            .video_configs
            .push(ChannelConfig::stream(DEFAULT_STREAM_VERSION, Codec::Vp8));
        result
            .video_configs
            .push(ChannelConfig::stream(DEFAULT_STREAM_VERSION, Codec::Verbatim));

        result.audio_configs = default_audio_configs();
        result
    }

    /// Offer containing exactly the channels of an agreed session
    pub fn from_session_config(config: &SessionConfig) -> Self {
        let mut result = Self::create_empty();
        for role in ChannelRole::ALL {
            result.configs_mut(role).push(config.config(role).clone());
        }
        result
    }

    pub fn control_configs(&self) -> &[ChannelConfig] {
        &self.control_configs
    }

    pub fn event_configs(&self) -> &[ChannelConfig] {
        &self.event_configs
    }

    pub fn video_configs(&self) -> &[ChannelConfig] {
        &self.video_configs
    }

    pub fn audio_configs(&self) -> &[ChannelConfig] {
        &self.audio_configs
    }

    /// Configs offered for `role`
    pub fn configs(&self, role: ChannelRole) -> &[ChannelConfig] {
        match role {
            ChannelRole::Control => &self.control_configs,
            ChannelRole::Event => &self.event_configs,
            ChannelRole::Video => &self.video_configs,
            ChannelRole::Audio => &self.audio_configs,
        }
    }

    /// Mutable access to the list offered for `role`.
    ///
    /// Only video configs carry a codec on the wire; when the returned view
    /// is dropped, codecs on other roles are reset to [`Codec::Undefined`].
    pub fn configs_mut(&mut self, role: ChannelRole) -> ChannelConfigsMut<'_> {
        ChannelConfigsMut {
            role,
            configs: self.list_mut(role),
        }
    }

    pub fn control_configs_mut(&mut self) -> ChannelConfigsMut<'_> {
        self.configs_mut(ChannelRole::Control)
    }

    pub fn event_configs_mut(&mut self) -> ChannelConfigsMut<'_> {
        self.configs_mut(ChannelRole::Event)
    }

    pub fn video_configs_mut(&mut self) -> ChannelConfigsMut<'_> {
        self.configs_mut(ChannelRole::Video)
    }

    pub fn audio_configs_mut(&mut self) -> ChannelConfigsMut<'_> {
        self.configs_mut(ChannelRole::Audio)
    }

    fn list_mut(&mut self, role: ChannelRole) -> &mut Vec<ChannelConfig> {
        match role {
            ChannelRole::Control => &mut self.control_configs,
            ChannelRole::Event => &mut self.event_configs,
            ChannelRole::Video => &mut self.video_configs,
            ChannelRole::Audio => &mut self.audio_configs,
        }
    }

    /// Replace the audio offer with the default audio offer
    pub fn enable_audio_channel(&mut self) {
        self.audio_configs = default_audio_configs();
    }

    /// Offer only a disabled audio channel
    pub fn disable_audio_channel(&mut self) {
        self.audio_configs = vec![ChannelConfig::none()];
    }

    /// Drop every config this implementation cannot act on: unknown
    /// transports on any role, unknown codecs on video.
    ///
    /// Returns how many configs were removed.
    pub fn retain_known(&mut self) -> usize {
        let mut dropped = 0;
        for role in ChannelRole::ALL {
            let configs = self.list_mut(role);
            let before = configs.len();
            configs.retain(|config| config.is_known());
            let removed = before - configs.len();
            if removed > 0 {
                debug!(role = %role, removed, "Dropped channel configs with unrecognized options");
            }
            dropped += removed;
        }
        dropped
    }

    /// True when no role offers anything
    pub fn is_empty(&self) -> bool {
        ChannelRole::ALL.iter().all(|role| self.configs(*role).is_empty())
    }

    /// Check that every channel of `config` is part of this offer
    pub fn is_supported(&self, config: &SessionConfig) -> bool {
        ChannelRole::ALL
            .iter()
            .all(|role| self.configs(*role).contains(config.config(*role)))
    }

    /// The agreed configuration when this offer is an answer, i.e. every role
    /// lists exactly one config.
    pub fn final_config(&self) -> Option<SessionConfig> {
        if ChannelRole::ALL.iter().any(|role| self.configs(*role).len() != 1) {
            return None;
        }

        Some(SessionConfig::new(
            self.control_configs[0].clone(),
            self.event_configs[0].clone(),
            self.video_configs[0].clone(),
            self.audio_configs[0].clone(),
        ))
    }

    /// Pick one config per role that both this offer and `remote` accept.
    ///
    /// Our own preference order wins. Control, event and video must each find
    /// a common config; audio is disabled when it cannot.
    pub fn select(&self, remote: &CandidateSessionConfig) -> Option<SessionConfig> {
        let control = select_common(ChannelRole::Control, &self.control_configs, &remote.control_configs)?;
        let event = select_common(ChannelRole::Event, &self.event_configs, &remote.event_configs)?;
        let video = select_common(ChannelRole::Video, &self.video_configs, &remote.video_configs)?;
        let audio = select_common(ChannelRole::Audio, &self.audio_configs, &remote.audio_configs)
            .unwrap_or_else(ChannelConfig::none);

        Some(SessionConfig::new(control, event, video, audio))
    }
}

/// Mutable view of one role's config list, returned by
/// [`CandidateSessionConfig::configs_mut`].
#[derive(Debug)]
pub struct ChannelConfigsMut<'a> {
    role: ChannelRole,
    configs: &'a mut Vec<ChannelConfig>,
}

impl Deref for ChannelConfigsMut<'_> {
    type Target = Vec<ChannelConfig>;

    fn deref(&self) -> &Self::Target {
        &*self.configs
    }
}

impl DerefMut for ChannelConfigsMut<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.configs
    }
}

impl Drop for ChannelConfigsMut<'_> {
    fn drop(&mut self) {
        for config in self.configs.iter_mut() {
            config.normalize_for(self.role);
        }
    }
}

fn default_audio_configs() -> Vec<ChannelConfig> {
    vec![
        ChannelConfig::stream(DEFAULT_STREAM_VERSION, Codec::Undefined),
        ChannelConfig::none(),
    ]
}

fn select_common(
    role: ChannelRole,
    local: &[ChannelConfig],
    remote: &[ChannelConfig],
) -> Option<ChannelConfig> {
    let selected = local
        .iter()
        .filter(|config| config.is_known())
        .find(|config| remote.contains(config))
        .cloned();

    if selected.is_none() {
        debug!(role = %role, "No common channel config");
    }
    selected
}

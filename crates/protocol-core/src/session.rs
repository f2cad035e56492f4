//! The configuration a session actually runs with, one channel config per role

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::channel::{ChannelConfig, ChannelRole};

/// Concrete per-role channel choice produced by negotiation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionConfig {
    control: ChannelConfig,
    event: ChannelConfig,
    video: ChannelConfig,
    audio: ChannelConfig,
}

impl SessionConfig {
    pub fn new(
        control: ChannelConfig,
        event: ChannelConfig,
        video: ChannelConfig,
        audio: ChannelConfig,
    ) -> Self {
        Self {
            control,
            event,
            video,
            audio,
        }
    }

    pub fn control_config(&self) -> &ChannelConfig {
        &self.control
    }

    pub fn event_config(&self) -> &ChannelConfig {
        &self.event
    }

    pub fn video_config(&self) -> &ChannelConfig {
        &self.video
    }

    pub fn audio_config(&self) -> &ChannelConfig {
        &self.audio
    }

    /// Channel config chosen for `role`
    pub fn config(&self, role: ChannelRole) -> &ChannelConfig {
        match role {
            ChannelRole::Control => &self.control,
            ChannelRole::Event => &self.event,
            ChannelRole::Video => &self.video,
            ChannelRole::Audio => &self.audio,
        }
    }

    /// Whether the session streams audio at all
    pub fn is_audio_enabled(&self) -> bool {
        !self.audio.is_disabled()
    }
}

impl fmt::Display for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "control={} event={} video={} audio={}",
            self.control, self.event, self.video, self.audio
        )
    }
}

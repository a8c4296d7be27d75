/// Armed toggles shared by every command
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three persistent engine toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToggleFlag {
    /// Let new tiles play alongside active ones
    Multi,
    /// Loop newly started tiles
    Loop,
    /// Fade out the previous tile when another starts or ends
    AutoFade,
}

impl fmt::Display for ToggleFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToggleFlag::Multi => "multi",
            ToggleFlag::Loop => "loop",
            ToggleFlag::AutoFade => "autoFade",
        };
        f.write_str(name)
    }
}

/// Current values of the armed toggles
///
/// Read at command time: flipping a toggle never changes handles that are
/// already playing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toggles {
    /// Multi-play mode
    #[serde(default)]
    pub multi: bool,

    /// Loop mode
    #[serde(default, rename = "loop")]
    pub loop_playback: bool,

    /// Auto-fade mode
    #[serde(default)]
    pub auto_fade: bool,
}

impl Toggles {
    /// Value of one flag
    pub fn get(&self, flag: ToggleFlag) -> bool {
        match flag {
            ToggleFlag::Multi => self.multi,
            ToggleFlag::Loop => self.loop_playback,
            ToggleFlag::AutoFade => self.auto_fade,
        }
    }

    /// Flip one flag, returning its new value
    pub fn toggle(&mut self, flag: ToggleFlag) -> bool {
        let slot = match flag {
            ToggleFlag::Multi => &mut self.multi,
            ToggleFlag::Loop => &mut self.loop_playback,
            ToggleFlag::AutoFade => &mut self.auto_fade,
        };
        *slot = !*slot;
        *slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_only_one_flag() {
        let mut toggles = Toggles::default();
        assert!(toggles.toggle(ToggleFlag::Loop));
        assert!(toggles.loop_playback);
        assert!(!toggles.multi);
        assert!(!toggles.auto_fade);

        assert!(!toggles.toggle(ToggleFlag::Loop));
        assert!(!toggles.get(ToggleFlag::Loop));
    }

    #[test]
    fn serialized_with_short_names() {
        let toggles = Toggles {
            multi: true,
            loop_playback: true,
            auto_fade: false,
        };
        let json = serde_json::to_string(&toggles).unwrap();
        assert_eq!(json, r#"{"multi":true,"loop":true,"autoFade":false}"#);
    }
}

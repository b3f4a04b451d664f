use crate::error::BvhError;
use crate::types::{JointNode, POSITION_CHANNELS};
use std::fmt;
use std::str::FromStr;

/// Which channels every joint should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Position,
    Rotation,
    All,
}

impl FromStr for ChannelMode {
    type Err = BvhError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POSITION" => Ok(ChannelMode::Position),
            "ROTATION" => Ok(ChannelMode::Rotation),
            "ALL" => Ok(ChannelMode::All),
            _ => Err(BvhError::UnsupportedMode(s.to_string())),
        }
    }
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChannelMode::Position => "POSITION",
            ChannelMode::Rotation => "ROTATION",
            ChannelMode::All => "ALL",
        };
        f.write_str(name)
    }
}

fn __position_labels() -> Vec<String> {
    POSITION_CHANNELS.iter().map(|s| s.to_string()).collect()
}

/// Change the channel list of every joint in the hierarchy.
///
/// * `All` prepends the three position channels to every joint that does not already have 6.
///   Existing labels are assumed to be rotations.
/// * `Position` / `Rotation` keep one half. The root is only touched when `root_has_both` is
///   false, in which case it keeps its first or last 3 labels.
///
/// Only channel labels change. `frame_offset` and the motion matrix are left to the caller,
/// see [`crate::motion`] and [`JointNode::recompute_frame_offsets`].
pub fn set_channel_mode(root: &mut JointNode, mode: ChannelMode, root_has_both: bool) {
    match mode {
        ChannelMode::All => {
            root.for_each_node_mut(&mut |node: &mut JointNode| {
                if node.channels.len() == 6 {
                    return;
                }
                let mut channels = __position_labels();
                channels.append(&mut node.channels);
                node.channels = channels;
            });
        }
        ChannelMode::Position | ChannelMode::Rotation => {
            //// root joint
            if !root_has_both {
                let channels = &mut root.channels;
                if mode == ChannelMode::Position {
                    channels.truncate(3);
                } else {
                    let end = channels.len().min(6);
                    let start = end.min(3);
                    *channels = channels[start..end].to_vec();
                }
            }

            //// other joints
            root.for_each_node_mut(&mut |node: &mut JointNode| {
                if node.index == 0 {
                    return;
                }
                match mode {
                    ChannelMode::Position => {
                        if node.channels.first().map(String::as_str) == Some(POSITION_CHANNELS[0]) {
                            node.channels.truncate(3);
                        } else {
                            // rotation only, nothing to keep
                            node.channels = __position_labels();
                        }
                    }
                    _ => {
                        if node.channels.len() == 6 {
                            node.channels.drain(0..3);
                        }
                    }
                }
            });
        }
    }
}

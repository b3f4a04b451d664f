//! Reading, writing and reshaping of .bvh (Biovision Hierarchy) motion capture files.
//!
//! ```no_run
//! use bvh_anim_io::parse::load_bvh_from_file;
//! use bvh_anim_io::write::save_bvh_to_file;
//!
//! let bvh = load_bvh_from_file("walk.bvh").unwrap();
//! println!("{} joints, {} frames", bvh.root.num_joints(), bvh.motion.len());
//! save_bvh_to_file(&bvh, "walk_copy.bvh").unwrap();
//! ```

pub mod channels;
pub mod error;
pub mod motion;
pub mod parse;
pub mod types;
pub mod write;

pub use channels::{set_channel_mode, ChannelMode};
pub use error::{BvhError, BvhResult};
pub use motion::{combine_motion_part, split_motion_part};
pub use parse::{load_bvh_from_file, load_bvh_from_string};
pub use types::{Bvh, Endsite, JointNode, MotionMatrix};
pub use write::{save_bvh_to_file, write_bvh, write_bvh_to_string};

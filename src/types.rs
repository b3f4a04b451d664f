use cgmath::Vector3;

/////////////////////////////////////////////////////////////////////////////////////////////////

pub type Index = usize;
pub type Position = Vector3<f64>;

/// Rows are frames, columns are channels of all joints in discovery order.
pub type MotionMatrix = Vec<Vec<f64>>;

pub const POSITION_CHANNELS: [&str; 3] = ["Xposition", "Yposition", "Zposition"];

/////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq)]
pub struct Endsite {
    pub offset: Position,
}

/// One joint of the skeleton. Children are owned and kept in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct JointNode {
    pub name: String,
    /// Depth-first discovery order, the root is 0. End sites are not indexed.
    pub index: Index,
    /// Column of the motion matrix where this joint's channels begin.
    pub frame_offset: Index,
    pub offset: Position,
    pub channels: Vec<String>,
    pub children: Vec<JointNode>,
    pub endsite: Option<Endsite>,
}

/// A parsed .bvh document: skeleton, motion samples and the frame header.
#[derive(Debug, Clone, PartialEq)]
pub struct Bvh {
    pub root: JointNode,
    pub motion: MotionMatrix,
    pub num_frames: usize,
    pub frame_time: f64,
}

/////////////////////////////////////////////////////////////////////////////////////////////////
/////////////////////////////////////////////////////////////////////////////////////////////////
/////////////////////////////////////////////////////////////////////////////////////////////////

impl JointNode {
    pub fn new(name: impl Into<String>, index: Index, frame_offset: Index) -> Self {
        JointNode {
            name: name.into(),
            index,
            frame_offset,
            offset: Position::new(0.0, 0.0, 0.0),
            channels: Vec::new(),
            children: Vec::new(),
            endsite: None,
        }
    }

    pub fn has_end_site(&self) -> bool {
        self.endsite.is_some()
    }

    /// Position of `label` within this joint's channel list.
    pub fn channel_index(&self, label: &str) -> Option<usize> {
        self.channels.iter().position(|c| c == label)
    }

    pub fn node_by_index(&self, index: Index) -> Option<&JointNode> {
        if self.index == index {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.node_by_index(index))
    }

    pub fn node_by_index_mut(&mut self, index: Index) -> Option<&mut JointNode> {
        if self.index == index {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.node_by_index_mut(index))
    }

    pub fn node_by_name(&self, name: &str) -> Option<&JointNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.node_by_name(name))
    }

    pub fn node_by_name_mut(&mut self, name: &str) -> Option<&mut JointNode> {
        if self.name == name {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.node_by_name_mut(name))
    }

    /// All joints below and including this one, in the order they appear in the file.
    pub fn node_list(&self) -> Vec<&JointNode> {
        fn __collect<'a>(node: &'a JointNode, out: &mut Vec<&'a JointNode>) {
            out.push(node);
            for child in node.children.iter() {
                __collect(child, out);
            }
        }
        let mut nodes = Vec::new();
        __collect(self, &mut nodes);
        nodes
    }

    /// Visit every joint in file order with mutable access.
    pub fn for_each_node_mut<F: FnMut(&mut JointNode)>(&mut self, f: &mut F) {
        f(self);
        for child in self.children.iter_mut() {
            child.for_each_node_mut(f);
        }
    }

    pub fn num_joints(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(JointNode::num_joints)
            .sum::<usize>()
    }

    /// Total channel count of the subtree, i.e. the motion row width when called on the root.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
            + self
                .children
                .iter()
                .map(JointNode::num_channels)
                .sum::<usize>()
    }

    /// Reassign every `frame_offset` from the current channel lists.
    /// Channel composition leaves offsets alone, call this once the motion matrix matches again.
    pub fn recompute_frame_offsets(&mut self) {
        let mut running = self.frame_offset;
        self.for_each_node_mut(&mut |node: &mut JointNode| {
            node.frame_offset = running;
            running += node.channels.len();
        });
    }
}

impl Bvh {
    /// Frames per second, the reciprocal of frame time rounded to the nearest integer.
    pub fn fps(&self) -> u32 {
        if self.frame_time > 0.0 {
            (1.0 / self.frame_time).round() as u32
        } else {
            0
        }
    }

    pub fn num_channels(&self) -> usize {
        self.root.num_channels()
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> JointNode {
        let mut root = JointNode::new("Hips", 0, 0);
        root.channels = vec!["Xposition", "Yposition", "Zposition", "Zrotation", "Xrotation", "Yrotation"]
            .into_iter()
            .map(String::from)
            .collect();
        let mut spine = JointNode::new("Spine", 1, 6);
        spine.channels = vec!["Zrotation".to_string(), "Xrotation".to_string(), "Yrotation".to_string()];
        spine.endsite = Some(Endsite {
            offset: Position::new(0.0, 5.0, 0.0),
        });
        let mut leg = JointNode::new("LeftLeg", 2, 9);
        leg.channels = spine.channels.clone();
        root.children.push(spine);
        root.children.push(leg);
        root
    }

    #[test]
    fn node_list_follows_discovery_order() {
        let root = small_tree();
        let names: Vec<&str> = root.node_list().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["Hips", "Spine", "LeftLeg"]);
        for (i, node) in root.node_list().iter().enumerate() {
            assert_eq!(node.index, i);
        }
        assert_eq!(root.num_joints(), 3);
        assert_eq!(root.num_channels(), 12);
    }

    #[test]
    fn lookups_return_none_on_miss() {
        let root = small_tree();
        assert_eq!(root.node_by_index(2).map(|n| n.name.as_str()), Some("LeftLeg"));
        assert!(root.node_by_index(3).is_none());
        assert_eq!(root.node_by_name("Spine").map(|n| n.index), Some(1));
        assert!(root.node_by_name("Head").is_none());
        assert_eq!(root.channel_index("Zrotation"), Some(3));
        assert_eq!(root.channel_index("Wrotation"), None);
        assert!(root.node_by_index(1).is_some_and(JointNode::has_end_site));
    }

    #[test]
    fn mutable_lookups_edit_in_place() {
        let mut root = small_tree();
        if let Some(leg) = root.node_by_name_mut("LeftLeg") {
            leg.name = "RightLeg".to_string();
        }
        if let Some(spine) = root.node_by_index_mut(1) {
            spine.channels.truncate(1);
        }
        assert!(root.node_by_name("RightLeg").is_some());
        assert_eq!(root.num_channels(), 10);
    }

    #[test]
    fn recompute_frame_offsets_follows_channel_counts() {
        let mut root = small_tree();
        if let Some(spine) = root.node_by_index_mut(1) {
            spine.channels.insert(0, "Xposition".to_string());
        }
        root.recompute_frame_offsets();
        let offsets: Vec<usize> = root.node_list().iter().map(|n| n.frame_offset).collect();
        assert_eq!(offsets, [0, 6, 10]);
    }

    #[test]
    fn fps_is_rounded_reciprocal() {
        let bvh = Bvh {
            root: small_tree(),
            motion: Vec::new(),
            num_frames: 0,
            frame_time: 0.0083333,
        };
        assert_eq!(bvh.fps(), 120);
        assert_eq!(bvh.num_channels(), 12);
    }
}

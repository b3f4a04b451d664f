use crate::error::{BvhError, BvhResult};
use crate::types::*;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::str::Lines;

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// What a single line of the HIERARCHY section declares.
/// Keywords are matched as substrings, in the order of the variants below.
#[derive(Debug, PartialEq)]
pub(crate) enum LineKind<'a> {
    OpenBrace,
    CloseBrace,
    Joint(&'a str),
    Offset(Position),
    Channels { declared: usize, labels: Vec<&'a str> },
    EndSite,
    Motion,
    Other,
}

pub(crate) struct LineTokenizer {
    re_offset: Regex,
    re_channels: Regex,
}

impl LineTokenizer {
    pub(crate) fn new() -> BvhResult<Self> {
        Ok(LineTokenizer {
            re_offset: Regex::new(r"OFFSET\s+(\S+)\s+(\S+)\s+(\S+)")?,
            re_channels: Regex::new(r"CHANNELS\s+(\d+)(.*)$")?,
        })
    }

    /// `line_no` is only used for error reporting.
    pub(crate) fn classify<'a>(&self, line: &'a str, line_no: usize) -> BvhResult<LineKind<'a>> {
        if line.contains('{') {
            return Ok(LineKind::OpenBrace);
        }
        if line.contains('}') {
            return Ok(LineKind::CloseBrace);
        }
        if line.contains("JOINT") || line.contains("ROOT") {
            //// name is the last token, whatever whitespace precedes it
            let mut tokens = line.split_whitespace();
            let name = tokens.next_back();
            return match (tokens.next(), name) {
                (Some(_), Some(name)) => Ok(LineKind::Joint(name)),
                _ => Err(BvhError::format(line_no, "joint declared without a name")),
            };
        }
        if line.contains("OFFSET") {
            let captures = self
                .re_offset
                .captures(line)
                .ok_or_else(|| BvhError::format(line_no, "OFFSET needs three numbers"))?;
            let mut xyz = [0.0; 3];
            for (i, value) in xyz.iter_mut().enumerate() {
                let token = &captures[i + 1];
                *value = token.parse::<f64>().map_err(|e| {
                    BvhError::format(line_no, format!("invalid OFFSET value {token:?}: {e}"))
                })?;
            }
            return Ok(LineKind::Offset(Position::new(xyz[0], xyz[1], xyz[2])));
        }
        if line.contains("CHANNELS") {
            let captures = self
                .re_channels
                .captures(line)
                .ok_or_else(|| BvhError::format(line_no, "CHANNELS needs a channel count"))?;
            let declared = captures[1]
                .parse::<usize>()
                .map_err(|e| BvhError::format(line_no, format!("invalid channel count: {e}")))?;
            let labels = captures
                .get(2)
                .map(|m| m.as_str().split_whitespace().collect())
                .unwrap_or_default();
            return Ok(LineKind::Channels { declared, labels });
        }
        if line.contains("End Site") {
            return Ok(LineKind::EndSite);
        }
        if line.contains("MOTION") {
            return Ok(LineKind::Motion);
        }
        Ok(LineKind::Other)
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Joints are collected flat while parsing and assembled into the owned tree at the end.
struct Hierarchy {
    nodes: Vec<Option<JointNode>>,
    children: Vec<Vec<Index>>,
    num_channels: usize,
}

impl Hierarchy {
    fn node_mut(&mut self, index: Option<Index>, line_no: usize, what: &str) -> BvhResult<&mut JointNode> {
        let node = match index {
            Some(i) => self.nodes.get_mut(i).and_then(Option::as_mut),
            None => None,
        };
        node.ok_or_else(|| BvhError::format(line_no, format!("{what} outside of a joint")))
    }

    /// Children always have a higher index than their parent, so a reverse pass can move them in.
    fn into_root(mut self) -> Option<JointNode> {
        for i in (0..self.nodes.len()).rev() {
            let kids: Vec<JointNode> = self.children[i]
                .iter()
                .filter_map(|&child| self.nodes[child].take())
                .collect();
            if let Some(node) = self.nodes[i].as_mut() {
                node.children = kids;
            }
        }
        self.nodes.into_iter().next().flatten()
    }
}

/// Returns the joints read and the line number of the MOTION marker.
fn __parse_hierarchy(lines: &mut std::iter::Enumerate<Lines>) -> BvhResult<(Hierarchy, usize)> {
    let tokenizer = LineTokenizer::new()?;
    let mut hierarchy = Hierarchy {
        nodes: Vec::new(),
        children: Vec::new(),
        num_channels: 0,
    };

    let mut stack: Vec<Option<Index>> = Vec::new();
    let mut current: Option<Index> = None;
    let mut pending: Option<Index> = None;
    // (joint index, inside its End Site) pairs whose OFFSET is already set
    let mut offsets_seen: HashSet<(Index, bool)> = HashSet::new();

    for (i, line) in lines {
        let line_no = i + 1;
        match tokenizer.classify(line, line_no)? {
            LineKind::OpenBrace => {
                stack.push(current);
                current = pending;
            }
            LineKind::CloseBrace => {
                current = stack
                    .pop()
                    .ok_or_else(|| BvhError::format(line_no, "closing brace without a matching opening brace"))?;
            }
            LineKind::Joint(name) => {
                let index = hierarchy.nodes.len();
                match current {
                    Some(parent) => {
                        if hierarchy.nodes[parent].as_ref().is_some_and(JointNode::has_end_site) {
                            return Err(BvhError::format(
                                line_no,
                                format!("joint {name:?} declared after an End Site"),
                            ));
                        }
                        hierarchy.children[parent].push(index)
                    }
                    None if index == 0 => current = Some(index),
                    None => {
                        return Err(BvhError::format(line_no, format!("joint {name:?} has no parent")));
                    }
                }
                tracing::debug!(
                    "joint {} '{}' at column {}",
                    index,
                    name,
                    hierarchy.num_channels
                );
                hierarchy
                    .nodes
                    .push(Some(JointNode::new(name, index, hierarchy.num_channels)));
                hierarchy.children.push(Vec::new());
                pending = Some(index);
            }
            LineKind::Offset(offset) => {
                let joint = hierarchy.node_mut(current, line_no, "OFFSET")?;
                if !offsets_seen.insert((joint.index, joint.endsite.is_some())) {
                    return Err(BvhError::format(
                        line_no,
                        format!("second OFFSET for '{}'", joint.name),
                    ));
                }
                match joint.endsite.as_mut() {
                    Some(endsite) => endsite.offset = offset,
                    None => joint.offset = offset,
                }
            }
            LineKind::Channels { declared, labels } => {
                let joint = hierarchy.node_mut(current, line_no, "CHANNELS")?;
                if declared != labels.len() {
                    tracing::warn!(
                        "line {}: joint '{}' declares {} channels but lists {}",
                        line_no,
                        joint.name,
                        declared,
                        labels.len()
                    );
                }
                joint.channels.extend(labels.iter().map(|s| s.to_string()));
                hierarchy.num_channels += labels.len();
            }
            LineKind::EndSite => {
                let joint = hierarchy.node_mut(current, line_no, "End Site")?;
                joint.endsite = Some(Endsite {
                    offset: Position::new(0.0, 0.0, 0.0),
                });
            }
            LineKind::Motion => return Ok((hierarchy, line_no)),
            LineKind::Other => {}
        }
    }
    Err(BvhError::NotBvh)
}

/// Next line that is not empty (or whitespace only), with its 1-based line number.
fn __next_non_blank<'a>(lines: &mut std::iter::Enumerate<Lines<'a>>) -> Option<(usize, &'a str)> {
    lines
        .find(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, line))
}

fn __last_token(line: &str) -> &str {
    line.split_whitespace().next_back().unwrap_or("")
}

fn parse_bvh(lines: Lines) -> BvhResult<Bvh> {
    let mut it = lines.enumerate();

    //////////////////////////////////// PARSING HIERARCHY ////////////////////////////////////
    let (hierarchy, motion_line_no) = __parse_hierarchy(&mut it)?;
    let num_channels = hierarchy.num_channels;
    let root = hierarchy
        .into_root()
        .ok_or_else(|| BvhError::format(1, "no ROOT joint before MOTION"))?;

    //////////////////////////////////// PARSING HEADER ////////////////////////////////////
    let (line_no, line) = __next_non_blank(&mut it)
        .ok_or_else(|| BvhError::format(motion_line_no, "missing \"Frames:\" line after MOTION"))?;
    let num_frames = __last_token(line)
        .parse::<usize>()
        .map_err(|e| BvhError::format(line_no, format!("invalid frame count: {e}")))?;

    let (line_no, line) = __next_non_blank(&mut it)
        .ok_or_else(|| BvhError::format(line_no, "missing \"Frame Time:\" line after \"Frames:\""))?;
    let frame_time = __last_token(line)
        .parse::<f64>()
        .map_err(|e| BvhError::format(line_no, format!("invalid frame time: {e}")))?;

    //////////////////////////////////// PARSING MOTION ////////////////////////////////////
    let mut motion: MotionMatrix = Vec::new();
    for (i, line) in it {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = i + 1;
        let row = line
            .split_whitespace()
            .map(|s| {
                s.parse::<f64>()
                    .map_err(|e| BvhError::format(line_no, format!("invalid motion value {s:?}: {e}")))
            })
            .collect::<BvhResult<Vec<f64>>>()?;
        if row.len() != num_channels {
            return Err(BvhError::format(
                line_no,
                format!("motion row has {} values, hierarchy declares {} channels", row.len(), num_channels),
            ));
        }
        motion.push(row);
    }

    if motion.len() != num_frames {
        tracing::warn!(
            "header declares {} frames but {} were read",
            num_frames,
            motion.len()
        );
    }

    tracing::info!(
        "Parsed bvh: {} joints, {} channels, {} frames at {}s",
        root.num_joints(),
        num_channels,
        motion.len(),
        frame_time
    );

    Ok(Bvh {
        root,
        motion,
        num_frames,
        frame_time,
    })
}

//////////////////////////////////////////////////////////////// PUBLIC ///////////////////////////////////////////////////////////////////////////////////////////////////////

/// load a bvh file from a file path
pub fn load_bvh_from_file<P: AsRef<Path>>(file_path: P) -> BvhResult<Bvh> {
    let contents = std::fs::read_to_string(file_path.as_ref())?;
    load_bvh_from_string(&contents)
}

/// load a bvh file from a string
pub fn load_bvh_from_string(bvh_string: &str) -> BvhResult<Bvh> {
    parse_bvh(bvh_string.lines())
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

use crate::error::BvhResult;
use crate::types::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Shortest text that parses back to the same f64.
fn __number(value: f64) -> String {
    format!("{value:?}")
}

fn __position(position: &Position) -> String {
    format!(
        "{} {} {}",
        __number(position.x),
        __number(position.y),
        __number(position.z)
    )
}

/// Body of a joint block (everything between its braces), two spaces of indent per level.
fn __write_joint<W: Write>(w: &mut W, joint: &JointNode, depth: usize) -> io::Result<()> {
    let indent = "  ".repeat(depth + 1);
    writeln!(w, "{indent}OFFSET {}", __position(&joint.offset))?;
    if joint.channels.is_empty() {
        writeln!(w, "{indent}CHANNELS 0")?;
    } else {
        writeln!(
            w,
            "{indent}CHANNELS {} {}",
            joint.channels.len(),
            joint.channels.join(" ")
        )?;
    }

    if let Some(endsite) = &joint.endsite {
        writeln!(w, "{indent}End Site")?;
        writeln!(w, "{indent}{{")?;
        writeln!(w, "{indent}  OFFSET {}", __position(&endsite.offset))?;
        writeln!(w, "{indent}}}")?;
    } else {
        for child in joint.children.iter() {
            writeln!(w, "{indent}JOINT {}", child.name)?;
            writeln!(w, "{indent}{{")?;
            __write_joint(w, child, depth + 1)?;
            writeln!(w, "{indent}}}")?;
        }
    }
    Ok(())
}

//////////////////////////////////////////////////////////////// PUBLIC ///////////////////////////////////////////////////////////////////////////////////////////////////////

/// Write a whole document (HIERARCHY and MOTION sections) to `w`.
pub fn write_bvh<W: Write>(w: &mut W, bvh: &Bvh) -> io::Result<()> {
    //// HIERARCHY
    writeln!(w, "HIERARCHY")?;
    writeln!(w, "ROOT {}", bvh.root.name)?;
    writeln!(w, "{{")?;
    __write_joint(w, &bvh.root, 0)?;
    writeln!(w, "}}")?;

    //// MOTION
    writeln!(w, "MOTION")?;
    writeln!(w, "Frames: {}", bvh.num_frames)?;
    writeln!(w, "Frame Time: {}", __number(bvh.frame_time))?;
    for row in bvh.motion.iter() {
        let line = row
            .iter()
            .map(|&value| __number(value))
            .collect::<Vec<String>>()
            .join(" ");
        writeln!(w, "{line}")?;
    }
    Ok(())
}

/// write a bvh document into a string
pub fn write_bvh_to_string(bvh: &Bvh) -> BvhResult<String> {
    let mut buffer: Vec<u8> = Vec::new();
    write_bvh(&mut buffer, bvh)?;
    Ok(String::from_utf8(buffer)?)
}

/// write a bvh document to a file path. The file is not written atomically.
pub fn save_bvh_to_file<P: AsRef<Path>>(bvh: &Bvh, file_path: P) -> BvhResult<()> {
    let file_path = file_path.as_ref();
    let mut writer = BufWriter::new(File::create(file_path)?);
    write_bvh(&mut writer, bvh)?;
    writer.flush()?;
    tracing::info!(
        "Saved bvh to {:?}: {} joints, {} frames",
        file_path,
        bvh.root.num_joints(),
        bvh.motion.len()
    );
    Ok(())
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

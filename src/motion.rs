//! Splitting the motion matrix into position and rotation halves and putting it back together.
//!
//! Both directions assume every joint owns a block of 6 columns, 3 position channels followed
//! by 3 rotation channels, i.e. a hierarchy that went through [`ChannelMode::All`].
//!
//! [`ChannelMode::All`]: crate::channels::ChannelMode::All

use crate::error::{BvhError, BvhResult};
use crate::types::MotionMatrix;

/// Common row width of `matrix`, or an error naming the first row that differs.
fn __row_width(matrix: &[Vec<f64>], side: &str) -> BvhResult<usize> {
    let width = matrix.first().map_or(0, Vec::len);
    match matrix.iter().position(|row| row.len() != width) {
        Some(frame) => Err(BvhError::column_count(format!(
            "{side} frame {frame} has {} columns, frame 0 has {width}",
            matrix[frame].len()
        ))),
        None => Ok(width),
    }
}

/// Separate the motion part into position and rotation channels.
///
/// With `root_has_both` the root's 6 columns are copied into both outputs, otherwise the root
/// is split like any other joint. Returns `(position, rotation)`.
pub fn split_motion_part(
    matrix: &[Vec<f64>],
    root_has_both: bool,
) -> BvhResult<(MotionMatrix, MotionMatrix)> {
    let width = __row_width(matrix, "motion")?;
    if matrix.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }
    if width < 6 || width % 6 != 0 {
        return Err(BvhError::column_count(format!(
            "expected a multiple of 6 columns, got {width}"
        )));
    }

    let mut position = Vec::with_capacity(matrix.len());
    let mut rotation = Vec::with_capacity(matrix.len());
    for row in matrix.iter() {
        let (mut pos, mut rot) = if root_has_both {
            (row[0..6].to_vec(), row[0..6].to_vec())
        } else {
            (row[0..3].to_vec(), row[3..6].to_vec())
        };
        for i in (6..width).step_by(6) {
            pos.extend_from_slice(&row[i..i + 3]);
            rot.extend_from_slice(&row[i + 3..i + 6]);
        }
        position.push(pos);
        rotation.push(rot);
    }
    Ok((position, rotation))
}

/// Combine position and rotation channels into one motion matrix, interleaving 3-column blocks.
///
/// With `root_has_both` the first 6 columns are taken from `position` alone; the rotation
/// side's copy of the root is ignored.
pub fn combine_motion_part(
    position: &[Vec<f64>],
    rotation: &[Vec<f64>],
    root_has_both: bool,
) -> BvhResult<MotionMatrix> {
    if position.len() != rotation.len() {
        return Err(BvhError::SizeMismatch {
            position: position.len(),
            rotation: rotation.len(),
        });
    }
    let width = __row_width(position, "position")?;
    let rotation_width = __row_width(rotation, "rotation")?;
    if position.is_empty() {
        return Ok(Vec::new());
    }
    if width != rotation_width {
        return Err(BvhError::column_count(format!(
            "position has {width} columns but rotation has {rotation_width}"
        )));
    }
    let start = if root_has_both { 6 } else { 0 };
    if width < start || (width - start) % 3 != 0 {
        return Err(BvhError::column_count(format!(
            "{width} columns do not split into {}3-column joint blocks",
            if root_has_both { "a 6-column root and " } else { "" }
        )));
    }

    let combined = position
        .iter()
        .zip(rotation.iter())
        .map(|(pos, rot)| {
            let mut row = Vec::with_capacity(width * 2 - start);
            row.extend_from_slice(&pos[0..start]);
            for i in (start..width).step_by(3) {
                row.extend_from_slice(&pos[i..i + 3]);
                row.extend_from_slice(&rot[i..i + 3]);
            }
            row
        })
        .collect();
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3 joints with 6 columns each, values encode (frame, column).
    fn motion() -> MotionMatrix {
        (0..3)
            .map(|f| (0..18).map(|c| (f * 100 + c) as f64).collect())
            .collect()
    }

    #[test]
    fn split_without_root_both_takes_halves_of_every_block() {
        let (pos, rot) = split_motion_part(&motion(), false).unwrap();
        assert_eq!(pos.len(), 3);
        assert_eq!(pos[0], [0.0, 1.0, 2.0, 6.0, 7.0, 8.0, 12.0, 13.0, 14.0]);
        assert_eq!(rot[0], [3.0, 4.0, 5.0, 9.0, 10.0, 11.0, 15.0, 16.0, 17.0]);
        assert_eq!(rot[2][0], 203.0);
    }

    #[test]
    fn split_with_root_both_copies_root_into_both_sides() {
        let (pos, rot) = split_motion_part(&motion(), true).unwrap();
        assert_eq!(pos[1].len(), 12);
        assert_eq!(pos[1][..6], rot[1][..6]);
        assert_eq!(pos[1][6..], [106.0, 107.0, 108.0, 112.0, 113.0, 114.0]);
        assert_eq!(rot[1][6..], [109.0, 110.0, 111.0, 115.0, 116.0, 117.0]);
    }

    #[test]
    fn split_then_combine_restores_matrix() {
        let original = motion();
        for root_has_both in [false, true] {
            let (pos, rot) = split_motion_part(&original, root_has_both).unwrap();
            let combined = combine_motion_part(&pos, &rot, root_has_both).unwrap();
            assert_eq!(combined, original);
        }
    }

    #[test]
    fn combine_with_root_both_reads_root_from_position_only() {
        let (pos, mut rot) = split_motion_part(&motion(), true).unwrap();
        for row in rot.iter_mut() {
            row[..6].fill(-1.0);
        }
        let combined = combine_motion_part(&pos, &rot, true).unwrap();
        assert_eq!(combined, motion());
    }

    #[test]
    fn split_rejects_partial_blocks() {
        let matrix = vec![vec![0.0; 9]];
        assert!(matches!(
            split_motion_part(&matrix, false),
            Err(BvhError::ColumnCount { .. })
        ));
        let ragged = vec![vec![0.0; 12], vec![0.0; 6]];
        assert!(matches!(
            split_motion_part(&ragged, true),
            Err(BvhError::ColumnCount { .. })
        ));
    }

    #[test]
    fn combine_rejects_different_frame_counts() {
        let position = vec![vec![0.0; 6]; 3];
        let rotation = vec![vec![0.0; 6]; 4];
        match combine_motion_part(&position, &rotation, false) {
            Err(BvhError::SizeMismatch { position, rotation }) => {
                assert_eq!((position, rotation), (3, 4));
            }
            other => panic!("expected a size mismatch, got {other:?}"),
        }
    }

    #[test]
    fn combine_rejects_different_widths() {
        let position = vec![vec![0.0; 9]; 2];
        let rotation = vec![vec![0.0; 6]; 2];
        assert!(matches!(
            combine_motion_part(&position, &rotation, false),
            Err(BvhError::ColumnCount { .. })
        ));
    }

    #[test]
    fn root_only_matrix_survives_split_and_combine() {
        let motion = vec![vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]; 2];
        for root_has_both in [false, true] {
            let (pos, rot) = split_motion_part(&motion, root_has_both).unwrap();
            assert_eq!(combine_motion_part(&pos, &rot, root_has_both).unwrap(), motion);
        }
        let (pos, rot) = split_motion_part(&motion, true).unwrap();
        assert_eq!((pos[0].len(), rot[0].len()), (6, 6));
    }

    #[test]
    fn combine_rejects_root_narrower_than_six_columns() {
        let narrow = vec![vec![0.0; 3]; 2];
        assert!(matches!(
            combine_motion_part(&narrow, &narrow, true),
            Err(BvhError::ColumnCount { .. })
        ));
    }

    #[test]
    fn empty_matrices_pass_through() {
        let (pos, rot) = split_motion_part(&[], true).unwrap();
        assert!(pos.is_empty() && rot.is_empty());
        assert!(combine_motion_part(&pos, &rot, true).unwrap().is_empty());
    }
}

use std::fmt;

use super::component::ComponentId;

/// Axis an [`Align`] positions on, before rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Rotation of the axis in an unrotated frame, in degrees.
    pub fn base_rotation(self) -> f64 {
        match self {
            Axis::Horizontal => 0.0,
            Axis::Vertical => 90.0,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::Horizontal => "hAlign",
            Axis::Vertical => "vAlign",
        })
    }
}

/// Tier of an alignment instruction. Higher tiers replace lower ones; two
/// instructions on the same tier for one axis are an encoding error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    ImplicitByDocOrder = 0,
    RendAttr = 5,
    IndentAttr = 7,
    IndentCenterAttr = 8,
    Explicit = 10,
    MainZone = 15,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::ImplicitByDocOrder => "IMPLICIT_BY_DOC_ORDER",
            Priority::RendAttr => "REND_ATTR",
            Priority::IndentAttr => "INDENT_ATTR",
            Priority::IndentCenterAttr => "INDENT_CENTER_ATTR",
            Priority::Explicit => "EXPLICIT",
            Priority::MainZone => "MAIN_ZONE",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlignKind {
    /// Put `my_joint` of my extent at `your_joint` of `you`'s extent, along
    /// the axis rotated by `coord_rotation` degrees.
    Relative {
        you: ComponentId,
        coord_rotation: f64,
        my_joint: f64,
        your_joint: f64,
    },
    /// Pin to a fixed coordinate.
    Absolute { coord_rotation: f64, coordinate: f64 },
    /// Leave the axis alone.
    Null,
}

/// A one-dimensional positioning constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Align {
    pub kind: AlignKind,
    pub priority: Priority,
}

impl Align {
    pub fn relative(
        you: ComponentId,
        coord_rotation: f64,
        my_joint: f64,
        your_joint: f64,
        priority: Priority,
    ) -> Self {
        Self {
            kind: AlignKind::Relative {
                you,
                coord_rotation,
                my_joint,
                your_joint,
            },
            priority,
        }
    }

    pub fn absolute(coord_rotation: f64, coordinate: f64, priority: Priority) -> Self {
        Self {
            kind: AlignKind::Absolute {
                coord_rotation,
                coordinate,
            },
            priority,
        }
    }

    /// No constraint. Its priority is never compared: any other align
    /// replaces it, and it never replaces one.
    pub fn null() -> Self {
        Self {
            kind: AlignKind::Null,
            priority: Priority::ImplicitByDocOrder,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, AlignKind::Null)
    }

    /// The component this align refers to, if any.
    pub fn target(&self) -> Option<ComponentId> {
        match self.kind {
            AlignKind::Relative { you, .. } => Some(you),
            _ => None,
        }
    }
}

/// Cosine and sine of an angle in degrees, exact on quarter turns.
pub fn cos_sin(degrees: f64) -> (f64, f64) {
    let turn = degrees.rem_euclid(360.0);
    if turn == 0.0 {
        (1.0, 0.0)
    } else if turn == 90.0 {
        (0.0, 1.0)
    } else if turn == 180.0 {
        (-1.0, 0.0)
    } else if turn == 270.0 {
        (0.0, -1.0)
    } else {
        let r = degrees.to_radians();
        (r.cos(), r.sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, (1.0, 0.0))]
    #[case(90.0, (0.0, 1.0))]
    #[case(-90.0, (0.0, -1.0))]
    #[case(450.0, (0.0, 1.0))]
    #[case(180.0, (-1.0, 0.0))]
    fn quarter_turns_are_exact(#[case] degrees: f64, #[case] expected: (f64, f64)) {
        assert_eq!(cos_sin(degrees), expected);
    }

    #[test]
    fn other_angles_use_trigonometry() {
        let (c, s) = cos_sin(45.0);
        assert!((c - s).abs() < 1e-12);
        assert!((c - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn priorities_are_ordered() {
        assert!(Priority::ImplicitByDocOrder < Priority::RendAttr);
        assert!(Priority::RendAttr < Priority::IndentAttr);
        assert!(Priority::IndentAttr < Priority::IndentCenterAttr);
        assert!(Priority::IndentCenterAttr < Priority::Explicit);
        assert!(Priority::Explicit < Priority::MainZone);
        assert_eq!(Priority::MainZone.to_string(), "MAIN_ZONE");
    }
}

//! Numeric tolerances shared by the geometry and the solver.
//!
//! Collision behaviour is sensitive to every value in here. Keep them in one place.

/// Half-thickness of a clip plane: points closer than this count as lying on it.
pub const PLANE_THICKNESS: f32 = 1e-2;

/// `|dot(n, dir)|` below which a unit segment direction is treated as parallel to a plane.
pub const PARALLEL_EPSILON: f32 = 1e-3;

/// `|cross(a, b)|` of unit edge directions below which two edges are parallel.
pub const PARALLEL_EDGE_EPSILON: f32 = 1e-3;

/// Relative magnitude of the 2x2 line-line determinant below which it is singular.
pub const SINGULAR_EPSILON: f32 = 1e-6;

/// Two adjacent triangles belong to one face when `dot(n1, n2) > 1 - FACE_MERGE_EPSILON`.
pub const FACE_MERGE_EPSILON: f32 = 1e-6;

/// Triangles whose un-normalized normal is shorter than this are discarded.
pub const DEGENERATE_NORMAL_EPSILON: f32 = 1e-8;

/// A face axis is preferred over an edge axis (and A's face over B's) unless the
/// alternative is shallower by more than this.
pub const AXIS_TIE_TOLERANCE: f32 = 1e-4;

/// Contact points closer than this are merged.
pub const CONTACT_MERGE_DISTANCE: f32 = 1e-4;

/// Distance a tested point is pulled towards the face center before the parity test.
pub const INSIDE_TEST_OFFSET: f32 = PLANE_THICKNESS;

/// Slack on the `[0, 1]` segment parameters of the edge-edge closest points.
pub const SEGMENT_PARAM_SLACK: f32 = 1e-4;

/// Remaining depth at which a contact no longer needs positional correction.
pub const PENETRATION_EPSILON: f32 = 1e-6;

/// Separating velocities closer than this are considered tied.
pub const VELOCITY_TIE_EPSILON: f32 = 1e-6;

/// Default inverse mass at or below which a body is immovable.
pub const DEFAULT_INFINITE_MASS_EPSILON: f32 = 1e-4;

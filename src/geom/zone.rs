//! Rectangular zones in grid-index space.
//!
//! A zone is a pair of half-open index ranges (rows, columns) tagged with a
//! behavioural kind. Zones are resolved once from [`ZonePlacement`]s, which
//! express positions as fractions of `N-1` so the same catalogue scales with
//! the node count.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Behaviour attached to a rectangular region of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    /// Solid obstacle kept near local equilibrium with its exterior faces.
    Wall,
    /// Heat sink clamped to a fixed temperature.
    Window,
    /// Insulated (zero-gradient) edge of the room.
    ExternalBorder,
    /// Thermostat-controlled heat source.
    Heater,
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ZoneKind::Wall => "wall",
            ZoneKind::Window => "window",
            ZoneKind::ExternalBorder => "external border",
            ZoneKind::Heater => "heater",
        };
        f.write_str(s)
    }
}

/// A resolved, immutable rectangle `rows × cols` in index space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub kind: ZoneKind,
    pub label: String,
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl Zone {
    /// Creates a zone and checks it is non-empty and inside a `nodes × nodes` grid.
    pub fn new(
        kind: ZoneKind,
        label: impl Into<String>,
        rows: Range<usize>,
        cols: Range<usize>,
        nodes: usize,
    ) -> Result<Self, SimError> {
        let label = label.into();
        for (axis, r) in [("rows", &rows), ("cols", &cols)] {
            if r.start >= r.end {
                return Err(SimError::config(format!(
                    "{kind} zone '{label}': empty {axis} range {}..{}",
                    r.start, r.end
                )));
            }
            if r.end > nodes {
                return Err(SimError::config(format!(
                    "{kind} zone '{label}': {axis} range {}..{} exceeds grid of {nodes} nodes",
                    r.start, r.end
                )));
            }
        }
        Ok(Self {
            kind,
            label,
            rows,
            cols,
        })
    }

    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.rows.contains(&i) && self.cols.contains(&j)
    }

    pub fn cell_count(&self) -> usize {
        self.rows.len() * self.cols.len()
    }

    /// Cells of the zone in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows
            .clone()
            .flat_map(move |i| self.cols.clone().map(move |j| (i, j)))
    }
}

/// One end of an index range, expressed relative to the node count `N`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Bound {
    /// Absolute index.
    Index(usize),
    /// `floor(f * (N-1))`.
    Fraction(f64),
    /// `N-1`.
    Last,
    /// `N` (one past the last index).
    End,
}

impl Bound {
    fn resolve(self, nodes: usize) -> Result<usize, String> {
        match self {
            Bound::Index(i) => Ok(i),
            Bound::Fraction(f) => {
                if !f.is_finite() || f < 0.0 {
                    return Err(format!("invalid fraction {f}"));
                }
                Ok((f * (nodes - 1) as f64).floor() as usize)
            }
            Bound::Last => Ok(nodes - 1),
            Bound::End => Ok(nodes),
        }
    }
}

/// Index extent of a zone along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Extent {
    /// Half-open `[start, stop)`.
    Range { start: Bound, stop: Bound },
    /// Wall-thickness band `[c - t/2, c + t/2)` around `c = floor(at * (N-1))`.
    Band { at: f64 },
    /// A single index.
    Line(Bound),
}

impl Extent {
    pub fn range(start: Bound, stop: Bound) -> Self {
        Extent::Range { start, stop }
    }

    pub fn fractions(start: f64, stop: f64) -> Self {
        Extent::Range {
            start: Bound::Fraction(start),
            stop: Bound::Fraction(stop),
        }
    }

    pub fn indices(start: usize, stop: usize) -> Self {
        Extent::Range {
            start: Bound::Index(start),
            stop: Bound::Index(stop),
        }
    }

    /// Resolves to a concrete index range. Emptiness and bounds are checked by [`Zone::new`].
    pub fn resolve(&self, nodes: usize, wall_thickness: usize) -> Result<Range<usize>, String> {
        match *self {
            Extent::Range { start, stop } => Ok(start.resolve(nodes)?..stop.resolve(nodes)?),
            Extent::Band { at } => {
                let center = Bound::Fraction(at).resolve(nodes)?;
                let half = wall_thickness / 2;
                let Some(start) = center.checked_sub(half) else {
                    return Err(format!(
                        "band at {at} with thickness {wall_thickness} starts before index 0"
                    ));
                };
                Ok(start..center + half)
            }
            Extent::Line(b) => {
                let i = b.resolve(nodes)?;
                Ok(i..i + 1)
            }
        }
    }
}

/// Placement of a zone, independent of the node count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonePlacement {
    pub kind: ZoneKind,
    #[serde(default)]
    pub label: String,
    pub rows: Extent,
    pub cols: Extent,
}

impl ZonePlacement {
    pub fn new(kind: ZoneKind, label: &str, rows: Extent, cols: Extent) -> Self {
        Self {
            kind,
            label: label.to_string(),
            rows,
            cols,
        }
    }

    pub fn resolve(&self, nodes: usize, wall_thickness: usize) -> Result<Zone, SimError> {
        let describe = |e: String| {
            SimError::config(format!("{} zone '{}': {e}", self.kind, self.label))
        };
        let rows = self.rows.resolve(nodes, wall_thickness).map_err(describe)?;
        let cols = self.cols.resolve(nodes, wall_thickness).map_err(describe)?;
        Zone::new(self.kind, self.label.clone(), rows, cols, nodes)
    }
}

/// The zone catalogue of the reference room: three interior walls, two
/// windows and two heaters.
pub fn default_placements() -> Vec<ZonePlacement> {
    use Bound::*;
    use ZoneKind::*;

    vec![
        ZonePlacement::new(
            Wall,
            "wall_upper",
            Extent::Band { at: 0.25 },
            Extent::range(Index(0), Fraction(0.31)),
        ),
        ZonePlacement::new(
            Wall,
            "wall_middle",
            Extent::Band { at: 0.6 },
            Extent::range(Fraction(0.5), End),
        ),
        ZonePlacement::new(
            Wall,
            "wall_lower",
            Extent::range(Fraction(0.4), End),
            Extent::Band { at: 0.3 },
        ),
        ZonePlacement::new(
            Window,
            "window_top",
            Extent::Line(Index(0)),
            Extent::fractions(0.47, 0.8),
        ),
        ZonePlacement::new(
            Window,
            "window_right",
            Extent::fractions(0.67, 0.95),
            Extent::Line(Last),
        ),
        ZonePlacement::new(
            Heater,
            "heater_top",
            Extent::indices(4, 6),
            Extent::fractions(0.5, 0.8),
        ),
        ZonePlacement::new(
            Heater,
            "heater_left",
            Extent::fractions(0.6, 0.8),
            Extent::indices(1, 4),
        ),
    ]
}

/// The four one-cell insulated edges of an `nodes × nodes` grid.
pub fn external_borders(nodes: usize) -> Result<Vec<Zone>, SimError> {
    use ZoneKind::ExternalBorder;
    Ok(vec![
        Zone::new(ExternalBorder, "border_top", 0..1, 0..nodes, nodes)?,
        Zone::new(ExternalBorder, "border_bottom", nodes - 1..nodes, 0..nodes, nodes)?,
        Zone::new(ExternalBorder, "border_left", 0..nodes, 0..1, nodes)?,
        Zone::new(ExternalBorder, "border_right", 0..nodes, nodes - 1..nodes, nodes)?,
    ])
}

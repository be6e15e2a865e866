//! Static per-point attributes baked once at startup.
//!
//! The field is a `width × height` lattice walked with `i` as the outer loop
//! and `j` as the inner loop. Every GPU attribute buffer is indexed by that
//! walk, so the ordering of [`PointField::records`] and of every buffer in
//! [`FieldBuffers`] must stay in lockstep.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Inclusive range for [`PointRecord::speed`].
pub const SPEED_RANGE: (f32, f32) = (0.4, 1.0);
/// Inclusive range for [`PointRecord::phase_offset`].
pub const PHASE_OFFSET_RANGE: (f32, f32) = (-1000.0, 1000.0);
/// Inclusive range for [`PointRecord::press_response`].
pub const PRESS_RESPONSE_RANGE: (f32, f32) = (0.4, 1.0);
/// World units between neighbouring lattice cells.
pub const CELL_SPACING: f32 = 2.0;

/// Lattice dimensions of the point field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    /// Largest lattice the renderer accepts (4096×4096 points).
    pub const MAX_POINTS: u64 = 1 << 24;

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn point_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Non-empty and within [`GridSize::MAX_POINTS`].
    pub fn is_supported(&self) -> bool {
        let points = u64::from(self.width) * u64::from(self.height);
        points > 0 && points <= Self::MAX_POINTS
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(512, 512)
    }
}

/// One GPU point and its immutable attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRecord {
    pub grid_coordinate: (u32, u32),
    pub world_position: [f32; 3],
    pub speed: f32,
    pub phase_offset: f32,
    pub direction: f32,
    pub press_response: f32,
}

/// Ordered, immutable collection of every point in the lattice.
#[derive(Debug, Clone)]
pub struct PointField {
    size: GridSize,
    records: Vec<PointRecord>,
}

/// Parallel attribute arrays ready for upload as vertex buffers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldBuffers {
    pub positions: Vec<[f32; 3]>,
    /// `(i, j, 0)` per point.
    pub coordinates: Vec<[f32; 3]>,
    pub speeds: Vec<f32>,
    pub offsets: Vec<f32>,
    pub directions: Vec<f32>,
    pub presses: Vec<f32>,
}

impl FieldBuffers {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Builds a [`PointField`] for a given lattice.
#[derive(Debug, Clone, Copy)]
pub struct FieldBuilder {
    size: GridSize,
    seed: Option<u64>,
}

impl FieldBuilder {
    pub fn new(size: GridSize) -> Self {
        Self { size, seed: None }
    }

    /// Makes the randomised attributes reproducible across builds.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(&self) -> PointField {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.build_with(&mut rng)
    }

    pub fn build_with<R: Rng + ?Sized>(&self, rng: &mut R) -> PointField {
        let GridSize { width, height } = self.size;
        let half_width = width as f32 / 2.0;
        let half_height = height as f32 / 2.0;
        let mut records = Vec::with_capacity(self.size.point_count());

        for i in 0..width {
            let pos_x = (i as f32 - half_width) * CELL_SPACING;
            for j in 0..height {
                records.push(PointRecord {
                    grid_coordinate: (i, j),
                    world_position: [pos_x, (j as f32 - half_height) * CELL_SPACING, 0.0],
                    speed: rng.gen_range(SPEED_RANGE.0..=SPEED_RANGE.1),
                    phase_offset: rng.gen_range(PHASE_OFFSET_RANGE.0..=PHASE_OFFSET_RANGE.1),
                    direction: if rng.gen_bool(0.5) { 1.0 } else { -1.0 },
                    press_response: rng.gen_range(PRESS_RESPONSE_RANGE.0..=PRESS_RESPONSE_RANGE.1),
                });
            }
        }

        tracing::debug!(
            width,
            height,
            points = records.len(),
            seeded = self.seed.is_some(),
            "built point field"
        );

        PointField {
            size: self.size,
            records,
        }
    }
}

impl PointField {
    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PointRecord] {
        &self.records
    }

    /// Flattens the records into per-attribute arrays, preserving order.
    pub fn buffers(&self) -> FieldBuffers {
        let count = self.records.len();
        let mut buffers = FieldBuffers {
            positions: Vec::with_capacity(count),
            coordinates: Vec::with_capacity(count),
            speeds: Vec::with_capacity(count),
            offsets: Vec::with_capacity(count),
            directions: Vec::with_capacity(count),
            presses: Vec::with_capacity(count),
        };
        for record in &self.records {
            let (i, j) = record.grid_coordinate;
            buffers.positions.push(record.world_position);
            buffers.coordinates.push([i as f32, j as f32, 0.0]);
            buffers.speeds.push(record.speed);
            buffers.offsets.push(record.phase_offset);
            buffers.directions.push(record.direction);
            buffers.presses.push(record.press_response);
        }
        buffers
    }
}

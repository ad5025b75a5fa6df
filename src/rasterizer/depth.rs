//! Depth buffer with a pluggable comparison policy

/// Decides whether a candidate depth replaces the stored one
pub trait DepthCompare {
    /// `true` if `candidate` wins over `current`
    fn compare(&self, current: f32, candidate: f32) -> bool;

    /// Value a cleared buffer holds, i.e. one every candidate beats
    fn clear_value(&self) -> f32;
}

/// Smaller depth is nearer
#[derive(Debug, Clone, Copy, Default)]
pub struct LessWins;

impl DepthCompare for LessWins {
    fn compare(&self, current: f32, candidate: f32) -> bool {
        candidate < current
    }

    fn clear_value(&self) -> f32 {
        f32::INFINITY
    }
}

/// Larger depth is nearer (e.g. when storing 1/w)
#[derive(Debug, Clone, Copy, Default)]
pub struct GreaterWins;

impl DepthCompare for GreaterWins {
    fn compare(&self, current: f32, candidate: f32) -> bool {
        candidate > current
    }

    fn clear_value(&self) -> f32 {
        f32::NEG_INFINITY
    }
}

/// Any closure as a comparer
pub struct DepthFn<F> {
    pub func: F,
    pub clear: f32,
}

impl<F: Fn(f32, f32) -> bool> DepthFn<F> {
    pub fn new(func: F, clear: f32) -> Self {
        Self { func, clear }
    }
}

impl<F: Fn(f32, f32) -> bool> DepthCompare for DepthFn<F> {
    fn compare(&self, current: f32, candidate: f32) -> bool {
        (self.func)(current, candidate)
    }

    fn clear_value(&self) -> f32 {
        self.clear
    }
}

/// Per-pixel depth for one frame
pub struct DepthBuffer<C: DepthCompare = LessWins> {
    width: usize,
    height: usize,
    depth: Vec<f32>,
    comparer: C,
}

impl<C: DepthCompare> DepthBuffer<C> {
    pub fn new(width: usize, height: usize, comparer: C) -> Self {
        let clear = comparer.clear_value();
        Self {
            width,
            height,
            depth: vec![clear; width * height],
            comparer,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn comparer(&self) -> &C {
        &self.comparer
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Reset every pixel. Call between frames.
    pub fn clear(&mut self) {
        let clear = self.comparer.clear_value();
        self.depth.fill(clear);
    }

    /// Stored depth, or the clear value outside the buffer
    pub fn get_z(&self, x: i32, y: i32) -> f32 {
        if self.contains(x, y) {
            self.depth[y as usize * self.width + x as usize]
        } else {
            self.comparer.clear_value()
        }
    }

    pub fn set_z(&mut self, x: i32, y: i32, z: f32) {
        if self.contains(x, y) {
            self.depth[y as usize * self.width + x as usize] = z;
        }
    }

    /// Run the comparer against the stored depth at (x, y)
    pub fn test(&self, x: i32, y: i32, candidate: f32) -> bool {
        self.comparer.compare(self.get_z(x, y), candidate)
    }
}

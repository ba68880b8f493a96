/// A bounded 2D grid. Storage is row-major; nothing wraps at the edges.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build a map by evaluating `f` for every cell in raster order
    /// (x outer, y inner). `f` may look at the cells it has already produced.
    pub fn from_raster_fn<F>(width: usize, height: usize, fill: T, mut f: F) -> Self
    where
        F: FnMut(&Tilemap<T>, usize, usize) -> T,
    {
        let mut map = Self::new_with(width, height, fill);
        for x in 0..width {
            for y in 0..height {
                let value = f(&map, x, y);
                map.set(x, y, value);
            }
        }
        map
    }

    /// Index into the data array. Out-of-bounds coordinates panic: they can only
    /// come from a neighbourhood bug, never from user input.
    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "tile ({}, {}) outside {}x{} map",
            x,
            y,
            self.width,
            self.height
        );
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All coordinates in raster order: x outer, y inner.
    pub fn coords(&self) -> impl Iterator<Item = (usize, usize)> {
        let height = self.height;
        (0..self.width).flat_map(move |x| (0..height).map(move |y| (x, y)))
    }

    /// The already-visited neighbours of a cell in raster order:
    /// west `(x-1, y)`, north `(x, y-1)` and northwest `(x-1, y-1)`.
    /// Neighbours that would fall off the map are `None`.
    pub fn backward_neighbors(&self, x: usize, y: usize) -> [Option<(usize, usize)>; 3] {
        let west = x.checked_sub(1).map(|wx| (wx, y));
        let north = y.checked_sub(1).map(|ny| (x, ny));
        let northwest = match (x.checked_sub(1), y.checked_sub(1)) {
            (Some(wx), Some(ny)) => Some((wx, ny)),
            _ => None,
        };
        [west, north, northwest]
    }

    /// 4-connected neighbours that lie inside the map.
    pub fn neighbors(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut result = Vec::with_capacity(4);

        if x > 0 {
            result.push((x - 1, y));
        }
        if x + 1 < self.width {
            result.push((x + 1, y));
        }
        if y > 0 {
            result.push((x, y - 1));
        }
        if y + 1 < self.height {
            result.push((x, y + 1));
        }

        result
    }

    /// Iterate over all cells with their coordinates (storage order, y outer).
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % self.width;
            let y = idx / self.width;
            (x, y, val)
        })
    }

    /// Produce a new map of the same size by transforming each cell.
    pub fn map<U: Clone, F: FnMut(usize, usize, &T) -> U>(&self, mut f: F) -> Tilemap<U> {
        let data = self.iter().map(|(x, y, v)| f(x, y, v)).collect();
        Tilemap {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

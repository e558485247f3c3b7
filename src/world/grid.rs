//! Layered spatial index mapping grid cells to root objects

use crate::core::error::{Result, SimError};
use crate::core::types::{GridPos, Layer, ObjectId};

/// Generic dense 2D grid
#[derive(Debug, Clone)]
pub struct Grid<T: Clone + Default> {
    pub width: i32,
    pub height: i32,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            data: vec![T::default(); (width * height) as usize],
        }
    }

    #[inline]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    #[inline]
    fn index(&self, pos: GridPos) -> Option<usize> {
        if self.in_bounds(pos) {
            Some((pos.y * self.width + pos.x) as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn get(&self, pos: GridPos) -> Option<&T> {
        self.index(pos).map(|i| &self.data[i])
    }

    #[inline]
    pub fn get_mut(&mut self, pos: GridPos) -> Option<&mut T> {
        self.index(pos).map(|i| &mut self.data[i])
    }

    /// All cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

/// Root objects of one cell, one list per layer
#[derive(Debug, Clone, Default)]
pub struct LayeredCell {
    layers: [Vec<ObjectId>; Layer::COUNT],
}

impl LayeredCell {
    pub fn layer(&self, layer: Layer) -> &[ObjectId] {
        &self.layers[layer.index()]
    }

    /// Every object in the cell, bottom layer first
    pub fn all(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.layers.iter().flatten().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|l| l.is_empty())
    }
}

/// Spatial index of root-level objects
///
/// Only objects placed directly on the grid are indexed. Contained objects
/// and parts are reached through their root.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    grid: Grid<LayeredCell>,
    len: usize,
}

impl SpatialIndex {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            grid: Grid::new(width, height),
            len: 0,
        }
    }

    pub fn width(&self) -> i32 {
        self.grid.width
    }

    pub fn height(&self) -> i32 {
        self.grid.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        self.grid.in_bounds(pos)
    }

    /// Number of indexed objects
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, pos: GridPos, layer: Layer, id: ObjectId) -> Result<()> {
        let cell = self
            .grid
            .get_mut(pos)
            .ok_or(SimError::OutOfBounds { x: pos.x, y: pos.y })?;
        let list = &mut cell.layers[layer.index()];
        if !list.contains(&id) {
            list.push(id);
            self.len += 1;
        }
        Ok(())
    }

    /// Remove an object from a cell layer, returns whether it was present
    pub fn remove(&mut self, pos: GridPos, layer: Layer, id: ObjectId) -> bool {
        let Some(cell) = self.grid.get_mut(pos) else {
            return false;
        };
        let list = &mut cell.layers[layer.index()];
        let before = list.len();
        list.retain(|&e| e != id);
        let removed = list.len() < before;
        if removed {
            self.len -= 1;
        }
        removed
    }

    pub fn cell(&self, pos: GridPos) -> Option<&LayeredCell> {
        self.grid.get(pos)
    }

    pub fn at(&self, pos: GridPos, layer: Layer) -> &[ObjectId] {
        self.grid.get(pos).map(|c| c.layer(layer)).unwrap_or(&[])
    }

    /// Snapshot of every indexed object in deterministic order
    ///
    /// Row-major cells, bottom layer first, insertion order within a layer.
    pub fn roots(&self) -> Vec<ObjectId> {
        let mut out = Vec::with_capacity(self.len);
        for cell in self.grid.iter() {
            out.extend(cell.all());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let index = SpatialIndex::new(4, 3);
        assert!(index.in_bounds(GridPos::new(0, 0)));
        assert!(index.in_bounds(GridPos::new(3, 2)));
        assert!(!index.in_bounds(GridPos::new(4, 0)));
        assert!(!index.in_bounds(GridPos::new(0, -1)));
    }

    #[test]
    fn test_insert_out_of_bounds_is_rejected() {
        let mut index = SpatialIndex::new(4, 4);
        let result = index.insert(GridPos::new(9, 9), Layer::Object, ObjectId(1));
        assert!(matches!(result, Err(SimError::OutOfBounds { x: 9, y: 9 })));
        assert!(index.is_empty());
    }

    #[test]
    fn test_layers_coexist_in_one_cell() {
        let mut index = SpatialIndex::new(4, 4);
        let pos = GridPos::new(1, 1);
        index.insert(pos, Layer::Object, ObjectId(2)).unwrap();
        index.insert(pos, Layer::World, ObjectId(1)).unwrap();
        index.insert(pos, Layer::Agent, ObjectId(3)).unwrap();

        assert_eq!(index.at(pos, Layer::World), &[ObjectId(1)]);
        let all: Vec<_> = index.cell(pos).unwrap().all().collect();
        assert_eq!(all, vec![ObjectId(1), ObjectId(2), ObjectId(3)]);
    }

    #[test]
    fn test_double_insert_and_remove() {
        let mut index = SpatialIndex::new(2, 2);
        let pos = GridPos::new(0, 1);
        index.insert(pos, Layer::Object, ObjectId(5)).unwrap();
        index.insert(pos, Layer::Object, ObjectId(5)).unwrap();
        assert_eq!(index.len(), 1);

        assert!(index.remove(pos, Layer::Object, ObjectId(5)));
        assert!(!index.remove(pos, Layer::Object, ObjectId(5)));
        assert!(index.is_empty());
    }

    #[test]
    fn test_roots_are_row_major() {
        let mut index = SpatialIndex::new(3, 3);
        index.insert(GridPos::new(2, 2), Layer::Object, ObjectId(1)).unwrap();
        index.insert(GridPos::new(0, 0), Layer::Object, ObjectId(2)).unwrap();
        index.insert(GridPos::new(1, 0), Layer::World, ObjectId(3)).unwrap();
        assert_eq!(index.roots(), vec![ObjectId(2), ObjectId(3), ObjectId(1)]);
    }
}

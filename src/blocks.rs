//! Partitioning the grid into blocks.
//!
//! A block is a maximal 4-connected region of codels sharing one color
//! classification. Blocks are found with weighted quick-union over flat
//! codel indices, with iterative path compression so that pathological
//! grids cannot exhaust the call stack. The partition is a pure function of
//! the grid: it is built once and never mutated during execution.

use crate::color::Color;
use crate::flow::{Cc, Dp};
use crate::grid::{Grid, Position};

/// Identifier of a block within a [`BlockMap`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct BlockId(u32);

/// One block of the partition.
#[derive(Debug, Clone)]
pub struct Block {
    color: Color,
    size: u32,
    exits: [[Position; 2]; 4],
}

impl Block {
    pub fn color(&self) -> Color {
        self.color
    }

    /// Number of codels in the block; this is the value the `push`
    /// instruction produces when the block is departed.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// The codel from which the next move is probed for the given
    /// pointer/chooser combination.
    pub fn exit(&self, dp: Dp, cc: Cc) -> Position {
        self.exits[dp.index()][cc.index()]
    }
}

/// The block partition of a grid: a label per codel plus a block arena.
#[derive(Debug, Clone)]
pub struct BlockMap {
    width: usize,
    labels: Vec<u32>,
    blocks: Vec<Block>,
}

impl BlockMap {
    /// Partition `grid` into blocks.
    ///
    /// Runs one union pass over right and down neighbours (adjacency is
    /// symmetric, so this covers all four directions) and one linear pass
    /// accumulating per-block sizes and exit codels.
    pub fn build(grid: &Grid) -> BlockMap {
        let n = grid.len();
        let width = grid.width() as usize;
        let cells = grid.cells();

        let mut parent: Vec<u32> = (0..n as u32).collect();
        let mut set_sizes: Vec<u32> = vec![1; n];

        for i in 0..n {
            let right = i + 1;
            if right % width != 0 && cells[i] == cells[right] {
                union(&mut parent, &mut set_sizes, i as u32, right as u32);
            }
            let down = i + width;
            if down < n && cells[i] == cells[down] {
                union(&mut parent, &mut set_sizes, i as u32, down as u32);
            }
        }

        let mut labels = vec![u32::MAX; n];
        let mut root_labels = vec![u32::MAX; n];
        let mut blocks: Vec<Block> = Vec::new();

        for i in 0..n {
            let pos = Position::new((i % width) as i32, (i / width) as i32);
            let root = find(&mut parent, i as u32) as usize;
            let label = if root_labels[root] == u32::MAX {
                let label = blocks.len() as u32;
                root_labels[root] = label;
                blocks.push(Block {
                    color: cells[i],
                    size: set_sizes[root],
                    exits: [[pos; 2]; 4],
                });
                label
            } else {
                let block = &mut blocks[root_labels[root] as usize];
                for dp in Dp::ALL {
                    for cc in Cc::ALL {
                        let exit = &mut block.exits[dp.index()][cc.index()];
                        if exit_key(dp, cc, pos) > exit_key(dp, cc, *exit) {
                            *exit = pos;
                        }
                    }
                }
                root_labels[root]
            };
            labels[i] = label;
        }

        BlockMap { width, labels, blocks }
    }

    /// The block containing the codel at `pos`. Panics if `pos` lies
    /// outside the grid; callers only pass positions the grid has already
    /// bounds-checked.
    pub fn block_id_at(&self, pos: Position) -> BlockId {
        BlockId(self.labels[pos.y as usize * self.width + pos.x as usize])
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0 as usize]
    }

    /// Number of blocks in the partition.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; a grid has at least one codel, hence one block.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }
}

/// Iterative find with path halving.
fn find(parent: &mut [u32], mut i: u32) -> u32 {
    while parent[i as usize] != i {
        parent[i as usize] = parent[parent[i as usize] as usize];
        i = parent[i as usize];
    }
    i
}

/// Union by set size: the root of the smaller set is attached to the root
/// of the larger one.
fn union(parent: &mut [u32], set_sizes: &mut [u32], a: u32, b: u32) {
    let root_a = find(parent, a);
    let root_b = find(parent, b);
    if root_a == root_b {
        return;
    }
    let (large, small) = if set_sizes[root_a as usize] >= set_sizes[root_b as usize] {
        (root_a, root_b)
    } else {
        (root_b, root_a)
    };
    parent[small as usize] = large;
    set_sizes[large as usize] += set_sizes[small as usize];
}

/// Lexicographic key maximized by the (DP, CC) exit codel: the coordinate
/// furthest along DP first, then the tie-break towards the chooser's side.
/// For DP=right, CC=left picks the topmost codel of the rightmost column;
/// CC=right the bottommost, and analogously rotated for the other DPs.
fn exit_key(dp: Dp, cc: Cc, pos: Position) -> (i32, i32) {
    let Position { x, y } = pos;
    match (dp, cc) {
        (Dp::Right, Cc::Left) => (x, -y),
        (Dp::Right, Cc::Right) => (x, y),
        (Dp::Down, Cc::Left) => (y, x),
        (Dp::Down, Cc::Right) => (y, -x),
        (Dp::Left, Cc::Left) => (-x, y),
        (Dp::Left, Cc::Right) => (-x, -y),
        (Dp::Up, Cc::Left) => (-y, -x),
        (Dp::Up, Cc::Right) => (-y, x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Chroma, Hue, Lightness};

    fn red() -> Color {
        Color::Chromatic(Chroma::new(Hue::Red, Lightness::Normal))
    }

    fn blue() -> Color {
        Color::Chromatic(Chroma::new(Hue::Blue, Lightness::Normal))
    }

    #[test]
    fn test_two_distinct_codels_are_two_blocks() {
        let grid = Grid::new(2, 1, vec![red(), blue()]).unwrap();
        let map = BlockMap::build(&grid);
        assert_eq!(map.len(), 2);
        let left = map.block_id_at(Position::new(0, 0));
        let right = map.block_id_at(Position::new(1, 0));
        assert_ne!(left, right);
        assert_eq!(map.block(left).size(), 1);
        assert_eq!(map.block(right).size(), 1);
    }

    #[test]
    fn test_uniform_grid_is_one_block() {
        let grid = Grid::new(5, 3, vec![red(); 15]).unwrap();
        let map = BlockMap::build(&grid);
        assert_eq!(map.len(), 1);
        assert_eq!(map.blocks().next().unwrap().size(), 15);
    }

    #[test]
    fn test_block_sizes_sum_to_grid_size() {
        // Checkerboard plus a white stripe: many small blocks.
        let mut cells = Vec::new();
        for y in 0..4 {
            for x in 0..5 {
                cells.push(match (x + y) % 3 {
                    0 => red(),
                    1 => blue(),
                    _ => Color::White,
                });
            }
        }
        let grid = Grid::new(5, 4, cells).unwrap();
        let map = BlockMap::build(&grid);
        let total: u32 = map.blocks().map(|block| block.size()).sum();
        assert_eq!(total as usize, grid.len());
        // Every codel maps to a block of its own color.
        for y in 0..4 {
            for x in 0..5 {
                let pos = Position::new(x, y);
                let block = map.block(map.block_id_at(pos));
                assert_eq!(block.color(), grid.get(pos).unwrap());
            }
        }
    }

    #[test]
    fn test_diagonal_is_not_connected() {
        let grid = Grid::new(2, 2, vec![red(), blue(), blue(), red()]).unwrap();
        let map = BlockMap::build(&grid);
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_l_shaped_block_exits() {
        // #.
        // ##
        let grid = Grid::new(2, 2, vec![red(), blue(), red(), red()]).unwrap();
        let map = BlockMap::build(&grid);
        let block = map.block(map.block_id_at(Position::new(0, 0)));
        assert_eq!(block.size(), 3);
        // Rightmost column of the L is x=1 (single codel at (1,1)).
        assert_eq!(block.exit(Dp::Right, Cc::Left), Position::new(1, 1));
        assert_eq!(block.exit(Dp::Right, Cc::Right), Position::new(1, 1));
        // Bottom row: CC=left picks the furthest right, CC=right the left.
        assert_eq!(block.exit(Dp::Down, Cc::Left), Position::new(1, 1));
        assert_eq!(block.exit(Dp::Down, Cc::Right), Position::new(0, 1));
        // Left column: CC=left picks the bottom, CC=right the top.
        assert_eq!(block.exit(Dp::Left, Cc::Left), Position::new(0, 1));
        assert_eq!(block.exit(Dp::Left, Cc::Right), Position::new(0, 0));
        // Top row is the single codel at (0, 0).
        assert_eq!(block.exit(Dp::Up, Cc::Left), Position::new(0, 0));
        assert_eq!(block.exit(Dp::Up, Cc::Right), Position::new(0, 0));
    }

    #[test]
    fn test_exit_queries_are_deterministic() {
        let grid = Grid::new(3, 3, vec![red(); 9]).unwrap();
        let map = BlockMap::build(&grid);
        let block = map.block(map.block_id_at(Position::new(1, 1)));
        for dp in Dp::ALL {
            for cc in Cc::ALL {
                assert_eq!(block.exit(dp, cc), block.exit(dp, cc));
            }
        }
        // With ties present, swapping CC picks a different codel.
        assert_ne!(block.exit(Dp::Right, Cc::Left), block.exit(Dp::Right, Cc::Right));
        assert_eq!(block.exit(Dp::Right, Cc::Left), Position::new(2, 0));
        assert_eq!(block.exit(Dp::Right, Cc::Right), Position::new(2, 2));
    }

    #[test]
    fn test_snake_block_connectivity() {
        // A winding single-color path should be one block even though its
        // codels only connect through long detours.
        // ###
        // ..#
        // ###
        // #..
        // ###
        let r = red();
        let w = Color::White;
        #[rustfmt::skip]
        let cells = vec![
            r, r, r,
            w, w, r,
            r, r, r,
            r, w, w,
            r, r, r,
        ];
        let grid = Grid::new(3, 5, cells).unwrap();
        let map = BlockMap::build(&grid);
        let snake = map.block(map.block_id_at(Position::new(0, 0)));
        assert_eq!(snake.size(), 11);
        assert_eq!(
            map.block_id_at(Position::new(0, 0)),
            map.block_id_at(Position::new(2, 4))
        );
    }
}

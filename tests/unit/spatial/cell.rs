//! Tests for cell superposition: entropy, narrowing, collapse and rendering

#[cfg(test)]
mod tests {
    use ndarray::{Array3, arr3};
    use rand::{SeedableRng, rngs::StdRng};
    use tilecollapse::spatial::Cell;
    use tilecollapse::spatial::tiles::{Direction, Tile, TileSet};

    fn solid(color: [u8; 3], frequency: u32) -> Tile {
        let pattern = Array3::from_shape_fn((2, 2, 3), |(_, _, c)| color.get(c).copied().unwrap_or(0));
        Tile::new(pattern, frequency).unwrap_or_else(|error| unreachable!("valid tile: {error}"))
    }

    fn tile_set(tiles: Vec<Tile>) -> TileSet {
        TileSet::new(tiles).unwrap_or_else(|error| unreachable!("valid tile set: {error}"))
    }

    // Tests a fresh cell allows every tile and is unresolved
    // Verified by creating cells with an empty option set
    #[test]
    fn test_new_cell_allows_all_tiles() {
        let tiles = tile_set(vec![solid([0, 0, 0], 1), solid([9, 9, 9], 1)]);
        let cell = Cell::new(&tiles);

        assert_eq!(cell.options().to_vec(), vec![0, 1]);
        assert!(!cell.is_collapsed());
        assert!(cell.is_valid());
        assert_eq!(cell.tile(), None);
    }

    // Tests entropy of equally weighted options is log2 of their count
    // Verified by dropping the log2(total) term
    #[test]
    fn test_entropy_uniform() {
        let tiles = tile_set(vec![
            solid([0, 0, 0], 1),
            solid([1, 1, 1], 1),
            solid([2, 2, 2], 1),
            solid([3, 3, 3], 1),
        ]);
        let cell = Cell::new(&tiles);
        assert!((cell.entropy(&tiles) - 2.0).abs() < 1e-12);
    }

    // Tests entropy weights options by frequency
    // Verified by ignoring frequencies in the entropy sum
    #[test]
    fn test_entropy_weighted() {
        let tiles = tile_set(vec![solid([0, 0, 0], 1), solid([1, 1, 1], 3)]);
        let cell = Cell::new(&tiles);

        // log2(4) - (1*0 + 3*log2(3)) / 4
        let expected = 2.0 - 3.0 * 3.0_f64.log2() / 4.0;
        assert!((cell.entropy(&tiles) - expected).abs() < 1e-12);
    }

    // Tests collapse commits to one option and zeroes entropy
    // Verified by leaving the collapsed flag unset
    #[test]
    fn test_collapse() {
        let tiles = tile_set(vec![solid([0, 0, 0], 1), solid([1, 1, 1], 1)]);
        let mut cell = Cell::new(&tiles);
        let mut rng = StdRng::seed_from_u64(7);

        let chosen = cell.collapse(&tiles, &mut rng);
        assert!(chosen.is_some());
        assert!(cell.is_collapsed());
        assert_eq!(cell.tile(), chosen);
        assert_eq!(cell.options().count(), 1);
        assert!(cell.entropy(&tiles).abs() < f64::EPSILON);
    }

    // Tests collapse follows the frequency distribution
    // Verified by sampling uniformly regardless of weights
    #[test]
    fn test_collapse_respects_frequency() {
        let tiles = tile_set(vec![solid([0, 0, 0], 1), solid([1, 1, 1], 9)]);
        let mut rng = StdRng::seed_from_u64(11);

        let heavy = (0..2000)
            .filter(|_| {
                let mut cell = Cell::new(&tiles);
                cell.collapse(&tiles, &mut rng) == Some(1)
            })
            .count();

        assert!((1650..=1950).contains(&heavy), "heavy tile drawn {heavy} times");
    }

    // Tests narrowing keeps only options compatible with the neighbor
    // Verified by returning true from the compatibility check
    #[test]
    fn test_update_options_narrows_and_auto_collapses() {
        let tiles = tile_set(vec![
            solid([255, 0, 0], 1),
            solid([0, 255, 0], 1),
            solid([0, 0, 255], 1),
        ]);
        let mut rng = StdRng::seed_from_u64(3);

        let mut neighbor = Cell::new(&tiles);
        let chosen = neighbor.collapse(&tiles, &mut rng);

        let mut cell = Cell::new(&tiles);
        let changed = cell.update_options(&neighbor, Direction::Left, &tiles);

        assert!(changed);
        assert!(cell.is_collapsed());
        assert_eq!(cell.tile(), chosen);
    }

    // Tests narrowing against an unconstrained neighbor changes nothing
    // Verified by reporting a change whenever retain runs
    #[test]
    fn test_update_options_unchanged() {
        let tiles = tile_set(vec![solid([5, 5, 5], 1), solid([5, 5, 5], 2)]);
        let neighbor = Cell::new(&tiles);
        let mut cell = Cell::new(&tiles);

        assert!(!cell.update_options(&neighbor, Direction::Up, &tiles));
        assert_eq!(cell.options().count(), 2);
        assert!(!cell.is_collapsed());
    }

    // Tests update_options on a collapsed cell is a no-op
    // Verified by removing the collapsed guard
    #[test]
    fn test_update_options_on_collapsed_cell_is_noop() {
        let tiles = tile_set(vec![solid([255, 0, 0], 1), solid([0, 0, 255], 1)]);
        let mut rng = StdRng::seed_from_u64(5);

        let mut cell = Cell::new(&tiles);
        let _ = cell.collapse(&tiles, &mut rng);
        let before = cell.clone();

        let mut neighbor = Cell::new(&tiles);
        let _ = neighbor.collapse(&tiles, &mut rng);
        for direction in Direction::ALL {
            assert!(!cell.update_options(&neighbor, direction, &tiles));
        }
        assert_eq!(cell, before);
    }

    // Tests a cell without compatible options becomes a contradiction
    // Verified by collapsing to the first option when none survive
    #[test]
    fn test_contradiction() {
        // Neither tile has a red bottom row to sit above the red top row of tile 0
        let red_over_blue = arr3(&[
            [[255, 0, 0], [255, 0, 0]],
            [[0, 0, 255], [0, 0, 255]],
        ]);
        let blue_over_green = arr3(&[
            [[0, 0, 255], [0, 0, 255]],
            [[0, 255, 0], [0, 255, 0]],
        ]);
        let tiles = tile_set(vec![
            Tile::new(red_over_blue, 1).unwrap_or_else(|error| unreachable!("{error}")),
            Tile::new(blue_over_green, 1).unwrap_or_else(|error| unreachable!("{error}")),
        ]);

        let neighbor = (0..256)
            .find_map(|seed| {
                let mut cell = Cell::new(&tiles);
                let mut rng = StdRng::seed_from_u64(seed);
                (cell.collapse(&tiles, &mut rng) == Some(0)).then_some(cell)
            })
            .unwrap_or_else(|| unreachable!("some seed draws tile 0"));

        let mut cell = Cell::new(&tiles);
        assert!(cell.update_options(&neighbor, Direction::Up, &tiles));
        assert!(!cell.is_valid());
        assert!(!cell.is_collapsed());
        assert!(cell.entropy(&tiles).is_infinite());
        assert!(cell.image(&tiles).is_none());

        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(cell.collapse(&tiles, &mut rng), None);
        assert!(!cell.is_collapsed());
    }

    // Tests an unresolved cell renders the mean of its options
    // Verified by rendering the first option instead of the mean
    #[test]
    fn test_image_of_unresolved_cell_is_mean() {
        let tiles = tile_set(vec![solid([200, 0, 0], 1), solid([100, 50, 0], 1)]);
        let cell = Cell::new(&tiles);
        let image = cell
            .image(&tiles)
            .unwrap_or_else(|| unreachable!("valid cells have an image"));

        assert_eq!(image.get([0, 0, 0]), Some(&150));
        assert_eq!(image.get([1, 1, 1]), Some(&25));
    }

    // Tests a collapsed cell renders its tile exactly
    // Verified by rendering the mean for collapsed cells
    #[test]
    fn test_image_of_collapsed_cell_is_tile() {
        let tiles = tile_set(vec![solid([200, 0, 0], 1), solid([100, 50, 0], 1)]);
        let mut cell = Cell::new(&tiles);
        let mut rng = StdRng::seed_from_u64(9);
        let chosen = cell
            .collapse(&tiles, &mut rng)
            .unwrap_or_else(|| unreachable!("cell has options"));

        let image = cell.image(&tiles);
        assert_eq!(image.as_ref(), tiles.get(chosen).map(Tile::image));
    }
}

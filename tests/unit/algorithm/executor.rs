//! Tests for the run controller: configuration, stepping and rerun policy

#[cfg(test)]
mod tests {
    use ndarray::{Array3, arr3};
    use tilecollapse::io::configuration::DEFAULT_OUTPUT_DIMENSION;
    use tilecollapse::spatial::{Dimension, Grid};
    use tilecollapse::{AlgorithmError, RunConfig, Step, Tile, TileSet, WaveFunctionCollapse};

    fn solid(color: [u8; 3]) -> Tile {
        let pattern = Array3::from_shape_fn((2, 2, 3), |(_, _, c)| color.get(c).copied().unwrap_or(0));
        Tile::new(pattern, 1).unwrap_or_else(|error| unreachable!("valid tile: {error}"))
    }

    fn config(rows: usize, cols: usize) -> RunConfig {
        RunConfig {
            output_dimension: (rows, cols),
            seed: Some(17),
            ..RunConfig::default()
        }
    }

    fn controller(rows: usize, cols: usize) -> WaveFunctionCollapse {
        WaveFunctionCollapse::new(config(rows, cols), vec![solid([255, 0, 0]), solid([0, 0, 255])])
            .unwrap_or_else(|error| unreachable!("valid controller: {error}"))
    }

    // Tests default configuration retries and reruns on the default grid
    // Verified by disabling rerun in the default
    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert_eq!(config.output_dimension, DEFAULT_OUTPUT_DIMENSION);
        assert!(config.repeat_until_success);
        assert!(config.rerun);
        assert_eq!(config.seed, None);
    }

    // Tests construction validates dimension and patterns
    // Verified by skipping dimension validation in new
    #[test]
    fn test_new_validates_input() {
        assert!(matches!(
            WaveFunctionCollapse::new(config(0, 2), vec![solid([0, 0, 0])]),
            Err(AlgorithmError::InvalidDimension { rows: 0, cols: 2 })
        ));
        assert!(matches!(
            WaveFunctionCollapse::new(config(2, 2), Vec::new()),
            Err(AlgorithmError::EmptyPatternSet)
        ));

        let tall = Tile::new(Array3::zeros((3, 2, 3)), 1)
            .unwrap_or_else(|error| unreachable!("valid tile: {error}"));
        assert!(matches!(
            WaveFunctionCollapse::new(config(2, 2), vec![solid([0, 0, 0]), tall]),
            Err(AlgorithmError::TypeMismatch { .. })
        ));
    }

    // Tests a 1x1 grid completes after exactly one snapshot
    // Verified by skipping the snapshot after the seed collapse
    #[test]
    fn test_single_cell_run() {
        let mut wfc = controller(1, 1);

        let first = wfc.advance();
        assert!(matches!(first, Ok(Step::Snapshot(ref image)) if image.dim() == (2, 2, 3)));
        assert_eq!(wfc.steps(), 1);
        assert_eq!(wfc.collapsed_cells(), 1);

        let second = wfc.advance();
        assert!(matches!(second, Ok(Step::Completed(ref result)) if result.success));
        assert!(!wfc.is_running());
    }

    // Tests completed runs refuse to continue without rerun
    // Verified by starting a new run regardless of the rerun flag
    #[test]
    fn test_already_collapsed_without_rerun() {
        let mut wfc = controller(2, 2);
        wfc.set_rerun(false);

        let result = wfc.run_to_completion();
        assert!(matches!(result, Ok(ref r) if r.success));
        assert!(!wfc.has_more());
        assert!(matches!(wfc.advance(), Err(AlgorithmError::AlreadyCollapsed)));
        assert!(matches!(
            wfc.run_to_completion(),
            Err(AlgorithmError::AlreadyCollapsed)
        ));
    }

    // Tests a configuration change lifts the AlreadyCollapsed state
    // Verified by leaving the state untouched in set_output_dimension
    #[test]
    fn test_reconfiguration_restarts() {
        let mut wfc = controller(2, 2);
        wfc.set_rerun(false);
        let _ = wfc.run_to_completion();

        assert!(wfc.set_output_dimension(1, 3).is_ok());
        assert!(wfc.has_more());
        let result = wfc.run_to_completion();
        assert!(matches!(result, Ok(ref r) if r.image.dim() == (2, 6, 3)));
    }

    // Tests invalid reconfiguration is rejected and leaves the controller usable
    // Verified by assigning the dimension before validating it
    #[test]
    fn test_invalid_reconfiguration() {
        let mut wfc = controller(2, 2);
        assert!(matches!(
            wfc.set_output_dimension(3, 0),
            Err(AlgorithmError::InvalidDimension { .. })
        ));
        assert!(matches!(
            wfc.set_patterns(Vec::new()),
            Err(AlgorithmError::EmptyPatternSet)
        ));
        assert_eq!(wfc.dimension().cols(), 2);
        assert_eq!(wfc.tiles().len(), 2);
    }

    // Tests rerun starts a fresh run after completion
    // Verified by returning the stored result instead of restarting
    #[test]
    fn test_rerun_starts_new_attempt() {
        let mut wfc = controller(2, 3);
        let _ = wfc.run_to_completion();

        assert!(wfc.has_more());
        let next = wfc.advance();
        assert!(matches!(next, Ok(Step::Snapshot(_))));
        assert!(wfc.is_running());
        assert_eq!(wfc.attempts(), 1);
        assert_eq!(wfc.steps(), 1);
    }

    // Tests current_result previews the mean image before any run
    // Verified by composing a black image for the preview
    #[test]
    fn test_current_result_preview() {
        let wfc = controller(2, 2);
        let preview = wfc.current_result();

        assert!(!preview.success);
        assert_eq!(preview.image.dim(), (4, 4, 3));
        assert_eq!(preview.image.get([3, 3, 0]), Some(&127));
        assert_eq!(wfc.current_result(), preview);
    }

    // Tests current_result returns the completed result until the next run
    // Verified by clearing the stored result on completion
    #[test]
    fn test_current_result_after_completion() {
        let mut wfc = controller(3, 3);
        let result = wfc
            .run_to_completion()
            .unwrap_or_else(|error| unreachable!("run completes: {error}"));

        assert_eq!(wfc.current_result(), result);
        assert_eq!(wfc.current_result(), wfc.current_result());

        wfc.reset();
        assert!(!wfc.current_result().success);
    }

    // Tests steps_iter ends with the completed result
    // Verified by never marking the iterator done
    #[test]
    fn test_steps_iter() {
        let mut wfc = controller(2, 2);
        let steps: Vec<_> = wfc.steps_iter().collect();

        assert!(!steps.is_empty());
        assert!(matches!(steps.last(), Some(Ok(Step::Completed(_)))));
        let completed = steps
            .iter()
            .filter(|step| matches!(step, Ok(Step::Completed(_))))
            .count();
        assert_eq!(completed, 1);
        assert!(steps.iter().all(|step| matches!(step, Ok(s) if s.image().dim() == (4, 4, 3))));
    }

    // Tests the same seed reproduces the same run
    // Verified by seeding from OS entropy in reset
    #[test]
    fn test_seed_reproducibility() {
        let tiles = || {
            vec![
                solid([255, 0, 0]),
                solid([0, 255, 0]),
                solid([0, 0, 255]),
            ]
        };
        let mut first = WaveFunctionCollapse::new(config(3, 4), tiles())
            .unwrap_or_else(|error| unreachable!("{error}"));
        let mut second = WaveFunctionCollapse::new(config(3, 4), tiles())
            .unwrap_or_else(|error| unreachable!("{error}"));

        let a: Vec<_> = first.steps_iter().filter_map(Result::ok).collect();
        let b: Vec<_> = second.steps_iter().filter_map(Result::ok).collect();
        assert_eq!(a, b);

        first.reset();
        let c: Vec<_> = first.steps_iter().filter_map(Result::ok).collect();
        assert_eq!(a, c);
    }

    // Tests every pull returns while retrying a tile set that always contradicts
    // Verified by looping over failed attempts inside advance
    #[test]
    fn test_retry_returns_each_attempt() {
        let red_over_blue = arr3(&[
            [[255, 0, 0], [255, 0, 0]],
            [[0, 0, 255], [0, 0, 255]],
        ]);
        let tile = Tile::new(red_over_blue.clone(), 1)
            .unwrap_or_else(|error| unreachable!("valid tile: {error}"));
        let mut wfc = WaveFunctionCollapse::new(config(2, 1), vec![tile])
            .unwrap_or_else(|error| unreachable!("valid controller: {error}"));
        assert!(wfc.repeat_until_success());

        let fresh = wfc.current_result().image;
        for pull in 1..=5 {
            let step = wfc.advance();
            assert!(matches!(step, Ok(Step::Snapshot(ref image)) if image == &fresh));
            assert_eq!(wfc.attempts(), pull + 1);
            assert_eq!(wfc.steps(), 0);
            assert!(wfc.is_running());
        }
        assert_eq!(fresh.slice(ndarray::s![0..2, .., ..]), red_over_blue);
    }

    // Tests the preview matches a freshly built grid
    // Verified by composing the preview from a black buffer
    #[test]
    fn test_preview_matches_fresh_grid() {
        let tiles = vec![solid([200, 0, 0]), solid([0, 0, 100])];
        let set = TileSet::new(tiles.clone())
            .unwrap_or_else(|error| unreachable!("valid tile set: {error}"));
        let dimension = Dimension::new(2, 3).unwrap_or_else(|error| unreachable!("{error}"));
        let wfc = WaveFunctionCollapse::new(config(2, 3), tiles)
            .unwrap_or_else(|error| unreachable!("{error}"));

        assert_eq!(
            wfc.current_result().image,
            Grid::new(dimension, &set).compose_image(&set)
        );
    }

    // Tests setters record their values and mark the run stale
    // Verified by not resetting the running state in set_seed
    #[test]
    fn test_setters_mark_stale() {
        let mut wfc = controller(3, 3);
        let _ = wfc.advance();
        assert!(wfc.is_running());

        wfc.set_seed(Some(99));
        assert_eq!(wfc.seed(), Some(99));
        assert!(!wfc.is_running());

        let _ = wfc.advance();
        wfc.set_repeat_until_success(false);
        assert!(!wfc.repeat_until_success());
        assert!(!wfc.is_running());

        let _ = wfc.advance();
        assert!(wfc.set_patterns(vec![solid([1, 2, 3])]).is_ok());
        assert!(!wfc.is_running());
        assert_eq!(wfc.steps(), 0);
        assert_eq!(wfc.cell_count(), 9);
    }
}

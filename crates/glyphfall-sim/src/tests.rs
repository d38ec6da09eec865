#[cfg(test)]
mod tests {
    use crate::{
        fill_instances, tail_brightness, CellInstance, DropTuning, RainDrop, RainGrid,
        BRIGHTNESS_FALLOFF,
    };

    const SEED: u64 = 0x5EED_CA5C_ADE5;

    fn grid(cols: usize, rows: usize) -> RainGrid {
        let mut g = RainGrid::with_seed(DropTuning::default(), SEED);
        g.resize(cols, rows);
        g
    }

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    // ──────────────────────────────────────────
    // Drop motion
    // ──────────────────────────────────────────

    #[test]
    fn test_position_non_decreasing_until_reset() {
        let mut g = grid(8, 40);
        let mut prev: Vec<f64> = g.drops().iter().map(|d| d.position).collect();

        for _ in 0..2000 {
            g.advance(1.0 / 60.0);
            for (col, drop) in g.drops().iter().enumerate() {
                if drop.position < prev[col] {
                    // The only way position can go backwards is a reset,
                    // which respawns in [-rows, 0].
                    assert!(drop.position <= 0.0, "reset landed at {}", drop.position);
                    assert!(drop.position >= -40.0);
                }
                prev[col] = drop.position;
            }
        }
    }

    #[test]
    fn test_reset_checked_after_position_update() {
        let mut g = grid(1, 100);
        *g.drop_mut(0) = RainDrop {
            position: 105.5,
            speed: 1.0,
            tail_length: 5.0,
        };

        // 105.5 - 5 > 100 already holds before the update, so any positive
        // dt must fire the reset on this very call.
        g.advance(0.001);
        let drop = g.drops()[0];
        assert!(drop.position <= 0.0);
        assert!(drop.position >= -100.0);
    }

    #[test]
    fn test_drop_not_reset_while_tail_on_screen() {
        let mut g = grid(1, 100);
        *g.drop_mut(0) = RainDrop {
            position: 102.0,
            speed: 0.0,
            tail_length: 5.0,
        };

        // Head is past the bottom but 102 - 5 <= 100: the tail is still
        // visible, so the drop keeps falling.
        g.advance(0.01);
        assert!(approx_eq(g.drops()[0].position as f32, 102.0));
    }

    #[test]
    fn test_dt_clamped_to_max_step() {
        let mut a = grid(1, 50);
        let mut b = grid(1, 50);
        let frozen = RainDrop {
            position: 0.0,
            speed: 20.0,
            tail_length: 10.0,
        };
        *a.drop_mut(0) = frozen;
        *b.drop_mut(0) = frozen;

        a.advance(10.0);
        b.advance(0.1);
        assert!(approx_eq(
            a.drops()[0].position as f32,
            b.drops()[0].position as f32
        ));
    }

    // ──────────────────────────────────────────
    // Brightness curve
    // ──────────────────────────────────────────

    #[test]
    fn test_brightness_full_at_head() {
        assert!(approx_eq(tail_brightness(0.0, 12.0), 1.0));
    }

    #[test]
    fn test_brightness_zero_at_tail_end() {
        // The interval is half-open: dist == tail_length is already dark.
        assert_eq!(tail_brightness(12.0, 12.0), 0.0);
        assert!(tail_brightness(11.999, 12.0) > 0.0);
    }

    #[test]
    fn test_brightness_zero_ahead_of_head() {
        assert_eq!(tail_brightness(-0.5, 12.0), 0.0);
    }

    #[test]
    fn test_brightness_follows_falloff_curve() {
        let expected = (1.0f32 - 0.75).powf(BRIGHTNESS_FALLOFF);
        assert!(approx_eq(tail_brightness(3.0, 4.0), expected));
    }

    // ──────────────────────────────────────────
    // Instance records
    // ──────────────────────────────────────────

    #[test]
    fn test_instance_count_tracks_resize() {
        let mut g = grid(4, 8);
        let mut out: Vec<CellInstance> = Vec::new();

        fill_instances(&g, 16.0, &mut out);
        assert_eq!(out.len(), 32);

        g.resize(10, 3);
        fill_instances(&g, 16.0, &mut out);
        assert_eq!(out.len(), 30);
    }

    #[test]
    fn test_instance_indexing_is_column_major() {
        let g = grid(5, 7);
        let mut out = Vec::new();
        fill_instances(&g, 16.0, &mut out);

        // Every (col, row) pair must land at col*rows+row carrying exactly
        // that cell's glyph and that cell's screen position.
        for col in 0..5 {
            for row in 0..7 {
                let inst = &out[col * 7 + row];
                assert_eq!(inst.glyph_index, g.cell(col, row));
                assert!(approx_eq(inst.position[0], col as f32 * 16.0));
                assert!(approx_eq(inst.position[1], row as f32 * 16.0));
            }
        }
    }

    #[test]
    fn test_head_flag_independent_of_tail_length() {
        for tail in [2.0, 10.0, 50.0] {
            let mut g = grid(1, 20);
            *g.drop_mut(0) = RainDrop {
                position: 6.5,
                speed: 0.0,
                tail_length: tail,
            };
            let mut out = Vec::new();
            fill_instances(&g, 16.0, &mut out);

            for row in 0..20 {
                let dist = 6.5 - row as f64;
                let expect_head = (0.0..1.0).contains(&dist);
                assert_eq!(
                    out[row].is_head > 0.5,
                    expect_head,
                    "row {} tail {}",
                    row,
                    tail
                );
            }
        }
    }

    #[test]
    fn test_invisible_cells_keep_their_glyph() {
        let mut g = grid(1, 10);
        *g.drop_mut(0) = RainDrop {
            position: -100.0,
            speed: 0.0,
            tail_length: 4.0,
        };
        let mut out = Vec::new();
        fill_instances(&g, 16.0, &mut out);

        for row in 0..10 {
            assert_eq!(out[row].brightness, 0.0);
            assert_eq!(out[row].glyph_index, g.cell(0, row));
        }
    }

    // ──────────────────────────────────────────
    // Resize
    // ──────────────────────────────────────────

    #[test]
    fn test_resize_same_size_is_identity() {
        let mut g = grid(6, 12);
        g.advance(0.05);

        let cells: Vec<u32> = (0..6)
            .flat_map(|c| (0..12).map(move |r| (c, r)))
            .map(|(c, r)| g.cell(c, r))
            .collect();
        let drops = g.drops().to_vec();

        assert!(!g.resize(6, 12));

        let cells_after: Vec<u32> = (0..6)
            .flat_map(|c| (0..12).map(move |r| (c, r)))
            .map(|(c, r)| g.cell(c, r))
            .collect();
        assert_eq!(cells, cells_after);
        assert_eq!(drops, g.drops().to_vec());
    }

    #[test]
    fn test_resize_scatters_drops_within_bounds() {
        let g = grid(40, 30);
        for drop in g.drops() {
            assert!(drop.position >= -30.0 && drop.position <= 30.0);
            assert!(drop.speed >= 10.0 && drop.speed <= 30.0);
            assert!(drop.tail_length >= 10.0 && drop.tail_length <= 50.0);
        }
    }

    // ──────────────────────────────────────────
    // Frozen-scene end to end
    // ──────────────────────────────────────────

    #[test]
    fn test_frozen_drop_scene() {
        let mut g = grid(3, 10);
        *g.drop_mut(0) = RainDrop {
            position: 5.0,
            speed: 0.0,
            tail_length: 4.0,
        };
        // Park the other columns far above the screen so they stay dark.
        for col in 1..3 {
            *g.drop_mut(col) = RainDrop {
                position: -100.0,
                speed: 0.0,
                tail_length: 4.0,
            };
        }

        let mut out = Vec::new();
        fill_instances(&g, 16.0, &mut out);

        let col0: Vec<&CellInstance> = (0..10).map(|r| &out[r]).collect();

        // dist = 5 - row: rows 2..=5 are inside [0, 4), row 1 sits exactly
        // at the tail boundary and is dark.
        for (row, inst) in col0.iter().enumerate() {
            let visible = (2..=5).contains(&row);
            assert_eq!(inst.brightness > 0.0, visible, "row {}", row);
        }

        // Brightness climbs toward the head.
        assert!(col0[2].brightness < col0[3].brightness);
        assert!(col0[3].brightness < col0[4].brightness);
        assert!(col0[4].brightness < col0[5].brightness);
        assert!(approx_eq(col0[5].brightness, 1.0));

        // Only the head row carries the flag.
        for (row, inst) in col0.iter().enumerate() {
            assert_eq!(inst.is_head > 0.5, row == 5, "row {}", row);
        }

        // The parked columns contribute nothing.
        for idx in 10..30 {
            assert_eq!(out[idx].brightness, 0.0);
        }
    }
}

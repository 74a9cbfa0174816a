use glam::Vec3;
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use weather_diorama::scene::{
    catalog::TERRAINS,
    clouds::{CloudField, active_count, fold_back, fold_threshold, stage_velocity, within_stage},
    mesh::{CurtainParams, build_curtain_mesh},
    precipitation::sizing,
    tuning::StageTuning,
};

proptest! {
    #[test]
    fn active_clouds_follow_cover(cover in 0.0f64..=1.0, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let field = CloudField::new(&TERRAINS[0], &StageTuning::default(), &mut rng);
        let active = field.select_active(cover, &mut rng);
        let expected = (35.0 * cover).round() as usize;
        prop_assert_eq!(active.len(), expected);
        prop_assert!(active.len() <= field.slots().len());
    }

    #[test]
    fn non_positive_cover_means_no_clouds(cover in -5.0f64..=0.0, slots in 1usize..100) {
        prop_assert_eq!(active_count(slots, cover), 0);
    }

    #[test]
    fn velocity_is_monotone_in_capped_wind(a in 0.0f64..300.0, b in 0.0f64..300.0) {
        let tuning = StageTuning::default();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(stage_velocity(low, &tuning) <= stage_velocity(high, &tuning));
        prop_assert!(stage_velocity(high, &tuning) <= stage_velocity(tuning.wind_speed_max_kph, &tuning));
    }

    #[test]
    fn folded_clouds_stay_bounded(
        start in -0.2f32..0.2,
        step in 0.0f32..0.05,
        columns in 1usize..10,
    ) {
        let threshold = fold_threshold(columns, 0.08);
        let mut x = start.min(threshold);
        for _ in 0..500 {
            let before = x + step;
            x = fold_back(before, threshold);
            if before > threshold {
                prop_assert_eq!(x, -before);
            }
            prop_assert!(x <= threshold);
        }
    }

    #[test]
    fn visibility_matches_squared_radius(
        x in -0.3f32..0.3,
        y in -0.3f32..0.3,
        z in -0.3f32..0.3,
        radius in 0.05f32..0.3,
    ) {
        let position = Vec3::new(x, y, z);
        let radius_sq = radius * radius;
        prop_assert_eq!(within_stage(position, radius_sq), x * x + y * y + z * z <= radius_sq);
    }

    #[test]
    fn instance_count_never_exceeds_the_cap(amount in 0.0f64..500.0) {
        let tuning = StageTuning::default();
        match sizing(amount, &tuning) {
            Some(s) => {
                prop_assert!(s.instance_count >= 1);
                prop_assert!(s.instance_count as f64 <= tuning.max_instances_per_unit);
                prop_assert!(s.rate > 0.0 && s.rate <= 1.0);
                prop_assert!(s.base_speed >= tuning.base_fall_speed);
                prop_assert!(s.base_speed <= 2.0 * tuning.base_fall_speed + 1e-12);
            }
            None => {
                let rate = amount.min(tuning.precipitation_max_mm) / tuning.precipitation_max_mm;
                prop_assert!((tuning.max_instances_per_unit * rate).round() < 1.0);
            }
        }
    }

    #[test]
    fn mesh_buffers_scale_with_count(count in 1usize..150, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let params = CurtainParams {
            count,
            width: 0.001,
            height: 0.01,
            stage_radius: 0.15,
            y_band: (-0.02, 0.0),
        };
        let mesh = build_curtain_mesh(&params, &mut rng).expect("mesh");
        prop_assert_eq!(mesh.positions.len(), 8 * count);
        prop_assert_eq!(mesh.indices.len(), 24 * count);
        prop_assert_eq!(mesh.face_vertex_counts.len(), 6 * count);
        let limit = (8 * count) as u32;
        prop_assert!(mesh.indices.iter().all(|&i| i < limit));
    }
}

use super::*;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

const EPSILON: f32 = 1e-4;

fn rng() -> Pcg64Mcg {
    Pcg64Mcg::seed_from_u64(7)
}

fn all_formations() -> Vec<Formation> {
    vec![
        Formation::Sphere,
        Formation::Cube,
        Formation::Torus,
        Formation::Helix,
        Formation::Random,
        Formation::Heart,
        Formation::ApologySpiral,
        Formation::LoveHearts,
        Formation::Text("OK!".to_string()),
    ]
}

#[test]
fn every_formation_yields_exactly_the_requested_count() {
    let mut rng = rng();
    for formation in all_formations() {
        for count in [0, 1, 2, 7, 64, 1000] {
            let positions = generate(&formation, count, &mut rng);
            assert_eq!(
                positions.len(),
                count,
                "{formation} returned {} points for a request of {count}",
                positions.len()
            );
            assert!(
                positions.iter().all(|p| p.is_finite()),
                "{formation} produced a non-finite point"
            );
        }
    }
}

#[test]
fn eight_point_cube_lands_on_the_corners() {
    let positions = generate_cube(8, 2.0);
    assert_eq!(positions.len(), 8);
    for p in &positions {
        assert!((p.x.abs() - 1.0).abs() < EPSILON, "x off corner: {p:?}");
        assert!((p.y.abs() - 1.0).abs() < EPSILON, "y off corner: {p:?}");
        assert!((p.z.abs() - 1.0).abs() < EPSILON, "z off corner: {p:?}");
    }
    for (i, a) in positions.iter().enumerate() {
        for b in positions.iter().skip(i + 1) {
            assert!(a.distance(*b) > 0.5, "duplicate corner: {a:?} / {b:?}");
        }
    }
}

#[test]
fn single_point_cube_stays_finite() {
    let positions = generate_cube(1, 3.0);
    assert_eq!(positions, vec![Vec3::splat(-1.5)]);
}

#[test]
fn sphere_points_sit_on_the_radius() {
    let positions = generate_sphere(500, 2.0);
    for p in &positions {
        assert!((p.length() - 2.0).abs() < 1e-3, "off the shell: {p:?}");
    }
    assert!(positions[0].distance(Vec3::new(0.0, 0.0, 2.0)) < EPSILON);
    assert_eq!(positions, generate_sphere(500, 2.0));
}

#[test]
fn torus_points_stay_on_the_tube() {
    for p in generate_torus(300, 2.0, 0.8) {
        let ring = (p.x * p.x + p.y * p.y).sqrt();
        let tube = ((ring - 2.0).powi(2) + p.z * p.z).sqrt();
        assert!((tube - 0.8).abs() < 1e-3, "off the tube: {p:?}");
    }
}

#[test]
fn helix_spans_its_height() {
    let positions = generate_helix(100, 2.0, 4.0, 3.0);
    assert!(positions[0].distance(Vec3::new(2.0, -2.0, 0.0)) < EPSILON);
    for pair in positions.windows(2) {
        assert!(pair[1].y > pair[0].y, "height must increase monotonically");
    }
    assert!(positions[99].y < 2.0 + EPSILON);
}

#[test]
fn random_cloud_respects_spread_and_seed() {
    let positions = generate_random(200, 5.0, &mut rng());
    for p in &positions {
        assert!(p.abs().max_element() <= 2.5, "outside the spread: {p:?}");
    }
    assert_eq!(positions, generate_random(200, 5.0, &mut rng()));
}

#[test]
fn heart_depth_is_layer_bounded() {
    for p in generate_heart(400, 2.0, &mut rng()) {
        assert!(p.z.abs() <= 0.4 * 2.0 + EPSILON, "layer out of range: {p:?}");
    }
}

#[test]
fn apology_spiral_fits_its_envelope() {
    let size = 2.0;
    for p in generate_apology_spiral(400, size, &mut rng()) {
        assert!(p.y.abs() <= size * 2.0 + EPSILON, "taller than the helix: {p:?}");
        let ring = (p.x * p.x + p.z * p.z).sqrt();
        assert!(ring <= size * 0.95, "outside both strands: {p:?}");
    }
}

#[test]
fn text_points_hug_the_glyph_template() {
    let template = letterforms::template_points("HI", 2.0);
    assert!(!template.is_empty());

    let exact = generate_text(template.len(), "HI", 2.0, &mut rng());
    for (point, cell) in exact.iter().zip(&template) {
        assert!(point.distance(*cell) < 0.15, "{point:?} drifted from {cell:?}");
    }

    let padded = generate_text(template.len() + 25, "HI", 2.0, &mut rng());
    assert_eq!(padded.len(), template.len() + 25);
    for point in &padded {
        let nearest = template
            .iter()
            .map(|cell| point.distance(*cell))
            .fold(f32::INFINITY, f32::min);
        assert!(nearest < 0.15, "{point:?} is not near any glyph cell");
    }
}

#[test]
fn unrenderable_text_falls_back_to_a_random_cloud() {
    let positions = generate_text(16, "***", 2.0, &mut rng());
    assert_eq!(positions.len(), 16);
    assert!(
        positions.iter().any(|p| p.abs().max_element() > 1.3),
        "fallback should use the wide random spread"
    );
}

#[test]
fn names_resolve_case_insensitively_with_random_fallback() {
    assert_eq!(Formation::from_name("SPHERE"), Formation::Sphere);
    assert_eq!(Formation::from_name("apology_spiral"), Formation::ApologySpiral);
    assert_eq!(Formation::from_name("love_hearts"), Formation::LoveHearts);
    assert_eq!(Formation::from_name("warp core"), Formation::Random);
}

#[test]
fn glyph_template_counts_lit_cells() {
    // 'I' lights 3 + 1 * 5 + 3 cells in the 5x7 face.
    assert_eq!(letterforms::template_points("I", 1.0).len(), 11);
    assert!(letterforms::template_points("  ", 1.0).is_empty());
}

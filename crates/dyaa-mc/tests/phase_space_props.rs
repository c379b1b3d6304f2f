use dyaa_mc::{hadronic_pspgen, HadronicPhaseSpace, PhaseSpaceGenerator};
use proptest::prelude::*;

proptest! {
    #[test]
    fn generated_points_are_physical(
        r1 in 0.0f64..1.0,
        r2 in 0.0f64..1.0,
        r3 in 0.0f64..1.0,
        mmin in 1.0f64..100.0,
        ratio in 1.5f64..1000.0,
    ) {
        let mmax = mmin * ratio;
        let generator = HadronicPhaseSpace::new(mmin, mmax).unwrap();
        let point = generator.generate([r1, r2, r3]);
        let m = point.mandelstam();

        prop_assert!(m.s >= generator.smin() * (1.0 - 1e-9));
        prop_assert!(m.s <= generator.smax() * (1.0 + 1e-12));
        prop_assert!(point.x1() > 0.0 && point.x1() <= 1.0 + 1e-12);
        prop_assert!(point.x2() > 0.0 && point.x2() <= 1.0 + 1e-12);
        prop_assert!((m.s - point.x1() * point.x2() * generator.smax()).abs() <= 1e-9 * m.s);
        prop_assert!(m.t < 0.0);
        prop_assert!(m.u < 0.0);
        prop_assert!(m.sum().abs() <= 1e-9 * m.s);
        prop_assert!(point.jacobian() > 0.0 && point.jacobian().is_finite());
    }

    #[test]
    fn unclamped_generator_keeps_the_mass_window(
        r1 in 0.0f64..1.0,
        r2 in 0.0f64..1.0,
        r3 in 0.0f64..1.0,
    ) {
        let point = hadronic_pspgen(10.0, 7000.0, r1, r2, r3);
        let m = point.mandelstam();
        prop_assert!(m.s > 100.0 * (1.0 - 1e-9));
        prop_assert!(m.s <= 7000.0 * 7000.0 * (1.0 + 1e-12));
        prop_assert!(m.t <= 0.0 && m.u <= 0.0);
        prop_assert!(point.jacobian() >= 0.0);
    }
}

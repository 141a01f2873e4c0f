    use super::*;
    use crate::catalog::{Catalog, ResolvedThickness, Thickness};
    use crate::params::{build_snapshot, default_parameters};

    const MILD_STEEL: &str = "mild-steel";
    const GA16: &str = "16 ga (0.060\")";

    fn part(w: f64, h: f64, qty: u32) -> PartConfiguration {
        PartConfiguration::new(MILD_STEEL, GA16, w, h, qty)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_single_part_without_live_params() {
        let catalog = Catalog::builtin();
        let c = evaluate(&catalog, &part(6.0, 4.0, 1), None).unwrap();

        assert_eq!(c.area, 24.0);
        assert!(approx(c.material_cost, 1.32));
        assert!(!c.floor_engaged);
        assert_eq!(
            c.breakdown,
            PriceBreakdown {
                unit_price: 1.32,
                discount_fraction: 0.0,
                setup_fee: 0.0,
                subtotal: 1.32,
            }
        );
    }

    #[test]
    fn test_hundred_parts_use_fallback_ladder() {
        let catalog = Catalog::builtin();
        let b = compute_price(&catalog, &part(6.0, 4.0, 100), None).unwrap();
        assert_eq!(b.unit_price, 1.32);
        assert_eq!(b.discount_fraction, 0.2);
        assert_eq!(b.subtotal, 105.60);
    }

    #[test]
    fn test_bending_fallback_fee() {
        let catalog = Catalog::builtin();
        let config = part(6.0, 4.0, 1).with_service("bending");
        let b = compute_price(&catalog, &config, None).unwrap();
        assert_eq!(b.unit_price, 5.82);
        assert_eq!(b.subtotal, 5.82);
    }

    #[test]
    fn test_live_params_floor_and_setup_fee() {
        let catalog = Catalog::builtin();
        let params = ParameterSnapshot::from_pairs([
            ("base_markup_pct", 50.0),
            ("kerf_waste_pct", 10.0),
            ("minimum_part", 5.0),
            ("setup_fee", 25.0),
        ]);

        let c = evaluate(&catalog, &part(6.0, 4.0, 2), Some(&params)).unwrap();

        assert!(approx(c.material_cost, 1.32));
        assert!(approx(c.unit_base, 2.178), "unit_base {}", c.unit_base);
        assert!(c.floor_engaged);
        assert_eq!(c.breakdown.unit_price, 5.0);
        assert_eq!(c.breakdown.discount_fraction, 0.0);
        assert_eq!(c.breakdown.setup_fee, 25.0);
        assert_eq!(c.breakdown.subtotal, 35.0);
    }

    #[test]
    fn test_live_service_parameter_overrides_fallback() {
        let catalog = Catalog::builtin();
        let params = ParameterSnapshot::from_pairs([("svc_bending", 7.0), ("minimum_part", 0.0)]);
        let config = part(6.0, 4.0, 1).with_service("bending");
        let c = evaluate(&catalog, &config, Some(&params)).unwrap();
        assert_eq!(c.service_cost, 7.0);
        assert_eq!(c.breakdown.unit_price, 8.32);
    }

    #[test]
    fn test_unknown_service_adds_nothing() {
        let catalog = Catalog::builtin();
        let config = part(6.0, 4.0, 1).with_service("teleportation");
        let b = compute_price(&catalog, &config, None).unwrap();
        assert_eq!(b.unit_price, 1.32);
    }

    #[test]
    fn test_duplicate_services_collapse() {
        let config = part(6.0, 4.0, 1).with_service("bending").with_service("bending");
        assert_eq!(config.services.len(), 1);
        let b = compute_price(&Catalog::builtin(), &config, None).unwrap();
        assert_eq!(b.unit_price, 5.82);
    }

    #[test]
    fn test_unknown_material_is_not_found() {
        let catalog = Catalog::builtin();
        let config = PartConfiguration::new("unobtainium", GA16, 6.0, 4.0, 1);
        let err = compute_price(&catalog, &config, None).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)), "{:?}", err);
    }

    #[test]
    fn test_unknown_thickness_is_not_found() {
        let catalog = Catalog::builtin();
        let config = PartConfiguration::new(MILD_STEEL, "7 ga", 6.0, 4.0, 1);
        assert!(matches!(
            compute_price(&catalog, &config, None),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_or_zero_mode() {
        let config = PartConfiguration::new("unobtainium", GA16, 6.0, 4.0, 1);
        assert_eq!(
            compute_price_or_zero(&Catalog::builtin(), &config, None),
            PriceBreakdown::zero()
        );
    }

    #[test]
    fn test_tiny_part_hits_default_floor() {
        let catalog = Catalog::builtin();
        let c = evaluate(&catalog, &part(1.0, 1.0, 1), None).unwrap();
        assert!(c.floor_engaged);
        assert_eq!(c.minimum_part, DEFAULT_MINIMUM_PART);
        assert_eq!(c.breakdown.unit_price, 0.5);
    }

    #[test]
    fn test_missing_minimum_part_in_live_params_uses_default_floor() {
        let params = ParameterSnapshot::from_pairs([("setup_fee", 0.0)]);
        let b = compute_price(&Catalog::builtin(), &part(1.0, 1.0, 1), Some(&params)).unwrap();
        assert_eq!(b.unit_price, 0.5);
    }

    #[test]
    fn test_zero_minimum_part_is_honored() {
        let params = ParameterSnapshot::from_pairs([("minimum_part", 0.0)]);
        let b = compute_price(&Catalog::builtin(), &part(2.0, 1.0, 1), Some(&params)).unwrap();
        assert_eq!(b.unit_price, 0.11);
    }

    #[test]
    fn test_negative_and_nan_params_fall_back_to_defaults() {
        let catalog = Catalog::builtin();
        let params = ParameterSnapshot::from_pairs([
            ("base_markup_pct", -40.0),
            ("kerf_waste_pct", f64::NAN),
            ("minimum_part", -1.0),
            ("setup_fee", f64::INFINITY),
        ]);
        let live = compute_price(&catalog, &part(6.0, 4.0, 1), Some(&params)).unwrap();
        assert_eq!(live.unit_price, 1.32);
        assert_eq!(live.setup_fee, 0.0);
        assert_eq!(live.subtotal, 1.32);
    }

    #[test]
    fn test_floor_property_over_grid() {
        let catalog = Catalog::builtin();
        let defaults = build_snapshot(&default_parameters());
        let floor = defaults.get(keys::MINIMUM_PART).unwrap();
        for material in &catalog.materials {
            for thickness in &material.thicknesses {
                for (w, h) in [(0.5, 0.5), (2.0, 3.0), (12.0, 12.0), (48.0, 24.0)] {
                    let config = PartConfiguration::new(&material.id, &thickness.label, w, h, 3);
                    let none = compute_price(&catalog, &config, None).unwrap();
                    let live = compute_price(&catalog, &config, Some(&defaults)).unwrap();
                    assert!(none.unit_price >= DEFAULT_MINIMUM_PART);
                    assert!(live.unit_price >= floor);
                }
            }
        }
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let catalog = Catalog::builtin();
        let defaults = build_snapshot(&default_parameters());
        let config = part(7.25, 3.5, 37)
            .with_service("powder-coating")
            .with_service("bending")
            .with_service("deburring");
        let first = compute_price(&catalog, &config, Some(&defaults)).unwrap();
        for _ in 0..100 {
            let again = compute_price(&catalog, &config, Some(&defaults)).unwrap();
            assert_eq!(again.subtotal.to_bits(), first.subtotal.to_bits());
            assert_eq!(again.unit_price.to_bits(), first.unit_price.to_bits());
        }
    }

    #[test]
    fn test_same_result_through_catalog_and_resolved_thickness() {
        let catalog = Catalog::builtin();
        let resolved = ResolvedThickness {
            material_id: MILD_STEEL.to_string(),
            thickness: Thickness {
                label: GA16.to_string(),
                inches: 0.060,
                base_price_per_sq_in: 0.055,
            },
        };
        let defaults = build_snapshot(&default_parameters());
        let config = part(10.0, 10.0, 55).with_service("anodizing");
        assert_eq!(
            compute_price(&catalog, &config, Some(&defaults)).unwrap(),
            compute_price(&resolved, &config, Some(&defaults)).unwrap()
        );
    }

    #[test]
    fn test_unit_price_monotone_in_area() {
        let catalog = Catalog::builtin();
        let defaults = build_snapshot(&default_parameters());
        let mut last = 0.0;
        for step in 1..=40 {
            let side = step as f64 * 0.5;
            let b = compute_price(&catalog, &part(side, side, 1), Some(&defaults)).unwrap();
            assert!(b.unit_price >= last, "unit price fell at side {}", side);
            last = b.unit_price;
        }
    }

    #[test]
    fn test_outputs_already_rounded() {
        let catalog = Catalog::builtin();
        let defaults = build_snapshot(&default_parameters());
        let b = compute_price(&catalog, &part(3.3, 7.7, 13), Some(&defaults)).unwrap();
        assert_eq!(b.rounded(), b);
    }

    #[test]
    fn test_validate_rejects_bad_dimensions_and_quantity() {
        assert!(part(6.0, 4.0, 1).validate().is_ok());
        for bad in [
            part(0.0, 4.0, 1),
            part(6.0, -1.0, 1),
            part(f64::NAN, 4.0, 1),
            part(6.0, f64::INFINITY, 1),
            part(6.0, 4.0, 0),
            PartConfiguration::new("", GA16, 6.0, 4.0, 1),
            PartConfiguration::new(MILD_STEEL, " ", 6.0, 4.0, 1),
        ] {
            assert!(matches!(bad.validate(), Err(Error::Validation(_))), "{:?}", bad);
        }
    }

    #[test]
    fn test_oversized_area_is_rejected() {
        let huge = part(1e200, 1e200, 1);
        assert!(matches!(huge.validate(), Err(Error::Validation(_))));
        assert!(matches!(
            compute_price(&Catalog::builtin(), &huge, None),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_overflowing_price_is_rejected() {
        // Area itself is finite; markup and quantity push it past f64::MAX
        let config = part(1e154, 1e154, u32::MAX);
        assert!(config.validate().is_ok());
        let params = ParameterSnapshot::from_pairs([("base_markup_pct", 200.0)]);
        assert!(matches!(
            compute_price(&Catalog::builtin(), &config, Some(&params)),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_subtotal_non_decreasing_between_thresholds() {
        let catalog = Catalog::builtin();
        let live = ParameterSnapshot::from_pairs([
            ("qty_break_10", 10.0),
            ("qty_break_50", 15.0),
            ("setup_fee", 15.0),
            ("minimum_part", 5.0),
        ]);
        // Half-open runs between consecutive ladder thresholds
        let runs = [(1u32, 9u32), (10, 49), (50, 99), (100, 140)];

        for params in [None, Some(&live)] {
            for (start, end) in runs {
                let mut last = 0.0;
                for qty in start..=end {
                    let b = compute_price(&catalog, &part(6.0, 4.0, qty), params).unwrap();
                    assert!(
                        b.subtotal >= last,
                        "subtotal fell at qty {} (live params: {})",
                        qty,
                        params.is_some()
                    );
                    last = b.subtotal;
                }
            }
        }
    }

    #[test]
    fn test_breakdown_json_is_camel_case() {
        let json = serde_json::to_value(PriceBreakdown::zero()).unwrap();
        for field in ["unitPrice", "discountFraction", "setupFee", "subtotal"] {
            assert!(json.get(field).is_some(), "missing {}", field);
        }
    }

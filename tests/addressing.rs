//! Plane index arithmetic across every dimension order.

use bioformats::core::{DimensionOrder, Region, SeriesDescriptor, ZctCoord};
use bioformats::Error;

fn series(order: DimensionOrder, z: usize, c: usize, t: usize) -> SeriesDescriptor {
    let mut desc = SeriesDescriptor::new(10, 5)
        .with_zct(z, c, t)
        .with_dimension_order(order);
    desc.finalize().expect("valid descriptor");
    desc
}

#[test]
fn test_example_scenario() {
    let desc = series(DimensionOrder::XYCZT, 2, 3, 1);
    assert_eq!(desc.image_count(), 6);
    assert_eq!(desc.index_to_coord(4).unwrap(), ZctCoord::new(1, 1, 0));
    assert_eq!(desc.coord_to_index((1, 1, 0)).unwrap(), 4);
}

#[test]
fn test_round_trip_all_orders() {
    for order in DimensionOrder::ALL {
        let desc = series(order, 3, 4, 5);
        assert_eq!(desc.image_count(), 60);

        let mut seen = vec![false; desc.image_count()];
        for z in 0..3 {
            for c in 0..4 {
                for t in 0..5 {
                    let coord = ZctCoord::new(z, c, t);
                    let index = desc.coord_to_index(coord).unwrap();
                    assert_eq!(desc.index_to_coord(index).unwrap(), coord, "{}", order);
                    assert!(!seen[index], "{} maps two coordinates to {}", order, index);
                    seen[index] = true;
                }
            }
        }
        assert!(seen.iter().all(|&s| s), "{} leaves gaps", order);
    }
}

#[test]
fn test_fastest_axis_follows_order() {
    let desc = series(DimensionOrder::XYTZC, 2, 2, 3);
    assert_eq!(desc.index_to_coord(1).unwrap(), ZctCoord::new(0, 0, 1));
    assert_eq!(desc.index_to_coord(3).unwrap(), ZctCoord::new(1, 0, 0));
    assert_eq!(desc.index_to_coord(6).unwrap(), ZctCoord::new(0, 1, 0));
}

#[test]
fn test_out_of_range() {
    let desc = series(DimensionOrder::XYZCT, 2, 3, 1);
    assert!(matches!(
        desc.index_to_coord(6),
        Err(Error::OutOfRange { index: 6, count: 6, .. })
    ));
    assert!(matches!(
        desc.coord_to_index((0, 3, 0)),
        Err(Error::CoordOutOfRange { .. })
    ));
}

#[test]
fn test_region_containment() {
    let desc = series(DimensionOrder::XYZCT, 2, 3, 1);
    for index in 0..desc.image_count() {
        desc.check_plane_region(index, desc.full_region()).unwrap();
    }

    let rejected = [
        Region::new(1, 0, 10, 5),
        Region::new(0, 1, 10, 5),
        Region::new(9, 4, 2, 1),
        Region::new(0, 0, 11, 1),
    ];
    for region in rejected {
        assert!(
            matches!(desc.check_plane_region(0, region), Err(Error::InvalidRegion { .. })),
            "{:?} accepted",
            region
        );
    }
    desc.check_plane_region(0, Region::new(9, 4, 1, 1)).unwrap();
}

#[test]
fn test_rgb_planes_share_channels() {
    let mut desc = SeriesDescriptor::new(4, 4)
        .with_zct(2, 6, 1)
        .with_samples_per_pixel(3)
        .with_dimension_order(DimensionOrder::XYCZT);
    desc.finalize().unwrap();

    assert!(desc.is_rgb());
    assert_eq!(desc.effective_size_c(), 2);
    assert_eq!(desc.image_count(), 4);
    assert_eq!(desc.index_to_coord(3).unwrap(), ZctCoord::new(1, 1, 0));
    assert_eq!(desc.plane_size(), 4 * 4 * 3);
}

#[test]
fn test_make_sane_orders() {
    assert_eq!(DimensionOrder::make_sane("XYC"), DimensionOrder::XYCZT);
    assert_eq!(DimensionOrder::make_sane("XYTZ"), DimensionOrder::XYTZC);
    assert_eq!(DimensionOrder::make_sane(""), DimensionOrder::XYZCT);
    assert_eq!("xyctz".parse::<DimensionOrder>().unwrap(), DimensionOrder::XYCTZ);
    assert!("XYZZT".parse::<DimensionOrder>().is_err());
}

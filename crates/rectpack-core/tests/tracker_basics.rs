use rectpack_core::prelude::*;

fn sorted(bin: &FreeRectManager) -> Vec<Rect> {
    let mut v: Vec<Rect> = bin.iter().copied().collect();
    v.sort_by_key(|r| (r.x, r.y, r.w, r.h));
    v
}

#[test]
fn starts_with_the_whole_bin() {
    let root = Rect::new(0, 0, 10, 10);
    let bin = FreeRectManager::new(root).expect("tracker");
    assert_eq!(bin.len(), 1);
    assert_eq!(bin.get(0).unwrap(), root);
    assert_eq!(bin.root(), root);
    assert_eq!(bin.placements(), 0);
}

#[test]
fn corner_placement_leaves_two_strips() {
    let mut bin = FreeRectManager::new(Rect::new(0, 0, 10, 10)).unwrap();
    let report = bin.place_rect(&Rect::new(0, 0, 4, 4)).unwrap();

    assert_eq!(
        sorted(&bin),
        vec![Rect::new(0, 4, 10, 6), Rect::new(4, 0, 6, 10)]
    );
    assert_eq!(report.split, 1);
    assert_eq!(report.after_prune, 2);
    assert!(!report.is_noop());
    assert_eq!(bin.placements(), 1);
}

#[test]
fn centre_placement_leaves_four_slabs() {
    let mut bin = FreeRectManager::new(Rect::new(0, 0, 10, 10)).unwrap();
    bin.place_rect(&Rect::new(3, 3, 4, 4)).unwrap();
    assert_eq!(
        sorted(&bin),
        vec![
            Rect::new(0, 0, 3, 10),
            Rect::new(0, 0, 10, 3),
            Rect::new(0, 7, 10, 3),
            Rect::new(7, 0, 3, 10),
        ]
    );

    let report = bin.place_rect(&Rect::new(0, 0, 3, 3)).unwrap();
    assert_eq!(report.split, 2);
    assert_eq!(report.after_split, 4);
    assert_eq!(report.after_prune, 4);
    assert_eq!(
        sorted(&bin),
        vec![
            Rect::new(0, 3, 3, 7),
            Rect::new(0, 7, 10, 3),
            Rect::new(3, 0, 7, 3),
            Rect::new(7, 0, 3, 10),
        ]
    );
}

#[test]
fn contained_slabs_are_pruned() {
    let mut bin = FreeRectManager::new(Rect::new(0, 0, 10, 10)).unwrap();
    bin.place_rect(&Rect::new(2, 2, 2, 2)).unwrap();
    assert_eq!(bin.len(), 4);

    let report = bin.place_rect(&Rect::new(6, 6, 2, 2)).unwrap();
    assert_eq!(report.split, 2);
    assert_eq!(report.after_split, 10);
    assert_eq!(report.after_prune, 8);
    assert_eq!(report.pruned(), 2);
    assert!(bin.verify().is_ok());
    assert!(!bin.iter().any(|r| *r == Rect::new(8, 4, 2, 6)));
    assert!(!bin.iter().any(|r| *r == Rect::new(4, 8, 6, 2)));
}

#[test]
fn disjoint_placement_is_a_noop() {
    let mut bin = FreeRectManager::new(Rect::new(0, 0, 10, 10)).unwrap();
    bin.place_rect(&Rect::new(0, 0, 4, 4)).unwrap();
    let before: Vec<Rect> = bin.iter().copied().collect();

    // same spot again: no free rectangle overlaps it any more
    let report = bin.place_rect(&Rect::new(0, 0, 4, 4)).unwrap();
    assert!(report.is_noop());
    assert_eq!(bin.as_slice(), before.as_slice());

    let report = bin.place_rect(&Rect::new(20, 20, 5, 5)).unwrap();
    assert!(report.is_noop());
    assert_eq!(bin.as_slice(), before.as_slice());
}

#[test]
fn zero_area_placement_is_a_noop() {
    let mut bin = FreeRectManager::new(Rect::new(0, 0, 10, 10)).unwrap();
    let report = bin.place_rect(&Rect::new(3, 3, 0, 5)).unwrap();
    assert!(report.is_noop());
    assert_eq!(report.after_prune, 1);
    assert_eq!(bin.get(0).unwrap(), Rect::new(0, 0, 10, 10));
    assert_eq!(bin.placements(), 0);
}

#[test]
fn placing_the_whole_bin_consumes_everything() {
    let root = Rect::new(0, 0, 10, 10);
    let mut bin = FreeRectManager::new(root).unwrap();
    let report = bin.place_rect(&root).unwrap();
    assert_eq!(bin.len(), 0);
    assert!(bin.is_empty());
    assert_eq!(report.after_split, 0);

    // nothing left to overlap
    assert!(bin.place_rect(&Rect::new(1, 1, 2, 2)).unwrap().is_noop());
}

#[test]
fn repeated_queries_are_stable() {
    let mut bin = FreeRectManager::new(Rect::new(0, 0, 64, 64)).unwrap();
    bin.place_rect(&Rect::new(10, 20, 12, 8)).unwrap();
    let first: Vec<Rect> = (0..bin.len()).map(|i| bin.get(i).unwrap()).collect();
    let second: Vec<Rect> = (0..bin.len()).map(|i| bin.get(i).unwrap()).collect();
    assert_eq!(first, second);
    assert_eq!(bin.iter().copied().collect::<Vec<_>>(), first);
}

#[test]
fn real_coordinates() {
    let mut bin = FreeRectManager::new(Rect::new(0.0f64, 0.0, 1.0, 1.0)).unwrap();
    bin.place_rect(&Rect::new(0.25, 0.25, 0.5, 0.5)).unwrap();
    assert_eq!(bin.len(), 4);
    assert!(bin.iter().any(|r| *r == Rect::new(0.75, 0.0, 0.25, 1.0)));
    assert!(bin.iter().any(|r| *r == Rect::new(0.0, 0.75, 1.0, 0.25)));
    assert!(bin.verify().is_ok());
}

#[test]
fn offset_bin_origin() {
    let mut bin = FreeRectManager::new(Rect::new(100u32, 50, 20, 20)).unwrap();
    bin.place_rect(&Rect::new(100, 50, 20, 5)).unwrap();
    assert_eq!(bin.len(), 1);
    assert_eq!(bin.get(0).unwrap(), Rect::new(100, 55, 20, 15));
}

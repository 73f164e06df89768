use document_core::Document;

#[test]
fn test_marker_shifts_after_insertion_before_it() {
    let mut doc = Document::new("abc\ndef\nghi\n").unwrap();
    let marker = doc.create_range_marker(4, 7).unwrap();

    doc.insert(0, "// comment\n").unwrap();
    assert_eq!(marker.range(), Some(15..18));
    assert_eq!(doc.text_range(15, 18).unwrap(), "def");
}

#[test]
fn test_marker_grows_on_insertion_inside() {
    let mut doc = Document::new("abcdefgh").unwrap();
    let marker = doc.create_range_marker(2, 6).unwrap();

    doc.insert(4, "XY").unwrap();
    assert_eq!(marker.range(), Some(2..8));
}

#[test]
fn test_non_greedy_boundary_insertions_excluded() {
    let mut doc = Document::new("abcdefgh").unwrap();
    let marker = doc.create_range_marker(2, 6).unwrap();

    // At the start: text goes before the marker.
    doc.insert(2, "X").unwrap();
    assert_eq!(marker.range(), Some(3..7));

    // At the end: text stays outside.
    doc.insert(7, "Y").unwrap();
    assert_eq!(marker.range(), Some(3..7));
}

#[test]
fn test_greedy_boundaries_absorb_insertions() {
    let mut doc = Document::new("abcdefgh").unwrap();
    let marker = doc.create_range_marker(2, 6).unwrap();
    marker.set_greedy_to_left(true);
    marker.set_greedy_to_right(true);

    doc.insert(2, "X").unwrap();
    assert_eq!(marker.range(), Some(2..7));
    doc.insert(7, "Y").unwrap();
    assert_eq!(marker.range(), Some(2..8));
}

#[test]
fn test_deletion_overlapping_start_clips() {
    let mut doc = Document::new("0123456789").unwrap();
    let marker = doc.create_range_marker(4, 8).unwrap();

    doc.remove(2, 6).unwrap();
    assert_eq!(marker.range(), Some(2..4));
}

#[test]
fn test_deletion_overlapping_end_clips() {
    let mut doc = Document::new("0123456789").unwrap();
    let marker = doc.create_range_marker(2, 6).unwrap();

    doc.remove(4, 8).unwrap();
    assert_eq!(marker.range(), Some(2..4));
}

#[test]
fn test_deletion_swallowing_marker_invalidates() {
    let mut doc = Document::new("0123456789").unwrap();
    let marker = doc.create_range_marker(3, 6).unwrap();

    doc.remove(2, 8).unwrap();
    assert!(!marker.is_valid());
    assert_eq!(marker.range(), None);
}

#[test]
fn test_whole_document_replacement_invalidates_plain_markers() {
    let mut doc = Document::new("some old text").unwrap();
    let marker = doc.create_range_marker(5, 8).unwrap();

    doc.replace(0, doc.length(), "entirely new but different").unwrap();
    assert!(!marker.is_valid());
}

#[test]
fn test_surviving_marker_clamps_on_reload() {
    let mut doc = Document::new("a long original document body").unwrap();
    let marker = doc.create_range_marker_surviving_reload(10, 25).unwrap();

    doc.replace(0, doc.length(), "short text").unwrap();
    assert!(marker.is_valid());
    let range = marker.range().unwrap();
    assert!(range.end <= doc.length());
    assert!(range.start <= range.end);
}

#[test]
fn test_zero_width_marker_tracks_position() {
    let mut doc = Document::new("abcdef").unwrap();
    let marker = doc.create_range_marker(3, 3).unwrap();

    doc.insert(0, "__").unwrap();
    assert_eq!(marker.range(), Some(5..5));
    doc.remove(0, 2).unwrap();
    assert_eq!(marker.range(), Some(3..3));
}

#[test]
fn test_dropped_handles_leave_registry() {
    let mut doc = Document::new("abcdef").unwrap();
    let keeper = doc.create_range_marker(0, 2).unwrap();
    {
        let _short_lived = doc.create_range_marker(2, 4).unwrap();
        assert_eq!(doc.live_marker_count(), 2);
    }
    // The registry holds markers weakly; an edit compacts dead entries.
    doc.insert(6, "!").unwrap();
    assert_eq!(doc.live_marker_count(), 1);
    assert!(keeper.is_valid());
}

#[test]
fn test_many_markers_survive_edit_storm() {
    let mut doc = Document::new(&"x".repeat(100)).unwrap();
    let markers: Vec<_> = (0..10)
        .map(|i| doc.create_range_marker(i * 10, i * 10 + 5).unwrap())
        .collect();

    doc.insert(0, "yyyy").unwrap();
    doc.remove(50, 60).unwrap();
    doc.replace(20, 30, "zz").unwrap();

    for marker in &markers {
        if let Some(range) = marker.range() {
            assert!(range.start <= range.end);
            assert!(range.end <= doc.length());
        }
    }
}

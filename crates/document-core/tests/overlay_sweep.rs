use document_core::{
    Color, Document, FoldModel, Highlighter, OverlayIterator, OverlayPalette, Segment, TargetArea,
    TextAttributes, TokenSpan, ViewState, layer,
};

const FG: Color = Color(0xDD_DD_DD);
const SELECTION_BG: Color = Color(0x33_66_99);
const CARET_ROW_BG: Color = Color(0x2A_2A_2A);
const ERROR_BG: Color = Color(0x99_33_33);
const KEYWORD_FG: Color = Color(0xCC_99_00);

fn palette() -> OverlayPalette {
    OverlayPalette {
        default: TextAttributes::foreground(FG),
        selection: TextAttributes::background(SELECTION_BG),
        caret_row: TextAttributes::background(CARET_ROW_BG),
        guarded_block: TextAttributes::background(Color(0x40_40_40)),
        fold_placeholder: TextAttributes::foreground(Color(0x88_88_88)),
    }
}

fn assert_tiles(segments: &[Segment], length: usize) {
    assert_eq!(segments[0].start, 0);
    assert_eq!(segments.last().unwrap().end, length);
    for pair in segments.windows(2) {
        assert_eq!(pair[0].end, pair[1].start, "gap or overlap at {pair:?}");
    }
}

#[test]
fn test_full_editor_view_sweep() {
    // A small "file" with syntax tokens, an error highlighter, a selection,
    // a caret row and a collapsed fold, all at once.
    let mut doc = Document::new("fn alpha() {\n    beta();\n}\nfn gamma() {}\n").unwrap();
    let mut folds = FoldModel::new();
    folds.run_batch_folding_operation(&mut doc, |folds, doc| {
        // Collapse the body of alpha: "{\n    beta();\n}".
        let region = folds.add_fold_region(doc, 11, 26, "{...}").unwrap();
        region.set_expanded(false).unwrap();
    });

    let tokens = [
        TokenSpan { start: 0, end: 2, attributes: TextAttributes::foreground(KEYWORD_FG) },
        TokenSpan { start: 27, end: 29, attributes: TextAttributes::foreground(KEYWORD_FG) },
    ];
    let highlighters = [Highlighter {
        start: 30,
        end: 35,
        layer: layer::ERROR,
        attributes: TextAttributes::background(ERROR_BG),
        target_area: TargetArea::Exact,
        after_end_of_line: false,
    }];
    let view = ViewState { selection: Some(3..8), caret: Some(32) };

    let segments: Vec<Segment> = OverlayIterator::begin(
        &doc,
        &folds,
        &palette(),
        &view,
        &tokens,
        &highlighters,
        0,
    )
    .collect();

    assert_tiles(&segments, doc.length());

    // Keyword token at the start.
    assert_eq!(segments[0].attributes.foreground, Some(KEYWORD_FG));

    // Selection beats the default background.
    let selected = segments.iter().find(|s| s.start == 3).unwrap();
    assert_eq!(selected.attributes.background, Some(SELECTION_BG));

    // The collapsed body is one placeholder segment.
    let folded = segments.iter().find(|s| s.placeholder.is_some()).unwrap();
    assert_eq!(folded.start, 11);
    assert_eq!(folded.end, 26);
    assert_eq!(folded.placeholder.as_deref(), Some("{...}"));

    // The error highlighter beats the caret row on the same line.
    let error = segments.iter().find(|s| s.start == 30).unwrap();
    assert_eq!(error.attributes.background, Some(ERROR_BG));

    // The caret row still shows left of the error range.
    let row = segments.iter().find(|s| s.start == 27).unwrap();
    assert_eq!(row.attributes.background, Some(CARET_ROW_BG));

    // Everything falls back to the default foreground where no token sits.
    let plain = segments.iter().find(|s| s.start == 8).unwrap();
    assert_eq!(plain.attributes.foreground, Some(FG));
}

#[test]
fn test_sweep_reflects_state_at_begin_only() {
    let mut doc = Document::new("0123456789").unwrap();
    let folds = FoldModel::new();
    let tokens =
        [TokenSpan { start: 0, end: 10, attributes: TextAttributes::foreground(KEYWORD_FG) }];

    let mut sweep = OverlayIterator::begin(
        &doc,
        &folds,
        &palette(),
        &ViewState::default(),
        &tokens,
        &[],
        0,
    );

    // Mutating the document does not disturb an iteration already begun;
    // the sweep keeps describing the snapshot it was given.
    doc.insert(0, "___").unwrap();
    let segment = sweep.next().unwrap();
    assert_eq!(segment.start, 0);
    assert_eq!(segment.end, 10);
}

#[test]
fn test_layer_conflict_resolution_is_per_field() {
    let doc = Document::new("0123456789").unwrap();
    let folds = FoldModel::new();
    let highlighters = [
        Highlighter {
            start: 0,
            end: 10,
            layer: layer::WARNING,
            attributes: TextAttributes {
                foreground: Some(KEYWORD_FG),
                background: Some(Color(0x10_10_10)),
                font_style: None,
                effect: None,
            },
            target_area: TargetArea::Exact,
            after_end_of_line: false,
        },
        Highlighter {
            start: 0,
            end: 10,
            layer: layer::ERROR,
            attributes: TextAttributes::background(ERROR_BG),
            target_area: TargetArea::Exact,
            after_end_of_line: false,
        },
    ];

    let segments: Vec<Segment> = OverlayIterator::begin(
        &doc,
        &folds,
        &palette(),
        &ViewState::default(),
        &[],
        &highlighters,
        0,
    )
    .collect();

    assert_eq!(segments.len(), 1);
    // Background from the error layer, foreground from the warning layer.
    assert_eq!(segments[0].attributes.background, Some(ERROR_BG));
    assert_eq!(segments[0].attributes.foreground, Some(KEYWORD_FG));
}

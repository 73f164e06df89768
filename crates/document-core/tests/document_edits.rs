use std::cell::RefCell;
use std::rc::Rc;

use document_core::{Document, DocumentError, DocumentListener, ListenerPriority, TextChange};
use pretty_assertions::assert_eq;

#[test]
fn test_insert_updates_text_and_lines() {
    let mut doc = Document::new("abc\ndef\n").unwrap();
    assert_eq!(doc.line_count(), 3);

    doc.insert(4, "X").unwrap();
    assert_eq!(doc.text(), "abc\nXdef\n");
    assert_eq!(doc.line_count(), 3);
    assert_eq!(doc.line_text(1).as_deref(), Some("Xdef"));
    assert_eq!(doc.line_number_at(4).unwrap(), 1);
}

#[test]
fn test_remove_joining_lines() {
    let mut doc = Document::new("abc\ndef\nghi").unwrap();
    doc.remove(3, 4).unwrap();
    assert_eq!(doc.text(), "abcdef\nghi");
    assert_eq!(doc.line_count(), 2);
    assert_eq!(doc.line_text(0).as_deref(), Some("abcdef"));
}

#[test]
fn test_replace_across_lines() {
    let mut doc = Document::new("one\ntwo\nthree\n").unwrap();
    doc.replace(4, 13, "2\n3\n4").unwrap();
    assert_eq!(doc.text(), "one\n2\n3\n4\n");
    assert_eq!(doc.line_count(), 5);
}

#[test]
fn test_modification_stamp_changes_per_edit() {
    let mut doc = Document::new("hello").unwrap();
    let initial = doc.modification_stamp();
    doc.insert(5, " world").unwrap();
    assert_ne!(doc.modification_stamp(), initial);

    // A replacement that changes nothing commits nothing.
    let stamp = doc.modification_stamp();
    doc.replace(0, 5, "hello").unwrap();
    assert_eq!(doc.modification_stamp(), stamp);
}

#[test]
fn test_carriage_return_rejected() {
    let mut doc = Document::new("abc").unwrap();
    assert_eq!(doc.insert(0, "x\r\ny").unwrap_err(), DocumentError::CarriageReturn);
    assert!(Document::new("a\rb").is_err());
}

#[test]
fn test_read_only_document_rejects_writes() {
    let mut doc = Document::new("abc").unwrap();
    doc.set_read_only(true);
    assert!(!doc.is_writable());
    assert_eq!(doc.insert(0, "x").unwrap_err(), DocumentError::ReadOnly);
    assert_eq!(doc.text(), "abc");

    doc.set_read_only(false);
    doc.insert(0, "x").unwrap();
    assert_eq!(doc.text(), "xabc");
}

struct Recorder {
    log: Rc<RefCell<Vec<(String, usize, String, String)>>>,
    tag: &'static str,
}

impl DocumentListener for Recorder {
    fn before_change(&mut self, change: &TextChange) {
        self.log.borrow_mut().push((
            format!("{}:before", self.tag),
            change.offset,
            change.old_fragment.clone(),
            change.new_fragment.clone(),
        ));
    }

    fn after_change(&mut self, change: &TextChange) {
        self.log.borrow_mut().push((
            format!("{}:after", self.tag),
            change.offset,
            change.old_fragment.clone(),
            change.new_fragment.clone(),
        ));
    }
}

#[test]
fn test_listeners_fire_in_priority_order() {
    let mut doc = Document::new("abcdef").unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));

    // Registered out of priority order on purpose.
    doc.add_listener(
        ListenerPriority::Observer,
        Box::new(Recorder { log: Rc::clone(&log), tag: "observer" }),
    );
    doc.add_listener(
        ListenerPriority::Folding,
        Box::new(Recorder { log: Rc::clone(&log), tag: "folding" }),
    );
    doc.add_listener(
        ListenerPriority::Highlighting,
        Box::new(Recorder { log: Rc::clone(&log), tag: "highlighting" }),
    );

    doc.remove(2, 4).unwrap();

    let order: Vec<String> = log.borrow().iter().map(|e| e.0.clone()).collect();
    assert_eq!(
        order,
        vec![
            "folding:before",
            "highlighting:before",
            "observer:before",
            "folding:after",
            "highlighting:after",
            "observer:after",
        ]
    );
}

#[test]
fn test_listeners_observe_trimmed_change() {
    let mut doc = Document::new("prefix-MIDDLE-suffix").unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));
    doc.add_listener(
        ListenerPriority::Observer,
        Box::new(Recorder { log: Rc::clone(&log), tag: "o" }),
    );

    // Only "MIDDLE" -> "middle" differs; the common affixes are trimmed.
    doc.replace(0, 20, "prefix-middle-suffix").unwrap();

    let events = log.borrow();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].1, 7);
    assert_eq!(events[0].2, "MIDDLE");
    assert_eq!(events[0].3, "middle");
}

#[test]
fn test_guarded_block_rejects_and_reports_edit() {
    let mut doc = Document::new("editable GUARDED editable").unwrap();
    doc.create_guarded_block(9, 16).unwrap();
    doc.start_guarded_block_checking();

    let err = doc.remove(10, 12).unwrap_err();
    assert_eq!(
        err,
        DocumentError::GuardedFragment {
            edit_start: 10,
            edit_end: 12,
            block_start: 9,
            block_end: 16,
        }
    );
    assert_eq!(doc.text(), "editable GUARDED editable");

    // Edits outside the block still go through.
    doc.insert(0, ">").unwrap();
    assert_eq!(doc.get_guarded_block(12).map(|b| b.start()), Some(10));
}

#[test]
fn test_guarded_block_suppression_scope() {
    let mut doc = Document::new("editable GUARDED editable").unwrap();
    doc.create_guarded_block(9, 16).unwrap();
    doc.start_guarded_block_checking();

    doc.suppress_guarded_exceptions(|doc| doc.replace(9, 16, "guarded"))
        .unwrap();
    assert_eq!(doc.text(), "editable guarded editable");

    // Suppression ends with the closure.
    assert!(doc.remove(9, 16).is_err());
}

#[test]
fn test_guarded_checking_disabled_by_default() {
    let mut doc = Document::new("abc GUARDED xyz").unwrap();
    doc.create_guarded_block(4, 11).unwrap();
    doc.replace(4, 11, "guarded").unwrap();
    assert_eq!(doc.text(), "abc guarded xyz");
}

#[test]
fn test_whole_document_replacement() {
    let mut doc = Document::new("old content\nwith lines\n").unwrap();
    doc.replace(0, doc.length(), "fresh").unwrap();
    assert_eq!(doc.text(), "fresh");
    assert_eq!(doc.line_count(), 1);
}

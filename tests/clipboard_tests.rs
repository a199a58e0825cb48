// The copy action must be a no-op on an empty transcript: no clipboard
// access, no confirmation. (Copying real text needs a display server and
// is exercised manually.)

use livescribe::clipboard::copy_text;

#[test]
fn test_copy_empty_transcript_is_noop() {
    let copied = copy_text("").expect("empty copy must not fail");
    assert!(!copied);
}

mod common;

use common::{read_string, scratch, write_stdout};
use stdio_guard::{ChannelSlot, RedirectGuard};

#[test]
fn only_bytes_written_during_redirect_reach_the_file() {
    let dir = scratch();
    let original = dir.path().join("original.txt");
    let temp = dir.path().join("during.txt");

    // Stand-in for the terminal so its contents can be inspected.
    let destination =
        RedirectGuard::create(&original, ChannelSlot::Output).expect("Failed to redirect");

    write_stdout(b"before");
    {
        let _guard = RedirectGuard::create(&temp, ChannelSlot::Output).expect("Failed to redirect");
        write_stdout(b"during");
    }
    write_stdout(b"after");
    drop(destination);

    assert_eq!(read_string(&original), "beforeafter");
    assert_eq!(read_string(&temp), "during");
}

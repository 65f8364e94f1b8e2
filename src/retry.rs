use std::io;

/// Run `op` until it returns anything other than an interrupted-call error.
///
/// Only `ErrorKind::Interrupted` (EINTR) is retried; every other error is
/// returned on the first occurrence.
pub fn retry_interrupted<T, F>(mut op: F) -> io::Result<T>
where
    F: FnMut() -> io::Result<T>,
{
    loop {
        match op() {
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}

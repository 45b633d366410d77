/// Turns a `Result` into an `Option`, logging the error at `level` instead of propagating it.
///
/// Used where a single failed attempt is expected and must not abort the surrounding sweep.
pub trait ResultOkLogExt<T, E> {
    fn ok_log(self, level: log::Level) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self, level: log::Level) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::log!(level, "{err}");
                None
            }
        }
    }
}

use std::error::Error;

use crate::error::CError;
use crate::like::ErrorLike;
use crate::template::Args;
use crate::CResult;

/// Extension trait for attaching catalog identity to any `Result`.
///
/// Lets collaborator code (drivers, clients, parsers) hand its own
/// failure to a catalog prototype without matching on it first.
///
/// ```ignore
/// use cerror::ResultExt;
///
/// // Prototype message as-is:
/// conn.ping().wrap_err(&ERR_PING)?;
///
/// // Renew with call-site values, then wrap:
/// pool.get(addr).wrap_err_with(&ERR_CONNECT, &[&addr, &"pool exhausted"])?;
/// ```
pub trait ResultExt<T> {
    /// Wrap the error under `proto`'s identity and current message.
    fn wrap_err(self, proto: &CError) -> CResult<T>;

    /// Renew `proto` with `args`, then wrap the error under it.
    fn wrap_err_with(self, proto: &CError, args: Args<'_>) -> CResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn wrap_err(self, proto: &CError) -> CResult<T> {
        self.map_err(|e| proto.wrap(ErrorLike::primitive(e)))
    }

    fn wrap_err_with(self, proto: &CError, args: Args<'_>) -> CResult<T> {
        self.map_err(|e| proto.wrap_with(args, ErrorLike::primitive(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn connect(_addr: &str) -> Result<(), io::Error> {
        Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
    }

    #[test]
    fn wrap_err_keeps_identity_and_source() {
        let proto = CError::from_parts("DAS", 1001, "connect failed", None);
        let e = connect("db1").wrap_err(&proto).unwrap_err();
        assert_eq!(e.code(), "DAS-1001");
        assert_eq!(e.source().map(|s| s.to_string()).as_deref(), Some("refused"));
        assert_eq!(e.to_string(), "DAS-1001: connect failed\nrefused");
    }

    #[test]
    fn wrap_err_with_renews() {
        let proto = CError::from_parts("DAS", 1001, "failed to connect to %s: %s", None);
        let e = connect("db1")
            .wrap_err_with(&proto, &[&"db1", &"refused"])
            .unwrap_err();
        assert_eq!(e.message(), "failed to connect to db1: refused");
        assert_eq!(proto.message(), "failed to connect to %s: %s");
        assert!(matches!(e.wrapped(), Some(ErrorLike::Primitive(_))));
    }

    #[test]
    fn ok_passes_through() {
        let proto = CError::from_parts("DAS", 1, "x", None);
        let r: Result<u8, io::Error> = Ok(7);
        assert_eq!(r.wrap_err(&proto).unwrap(), 7);
    }
}

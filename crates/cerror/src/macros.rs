/// Specify a node in place with a variadic argument list.
///
/// ```ignore
/// specify!(err, "db1", "timeout");
/// // same as: err.specify(&[&"db1", &"timeout"]);
/// ```
#[macro_export]
macro_rules! specify {
    ($node:expr $(, $arg:expr)* $(,)?) => {
        $node.specify(&[$(&$arg as &dyn ::core::fmt::Display),*])
    };
}

/// Renew a prototype with a variadic argument list.
///
/// ```ignore
/// let err = renew!(ERR_CONNECT, addr, "timeout");
/// // same as: ERR_CONNECT.renew(&[&addr, &"timeout"]);
/// ```
#[macro_export]
macro_rules! renew {
    ($proto:expr $(, $arg:expr)* $(,)?) => {
        $proto.renew(&[$(&$arg as &dyn ::core::fmt::Display),*])
    };
}

/// Match on a `CError`'s `(header, code)` identity.
///
/// Arms are ordinary patterns over `(&str, u32)`, so `_` works in either
/// position and the match must be exhaustive.
///
/// ```ignore
/// match_code!(err, {
///     ("DAS", 1001)      => reconnect(),
///     ("DAS", 2000..=2999) => retry_query(),
///     ("DAS", _)         => fail_db(),
///     _                  => fail(),
/// })
/// ```
#[macro_export]
macro_rules! match_code {
    ($error:expr, { $($pat:pat => $handler:expr),+ $(,)? }) => {{
        let __e = &$error;
        match (__e.header(), __e.err_code()) {
            $($pat => $handler),+
        }
    }};
}

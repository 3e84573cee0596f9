//! Logging macros
//!
//! The macros resolve their domain from `module_path!()` against the
//! process-wide default registry, once per call site, and capture the source
//! position without any runtime stack inspection.

/// Logs a message to the domain derived from the enclosing module path.
///
/// `my_app::net::http` maps onto the domain `my_app.net.http` in the
/// default registry. The domain is resolved once per call site.
///
/// ```
/// use arbor_log::Level;
///
/// arbor_log::log!(Level::Debug, "startup", "listening on :8080");
/// ```
#[macro_export]
macro_rules! log {
    ($level:expr, $origin:expr, $message:expr $(,)?) => {{
        static DOMAIN: ::std::sync::OnceLock<$crate::Domain> = ::std::sync::OnceLock::new();
        let domain =
            DOMAIN.get_or_init(|| $crate::global().resolve_module(::core::module_path!()));
        domain.emit(
            $level,
            $crate::CallSite {
                file: ::core::file!(),
                line: ::core::line!(),
                scope: ::core::option::Option::Some(::core::module_path!()),
            },
            &$origin,
            &$message,
            ::core::option::Option::None,
        );
    }};
}

/// Logs a message to an explicit domain handle.
///
/// ```
/// use arbor_log::Level;
///
/// let domain = arbor_log::resolve("net.http");
/// arbor_log::log_to!(domain, Level::Warning, "handshake", "slow peer");
/// ```
#[macro_export]
macro_rules! log_to {
    ($domain:expr, $level:expr, $origin:expr, $message:expr $(,)?) => {{
        $domain.emit(
            $level,
            $crate::CallSite {
                file: ::core::file!(),
                line: ::core::line!(),
                scope: ::core::option::Option::Some(::core::module_path!()),
            },
            &$origin,
            &$message,
            ::core::option::Option::None,
        );
    }};
}

/// Logs a message and an error, with its source chain, to the domain
/// derived from the enclosing module path. Pass the error value itself;
/// the macro takes the reference.
#[macro_export]
macro_rules! log_err {
    ($level:expr, $origin:expr, $message:expr, $error:expr $(,)?) => {{
        static DOMAIN: ::std::sync::OnceLock<$crate::Domain> = ::std::sync::OnceLock::new();
        let domain =
            DOMAIN.get_or_init(|| $crate::global().resolve_module(::core::module_path!()));
        domain.emit(
            $level,
            $crate::CallSite {
                file: ::core::file!(),
                line: ::core::line!(),
                scope: ::core::option::Option::Some(::core::module_path!()),
            },
            &$origin,
            &$message,
            ::core::option::Option::Some(&$error),
        );
    }};
}

//! Ambient write macros.
//!
//! These write through the installed [`LogService`](crate::LogService) and
//! are no-ops when none is installed (before `init` or after `shutdown`).
//! Each argument is passed to [`Channel::write`](crate::Channel::write), so
//! every value is colorized on its own, exactly as a chain of `write` calls.

/// Write values to the ambient output channel.
#[macro_export]
macro_rules! log_out {
    ($($value:expr),* $(,)?) => {
        if let Some(service) = $crate::service::current() {
            service.out()$(.write($value))*;
        }
    };
}

/// Write values to the ambient error channel.
#[macro_export]
macro_rules! log_err {
    ($($value:expr),* $(,)?) => {
        if let Some(service) = $crate::service::current() {
            service.err()$(.write($value))*;
        }
    };
}

/// Write values and an end-of-line to the ambient output channel.
#[macro_export]
macro_rules! log_outln {
    ($($value:expr),* $(,)?) => {
        if let Some(service) = $crate::service::current() {
            service.out()$(.write($value))*.endl();
        }
    };
}

/// Write values and an end-of-line to the ambient error channel.
#[macro_export]
macro_rules! log_errln {
    ($($value:expr),* $(,)?) => {
        if let Some(service) = $crate::service::current() {
            service.err()$(.write($value))*.endl();
        }
    };
}

/// Write a `"[id] "`-prefixed line to the ambient output channel.
///
/// The identifier is anything displayable, typically the id of the robot
/// or controller doing the logging:
///
/// ```
/// # let robot_id = "fb0";
/// steplog::tagged_out!(robot_id, "battery at ", 93, "%");
/// ```
#[macro_export]
macro_rules! tagged_out {
    ($id:expr $(, $value:expr)* $(,)?) => {
        if let Some(service) = $crate::service::current() {
            service.out().prefixed($id)$(.write($value))*.endl();
        }
    };
}

/// Write a `"[id] "`-prefixed line to the ambient error channel.
#[macro_export]
macro_rules! tagged_err {
    ($id:expr $(, $value:expr)* $(,)?) => {
        if let Some(service) = $crate::service::current() {
            service.err().prefixed($id)$(.write($value))*.endl();
        }
    };
}

//! Boundary logging macros
//!
//! All three macros emit one event carrying `component` (the calling module),
//! `op` and `event`, followed by any extra fields in `tracing` syntax.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:ident, $op:expr, $event:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $event
            $(, $($field)*)?
        )
    };
}

/// Log the start of an operation
///
/// ```
/// # use unitwork_core::log_op_start;
/// log_op_start!("uow_execute");
/// log_op_start!("uow_enlist", entity_id = "Order|1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            $crate::types::schema::EVENT_START
            $(, $($field)*)?
        )
    };
}

/// Log the successful end of an operation; `duration_ms` is required
///
/// ```
/// # use unitwork_core::log_op_end;
/// log_op_end!("uow_execute", duration_ms = 42, commands = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            $crate::types::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)*)?
        )
    };
}

/// Log the failure of an operation; `duration_ms` is required
///
/// The error is converted into an [`ExError`](crate::errors::ExError) so the
/// event carries its stable kind and code.
///
/// ```
/// # use unitwork_core::{log_op_error, errors::UowError};
/// let err = UowError::Planning { reason: "nothing to unload".to_string() };
/// log_op_error!("uow_execute", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__log_op_event!(
            error,
            $op,
            $crate::types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code()
            $(, $($field)*)?
        )
    }};
}

//! C bindings.
//!
//! Every `char*` returned by this module is owned by the caller and must be
//! released with [`numby_free_string`] exactly once. Functions returning
//! `c_int` report 0 on success and the negated error code on failure.

use std::ffi::{c_char, c_double, c_int, CStr, CString};
use std::path::Path;
use std::ptr;

use tracing::warn;

use crate::agents::AgentKind;
use crate::api::{self, Session};
use crate::error::{NumbyError, NumbyResult};
use crate::locale;

pub const NUMBY_MAX_EXPR_LENGTH: usize = crate::agents::MAX_EXPR_LENGTH;

pub const NUMBY_PRIORITY_HISTORY: c_int = AgentKind::History.priority() as c_int;
pub const NUMBY_PRIORITY_VARIABLE: c_int = AgentKind::Variable.priority() as c_int;
pub const NUMBY_PRIORITY_PERCENTAGE: c_int = AgentKind::Percentage.priority() as c_int;
pub const NUMBY_PRIORITY_UNIT: c_int = AgentKind::Unit.priority() as c_int;
pub const NUMBY_PRIORITY_MATH: c_int = AgentKind::Math.priority() as c_int;

/// Opaque session handle.
pub struct NumbyContext {
    session: Session,
}

fn status(result: NumbyResult<()>) -> c_int {
    match result {
        Ok(()) => 0,
        Err(e) => {
            warn!("ffi call failed: {}", e);
            -e.code()
        }
    }
}

/// Copies `text` into a caller-owned C string. Interior NULs are dropped.
fn into_c_string(text: &str) -> *mut c_char {
    let bytes: Vec<u8> = text.bytes().filter(|b| *b != 0).collect();
    match CString::new(bytes) {
        Ok(s) => s.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

unsafe fn read_str<'a>(text: *const c_char) -> NumbyResult<&'a str> {
    if text.is_null() {
        return Err(NumbyError::InvalidInput("null string".to_string()));
    }
    CStr::from_ptr(text)
        .to_str()
        .map_err(|e| NumbyError::InvalidInput(format!("string is not UTF-8: {}", e)))
}

unsafe fn session<'a>(ctx: *mut NumbyContext) -> NumbyResult<&'a Session> {
    ctx.as_ref()
        .map(|ctx| &ctx.session)
        .ok_or_else(|| NumbyError::InvalidInput("null context".to_string()))
}

unsafe fn write_out(out: *mut *mut c_char, text: &str) {
    if !out.is_null() {
        *out = into_c_string(text);
    }
}

#[no_mangle]
pub extern "C" fn numby_context_new() -> *mut NumbyContext {
    Box::into_raw(Box::new(NumbyContext {
        session: Session::new(),
    }))
}

/// # Safety
/// `ctx` must come from [`numby_context_new`] and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn numby_context_free(ctx: *mut NumbyContext) {
    if !ctx.is_null() {
        drop(Box::from_raw(ctx));
    }
}

unsafe fn evaluate_with(
    ctx: *mut NumbyContext,
    input: *const c_char,
    out_formatted: *mut *mut c_char,
    out_unit: *mut *mut c_char,
    out_error: *mut *mut c_char,
    preview: bool,
) -> c_double {
    let result = session(ctx).and_then(|session| {
        if input.is_null() {
            return Err(NumbyError::InvalidInput("null string".to_string()));
        }
        let bytes = CStr::from_ptr(input).to_bytes();
        if preview {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| NumbyError::InvalidInput(format!("input is not UTF-8: {}", e)))?;
            session.preview(text)
        } else {
            session.evaluate_bytes(bytes)
        }
    });
    match result {
        Ok(evaluation) => {
            write_out(out_formatted, &evaluation.formatted);
            write_out(out_unit, &evaluation.unit_label);
            evaluation.value.amount
        }
        Err(e) => {
            write_out(out_error, &e.to_string());
            f64::NAN
        }
    }
}

/// Returns the amount, or NaN with `*out_error` set. Each out-pointer may
/// be null.
///
/// # Safety
/// `ctx` must be a live context and `input` a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn numby_evaluate(
    ctx: *mut NumbyContext,
    input: *const c_char,
    out_formatted: *mut *mut c_char,
    out_unit: *mut *mut c_char,
    out_error: *mut *mut c_char,
) -> c_double {
    evaluate_with(ctx, input, out_formatted, out_unit, out_error, false)
}

/// Like [`numby_evaluate`] but leaves the context untouched.
///
/// # Safety
/// See [`numby_evaluate`].
#[no_mangle]
pub unsafe extern "C" fn numby_preview(
    ctx: *mut NumbyContext,
    input: *const c_char,
    out_formatted: *mut *mut c_char,
    out_unit: *mut *mut c_char,
    out_error: *mut *mut c_char,
) -> c_double {
    evaluate_with(ctx, input, out_formatted, out_unit, out_error, true)
}

/// `unit` may be null for a plain number.
///
/// # Safety
/// `ctx` must be a live context; strings must be NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn numby_set_variable(
    ctx: *mut NumbyContext,
    name: *const c_char,
    value: c_double,
    unit: *const c_char,
) -> c_int {
    status((|| {
        let session = session(ctx)?;
        let name = read_str(name)?;
        let unit = if unit.is_null() {
            None
        } else {
            Some(read_str(unit)?)
        };
        session.set_variable(name, value, unit)
    })())
}

/// # Safety
/// `ctx` must be a live context and `path` a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn numby_load_config(ctx: *mut NumbyContext, path: *const c_char) -> c_int {
    status((|| {
        let session = session(ctx)?;
        session.load_config(Path::new(read_str(path)?))
    })())
}

/// # Safety
/// `code` must be a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn numby_set_locale(code: *const c_char) -> c_int {
    status(read_str(code).and_then(api::set_locale))
}

#[no_mangle]
pub extern "C" fn numby_get_locale() -> *mut c_char {
    into_c_string(api::get_locale())
}

#[no_mangle]
pub extern "C" fn numby_get_locales_count() -> c_int {
    api::locale_count() as c_int
}

/// Null when `index` is out of range.
#[no_mangle]
pub extern "C" fn numby_get_locale_code(index: c_int) -> *mut c_char {
    usize::try_from(index)
        .ok()
        .and_then(locale::locale_at)
        .map_or(ptr::null_mut(), |l| into_c_string(l.code))
}

#[no_mangle]
pub extern "C" fn numby_get_locale_name(index: c_int) -> *mut c_char {
    usize::try_from(index)
        .ok()
        .and_then(locale::locale_at)
        .map_or(ptr::null_mut(), |l| into_c_string(l.name))
}

/// # Safety
/// `ctx` must be a live context or null.
#[no_mangle]
pub unsafe extern "C" fn numby_clear_history(ctx: *mut NumbyContext) {
    if let Ok(session) = session(ctx) {
        session.clear_history();
    }
}

/// # Safety
/// `ctx` must be a live context or null.
#[no_mangle]
pub unsafe extern "C" fn numby_clear_variables(ctx: *mut NumbyContext) {
    if let Ok(session) = session(ctx) {
        session.clear_variables();
    }
}

/// -1 for a null context.
///
/// # Safety
/// `ctx` must be a live context or null.
#[no_mangle]
pub unsafe extern "C" fn numby_get_history_count(ctx: *mut NumbyContext) -> c_int {
    session(ctx).map_or(-1, |s| s.history_count() as c_int)
}

#[no_mangle]
pub extern "C" fn numby_get_default_config_path() -> *mut c_char {
    match api::default_config_path() {
        Ok(path) => into_c_string(&path.to_string_lossy()),
        Err(e) => {
            warn!("no default config path: {}", e);
            ptr::null_mut()
        }
    }
}

/// Blocks on the network.
///
/// # Safety
/// `ctx` must be a live context.
#[no_mangle]
pub unsafe extern "C" fn numby_update_currency_rates(ctx: *mut NumbyContext) -> c_int {
    status(session(ctx).and_then(|s| s.update_currency_rates().map(|_| ())))
}

/// # Safety
/// `ctx` must be a live context and `json` a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn numby_set_currency_rates_json(
    ctx: *mut NumbyContext,
    json: *const c_char,
) -> c_int {
    status((|| {
        let session = session(ctx)?;
        session.set_currency_rates_json(read_str(json)?).map(|_| ())
    })())
}

/// 1 stale, 0 fresh, -1 error.
#[no_mangle]
pub extern "C" fn numby_are_rates_stale() -> c_int {
    match api::are_rates_stale() {
        Ok(true) => 1,
        Ok(false) => 0,
        Err(_) => -1,
    }
}

/// `YYYY-MM-DD`, or null when no rates were ever stored.
#[no_mangle]
pub extern "C" fn numby_get_rates_update_date() -> *mut c_char {
    api::get_rates_update_date().map_or(ptr::null_mut(), |date| {
        into_c_string(&date.format(crate::units::currency::DATE_FORMAT).to_string())
    })
}

/// # Safety
/// `text` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn numby_free_string(text: *mut c_char) {
    if !text.is_null() {
        drop(CString::from_raw(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn take(text: *mut c_char) -> String {
        let owned = CStr::from_ptr(text).to_string_lossy().into_owned();
        numby_free_string(text);
        owned
    }

    #[test]
    fn test_priorities_are_exported() {
        assert_eq!(NUMBY_PRIORITY_HISTORY, 10);
        assert_eq!(NUMBY_PRIORITY_MATH, 50);
        assert_eq!(NUMBY_MAX_EXPR_LENGTH, 100_000);
    }

    #[test]
    fn test_evaluate_round_trip() {
        unsafe {
            let ctx = numby_context_new();
            let input = CString::new("2 + 3 * 4").unwrap();
            let mut formatted = ptr::null_mut();
            let mut unit = ptr::null_mut();
            let mut error = ptr::null_mut();
            let amount = numby_evaluate(ctx, input.as_ptr(), &mut formatted, &mut unit, &mut error);
            assert_eq!(amount, 14.0);
            assert!(error.is_null());
            assert_eq!(take(formatted), "14");
            assert_eq!(take(unit), "");
            assert_eq!(numby_get_history_count(ctx), 1);
            numby_context_free(ctx);
        }
    }

    #[test]
    fn test_failure_sets_error_and_nan() {
        unsafe {
            let ctx = numby_context_new();
            let input = CString::new("5 / 0").unwrap();
            let mut error = ptr::null_mut();
            let amount = numby_evaluate(
                ctx,
                input.as_ptr(),
                ptr::null_mut(),
                ptr::null_mut(),
                &mut error,
            );
            assert!(amount.is_nan());
            assert_eq!(take(error), "Division by zero");
            assert_eq!(numby_get_history_count(ctx), 0);

            let name = CString::new("prev").unwrap();
            assert_eq!(
                numby_set_variable(ctx, name.as_ptr(), 1.0, ptr::null()),
                -crate::error::ErrorKind::InvalidName.code()
            );
            numby_context_free(ctx);
        }
    }

    #[test]
    fn test_null_handles() {
        unsafe {
            assert_eq!(numby_get_history_count(ptr::null_mut()), -1);
            numby_clear_history(ptr::null_mut());
            numby_free_string(ptr::null_mut());
            assert!(numby_get_locale_code(-1).is_null());
            assert!(numby_get_locale_code(numby_get_locales_count()).is_null());
            assert_eq!(take(numby_get_locale_code(0)), "en-US");
        }
    }
}

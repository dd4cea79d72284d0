//! `toPromise`: callback-style host functions as JS promises
//!
//! Values cross the boundary as JSON. An `undefined` rejection and a
//! synchronous throw both settle the promise, so it never stays pending
//! because of how the host function failed.

use interop_core::{ErrorValue, InteropConfig, InteropError};
use napi::{
    sys, CallContext, Env, Error, JsDeferred, JsFunction, JsObject, JsUnknown,
    NapiValue, Result, Status, ValueType,
};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::ptr;
use std::rc::Rc;

type Settle = Box<dyn FnOnce(Env) -> Result<Value> + Send>;
type Pending = Rc<RefCell<Option<JsDeferred<Value, Settle>>>>;

/// Call `interopFn(resolve, reject, ...args)` and return a promise of its outcome.
#[napi(ts_return_type = "Promise<unknown>")]
pub fn to_promise(
    env: Env,
    interop_fn: Option<JsFunction>,
    args: Option<Vec<JsUnknown>>,
) -> Result<JsObject> {
    let config = InteropConfig::from_env();
    let (deferred, promise) = env.create_deferred::<Value, Settle>()?;
    let pending: Pending = Rc::new(RefCell::new(Some(deferred)));

    let Some(interop_fn) = interop_fn else {
        tracing::warn!("interop function is undefined");
        reject_with(&pending, ErrorValue::new(InteropError::MissingFunction.to_string()));
        return Ok(promise);
    };

    let resolve_fn = env.create_function_from_closure("resolve", {
        let pending = Rc::clone(&pending);
        move |ctx: CallContext<'_>| {
            let value = match first_argument(&ctx)? {
                Some(arg) => ctx.env.from_js_value::<Value, _>(arg)?,
                None => Value::Null,
            };
            let settled = resolve_with(&pending, value);
            ctx.env.get_boolean(settled)
        }
    })?;

    let reject_fn = env.create_function_from_closure("reject", {
        let pending = Rc::clone(&pending);
        let config = config.clone();
        move |ctx: CallContext<'_>| {
            let reason = first_argument(&ctx)?;
            let error = rejection_error(ctx.env, reason, &config);
            let settled = reject_with(&pending, error);
            ctx.env.get_boolean(settled)
        }
    })?;

    let mut call_args = vec![resolve_fn.into_unknown(), reject_fn.into_unknown()];
    call_args.extend(args.unwrap_or_default());

    if let Err(err) = interop_fn.call(None, &call_args) {
        let error = match take_exception(&env) {
            Some(exception) => rejection_error(&env, Some(exception), &config),
            None if err.reason.trim().is_empty() => ErrorValue::normalize(None, &config),
            None => ErrorValue::new(err.reason),
        };
        tracing::debug!(message = %error.message, "interop function threw");
        reject_with(&pending, error);
    }

    Ok(promise)
}

fn resolve_with(pending: &Pending, value: Value) -> bool {
    let Some(deferred) = pending.borrow_mut().take() else {
        return false;
    };
    let settle: Settle = Box::new(move |_env: Env| -> Result<Value> { Ok(value) });
    deferred.resolve(settle);
    true
}

fn reject_with(pending: &Pending, error: ErrorValue) -> bool {
    let Some(deferred) = pending.borrow_mut().take() else {
        return false;
    };
    deferred.reject(Error::from_reason(error.message));
    true
}

fn first_argument(ctx: &CallContext<'_>) -> Result<Option<JsUnknown>> {
    if ctx.length == 0 {
        return Ok(None);
    }
    ctx.get::<JsUnknown>(0).map(Some)
}

/// Normalized error for a rejection reason. Unreadable reasons count as absent.
fn rejection_error(env: &Env, reason: Option<JsUnknown>, config: &InteropConfig) -> ErrorValue {
    let json = reason.and_then(|r| reason_json(env, r).ok());
    ErrorValue::normalize(json.as_ref(), config)
}

fn reason_json(env: &Env, reason: JsUnknown) -> Result<Value> {
    match reason.get_type()? {
        ValueType::Undefined | ValueType::Null => Ok(Value::Null),
        ValueType::Object => {
            let object: JsObject = unsafe { reason.cast() };
            // Error's message and stack are not enumerable, read them directly.
            let message: Option<String> = object.get("message")?;
            let stack: Option<String> = object.get("stack")?;
            if message.is_some() || stack.is_some() {
                return Ok(json!({ "message": message, "stack": stack }));
            }
            env.from_js_value(object)
        }
        _ => env.from_js_value(reason),
    }
}

fn take_exception(env: &Env) -> Option<JsUnknown> {
    let mut exception = ptr::null_mut();
    let status = unsafe { sys::napi_get_and_clear_last_exception(env.raw(), &mut exception) };
    if Status::from(status) != Status::Ok || exception.is_null() {
        return None;
    }
    Some(unsafe { JsUnknown::from_raw_unchecked(env.raw(), exception) })
}


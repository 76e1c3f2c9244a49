use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use host_bridge::HostError;
use js_sys::{Function, Reflect};
use serde::{de::DeserializeOwned, Serialize};
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::{prelude::*, JsCast};

use super::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["window", "__TAURI_INTERNALS__"], js_name = invoke, catch)]
    async fn tauri_invoke(cmd: &str, args: JsValue, options: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["window", "__TAURI_INTERNALS__"], js_name = transformCallback)]
    fn tauri_transform_callback(callback: &Function, once: bool) -> u32;

    #[wasm_bindgen(js_namespace = ["window", "__TAURI_INTERNALS__"], js_name = unregisterCallback)]
    fn tauri_unregister_callback(id: u32);

    #[wasm_bindgen(js_namespace = ["window", "__TAURI_INTERNALS__"], js_name = convertFileSrc)]
    fn tauri_convert_file_src(path: &str, protocol: &str) -> String;
}

type JsCallback = Closure<dyn FnMut(JsValue)>;

thread_local! {
    static CALLBACKS: RefCell<HashMap<CallbackId, JsCallback>> = RefCell::new(HashMap::new());
}

fn internals() -> Option<JsValue> {
    let window = web_sys::window()?;
    let internals = Reflect::get(&window, &JsValue::from_str("__TAURI_INTERNALS__")).ok()?;
    if internals.is_undefined() || internals.is_null() {
        None
    } else {
        Some(internals)
    }
}

fn property(target: &JsValue, key: &str) -> Option<JsValue> {
    let value = Reflect::get(target, &JsValue::from_str(key)).ok()?;
    if value.is_undefined() {
        None
    } else {
        Some(value)
    }
}

fn js_error_to_string(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    if let Some(text) = property(err, "message").and_then(|message| message.as_string()) {
        return text;
    }
    format!("{err:?}")
}

fn to_js<T: Serialize>(command: &str, value: &T) -> HostResult<JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|err| HostError::Encode {
            command: command.to_string(),
            message: err.to_string(),
        })
}

fn from_js<T: DeserializeOwned>(command: &str, value: JsValue) -> HostResult<T> {
    from_value(value).map_err(|err| HostError::Decode {
        command: command.to_string(),
        message: err.to_string(),
    })
}

pub async fn invoke(
    command: &str,
    args: Value,
    options: Option<&InvokeOptions>,
) -> HostResult<Value> {
    if internals().is_none() {
        return Err(HostError::Unavailable(
            "window.__TAURI_INTERNALS__ is not defined".to_string(),
        ));
    }
    let js_args = to_js(command, &args)?;
    let js_options = match options {
        Some(options) => to_js(command, options)?,
        None => JsValue::UNDEFINED,
    };
    match tauri_invoke(command, js_args, js_options).await {
        Ok(value) if value.is_undefined() => Ok(Value::Null),
        Ok(value) => from_js(command, value),
        Err(err) => {
            let payload = if err.is_instance_of::<js_sys::Error>() {
                Value::String(js_error_to_string(&err))
            } else {
                from_value::<Value>(err.clone())
                    .unwrap_or_else(|_| Value::String(js_error_to_string(&err)))
            };
            Err(HostError::Rejected {
                command: command.to_string(),
                payload,
            })
        }
    }
}

fn release(id: CallbackId) {
    let closure = CALLBACKS.with(|callbacks| callbacks.borrow_mut().remove(&id));
    if let Some(closure) = closure {
        // The closure may still be on the stack; drop it after the current turn.
        wasm_bindgen_futures::spawn_local(async move { drop(closure) });
    }
}

pub fn transform_callback(mut callback: HostCallback, once: bool) -> CallbackId {
    let registered = Rc::new(Cell::new(None::<CallbackId>));
    let slot = Rc::clone(&registered);
    let closure: JsCallback = Closure::wrap(Box::new(move |payload: JsValue| {
        match from_value::<Value>(payload) {
            Ok(payload) => callback(payload),
            Err(err) => log::warn!("dropping undecodable callback payload: {err}"),
        }
        if once {
            if let Some(id) = slot.get() {
                release(id);
            }
        }
    }) as Box<dyn FnMut(JsValue)>);
    let id = tauri_transform_callback(closure.as_ref().unchecked_ref(), once);
    registered.set(Some(id));
    CALLBACKS.with(|callbacks| callbacks.borrow_mut().insert(id, closure));
    id
}

pub fn unregister_callback(id: CallbackId) {
    if internals().is_some() {
        tauri_unregister_callback(id);
    }
    release(id);
}

pub fn convert_file_src(path: &str, protocol: &str) -> String {
    tauri_convert_file_src(path, protocol)
}

pub fn metadata() -> HostMetadata {
    let Some(metadata) = internals().and_then(|internals| property(&internals, "metadata")) else {
        log::warn!("host metadata missing; using defaults");
        return HostMetadata::default();
    };
    from_js("metadata", metadata).unwrap_or_else(|err| {
        log::warn!("host metadata unreadable: {err}");
        HostMetadata::default()
    })
}

pub fn plugin_constant(plugin: &str, key: &str) -> Option<Value> {
    let value = internals()
        .and_then(|internals| property(&internals, "plugins"))
        .and_then(|plugins| property(&plugins, plugin))
        .and_then(|constants| property(&constants, key))?;
    from_value(value)
        .map_err(|err| log::warn!("plugin constant `{plugin}.{key}` unreadable: {err}"))
        .ok()
}

pub fn spawn_local(task: HostFuture<'static, ()>) {
    wasm_bindgen_futures::spawn_local(task);
}

pub fn is_tauri() -> bool {
    property(&js_sys::global(), "isTauri")
        .and_then(|flag| flag.as_bool())
        .unwrap_or(false)
}
